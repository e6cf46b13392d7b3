//! Local music library index for plexquery.
//!
//! Scans a directory of audio files once and answers parsed [`Query`]s
//! against the result.

mod scan;
mod tags;

use plexquery_core::query::{Fields, Query};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One audio file in the local library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalItem {
    pub path: String,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub track: Option<u32>,
    /// Length in whole seconds.
    pub length: Option<u32>,
}

impl Fields for LocalItem {
    fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        match name {
            "path" => Some(Cow::Borrowed(&self.path)),
            "title" => Some(Cow::Borrowed(&self.title)),
            "artist" => Some(Cow::Borrowed(&self.artist)),
            "album" => self.album.as_deref().map(Cow::Borrowed),
            "track" => self.track.map(|n| Cow::Owned(n.to_string())),
            "length" => self.length.map(|n| Cow::Owned(n.to_string())),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("cannot open library directory {path}: {source}")]
    Root {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("library directory {path} is not a directory")]
    NotADirectory { path: PathBuf },
}

#[derive(Debug, Clone, Default)]
pub struct LocalLibrary {
    items: Vec<LocalItem>,
}

impl LocalLibrary {
    pub fn scan(root: impl AsRef<Path>) -> Result<Self, LibraryError> {
        let items = scan::scan_library(root.as_ref())?;
        Ok(Self { items })
    }

    pub fn from_items(items: Vec<LocalItem>) -> Self {
        Self { items }
    }

    /// Items in path order.
    pub fn items(&self) -> &[LocalItem] {
        &self.items
    }

    pub fn query(&self, query: &Query) -> Vec<&LocalItem> {
        query.apply(&self.items)
    }
}
