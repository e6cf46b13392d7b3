use serde::{Deserialize, Serialize};
use std::fmt;

/// A server-assigned playlist identifier (Plex `ratingKey`).
///
/// Identifiers are unique per server and stable across renames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlaylistId(pub u64);

impl PlaylistId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for PlaylistId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for PlaylistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a user-supplied playlist token may be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistRef {
    Name(String),
    /// The token is an id in canonical form. It may still turn out to be a name.
    Id(PlaylistId),
}

impl PlaylistRef {
    /// Tokens with a sign or leading zeros are names only.
    pub fn parse(token: &str) -> Self {
        if let Ok(id) = token.parse::<u64>() {
            let id = PlaylistId(id);
            if id.to_string() == token {
                return PlaylistRef::Id(id);
            }
        }
        PlaylistRef::Name(token.to_owned())
    }
}

/// Playlist metadata as listed by the remote server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePlaylist {
    pub id: PlaylistId,
    pub name: String,
    pub track_count: Option<u32>,
    /// Smart playlists are computed server-side from rules.
    #[serde(default)]
    pub smart: bool,
}

impl RemotePlaylist {
    pub fn new(id: impl Into<PlaylistId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            track_count: None,
            smart: false,
        }
    }
}

/// One file location of a playlist entry, as the remote server sees it.
///
/// `path` is `None` for entries without a backing file (streaming-only items).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTrackRef {
    pub title: String,
    pub path: Option<String>,
}

impl RemoteTrackRef {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: Some(path.into()),
        }
    }

    pub fn without_file(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: None,
        }
    }
}
