use crate::tags::parse_tags;
use crate::{LibraryError, LocalItem};
use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

const UNKNOWN_ARTIST: &str = "Unknown Artist";

fn canonicalize_within_root(path: &Path, root: &Path) -> Option<PathBuf> {
    let canon = path.canonicalize().ok()?.clean();
    canon.starts_with(root).then_some(canon)
}

/// Walks `root` and collects every supported audio file below it.
///
/// Item paths are an absolute `root` as given (cleaned) joined with the file's
/// path relative to the canonical root, so they line up with translated Plex
/// paths.
pub fn scan_library(root: &Path) -> Result<Vec<LocalItem>, LibraryError> {
    let canonical_root = root
        .canonicalize()
        .map_err(|source| LibraryError::Root {
            path: root.to_path_buf(),
            source,
        })?
        .clean();
    if !canonical_root.is_dir() {
        return Err(LibraryError::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    // Relative roots fall back to the canonical one so item paths stay absolute.
    let display_root = if root.is_absolute() {
        root.clean()
    } else {
        canonical_root.clone()
    };

    let mut items = Vec::new();
    for entry in WalkDir::new(&canonical_root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable library entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(is_supported_extension);
        if !supported {
            continue;
        }
        let Some(canonical) = canonicalize_within_root(path, &canonical_root) else {
            continue;
        };
        let Ok(relative) = canonical.strip_prefix(&canonical_root) else {
            continue;
        };
        items.push(read_item(&canonical, &display_root.join(relative), relative));
    }
    items.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::debug!(root = %display_root.display(), count = items.len(), "library scanned");
    Ok(items)
}

fn is_supported_extension(ext: &str) -> bool {
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "mp3" | "m4a" | "flac" | "wav" | "ogg" | "opus" | "aiff"
    )
}

/// `Artist/Album/file` layouts supply artist and album when tags do not.
fn infer_from_layout(relative: &Path) -> (String, Option<String>) {
    let mut dirs: Vec<&str> = relative
        .parent()
        .map(|p| {
            p.components()
                .filter_map(|c| match c {
                    Component::Normal(s) => s.to_str(),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    match dirs.len() {
        0 => (UNKNOWN_ARTIST.into(), None),
        1 => (dirs[0].to_string(), None),
        _ => {
            let album = dirs.pop().map(str::to_string);
            let artist = dirs.pop().unwrap_or(UNKNOWN_ARTIST).to_string();
            (artist, album)
        }
    }
}

fn read_item(file: &Path, path: &Path, relative: &Path) -> LocalItem {
    let (inferred_artist, inferred_album) = infer_from_layout(relative);
    let file_stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Unknown");

    let tags = parse_tags(file);
    LocalItem {
        path: path.to_string_lossy().into_owned(),
        title: tags.title.unwrap_or_else(|| file_stem.to_string()),
        artist: tags.artist.unwrap_or(inferred_artist),
        album: tags.album.or(inferred_album),
        track: tags.track_number,
        length: tags.length_seconds,
    }
}
