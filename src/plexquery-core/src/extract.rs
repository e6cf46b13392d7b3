use crate::models::RemotePlaylist;
use crate::remote::{RemoteClient, RemoteResult};
use std::collections::BTreeSet;

/// Collects the distinct remote file paths of a playlist.
///
/// Entries without a file are skipped. Playlist order is not kept; the result
/// feeds a set-membership filter.
pub fn extract<C: RemoteClient + ?Sized>(
    playlist: &RemotePlaylist,
    client: &C,
) -> RemoteResult<BTreeSet<String>> {
    let tracks = client.list_playlist_tracks(&playlist.id)?;
    let total = tracks.len();
    let mut skipped = 0usize;
    let mut paths = BTreeSet::new();
    for track in tracks {
        match track.path {
            Some(path) if !path.is_empty() => {
                paths.insert(path);
            }
            _ => {
                skipped += 1;
                tracing::debug!(title = %track.title, "skipping playlist entry without a file");
            }
        }
    }
    tracing::debug!(
        playlist = %playlist.name,
        total,
        skipped,
        distinct = paths.len(),
        "extracted playlist paths"
    );
    Ok(paths)
}
