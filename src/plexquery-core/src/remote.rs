use crate::models::{PlaylistId, RemotePlaylist, RemoteTrackRef};
use thiserror::Error;

/// Transport-level failures surfaced by a remote client.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("network error: {message}")]
    NetworkError { message: String },
    #[error("authentication error: {message}")]
    AuthenticationError { message: String },
    #[error("entity not found: {entity}")]
    NotFound { entity: String },
    #[error("{message}")]
    Other { message: String },
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Read-only view of a remote media server.
///
/// Implementations perform blocking calls and must not cache results between
/// invocations; every query sees the server's current state.
pub trait RemoteClient {
    /// Every playlist visible to this client.
    fn list_playlists(&self) -> RemoteResult<Vec<RemotePlaylist>>;

    /// File locations of the playlist's entries, in playlist order.
    fn list_playlist_tracks(&self, playlist_id: &PlaylistId) -> RemoteResult<Vec<RemoteTrackRef>>;
}

impl<C: RemoteClient + ?Sized> RemoteClient for &C {
    fn list_playlists(&self) -> RemoteResult<Vec<RemotePlaylist>> {
        (**self).list_playlists()
    }

    fn list_playlist_tracks(&self, playlist_id: &PlaylistId) -> RemoteResult<Vec<RemoteTrackRef>> {
        (**self).list_playlist_tracks(playlist_id)
    }
}
