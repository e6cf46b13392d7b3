use crate::models::{PlaylistId, RemotePlaylist, RemoteTrackRef};
use crate::remote::{RemoteClient, RemoteError, RemoteResult};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Remote client returning fixed data and recording the calls it receives.
#[derive(Debug, Default)]
pub struct FixedRemote {
    pub playlists: Vec<RemotePlaylist>,
    pub tracks: BTreeMap<PlaylistId, Vec<RemoteTrackRef>>,
    pub offline: bool,
    pub calls: RefCell<Vec<String>>,
}

impl FixedRemote {
    pub fn with_playlists(playlists: Vec<RemotePlaylist>) -> Self {
        Self {
            playlists,
            ..Self::default()
        }
    }

    pub fn tracks(mut self, id: u64, tracks: Vec<RemoteTrackRef>) -> Self {
        self.tracks.insert(PlaylistId(id), tracks);
        self
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

impl RemoteClient for FixedRemote {
    fn list_playlists(&self) -> RemoteResult<Vec<RemotePlaylist>> {
        self.calls.borrow_mut().push("list_playlists".into());
        if self.offline {
            return Err(RemoteError::NetworkError {
                message: "connection refused".into(),
            });
        }
        Ok(self.playlists.clone())
    }

    fn list_playlist_tracks(&self, playlist_id: &PlaylistId) -> RemoteResult<Vec<RemoteTrackRef>> {
        self.calls
            .borrow_mut()
            .push(format!("list_playlist_tracks({playlist_id})"));
        self.tracks
            .get(playlist_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound {
                entity: playlist_id.to_string(),
            })
    }
}
