use crate::models::PlaylistId;
use crate::remote::{RemoteClient, RemoteError};
use thiserror::Error;

/// Expectations supplied by a remote client implementation to run the shared
/// contract suite.
#[derive(Debug, Clone)]
pub struct RemoteClientContractExpectations {
    /// A playlist the fixture server is known to have.
    pub playlist_id: PlaylistId,
    pub playlist_name: String,
    /// A file path the playlist is known to contain.
    pub expected_path: String,
    /// An id the fixture server does not know.
    pub missing_playlist_id: PlaylistId,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoteClientContractError {
    #[error("list_playlists returned no playlists")]
    NoPlaylists,
    #[error("list_playlists did not return expected playlist id {expected}")]
    PlaylistMissing { expected: PlaylistId },
    #[error("playlist {id} has name {actual:?}, expected {expected:?}")]
    PlaylistNameMismatch {
        id: PlaylistId,
        expected: String,
        actual: String,
    },
    #[error("list_playlists returned duplicate id {id}")]
    DuplicateId { id: PlaylistId },
    #[error("playlist {id} tracks did not contain {expected}")]
    PathMissing { id: PlaylistId, expected: String },
    #[error("playlist {id} returned an empty path; entries without a file must use None")]
    EmptyPath { id: PlaylistId },
    #[error("unknown playlist {id} did not fail with NotFound")]
    MissingPlaylistNotReported { id: PlaylistId },
    #[error("remote error while running contract: {0}")]
    RemoteFailure(String),
}

/// Run the shared contract suite against a remote client implementation.
///
/// Clients should call this from their crate-level tests against a fixture
/// server holding the expected playlist.
pub fn run_remote_client_contract<C: RemoteClient + ?Sized>(
    client: &C,
    expectations: &RemoteClientContractExpectations,
) -> Result<(), RemoteClientContractError> {
    verify_playlists(client, expectations)?;
    verify_tracks(client, expectations)?;
    verify_missing(client, expectations)?;
    Ok(())
}

fn verify_playlists<C: RemoteClient + ?Sized>(
    client: &C,
    expectations: &RemoteClientContractExpectations,
) -> Result<(), RemoteClientContractError> {
    let playlists = client
        .list_playlists()
        .map_err(|e| RemoteClientContractError::RemoteFailure(e.to_string()))?;
    if playlists.is_empty() {
        return Err(RemoteClientContractError::NoPlaylists);
    }

    let mut ids: Vec<PlaylistId> = playlists.iter().map(|p| p.id).collect();
    ids.sort();
    if let Some(pair) = ids.windows(2).find(|w| w[0] == w[1]) {
        return Err(RemoteClientContractError::DuplicateId { id: pair[0] });
    }

    let playlist = playlists
        .iter()
        .find(|p| p.id == expectations.playlist_id)
        .ok_or(RemoteClientContractError::PlaylistMissing {
            expected: expectations.playlist_id,
        })?;
    if playlist.name != expectations.playlist_name {
        return Err(RemoteClientContractError::PlaylistNameMismatch {
            id: playlist.id,
            expected: expectations.playlist_name.clone(),
            actual: playlist.name.clone(),
        });
    }
    Ok(())
}

fn verify_tracks<C: RemoteClient + ?Sized>(
    client: &C,
    expectations: &RemoteClientContractExpectations,
) -> Result<(), RemoteClientContractError> {
    let id = expectations.playlist_id;
    let tracks = client
        .list_playlist_tracks(&id)
        .map_err(|e| RemoteClientContractError::RemoteFailure(e.to_string()))?;
    if tracks.iter().any(|t| t.path.as_deref() == Some("")) {
        return Err(RemoteClientContractError::EmptyPath { id });
    }
    let found = tracks
        .iter()
        .any(|t| t.path.as_deref() == Some(expectations.expected_path.as_str()));
    if !found {
        return Err(RemoteClientContractError::PathMissing {
            id,
            expected: expectations.expected_path.clone(),
        });
    }
    Ok(())
}

fn verify_missing<C: RemoteClient + ?Sized>(
    client: &C,
    expectations: &RemoteClientContractExpectations,
) -> Result<(), RemoteClientContractError> {
    let id = expectations.missing_playlist_id;
    match client.list_playlist_tracks(&id) {
        Err(RemoteError::NotFound { .. }) => Ok(()),
        Err(other) => Err(RemoteClientContractError::RemoteFailure(other.to_string())),
        Ok(_) => Err(RemoteClientContractError::MissingPlaylistNotReported { id }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RemotePlaylist, RemoteTrackRef};
    use crate::test_support::FixedRemote;

    fn expectations() -> RemoteClientContractExpectations {
        RemoteClientContractExpectations {
            playlist_id: PlaylistId(10),
            playlist_name: "Chill Vibes".into(),
            expected_path: "/media/music/x/1.flac".into(),
            missing_playlist_id: PlaylistId(999),
        }
    }

    fn conforming() -> FixedRemote {
        FixedRemote::with_playlists(vec![
            RemotePlaylist::new(10, "Chill Vibes"),
            RemotePlaylist::new(11, "Workout"),
        ])
        .tracks(
            10,
            vec![
                RemoteTrackRef::new("1", "/media/music/x/1.flac"),
                RemoteTrackRef::without_file("radio"),
            ],
        )
    }

    #[test]
    fn conforming_client_passes() {
        assert_eq!(run_remote_client_contract(&conforming(), &expectations()), Ok(()));
    }

    #[test]
    fn duplicate_ids_fail() {
        let mut remote = conforming();
        remote.playlists.push(RemotePlaylist::new(11, "Workout copy"));
        assert_eq!(
            run_remote_client_contract(&remote, &expectations()),
            Err(RemoteClientContractError::DuplicateId { id: PlaylistId(11) })
        );
    }

    #[test]
    fn empty_paths_fail() {
        let remote = conforming().tracks(10, vec![RemoteTrackRef::new("blank", "")]);
        assert_eq!(
            run_remote_client_contract(&remote, &expectations()),
            Err(RemoteClientContractError::EmptyPath { id: PlaylistId(10) })
        );
    }

    #[test]
    fn transport_failures_are_reported() {
        let err = run_remote_client_contract(&FixedRemote::offline(), &expectations())
            .expect_err("offline");
        assert!(matches!(err, RemoteClientContractError::RemoteFailure(_)));
    }
}
