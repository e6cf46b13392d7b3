use crate::models::{PlaylistId, PlaylistRef, RemotePlaylist};
use crate::remote::{RemoteClient, RemoteError};
use thiserror::Error;

/// Why a playlist token could not be turned into a filter.
#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist '{token}' not found")]
    NotFound { token: String },
    #[error("playlist name '{name}' is ambiguous, use one of the ids: {}", format_ids(.ids))]
    Ambiguous { name: String, ids: Vec<PlaylistId> },
    #[error(transparent)]
    Transport(#[from] RemoteError),
}

fn format_ids(ids: &[PlaylistId]) -> String {
    ids.iter()
        .map(PlaylistId::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves a user token to exactly one playlist on the remote server.
///
/// Tokens spelling an id exactly (no sign, no leading zeros) are tried as
/// identifiers first. When no identifier matches, or the token is not an id,
/// an exact, case-sensitive name match is required.
pub fn resolve<C: RemoteClient + ?Sized>(
    token: &str,
    client: &C,
) -> Result<RemotePlaylist, PlaylistError> {
    let playlists = client.list_playlists()?;
    tracing::debug!(count = playlists.len(), "fetched remote playlists");

    if let PlaylistRef::Id(id) = PlaylistRef::parse(token) {
        if let Some(playlist) = find_by_id(&playlists, id) {
            tracing::debug!(%id, name = %playlist.name, "playlist resolved by id");
            return Ok(playlist.clone());
        }
    }

    let playlist = find_by_name(&playlists, token)?;
    tracing::debug!(id = %playlist.id, name = %playlist.name, "playlist resolved by name");
    Ok(playlist.clone())
}

pub fn find_by_id(playlists: &[RemotePlaylist], id: PlaylistId) -> Option<&RemotePlaylist> {
    playlists.iter().find(|p| p.id == id)
}

pub fn find_by_name<'a>(
    playlists: &'a [RemotePlaylist],
    name: &str,
) -> Result<&'a RemotePlaylist, PlaylistError> {
    let mut matches = playlists.iter().filter(|p| p.name == name);
    let Some(first) = matches.next() else {
        return Err(PlaylistError::NotFound {
            token: name.to_owned(),
        });
    };
    let rest: Vec<&RemotePlaylist> = matches.collect();
    if rest.is_empty() {
        return Ok(first);
    }
    let ids = std::iter::once(first)
        .chain(rest)
        .map(|p| p.id)
        .collect();
    Err(PlaylistError::Ambiguous {
        name: name.to_owned(),
        ids,
    })
}
