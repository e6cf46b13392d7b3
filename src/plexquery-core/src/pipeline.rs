use crate::compile::{compile, CompositeFilter};
use crate::extract::extract;
use crate::query::{BoxError, Filter, FilterKind, QueryGrammar, QueryParser};
use crate::remote::RemoteClient;
use crate::resolve::{resolve, PlaylistError};
use crate::translate::{translate, PathMapping};
use std::collections::BTreeSet;

/// Query prefix selecting the items of a remote playlist.
pub const PLAYLIST_QUERY_PREFIX: &str = "plexquery-playlist";

/// Turns a playlist token into a filter over the local library.
///
/// Nothing is cached: every [`PlaylistQuery::build`] call talks to the remote
/// server again.
pub struct PlaylistQuery<'a, C: ?Sized, G: ?Sized> {
    client: &'a C,
    mapping: &'a PathMapping,
    grammar: &'a G,
}

impl<'a, C, G> PlaylistQuery<'a, C, G>
where
    C: RemoteClient + ?Sized,
    G: QueryGrammar + ?Sized,
{
    pub fn new(client: &'a C, mapping: &'a PathMapping, grammar: &'a G) -> Self {
        Self {
            client,
            mapping,
            grammar,
        }
    }

    pub fn build(&self, token: &str) -> Result<CompositeFilter, PlaylistError> {
        let playlist = resolve(token, self.client)?;
        let remote_paths = extract(&playlist, self.client)?;
        let local_paths: BTreeSet<String> = remote_paths
            .iter()
            .map(|path| translate(path, self.mapping))
            .collect();
        let filter = compile(local_paths, self.grammar);
        tracing::info!(
            playlist = %playlist.name,
            id = %playlist.id,
            paths = filter.path_count(),
            "compiled playlist filter"
        );
        Ok(filter)
    }

    /// Registers this query under [`PLAYLIST_QUERY_PREFIX`].
    pub fn register(self, parser: &mut QueryParser<'a>)
    where
        C: 'a,
        G: 'a,
    {
        parser.register(PLAYLIST_QUERY_PREFIX, self);
    }
}

impl<'a, C, G> FilterKind for PlaylistQuery<'a, C, G>
where
    C: RemoteClient + ?Sized,
    G: QueryGrammar + ?Sized,
{
    fn build(&self, pattern: &str) -> Result<Filter, BoxError> {
        Ok(PlaylistQuery::build(self, pattern)?.into_filter())
    }
}
