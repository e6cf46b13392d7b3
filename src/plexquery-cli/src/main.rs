use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use plex_provider::{PlexClient, PlexSettings};
use plexquery_core::query::{LibraryGrammar, QueryParser};
use plexquery_core::{
    init_logging, AppDirs, Config, CredentialStore, PlaylistId, PlaylistQuery, PlexConfig,
    RemoteClient, RemoteError, RemotePlaylist, RemoteResult, RemoteTrackRef,
};
use plexquery_library::{LocalItem, LocalLibrary};
use serde_json::json;
use std::cell::OnceCell;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "plexquery",
    version,
    about = "Query a local music library through Plex playlists"
)]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the audio playlists of the configured Plex library
    Playlists {
        /// Print JSON instead of id/title lines
        #[arg(long)]
        json: bool,
    },
    /// List local library items matching a query
    Ls(LsCommand),
    /// Print the library filter a Plex playlist compiles to
    Filter {
        /// Playlist name or numeric id
        playlist: String,
    },
    /// Plex token management
    #[command(subcommand)]
    Token(TokenCommand),
}

#[derive(Debug, Parser, Clone)]
struct LsCommand {
    /// Print paths instead of artist - album - title
    #[arg(short = 'p', long)]
    path: bool,
    /// Query terms; a lone "," separates alternatives
    query: Vec<String>,
}

#[derive(Debug, Subcommand)]
enum TokenCommand {
    /// Store the Plex token in the OS keyring
    Set { token: String },
    /// Remove the stored Plex token
    Clear,
}

/// Connects to Plex on first use so queries without a playlist term work
/// offline.
struct LazyPlex<'a> {
    config: &'a PlexConfig,
    client: OnceCell<PlexClient>,
}

impl<'a> LazyPlex<'a> {
    fn new(config: &'a PlexConfig) -> Self {
        Self {
            config,
            client: OnceCell::new(),
        }
    }

    fn client(&self) -> RemoteResult<&PlexClient> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = connect(self.config).map_err(|e| RemoteError::Other {
            message: e.to_string(),
        })?;
        Ok(self.client.get_or_init(|| client))
    }
}

impl RemoteClient for LazyPlex<'_> {
    fn list_playlists(&self) -> RemoteResult<Vec<RemotePlaylist>> {
        self.client()?.list_playlists()
    }

    fn list_playlist_tracks(&self, playlist_id: &PlaylistId) -> RemoteResult<Vec<RemoteTrackRef>> {
        self.client()?.list_playlist_tracks(playlist_id)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut dirs = AppDirs::discover()?;
    if let Some(path) = &cli.config {
        dirs = dirs.with_config_file(path);
    }
    let config = Config::load(&dirs)?;
    let _logging = init_logging(&config.logging, &dirs, cli.verbose)?;

    match cli.command {
        Command::Playlists { json } => {
            let playlists = connect(&config.plex)?.list_playlists()?;
            if json {
                println!("{}", playlists_json(&playlists));
            } else {
                for line in playlist_lines(&playlists) {
                    println!("{line}");
                }
            }
        }
        Command::Ls(ls) => {
            if config.directory.trim().is_empty() {
                bail!("`directory` is not set in config.toml");
            }
            let library = LocalLibrary::scan(&config.directory)
                .with_context(|| format!("scanning {}", config.directory))?;
            let plex = LazyPlex::new(&config.plex);
            let mapping = config.path_mapping();
            let mut parser = QueryParser::new();
            PlaylistQuery::new(&plex, &mapping, &LibraryGrammar).register(&mut parser);
            let query = parser.parse_args(&ls.query)?;
            for item in library.query(&query) {
                println!("{}", format_item(item, ls.path));
            }
        }
        Command::Filter { playlist } => {
            let plex = connect(&config.plex)?;
            let mapping = config.path_mapping();
            let filter = PlaylistQuery::new(&plex, &mapping, &LibraryGrammar).build(&playlist)?;
            println!("{filter}");
        }
        Command::Token(TokenCommand::Set { token }) => {
            let server = config.plex.server_key();
            CredentialStore::new().store_token(&server, token.trim())?;
            println!("Stored Plex token for {server}");
        }
        Command::Token(TokenCommand::Clear) => {
            let server = config.plex.server_key();
            CredentialStore::new().delete_token(&server)?;
            println!("Removed Plex token for {server}");
        }
    }

    Ok(())
}

fn connect(plex: &PlexConfig) -> Result<PlexClient> {
    let token = CredentialStore::new().token_for(plex);
    tracing::debug!(source = ?token, server = %plex.server_key(), "plex token");
    let settings = PlexSettings::from_config(plex, token.into_token())?;
    Ok(PlexClient::new(settings)?)
}

fn format_item(item: &LocalItem, path_only: bool) -> String {
    if path_only {
        return item.path.clone();
    }
    match &item.album {
        Some(album) => format!("{} - {} - {}", item.artist, album, item.title),
        None => format!("{} - {}", item.artist, item.title),
    }
}

fn playlist_lines(playlists: &[RemotePlaylist]) -> Vec<String> {
    playlists
        .iter()
        .map(|p| format!("{}\t{}", p.id, p.name))
        .collect()
}

fn playlists_json(playlists: &[RemotePlaylist]) -> serde_json::Value {
    playlists
        .iter()
        .map(|p| {
            json!({
                "id": p.id.get(),
                "title": p.name,
                "track_count": p.track_count,
                "smart": p.smart,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("arguments should parse")
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn ls_collects_query_terms() {
        let cli = parse(&[
            "plexquery",
            "ls",
            "-p",
            "plexquery-playlist:Chill Vibes",
            ",",
            "artist:boards",
        ]);
        match cli.command {
            Command::Ls(ls) => {
                assert!(ls.path);
                assert_eq!(
                    ls.query,
                    vec!["plexquery-playlist:Chill Vibes", ",", "artist:boards"]
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = parse(&["plexquery", "filter", "12345", "--config", "/tmp/pq.toml", "-vv"]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/pq.toml")));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Filter { playlist } if playlist == "12345"));
    }

    #[test]
    fn token_subcommands() {
        let cli = parse(&["plexquery", "token", "set", "abc"]);
        assert!(matches!(
            cli.command,
            Command::Token(TokenCommand::Set { token }) if token == "abc"
        ));
        let cli = parse(&["plexquery", "token", "clear"]);
        assert!(matches!(cli.command, Command::Token(TokenCommand::Clear)));
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["plexquery"]).is_err());
    }

    #[test]
    fn items_format_with_and_without_album() {
        let mut item = LocalItem {
            path: "/music/a/b/01.flac".into(),
            title: "Roygbiv".into(),
            artist: "Boards of Canada".into(),
            album: Some("Music Has the Right to Children".into()),
            track: Some(1),
            length: Some(151),
        };
        assert_eq!(
            format_item(&item, false),
            "Boards of Canada - Music Has the Right to Children - Roygbiv"
        );
        assert_eq!(format_item(&item, true), "/music/a/b/01.flac");
        item.album = None;
        assert_eq!(format_item(&item, false), "Boards of Canada - Roygbiv");
    }

    #[test]
    fn playlists_render_as_lines_and_json() {
        let mut smart = RemotePlaylist::new(678, "Workout");
        smart.smart = true;
        let playlists = vec![RemotePlaylist::new(12345, "Chill Vibes"), smart];

        assert_eq!(
            playlist_lines(&playlists),
            vec!["12345\tChill Vibes", "678\tWorkout"]
        );
        assert_eq!(
            playlists_json(&playlists),
            json!([
                {"id": 12345, "title": "Chill Vibes", "track_count": null, "smart": false},
                {"id": 678, "title": "Workout", "track_count": null, "smart": true}
            ])
        );
    }

    #[test]
    fn lazy_plex_reports_setup_errors_as_remote_errors() {
        let config = PlexConfig::default();
        let plex = LazyPlex::new(&config);
        let err = plex.list_playlists().expect_err("library_name is unset");
        assert!(matches!(err, RemoteError::Other { message } if message.contains("library_name")));
    }
}
