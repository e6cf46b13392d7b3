//! Remote-to-local path translation.
//!
//! The remote server and the local library usually mount the same files under
//! different roots. A [`PathMapping`] rewrites the remote root prefix into the
//! local one.

use serde::{Deserialize, Serialize};

const SEPARATOR: char = '/';

/// A single configured root-prefix pair.
///
/// An empty `local_root` (or `remote_root`) disables translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    pub remote_root: String,
    pub local_root: String,
}

impl PathMapping {
    pub fn new(remote_root: impl Into<String>, local_root: impl Into<String>) -> Self {
        Self {
            remote_root: remote_root.into(),
            local_root: local_root.into(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.remote_root.is_empty() && !self.local_root.is_empty()
    }

    /// Rewrites `remote_path` if it lives under `remote_root`.
    pub fn translate(&self, remote_path: &str) -> String {
        if !self.is_enabled() {
            return remote_path.to_owned();
        }
        let remote_root = self.remote_root.trim_end_matches(SEPARATOR);
        let Some(remainder) = remote_path.strip_prefix(remote_root) else {
            return remote_path.to_owned();
        };
        // "/media" must not match "/mediaroot/...".
        if !(remainder.is_empty() || remainder.starts_with(SEPARATOR)) {
            return remote_path.to_owned();
        }
        let local_root = self.local_root.trim_end_matches(SEPARATOR);
        if local_root.is_empty() && remainder.is_empty() {
            return SEPARATOR.to_string();
        }
        let mut local = String::with_capacity(local_root.len() + remainder.len());
        local.push_str(local_root);
        local.push_str(remainder);
        local
    }
}

/// Free-function form of [`PathMapping::translate`].
pub fn translate(remote_path: &str, mapping: &PathMapping) -> String {
    let local = mapping.translate(remote_path);
    if local != remote_path {
        tracing::debug!("remote path: {remote_path} -> {local}");
    } else {
        tracing::debug!("remote path: {remote_path}");
    }
    local
}

#[cfg(test)]
mod tests {
    use super::*;

    fn music() -> PathMapping {
        PathMapping::new("/media/music", "/music")
    }

    #[test]
    fn replaces_prefix_and_keeps_remainder() {
        assert_eq!(translate("/media/music/x/1.flac", &music()), "/music/x/1.flac");
        assert_eq!(
            translate("/media/music/Ünïcode Artist/a  b.mp3", &music()),
            "/music/Ünïcode Artist/a  b.mp3"
        );
    }

    #[test]
    fn identity_outside_prefix() {
        assert_eq!(translate("/srv/other/1.flac", &music()), "/srv/other/1.flac");
        assert_eq!(translate("relative/1.flac", &music()), "relative/1.flac");
        assert_eq!(translate("", &music()), "");
    }

    #[test]
    fn prefix_match_is_boundary_aware() {
        let mapping = PathMapping::new("/media", "/music");
        assert_eq!(translate("/mediaroot/x.flac", &mapping), "/mediaroot/x.flac");
        assert_eq!(translate("/media/x.flac", &mapping), "/music/x.flac");
    }

    #[test]
    fn exact_root_maps_to_local_root() {
        assert_eq!(translate("/media/music", &music()), "/music");
    }

    #[test]
    fn trailing_separators_do_not_double_up() {
        let mapping = PathMapping::new("/media/music/", "/music/");
        assert_eq!(translate("/media/music/x/1.flac", &mapping), "/music/x/1.flac");
    }

    #[test]
    fn filesystem_root_mappings() {
        let from_root = PathMapping::new("/", "/mnt/plex");
        assert_eq!(translate("/x/1.flac", &from_root), "/mnt/plex/x/1.flac");

        let to_root = PathMapping::new("/media", "/");
        assert_eq!(translate("/media/x/1.flac", &to_root), "/x/1.flac");
        assert_eq!(translate("/media", &to_root), "/");
    }

    #[test]
    fn empty_roots_disable_translation() {
        let no_local = PathMapping::new("/media/music", "");
        assert_eq!(translate("/media/music/1.flac", &no_local), "/media/music/1.flac");

        let no_remote = PathMapping::new("", "/music");
        assert_eq!(translate("/media/music/1.flac", &no_remote), "/media/music/1.flac");
        assert!(!PathMapping::default().is_enabled());
    }
}
