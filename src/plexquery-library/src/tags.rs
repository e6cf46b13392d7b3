use lofty::{Accessor, AudioFile, ItemKey, Probe, TaggedFileExt};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub length_seconds: Option<u32>,
    pub track_number: Option<u32>,
}

/// Reads whatever tags lofty understands. Unreadable files yield no tags.
pub fn parse_tags(path: &Path) -> ParsedTags {
    let tagged = match Probe::open(path).and_then(|p| p.read()) {
        Ok(tagged) => tagged,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "no readable tags");
            return ParsedTags::default();
        }
    };

    let tag = tagged.primary_tag().or_else(|| tagged.first_tag());
    let properties = tagged.properties();

    ParsedTags {
        title: tag.and_then(|t| t.get_string(&ItemKey::TrackTitle).map(str::to_string)),
        artist: tag.and_then(|t| t.artist().map(|s| s.to_string())),
        album: tag.and_then(|t| t.album().map(|s| s.to_string())),
        length_seconds: u32::try_from(properties.duration().as_secs()).ok(),
        track_number: tag.and_then(|t| t.track()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_file_has_no_tags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.mp3");
        std::fs::write(&path, b"not really audio").unwrap();
        assert_eq!(parse_tags(&path), ParsedTags::default());
    }

    #[test]
    fn missing_file_has_no_tags() {
        assert_eq!(
            parse_tags(Path::new("/definitely/not/here.flac")),
            ParsedTags::default()
        );
    }
}
