use crate::models::{Playlist, Track};
use plexquery_core::models::{PlaylistId, RemotePlaylist, RemoteTrackRef};
use std::borrow::Cow;

pub fn map_playlist(playlist: &Playlist) -> Option<RemotePlaylist> {
    let Ok(id) = playlist.rating_key.parse::<u64>() else {
        tracing::warn!(
            rating_key = %playlist.rating_key,
            title = %playlist.title,
            "skipping playlist with non-numeric ratingKey"
        );
        return None;
    };
    Some(RemotePlaylist {
        id: PlaylistId::new(id),
        name: playlist.title.clone(),
        track_count: playlist.leaf_count,
        smart: playlist.smart,
    })
}

/// One ref per media part; a track without parts yields a single file-less ref.
pub fn map_track_refs(track: &Track) -> Vec<RemoteTrackRef> {
    let refs: Vec<RemoteTrackRef> = track
        .media
        .iter()
        .flat_map(|media| media.parts.iter())
        .filter_map(|part| part.file.as_deref())
        .map(|file| RemoteTrackRef::new(track.title.clone(), repair_mojibake(file)))
        .collect();
    if refs.is_empty() {
        vec![RemoteTrackRef::without_file(track.title.clone())]
    } else {
        refs
    }
}

/// Undoes UTF-8 bytes that were decoded as Latin-1 somewhere upstream.
///
/// Text that is not such a misdecoding comes back unchanged.
pub fn repair_mojibake(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }
    let bytes: Option<Vec<u8>> = text.chars().map(|c| u8::try_from(c).ok()).collect();
    match bytes.and_then(|b| String::from_utf8(b).ok()) {
        Some(repaired) => Cow::Owned(repaired),
        None => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Envelope, MetadataContainer};

    #[test]
    fn maps_playlists() {
        let body = r#"{"MediaContainer":{"size":2,"Metadata":[
            {"ratingKey":"12345","title":"Chill Vibes","playlistType":"audio","leafCount":2,"smart":false},
            {"ratingKey":"not-a-number","title":"Broken"}
        ]}}"#;
        let envelope: Envelope<MetadataContainer<Playlist>> = serde_json::from_str(body).unwrap();
        let mapped: Vec<_> = envelope
            .media_container
            .metadata
            .iter()
            .filter_map(map_playlist)
            .collect();
        assert_eq!(
            mapped,
            vec![RemotePlaylist {
                id: PlaylistId::new(12345),
                name: "Chill Vibes".into(),
                track_count: Some(2),
                smart: false,
            }]
        );
    }

    #[test]
    fn every_part_becomes_a_ref() {
        let body = r#"{"MediaContainer":{"Metadata":[
            {"title":"Split","Media":[{"Part":[{"file":"/m/a.flac"},{"file":"/m/b.flac"}]}]},
            {"title":"Stream","Media":[]},
            {"title":"Bare"}
        ]}}"#;
        let envelope: Envelope<MetadataContainer<Track>> = serde_json::from_str(body).unwrap();
        let refs: Vec<_> = envelope
            .media_container
            .metadata
            .iter()
            .flat_map(map_track_refs)
            .collect();
        assert_eq!(
            refs,
            vec![
                RemoteTrackRef::new("Split", "/m/a.flac"),
                RemoteTrackRef::new("Split", "/m/b.flac"),
                RemoteTrackRef::without_file("Stream"),
                RemoteTrackRef::without_file("Bare"),
            ]
        );
    }

    #[test]
    fn repairs_latin1_decoded_utf8() {
        assert_eq!(repair_mojibake("/m/BjÃ¶rk/01.flac"), "/m/Björk/01.flac");
        assert_eq!(repair_mojibake("/m/Björk/01.flac"), "/m/Björk/01.flac");
        assert_eq!(repair_mojibake("/m/坂本龍一.flac"), "/m/坂本龍一.flac");
        assert!(matches!(repair_mojibake("/m/plain.flac"), Cow::Borrowed(_)));
    }
}
