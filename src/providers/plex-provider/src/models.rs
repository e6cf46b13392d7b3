use serde::{Deserialize, Deserializer};

/// Every Plex JSON response is wrapped in a `MediaContainer`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: T,
}

#[derive(Debug, Deserialize)]
pub struct SectionContainer {
    #[serde(rename = "Directory", default)]
    pub directories: Vec<Section>,
}

#[derive(Debug, Deserialize)]
pub struct Section {
    #[serde(deserialize_with = "string_or_number")]
    pub key: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MetadataContainer<T> {
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(rename = "Metadata", default = "Vec::new")]
    pub metadata: Vec<T>,
}

#[derive(Debug, Deserialize)]
pub struct Playlist {
    #[serde(rename = "ratingKey", deserialize_with = "string_or_number")]
    pub rating_key: String,
    pub title: String,
    #[serde(rename = "playlistType", default)]
    pub playlist_type: Option<String>,
    #[serde(rename = "leafCount", default)]
    pub leaf_count: Option<u32>,
    #[serde(default)]
    pub smart: bool,
}

#[derive(Debug, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "Media", default)]
    pub media: Vec<Media>,
}

#[derive(Debug, Deserialize)]
pub struct Media {
    #[serde(rename = "Part", default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub file: Option<String>,
}

// Plex sends keys as strings, some proxies rewrite them as numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Key {
        Text(String),
        Number(u64),
    }

    Ok(match Key::deserialize(deserializer)? {
        Key::Text(text) => text,
        Key::Number(number) => number.to_string(),
    })
}
