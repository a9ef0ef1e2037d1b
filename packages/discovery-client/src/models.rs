//! Discovery API models

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A recommendable track as returned by the discovery backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Backend track identifier
    pub id: String,
    /// International Standard Recording Code
    #[serde(default)]
    pub isrc: Option<String>,
    /// Track title
    pub title: String,
    /// URL of a short audio preview
    #[serde(default)]
    pub preview_url: Option<String>,
    /// Credited artists, primary first
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Album the track appears on
    #[serde(default)]
    pub album: Option<Album>,
    /// Beats per minute
    #[serde(default)]
    pub bpm: Option<f64>,
    /// Loudness normalization gain in dB
    #[serde(default)]
    pub gain: Option<f64>,
}

/// Artist credit on a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub name: String,
}

/// Album metadata with cover art
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Track {
    /// Artist names joined for display, e.g. "Daft Punk, Pharrell Williams"
    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Album name, if known
    pub fn album_name(&self) -> Option<&str> {
        self.album.as_ref().map(|a| a.name.as_str())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.artists.is_empty() {
            write!(f, "{}", self.title)
        } else {
            write!(f, "{} - {}", self.artist_names(), self.title)
        }
    }
}

/// The user's swipe outcome for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Like,
    Dislike,
    Skip,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Dislike => "dislike",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "dislike" => Ok(Self::Dislike),
            "skip" => Ok(Self::Skip),
            other => Err(format!("unknown decision '{}'", other)),
        }
    }
}

/// Genre and language constraints sent with each recommendation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub genres: BTreeSet<String>,
    pub languages: BTreeSet<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a genre; blank values are ignored
    pub fn genre(mut self, genre: impl AsRef<str>) -> Self {
        let genre = genre.as_ref().trim();
        if !genre.is_empty() {
            self.genres.insert(genre.to_string());
        }
        self
    }

    /// Add a language; blank values are ignored
    pub fn language(mut self, language: impl AsRef<str>) -> Self {
        let language = language.as_ref().trim();
        if !language.is_empty() {
            self.languages.insert(language.to_string());
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty() && self.languages.is_empty()
    }

    /// Query pairs with repeated `genres` and `languages` keys
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        self.genres
            .iter()
            .map(|g| ("genres", g.as_str()))
            .chain(self.languages.iter().map(|l| ("languages", l.as_str())))
            .collect()
    }
}

/// Interaction log entry posted after every decision
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRecord {
    pub isrc: Option<String>,
    pub decision: Decision,
    pub track_id: String,
    pub source: String,
    pub preview_url: Option<String>,
    pub artist: String,
    pub title: String,
    pub album: Option<String>,
    pub bpm: Option<f64>,
    pub gain: Option<f64>,
}

impl InteractionRecord {
    /// Build a log entry for `track` tagged with `source`
    pub fn new(track: &Track, decision: Decision, source: impl Into<String>) -> Self {
        Self {
            isrc: track.isrc.clone(),
            decision,
            track_id: track.id.clone(),
            source: source.into(),
            preview_url: track.preview_url.clone(),
            artist: track.artist_names(),
            title: track.title.clone(),
            album: track.album_name().map(str::to_string),
            bpm: track.bpm,
            gain: track.gain,
        }
    }
}

/// Body for adding a track to a playlist
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistTrackRequest<'a> {
    pub track_id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_track() -> Track {
        serde_json::from_value(json!({
            "id": "trk-1",
            "isrc": "USUM71703861",
            "title": "Get Lucky",
            "previewUrl": "https://cdn.example.com/p/1.mp3",
            "artists": [{ "name": "Daft Punk" }, { "name": "Pharrell Williams" }],
            "album": { "name": "Random Access Memories", "imageUrl": "https://cdn.example.com/a/1.jpg" },
            "bpm": 116.0,
            "gain": -7.5
        }))
        .unwrap()
    }

    #[test]
    fn test_track_deserializes_minimal_shape() {
        let track: Track = serde_json::from_value(json!({ "id": "x", "title": "Untitled" })).unwrap();
        assert_eq!(track.id, "x");
        assert!(track.artists.is_empty());
        assert!(track.isrc.is_none());
        assert_eq!(track.to_string(), "Untitled");
    }

    #[test]
    fn test_track_display_joins_artists() {
        assert_eq!(
            sample_track().to_string(),
            "Daft Punk, Pharrell Williams - Get Lucky"
        );
    }

    #[test]
    fn test_decision_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Decision::Dislike).unwrap(), json!("dislike"));
        assert_eq!("LIKE".parse::<Decision>().unwrap(), Decision::Like);
        assert!("maybe".parse::<Decision>().is_err());
    }

    #[test]
    fn test_filters_query_pairs_repeat_keys() {
        let filters = Filters::new()
            .genre("rock")
            .genre("jazz")
            .genre("  ")
            .language("en");
        assert_eq!(
            filters.query_pairs(),
            vec![("genres", "jazz"), ("genres", "rock"), ("languages", "en")]
        );
        assert!(Filters::new().is_empty());
    }

    #[test]
    fn test_interaction_record_wire_fields() {
        let record = InteractionRecord::new(&sample_track(), Decision::Like, "swipe");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["isrc"], "USUM71703861");
        assert_eq!(value["decision"], "like");
        assert_eq!(value["trackId"], "trk-1");
        assert_eq!(value["source"], "swipe");
        assert_eq!(value["artist"], "Daft Punk, Pharrell Williams");
        assert_eq!(value["album"], "Random Access Memories");
        assert_eq!(value["bpm"], 116.0);
        assert_eq!(value["gain"], -7.5);
    }
}
