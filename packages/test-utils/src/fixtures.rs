//! Track fixtures in the discovery backend's JSON shape

use serde_json::{json, Value};

/// Builder for track JSON as served by the recommendation endpoint
#[derive(Debug, Clone)]
pub struct TrackFixture {
    id: String,
    title: String,
    isrc: Option<String>,
    artists: Vec<String>,
    album: Option<String>,
    bpm: Option<f64>,
    gain: Option<f64>,
}

impl TrackFixture {
    /// Track with a derived title, ISRC and a single artist
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            title: format!("Track {}", id),
            isrc: Some(format!("TEST{}", id.to_uppercase())),
            artists: vec!["Test Artist".to_string()],
            album: Some("Test Album".to_string()),
            bpm: Some(120.0),
            gain: Some(-6.0),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn isrc(mut self, isrc: Option<&str>) -> Self {
        self.isrc = isrc.map(str::to_string);
        self
    }

    pub fn artists(mut self, artists: &[&str]) -> Self {
        self.artists = artists.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn album(mut self, album: Option<&str>) -> Self {
        self.album = album.map(str::to_string);
        self
    }

    pub fn bpm(mut self, bpm: Option<f64>) -> Self {
        self.bpm = bpm;
        self
    }

    /// Render the fixture as backend JSON
    pub fn json(&self) -> Value {
        json!({
            "id": self.id,
            "isrc": self.isrc,
            "title": self.title,
            "previewUrl": format!("https://cdn.example.com/preview/{}.mp3", self.id),
            "artists": self.artists.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
            "album": self.album.as_ref().map(|name| json!({
                "name": name,
                "imageUrl": format!("https://cdn.example.com/art/{}.jpg", self.id),
            })),
            "bpm": self.bpm,
            "gain": self.gain,
        })
    }
}

/// Shorthand for `TrackFixture::new(id).json()`
pub fn track_json(id: &str) -> Value {
    TrackFixture::new(id).json()
}
