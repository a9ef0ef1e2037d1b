//! Locally persisted listening preferences
//!
//! The host owns persistence; this type only holds the current values so
//! the client can read them while handling decisions.

use std::sync::Arc;

use parking_lot::RwLock;

#[derive(Debug, Clone)]
struct PreferenceState {
    active_playlist_id: Option<String>,
    muted: bool,
    volume: f32,
}

impl Default for PreferenceState {
    fn default() -> Self {
        Self {
            active_playlist_id: None,
            muted: false,
            volume: 1.0,
        }
    }
}

/// Shared handle to user preferences
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    inner: Arc<RwLock<PreferenceState>>,
}

impl Preferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Playlist that liked tracks are added to
    pub fn active_playlist_id(&self) -> Option<String> {
        self.inner.read().active_playlist_id.clone()
    }

    /// Set or clear the active playlist; blank ids clear it
    pub fn set_active_playlist(&self, playlist_id: Option<String>) {
        let playlist_id = playlist_id.filter(|id| !id.trim().is_empty());
        self.inner.write().active_playlist_id = playlist_id;
    }

    pub fn is_muted(&self) -> bool {
        self.inner.read().muted
    }

    pub fn set_muted(&self, muted: bool) {
        self.inner.write().muted = muted;
    }

    pub fn volume(&self) -> f32 {
        self.inner.read().volume
    }

    /// Set playback volume, clamped to 0.0..=1.0. Non-finite values are ignored.
    pub fn set_volume(&self, volume: f32) {
        if volume.is_finite() {
            self.inner.write().volume = volume.clamp(0.0, 1.0);
        }
    }
}
