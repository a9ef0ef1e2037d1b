//! Swipe gesture to decision mapping
//!
//! Gesture recognition itself belongs to the UI toolkit. This module only
//! turns a finished pan (translation and release velocity) into a decision
//! and provides the card transform values the renderer interpolates.

use tunedeck_discovery_client::Decision;

/// A finished pan gesture on the card, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwipeGesture {
    pub translation_x: f32,
    pub translation_y: f32,
    /// Horizontal release velocity in px/s
    pub velocity_x: f32,
}

/// Thresholds for committing a swipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub card_width: f32,
    /// Fraction of the card width a pan must travel to commit
    pub distance_ratio: f32,
    /// Release velocity that commits a horizontal swipe regardless of distance
    pub velocity_threshold: f32,
    pub max_rotation_deg: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            card_width: 360.0,
            distance_ratio: 0.25,
            velocity_threshold: 800.0,
            max_rotation_deg: 10.0,
        }
    }
}

impl GestureConfig {
    pub fn with_card_width(card_width: f32) -> Self {
        Self {
            card_width,
            ..Self::default()
        }
    }

    fn distance_threshold(&self) -> f32 {
        self.card_width * self.distance_ratio
    }

    /// Map a released gesture to a decision; `None` means the card springs back
    pub fn resolve(&self, gesture: &SwipeGesture) -> Option<Decision> {
        let dx = gesture.translation_x;
        let dy = gesture.translation_y;
        if !(dx.is_finite() && dy.is_finite() && gesture.velocity_x.is_finite()) {
            return None;
        }

        let threshold = self.distance_threshold();
        if -dy > threshold && -dy > dx.abs() {
            return Some(Decision::Skip);
        }

        let flung = gesture.velocity_x.abs() >= self.velocity_threshold
            && gesture.velocity_x.signum() == dx.signum();
        if dx.abs() > threshold || (flung && dx != 0.0) {
            return Some(if dx > 0.0 {
                Decision::Like
            } else {
                Decision::Dislike
            });
        }

        None
    }

    /// Card rotation in degrees for a horizontal offset
    ///
    /// Linear from `-max_rotation_deg` at half a card width left to
    /// `max_rotation_deg` at half a card width right, clamped beyond.
    pub fn rotation_for(&self, translation_x: f32) -> f32 {
        let half = self.card_width / 2.0;
        if half <= 0.0 || !translation_x.is_finite() {
            return 0.0;
        }
        (translation_x / half).clamp(-1.0, 1.0) * self.max_rotation_deg
    }

    /// Opacity of the like (positive offset) or dislike (negative) badge
    pub fn overlay_opacity(&self, translation_x: f32) -> f32 {
        let threshold = self.distance_threshold();
        if threshold <= 0.0 || !translation_x.is_finite() {
            return 0.0;
        }
        (translation_x.abs() / threshold).clamp(0.0, 1.0)
    }
}
