//! Collaborator seams the session talks through
//!
//! The session never reaches for global state: the credential, the
//! recommendation transport and the side-effect sinks are all injected.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tunedeck_discovery_client::{Decision, DiscoveryResult, Filters, Track};

/// Supplies the bearer credential, if one is available yet
pub trait CredentialProvider: Send + Sync {
    fn access_token(&self) -> Option<String>;
}

/// Remote source of recommendations
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    async fn next_track(&self, token: &str, filters: &Filters) -> DiscoveryResult<Track>;
}

/// Sink for swipe decision logs
#[async_trait]
pub trait InteractionLogger: Send + Sync {
    async fn log_decision(
        &self,
        token: &str,
        track: &Track,
        decision: Decision,
    ) -> DiscoveryResult<()>;
}

/// Adds liked tracks to the user's playlist
#[async_trait]
pub trait PlaylistAssociator: Send + Sync {
    /// Returns `Ok(false)` when there was nothing to associate with
    async fn associate(&self, token: &str, track: &Track) -> DiscoveryResult<bool>;
}

/// A credential fixed at construction
#[derive(Clone)]
pub struct StaticCredential(String);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticCredential([REDACTED])")
    }
}

impl CredentialProvider for StaticCredential {
    fn access_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// A credential slot the auth flow fills in once sign-in completes
#[derive(Clone, Default)]
pub struct SharedCredential {
    inner: Arc<RwLock<Option<String>>>,
}

impl SharedCredential {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new credential; blank values clear the slot
    pub fn set(&self, token: impl Into<String>) {
        let token = token.into();
        *self.inner.write() = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
    }

    pub fn clear(&self) {
        *self.inner.write() = None;
    }
}

impl std::fmt::Debug for SharedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedCredential")
            .field("present", &self.inner.read().is_some())
            .finish()
    }
}

impl CredentialProvider for SharedCredential {
    fn access_token(&self) -> Option<String> {
        self.inner.read().clone()
    }
}

/// Side-effect sink that does nothing, for hosts without logging or playlists
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

#[async_trait]
impl InteractionLogger for Noop {
    async fn log_decision(&self, _: &str, _: &Track, _: Decision) -> DiscoveryResult<()> {
        Ok(())
    }
}

#[async_trait]
impl PlaylistAssociator for Noop {
    async fn associate(&self, _: &str, _: &Track) -> DiscoveryResult<bool> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_credential_fills_later() {
        let credential = SharedCredential::new();
        let handle = credential.clone();
        assert!(credential.access_token().is_none());

        handle.set("abc");
        assert_eq!(credential.access_token().as_deref(), Some("abc"));

        handle.set("  ");
        assert!(credential.access_token().is_none());
    }

    #[test]
    fn test_credentials_redact_in_debug() {
        let debug_str = format!("{:?}", StaticCredential::new("secret"));
        assert!(!debug_str.contains("secret"));

        let shared = SharedCredential::new();
        shared.set("secret");
        let debug_str = format!("{:?}", shared);
        assert!(!debug_str.contains("secret"));
        assert!(debug_str.contains("present: true"));
    }
}
