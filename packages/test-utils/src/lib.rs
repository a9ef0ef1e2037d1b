//! Shared test utilities for Tunedeck workspace
//!
//! This crate provides a mock discovery backend and track fixtures so the
//! client and session test suites run without network dependencies.
//!
//! # Example
//!
//! ```rust,ignore
//! use tunedeck_test_utils::{MockDiscoveryServer, TrackFixture};
//!
//! #[tokio::test]
//! async fn test_with_mocks() {
//!     let server = MockDiscoveryServer::start().await;
//!     server.mock_recommendation(TrackFixture::new("t1").json()).await;
//!
//!     // Use server.url() to configure your client
//! }
//! ```

mod discovery;
mod fixtures;

pub use discovery::MockDiscoveryServer;
pub use fixtures::{track_json, TrackFixture};
