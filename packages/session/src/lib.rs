//! Recommendation session for Tunedeck
//!
//! The session shows one recommended track at a time, keeps a linear undo
//! history and turns swipe decisions into interaction logs, playlist
//! additions and the next fetch.
//!
//! # Concurrency
//!
//! `RecommendationSession` is `Clone + Send + Sync`. State lives behind a
//! single lock that is never held across an await. The last `fetch` call
//! wins: earlier in-flight requests are cancelled and any late result is
//! dropped. Other threads hand decisions over through
//! [`spawn_session_driver`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use tunedeck_discovery_client::{Decision, DiscoveryClient, Filters};
//! use tunedeck_session::{SessionBuilder, SharedCredential};
//! use tunedeck_shared_config::DiscoveryConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = SharedCredential::new();
//! credential.set("bearer-token");
//!
//! let client = DiscoveryClient::new(&DiscoveryConfig::default())?;
//! let session = SessionBuilder::with_client(client, Arc::new(credential)).build();
//!
//! let track = session.fetch(Filters::new().genre("ambient")).await?;
//! let next = session.decide(track, Decision::Like).await?;
//! println!("Up next: {}", next);
//! # Ok(())
//! # }
//! ```

mod client;
mod collaborators;
mod driver;
mod error;
pub mod gesture;
mod retry;
mod session;
mod state;

pub use collaborators::{
    CredentialProvider, InteractionLogger, Noop, PlaylistAssociator, RecommendationSource,
    SharedCredential, StaticCredential,
};
pub use driver::{spawn_session_driver, SessionCommand};
pub use error::{SessionError, SessionResult};
pub use retry::RetryPolicy;
pub use session::{RecommendationSession, SessionBuilder};
pub use state::{LoadStatus, SessionSnapshot};
