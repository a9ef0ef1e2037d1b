//! Discovery backend client for Tunedeck
//!
//! This crate provides the HTTP transport for the swipe session:
//! - Fetching one recommended track for a set of filters
//! - Posting interaction logs for swipe decisions
//! - Adding liked tracks to the user's active playlist
//!
//! # Example
//!
//! ```rust,no_run
//! use tunedeck_discovery_client::{DiscoveryClient, Filters};
//! use tunedeck_shared_config::DiscoveryConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = DiscoveryClient::new(&DiscoveryConfig::default())?;
//!
//! let filters = Filters::new().genre("house").language("en");
//! let track = client.recommend("bearer-token", &filters).await?;
//! println!("Now showing: {}", track);
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! - `DISCOVERY_API_URL`: Base URL of the discovery API
//! - `DISCOVERY_TIMEOUT`: Request timeout in seconds
//! - `DISCOVERY_SOURCE_TAG`: Source tag attached to interaction logs

mod client;
mod error;
mod models;
mod preferences;

pub use client::DiscoveryClient;
pub use error::{DiscoveryError, DiscoveryResult};
pub use models::{Album, Artist, Decision, Filters, InteractionRecord, Track};
pub use preferences::Preferences;
