//! Mock discovery backend for testing the client and session
//!
//! Provides a [`MockDiscoveryServer`] that simulates the recommendation,
//! interaction log and playlist endpoints without a real backend.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Mock discovery backend
///
/// This struct wraps a [`wiremock::MockServer`] and provides convenience methods
/// for setting up common discovery API responses. Point the client's
/// `api_url` at [`MockDiscoveryServer::url`].
///
/// # Example
///
/// ```rust,ignore
/// use tunedeck_test_utils::{track_json, MockDiscoveryServer};
///
/// #[tokio::test]
/// async fn test_recommend() {
///     let server = MockDiscoveryServer::start().await;
///     server.mock_recommendation(track_json("t1")).await;
///     // Configure DiscoveryConfig::with_url(server.url())
/// }
/// ```
pub struct MockDiscoveryServer {
    server: MockServer,
}

impl MockDiscoveryServer {
    /// Start a new mock discovery server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get reference to the underlying mock server for custom mock setups
    pub fn inner(&self) -> &MockServer {
        &self.server
    }

    /// Serve `track` for every recommendation request
    pub async fn mock_recommendation(&self, track: Value) {
        Mock::given(method("GET"))
            .and(path("/recommendations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(track))
            .mount(&self.server)
            .await;
    }

    /// Serve `track` only when the request carries `Bearer <token>`
    pub async fn mock_recommendation_with_token(&self, token: &str, track: Value) {
        Mock::given(method("GET"))
            .and(path("/recommendations"))
            .and(header("authorization", format!("Bearer {}", token).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(track))
            .mount(&self.server)
            .await;
    }

    /// Serve `track` only when `genres=<genre>` is in the query
    pub async fn mock_recommendation_for_genre(&self, genre: &str, track: Value) {
        Mock::given(method("GET"))
            .and(path("/recommendations"))
            .and(query_param("genres", genre))
            .respond_with(ResponseTemplate::new(200).set_body_json(track))
            .mount(&self.server)
            .await;
    }

    /// Serve each track once, in order
    pub async fn mock_recommendation_sequence(&self, tracks: Vec<Value>) {
        for track in tracks {
            Mock::given(method("GET"))
                .and(path("/recommendations"))
                .respond_with(ResponseTemplate::new(200).set_body_json(track))
                .up_to_n_times(1)
                .mount(&self.server)
                .await;
        }
    }

    /// Serve `track` once after `delay_ms`
    pub async fn mock_recommendation_delayed(&self, track: Value, delay_ms: u64) {
        Mock::given(method("GET"))
            .and(path("/recommendations"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_millis(delay_ms))
                    .set_body_json(track),
            )
            .up_to_n_times(1)
            .mount(&self.server)
            .await;
    }

    /// Fail recommendation requests with `status_code`
    pub async fn mock_recommendation_failure(&self, status_code: u16, error_message: &str) {
        Mock::given(method("GET"))
            .and(path("/recommendations"))
            .respond_with(ResponseTemplate::new(status_code).set_body_json(json!({
                "error": error_message
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer recommendation requests with 204 No Content
    pub async fn mock_no_recommendation(&self) {
        Mock::given(method("GET"))
            .and(path("/recommendations"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    /// Accept interaction logs
    pub async fn mock_interactions_ok(&self) {
        Mock::given(method("POST"))
            .and(path("/interactions"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&self.server)
            .await;
    }

    /// Reject interaction logs with `status_code`
    pub async fn mock_interactions_failure(&self, status_code: u16) {
        Mock::given(method("POST"))
            .and(path("/interactions"))
            .respond_with(ResponseTemplate::new(status_code).set_body_json(json!({
                "error": "interaction log unavailable"
            })))
            .mount(&self.server)
            .await;
    }

    /// Accept tracks added to `playlist_id`
    pub async fn mock_playlist_add_ok(&self, playlist_id: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/playlists/{}/tracks", playlist_id)))
            .respond_with(ResponseTemplate::new(204))
            .mount(&self.server)
            .await;
    }

    /// Fail `times` playlist additions with `status_code`, then fall through to later mocks
    pub async fn mock_playlist_add_failure(
        &self,
        playlist_id: &str,
        status_code: u16,
        times: u64,
    ) {
        Mock::given(method("POST"))
            .and(path(format!("/playlists/{}/tracks", playlist_id)))
            .respond_with(ResponseTemplate::new(status_code))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    async fn requests_to(&self, http_method: &str, prefix: &str) -> Vec<Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|r| {
                r.method.to_string().eq_ignore_ascii_case(http_method)
                    && r.url.path().starts_with(prefix)
            })
            .collect()
    }

    /// Recommendation requests received so far
    pub async fn recommendation_requests(&self) -> Vec<Request> {
        self.requests_to("GET", "/recommendations").await
    }

    /// JSON bodies of interaction logs received so far
    pub async fn interaction_bodies(&self) -> Vec<Value> {
        self.requests_to("POST", "/interactions")
            .await
            .iter()
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }

    /// JSON bodies of playlist additions received so far
    pub async fn playlist_bodies(&self) -> Vec<Value> {
        self.requests_to("POST", "/playlists/")
            .await
            .iter()
            .filter_map(|r| serde_json::from_slice(&r.body).ok())
            .collect()
    }
}
