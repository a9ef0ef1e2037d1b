//! Collaborator implementations backed by the discovery HTTP client

use async_trait::async_trait;
use tunedeck_discovery_client::{Decision, DiscoveryClient, DiscoveryResult, Filters, Track};

use crate::collaborators::{InteractionLogger, PlaylistAssociator, RecommendationSource};

#[async_trait]
impl RecommendationSource for DiscoveryClient {
    async fn next_track(&self, token: &str, filters: &Filters) -> DiscoveryResult<Track> {
        self.recommend(token, filters).await
    }
}

#[async_trait]
impl InteractionLogger for DiscoveryClient {
    async fn log_decision(
        &self,
        token: &str,
        track: &Track,
        decision: Decision,
    ) -> DiscoveryResult<()> {
        let record = self.interaction_for(track, decision);
        self.log_interaction(token, &record).await
    }
}

#[async_trait]
impl PlaylistAssociator for DiscoveryClient {
    async fn associate(&self, token: &str, track: &Track) -> DiscoveryResult<bool> {
        self.add_to_active_playlist(token, track).await
    }
}
