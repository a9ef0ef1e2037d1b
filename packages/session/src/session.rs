//! Recommendation session
//!
//! Holds the track on screen, a linear undo history and the load status.
//! Fetches run concurrently but only the most recent one may touch state:
//! every fetch starts a new generation and cancels the previous request's
//! token, and a completing request re-checks its generation under the lock
//! before applying anything.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use tunedeck_discovery_client::{Decision, DiscoveryClient, Filters, Track};
use tunedeck_shared_config::SessionConfig;

use crate::collaborators::{
    CredentialProvider, InteractionLogger, Noop, PlaylistAssociator, RecommendationSource,
};
use crate::error::{SessionError, SessionResult};
use crate::retry::RetryPolicy;
use crate::state::{LoadStatus, SessionSnapshot, SessionState};

/// Builder for [`RecommendationSession`]
///
/// The recommendation source and credential are required; the interaction
/// logger and playlist associator default to no-ops.
pub struct SessionBuilder {
    source: Arc<dyn RecommendationSource>,
    credentials: Arc<dyn CredentialProvider>,
    logger: Arc<dyn InteractionLogger>,
    associator: Arc<dyn PlaylistAssociator>,
    config: SessionConfig,
}

impl SessionBuilder {
    pub fn new(
        source: Arc<dyn RecommendationSource>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            source,
            credentials,
            logger: Arc::new(Noop),
            associator: Arc::new(Noop),
            config: SessionConfig::default(),
        }
    }

    /// Use one discovery client for recommendations, logging and playlists
    pub fn with_client(client: DiscoveryClient, credentials: Arc<dyn CredentialProvider>) -> Self {
        let client = Arc::new(client);
        Self::new(client.clone(), credentials)
            .logger(client.clone())
            .associator(client)
    }

    pub fn logger(mut self, logger: Arc<dyn InteractionLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn associator(mut self, associator: Arc<dyn PlaylistAssociator>) -> Self {
        self.associator = associator;
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> RecommendationSession {
        let state = SessionState::default();
        let (snapshots, _) = watch::channel(state.snapshot());

        RecommendationSession {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                snapshots,
                source: self.source,
                credentials: self.credentials,
                logger: self.logger,
                associator: self.associator,
                token_wait: RetryPolicy::from_config(&self.config),
                history_limit: self.config.history_limit,
                shutdown: CancellationToken::new(),
            }),
        }
    }
}

struct Inner {
    state: Mutex<SessionState>,
    snapshots: watch::Sender<SessionSnapshot>,
    source: Arc<dyn RecommendationSource>,
    credentials: Arc<dyn CredentialProvider>,
    logger: Arc<dyn InteractionLogger>,
    associator: Arc<dyn PlaylistAssociator>,
    token_wait: RetryPolicy,
    history_limit: Option<usize>,
    shutdown: CancellationToken,
}

/// Client-side swipe session
///
/// Cloning is cheap and every clone drives the same session.
#[derive(Clone)]
pub struct RecommendationSession {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RecommendationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecommendationSession")
            .field("state", &self.snapshot())
            .field("token_wait", &self.inner.token_wait)
            .finish()
    }
}

impl RecommendationSession {
    /// Fetch the next recommendation, superseding any fetch still in flight
    ///
    /// # Errors
    /// - `SessionError::TokenTimeout` if no credential shows up within the wait budget
    /// - `SessionError::Network` on transport or backend failure
    /// - `SessionError::Cancelled` if a newer fetch or shutdown superseded this one
    #[instrument(skip(self))]
    pub async fn fetch(&self, filters: Filters) -> SessionResult<Track> {
        if self.inner.shutdown.is_cancelled() {
            return Err(SessionError::Cancelled);
        }

        let cancel = self.inner.shutdown.child_token();
        let generation = {
            let mut state = self.inner.state.lock();
            let generation = state.begin_fetch(filters.clone(), cancel.clone());
            self.publish(&state);
            generation
        };
        debug!(generation, "Fetching recommendation");

        let result = self.request(&cancel, &filters).await;
        self.complete(generation, &cancel, result)
    }

    async fn request(&self, cancel: &CancellationToken, filters: &Filters) -> SessionResult<Track> {
        let credentials = &self.inner.credentials;
        let token = self
            .inner
            .token_wait
            .poll(cancel, || credentials.access_token())
            .await?;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SessionError::Cancelled),
            result = self.inner.source.next_track(&token, filters) => result.map_err(SessionError::from),
        }
    }

    fn complete(
        &self,
        generation: u64,
        cancel: &CancellationToken,
        result: SessionResult<Track>,
    ) -> SessionResult<Track> {
        let mut state = self.inner.state.lock();
        if !state.is_current(generation) || cancel.is_cancelled() {
            debug!(generation, "Dropping superseded recommendation result");
            return Err(SessionError::Cancelled);
        }

        match result {
            Ok(track) => {
                state.apply_track(track.clone(), self.inner.history_limit);
                info!(
                    track_id = %track.id,
                    position = state.position,
                    history_len = state.history.len(),
                    "Recommendation ready"
                );
                self.publish(&state);
                Ok(track)
            }
            Err(SessionError::Cancelled) => Err(SessionError::Cancelled),
            Err(e) => {
                warn!(error = %e, "Recommendation fetch failed");
                state.apply_error(e.to_string());
                self.publish(&state);
                Err(e)
            }
        }
    }

    /// Step back to the previous track; returns whether anything changed
    ///
    /// The position counter is left alone.
    pub fn undo(&self) -> bool {
        let mut state = self.inner.state.lock();
        let undone = state.undo();
        if undone {
            debug!(history_len = state.history.len(), "Restored previous track");
            self.publish(&state);
        }
        undone
    }

    pub fn can_undo(&self) -> bool {
        self.inner.state.lock().can_undo()
    }

    /// Record a swipe decision and move on to the next track
    ///
    /// Logging and playlist association run in the background and never
    /// block or fail the fetch that follows.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn decide(&self, track: Track, decision: Decision) -> SessionResult<Track> {
        self.dispatch_side_effects(&track, decision);
        let filters = self.inner.state.lock().filters.clone();
        self.fetch(filters).await
    }

    fn dispatch_side_effects(&self, track: &Track, decision: Decision) {
        let Some(token) = self.inner.credentials.access_token() else {
            warn!(track_id = %track.id, %decision, "No credential, decision not logged");
            return;
        };

        let logger = self.inner.logger.clone();
        let logged = track.clone();
        let log_token = token.clone();
        tokio::spawn(async move {
            if let Err(e) = logger.log_decision(&log_token, &logged, decision).await {
                warn!(track_id = %logged.id, %decision, error = %e, "Failed to log interaction");
            }
        });

        if decision == Decision::Like {
            let associator = self.inner.associator.clone();
            let liked = track.clone();
            tokio::spawn(async move {
                match associator.associate(&token, &liked).await {
                    Ok(true) => debug!(track_id = %liked.id, "Liked track added to playlist"),
                    Ok(false) => {}
                    Err(e) => warn!(track_id = %liked.id, error = %e, "Playlist association failed"),
                }
            });
        }
    }

    /// Cancel any in-flight fetch and refuse further ones
    pub fn shutdown(&self) {
        info!("Shutting down recommendation session");
        self.inner.shutdown.cancel();
        let mut state = self.inner.state.lock();
        if state.status == LoadStatus::Loading {
            state.status = if state.current.is_some() {
                LoadStatus::Ready
            } else {
                LoadStatus::Idle
            };
        }
        state.in_flight = None;
        self.publish(&state);
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.shutdown.is_cancelled()
    }

    /// Observe state changes
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshots.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.state.lock().snapshot()
    }

    pub fn current(&self) -> Option<Track> {
        self.inner.state.lock().current.clone()
    }

    pub fn history_len(&self) -> usize {
        self.inner.state.lock().history.len()
    }

    pub fn position(&self) -> u64 {
        self.inner.state.lock().position
    }

    pub fn status(&self) -> LoadStatus {
        self.inner.state.lock().status
    }

    pub fn error(&self) -> Option<String> {
        self.inner.state.lock().error.clone()
    }

    fn publish(&self, state: &SessionState) {
        self.inner.snapshots.send_replace(state.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use tokio::sync::mpsc;
    use tokio::time::Instant;
    use tunedeck_discovery_client::{DiscoveryError, DiscoveryResult};

    use crate::collaborators::{SharedCredential, StaticCredential};

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            isrc: Some(format!("ISRC{}", id)),
            title: format!("Track {}", id),
            preview_url: None,
            artists: vec![],
            album: None,
            bpm: None,
            gain: None,
        }
    }

    /// Serves scripted responses in order, each after its own delay
    #[derive(Default)]
    struct ScriptedSource {
        script: parking_lot::Mutex<VecDeque<(Duration, DiscoveryResult<Track>)>>,
        seen_tokens: parking_lot::Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn with(responses: Vec<(u64, DiscoveryResult<Track>)>) -> Arc<Self> {
            let script = responses
                .into_iter()
                .map(|(ms, r)| (Duration::from_millis(ms), r))
                .collect();
            Arc::new(Self {
                script: parking_lot::Mutex::new(script),
                seen_tokens: Default::default(),
            })
        }

        fn tracks(ids: &[&str]) -> Arc<Self> {
            Self::with(ids.iter().map(|id| (10, Ok(track(id)))).collect())
        }
    }

    #[async_trait]
    impl RecommendationSource for ScriptedSource {
        async fn next_track(&self, token: &str, _filters: &Filters) -> DiscoveryResult<Track> {
            self.seen_tokens.lock().push(token.to_string());
            let next = self.script.lock().pop_front();
            match next {
                Some((delay, result)) => {
                    tokio::time::sleep(delay).await;
                    result
                }
                None => Err(DiscoveryError::NoRecommendation),
            }
        }
    }

    struct RecordingLogger {
        tx: mpsc::UnboundedSender<(String, Option<String>, Decision)>,
        fail: bool,
    }

    #[async_trait]
    impl InteractionLogger for RecordingLogger {
        async fn log_decision(
            &self,
            _token: &str,
            track: &Track,
            decision: Decision,
        ) -> DiscoveryResult<()> {
            let _ = self.tx.send((track.id.clone(), track.isrc.clone(), decision));
            if self.fail {
                Err(DiscoveryError::Timeout)
            } else {
                Ok(())
            }
        }
    }

    struct RecordingAssociator {
        tx: mpsc::UnboundedSender<String>,
    }

    #[async_trait]
    impl PlaylistAssociator for RecordingAssociator {
        async fn associate(&self, _token: &str, track: &Track) -> DiscoveryResult<bool> {
            let _ = self.tx.send(track.id.clone());
            Err(DiscoveryError::Api {
                status: 500,
                message: "playlist store down".to_string(),
            })
        }
    }

    async fn wait_for_requests(source: &ScriptedSource, count: usize) {
        while source.seen_tokens.lock().len() < count {
            tokio::task::yield_now().await;
        }
    }

    fn session_with(source: Arc<ScriptedSource>) -> RecommendationSession {
        SessionBuilder::new(source, Arc::new(StaticCredential::new("token"))).build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_state() {
        let session = session_with(ScriptedSource::tracks(&[]));
        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, LoadStatus::Idle);
        assert!(snapshot.current.is_none());
        assert!(!session.can_undo());
        assert_eq!(session.position(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_fetches_grow_history_and_position() {
        let session = session_with(ScriptedSource::tracks(&["a", "b", "c", "d"]));
        for _ in 0..4 {
            session.fetch(Filters::new()).await.unwrap();
        }

        assert_eq!(session.history_len(), 3);
        assert_eq!(session.position(), 4);
        assert_eq!(session.current().unwrap().id, "d");
        assert_eq!(session.status(), LoadStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_undo_on_empty_history_is_noop() {
        let session = session_with(ScriptedSource::tracks(&["a"]));
        session.fetch(Filters::new()).await.unwrap();
        let before = session.snapshot();

        assert!(!session.undo());
        assert!(!session.undo());
        assert_eq!(session.snapshot(), before);
        assert!(!session.can_undo());
    }

    #[tokio::test(start_paused = true)]
    async fn test_undo_restores_previous_without_consuming_position() {
        let session = session_with(ScriptedSource::tracks(&["a", "b"]));
        session.fetch(Filters::new()).await.unwrap();
        session.fetch(Filters::new()).await.unwrap();

        assert!(session.undo());
        assert_eq!(session.current().unwrap().id, "a");
        assert_eq!(session.position(), 2);
        assert!(!session.can_undo());
    }

    #[tokio::test(start_paused = true)]
    async fn test_undo_then_fetch_shrinks_history() {
        let session = session_with(ScriptedSource::tracks(&["a", "b", "c", "d"]));
        for _ in 0..3 {
            session.fetch(Filters::new()).await.unwrap();
        }
        let before_undo = session.history_len();
        assert!(session.undo());
        session.fetch(Filters::new()).await.unwrap();

        assert_eq!(session.history_len(), before_undo - 1);
        assert_eq!(session.current().unwrap().id, "d");

        // Walking back never reaches the undone track
        assert!(session.undo());
        assert_eq!(session.current().unwrap().id, "a");
        assert!(!session.undo());
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_fetches_last_wins() {
        let source = ScriptedSource::with(vec![(300, Ok(track("slow"))), (50, Ok(track("fast")))]);
        let session = session_with(source.clone());

        let first = session.clone();
        let first_task = tokio::spawn(async move { first.fetch(Filters::new()).await });
        wait_for_requests(&source, 1).await;
        let second = session.fetch(Filters::new()).await;
        let first = first_task.await.unwrap();

        assert_matches!(first, Err(SessionError::Cancelled));
        assert_eq!(second.unwrap().id, "fast");
        assert_eq!(session.current().unwrap().id, "fast");
        assert_eq!(session.history_len(), 0);
        assert_eq!(session.position(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_error_does_not_surface() {
        let source = ScriptedSource::with(vec![
            (300, Err(DiscoveryError::Timeout)),
            (50, Ok(track("ok"))),
        ]);
        let session = session_with(source.clone());

        let first = session.clone();
        let first_task = tokio::spawn(async move { first.fetch(Filters::new()).await });
        wait_for_requests(&source, 1).await;
        session.fetch(Filters::new()).await.unwrap();
        assert_matches!(first_task.await.unwrap(), Err(SessionError::Cancelled));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(session.status(), LoadStatus::Ready);
        assert!(session.error().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_timeout_on_first_load() {
        let source = ScriptedSource::tracks(&["a"]);
        let session = SessionBuilder::new(source.clone(), Arc::new(SharedCredential::new())).build();

        let start = Instant::now();
        let result = session.fetch(Filters::new()).await;

        assert_matches!(result, Err(SessionError::TokenTimeout { .. }));
        assert_eq!(start.elapsed(), Duration::from_millis(2500));
        assert_eq!(session.status(), LoadStatus::Error);
        assert!(session.error().unwrap().contains("Timed out"));
        assert!(session.current().is_none());
        assert!(source.seen_tokens.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_arriving_late_is_picked_up() {
        let source = ScriptedSource::tracks(&["a"]);
        let credential = SharedCredential::new();
        let session = SessionBuilder::new(source.clone(), Arc::new(credential.clone())).build();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1200)).await;
            credential.set("late-token");
        });

        let track = session.fetch(Filters::new()).await.unwrap();
        assert_eq!(track.id, "a");
        assert_eq!(*source.seen_tokens.lock(), vec!["late-token".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_error_keeps_current() {
        let source = ScriptedSource::with(vec![
            (10, Ok(track("a"))),
            (10, Err(DiscoveryError::Api {
                status: 502,
                message: "bad gateway".to_string(),
            })),
        ]);
        let session = session_with(source);
        session.fetch(Filters::new()).await.unwrap();

        let result = session.fetch(Filters::new()).await;
        assert_matches!(result, Err(SessionError::Network(ref msg)) if msg.contains("bad gateway"));
        assert_eq!(session.status(), LoadStatus::Error);
        assert_eq!(session.current().unwrap().id, "a");
        assert_eq!(session.position(), 1);
        assert_eq!(session.history_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_decide_like_logs_and_fetches_even_when_logging_fails() {
        let (log_tx, mut log_rx) = mpsc::unbounded_channel();
        let (assoc_tx, mut assoc_rx) = mpsc::unbounded_channel();
        let session = SessionBuilder::new(
            ScriptedSource::tracks(&["a", "b"]),
            Arc::new(StaticCredential::new("token")),
        )
        .logger(Arc::new(RecordingLogger {
            tx: log_tx,
            fail: true,
        }))
        .associator(Arc::new(RecordingAssociator { tx: assoc_tx }))
        .build();

        let liked = session.fetch(Filters::new().genre("disco")).await.unwrap();
        let next = session.decide(liked, Decision::Like).await.unwrap();

        assert_eq!(next.id, "b");
        assert_eq!(session.position(), 2);

        let (track_id, isrc, decision) = log_rx.recv().await.unwrap();
        assert_eq!(track_id, "a");
        assert_eq!(isrc.as_deref(), Some("ISRCa"));
        assert_eq!(decision, Decision::Like);
        assert_eq!(assoc_rx.recv().await.unwrap(), "a");
    }

    #[tokio::test(start_paused = true)]
    async fn test_decide_dislike_skips_playlist() {
        let (log_tx, mut log_rx) = mpsc::unbounded_channel();
        let (assoc_tx, mut assoc_rx) = mpsc::unbounded_channel();
        let session = SessionBuilder::new(
            ScriptedSource::tracks(&["a", "b"]),
            Arc::new(StaticCredential::new("token")),
        )
        .logger(Arc::new(RecordingLogger {
            tx: log_tx,
            fail: false,
        }))
        .associator(Arc::new(RecordingAssociator { tx: assoc_tx }))
        .build();

        let current = session.fetch(Filters::new()).await.unwrap();
        session.decide(current, Decision::Dislike).await.unwrap();

        assert_eq!(log_rx.recv().await.unwrap().2, Decision::Dislike);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(assoc_rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_decide_reuses_last_filters() {
        struct FilterEcho;

        #[async_trait]
        impl RecommendationSource for FilterEcho {
            async fn next_track(&self, _: &str, filters: &Filters) -> DiscoveryResult<Track> {
                let genres: Vec<_> = filters.genres.iter().cloned().collect();
                Ok(track(&genres.join("+")))
            }
        }

        let session =
            SessionBuilder::new(Arc::new(FilterEcho), Arc::new(StaticCredential::new("t"))).build();
        let first = session
            .fetch(Filters::new().genre("funk").genre("soul"))
            .await
            .unwrap();
        let next = session.decide(first, Decision::Skip).await.unwrap();
        assert_eq!(next.id, "funk+soul");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_in_flight_fetch() {
        let source = ScriptedSource::with(vec![(1000, Ok(track("a")))]);
        let session = session_with(source.clone());
        let fetching = session.clone();
        let task = tokio::spawn(async move { fetching.fetch(Filters::new()).await });
        wait_for_requests(&source, 1).await;
        assert_eq!(session.status(), LoadStatus::Loading);

        session.shutdown();
        assert_matches!(task.await.unwrap(), Err(SessionError::Cancelled));
        assert!(session.current().is_none());
        assert_eq!(session.status(), LoadStatus::Idle);
        assert_matches!(
            session.fetch(Filters::new()).await,
            Err(SessionError::Cancelled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_transitions() {
        let session = session_with(ScriptedSource::tracks(&["a"]));
        let mut rx = session.subscribe();
        assert_eq!(rx.borrow_and_update().status, LoadStatus::Idle);

        session.fetch(Filters::new()).await.unwrap();
        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.status, LoadStatus::Ready);
        assert_eq!(snapshot.current.unwrap().id, "a");
    }
}
