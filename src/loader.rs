//! Detail loader: fetches one team member by slug and binds it to an
//! observable state.
//!
//! ## Table of Contents
//! - **LoadState**: Loading / Found / NotFound / Failed
//! - **LoadFailure**: Cloneable summary of a failed fetch
//! - **DetailLoader**: Runs loads, discards results of superseded requests
//!
//! Every call to [`DetailLoader::load`] takes a new generation number and
//! publishes `Loading` before it returns. A completion is applied only while
//! its generation is still the current one, so the bound record always
//! belongs to the most recently requested slug.

use crate::error::{CmsError, ErrorKind};
use crate::query::team_member_by_slug;
use crate::source::ContentSource;
use crate::types::{Slug, TeamMember};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Summary of a failed fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadFailure {
    kind: ErrorKind,
    message: String,
}

impl LoadFailure {
    /// What went wrong
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<&CmsError> for LoadFailure {
    fn from(err: &CmsError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Future returned by [`DetailLoader::load`]
pub type LoadFuture = Pin<Box<dyn Future<Output = LoadState> + Send + 'static>>;

/// Observable state of a detail load
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState {
    /// A fetch is outstanding
    Loading,
    /// The first matching record
    Found(Box<TeamMember>),
    /// The query matched nothing
    NotFound,
    /// The fetch failed; shown to users the same way as `NotFound`
    Failed(LoadFailure),
}

impl LoadState {
    /// True while a fetch is outstanding
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    /// True for both `NotFound` and `Failed`
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadState::NotFound | LoadState::Failed(_))
    }

    /// The bound record, if any
    pub fn member(&self) -> Option<&TeamMember> {
        match self {
            LoadState::Found(member) => Some(&**member),
            _ => None,
        }
    }

    /// The failure, if the fetch failed
    pub fn failure(&self) -> Option<&LoadFailure> {
        match self {
            LoadState::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

struct Inner<S> {
    source: S,
    state: watch::Sender<LoadState>,
    generation: AtomicU64,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl<S: ContentSource> Inner<S> {
    /// Take a new generation and publish `Loading`, atomically with respect
    /// to completions.
    fn begin(&self) -> u64 {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *state = LoadState::Loading;
        });
        generation
    }

    async fn run(&self, generation: u64, slug: Slug) -> LoadState {
        let query = team_member_by_slug(slug.as_str());

        let outcome = match self.source.fetch_members(&query).await {
            Ok(resp) => match resp.into_first() {
                Some(member) => {
                    info!(slug = %slug, id = member.id, "Team member loaded");
                    LoadState::Found(Box::new(member))
                }
                None => {
                    debug!(slug = %slug, "No team member for slug");
                    LoadState::NotFound
                }
            },
            Err(err) => {
                error!(
                    slug = %slug,
                    source = self.source.name(),
                    error = %err,
                    "Error fetching team member"
                );
                LoadState::Failed(LoadFailure::from(&err))
            }
        };

        let applied = self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = outcome.clone();
            true
        });
        if !applied {
            debug!(slug = %slug, generation, "Discarding superseded load");
        }

        outcome
    }
}

/// Loads a team member by slug into an observable [`LoadState`]
///
/// Cloning yields another handle to the same state.
pub struct DetailLoader<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for DetailLoader<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ContentSource + 'static> DetailLoader<S> {
    /// Create a loader; the initial state is `Loading`
    pub fn new(source: S) -> Self {
        let (state, _) = watch::channel(LoadState::Loading);
        Self {
            inner: Arc::new(Inner {
                source,
                state,
                generation: AtomicU64::new(0),
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// The content source
    pub fn source(&self) -> &S {
        &self.inner.source
    }

    /// Snapshot of the current state
    pub fn state(&self) -> LoadState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every applied state change
    pub fn subscribe(&self) -> watch::Receiver<LoadState> {
        self.inner.state.subscribe()
    }

    /// Generation of the most recent request
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    /// Start loading `slug`
    ///
    /// The state switches to `Loading` before this returns. The returned
    /// future performs the fetch and resolves to this request's outcome,
    /// which is only applied to the shared state if no newer request was
    /// started in the meantime.
    pub fn load(&self, slug: impl Into<Slug>) -> LoadFuture {
        self.start(slug.into()).1
    }

    /// Start loading `slug` on the tokio runtime, aborting the previously
    /// spawned load. Must be called from within a runtime.
    pub fn spawn_load(&self, slug: impl Into<Slug>) -> u64 {
        // Generation order and handle order must agree, or an older caller
        // could abort the newest task.
        let mut in_flight = self.inner.in_flight.lock();
        let (generation, fut) = self.start(slug.into());
        let handle = tokio::spawn(async move {
            fut.await;
        });
        if let Some(previous) = in_flight.replace(handle) {
            previous.abort();
        }
        generation
    }

    fn start(&self, slug: Slug) -> (u64, LoadFuture) {
        let generation = self.inner.begin();
        let inner = Arc::clone(&self.inner);
        debug!(slug = %slug, generation, "Load requested");

        (generation, Box::pin(async move { inner.run(generation, slug).await }))
    }

    /// Drop the bound record and invalidate outstanding loads
    pub fn reset(&self) {
        let mut in_flight = self.inner.in_flight.lock();
        if let Some(handle) = in_flight.take() {
            handle.abort();
        }
        self.inner.begin();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::query::CollectionQuery;
    use crate::source::{MemorySource, MockContentSource};
    use crate::types::{CollectionResponse, MediaRef, RichText};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::oneshot;
    use tokio_test::{assert_pending, assert_ready};

    type Reply = Result<CollectionResponse<TeamMember>>;

    /// Source whose responses are released by hand, one gate per slug
    #[derive(Default)]
    struct GateSource {
        gates: parking_lot::Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl GateSource {
        fn gate(&self, slug: &str) -> oneshot::Sender<Reply> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().insert(slug.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl ContentSource for GateSource {
        async fn fetch_members(&self, query: &CollectionQuery) -> Reply {
            let slug = query
                .filter_terms()
                .find(|(field, _, _)| *field == "slug")
                .map(|(_, _, value)| value.to_string())
                .unwrap_or_default();
            let gate = self.gates.lock().remove(&slug);
            match gate {
                Some(rx) => rx
                    .await
                    .unwrap_or_else(|_| Err(CmsError::internal("gate dropped"))),
                None => Err(CmsError::internal("no gate for slug")),
            }
        }

        fn name(&self) -> &'static str {
            "gate"
        }
    }

    fn member(id: u64, slug: &str) -> TeamMember {
        TeamMember {
            id,
            document_id: None,
            name: format!("Member {}", id),
            description: Some("Engineer".to_string()),
            content: Some(RichText::Text("Bio".to_string())),
            slug: Some(Slug::new(slug)),
            created_at: None,
            updated_at: None,
            published_at: None,
            locale: None,
            photo: Some(MediaRef {
                id: 100 + id,
                alternative_text: None,
                name: "photo.png".to_string(),
                url: "/uploads/photo.png".to_string(),
            }),
            photo1: None,
        }
    }

    fn envelope(data: Vec<TeamMember>) -> CollectionResponse<TeamMember> {
        CollectionResponse {
            data,
            meta: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_found_binds_first_record_verbatim() {
        let first = member(1, "jane-doe");
        let mut second = member(2, "jane-doe");
        second.name = "Duplicate".to_string();
        let loader = DetailLoader::new(MemorySource::with_members(vec![first.clone(), second]));

        let state = loader.load("jane-doe").await;

        assert_eq!(state.member(), Some(&first));
        assert_eq!(loader.state(), LoadState::Found(Box::new(first)));
    }

    #[tokio::test]
    async fn test_empty_result_is_not_found() {
        let loader = DetailLoader::new(MemorySource::new());
        let state = loader.load("nobody").await;

        assert_eq!(state, LoadState::NotFound);
        assert!(loader.state().is_not_found());
        assert!(loader.state().failure().is_none());
    }

    #[tokio::test]
    async fn test_loading_published_before_async_work() {
        let loader = DetailLoader::new(MemorySource::with_members(vec![member(1, "a")]));
        loader.load("a").await;
        assert!(loader.state().member().is_some());

        let pending = loader.load("b");
        assert!(loader.state().is_loading());

        pending.await;
        assert_eq!(loader.state(), LoadState::NotFound);
    }

    #[test]
    fn test_loading_until_response_arrives() {
        let source = Arc::new(GateSource::default());
        let gate = source.gate("a");
        let loader = DetailLoader::new(Arc::clone(&source));

        let mut task = tokio_test::task::spawn(loader.load("a"));
        assert!(loader.state().is_loading());
        assert_pending!(task.poll());
        assert!(loader.state().is_loading());

        gate.send(Ok(envelope(vec![member(1, "a")]))).unwrap();
        assert!(task.is_woken());
        let state = assert_ready!(task.poll());
        assert_eq!(state.member().map(|m| m.id), Some(1));
        assert!(!loader.state().is_loading());
    }

    #[tokio::test]
    async fn test_network_failure_is_not_found_equivalent() {
        let mut source = MockContentSource::new();
        source
            .expect_fetch_members()
            .times(1)
            .returning(|_| Err(CmsError::network("connection refused")));
        source.expect_name().return_const("mock");

        let loader = DetailLoader::new(source);
        let state = loader.load("jane-doe").await;

        assert!(state.is_not_found());
        assert!(!state.is_loading());
        let failure = state.failure().unwrap();
        assert_eq!(failure.kind(), ErrorKind::Network);
        assert!(failure.message().contains("connection refused"));
        assert_eq!(loader.state(), state);
    }

    #[tokio::test]
    async fn test_status_failure_kind() {
        let mut source = MockContentSource::new();
        source
            .expect_fetch_members()
            .returning(|_| Err(CmsError::status(500, "http://localhost:1337/api/team-members")));
        source.expect_name().return_const("mock");

        let loader = DetailLoader::new(source);
        let state = loader.load("x").await;
        assert_eq!(state.failure().map(|f| f.kind()), Some(ErrorKind::Status));
    }

    #[tokio::test]
    async fn test_superseded_load_is_discarded() {
        let source = Arc::new(GateSource::default());
        let gate_a = source.gate("a");
        let gate_b = source.gate("b");
        let loader = DetailLoader::new(Arc::clone(&source));

        let first = tokio::spawn(loader.load("a"));
        let second = tokio::spawn(loader.load("b"));
        assert_eq!(loader.generation(), 2);

        gate_b.send(Ok(envelope(vec![member(2, "b")]))).unwrap();
        let b_state = second.await.unwrap();
        assert_eq!(loader.state(), b_state);

        gate_a.send(Ok(envelope(vec![member(1, "a")]))).unwrap();
        let a_state = first.await.unwrap();
        assert_eq!(a_state.member().map(|m| m.id), Some(1));

        assert_eq!(loader.state().member().map(|m| m.id), Some(2));
    }

    #[tokio::test]
    async fn test_superseded_failure_is_discarded() {
        let source = Arc::new(GateSource::default());
        let gate_a = source.gate("a");
        let gate_b = source.gate("b");
        let loader = DetailLoader::new(Arc::clone(&source));

        let first = tokio::spawn(loader.load("a"));
        let second = tokio::spawn(loader.load("b"));

        gate_b.send(Ok(envelope(vec![member(2, "b")]))).unwrap();
        second.await.unwrap();
        gate_a.send(Err(CmsError::network("late failure"))).unwrap();
        first.await.unwrap();

        assert_eq!(loader.state().member().map(|m| m.id), Some(2));
    }

    #[tokio::test]
    async fn test_spawn_load_publishes_latest() {
        let source = Arc::new(GateSource::default());
        let gate_a = source.gate("a");
        let gate_b = source.gate("b");
        let loader = DetailLoader::new(Arc::clone(&source));
        let mut rx = loader.subscribe();

        loader.spawn_load("a");
        let generation = loader.spawn_load("b");
        assert_eq!(generation, 2);

        // The first task was aborted; its gate may or may not still be open.
        let _ = gate_a.send(Ok(envelope(vec![member(1, "a")])));
        gate_b.send(Ok(envelope(vec![member(2, "b")]))).unwrap();

        let state = rx
            .wait_for(|s| !s.is_loading())
            .await
            .map(|s| s.clone())
            .unwrap();
        assert_eq!(state.member().map(|m| m.id), Some(2));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_spawn_load_always_settles() {
        use std::sync::Barrier;
        use std::time::Duration;

        for _ in 0..500 {
            let loader = DetailLoader::new(MemorySource::with_members(vec![
                member(1, "a"),
                member(2, "b"),
            ]));
            let mut rx = loader.subscribe();
            let barrier = Arc::new(Barrier::new(2));

            let callers: Vec<_> = ["a", "b"]
                .into_iter()
                .map(|slug| {
                    let loader = loader.clone();
                    let barrier = Arc::clone(&barrier);
                    tokio::task::spawn_blocking(move || {
                        barrier.wait();
                        loader.spawn_load(slug)
                    })
                })
                .collect();
            let mut generations = Vec::new();
            for caller in callers {
                generations.push(caller.await.unwrap());
            }
            generations.sort_unstable();
            assert_eq!(generations, vec![1, 2]);

            let state = tokio::time::timeout(
                Duration::from_millis(500),
                rx.wait_for(|s| !s.is_loading()),
            )
            .await
            .expect("state stuck in Loading")
            .map(|s| s.clone())
            .unwrap();
            assert!(state.member().is_some());
        }
    }

    #[tokio::test]
    async fn test_reset_invalidates_in_flight() {
        let source = Arc::new(GateSource::default());
        let gate = source.gate("a");
        let loader = DetailLoader::new(Arc::clone(&source));

        let task = tokio::spawn(loader.load("a"));
        loader.reset();

        gate.send(Ok(envelope(vec![member(1, "a")]))).unwrap();
        task.await.unwrap();

        assert!(loader.state().is_loading());
        assert_eq!(loader.generation(), 2);
    }
}
