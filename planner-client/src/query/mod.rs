//! # Query cache
//!
//! A keyed cache of server reads shared by every consumer in the process.
//!
//! * At most one fetch per key is in flight; later subscribers attach to it.
//! * Dropping a [`Subscription`] never cancels a dispatched fetch. The fetch
//!   runs on its own task and still populates the cache.
//! * [`QueryClient::mutate`] invalidates the keys a successful write affects.
//!   A failed write leaves the cache untouched.
//! * A fetch that was in flight when its key was invalidated stores its
//!   result as stale, and one follow-up fetch runs if anyone is still
//!   subscribed. Readers therefore never settle on data older than the
//!   mutation.

mod key;

pub use key::QueryKey;

use std::{
    any::Any,
    collections::HashMap,
    fmt,
    future::Future,
    marker::PhantomData,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use futures::future::{BoxFuture, FutureExt};
use tokio::{runtime::Handle, sync::watch};

use crate::error::{ClientError, ClientResult};

type QueryData = Arc<dyn Any + Send + Sync>;
type ErasedFetch = Arc<dyn Fn() -> BoxFuture<'static, ClientResult<QueryData>> + Send + Sync>;

/// Lifecycle of one cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    /// Never fetched.
    Idle,
    /// A fetch is in flight.
    Pending,
    /// The last fetch succeeded.
    Success,
    /// The last fetch failed. Earlier data, if any, is kept.
    Error,
}

/// Per-read settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// A disabled query never issues a request.
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl QueryOptions {
    /// Enabled only when `enabled` is true.
    #[must_use]
    pub fn enabled_if(enabled: bool) -> Self {
        Self { enabled }
    }
}

/// What a reader sees for one key.
#[derive(Debug)]
pub struct QueryState<T> {
    /// Last successful payload, kept across later failures.
    pub data: Option<Arc<T>>,
    /// Status of the entry.
    pub status: QueryStatus,
    /// Error of the last failed fetch.
    pub error: Option<ClientError>,
    /// The payload predates an invalidation.
    pub is_stale: bool,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            status: self.status,
            error: self.error.clone(),
            is_stale: self.is_stale,
        }
    }
}

impl<T> QueryState<T> {
    fn idle() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            is_stale: false,
        }
    }

    /// True while a fetch is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Pending
    }

    /// The payload, or the error that prevented one.
    ///
    /// # Errors
    /// Returns the query's error when it failed, or
    /// [`ClientError::NotFetched`] when it never ran.
    pub fn into_result(self) -> ClientResult<Arc<T>> {
        match (self.status, self.data, self.error) {
            (QueryStatus::Error, _, Some(err)) => Err(err),
            (_, Some(data), _) => Ok(data),
            _ => Err(ClientError::NotFetched),
        }
    }
}

struct Entry {
    id: u64,
    data: Option<QueryData>,
    error: Option<ClientError>,
    status: QueryStatus,
    stale: bool,
    generation: u64,
    in_flight: bool,
    subscribers: usize,
    fetch: Option<ErasedFetch>,
    settled: watch::Sender<u64>,
}

impl Entry {
    fn new(id: u64) -> Self {
        let (settled, _) = watch::channel(0);
        Self {
            id,
            data: None,
            error: None,
            status: QueryStatus::Idle,
            stale: false,
            generation: id,
            in_flight: false,
            subscribers: 0,
            fetch: None,
            settled,
        }
    }

    fn state<T: Send + Sync + 'static>(&self) -> QueryState<T> {
        QueryState {
            data: self.data.clone().and_then(|data| data.downcast::<T>().ok()),
            status: self.status,
            error: self.error.clone(),
            is_stale: self.stale,
        }
    }
}

struct Dispatch {
    key: QueryKey,
    entry_id: u64,
    generation: u64,
    fetch: ErasedFetch,
}

#[derive(Default)]
struct Inner {
    entries: Mutex<HashMap<QueryKey, Entry>>,
    ids: AtomicU64,
}

/// Shared handle to the cache. Clones refer to the same entries.
#[derive(Clone, Default)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient")
            .field("entries", &self.entries().len())
            .finish()
    }
}

impl QueryClient {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.inner
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn next_id(&self) -> u64 {
        self.inner.ids.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn begin_fetch(entry: &mut Entry, key: &QueryKey) -> Option<Dispatch> {
        let fetch = entry.fetch.clone()?;
        entry.in_flight = true;
        entry.status = QueryStatus::Pending;
        Some(Dispatch {
            key: key.clone(),
            entry_id: entry.id,
            generation: entry.generation,
            fetch,
        })
    }

    fn spawn(&self, dispatch: Dispatch) {
        let Dispatch {
            key,
            entry_id,
            generation,
            fetch,
        } = dispatch;
        tracing::debug!(key = %key, "fetch");
        match Handle::try_current() {
            Ok(handle) => {
                let client = self.clone();
                handle.spawn(async move {
                    let result = fetch().await;
                    client.complete(&key, entry_id, generation, result);
                });
            }
            Err(_) => self.complete(
                &key,
                entry_id,
                generation,
                Err(ClientError::transport("no async runtime to run the query")),
            ),
        }
    }

    fn complete(
        &self,
        key: &QueryKey,
        entry_id: u64,
        generation: u64,
        result: ClientResult<QueryData>,
    ) {
        let follow_up = {
            let mut entries = self.entries();
            // The entry was cleared (and possibly re-created) while this fetch ran.
            let Some(entry) = entries.get_mut(key).filter(|entry| entry.id == entry_id) else {
                tracing::debug!(key = %key, "discarding result for cleared entry");
                return;
            };
            entry.in_flight = false;
            match result {
                Ok(data) => {
                    entry.data = Some(data);
                    entry.error = None;
                    entry.status = QueryStatus::Success;
                }
                Err(err) => {
                    tracing::debug!(key = %key, error = %err, "query failed");
                    entry.error = Some(err);
                    entry.status = QueryStatus::Error;
                }
            }
            entry.stale = entry.generation != generation;
            let follow_up = if entry.stale && entry.subscribers > 0 {
                Self::begin_fetch(entry, key)
            } else {
                None
            };
            entry.settled.send_modify(|version| *version += 1);
            follow_up
        };
        if let Some(dispatch) = follow_up {
            self.spawn(dispatch);
        }
    }

    /// Registers interest in `key`, fetching with `fetch` if the cache holds
    /// nothing fresh and no fetch is in flight.
    pub fn subscribe<T, F, Fut>(&self, key: QueryKey, fetch: F, options: QueryOptions) -> Subscription<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let erased: ErasedFetch = Arc::new(move || {
            let fut = fetch();
            async move { fut.await.map(|value| Arc::new(value) as QueryData) }.boxed()
        });
        let dispatch = {
            let mut entries = self.entries();
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| Entry::new(self.next_id()));
            entry.subscribers += 1;
            entry.fetch = Some(erased);
            let fresh = entry.status == QueryStatus::Success && !entry.stale;
            if options.enabled && !entry.in_flight && !fresh {
                Self::begin_fetch(entry, &key)
            } else {
                None
            }
        };
        if let Some(dispatch) = dispatch {
            self.spawn(dispatch);
        }
        Subscription {
            client: self.clone(),
            key,
            _marker: PhantomData,
        }
    }

    /// Subscribes, waits for the key to settle, and unsubscribes.
    ///
    /// A disabled query returns whatever is cached with status `Idle`.
    pub async fn query<T, F, Fut>(&self, key: QueryKey, fetch: F, options: QueryOptions) -> QueryState<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let subscription = self.subscribe(key, fetch, options);
        if !options.enabled {
            let mut state = subscription.state();
            state.status = QueryStatus::Idle;
            state.error = None;
            return state;
        }
        subscription.settled().await
    }

    /// Runs a write. On success every key under each of `invalidates` is
    /// marked stale; on failure the cache is not touched.
    ///
    /// # Errors
    /// Returns the mutation's own error.
    pub async fn mutate<T, Fut>(&self, mutation: Fut, invalidates: &[QueryKey]) -> ClientResult<T>
    where
        Fut: Future<Output = ClientResult<T>>,
    {
        let result = mutation.await;
        match &result {
            Ok(_) => {
                for prefix in invalidates {
                    self.invalidate(prefix);
                }
            }
            Err(err) => tracing::debug!(error = %err, "mutation failed; cache unchanged"),
        }
        result
    }

    /// Marks every entry under `prefix` stale and refetches the subscribed ones.
    /// Returns how many entries matched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let (matched, dispatches) = {
            let mut entries = self.entries();
            let mut matched = 0;
            let mut dispatches = Vec::new();
            for (key, entry) in entries.iter_mut().filter(|(key, _)| key.starts_with(prefix)) {
                matched += 1;
                entry.generation = self.next_id();
                entry.stale = true;
                let refetch = entry.subscribers > 0
                    && !entry.in_flight
                    && entry.status != QueryStatus::Idle;
                if refetch {
                    dispatches.extend(Self::begin_fetch(entry, key));
                }
            }
            (matched, dispatches)
        };
        tracing::debug!(prefix = %prefix, matched, "invalidated");
        for dispatch in dispatches {
            self.spawn(dispatch);
        }
        matched
    }

    /// Drops every entry. In-flight fetches finish but their results are discarded.
    pub fn clear(&self) {
        let mut entries = self.entries();
        tracing::debug!(entries = entries.len(), "clearing query cache");
        entries.clear();
    }

    fn release(&self, key: &QueryKey) {
        if let Some(entry) = self.entries().get_mut(key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
        }
    }

    /// Current state of `key` without subscribing.
    #[must_use]
    pub fn state<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        self.entries()
            .get(key)
            .map_or_else(QueryState::idle, Entry::state)
    }

    async fn wait_settled<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        loop {
            let mut settled = {
                let entries = self.entries();
                match entries.get(key) {
                    Some(entry) if entry.in_flight => entry.settled.subscribe(),
                    Some(entry) => return entry.state(),
                    None => return QueryState::idle(),
                }
            };
            // An error means the entry was cleared; the next pass sees that.
            let _ = settled.changed().await;
        }
    }

    /// Cached payload for `key`, if any.
    #[must_use]
    pub fn get_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.state::<T>(key).data
    }

    /// Status of `key`, or `None` if it was never read.
    #[must_use]
    pub fn entry_status(&self, key: &QueryKey) -> Option<QueryStatus> {
        self.entries().get(key).map(|entry| entry.status)
    }

    /// True when `key` was invalidated after its last fetch.
    #[must_use]
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.entries().get(key).is_some_and(|entry| entry.stale)
    }

    /// Live subscriptions on `key`.
    #[must_use]
    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.entries().get(key).map_or(0, |entry| entry.subscribers)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// A live interest in one key. Dropping it unsubscribes.
pub struct Subscription<T> {
    client: QueryClient,
    key: QueryKey,
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for Subscription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("key", &self.key).finish()
    }
}

impl<T: Send + Sync + 'static> Subscription<T> {
    /// The subscribed key.
    #[must_use]
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Current state without waiting.
    #[must_use]
    pub fn state(&self) -> QueryState<T> {
        self.client.state(&self.key)
    }

    /// Waits until no fetch for this key is in flight.
    pub async fn settled(&self) -> QueryState<T> {
        self.client.wait_settled(&self.key).await
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.client.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::atomic::AtomicUsize,
        time::Duration,
    };
    use tokio::sync::Notify;

    /// A fake server list plus a count of reads against it.
    #[derive(Clone, Default)]
    struct Backend {
        items: Arc<Mutex<Vec<i64>>>,
        reads: Arc<AtomicUsize>,
    }

    impl Backend {
        fn with(items: &[i64]) -> Self {
            let backend = Self::default();
            backend.items.lock().unwrap().extend_from_slice(items);
            backend
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }

        fn fetcher(&self) -> impl Fn() -> BoxFuture<'static, ClientResult<Vec<i64>>> + Send + Sync + 'static {
            let backend = self.clone();
            move || {
                let backend = backend.clone();
                async move {
                    backend.reads.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    Ok(backend.items.lock().unwrap().clone())
                }
                .boxed()
            }
        }

        async fn insert(&self, id: i64) -> ClientResult<i64> {
            self.items.lock().unwrap().push(id);
            Ok(id)
        }
    }

    fn trips() -> QueryKey {
        QueryKey::new("trips").with(7)
    }

    /// Concurrent reads of one key before it resolves issue exactly one request.
    #[tokio::test]
    async fn test_concurrent_queries_share_one_fetch() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[1, 2]);

        let reads = (0..5).map(|_| cache.query(trips(), backend.fetcher(), QueryOptions::default()));
        let states = futures::future::join_all(reads).await;

        assert_eq!(backend.reads(), 1);
        for state in states {
            assert_eq!(state.status, QueryStatus::Success);
            assert_eq!(*state.data.unwrap(), vec![1, 2]);
        }
        assert_eq!(cache.subscriber_count(&trips()), 0);
    }

    /// Fresh data is served from the cache.
    #[tokio::test]
    async fn test_fresh_entry_is_not_refetched() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[1]);
        cache.query(trips(), backend.fetcher(), QueryOptions::default()).await;
        let state = cache.query(trips(), backend.fetcher(), QueryOptions::default()).await;
        assert_eq!(backend.reads(), 1);
        assert_eq!(*state.data.unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_disabled_query_never_fetches() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[1]);
        let state = cache
            .query(trips(), backend.fetcher(), QueryOptions::enabled_if(false))
            .await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(backend.reads(), 0);
        assert_eq!(state.status, QueryStatus::Idle);
        assert!(state.data.is_none());
        assert_eq!(cache.entry_status(&trips()), Some(QueryStatus::Idle));
        assert_eq!(state.into_result().unwrap_err(), ClientError::NotFetched);
    }

    /// Unsubscribing does not cancel the fetch; its result still lands.
    #[tokio::test]
    async fn test_dropped_subscription_still_populates_cache() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[4]);
        let subscription = cache.subscribe(trips(), backend.fetcher(), QueryOptions::default());
        assert_eq!(cache.subscriber_count(&trips()), 1);
        drop(subscription);
        assert_eq!(cache.subscriber_count(&trips()), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.entry_status(&trips()), Some(QueryStatus::Success));
        assert_eq!(*cache.get_data::<Vec<i64>>(&trips()).unwrap(), vec![4]);
    }

    /// Create, invalidate, and the next read contains the new id.
    #[tokio::test]
    async fn test_successful_mutation_invalidates() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[1]);
        cache.query(trips(), backend.fetcher(), QueryOptions::default()).await;

        let id = cache
            .mutate(backend.insert(2), &[QueryKey::new("trips")])
            .await
            .unwrap();
        assert_eq!(id, 2);
        assert!(cache.is_stale(&trips()));

        let state = cache.query(trips(), backend.fetcher(), QueryOptions::default()).await;
        assert!(state.data.unwrap().contains(&2));
        assert!(!state.is_stale);
        assert_eq!(backend.reads(), 2);
    }

    /// A failed mutation leaves every entry exactly as it was.
    #[tokio::test]
    async fn test_failed_mutation_leaves_cache_untouched() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[1]);
        cache.query(trips(), backend.fetcher(), QueryOptions::default()).await;
        let before = cache.state::<Vec<i64>>(&trips());

        let result: ClientResult<()> = cache
            .mutate(
                async { Err(ClientError::server(400, "bad dates")) },
                &[QueryKey::new("trips")],
            )
            .await;
        assert!(result.is_err());

        let after = cache.state::<Vec<i64>>(&trips());
        assert_eq!(after.status, before.status);
        assert_eq!(after.data, before.data);
        assert_eq!(after.is_stale, before.is_stale);
        assert_eq!(backend.reads(), 1);
    }

    /// A failed refetch keeps the last good payload.
    #[tokio::test]
    async fn test_failed_query_keeps_previous_payload() {
        let cache = QueryClient::new();
        let fail = Arc::new(AtomicUsize::new(0));
        let fetch = {
            let fail = fail.clone();
            move || {
                let fail = fail.clone();
                async move {
                    if fail.load(Ordering::SeqCst) > 0 {
                        Err(ClientError::server(500, "down"))
                    } else {
                        Ok(vec![1_i64])
                    }
                }
            }
        };
        cache.query(trips(), fetch.clone(), QueryOptions::default()).await;
        fail.store(1, Ordering::SeqCst);
        cache.invalidate(&QueryKey::new("trips"));

        let state = cache.query(trips(), fetch, QueryOptions::default()).await;
        assert_eq!(state.status, QueryStatus::Error);
        assert_eq!(state.error, Some(ClientError::server(500, "down")));
        assert_eq!(*state.data.unwrap(), vec![1]);
    }

    /// An invalidation during an in-flight fetch forces one follow-up, so the
    /// settled state reflects the mutation.
    #[tokio::test]
    async fn test_invalidation_during_fetch_refetches() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[1]);
        let gate = Arc::new(Notify::new());
        let fetch = {
            let backend = backend.clone();
            let gate = gate.clone();
            move || {
                let backend = backend.clone();
                let gate = gate.clone();
                async move {
                    let call = backend.reads.fetch_add(1, Ordering::SeqCst) + 1;
                    let snapshot = backend.items.lock().unwrap().clone();
                    if call == 1 {
                        gate.notified().await;
                    }
                    Ok::<_, ClientError>(snapshot)
                }
            }
        };

        let subscription = cache.subscribe(trips(), fetch, QueryOptions::default());
        while backend.reads() == 0 {
            tokio::task::yield_now().await;
        }
        cache
            .mutate(backend.insert(2), &[QueryKey::new("trips")])
            .await
            .unwrap();
        gate.notify_one();

        let state = subscription.settled().await;
        assert_eq!(*state.data.unwrap(), vec![1, 2]);
        assert!(!state.is_stale);
        assert_eq!(backend.reads(), 2);
    }

    /// An invalidation with live subscribers refetches in the background.
    #[tokio::test]
    async fn test_invalidation_refetches_subscribed_entries() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[1]);
        let subscription = cache.subscribe(trips(), backend.fetcher(), QueryOptions::default());
        subscription.settled().await;

        backend.insert(3).await.unwrap();
        cache.invalidate(&QueryKey::new("trips"));
        assert_eq!(cache.entry_status(&trips()), Some(QueryStatus::Pending));

        let state = subscription.settled().await;
        assert_eq!(*state.data.unwrap(), vec![1, 3]);
        assert_eq!(backend.reads(), 2);
    }

    #[tokio::test]
    async fn test_prefix_invalidation() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[1]);
        for key in [
            QueryKey::new("activities").with(1),
            QueryKey::new("activities").with(2),
            trips(),
        ] {
            cache.query(key, backend.fetcher(), QueryOptions::default()).await;
        }

        assert_eq!(cache.invalidate(&QueryKey::new("activities")), 2);
        assert!(cache.is_stale(&QueryKey::new("activities").with(1)));
        assert!(cache.is_stale(&QueryKey::new("activities").with(2)));
        assert!(!cache.is_stale(&trips()));
    }

    /// Results of fetches that were in flight when the cache was cleared are dropped.
    #[tokio::test]
    async fn test_clear_discards_in_flight_results() {
        let cache = QueryClient::new();
        let backend = Backend::with(&[1]);
        let subscription = cache.subscribe(trips(), backend.fetcher(), QueryOptions::default());
        cache.clear();
        assert!(cache.is_empty());

        let state = subscription.settled().await;
        assert_eq!(state.status, QueryStatus::Idle);
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get_data::<Vec<i64>>(&trips()).is_none());
    }

    #[tokio::test]
    async fn test_into_result() {
        let cache = QueryClient::new();
        let state = cache
            .query(
                trips(),
                || async { Err::<Vec<i64>, _>(ClientError::NotAuthenticated) },
                QueryOptions::default(),
            )
            .await;
        assert_eq!(state.into_result().unwrap_err(), ClientError::NotAuthenticated);
    }
}
