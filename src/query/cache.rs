//! Cached, deduplicated page loading.
//!
//! Pages are keyed by [`QueryKey`]. A fresh cached page is returned straight
//! away; otherwise one fetch runs per key no matter how many callers ask for
//! it concurrently. Failures are handed to everyone waiting on that fetch,
//! are not cached and are not retried.

use std::collections::HashMap;
use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use lru::LruCache;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::api::{Issue, Project, SearchClient, SearchRequest};
use crate::error::{Error, Result};

/// How long a fetched page counts as fresh.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(60);

const DEFAULT_CAPACITY: usize = 64;

/// Identifies one page of one search.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub project: Project,
    pub jql: String,
    pub page_index: usize,
    pub page_size: usize,
}

impl QueryKey {
    pub fn request(&self) -> SearchRequest {
        SearchRequest::jql(
            self.project,
            self.jql.clone(),
            self.page_index * self.page_size,
            self.page_size,
        )
    }

    /// The same search one page further.
    pub fn next_page(&self) -> Self {
        Self {
            page_index: self.page_index + 1,
            ..self.clone()
        }
    }
}

/// One page of results and the size of the whole result set.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub issues: Vec<Issue>,
    pub total: usize,
}

type FetchFuture = Pin<Box<dyn Future<Output = Result<Page>> + Send>>;
type FetchFn = Arc<dyn Fn(QueryKey) -> FetchFuture + Send + Sync>;

struct Entry {
    page: Arc<Page>,
    fetched_at: Instant,
}

/// A fetch other callers can wait on.
#[derive(Default)]
struct InFlight {
    cell: OnceCell<Arc<Page>>,
    failure: Mutex<Option<String>>,
}

struct State {
    entries: LruCache<QueryKey, Entry>,
    in_flight: HashMap<QueryKey, Arc<InFlight>>,
}

#[derive(Clone)]
pub struct QueryCache {
    state: Arc<Mutex<State>>,
    fetch: FetchFn,
    stale_time: Duration,
}

impl QueryCache {
    /// A cache that loads pages from the search endpoint.
    pub fn new(client: SearchClient) -> Self {
        Self::with_fetcher(DEFAULT_CAPACITY, DEFAULT_STALE_TIME, move |key: QueryKey| {
            let client = client.clone();
            async move {
                let response = client.search(&key.request()).await?;
                Ok::<_, Error>(Page {
                    issues: response.issues,
                    total: response.total,
                })
            }
        })
    }

    /// A cache over an arbitrary page loader.
    pub fn with_fetcher<F, Fut>(capacity: usize, stale_time: Duration, fetch: F) -> Self
    where
        F: Fn(QueryKey) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Page>> + Send + 'static,
    {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            state: Arc::new(Mutex::new(State {
                entries: LruCache::new(capacity),
                in_flight: HashMap::new(),
            })),
            fetch: Arc::new(move |key| -> FetchFuture { Box::pin(fetch(key)) }),
            stale_time,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A cached page that is still fresh.
    pub fn cached(&self, key: &QueryKey) -> Option<Arc<Page>> {
        let mut state = self.lock();
        state
            .entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.stale_time)
            .map(|entry| Arc::clone(&entry.page))
    }

    /// Get a page, fetching it unless a fresh copy is cached.
    pub async fn get(&self, key: QueryKey) -> Result<Arc<Page>> {
        if let Some(page) = self.cached(&key) {
            debug!(page = key.page_index, "page cache hit");
            return Ok(page);
        }

        let flight = {
            let mut state = self.lock();
            Arc::clone(state.in_flight.entry(key.clone()).or_default())
        };

        flight
            .cell
            .get_or_try_init(|| self.fetch_once(key, Arc::clone(&flight)))
            .await
            .cloned()
    }

    async fn fetch_once(&self, key: QueryKey, flight: Arc<InFlight>) -> Result<Arc<Page>> {
        // Only reached by later waiters when the first fetch failed.
        let earlier_failure = flight
            .failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(message) = earlier_failure {
            return Err(Error::Fetch(message));
        }

        debug!(project = %key.project, page = key.page_index, "fetching page");
        let result = (self.fetch)(key.clone()).await;

        let mut state = self.lock();
        if state
            .in_flight
            .get(&key)
            .is_some_and(|current| Arc::ptr_eq(current, &flight))
        {
            state.in_flight.remove(&key);
        }

        match result {
            Ok(page) => {
                let page = Arc::new(page);
                state.entries.put(
                    key,
                    Entry {
                        page: Arc::clone(&page),
                        fetched_at: Instant::now(),
                    },
                );
                Ok(page)
            }
            Err(err) => {
                warn!(page = key.page_index, "fetch failed: {err}");
                *flight.failure.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Warm a page in the background.
    pub fn prefetch(&self, key: QueryKey) {
        if self.cached(&key).is_some() {
            return;
        }
        let cache = self.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.get(key).await {
                debug!("prefetch failed: {err}");
            }
        });
    }

    /// Drop every cached page so the next [`get`](Self::get) refetches.
    pub fn clear(&self) {
        self.lock().entries.clear();
    }
}
