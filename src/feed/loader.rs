//! Incremental "load more" pagination

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::state::RenderState;
use crate::content::Page;
use crate::error::Result;

/// Fetches the page behind a cursor URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, cursor: &str) -> Result<Page>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch_page(&self, cursor: &str) -> Result<Page> {
        (**self).fetch_page(cursor).await
    }
}

/// Result of activating "load more"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and appended
    Loaded { added: usize, has_more: bool },
    /// Another load is outstanding; nothing was fetched
    InFlight,
    /// No cursor left; nothing was fetched
    Exhausted,
}

/// One listing view: the current snapshot plus the loader driving it.
///
/// Snapshots are published through a watch channel and replaced wholesale,
/// so readers always see a consistent list/cursor pair. At most one load
/// runs at a time.
pub struct Feed<F> {
    fetcher: F,
    state: watch::Sender<Arc<RenderState>>,
    last_error: watch::Sender<Option<String>>,
    loading: AtomicBool,
}

impl<F: PageFetcher> Feed<F> {
    pub fn new(fetcher: F, initial: Page) -> Self {
        let (state, _) = watch::channel(Arc::new(RenderState::from_page(initial)));
        let (last_error, _) = watch::channel(None);
        Self {
            fetcher,
            state,
            last_error,
            loading: AtomicBool::new(false),
        }
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<RenderState> {
        self.state.borrow().clone()
    }

    /// Watch for new snapshots
    pub fn subscribe(&self) -> watch::Receiver<Arc<RenderState>> {
        self.state.subscribe()
    }

    /// Message of the most recent failed load, cleared by the next success
    pub fn last_error(&self) -> Option<String> {
        self.last_error.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Fetch the next page and append it.
    ///
    /// On failure the snapshot is left as it was and the error is both
    /// returned and recorded for the view, so the user can retry.
    pub async fn load_more(&self) -> Result<LoadOutcome> {
        let Some(_guard) = InFlightGuard::acquire(&self.loading) else {
            warn!("Load already in flight, ignoring activation");
            return Ok(LoadOutcome::InFlight);
        };

        let current = self.snapshot();
        let Some(cursor) = current.cursor() else {
            debug!("No next page, nothing to load");
            return Ok(LoadOutcome::Exhausted);
        };

        debug!("Loading next page from {}", cursor);
        let page = match self.fetcher.fetch_page(cursor).await {
            Ok(page) => page,
            Err(e) => {
                error!("Failed to load {}: {}", cursor, e);
                self.last_error.send_replace(Some(e.to_string()));
                return Err(e);
            }
        };

        let results: Vec<_> = page.results.into_iter().map(|p| p.normalized()).collect();
        warn_duplicates(&current, &results);
        let added = results.len();

        let next = current.extended(Page::new(results, page.next_page));
        let has_more = next.has_more();
        info!(
            "Loaded {} more posts ({} total, more available: {})",
            added,
            next.len(),
            has_more
        );
        self.state.send_replace(Arc::new(next));
        self.last_error.send_replace(None);

        Ok(LoadOutcome::Loaded { added, has_more })
    }

    /// Keep loading until the cursor runs out
    pub async fn load_all(&self) -> Result<usize> {
        let mut pages = 0;
        while let LoadOutcome::Loaded { .. } = self.load_more().await? {
            pages += 1;
        }
        Ok(pages)
    }
}

fn warn_duplicates(current: &RenderState, incoming: &[crate::content::Post]) {
    let seen: HashSet<&str> = current
        .posts()
        .iter()
        .filter_map(|p| p.uid.as_deref())
        .collect();
    for uid in incoming.iter().filter_map(|p| p.uid.as_deref()) {
        if seen.contains(uid) {
            warn!("Post {} was already loaded from an earlier page", uid);
        }
    }
}

/// Holds the single-flight flag for the duration of a load
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Post;
    use crate::error::Error;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// Serves canned pages by URL and counts requests
    #[derive(Default)]
    struct FakeApi {
        pages: HashMap<String, Page>,
        requests: Mutex<Vec<String>>,
        failures: AtomicUsize,
    }

    impl FakeApi {
        fn with_page(mut self, url: &str, page: Page) -> Self {
            self.pages.insert(url.to_string(), page);
            self
        }

        /// Fail the next `n` fetches with a server error
        fn failing(self, n: usize) -> Self {
            self.failures.store(n, Ordering::SeqCst);
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for FakeApi {
        async fn fetch_page(&self, cursor: &str) -> Result<Page> {
            self.requests.lock().unwrap().push(cursor.to_string());
            if self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(Error::Status {
                    status: 500,
                    url: cursor.to_string(),
                });
            }
            self.pages.get(cursor).cloned().ok_or_else(|| Error::Status {
                status: 404,
                url: cursor.to_string(),
            })
        }
    }

    /// Blocks every fetch until released
    struct GatedApi {
        gate: Arc<Notify>,
        calls: Arc<AtomicUsize>,
        page: Page,
    }

    #[async_trait]
    impl PageFetcher for GatedApi {
        async fn fetch_page(&self, _cursor: &str) -> Result<Page> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.gate.notified().await;
            Ok(self.page.clone())
        }
    }

    fn post(uid: &str) -> Post {
        Post::new(uid, Some("2021-01-01"), format!("T-{}", uid), "S", "A")
    }

    fn uids(state: &RenderState) -> Vec<String> {
        state
            .posts()
            .iter()
            .filter_map(|p| p.uid.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_load_more_appends_and_replaces_cursor() {
        let api = Arc::new(FakeApi::default().with_page(
            "https://api/page2",
            Page::new(vec![post("b")], None),
        ));
        let feed = Feed::new(
            api.clone(),
            Page::new(vec![post("a")], Some("https://api/page2".to_string())),
        );
        assert!(feed.snapshot().has_more());

        let outcome = feed.load_more().await.unwrap();
        assert_eq!(
            outcome,
            LoadOutcome::Loaded {
                added: 1,
                has_more: false
            }
        );

        let state = feed.snapshot();
        assert_eq!(uids(&state), vec!["a", "b"]);
        assert!(!state.has_more());
        assert_eq!(api.requests(), vec!["https://api/page2"]);
    }

    #[tokio::test]
    async fn test_exhausted_from_start_never_fetches() {
        let api = Arc::new(FakeApi::default());
        let feed = Feed::new(api.clone(), Page::new(vec![post("a")], None));

        assert!(!feed.snapshot().has_more());
        assert_eq!(feed.load_more().await.unwrap(), LoadOutcome::Exhausted);
        assert!(api.requests().is_empty());

        let blank = Feed::new(api.clone(), Page::new(vec![post("a")], Some(String::new())));
        assert_eq!(blank.load_more().await.unwrap(), LoadOutcome::Exhausted);
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cursor_taken_verbatim() {
        let api = Arc::new(
            FakeApi::default()
                .with_page("p2", Page::new(vec![post("b")], Some("p3".to_string())))
                .with_page("p3", Page::new(vec![post("c"), post("d")], Some("p4".to_string()))),
        );
        let feed = Feed::new(api.clone(), Page::new(vec![post("a")], Some("p2".to_string())));

        feed.load_more().await.unwrap();
        assert_eq!(feed.snapshot().cursor(), Some("p3"));

        let before = feed.snapshot().len();
        let outcome = feed.load_more().await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Loaded { added: 2, has_more: true }));
        assert_eq!(feed.snapshot().len(), before + 2);
        assert_eq!(feed.snapshot().cursor(), Some("p4"));
        assert_eq!(uids(&feed.snapshot()), vec!["a", "b", "c", "d"]);
    }

    #[tokio::test]
    async fn test_failure_keeps_snapshot() {
        let api = Arc::new(FakeApi::default());
        let feed = Feed::new(api.clone(), Page::new(vec![post("a")], Some("broken".to_string())));
        let before = feed.snapshot();

        assert!(feed.load_more().await.is_err());
        assert_eq!(*feed.snapshot(), *before);
        assert!(feed.snapshot().has_more());
        assert!(feed.last_error().is_some());
        assert!(!feed.is_loading());

        // a retry hits the same cursor again
        assert!(feed.load_more().await.is_err());
        assert_eq!(api.requests(), vec!["broken", "broken"]);
    }

    #[tokio::test]
    async fn test_success_clears_last_error() {
        let api = FakeApi::default()
            .with_page("p2", Page::new(vec![post("b")], None))
            .failing(1);
        let feed = Feed::new(api, Page::new(vec![post("a")], Some("p2".to_string())));

        assert!(feed.load_more().await.is_err());
        assert!(feed.last_error().is_some());

        feed.load_more().await.unwrap();
        assert!(feed.last_error().is_none());
        assert_eq!(uids(&feed.snapshot()), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_concurrent_activation_is_ignored() {
        let gate = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let api = GatedApi {
            gate: gate.clone(),
            calls: calls.clone(),
            page: Page::new(vec![post("b")], None),
        };
        let feed = Arc::new(Feed::new(
            api,
            Page::new(vec![post("a")], Some("p2".to_string())),
        ));

        let first = tokio::spawn({
            let feed = feed.clone();
            async move { feed.load_more().await }
        });
        while calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(feed.is_loading());

        assert_eq!(feed.load_more().await.unwrap(), LoadOutcome::InFlight);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        gate.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert!(matches!(outcome, LoadOutcome::Loaded { added: 1, .. }));
        assert_eq!(uids(&feed.snapshot()), vec!["a", "b"]);
        assert!(!feed.is_loading());
    }

    #[tokio::test]
    async fn test_subscribers_see_new_snapshot() {
        let api = FakeApi::default().with_page("p2", Page::new(vec![post("b")], None));
        let feed = Feed::new(api, Page::new(vec![post("a")], Some("p2".to_string())));
        let mut rx = feed.subscribe();

        feed.load_more().await.unwrap();
        assert!(rx.has_changed().unwrap());
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.len(), 2);
        assert!(!state.has_more());
    }

    #[tokio::test]
    async fn test_load_all() {
        let api = FakeApi::default()
            .with_page("p2", Page::new(vec![post("b")], Some("p3".to_string())))
            .with_page("p3", Page::new(vec![post("c")], None));
        let feed = Feed::new(api, Page::new(vec![post("a")], Some("p2".to_string())));

        assert_eq!(feed.load_all().await.unwrap(), 2);
        assert_eq!(uids(&feed.snapshot()), vec!["a", "b", "c"]);
    }
}
