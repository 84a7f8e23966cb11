use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use gs_core::{normalize_title, Batch, NewsSource};
use gs_storage::BatchHistoryStore;
use tracing::{debug, info, warn};

use crate::render::Renderer;

/// Pages tried when looking for a batch with unseen headlines.
pub const MAX_FETCH_PAGES: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigatorState {
    Idle,
    Navigating,
}

/// What a navigation request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// Another navigation was in flight; this one was dropped.
    Busy,
    /// Nothing changed on screen.
    Unchanged,
    /// A batch already in history was displayed.
    Replayed(usize),
    /// A freshly fetched batch was appended and displayed.
    Fetched(usize),
}

/// Moves through the batch history, fetching new batches past its end.
///
/// At most one navigation runs at a time; requests arriving meanwhile are
/// dropped rather than queued.
pub struct FeedNavigator {
    history: BatchHistoryStore,
    source: Arc<dyn NewsSource>,
    renderer: Arc<dyn Renderer>,
    max_fetch_pages: u32,
    state: Mutex<NavigatorState>,
}

struct InFlight<'a>(&'a Mutex<NavigatorState>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock(self.0) = NavigatorState::Idle;
    }
}

fn lock(state: &Mutex<NavigatorState>) -> MutexGuard<'_, NavigatorState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl FeedNavigator {
    pub fn new(history: BatchHistoryStore, source: Arc<dyn NewsSource>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            history,
            source,
            renderer,
            max_fetch_pages: MAX_FETCH_PAGES,
            state: Mutex::new(NavigatorState::Idle),
        }
    }

    pub fn with_max_fetch_pages(mut self, pages: u32) -> Self {
        self.max_fetch_pages = pages.max(1);
        self
    }

    pub fn state(&self) -> NavigatorState {
        *lock(&self.state)
    }

    pub fn history(&self) -> &BatchHistoryStore {
        &self.history
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        let mut state = lock(&self.state);
        if *state == NavigatorState::Navigating {
            return None;
        }
        *state = NavigatorState::Navigating;
        Some(InFlight(&self.state))
    }

    /// Shows the batch at the persisted position, or seeds history with a
    /// first batch when there is none.
    pub async fn load_feed(&self) -> Navigation {
        let Some(_flight) = self.begin() else {
            debug!("⏳ Load dropped, navigation in flight");
            return Navigation::Busy;
        };

        let mut history = self.history.get_history().await;
        if !history.is_empty() {
            let position = self.history.get_position().await;
            return Navigation::Replayed(self.show_at(&history, position, Direction::Forward).await);
        }

        let batch = match self.source.fetch_batch(&[], 1).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("❌ Initial news fetch failed: {}", e);
                return Navigation::Unchanged;
            }
        };
        if batch.is_empty() {
            info!("📭 No news available for the first batch");
            return Navigation::Unchanged;
        }

        history.push(batch.clone());
        let position = self.history.append_batch(batch).await;
        Navigation::Fetched(self.show_at(&history, position, Direction::Forward).await)
    }

    pub async fn navigate(&self, direction: Direction) -> Navigation {
        let Some(_flight) = self.begin() else {
            debug!("⏳ {:?} dropped, navigation in flight", direction);
            return Navigation::Busy;
        };

        let mut history = self.history.get_history().await;
        let position = self.history.get_position().await;

        match direction {
            Direction::Backward => {
                if position == 0 || history.is_empty() {
                    return Navigation::Unchanged;
                }
                Navigation::Replayed(self.show_at(&history, position - 1, direction).await)
            }
            Direction::Forward if position + 1 < history.len() => {
                Navigation::Replayed(self.show_at(&history, position + 1, direction).await)
            }
            Direction::Forward => {
                let Some(fresh) = self.find_fresh_batch().await else {
                    info!("📭 No unseen headlines in {} pages", self.max_fetch_pages);
                    return Navigation::Unchanged;
                };
                history.push(fresh.clone());
                let position = self.history.append_batch(fresh).await;
                Navigation::Fetched(self.show_at(&history, position, direction).await)
            }
        }
    }

    /// Walks pages `1..=max_fetch_pages` until one yields an unseen title.
    async fn find_fresh_batch(&self) -> Option<Batch> {
        let seen = self.history.get_seen_titles().await;
        let seen_set: HashSet<String> = seen.iter().map(|t| normalize_title(t)).collect();

        for page in 1..=self.max_fetch_pages {
            let batch = match self.source.fetch_batch(&seen, page).await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("❌ News fetch for page {} failed: {}", page, e);
                    continue;
                }
            };

            let fresh: Batch = batch
                .into_iter()
                .filter(|a| !a.title.is_empty() && !seen_set.contains(&a.normalized_title()))
                .collect();
            if !fresh.is_empty() {
                info!("🆕 Page {} gave {} unseen articles", page, fresh.len());
                return Some(fresh);
            }
            debug!("Page {} had nothing new", page);
        }
        None
    }

    async fn show_at(&self, history: &[Batch], index: usize, direction: Direction) -> usize {
        let index = index.min(history.len().saturating_sub(1));
        let empty = Batch::new();
        let batch = history.get(index).unwrap_or(&empty);

        self.renderer.transition_out(direction).await;
        self.renderer.render(batch);
        self.history.record_shown(batch).await;
        self.history.set_position(index).await;
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gs_core::{Article, Error, Result};
    use gs_storage::{KeyValueStore, MemoryStore};
    use std::collections::HashMap;
    use tokio::sync::Notify;

    fn article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            content: format!("{} happened today, details inside", title),
            ..Default::default()
        }
    }

    fn page(titles: &[&str]) -> Batch {
        titles.iter().map(|t| article(t)).collect()
    }

    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<u32, Batch>,
        failing: HashSet<u32>,
        calls: Mutex<Vec<(Vec<String>, u32)>>,
        gate: Option<Arc<Notify>>,
    }

    impl FakeSource {
        fn with_pages(pages: &[(u32, Batch)]) -> Self {
            Self {
                pages: pages.iter().cloned().collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<(Vec<String>, u32)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NewsSource for FakeSource {
        async fn fetch_batch(&self, exclude: &[String], page: u32) -> Result<Batch> {
            self.calls.lock().unwrap().push((exclude.to_vec(), page));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.failing.contains(&page) {
                return Err(Error::Upstream { status: Some(503), details: serde_json::Value::Null });
            }
            Ok(self.pages.get(&page).cloned().unwrap_or_default())
        }
    }

    #[derive(Default)]
    struct RecordingRenderer {
        rendered: Mutex<Vec<Vec<String>>>,
        transitions: Mutex<Vec<Direction>>,
    }

    impl RecordingRenderer {
        fn rendered(&self) -> Vec<Vec<String>> {
            self.rendered.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Renderer for RecordingRenderer {
        async fn transition_out(&self, direction: Direction) {
            self.transitions.lock().unwrap().push(direction);
        }

        fn render(&self, batch: &[Article]) {
            self.rendered
                .lock()
                .unwrap()
                .push(batch.iter().map(|a| a.title.clone()).collect());
        }
    }

    struct Harness {
        navigator: FeedNavigator,
        source: Arc<FakeSource>,
        renderer: Arc<RecordingRenderer>,
    }

    fn harness_on(kv: Arc<dyn KeyValueStore>, source: FakeSource) -> Harness {
        let source = Arc::new(source);
        let renderer = Arc::new(RecordingRenderer::default());
        let navigator = FeedNavigator::new(BatchHistoryStore::new(kv), source.clone(), renderer.clone());
        Harness { navigator, source, renderer }
    }

    fn harness(source: FakeSource) -> Harness {
        harness_on(Arc::new(MemoryStore::new()), source)
    }

    #[tokio::test]
    async fn first_load_fetches_and_seeds_history() {
        let h = harness(FakeSource::with_pages(&[(1, page(&["A", "B"]))]));

        assert_eq!(h.navigator.load_feed().await, Navigation::Fetched(0));
        assert_eq!(h.source.calls(), vec![(vec![], 1)]);
        assert_eq!(h.renderer.rendered(), vec![vec!["A", "B"]]);

        let store = h.navigator.history();
        assert_eq!(store.get_history().await.len(), 1);
        assert_eq!(store.get_position().await, 0);
        assert_eq!(store.get_seen_titles().await, vec!["A", "B"]);
        assert_eq!(h.navigator.state(), NavigatorState::Idle);
    }

    #[tokio::test]
    async fn load_with_history_shows_persisted_position() {
        let h = harness(FakeSource::default());
        let store = h.navigator.history();
        store.append_batch(page(&["A"])).await;
        store.append_batch(page(&["B"])).await;
        store.set_position(0).await;

        assert_eq!(h.navigator.load_feed().await, Navigation::Replayed(0));
        assert!(h.source.calls().is_empty());
        assert_eq!(h.renderer.rendered(), vec![vec!["A"]]);
    }

    #[tokio::test]
    async fn empty_first_page_leaves_history_empty() {
        let h = harness(FakeSource::default());
        assert_eq!(h.navigator.load_feed().await, Navigation::Unchanged);
        assert!(h.navigator.history().get_history().await.is_empty());
        assert!(h.renderer.rendered().is_empty());
    }

    #[tokio::test]
    async fn backward_at_oldest_is_a_no_op() {
        let h = harness(FakeSource::with_pages(&[(1, page(&["A"]))]));
        h.navigator.load_feed().await;

        assert_eq!(h.navigator.navigate(Direction::Backward).await, Navigation::Unchanged);
        assert_eq!(h.navigator.history().get_history().await.len(), 1);
        assert_eq!(h.navigator.history().get_position().await, 0);
        assert_eq!(h.renderer.rendered().len(), 1);
    }

    #[tokio::test]
    async fn forward_fetches_excluding_seen_titles() {
        let h = harness(FakeSource::with_pages(&[(1, page(&["A", "B", "C"]))]));
        h.navigator.history().append_batch(page(&["A"])).await;
        h.navigator.history().record_shown(&page(&["A"])).await;

        assert_eq!(h.navigator.navigate(Direction::Forward).await, Navigation::Fetched(1));
        assert_eq!(h.source.calls(), vec![(vec!["A".to_string()], 1)]);
        assert_eq!(h.renderer.rendered(), vec![vec!["B", "C"]]);
        assert_eq!(h.navigator.history().get_seen_titles().await, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn replaying_history_makes_no_network_calls() {
        let h = harness(FakeSource::with_pages(&[(1, page(&["A"])), (2, page(&["B"]))]));
        h.navigator.load_feed().await;
        assert_eq!(h.navigator.navigate(Direction::Forward).await, Navigation::Fetched(1));
        let calls = h.source.calls().len();

        assert_eq!(h.navigator.navigate(Direction::Backward).await, Navigation::Replayed(0));
        assert_eq!(h.navigator.navigate(Direction::Forward).await, Navigation::Replayed(1));
        assert_eq!(h.source.calls().len(), calls);

        assert_eq!(
            h.renderer.rendered(),
            vec![vec!["A"], vec!["B"], vec!["A"], vec!["B"]]
        );
        assert_eq!(
            *h.renderer.transitions.lock().unwrap(),
            vec![Direction::Forward, Direction::Forward, Direction::Backward, Direction::Forward]
        );
        assert_eq!(h.navigator.history().get_seen_titles().await, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn gives_up_after_three_stale_pages() {
        let h = harness(FakeSource::with_pages(&[
            (1, page(&["A"])),
            (2, page(&["b "])),
            (3, page(&["C"])),
            (4, page(&["D"])),
        ]));
        h.navigator.history().append_batch(page(&["A", "B", "C"])).await;
        h.navigator.history().record_shown(&page(&["A", "B", "C"])).await;

        assert_eq!(h.navigator.navigate(Direction::Forward).await, Navigation::Unchanged);
        let pages: Vec<u32> = h.source.calls().into_iter().map(|(_, p)| p).collect();
        assert_eq!(pages, vec![1, 2, 3]);
        assert_eq!(h.navigator.history().get_history().await.len(), 1);
        assert!(h.renderer.rendered().is_empty());
    }

    #[tokio::test]
    async fn failed_page_moves_on_to_the_next() {
        let mut source = FakeSource::with_pages(&[(2, page(&["Fresh"]))]);
        source.failing.insert(1);
        let h = harness(source);
        h.navigator.history().append_batch(page(&["Old"])).await;

        assert_eq!(h.navigator.navigate(Direction::Forward).await, Navigation::Fetched(1));
        let pages: Vec<u32> = h.source.calls().into_iter().map(|(_, p)| p).collect();
        assert_eq!(pages, vec![1, 2]);
    }

    #[tokio::test]
    async fn concurrent_navigation_is_dropped() {
        let gate = Arc::new(Notify::new());
        let source = FakeSource {
            pages: [(1, page(&["A"]))].into_iter().collect(),
            gate: Some(gate.clone()),
            ..Default::default()
        };
        let h = harness(source);

        let (first, second, _) = tokio::join!(
            h.navigator.navigate(Direction::Forward),
            async {
                assert_eq!(h.navigator.state(), NavigatorState::Navigating);
                h.navigator.navigate(Direction::Forward).await
            },
            async { gate.notify_one() },
        );

        assert_eq!(first, Navigation::Fetched(0));
        assert_eq!(second, Navigation::Busy);
        assert_eq!(h.source.calls().len(), 1);
        assert_eq!(h.navigator.state(), NavigatorState::Idle);
    }

    struct DisabledStorage;

    #[async_trait]
    impl KeyValueStore for DisabledStorage {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Storage("disabled".into()))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Storage("disabled".into()))
        }
        async fn remove(&self, _key: &str) -> Result<()> {
            Err(Error::Storage("disabled".into()))
        }
    }

    #[tokio::test]
    async fn feed_still_renders_without_storage() {
        let h = harness_on(
            Arc::new(DisabledStorage),
            FakeSource::with_pages(&[(1, page(&["A"]))]),
        );
        assert_eq!(h.navigator.load_feed().await, Navigation::Fetched(0));
        assert_eq!(h.renderer.rendered(), vec![vec!["A"]]);
    }
}
