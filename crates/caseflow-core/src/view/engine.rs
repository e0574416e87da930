// The per-view fetch engine.
//
// One background task per open list view. It watches the store's applied
// channel and the page channel, issues fetches through the view's
// `ListSource`, and publishes `ListState` snapshots. Filter edits never
// reach it — only applied publications do.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::filter::store::AppliedFilter;
use crate::filter::{FilterSchema, codec};

use super::ListSource;
use super::cache::ResponseCache;
use super::request::{ListPage, ListRequest, ListState, PageSpec, Phase, Scope};

/// What woke the engine. Only an explicit refresh bypasses the
/// identical-fingerprint skip and the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Filter,
    Page,
    Refresh,
}

/// Completion of one spawned fetch, tagged with the identity it was
/// issued under.
struct FetchOutcome<T> {
    /// Monotonic per-engine fetch number; a newer issue supersedes this
    /// one even within the same filter generation (page moves).
    issue: u64,
    /// Filter generation current when the fetch was issued.
    generation: u64,
    request: ListRequest,
    result: Result<ListPage<T>, CoreError>,
}

pub(super) struct ViewEngine<T, S> {
    source: Arc<S>,
    cache: Arc<ResponseCache>,
    scope: Scope,
    resource: &'static str,
    schema: FilterSchema,

    applied_rx: watch::Receiver<AppliedFilter>,
    page_tx: Arc<watch::Sender<PageSpec>>,
    page_rx: watch::Receiver<PageSpec>,
    refresh_rx: mpsc::UnboundedReceiver<()>,
    state_tx: watch::Sender<ListState<T>>,

    outcome_tx: mpsc::UnboundedSender<FetchOutcome<T>>,
    outcome_rx: mpsc::UnboundedReceiver<FetchOutcome<T>>,
    cancel: CancellationToken,

    /// Generation of the most recent trigger.
    generation: u64,
    /// Issue number of the most recent fetch.
    issue: u64,
    /// Fingerprint of the most recently started (or cache-served) request.
    last_fingerprint: Option<String>,
    /// Whether the most recently accepted completion was a failure.
    last_failed: bool,
}

impl<T, S> ViewEngine<T, S>
where
    T: Send + Sync + 'static,
    S: ListSource<T> + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        source: Arc<S>,
        cache: Arc<ResponseCache>,
        scope: Scope,
        resource: &'static str,
        schema: FilterSchema,
        applied_rx: watch::Receiver<AppliedFilter>,
        page_tx: Arc<watch::Sender<PageSpec>>,
        refresh_rx: mpsc::UnboundedReceiver<()>,
        state_tx: watch::Sender<ListState<T>>,
        cancel: CancellationToken,
    ) -> Self {
        let page_rx = page_tx.subscribe();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            source,
            cache,
            scope,
            resource,
            schema,
            applied_rx,
            page_tx,
            page_rx,
            refresh_rx,
            state_tx,
            outcome_tx,
            outcome_rx,
            cancel,
            generation: 0,
            issue: 0,
            last_fingerprint: None,
            last_failed: false,
        }
    }

    pub(super) async fn run(mut self) {
        // Watch receivers treat the at-subscription value as seen, so
        // the opening page-1 load is explicit.
        self.trigger(Trigger::Filter);

        loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => break,

                changed = self.applied_rx.changed() => {
                    if changed.is_err() {
                        break; // store gone, view is being torn down
                    }
                    // A new filter invalidates the old page position.
                    self.page_tx.send_if_modified(|page| {
                        if page.page == 1 {
                            false
                        } else {
                            page.page = 1;
                            true
                        }
                    });
                    self.page_rx.mark_unchanged();
                    self.trigger(Trigger::Filter);
                }

                changed = self.page_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.trigger(Trigger::Page);
                }

                refresh = self.refresh_rx.recv() => {
                    match refresh {
                        Some(()) => self.trigger(Trigger::Refresh),
                        None => break, // view handle dropped
                    }
                }

                Some(outcome) = self.outcome_rx.recv() => {
                    self.complete(outcome);
                }
            }
        }

        debug!(resource = self.resource, "view engine stopped");
    }

    /// Build the request for the current inputs and decide: skip, serve
    /// from cache, or spawn a fetch.
    fn trigger(&mut self, kind: Trigger) {
        let applied = self.applied_rx.borrow_and_update().clone();
        let page = self.page_rx.borrow_and_update().clone();
        self.generation = applied.generation();

        let filter_params = codec::encode_pairs(&self.schema, applied.state());
        let request = ListRequest::new(self.scope.clone(), self.resource, filter_params, page);

        if kind != Trigger::Refresh {
            // Value-identical inputs: nothing new to fetch, unless the
            // previous attempt failed and this trigger is the retry.
            if !self.last_failed && self.last_fingerprint.as_deref() == Some(request.fingerprint())
            {
                debug!(
                    resource = self.resource,
                    fingerprint = request.fingerprint(),
                    "inputs unchanged, fetch skipped"
                );
                return;
            }

            if let Some(cached) = self.cache.get::<T>(request.fingerprint()) {
                self.last_fingerprint = Some(request.fingerprint().to_owned());
                self.last_failed = false;
                let generation = self.generation;
                let page_no = request.page.page;
                self.state_tx.send_modify(move |state| {
                    state.phase = Phase::Loaded;
                    state.rows = cached.rows;
                    state.total = cached.total;
                    state.page = page_no;
                    state.generation = generation;
                });
                return;
            }
        }

        self.issue += 1;
        self.last_fingerprint = Some(request.fingerprint().to_owned());

        // Loading keeps the previous rows (and their generation) visible.
        self.state_tx.send_modify(|state| state.phase = Phase::Loading);

        let issue = self.issue;
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let outcome_tx = self.outcome_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                () = cancel.cancelled() => return,
                result = source.fetch(&request) => result,
            };
            // Engine gone means nobody cares about the outcome.
            let _ = outcome_tx.send(FetchOutcome {
                issue,
                generation,
                request,
                result,
            });
        });
    }

    fn complete(&mut self, outcome: FetchOutcome<T>) {
        // Stale guard: a newer trigger supersedes this fetch, whether the
        // filter changed (generation) or only the page did (issue).
        if outcome.issue != self.issue || outcome.generation != self.generation {
            debug!(
                resource = self.resource,
                issue = outcome.issue,
                current_issue = self.issue,
                generation = outcome.generation,
                current_generation = self.generation,
                "stale response discarded"
            );
            return;
        }

        match outcome.result {
            Ok(page) => {
                self.last_failed = false;
                self.cache
                    .put(outcome.request.fingerprint().to_owned(), page.clone());
                let generation = self.generation;
                let page_no = outcome.request.page.page;
                self.state_tx.send_modify(move |state| {
                    state.phase = Phase::Loaded;
                    state.rows = page.rows;
                    state.total = page.total;
                    state.page = page_no;
                    state.generation = generation;
                });
            }
            Err(err) => {
                self.last_failed = true;
                warn!(resource = self.resource, error = %err, "list fetch failed");
                // Rows from the last good page stay visible under the banner.
                self.state_tx
                    .send_modify(move |state| state.phase = Phase::Failed(err.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Mutex;
    use std::time::Duration;

    use super::super::{ListView, SpawnArgs};
    use super::*;
    use crate::filter::{FieldSpec, FilterValue};

    /// Source scripted through the `search` filter value:
    /// `slow` sleeps before answering, `fail` errors, anything else
    /// answers immediately with a row naming the search term.
    #[derive(Default)]
    struct ScriptedSource {
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedSource {
        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl ListSource<String> for ScriptedSource {
        async fn fetch(&self, req: &ListRequest) -> Result<ListPage<String>, CoreError> {
            self.calls
                .lock()
                .unwrap()
                .push(req.fingerprint().to_owned());
            let search = req
                .filter_params
                .iter()
                .find(|(key, _)| key == "search")
                .map(|(_, value)| value.clone())
                .unwrap_or_default();

            match search.as_str() {
                "slow" => {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    Ok(page(&search, req.page.page))
                }
                "fail" => Err(CoreError::Internal("scripted failure".into())),
                _ => Ok(page(&search, req.page.page)),
            }
        }
    }

    fn page(search: &str, page_no: u32) -> ListPage<String> {
        ListPage {
            rows: vec![Arc::new(format!("row:{search}:p{page_no}"))],
            total: 100,
        }
    }

    fn schema() -> FilterSchema {
        FilterSchema::new(vec![FieldSpec::text("search", "Search")])
    }

    fn spawn_view(source: &Arc<ScriptedSource>) -> ListView<String> {
        ListView::spawn(SpawnArgs {
            schema: schema(),
            initial_query: None,
            scope: Scope::new("kenya", Some("cash-2024".into())),
            resource: "widgets",
            source: Arc::clone(source),
            cache: Arc::new(ResponseCache::default()),
            page_size: 20,
            cancel: CancellationToken::new(),
        })
    }

    /// Drive the runtime until the view publishes a settled phase.
    ///
    /// Awaits a publication first, so calling this right after an action
    /// never returns the pre-action state.
    async fn settled(rx: &mut watch::Receiver<ListState<String>>) -> ListState<String> {
        loop {
            rx.changed().await.unwrap();
            let state = rx.borrow_and_update().clone();
            if matches!(state.phase, Phase::Loaded | Phase::Failed(_)) {
                return state;
            }
        }
    }

    fn first_row(state: &ListState<String>) -> &str {
        state.rows.first().map(|row| row.as_str()).unwrap_or("")
    }

    #[tokio::test(start_paused = true)]
    async fn opening_a_view_loads_page_one() {
        let source = Arc::new(ScriptedSource::default());
        let view = spawn_view(&source);
        let mut rx = view.subscribe();

        let state = settled(&mut rx).await;
        assert_eq!(state.phase, Phase::Loaded);
        assert_eq!(first_row(&state), "row::p1");
        assert_eq!(state.total, 100);
        assert_eq!(state.page, 1);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_never_overwrites_a_newer_one() {
        let source = Arc::new(ScriptedSource::default());
        let view = spawn_view(&source);
        let mut rx = view.subscribe();
        settled(&mut rx).await;

        // First apply: a slow fetch goes out.
        view.edit("search", FilterValue::text("slow")).unwrap();
        view.apply();
        loop {
            rx.changed().await.unwrap();
            if rx.borrow_and_update().phase.is_loading() {
                break;
            }
        }

        // Second apply while the slow fetch is still in flight.
        view.edit("search", FilterValue::text("fast")).unwrap();
        view.apply();
        let state = settled(&mut rx).await;
        assert_eq!(first_row(&state), "row:fast:p1");
        let fast_generation = state.generation;

        // Let the slow response finally arrive; it must be discarded.
        tokio::time::sleep(Duration::from_millis(600)).await;
        let state = rx.borrow().clone();
        assert_eq!(first_row(&state), "row:fast:p1");
        assert_eq!(state.generation, fast_generation);
    }

    #[tokio::test(start_paused = true)]
    async fn reapplying_identical_filter_is_skipped() {
        let source = Arc::new(ScriptedSource::default());
        let view = spawn_view(&source);
        let mut rx = view.subscribe();
        settled(&mut rx).await;
        assert_eq!(source.call_count(), 1);

        // Same value, new generation: no new fetch.
        view.apply();
        tokio::task::yield_now().await;
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_retains_rows_and_allows_retry() {
        let source = Arc::new(ScriptedSource::default());
        let view = spawn_view(&source);
        let mut rx = view.subscribe();
        let good = settled(&mut rx).await;

        view.edit("search", FilterValue::text("fail")).unwrap();
        view.apply();
        let state = settled(&mut rx).await;
        assert!(matches!(state.phase, Phase::Failed(_)));
        // Previous page stays visible.
        assert_eq!(state.rows, good.rows);

        // Re-applying the same failed inputs retries instead of skipping.
        let calls_before = source.call_count();
        view.apply();
        settled(&mut rx).await;
        assert_eq!(source.call_count(), calls_before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn filter_change_resets_to_page_one() {
        let source = Arc::new(ScriptedSource::default());
        let view = spawn_view(&source);
        let mut rx = view.subscribe();
        settled(&mut rx).await;

        view.set_page(3);
        let state = settled(&mut rx).await;
        assert_eq!(state.page, 3);

        view.edit("search", FilterValue::text("foo")).unwrap();
        view.apply();
        let state = settled(&mut rx).await;
        assert_eq!(state.page, 1);
        assert_eq!(first_row(&state), "row:foo:p1");
        assert_eq!(view.page().page, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_request_is_served_from_cache() {
        let source = Arc::new(ScriptedSource::default());
        let view = spawn_view(&source);
        let mut rx = view.subscribe();
        settled(&mut rx).await;
        assert_eq!(source.call_count(), 1);

        view.set_page(2);
        settled(&mut rx).await;
        assert_eq!(source.call_count(), 2);

        // Back to page 1: cache hit, source untouched.
        view.set_page(1);
        let state = settled(&mut rx).await;
        assert_eq!(source.call_count(), 2);
        assert_eq!(state.page, 1);
        assert_eq!(first_row(&state), "row::p1");
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_bypasses_cache_and_skip() {
        let source = Arc::new(ScriptedSource::default());
        let view = spawn_view(&source);
        let mut rx = view.subscribe();
        settled(&mut rx).await;
        assert_eq!(source.call_count(), 1);

        view.refresh();
        settled(&mut rx).await;
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_view_stops_the_engine() {
        let source = Arc::new(ScriptedSource::default());
        let view = spawn_view(&source);
        let mut rx = view.subscribe();
        settled(&mut rx).await;

        drop(view);
        // Sender side is gone once the engine task has wound down.
        assert!(rx.changed().await.is_err());
    }
}
