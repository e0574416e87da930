//! The list-view engine: one background task per open registry view.
//!
//! A [`ListView`] bundles a filter store, a page channel, and the engine
//! task that turns their publications into fetches. The engine reacts to
//! exactly three things — an applied-filter publication, a page change,
//! an explicit [`refresh`](ListView::refresh) — and never to draft
//! edits. Every fetch is tagged with the filter generation and a
//! per-engine issue number, and a completion is dropped unless both are
//! still current, so a slow response can never overwrite a newer page.
//!
//! Results flow back as [`ListState`] snapshots on a watch channel:
//! `Loading` and `Failed` keep the previous rows, so UIs always have
//! something truthful to draw.

mod cache;
mod engine;
mod request;

pub use cache::ResponseCache;
pub use request::{ListPage, ListRequest, ListState, PageSpec, Phase, Scope};

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::filter::store::AppliedFilter;
use crate::filter::{FilterError, FilterSchema, FilterState, FilterStore, FilterValue, codec};

use engine::ViewEngine;

/// Fetches one page of rows. Implemented by the per-registry API
/// adapters; tests substitute scripted sources.
pub trait ListSource<T>: Send + Sync {
    fn fetch(
        &self,
        req: &ListRequest,
    ) -> impl Future<Output = Result<ListPage<T>, CoreError>> + Send;
}

/// Everything [`ListView::spawn`] needs. Built by the session's view
/// constructors.
pub(crate) struct SpawnArgs<S> {
    pub schema: FilterSchema,
    /// Query string to restore into the store before the first fetch,
    /// so a shared link reproduces the view.
    pub initial_query: Option<String>,
    pub scope: Scope,
    pub resource: &'static str,
    pub source: Arc<S>,
    pub cache: Arc<ResponseCache>,
    pub page_size: u32,
    pub cancel: CancellationToken,
}

/// Handle to one open registry view.
///
/// Owns the filter store (edits, apply, clear go through here), controls
/// paging and ordering, and exposes the engine's state channel. Dropping
/// the handle stops the engine.
pub struct ListView<T> {
    store: Arc<Mutex<FilterStore>>,
    schema: FilterSchema,
    page_tx: Arc<watch::Sender<PageSpec>>,
    state_rx: watch::Receiver<ListState<T>>,
    refresh_tx: mpsc::UnboundedSender<()>,
    cancel: CancellationToken,
}

impl<T> ListView<T>
where
    T: Send + Sync + 'static,
{
    /// Build the store and channels, then spawn the engine task.
    /// Requires a running tokio runtime.
    pub(crate) fn spawn<S>(args: SpawnArgs<S>) -> Self
    where
        S: ListSource<T> + 'static,
    {
        let mut store = FilterStore::new(args.schema.clone());
        if let Some(query) = &args.initial_query {
            store.restore(query);
        }
        let applied_rx = store.subscribe();

        let (page_tx, _) = watch::channel(PageSpec::new(args.page_size));
        let page_tx = Arc::new(page_tx);
        let (state_tx, state_rx) = watch::channel(ListState::idle());
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();

        let engine = ViewEngine::new(
            args.source,
            args.cache,
            args.scope,
            args.resource,
            args.schema.clone(),
            applied_rx,
            Arc::clone(&page_tx),
            refresh_rx,
            state_tx,
            args.cancel.clone(),
        );
        tokio::spawn(engine.run());

        Self {
            store: Arc::new(Mutex::new(store)),
            schema: args.schema,
            page_tx,
            state_rx,
            refresh_tx,
            cancel: args.cancel,
        }
    }

    // ── Filter control ───────────────────────────────────────────────

    /// Stage a draft edit. Nothing is fetched until [`apply`](Self::apply).
    pub fn edit(&self, field: &str, value: FilterValue) -> Result<(), FilterError> {
        self.store().edit(field, value)
    }

    /// Publish the draft; the engine refetches page 1. Returns the new
    /// generation.
    pub fn apply(&self) -> u64 {
        self.store().apply()
    }

    /// Reset draft and applied to the schema initial state; the engine
    /// refetches page 1 unfiltered.
    pub fn clear(&self) -> u64 {
        self.store().clear()
    }

    pub fn draft(&self) -> FilterState {
        self.store().draft().clone()
    }

    pub fn applied(&self) -> AppliedFilter {
        self.store().applied()
    }

    pub fn generation(&self) -> u64 {
        self.store().generation()
    }

    pub fn is_dirty(&self) -> bool {
        self.store().is_dirty()
    }

    pub fn is_field_dirty(&self, field: &str) -> bool {
        self.store().is_field_dirty(field)
    }

    pub fn schema(&self) -> &FilterSchema {
        &self.schema
    }

    /// The applied state as a query string — the shareable essence of
    /// this view.
    pub fn applied_query(&self) -> String {
        let applied = self.applied();
        codec::encode_query(&self.schema, applied.state())
    }

    // ── Page control ─────────────────────────────────────────────────

    pub fn page(&self) -> PageSpec {
        self.page_tx.borrow().clone()
    }

    /// Jump to a 1-based page. Out-of-range values are the server's to
    /// answer (an empty page), not ours to guess.
    pub fn set_page(&self, page: u32) {
        let page = page.max(1);
        self.page_tx.send_if_modified(|spec| {
            if spec.page == page {
                false
            } else {
                spec.page = page;
                true
            }
        });
    }

    pub fn next_page(&self) {
        self.page_tx.send_modify(|spec| spec.page += 1);
    }

    pub fn prev_page(&self) {
        self.page_tx.send_if_modified(|spec| {
            if spec.page > 1 {
                spec.page -= 1;
                true
            } else {
                false
            }
        });
    }

    pub fn set_ordering(&self, ordering: Option<String>) {
        self.page_tx.send_if_modified(|spec| {
            if spec.ordering == ordering {
                false
            } else {
                spec.ordering = ordering;
                true
            }
        });
    }

    // ── Engine control ───────────────────────────────────────────────

    /// Force a fetch of the current inputs, bypassing the cache and the
    /// unchanged-inputs skip.
    pub fn refresh(&self) {
        let _ = self.refresh_tx.send(());
    }

    /// Subscribe to state publications.
    pub fn subscribe(&self) -> watch::Receiver<ListState<T>> {
        self.state_rx.clone()
    }

    /// The latest published state.
    pub fn state(&self) -> ListState<T> {
        self.state_rx.borrow().clone()
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Weak handle for the session's store registry (close() clears
    /// every open view's store without keeping views alive).
    pub(crate) fn store_weak(&self) -> Weak<Mutex<FilterStore>> {
        Arc::downgrade(&self.store)
    }

    fn store(&self) -> MutexGuard<'_, FilterStore> {
        // Poisoning only means a panicking caller; the store itself is
        // still coherent.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Drop for ListView<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
