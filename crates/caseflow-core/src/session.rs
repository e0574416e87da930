// ── Session: one authenticated connection to a platform instance ──
//
// The root handle the CLI and TUI share. Owns the REST client, the
// response cache, and the cancellation token every view engine runs
// under. Cheaply cloneable via `Arc<SessionInner>`.

use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use caseflow_api::{Paged, RestClient, ServerInfo, TransportConfig};

use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::filter::{FilterSchema, FilterState, FilterStore, codec};
use crate::model::{GrievanceTicket, Household, Individual, PaymentPlan};
use crate::view::{
    ListPage, ListRequest, ListSource, ListView, PageSpec, ResponseCache, Scope, SpawnArgs,
};

// ── Session ──────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Create with [`new`](Self::new), validate with
/// [`connect`](Self::connect), then open views or run one-shot fetches.
/// [`close`](Self::close) stops every engine, resets every open view's
/// filters, and drops cached responses.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    client: RestClient,
    cache: Arc<ResponseCache>,
    cancel: CancellationToken,
    server: OnceLock<ServerInfo>,
    /// Weak handles to every store handed out through a view, so
    /// `close()` can reset them without keeping views alive.
    stores: Mutex<Vec<Weak<Mutex<FilterStore>>>>,
}

impl Session {
    /// Build a session from configuration. Does NOT talk to the server —
    /// call [`connect`](Self::connect) to validate URL and token.
    pub fn new(config: SessionConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: config.tls_mode(),
            timeout: config.timeout,
        };
        let client = RestClient::from_token(config.url.as_str(), &config.token, &transport)?;
        debug!(url = %config.url, business_area = %config.business_area, "session created");

        Ok(Self {
            inner: Arc::new(SessionInner {
                client,
                cache: Arc::new(ResponseCache::default()),
                cancel: CancellationToken::new(),
                server: OnceLock::new(),
                stores: Mutex::new(Vec::new()),
                config,
            }),
        })
    }

    /// Validate URL and token with a server-info round trip.
    ///
    /// Run this before starting any UI so credential problems surface as
    /// one clean error instead of a screen full of failed fetches.
    pub async fn connect(&self) -> Result<ServerInfo, CoreError> {
        let info = self.inner.client.server_info().await?;
        info!(version = %info.version, "connected to platform");
        let _ = self.inner.server.set(info.clone());
        Ok(info)
    }

    /// Server info recorded by [`connect`](Self::connect), if it ran.
    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.inner.server.get()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn business_area(&self) -> &str {
        &self.inner.config.business_area
    }

    pub fn program(&self) -> Option<&str> {
        self.inner.config.program.as_deref()
    }

    // ── View constructors ────────────────────────────────────────────

    /// Open a grievance-ticket view. Works with or without a program —
    /// tickets can be listed across the whole business area.
    pub fn grievances(&self, initial_query: Option<&str>) -> ListView<GrievanceTicket> {
        self.spawn_view(
            GrievanceTicket::filter_schema(),
            GrievanceTicket::RESOURCE,
            GrievanceSource {
                inner: Arc::clone(&self.inner),
            },
            initial_query,
        )
    }

    /// Open a household view. Requires a program scope.
    pub fn households(&self, initial_query: Option<&str>) -> Result<ListView<Household>, CoreError> {
        self.require_program(Household::RESOURCE)?;
        Ok(self.spawn_view(
            Household::filter_schema(),
            Household::RESOURCE,
            HouseholdSource {
                inner: Arc::clone(&self.inner),
            },
            initial_query,
        ))
    }

    /// Open an individual view. Requires a program scope.
    pub fn individuals(
        &self,
        initial_query: Option<&str>,
    ) -> Result<ListView<Individual>, CoreError> {
        self.require_program(Individual::RESOURCE)?;
        Ok(self.spawn_view(
            Individual::filter_schema(),
            Individual::RESOURCE,
            IndividualSource {
                inner: Arc::clone(&self.inner),
            },
            initial_query,
        ))
    }

    /// Open a payment-plan view. Requires a program scope.
    pub fn payment_plans(
        &self,
        initial_query: Option<&str>,
    ) -> Result<ListView<PaymentPlan>, CoreError> {
        self.require_program(PaymentPlan::RESOURCE)?;
        Ok(self.spawn_view(
            PaymentPlan::filter_schema(),
            PaymentPlan::RESOURCE,
            PaymentPlanSource {
                inner: Arc::clone(&self.inner),
            },
            initial_query,
        ))
    }

    fn spawn_view<T, S>(
        &self,
        schema: FilterSchema,
        resource: &'static str,
        source: S,
        initial_query: Option<&str>,
    ) -> ListView<T>
    where
        T: Send + Sync + 'static,
        S: ListSource<T> + 'static,
    {
        let view = ListView::spawn(SpawnArgs {
            schema,
            initial_query: initial_query.map(str::to_owned),
            scope: self.scope(),
            resource,
            source: Arc::new(source),
            cache: Arc::clone(&self.inner.cache),
            page_size: self.inner.config.page_size,
            cancel: self.inner.cancel.child_token(),
        });

        let mut stores = self.lock_stores();
        stores.retain(|weak| weak.strong_count() > 0);
        stores.push(view.store_weak());
        drop(stores);

        view
    }

    // ── One-shot fetches (CLI) ───────────────────────────────────────
    //
    // Same request construction as the view engine, no background task
    // and no cache. One process, one request.

    pub async fn fetch_grievances(
        &self,
        state: &FilterState,
        page: &PageSpec,
    ) -> Result<ListPage<GrievanceTicket>, CoreError> {
        let params = list_params(&GrievanceTicket::filter_schema(), state, page);
        let paged = self
            .inner
            .client
            .list_grievance_tickets(self.business_area(), self.program(), &params)
            .await?;
        Ok(to_page(paged))
    }

    pub async fn fetch_households(
        &self,
        state: &FilterState,
        page: &PageSpec,
    ) -> Result<ListPage<Household>, CoreError> {
        let program = self.require_program(Household::RESOURCE)?.to_owned();
        let params = list_params(&Household::filter_schema(), state, page);
        let paged = self
            .inner
            .client
            .list_households(self.business_area(), &program, &params)
            .await?;
        Ok(to_page(paged))
    }

    pub async fn fetch_individuals(
        &self,
        state: &FilterState,
        page: &PageSpec,
    ) -> Result<ListPage<Individual>, CoreError> {
        let program = self.require_program(Individual::RESOURCE)?.to_owned();
        let params = list_params(&Individual::filter_schema(), state, page);
        let paged = self
            .inner
            .client
            .list_individuals(self.business_area(), &program, &params)
            .await?;
        Ok(to_page(paged))
    }

    pub async fn fetch_payment_plans(
        &self,
        state: &FilterState,
        page: &PageSpec,
    ) -> Result<ListPage<PaymentPlan>, CoreError> {
        let program = self.require_program(PaymentPlan::RESOURCE)?.to_owned();
        let params = list_params(&PaymentPlan::filter_schema(), state, page);
        let paged = self
            .inner
            .client
            .list_payment_plans(self.business_area(), &program, &params)
            .await?;
        Ok(to_page(paged))
    }

    // ── Single-entity fetches ────────────────────────────────────────

    pub async fn get_grievance(&self, id: &str) -> Result<GrievanceTicket, CoreError> {
        self.inner
            .client
            .get_grievance_ticket(self.business_area(), self.program(), id)
            .await
            .map(GrievanceTicket::from)
            .map_err(|e| not_found_as("grievance ticket", id, e.into()))
    }

    pub async fn get_household(&self, id: &str) -> Result<Household, CoreError> {
        let program = self.require_program(Household::RESOURCE)?.to_owned();
        self.inner
            .client
            .get_household(self.business_area(), &program, id)
            .await
            .map(Household::from)
            .map_err(|e| not_found_as("household", id, e.into()))
    }

    pub async fn get_individual(&self, id: &str) -> Result<Individual, CoreError> {
        let program = self.require_program(Individual::RESOURCE)?.to_owned();
        self.inner
            .client
            .get_individual(self.business_area(), &program, id)
            .await
            .map(Individual::from)
            .map_err(|e| not_found_as("individual", id, e.into()))
    }

    pub async fn get_payment_plan(&self, id: &str) -> Result<PaymentPlan, CoreError> {
        let program = self.require_program(PaymentPlan::RESOURCE)?.to_owned();
        self.inner
            .client
            .get_payment_plan(self.business_area(), &program, id)
            .await
            .map(PaymentPlan::from)
            .map_err(|e| not_found_as("payment plan", id, e.into()))
    }

    // ── Share links ──────────────────────────────────────────────────

    /// Shareable web URL reproducing a view: business area, program
    /// (`all` when the session has none), view path, and the applied
    /// filter plus any non-default page/ordering as query parameters.
    pub fn view_link(
        &self,
        view_path: &str,
        schema: &FilterSchema,
        state: &FilterState,
        page: &PageSpec,
    ) -> Url {
        let mut url = self.inner.config.link_base().clone();
        let path = format!(
            "{}/{}/programs/{}/{}",
            url.path().trim_end_matches('/'),
            self.inner.config.business_area,
            self.inner.config.program.as_deref().unwrap_or("all"),
            view_path,
        );
        url.set_path(&path);

        let mut pairs = codec::encode_pairs(schema, state);
        pairs.extend(page.link_params());
        if pairs.is_empty() {
            url.set_query(None);
        } else {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&pairs)
                .finish();
            url.set_query(Some(&query));
        }
        url
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Close the session: stop every view engine, reset every open
    /// view's filters, and drop cached responses. Reopened views start
    /// pristine. Idempotent.
    pub fn close(&self) {
        self.inner.cancel.cancel();

        let mut stores = self.lock_stores();
        for weak in stores.drain(..) {
            if let Some(store) = weak.upgrade() {
                store
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clear();
            }
        }
        drop(stores);

        self.inner.cache.clear();
        debug!("session closed");
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn scope(&self) -> Scope {
        Scope::new(
            self.inner.config.business_area.clone(),
            self.inner.config.program.clone(),
        )
    }

    fn require_program(&self, resource: &'static str) -> Result<&str, CoreError> {
        self.inner
            .config
            .program
            .as_deref()
            .ok_or_else(|| CoreError::Config {
                message: format!("the {resource} registry is program-scoped; select a program"),
            })
    }

    fn lock_stores(&self) -> MutexGuard<'_, Vec<Weak<Mutex<FilterStore>>>> {
        self.inner
            .stores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Source adapters ──────────────────────────────────────────────────
//
// One per registry: turn a `ListRequest` into the matching REST call
// and the DTO page into domain rows.

struct GrievanceSource {
    inner: Arc<SessionInner>,
}

impl ListSource<GrievanceTicket> for GrievanceSource {
    async fn fetch(&self, req: &ListRequest) -> Result<ListPage<GrievanceTicket>, CoreError> {
        let paged = self
            .inner
            .client
            .list_grievance_tickets(
                &req.scope.business_area,
                req.scope.program.as_deref(),
                &req.params(),
            )
            .await?;
        Ok(to_page(paged))
    }
}

struct HouseholdSource {
    inner: Arc<SessionInner>,
}

impl ListSource<Household> for HouseholdSource {
    async fn fetch(&self, req: &ListRequest) -> Result<ListPage<Household>, CoreError> {
        let paged = self
            .inner
            .client
            .list_households(&req.scope.business_area, scope_program(req)?, &req.params())
            .await?;
        Ok(to_page(paged))
    }
}

struct IndividualSource {
    inner: Arc<SessionInner>,
}

impl ListSource<Individual> for IndividualSource {
    async fn fetch(&self, req: &ListRequest) -> Result<ListPage<Individual>, CoreError> {
        let paged = self
            .inner
            .client
            .list_individuals(&req.scope.business_area, scope_program(req)?, &req.params())
            .await?;
        Ok(to_page(paged))
    }
}

struct PaymentPlanSource {
    inner: Arc<SessionInner>,
}

impl ListSource<PaymentPlan> for PaymentPlanSource {
    async fn fetch(&self, req: &ListRequest) -> Result<ListPage<PaymentPlan>, CoreError> {
        let paged = self
            .inner
            .client
            .list_payment_plans(&req.scope.business_area, scope_program(req)?, &req.params())
            .await?;
        Ok(to_page(paged))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn list_params(schema: &FilterSchema, state: &FilterState, page: &PageSpec) -> Vec<(String, String)> {
    let mut params = codec::encode_pairs(schema, state);
    params.extend(page.request_params());
    params
}

fn to_page<D, T: From<D>>(paged: Paged<D>) -> ListPage<T> {
    ListPage {
        rows: paged
            .results
            .into_iter()
            .map(|dto| Arc::new(T::from(dto)))
            .collect(),
        total: paged.count,
    }
}

fn scope_program(req: &ListRequest) -> Result<&str, CoreError> {
    req.scope.program.as_deref().ok_or_else(|| CoreError::Config {
        message: format!("the {} registry is program-scoped; select a program", req.resource),
    })
}

fn not_found_as(entity_type: &'static str, id: &str, err: CoreError) -> CoreError {
    if err.is_not_found() {
        CoreError::NotFound {
            entity_type,
            identifier: id.to_owned(),
        }
    } else {
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::config::TlsVerification;
    use crate::filter::FilterValue;

    fn test_config(program: Option<&str>) -> SessionConfig {
        SessionConfig {
            // Nothing listens here; these tests never complete a request.
            url: Url::parse("http://127.0.0.1:9").unwrap(),
            token: SecretString::from("test-token".to_owned()),
            business_area: "kenya".into(),
            program: program.map(str::to_owned),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(5),
            page_size: 20,
            web_url: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn close_stops_engines_and_resets_views() {
        let session = Session::new(test_config(Some("cash-2024"))).unwrap();
        let view = session.grievances(None);
        let mut rx = view.subscribe();

        view.edit("search", FilterValue::text("flood")).unwrap();
        view.apply();
        assert!(!view.applied_query().is_empty());

        session
            .inner
            .cache
            .put("seed".to_owned(), ListPage::<GrievanceTicket> {
                rows: Vec::new(),
                total: 0,
            });
        assert!(!session.inner.cache.is_empty());

        session.close();

        assert!(session.inner.cache.is_empty());
        assert!(view.applied_query().is_empty());
        assert!(!view.is_dirty());

        // The engine shuts down: the state channel closes once its
        // sender is dropped.
        while rx.changed().await.is_ok() {}
    }

    #[tokio::test(start_paused = true)]
    async fn close_is_idempotent() {
        let session = Session::new(test_config(Some("cash-2024"))).unwrap();
        let view = session.grievances(None);
        session.close();
        session.close();
        assert!(view.applied_query().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn program_scoped_views_refuse_a_sessionwide_scope() {
        let session = Session::new(test_config(None)).unwrap();

        let err = session.households(None).err().unwrap();
        assert!(matches!(err, CoreError::Config { .. }));
        let err = session.individuals(None).err().unwrap();
        assert!(matches!(err, CoreError::Config { .. }));
        let err = session.payment_plans(None).err().unwrap();
        assert!(matches!(err, CoreError::Config { .. }));

        // Grievance tickets are listable across the business area.
        let _view = session.grievances(None);
    }

    #[test]
    fn view_link_carries_filter_page_and_ordering() {
        let session = Session::new(test_config(Some("cash-2024"))).unwrap();
        let schema = Household::filter_schema();
        let state = codec::decode(&schema, "search=asha");

        let mut page = PageSpec::new(20);
        page.page = 3;
        page.ordering = Some("-size".to_owned());

        let url = session.view_link(Household::VIEW_PATH, &schema, &state, &page);
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/kenya/programs/cash-2024/population/household?search=asha&page=3&ordering=-size"
        );
    }

    #[test]
    fn view_link_of_a_default_state_is_bare() {
        let session = Session::new(test_config(None)).unwrap();
        let schema = GrievanceTicket::filter_schema();
        let url = session.view_link(
            GrievanceTicket::VIEW_PATH,
            &schema,
            &schema.initial(),
            &PageSpec::new(20),
        );
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/kenya/programs/all/grievance/tickets"
        );
    }
}
