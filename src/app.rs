//! Application wiring: one session context shared by the API client and the
//! router, one history both of them move.

use std::sync::Arc;

use tracing::info;

use crate::config::ClientConfig;
use crate::error::AppResult;
use crate::http::ApiClient;
use crate::nav::{app_routes, History, Navigation, NavigationGuard, Navigator, RouteTable, Router};
use crate::session::{FileStore, SessionContext, SessionStore};

pub struct App {
    session: SessionContext,
    client: Arc<ApiClient>,
    router: Router,
    history: Arc<History>,
}

impl App {
    pub fn new(cfg: &ClientConfig, store: Arc<dyn SessionStore>) -> AppResult<Self> {
        Self::with_routes(cfg, store, app_routes())
    }

    pub fn with_routes(cfg: &ClientConfig, store: Arc<dyn SessionStore>, table: RouteTable) -> AppResult<Self> {
        let session = SessionContext::new(store);
        let history = Arc::new(History::new());
        let navigator: Arc<dyn Navigator> = history.clone();
        let client = Arc::new(ApiClient::new(cfg, session.clone(), navigator.clone())?);
        let guard = NavigationGuard::new(session.clone(), client.clone(), cfg.role_lookup_timeout);
        let router = Router::new(table, guard, navigator);
        info!(target: "blogdesk", "api base {}", client.base());
        Ok(Self { session, client, router, history })
    }

    /// Session persisted in `cfg.session_file`.
    pub fn open(cfg: &ClientConfig) -> AppResult<Self> {
        let store = FileStore::open(&cfg.session_file)?;
        Self::new(cfg, Arc::new(store))
    }

    pub fn session(&self) -> &SessionContext { &self.session }
    pub fn client(&self) -> &ApiClient { &self.client }
    pub fn history(&self) -> &History { &self.history }

    pub async fn navigate(&self, path: &str) -> AppResult<Navigation> {
        self.router.navigate(path).await
    }
}
