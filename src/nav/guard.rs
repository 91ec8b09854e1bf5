use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::session::{SessionContext, SessionRecord};

use super::route::{Access, RouteMatch};
use super::{HOME_PATH, LOGIN_PATH};

pub const ADMIN_DENIED_MESSAGE: &str = "You need admin privileges to open this page.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    RedirectTo(String),
    DenyWithMessage { message: String, redirect: String },
}

/// Remote source of the caller's role (`GET /me` in practice).
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn fetch_role(&self) -> AppResult<String>;
}

/// Decide a transition from the route and a session snapshot alone.
/// A missing role on an admin route is treated as "not admin".
pub fn resolve_access(route: &RouteMatch<'_>, session: &SessionRecord) -> AccessDecision {
    match route.access() {
        Access::Public => AccessDecision::Allow,
        _ if !session.is_authenticated() => AccessDecision::RedirectTo(LOGIN_PATH.to_string()),
        Access::RequiresAuth => AccessDecision::Allow,
        Access::RequiresAdmin if session.is_admin() => AccessDecision::Allow,
        Access::RequiresAdmin => AccessDecision::DenyWithMessage {
            message: ADMIN_DENIED_MESSAGE.to_string(),
            redirect: HOME_PATH.to_string(),
        },
    }
}

/// Pre-navigation hook. Stateless apart from the session it reads; may issue
/// one role lookup per transition when an admin route meets an uncached role.
pub struct NavigationGuard {
    session: SessionContext,
    resolver: Arc<dyn RoleResolver>,
    lookup_timeout: Duration,
}

impl NavigationGuard {
    pub fn new(session: SessionContext, resolver: Arc<dyn RoleResolver>, lookup_timeout: Duration) -> Self {
        Self { session, resolver, lookup_timeout }
    }

    pub async fn check(&self, route: &RouteMatch<'_>) -> AccessDecision {
        let snapshot = self.session.snapshot();
        if route.access() == Access::RequiresAdmin && snapshot.is_authenticated() && snapshot.role.is_none() {
            self.lookup_role().await;
        }
        // re-read: the lookup may have cached a role or torn the session down on 401
        let decision = resolve_access(route, &self.session.snapshot());
        debug!(target: "blogdesk::nav", "guard path={} access={:?} decision={:?}", route.path, route.access(), decision);
        decision
    }

    /// Failures and timeouts leave the role uncached; the caller is then not admin.
    async fn lookup_role(&self) {
        match tokio::time::timeout(self.lookup_timeout, self.resolver.fetch_role()).await {
            Ok(Ok(role)) => {
                debug!(target: "blogdesk::nav", "resolved role={}", role);
                if let Err(e) = self.session.cache_role(&role) {
                    warn!(target: "blogdesk::nav", "could not cache role: {}", e);
                }
            }
            Ok(Err(e)) => warn!(target: "blogdesk::nav", "role lookup failed: {}", e),
            Err(_) => warn!(target: "blogdesk::nav", "role lookup timed out after {:?}", self.lookup_timeout),
        }
    }
}
