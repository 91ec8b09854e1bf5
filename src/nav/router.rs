use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};

use super::guard::{AccessDecision, NavigationGuard};
use super::history::Navigator;
use super::route::{normalize, RouteTable, Target};

/// Upper bound on redirects followed by a single navigation.
pub const MAX_REDIRECTS: usize = 8;

/// Result of a permitted navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Where we ended up after redirects.
    pub path: String,
    pub view: String,
    pub params: BTreeMap<String, String>,
    /// User-visible message collected on the way, e.g. an admin denial.
    pub notice: Option<String>,
}

pub struct Router {
    table: RouteTable,
    guard: NavigationGuard,
    navigator: Arc<dyn Navigator>,
}

impl Router {
    pub fn new(table: RouteTable, guard: NavigationGuard, navigator: Arc<dyn Navigator>) -> Self {
        Self { table, guard, navigator }
    }

    pub fn current_path(&self) -> String { self.navigator.current_path() }

    /// Resolve `path`, run the guard and record the final location.
    /// Redirect routes, guard redirects and the catch-all all count towards
    /// [`MAX_REDIRECTS`].
    pub async fn navigate(&self, path: &str) -> AppResult<Navigation> {
        let mut target = normalize(path);
        let mut notice: Option<String> = None;

        for _ in 0..=MAX_REDIRECTS {
            let Some(matched) = self.table.resolve(&target) else {
                debug!(target: "blogdesk::nav", "no route for {}, falling back to {}", target, self.table.fallback());
                target = normalize(self.table.fallback());
                continue;
            };
            let view = match matched.target() {
                Target::Redirect(to) => {
                    target = normalize(to);
                    continue;
                }
                Target::View(v) => v.clone(),
            };
            debug!(target: "blogdesk::nav", "{} matched {}", matched.path, matched.route().pattern());
            match self.guard.check(&matched).await {
                AccessDecision::Allow => {
                    if self.navigator.current_path() != matched.path {
                        self.navigator.redirect(&matched.path);
                    }
                    info!(target: "blogdesk::nav", "navigated to {} (view={})", matched.path, view);
                    return Ok(Navigation { path: matched.path.clone(), view, params: matched.params.clone(), notice });
                }
                AccessDecision::RedirectTo(to) => {
                    target = normalize(&to);
                }
                AccessDecision::DenyWithMessage { message, redirect } => {
                    info!(target: "blogdesk::nav", "denied {}: {}", matched.path, message);
                    notice = Some(message);
                    target = normalize(&redirect);
                }
            }
        }
        Err(AppError::RedirectLoop(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nav::guard::RoleResolver;
    use crate::nav::history::History;
    use crate::nav::route::{app_routes, Route};
    use crate::session::{SessionContext, SessionRecord};
    use async_trait::async_trait;
    use std::time::Duration;

    struct NoLookup;

    #[async_trait]
    impl RoleResolver for NoLookup {
        async fn fetch_role(&self) -> AppResult<String> {
            panic!("role lookup not expected");
        }
    }

    fn router(table: RouteTable, record: Option<SessionRecord>) -> (Router, Arc<History>) {
        let ctx = SessionContext::in_memory();
        if let Some(r) = record {
            ctx.establish(r).unwrap();
        }
        let history = Arc::new(History::new());
        let guard = NavigationGuard::new(ctx, Arc::new(NoLookup), Duration::from_millis(100));
        (Router::new(table, guard, history.clone()), history)
    }

    fn member(role: &str) -> SessionRecord {
        SessionRecord {
            token: Some("tok".into()),
            username: Some("ayse".into()),
            email: Some("ayse@example.com".into()),
            id: Some("7".into()),
            role: Some(role.into()),
        }
    }

    #[tokio::test]
    async fn anonymous_is_sent_to_login() {
        let (r, history) = router(app_routes(), None);
        let nav = r.navigate("/blog-create").await.unwrap();
        assert_eq!(nav.path, "/login");
        assert_eq!(nav.view, "login");
        assert_eq!(history.entries(), vec!["/login".to_string()]);
        assert_eq!(history.visits("/blog-create"), 0);
    }

    #[tokio::test]
    async fn root_and_unknown_paths_land_on_home() {
        let (r, history) = router(app_routes(), None);
        assert_eq!(r.navigate("/").await.unwrap().path, "/home");
        assert_eq!(r.navigate("/does/not/exist").await.unwrap().path, "/home");
        // second arrival at the current location is not a new history entry
        assert_eq!(history.entries(), vec!["/home".to_string()]);
    }

    #[tokio::test]
    async fn admin_denial_carries_notice() {
        let (r, _) = router(app_routes(), Some(member("user")));
        let nav = r.navigate("/admin/pending").await.unwrap();
        assert_eq!(nav.path, "/home");
        assert_eq!(nav.notice.as_deref(), Some(crate::nav::ADMIN_DENIED_MESSAGE));

        let (r, _) = router(app_routes(), Some(member("admin")));
        let nav = r.navigate("/admin/pending").await.unwrap();
        assert_eq!(nav.view, "admin-pending-blogs");
        assert_eq!(nav.notice, None);
    }

    #[tokio::test]
    async fn admin_group_is_not_a_page() {
        let (r, history) = router(app_routes(), Some(member("admin")));
        let nav = r.navigate("/admin").await.unwrap();
        assert_eq!(nav.path, "/home");
        assert_eq!(nav.view, "home");
        assert_eq!(history.visits("/admin"), 0);
    }

    #[tokio::test]
    async fn unknown_paths_use_the_table_fallback() {
        let table = RouteTable::new(vec![Route::view("/login", "login").public()]).with_fallback("/login");
        let (r, _) = router(table, None);
        let nav = r.navigate("/anything").await.unwrap();
        assert_eq!(nav.path, "/login");
        assert_eq!(nav.view, "login");
    }

    #[tokio::test]
    async fn params_are_returned() {
        let (r, _) = router(app_routes(), Some(member("user")));
        let nav = r.navigate("/u/mehmet").await.unwrap();
        assert_eq!(nav.view, "user-profile");
        assert_eq!(nav.params.get("username").map(String::as_str), Some("mehmet"));
    }

    #[tokio::test]
    async fn redirect_cycles_are_bounded() {
        let table = RouteTable::new(vec![Route::redirect("/a", "/b"), Route::redirect("/b", "/a")]);
        let (r, _) = router(table, None);
        let err = r.navigate("/a").await.unwrap_err();
        assert_eq!(err.code_str(), "redirect_loop");
    }
}
