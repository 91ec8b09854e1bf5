//! Route table, access guard and router.
//!
//! Every transition goes through [`Router::navigate`], which resolves the path,
//! follows redirects and asks the [`NavigationGuard`] before recording the
//! location in the shared [`History`].

mod guard;
mod history;
mod route;
mod router;

pub use guard::{resolve_access, AccessDecision, NavigationGuard, RoleResolver, ADMIN_DENIED_MESSAGE};
pub use history::{History, Navigator, HISTORY_LIMIT};
pub use route::{app_routes, Access, Route, RouteMatch, RouteTable, Target};
pub use router::{Navigation, Router, MAX_REDIRECTS};

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/home";
