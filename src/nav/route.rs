use std::collections::BTreeMap;

use super::HOME_PATH;

/// Access requirement of a route. Ordered from least to most strict so the
/// effective requirement of a nested match is the maximum along its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Access {
    Public,
    RequiresAuth,
    RequiresAdmin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Opaque name of the view rendered for this route.
    View(String),
    Redirect(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

#[derive(Debug, Clone)]
pub struct Route {
    pattern: String,
    segments: Vec<Segment>,
    /// `None` for grouping routes, which only exist to hold children.
    target: Option<Target>,
    access: Access,
    children: Vec<Route>,
}

impl Route {
    /// Route rendering a view. Requires a credential unless marked public.
    pub fn view(pattern: &str, view: &str) -> Self {
        Self::build(pattern, Some(Target::View(view.to_string())), Access::RequiresAuth)
    }

    pub fn redirect(pattern: &str, to: &str) -> Self {
        Self::build(pattern, Some(Target::Redirect(to.to_string())), Access::Public)
    }

    /// Prefix that cannot be opened on its own; only its children resolve.
    pub fn group(pattern: &str) -> Self {
        Self::build(pattern, None, Access::Public)
    }

    fn build(pattern: &str, target: Option<Target>, access: Access) -> Self {
        let segments = split_path(pattern)
            .into_iter()
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { pattern: pattern.to_string(), segments, target, access, children: Vec::new() }
    }

    pub fn public(mut self) -> Self {
        self.access = Access::Public;
        self
    }

    pub fn requires_admin(mut self) -> Self {
        self.access = Access::RequiresAdmin;
        self
    }

    /// Nested routes; child patterns are relative to this route.
    pub fn with_children(mut self, children: Vec<Route>) -> Self {
        self.children = children;
        self
    }

    pub fn pattern(&self) -> &str { &self.pattern }
    pub fn target(&self) -> Option<&Target> { self.target.as_ref() }
    pub fn access(&self) -> Access { self.access }

    fn match_prefix<'p>(&self, segs: &'p [&'p str]) -> Option<(&'p [&'p str], BTreeMap<String, String>)> {
        if self.segments.len() > segs.len() {
            return None;
        }
        let mut params = BTreeMap::new();
        for (seg, actual) in self.segments.iter().zip(segs.iter()) {
            match seg {
                Segment::Literal(lit) => {
                    if lit != actual { return None; }
                }
                Segment::Param(name) => {
                    params.insert(name.clone(), actual.to_string());
                }
            }
        }
        Some((&segs[self.segments.len()..], params))
    }
}

/// A resolved path: the chain of routes from the outermost parent to the leaf.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub path: String,
    pub chain: Vec<&'a Route>,
    pub params: BTreeMap<String, String>,
    leaf: &'a Target,
}

impl<'a> RouteMatch<'a> {
    pub fn route(&self) -> &'a Route {
        // a match always has at least the leaf
        self.chain[self.chain.len() - 1]
    }

    /// Strictest access along the match chain.
    pub fn access(&self) -> Access {
        self.chain.iter().map(|r| r.access).max().unwrap_or(Access::Public)
    }

    pub fn target(&self) -> &'a Target {
        self.leaf
    }
}

/// Static route table, immutable once built.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    fallback: String,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes, fallback: HOME_PATH.to_string() }
    }

    /// Where unmatched paths are sent.
    pub fn with_fallback(mut self, path: &str) -> Self {
        self.fallback = path.to_string();
        self
    }

    pub fn fallback(&self) -> &str { &self.fallback }

    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let segs = split_path(path);
        let (chain, params) = match_in(&self.routes, &segs)?;
        let leaf = chain.last()?.target.as_ref()?;
        Some(RouteMatch { path: normalize(path), chain, params, leaf })
    }
}

fn match_in<'a>(routes: &'a [Route], segs: &[&str]) -> Option<(Vec<&'a Route>, BTreeMap<String, String>)> {
    for r in routes {
        let Some((rest, mut params)) = r.match_prefix(segs) else { continue; };
        if rest.is_empty() {
            if r.target.is_some() {
                return Some((vec![r], params));
            }
            continue;
        }
        if let Some((chain, child_params)) = match_in(&r.children, rest) {
            let mut full = Vec::with_capacity(chain.len() + 1);
            full.push(r);
            full.extend(chain);
            params.extend(child_params);
            return Some((full, params));
        }
    }
    None
}

fn strip_suffixes(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

fn split_path(path: &str) -> Vec<&str> {
    strip_suffixes(path).split('/').filter(|s| !s.is_empty()).collect()
}

/// Canonical form used for history entries: leading slash, no trailing slash.
pub(crate) fn normalize(path: &str) -> String {
    format!("/{}", split_path(path).join("/"))
}

/// The blog application's routes.
pub fn app_routes() -> RouteTable {
    RouteTable::new(vec![
        Route::redirect("/", HOME_PATH),
        Route::view("/login", "login").public(),
        Route::view("/register", "register").public(),
        Route::view("/home", "home").public(),
        Route::view("/blogs", "blogs-search").public(),
        Route::view("/blogs/all", "blogs-all").public(),
        Route::view("/users", "users"),
        Route::view("/me", "my-account"),
        Route::view("/u/:username", "user-profile"),
        Route::view("/blog-create", "blog-create"),
        Route::group("/admin").requires_admin().with_children(vec![
            Route::view("pending", "admin-pending-blogs"),
            Route::view("role-requests", "admin-role-requests"),
        ]),
    ])
}
