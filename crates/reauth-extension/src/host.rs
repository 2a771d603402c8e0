//! Host capabilities handed to extensions

use std::collections::BTreeSet;

use axum::Router;
use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::cors::CorsPolicy;

/// Prefix under which every extension route and exemption lives
pub const ROUTE_PREFIX: &str = "/reauth";

/// Place a path under [`ROUTE_PREFIX`].
///
/// `login` and `/login` both become `/reauth/login`; paths already under the
/// prefix are kept.
pub fn normalize_extension_path(path: &str) -> String {
    let path = path.trim();
    if path == ROUTE_PREFIX || path.starts_with("/reauth/") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{ROUTE_PREFIX}{path}")
    } else {
        format!("{ROUTE_PREFIX}/{path}")
    }
}

/// Routes and exemptions contributed by one extension
#[derive(Debug, Default)]
pub struct ExtensionRoutes {
    /// Extension name, or `host` for direct registrations
    pub owner: String,
    /// Routers to nest under [`ROUTE_PREFIX`]
    pub routes: Vec<Router>,
    /// Fully prefixed paths that skip the session check
    pub exempt_paths: BTreeSet<String>,
}

impl ExtensionRoutes {
    fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.exempt_paths.is_empty()
    }
}

/// Everything extensions registered, collected when the host is sealed
#[derive(Debug, Default)]
pub struct HostRegistrations {
    /// One group per contributing extension, in commit order
    pub extensions: Vec<ExtensionRoutes>,
    /// CORS allow-sets including extension additions
    pub cors: CorsPolicy,
}

impl HostRegistrations {
    /// Every exempt path across all groups
    pub fn exempt_paths(&self) -> impl Iterator<Item = &str> {
        self.extensions
            .iter()
            .flat_map(|e| e.exempt_paths.iter().map(String::as_str))
    }

    pub fn route_count(&self) -> usize {
        self.extensions.iter().map(|e| e.routes.len()).sum()
    }
}

#[derive(Debug)]
struct HostState {
    own: ExtensionRoutes,
    committed: Vec<ExtensionRoutes>,
    cors: CorsPolicy,
    sealed: bool,
}

/// Registration surface shared with every extension.
///
/// Registrations are accepted until [`seal`](Self::seal) is called; later
/// calls are logged and ignored.
///
/// The registry hands each extension its own staging host and
/// [`commit`](Self::commit)s it into the shared one only once the extension
/// is enabled, so a failed extension leaves nothing behind.
#[derive(Debug)]
pub struct ExtensionHost {
    state: Mutex<HostState>,
}

impl Default for ExtensionHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtensionHost {
    /// Host starting from the default CORS policy
    pub fn new() -> Self {
        Self::with_cors(CorsPolicy::default())
    }

    /// Host starting from a given CORS policy
    pub fn with_cors(cors: CorsPolicy) -> Self {
        Self::owned_by("host", cors)
    }

    /// Staging host for one extension, collecting only its additions
    pub fn staging(owner: &str) -> Self {
        Self::owned_by(owner, CorsPolicy::empty())
    }

    fn owned_by(owner: &str, cors: CorsPolicy) -> Self {
        Self {
            state: Mutex::new(HostState {
                own: ExtensionRoutes::new(owner),
                committed: Vec::new(),
                cors,
                sealed: false,
            }),
        }
    }

    fn register(&self, what: &str, apply: impl FnOnce(&mut HostState)) {
        let mut state = self.state.lock();
        if state.sealed {
            warn!(
                registration = what,
                owner = %state.own.owner,
                "Extension registration after startup ignored"
            );
            return;
        }
        apply(&mut state);
    }

    /// Add routes. Paths are relative to [`ROUTE_PREFIX`].
    pub fn add_route(&self, router: Router) {
        self.register("route", |s| s.own.routes.push(router));
    }

    /// Let requests to `path` through without a session
    pub fn exempt_from_session_check(&self, path: &str) {
        self.exempt_paths_from_session_check([path]);
    }

    pub fn exempt_paths_from_session_check<'a>(&self, paths: impl IntoIterator<Item = &'a str>) {
        let paths: Vec<String> = paths.into_iter().map(normalize_extension_path).collect();
        self.register("exempt_path", |s| {
            for path in paths {
                debug!(path = %path, owner = %s.own.owner, "Path exempted from session check");
                s.own.exempt_paths.insert(path);
            }
        });
    }

    pub fn allow_method(&self, method: &str) {
        self.allow_methods([method]);
    }

    pub fn allow_methods<'a>(&self, methods: impl IntoIterator<Item = &'a str>) {
        let methods: Vec<&str> = methods.into_iter().collect();
        self.register("cors_method", |s| {
            methods.into_iter().for_each(|m| s.cors.allow_method(m));
        });
    }

    pub fn allow_header(&self, header: &str) {
        self.allow_headers([header]);
    }

    pub fn allow_headers<'a>(&self, headers: impl IntoIterator<Item = &'a str>) {
        let headers: Vec<&str> = headers.into_iter().collect();
        self.register("cors_header", |s| {
            headers.into_iter().for_each(|h| s.cors.allow_header(h));
        });
    }

    pub fn allow_host(&self, host: &str) {
        self.allow_hosts([host]);
    }

    pub fn allow_hosts<'a>(&self, hosts: impl IntoIterator<Item = &'a str>) {
        let hosts: Vec<&str> = hosts.into_iter().collect();
        self.register("cors_host", |s| {
            hosts.into_iter().for_each(|h| s.cors.allow_host(h));
        });
    }

    /// Fold sealed registrations from a staging host into this one
    pub fn commit(&self, staged: HostRegistrations) {
        self.register("commit", |s| {
            s.committed
                .extend(staged.extensions.into_iter().filter(|e| !e.is_empty()));
            s.cors.extend(&staged.cors);
        });
    }

    /// Whether registrations are closed
    pub fn is_sealed(&self) -> bool {
        self.state.lock().sealed
    }

    /// Close registrations and take what was collected.
    ///
    /// A second call returns empty registrations.
    pub fn seal(&self) -> HostRegistrations {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        state.sealed = true;
        let fresh = ExtensionRoutes::new(state.own.owner.clone());
        let own = std::mem::replace(&mut state.own, fresh);
        let mut extensions = std::mem::take(&mut state.committed);
        if !own.is_empty() {
            extensions.push(own);
        }
        let registrations = HostRegistrations {
            extensions,
            cors: state.cors.clone(),
        };
        debug!(
            groups = registrations.extensions.len(),
            routes = registrations.route_count(),
            "Extension host sealed"
        );
        registrations
    }
}
