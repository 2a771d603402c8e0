//! CORS allow-sets widened by extensions

use std::collections::BTreeSet;

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tracing::warn;

/// Methods, headers and hosts the service accepts cross-origin.
///
/// Methods are stored upper-case, headers lower-case. A host becomes two
/// allowed origins, `http://<host>` and `https://<host>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsPolicy {
    methods: BTreeSet<String>,
    headers: BTreeSet<String>,
    hosts: BTreeSet<String>,
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self {
            methods: ["DELETE", "POST"].into_iter().map(String::from).collect(),
            headers: ["content-type", "authorization"]
                .into_iter()
                .map(String::from)
                .collect(),
            hosts: ["localhost"].into_iter().map(String::from).collect(),
        }
    }
}

impl CorsPolicy {
    /// Policy with the default allow-sets
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy with nothing allowed
    pub fn empty() -> Self {
        Self {
            methods: BTreeSet::new(),
            headers: BTreeSet::new(),
            hosts: BTreeSet::new(),
        }
    }

    pub fn allow_method(&mut self, method: impl AsRef<str>) {
        let method = method.as_ref().trim();
        if !method.is_empty() {
            self.methods.insert(method.to_ascii_uppercase());
        }
    }

    pub fn allow_header(&mut self, header: impl AsRef<str>) {
        let header = header.as_ref().trim();
        if !header.is_empty() {
            self.headers.insert(header.to_ascii_lowercase());
        }
    }

    pub fn allow_host(&mut self, host: impl AsRef<str>) {
        let host = host.as_ref().trim();
        if !host.is_empty() {
            self.hosts.insert(host.to_string());
        }
    }

    /// Fold another policy into this one
    pub fn extend(&mut self, other: &CorsPolicy) {
        self.methods.extend(other.methods.iter().cloned());
        self.headers.extend(other.headers.iter().cloned());
        self.hosts.extend(other.hosts.iter().cloned());
    }

    pub fn methods(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(String::as_str)
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.headers.iter().map(String::as_str)
    }

    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    /// Allowed origins derived from the host set
    pub fn origins(&self) -> Vec<HeaderValue> {
        let mut origins = Vec::with_capacity(self.hosts.len() * 2);
        for host in &self.hosts {
            if host.contains('*') {
                warn!(host = %host, "Wildcard CORS host ignored");
                continue;
            }
            for scheme in ["http", "https"] {
                match HeaderValue::from_str(&format!("{scheme}://{host}")) {
                    Ok(origin) => origins.push(origin),
                    Err(_) => warn!(host = %host, "Invalid CORS host ignored"),
                }
            }
        }
        origins
    }

    /// Build the tower-http layer. Entries that do not parse are skipped.
    pub fn to_layer(&self) -> CorsLayer {
        let methods: Vec<Method> = self
            .methods
            .iter()
            .filter_map(|m| match Method::from_bytes(m.as_bytes()) {
                Ok(method) => Some(method),
                Err(_) => {
                    warn!(method = %m, "Invalid CORS method ignored");
                    None
                }
            })
            .collect();

        let headers: Vec<HeaderName> = self
            .headers
            .iter()
            .filter_map(|h| match HeaderName::from_bytes(h.as_bytes()) {
                Ok(name) => Some(name),
                Err(_) => {
                    warn!(header = %h, "Invalid CORS header ignored");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_methods(AllowMethods::list(methods))
            .allow_headers(AllowHeaders::list(headers))
            .allow_origin(AllowOrigin::list(self.origins()))
    }
}
