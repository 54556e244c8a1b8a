//! Route-table data model (spec.md §3). Kubernetes resources are consumed as
//! the stock `k8s_openapi` types directly; the types here are the ones the
//! translation core synthesizes and the proxy consumes.

use std::fmt;

/// Opaque, stable identity used to diff two successive route tables.
/// Format per spec.md §3: `kube_<ns>__<name>__<host>__<path>__<service>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub String);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl RouteId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }
}

/// One path-match predicate, selected per spec.md §4.4 step 5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPredicate {
    Absent,
    Exact(String),
    Subtree(String),
    Regexp(String),
}

impl PathPredicate {
    pub fn to_dsl(&self) -> Option<String> {
        match self {
            PathPredicate::Absent => None,
            PathPredicate::Exact(p) => Some(format!("Path(\"{p}\")")),
            PathPredicate::Subtree(p) => Some(format!("PathSubtree(\"{p}\")")),
            PathPredicate::Regexp(p) => Some(format!("PathRegexp(\"{p}\")")),
        }
    }

    /// Whether this predicate matches something other than the host root,
    /// i.e. whether a per-host catch-all is needed to cover the rest (spec §3 inv. 3).
    pub fn is_non_root(&self) -> bool {
        match self {
            PathPredicate::Absent => false,
            PathPredicate::Exact(p) | PathPredicate::Subtree(p) => p != "/",
            PathPredicate::Regexp(p) => p != "^/" && p != "^(/)",
        }
    }
}

/// Resolved backend reference, the one ServiceRef carries on a PathRule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServicePort {
    ByName(String),
    ByNumber(i32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRef {
    pub name: String,
    pub port: ServicePort,
}

/// Route backend (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    /// Internal fixed response, no network backend (spec.md: "shunt route").
    ShuntClose { status: u16 },
    /// Single static or resolved backend URL.
    Network(String),
    /// Multiple endpoint URLs balanced by a named algorithm.
    LoadBalanced { urls: Vec<String>, algorithm: String },
}

impl Backend {
    pub fn to_dsl(&self) -> String {
        match self {
            Backend::ShuntClose { status } => format!("status({status}) -> <shunt>"),
            Backend::Network(url) => format!("\"{url}\""),
            Backend::LoadBalanced { urls, algorithm } => {
                let joined = urls
                    .iter()
                    .map(|u| format!("\"{u}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("<{algorithm}, {joined}>")
            }
        }
    }
}

/// A single emitted route (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub id: RouteId,
    /// Rendered `Host(...)` fragments, ordered.
    pub host_matchers: Vec<String>,
    pub path_predicate: PathPredicate,
    /// Annotation predicates, `Traffic(w)`, and `True()` no-ops, in emission order.
    pub extra_predicates: Vec<String>,
    /// `defaultFilters ⧺ annotationFilters ⧺ routeFilters` (spec.md §4.6 step 4).
    pub filters: Vec<String>,
    pub backend: Backend,
}

impl Route {
    /// Renders the route in the downstream DSL (spec.md §6):
    /// `<id>: <predicates> -> <filters> -> <backend>;`
    pub fn to_dsl(&self) -> String {
        let mut predicates: Vec<String> = self.host_matchers.clone();
        if let Some(p) = self.path_predicate.to_dsl() {
            predicates.push(p);
        }
        predicates.extend(self.extra_predicates.iter().cloned());
        let predicate_str = if predicates.is_empty() {
            "*".to_string()
        } else {
            predicates.join(" && ")
        };

        let mut parts = vec![format!("{}: {}", self.id, predicate_str)];
        parts.push(self.filters.join(" -> "));
        parts.push(self.backend.to_dsl());
        parts.retain(|p| !p.is_empty());
        format!("{};", parts.join(" -> "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    Exact,
    Prefix,
    ImplementationSpecific,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathMode {
    KubernetesIngress,
    PathPrefix,
    PathRegexp,
}

impl PathMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "kubernetes-ingress" => Some(PathMode::KubernetesIngress),
            "path-prefix" => Some(PathMode::PathPrefix),
            "path-regexp" => Some(PathMode::PathRegexp),
            _ => None,
        }
    }
}
