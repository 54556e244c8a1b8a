//! Path/Rule Converter (spec.md §4.4): resolves one Ingress path rule into a
//! single Route.

use regex::Regex;

use crate::cluster_state::ClusterState;
use crate::err::ConvertError;
use crate::model::{Backend, PathMode, PathPredicate, PathType, Route, RouteId};

pub struct ConvertInput<'a> {
    pub route_id: RouteId,
    pub ingress_namespace: &'a str,
    pub host: &'a str,
    pub path: &'a str,
    pub path_type: PathType,
    pub service_name: &'a str,
    pub port: crate::model::ServicePort,
    pub weight: f64,
    pub noop_count: u32,
    pub path_mode: PathMode,
    pub algorithm: &'a str,
    pub backend_protocol: &'a str,
    pub allowed_external_names: &'a [Regex],
}

/// Escapes a literal host into the `Host(...)` regex predicate (spec.md §4.4 step 6).
pub fn host_matcher(host: &str) -> String {
    format!("Host(/^({}\\.?(:[0-9]+)?)$/)", regex::escape(host))
}

pub fn convert(state: &ClusterState, input: ConvertInput<'_>) -> Result<Route, ConvertError> {
    let service = state.get_service(input.ingress_namespace, input.service_name)?;

    let backend = if let Some(spec) = &service.spec {
        if spec.type_.as_deref() == Some("ExternalName") {
            let external_host = spec.external_name.clone().unwrap_or_default();
            if !input
                .allowed_external_names
                .iter()
                .any(|re| re.is_match(&external_host))
            {
                return Err(ConvertError::NotAllowedExternalName(external_host));
            }
            Backend::Network(format!("{}://{}", input.backend_protocol, external_host))
        } else {
            let service_port = state.resolve_port(service, &crate::model::ServiceRef {
                name: input.service_name.to_string(),
                port: input.port.clone(),
            })?;
            let addresses = state.endpoint_addresses(
                input.ingress_namespace,
                input.service_name,
                input.backend_protocol,
                service_port,
            );
            match addresses.len() {
                0 => Backend::ShuntClose { status: 502 },
                1 => Backend::Network(addresses.into_iter().next().unwrap()),
                _ => Backend::LoadBalanced {
                    urls: addresses,
                    algorithm: input.algorithm.to_string(),
                },
            }
        }
    } else {
        return Err(ConvertError::InternalInconsistency(
            "service has no spec".to_string(),
        ));
    };

    let path_predicate = select_path_predicate(input.path, input.path_type, input.path_mode);

    let mut extra_predicates = Vec::new();
    if input.weight > 0.0 && input.weight < 1.0 {
        extra_predicates.push(format!("Traffic({:.6})", input.weight));
    }
    for _ in 0..input.noop_count {
        extra_predicates.push("True()".to_string());
    }

    let host_matchers = if input.host.is_empty() {
        Vec::new()
    } else {
        vec![host_matcher(input.host)]
    };

    Ok(Route {
        id: input.route_id,
        host_matchers,
        path_predicate,
        extra_predicates,
        filters: Vec::new(),
        backend,
    })
}

/// Path predicate selection (spec.md §4.4 step 5).
pub fn select_path_predicate(path: &str, path_type: PathType, mode: PathMode) -> PathPredicate {
    match path_type {
        PathType::Exact => PathPredicate::Exact(path.to_string()),
        PathType::Prefix => PathPredicate::Subtree(path.to_string()),
        PathType::ImplementationSpecific => {
            if path.is_empty() {
                PathPredicate::Absent
            } else {
                match mode {
                    PathMode::PathPrefix => PathPredicate::Subtree(path.to_string()),
                    PathMode::PathRegexp => PathPredicate::Regexp(path.to_string()),
                    PathMode::KubernetesIngress => {
                        if path == "/" {
                            PathPredicate::Regexp("^/".to_string())
                        } else {
                            PathPredicate::Regexp(format!("^({path})"))
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    /// Path predicate selection matrix (spec.md §4.4 step 5).
    #[rstest]
    #[case::exact("/test1", PathType::Exact, PathMode::KubernetesIngress, PathPredicate::Exact("/test1".to_string()))]
    #[case::prefix("/test1", PathType::Prefix, PathMode::KubernetesIngress, PathPredicate::Subtree("/test1".to_string()))]
    #[case::implementation_specific_empty_path("", PathType::ImplementationSpecific, PathMode::KubernetesIngress, PathPredicate::Absent)]
    #[case::implementation_specific_default_mode("/foo", PathType::ImplementationSpecific, PathMode::KubernetesIngress, PathPredicate::Regexp("^(/foo)".to_string()))]
    #[case::implementation_specific_root_default_mode("/", PathType::ImplementationSpecific, PathMode::KubernetesIngress, PathPredicate::Regexp("^/".to_string()))]
    #[case::implementation_specific_path_prefix_mode("/foo", PathType::ImplementationSpecific, PathMode::PathPrefix, PathPredicate::Subtree("/foo".to_string()))]
    #[case::implementation_specific_path_regexp_mode("^/foo$", PathType::ImplementationSpecific, PathMode::PathRegexp, PathPredicate::Regexp("^/foo$".to_string()))]
    fn path_predicate_matrix(
        #[case] path: &str,
        #[case] path_type: PathType,
        #[case] mode: PathMode,
        #[case] expected: PathPredicate,
    ) {
        assert_eq!(select_path_predicate(path, path_type, mode), expected);
    }

    #[test]
    fn host_matcher_escapes_dots() {
        assert_eq!(
            host_matcher("foo.example.org"),
            "Host(/^(foo\\.example\\.org\\.?(:[0-9]+)?)$/)"
        );
    }
}
