//! Synthetic healthcheck routes (spec.md §6), emitted by the facade when
//! `ProvideHealthcheck` is configured.

use crate::consts::PRIVATE_CIDRS;
use crate::model::{Backend, PathPredicate, Route, RouteId};

pub struct HealthcheckOptions {
    pub reverse_source_predicate: bool,
    pub debug_access_log: bool,
}

fn source_predicate(reverse: bool) -> String {
    let cidrs = PRIVATE_CIDRS
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");
    if reverse {
        format!("SourceFromLast({cidrs})")
    } else {
        format!("Source({cidrs})")
    }
}

pub fn routes(opts: &HealthcheckOptions) -> Vec<Route> {
    let source = source_predicate(opts.reverse_source_predicate);

    // `ShuntClose` renders its own `status(N) -> <shunt>`; no separate status filter.
    let mut filters_up = Vec::new();
    if !opts.debug_access_log {
        filters_up.push("disableAccessLog(200)".to_string());
    }

    let up = Route {
        id: RouteId::new("kube__healthz_up"),
        host_matchers: Vec::new(),
        path_predicate: PathPredicate::Exact("/kube-system/healthz".to_string()),
        extra_predicates: vec![source.clone()],
        filters: filters_up,
        backend: Backend::ShuntClose { status: 200 },
    };

    let down = Route {
        id: RouteId::new("kube__healthz_down"),
        host_matchers: Vec::new(),
        path_predicate: PathPredicate::Exact("/kube-system/healthz".to_string()),
        extra_predicates: vec![source, "Shutdown()".to_string()],
        filters: Vec::new(),
        backend: Backend::ShuntClose { status: 503 },
    };

    vec![up, down]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_up_and_down_routes_with_expected_ids() {
        let routes = routes(&HealthcheckOptions {
            reverse_source_predicate: false,
            debug_access_log: false,
        });
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].id, RouteId::new("kube__healthz_up"));
        assert_eq!(routes[1].id, RouteId::new("kube__healthz_down"));
        assert!(routes[0].extra_predicates[0].starts_with("Source("));
    }

    #[test]
    fn reverse_source_predicate_swaps_predicate_name() {
        let routes = routes(&HealthcheckOptions {
            reverse_source_predicate: true,
            debug_access_log: false,
        });
        assert!(routes[0].extra_predicates[0].starts_with("SourceFromLast("));
    }

    #[test]
    fn debug_access_log_drops_disable_filter() {
        let routes = routes(&HealthcheckOptions {
            reverse_source_predicate: false,
            debug_access_log: true,
        });
        assert!(!routes[0].filters.iter().any(|f| f.contains("disableAccessLog")));
    }
}
