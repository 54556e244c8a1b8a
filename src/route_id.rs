//! RouteID construction (spec.md §3).

use crate::model::RouteId;

pub fn sanitize_host(host: &str) -> String {
    host.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

pub fn sanitize_path(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// `kube_<ns>__<name>__<host-sanitized>__<path-sanitized>__<service>`, or the
/// `kubeew_` variant for the east-west mirror.
pub fn main_route_id(prefix: &str, ns: &str, name: &str, host: &str, path: &str, service: &str) -> RouteId {
    RouteId::new(format!(
        "{prefix}{ns}__{name}__{}__{}__{service}",
        sanitize_host(host),
        sanitize_path(path),
    ))
}

pub fn default_backend_route_id(prefix: &str, ns: &str, name: &str) -> RouteId {
    RouteId::new(format!("{prefix}{ns}__{name}______"))
}

pub fn catchall_route_id(prefix: &str, host: &str) -> RouteId {
    RouteId::new(format!("{prefix}___catchall__{}____", sanitize_host(host)))
}

pub fn extra_route_id(prefix: &str, ns: &str, name: &str, seq: usize, host: &str, path: &str) -> RouteId {
    RouteId::new(format!(
        "{prefix}{ns}__{name}__{seq}__{}__{}__",
        sanitize_host(host),
        sanitize_path(path),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_main_route_id() {
        let id = main_route_id("kube_", "namespace1", "mega", "foo.example.org", "/test1", "service1");
        assert_eq!(id.0, "kube_namespace1__mega__foo_example_org___test1__service1");
    }

    #[test]
    fn s1_catchall_route_id() {
        let id = catchall_route_id("kube", "foo.example.org");
        assert_eq!(id.0, "kube___catchall__foo_example_org____");
    }

    #[test]
    fn default_backend_id_has_no_host_path_or_service() {
        let id = default_backend_route_id("kube_", "ns", "name");
        assert_eq!(id.0, "kube_ns__name______");
    }
}
