//! Ingress Translator (spec.md §4.6): walks every admitted Ingress, merges
//! per-ingress annotation artifacts, and emits the flat route list.

use std::collections::{BTreeMap, HashMap};

use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress};
use regex::Regex;

use crate::annotations::{DecodedAnnotations, RedirectPolicy};
use crate::cluster_state::ClusterState;
use crate::model::{PathMode, PathType, Route, ServicePort};
use crate::path_converter::{self, ConvertInput};
use crate::route_id;
use crate::weights::{self, WeightEntry};

pub struct TranslatorConfig {
    pub global_path_mode: PathMode,
    pub default_backend_protocol: String,
    pub default_algorithm: String,
    pub allowed_external_names: Vec<Regex>,
    pub east_west_domain: Option<String>,
    pub redirect_default_enabled: bool,
    pub redirect_default_code: u16,
}

pub struct Translator<'a> {
    state: &'a ClusterState,
    default_filters: &'a HashMap<(String, String), String>,
    config: &'a TranslatorConfig,
}

impl<'a> Translator<'a> {
    pub fn new(
        state: &'a ClusterState,
        default_filters: &'a HashMap<(String, String), String>,
        config: &'a TranslatorConfig,
    ) -> Self {
        Translator {
            state,
            default_filters,
            config,
        }
    }

    pub fn translate(&self) -> Vec<Route> {
        let mut routes = Vec::new();
        // Poll-scoped, not process-scoped (spec.md §9): both reset per call.
        let mut needs_catchall: HashMap<String, bool> = HashMap::new();
        // Host order as first seen, since `needs_catchall` is a lookup index and
        // must never drive emission order (spec.md §5/§9: stable, declaration-order output).
        let mut catchall_order: Vec<String> = Vec::new();
        let mut redirect_registry: HashMap<String, RedirectPolicy> = HashMap::new();
        let mut route_hosts: HashMap<String, String> = HashMap::new();

        for ingress in &self.state.ingresses {
            self.translate_ingress(
                ingress,
                &mut routes,
                &mut needs_catchall,
                &mut catchall_order,
                &mut redirect_registry,
                &mut route_hosts,
            );
        }

        for host in &catchall_order {
            if needs_catchall.get(host).copied().unwrap_or(false) {
                routes.push(catchall_route(host, "kube"));
                if let Some(domain) = &self.config.east_west_domain {
                    let ew_host = east_west_host(host, domain);
                    routes.push(catchall_route(&ew_host, "kubeew"));
                }
            }
        }

        self.attach_redirects(&mut routes, &redirect_registry, &route_hosts);
        routes
    }

    fn translate_ingress(
        &self,
        ingress: &Ingress,
        routes: &mut Vec<Route>,
        needs_catchall: &mut HashMap<String, bool>,
        catchall_order: &mut Vec<String>,
        redirect_registry: &mut HashMap<String, RedirectPolicy>,
        route_hosts: &mut HashMap<String, String>,
    ) {
        let ns = ingress.metadata.namespace.clone().unwrap_or_default();
        let name = ingress.metadata.name.clone().unwrap_or_default();
        let annotations = ingress.metadata.annotations.clone().unwrap_or_default();
        let decoded = DecodedAnnotations::decode(&annotations);
        let path_mode = decoded.path_mode.unwrap_or(self.config.global_path_mode);
        let algorithm = decoded
            .algorithm
            .clone()
            .unwrap_or_else(|| self.config.default_algorithm.clone());
        let protocol = decoded
            .backend_protocol
            .clone()
            .unwrap_or_else(|| self.config.default_backend_protocol.clone());
        let backend_weights: BTreeMap<String, f64> = decoded.backend_weights.clone().unwrap_or_default();

        let Some(spec) = &ingress.spec else {
            tracing::warn!("ingress {ns}/{name} has no spec section, skipping");
            return;
        };

        if let Some(default_backend) = &spec.default_backend
            && let Some(svc) = &default_backend.service
        {
            match self.convert_default_backend(&ns, &name, svc, &protocol, &algorithm) {
                Ok(route) => routes.push(route),
                Err(err) => tracing::info!("default backend for {ns}/{name}: {err}"),
            }
        }

        for host_rule in spec.rules.iter().flatten() {
            let host = host_rule.host.clone().unwrap_or_default();
            let Some(http) = &host_rule.http else { continue };

            let mut any_nonroot = false;
            let grouped = group_by_path(&http.paths);

            for (path, indices) in &grouped {
                let mut entries: Vec<WeightEntry> = indices
                    .iter()
                    .filter_map(|&i| service_name_of(&http.paths[i]).map(WeightEntry::new))
                    .collect();
                weights::compute(&backend_weights, &mut entries);

                for (entry_idx, &path_idx) in indices.iter().enumerate() {
                    let http_path = &http.paths[path_idx];
                    let Some(svc) = &http_path.backend.service else {
                        tracing::error!("ingress {ns}/{name}: path rule without backend service, dropping");
                        continue;
                    };
                    let Some(port) = service_port(svc) else {
                        tracing::error!(
                            "ingress {ns}/{name}: path rule backend {} has no port, dropping",
                            svc.name
                        );
                        continue;
                    };
                    let path_type = parse_path_type(&http_path.path_type);
                    let weight_entry = entries.get(entry_idx);
                    let weight = weight_entry.map(|e| e.weight).unwrap_or(1.0);
                    let noop_count = weight_entry.map(|e| e.noop_count).unwrap_or(0);

                    if path.is_non_root(path_type, path_mode) {
                        any_nonroot = true;
                    }

                    if let Some(fragment) = &decoded.extra_routes_fragment {
                        let path_predicate = path_converter::select_path_predicate(path, path_type, path_mode);
                        routes.extend(extra_routes(fragment, &ns, &name, &host, path, &path_predicate));
                    }

                    if weight <= 0.0 {
                        continue;
                    }

                    let route_id = route_id::main_route_id("kube_", &ns, &name, &host, path, &svc.name);
                    let input = ConvertInput {
                        route_id,
                        ingress_namespace: &ns,
                        host: &host,
                        path,
                        path_type,
                        service_name: &svc.name,
                        port,
                        weight,
                        noop_count,
                        path_mode,
                        algorithm: &algorithm,
                        backend_protocol: &protocol,
                        allowed_external_names: &self.config.allowed_external_names,
                    };

                    match path_converter::convert(self.state, input) {
                        Ok(mut route) => {
                            if let Some(pred) = &decoded.predicate_fragment {
                                route.extra_predicates.push(pred.clone());
                            }
                            route.filters = decoded.filter_chain(
                                self.default_filters.get(&(svc.name.clone(), ns.clone())).map(String::as_str),
                                None,
                            );
                            route_hosts.insert(route.id.0.clone(), host.clone());
                            // Primary first, mirror immediately after (spec.md §5).
                            let mirror = self
                                .config
                                .east_west_domain
                                .as_ref()
                                .map(|domain| mirror_route(&route, &host, domain));
                            routes.push(route);
                            if let Some(mirror) = mirror {
                                routes.push(mirror);
                            }
                        }
                        Err(err) => tracing::info!("ingress {ns}/{name} path {}: {err}", &path.0),
                    }
                }
            }

            if !needs_catchall.contains_key(&host) {
                catchall_order.push(host.clone());
            }
            needs_catchall.insert(host.clone(), any_nonroot);
        }

        if let Some(policy) = decoded.redirect {
            for host_rule in spec.rules.iter().flatten() {
                let host = host_rule.host.clone().unwrap_or_default();
                redirect_registry.insert(host, policy);
            }
        }
    }

    fn convert_default_backend(
        &self,
        ns: &str,
        name: &str,
        svc: &k8s_openapi::api::networking::v1::IngressServiceBackend,
        protocol: &str,
        algorithm: &str,
    ) -> Result<Route, crate::err::ConvertError> {
        let port = service_port(svc).ok_or(crate::err::ConvertError::InvalidBackend)?;
        let input = ConvertInput {
            route_id: route_id::default_backend_route_id("kube_", ns, name),
            ingress_namespace: ns,
            host: "",
            path: "",
            path_type: PathType::ImplementationSpecific,
            service_name: &svc.name,
            port,
            weight: 1.0,
            noop_count: 0,
            path_mode: PathMode::KubernetesIngress,
            algorithm,
            backend_protocol: protocol,
            allowed_external_names: &self.config.allowed_external_names,
        };
        path_converter::convert(self.state, input)
    }

    fn attach_redirects(
        &self,
        routes: &mut Vec<Route>,
        redirect_registry: &HashMap<String, RedirectPolicy>,
        route_hosts: &HashMap<String, String>,
    ) {
        let mut redirects = Vec::new();
        for route in routes.iter() {
            if is_east_west(&route.id) || is_catchall(&route.id) {
                continue;
            }
            let Some(host) = route_hosts.get(&route.id.0) else {
                continue;
            };
            let enabled = match redirect_registry.get(host).copied() {
                Some(RedirectPolicy::Enable) => true,
                Some(RedirectPolicy::Disable) => false,
                Some(RedirectPolicy::Default) | None => self.config.redirect_default_enabled,
            };
            if !enabled {
                continue;
            }
            let mut redirect = route.clone();
            redirect.id = crate::model::RouteId::new(format!("{}_redirect", route.id));
            redirect.filters = vec![format!("redirectTo({})", self.config.redirect_default_code)];
            redirect.backend = crate::model::Backend::ShuntClose {
                status: self.config.redirect_default_code,
            };
            redirects.push(redirect);
        }
        routes.extend(redirects);
    }
}

fn is_east_west(id: &crate::model::RouteId) -> bool {
    id.0.starts_with("kubeew_")
}

fn is_catchall(id: &crate::model::RouteId) -> bool {
    id.0.contains("__catchall__")
}

fn catchall_route(host: &str, prefix: &str) -> Route {
    Route {
        id: route_id::catchall_route_id(prefix, host),
        host_matchers: if host.is_empty() {
            Vec::new()
        } else {
            vec![path_converter::host_matcher(host)]
        },
        path_predicate: crate::model::PathPredicate::Absent,
        extra_predicates: Vec::new(),
        filters: Vec::new(),
        backend: crate::model::Backend::ShuntClose { status: 404 },
    }
}

fn mirror_route(route: &Route, host: &str, domain: &str) -> Route {
    let mut mirrored = route.clone();
    mirrored.id = crate::model::RouteId::new(format!("kubeew_{}", &route.id.0));
    let ew_host = east_west_host(host, domain);
    mirrored.host_matchers = vec![path_converter::host_matcher(&ew_host)];
    mirrored
}

fn east_west_host(name: &str, domain: &str) -> String {
    let domain = domain.trim_matches('.');
    if name.is_empty() {
        domain.to_string()
    } else {
        format!("{name}.{domain}")
    }
}

fn parse_path_type(s: &str) -> PathType {
    match s {
        "Exact" => PathType::Exact,
        "Prefix" => PathType::Prefix,
        _ => PathType::ImplementationSpecific,
    }
}

fn service_name_of(path: &HTTPIngressPath) -> Option<String> {
    path.backend.service.as_ref().map(|s| s.name.clone())
}

fn service_port(svc: &k8s_openapi::api::networking::v1::IngressServiceBackend) -> Option<ServicePort> {
    let port = svc.port.as_ref()?;
    if let Some(name) = &port.name {
        Some(ServicePort::ByName(name.clone()))
    } else {
        port.number.map(ServicePort::ByNumber)
    }
}

/// Groups path indices by their literal path string, preserving first-seen order
/// (spec.md §4.5: "for each distinct path" shared by multiple PathRules).
fn group_by_path(paths: &[HTTPIngressPath]) -> Vec<(PathRef, Vec<usize>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, p) in paths.iter().enumerate() {
        let key = p.path.clone().unwrap_or_default();
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(i);
    }
    order
        .into_iter()
        .map(|key| {
            let indices = groups.remove(&key).unwrap();
            (PathRef(key), indices)
        })
        .collect()
}

/// A path string, wrapped so catch-all detection can be computed against its
/// type/mode without re-deriving the predicate.
struct PathRef(String);

impl std::ops::Deref for PathRef {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl PathRef {
    fn is_non_root(&self, path_type: PathType, mode: PathMode) -> bool {
        path_converter::select_path_predicate(&self.0, path_type, mode).is_non_root()
    }
}

/// Best-effort split of a `zalando.org/skipper-routes` fragment into individual
/// extra routes (spec.md §4.6 step 3). Each route's own predicate/filter/backend
/// grammar stays opaque — only the top-level `;`/`->` structure is used to find
/// boundaries, consistent with delegating DSL semantics to the filter parser.
/// Emitted once per PathRule, sharing that rule's path/host predicates.
fn extra_routes(
    fragment: &str,
    ns: &str,
    name: &str,
    host: &str,
    path: &str,
    path_predicate: &crate::model::PathPredicate,
) -> Vec<Route> {
    fragment
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(seq, raw)| {
            let segments: Vec<&str> = raw.split("->").map(str::trim).collect();
            let predicate = segments.first().copied().unwrap_or("*").to_string();
            let backend_segment = segments.last().copied().unwrap_or("<shunt>");
            let filters = if segments.len() > 2 {
                segments[1..segments.len() - 1].iter().map(|s| s.to_string()).collect()
            } else {
                Vec::new()
            };
            let backend = if backend_segment.trim() == "<shunt>" {
                crate::model::Backend::ShuntClose { status: 404 }
            } else {
                crate::model::Backend::Network(backend_segment.trim_matches('"').to_string())
            };
            Route {
                id: route_id::extra_route_id("kube_", ns, name, seq, host, path),
                host_matchers: if host.is_empty() {
                    Vec::new()
                } else {
                    vec![path_converter::host_matcher(host)]
                },
                path_predicate: path_predicate.clone(),
                extra_predicates: vec![predicate],
                filters,
                backend,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::api::core::v1::{
        EndpointAddress, EndpointPort, EndpointSubset, Endpoints, Service, ServicePort as K8sServicePort, ServiceSpec,
    };
    use k8s_openapi::api::networking::v1::{
        HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule, IngressServiceBackend,
        IngressSpec, ServiceBackendPort,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::*;
    use crate::cluster_state::{ClusterState, Snapshot};

    fn meta(ns: &str, name: &str) -> ObjectMeta {
        ObjectMeta {
            namespace: Some(ns.to_string()),
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn service(ns: &str, name: &str, port: i32) -> Service {
        Service {
            metadata: meta(ns, name),
            spec: Some(ServiceSpec {
                ports: Some(vec![K8sServicePort {
                    port,
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn endpoints(ns: &str, name: &str, ip: &str, port: i32) -> Endpoints {
        Endpoints {
            metadata: meta(ns, name),
            subsets: Some(vec![EndpointSubset {
                addresses: Some(vec![EndpointAddress {
                    ip: ip.to_string(),
                    ..Default::default()
                }]),
                ports: Some(vec![EndpointPort {
                    port,
                    ..Default::default()
                }]),
                not_ready_addresses: None,
            }]),
        }
    }

    fn path_rule(path: &str, service_name: &str, port: i32) -> HTTPIngressPath {
        HTTPIngressPath {
            path: Some(path.to_string()),
            path_type: "Exact".to_string(),
            backend: IngressBackend {
                service: Some(IngressServiceBackend {
                    name: service_name.to_string(),
                    port: Some(ServiceBackendPort {
                        number: Some(port),
                        name: None,
                    }),
                }),
                resource: None,
            },
        }
    }

    fn ingress(ns: &str, name: &str, annotations: BTreeMap<String, String>, hosts: Vec<(&str, Vec<HTTPIngressPath>)>) -> Ingress {
        let rules = hosts
            .into_iter()
            .map(|(host, paths)| IngressRule {
                host: Some(host.to_string()),
                http: Some(HTTPIngressRuleValue { paths }),
            })
            .collect();
        Ingress {
            metadata: ObjectMeta {
                annotations: Some(annotations),
                ..meta(ns, name)
            },
            spec: Some(IngressSpec {
                rules: Some(rules),
                ..Default::default()
            }),
            status: None,
        }
    }

    fn config() -> TranslatorConfig {
        TranslatorConfig {
            global_path_mode: PathMode::KubernetesIngress,
            default_backend_protocol: "http".to_string(),
            default_algorithm: "round-robin".to_string(),
            allowed_external_names: Vec::new(),
            east_west_domain: None,
            redirect_default_enabled: false,
            redirect_default_code: 308,
        }
    }

    /// spec.md §8 S5: extra-route IDs carry the real (sanitized) path, not a
    /// hardcoded empty one, and share the owning PathRule's path predicate.
    #[test]
    fn extra_route_id_carries_real_path_and_shares_predicate() {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            crate::consts::SKIPPER_ROUTES.to_string(),
            r#"Method("OPTIONS") -> <shunt>;"#.to_string(),
        );
        let paths = vec![path_rule("/", "service1", 80)];
        let state = ClusterState::new(Snapshot {
            ingresses: vec![ingress("foo", "qux", annotations, vec![("www1.example.org", paths)])],
            services: vec![service("foo", "service1", 80)],
            endpoints: vec![endpoints("foo", "service1", "10.0.0.1", 80)],
            secrets: None,
        });
        let cfg = config();
        let routes = Translator::new(&state, &HashMap::new(), &cfg).translate();

        let extra = routes
            .iter()
            .find(|r| r.id.0.starts_with("kube_foo__qux__0__"))
            .expect("extra route emitted");
        assert_eq!(extra.id.0, "kube_foo__qux__0__www1_example_org_____");

        let main = routes
            .iter()
            .find(|r| r.id.0 == "kube_foo__qux__www1_example_org_____service1")
            .expect("main route emitted");
        assert_eq!(extra.path_predicate, main.path_predicate);
    }

    /// spec.md §5/§9: catch-all emission order must follow first-seen host
    /// order, never an unordered map's iteration order.
    #[test]
    fn catchall_order_follows_first_seen_host_order() {
        let hosts = ["a.example.org", "b.example.org", "c.example.org"];
        let ingress_rules = hosts
            .iter()
            .map(|h| (*h, vec![path_rule("/nonroot", "service1", 80)]))
            .collect();
        let state = ClusterState::new(Snapshot {
            ingresses: vec![ingress("foo", "qux", BTreeMap::new(), ingress_rules)],
            services: vec![service("foo", "service1", 80)],
            endpoints: vec![endpoints("foo", "service1", "10.0.0.1", 80)],
            secrets: None,
        });
        let cfg = config();
        let routes = Translator::new(&state, &HashMap::new(), &cfg).translate();

        let catchall_ids: Vec<&str> = routes
            .iter()
            .filter(|r| is_catchall(&r.id))
            .map(|r| r.id.0.as_str())
            .collect();
        let expected: Vec<String> = hosts
            .iter()
            .map(|h| route_id::catchall_route_id("kube", h).0)
            .collect();
        assert_eq!(catchall_ids, expected);
    }

    /// spec.md §5: east-west mirrors immediately follow their primary route.
    #[test]
    fn east_west_mirror_follows_its_primary_immediately() {
        let paths = vec![path_rule("/test1", "service1", 80)];
        let state = ClusterState::new(Snapshot {
            ingresses: vec![ingress("foo", "qux", BTreeMap::new(), vec![("www1.example.org", paths)])],
            services: vec![service("foo", "service1", 80)],
            endpoints: vec![endpoints("foo", "service1", "10.0.0.1", 80)],
            secrets: None,
        });
        let mut cfg = config();
        cfg.east_west_domain = Some("skipper.cluster.local".to_string());
        let routes = Translator::new(&state, &HashMap::new(), &cfg).translate();

        let primary_idx = routes
            .iter()
            .position(|r| r.id.0 == "kube_foo__qux__www1_example_org___test1__service1")
            .expect("primary route emitted");
        let mirror = &routes[primary_idx + 1];
        assert_eq!(mirror.id.0, format!("kubeew_{}", routes[primary_idx].id.0));
    }
}
