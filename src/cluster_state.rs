//! Cluster State (spec.md §4.2): in-memory indexes over one fetched snapshot.

use std::collections::HashMap;

use k8s_openapi::api::core::v1::{Endpoints, Service, ServicePort};

use crate::err::ConvertError;
use crate::model::{ServicePort as RefPort, ServiceRef};

pub struct Snapshot {
    pub ingresses: Vec<k8s_openapi::api::networking::v1::Ingress>,
    pub services: Vec<Service>,
    pub endpoints: Vec<Endpoints>,
    pub secrets: Option<Vec<k8s_openapi::api::core::v1::Secret>>,
}

pub struct ClusterState {
    services: HashMap<(String, String), Service>,
    endpoints: HashMap<(String, String), Endpoints>,
    pub ingresses: Vec<k8s_openapi::api::networking::v1::Ingress>,
    pub secrets: Option<Vec<k8s_openapi::api::core::v1::Secret>>,
}

impl ClusterState {
    pub fn new(snapshot: Snapshot) -> Self {
        let mut services = HashMap::new();
        for svc in snapshot.services {
            let ns = svc.metadata.namespace.clone().unwrap_or_default();
            let name = svc.metadata.name.clone().unwrap_or_default();
            services.insert((ns, name), svc);
        }
        let mut endpoints = HashMap::new();
        for ep in snapshot.endpoints {
            let ns = ep.metadata.namespace.clone().unwrap_or_default();
            let name = ep.metadata.name.clone().unwrap_or_default();
            endpoints.insert((ns, name), ep);
        }
        ClusterState {
            services,
            endpoints,
            ingresses: snapshot.ingresses,
            secrets: snapshot.secrets,
        }
    }

    pub fn get_service(&self, ns: &str, name: &str) -> Result<&Service, ConvertError> {
        self.services
            .get(&(ns.to_string(), name.to_string()))
            .ok_or_else(|| ConvertError::ServiceNotFound {
                namespace: ns.to_string(),
                name: name.to_string(),
            })
    }

    pub fn get_endpoints(&self, ns: &str, name: &str) -> Option<&Endpoints> {
        self.endpoints.get(&(ns.to_string(), name.to_string()))
    }

    /// Resolve a ServiceRef's port against the Service (spec.md §4.2 step 1/2).
    pub fn resolve_port<'s>(
        &self,
        service: &'s Service,
        service_ref: &ServiceRef,
    ) -> Result<&'s ServicePort, ConvertError> {
        let ns = service.metadata.namespace.clone().unwrap_or_default();
        let name = service.metadata.name.clone().unwrap_or_default();
        let ports = service
            .spec
            .as_ref()
            .and_then(|s| s.ports.as_ref())
            .map(|p| p.as_slice())
            .unwrap_or(&[]);

        match &service_ref.port {
            RefPort::ByName(n) => ports
                .iter()
                .find(|p| p.name.as_deref() == Some(n.as_str()))
                .ok_or(ConvertError::PortNotFound { namespace: ns, name }),
            RefPort::ByNumber(num) => ports
                .iter()
                .find(|p| p.port == *num)
                .ok_or(ConvertError::PortNotFound { namespace: ns, name }),
        }
    }

    /// Enumerates backend URLs for a service port by matching against endpoint
    /// subsets' port list (by name, falling back to number), Cartesian-producing
    /// `protocol://ip:port` over every address, sorted by (ip, port) (spec.md §4.2).
    pub fn endpoint_addresses(
        &self,
        ns: &str,
        svc_name: &str,
        protocol: &str,
        service_port: &ServicePort,
    ) -> Vec<String> {
        let Some(endpoints) = self.get_endpoints(ns, svc_name) else {
            return Vec::new();
        };
        let Some(subsets) = endpoints.subsets.as_ref() else {
            return Vec::new();
        };

        let mut pairs: Vec<(String, i32)> = Vec::new();
        for subset in subsets {
            let Some(ports) = subset.ports.as_ref() else {
                continue;
            };
            let matching_port = ports.iter().find(|p| match &service_port.name {
                Some(name) => p.name.as_deref() == Some(name.as_str()),
                None => p.port == service_port.port,
            });
            let Some(matching_port) = matching_port else {
                continue;
            };
            let Some(addresses) = subset.addresses.as_ref() else {
                continue;
            };
            for addr in addresses {
                pairs.push((addr.ip.clone(), matching_port.port));
            }
        }
        pairs.sort();
        pairs.dedup();
        pairs
            .into_iter()
            .map(|(ip, port)| format!("{protocol}://{ip}:{port}"))
            .collect()
    }
}
