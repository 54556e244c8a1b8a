//! Cluster Client (spec.md §4.1): authenticated fetch of one consistent
//! snapshot. In-cluster mode reuses `kube::Config::incluster`, which already
//! implements the bearer-token + CA-bundle + env-var flow spec.md §6
//! describes; external mode builds a bare `kube::Config` against a supplied
//! URL with no authorization header.

use std::env;

use http::Request;
use k8s_openapi::List;
use k8s_openapi::api::core::v1::{Endpoints, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;
use kube::{Client, Config};
use regex::Regex;

use crate::cluster_state::Snapshot;
use crate::err::{ClientError, ClientResult};

#[derive(Debug, Clone)]
pub enum TransportMode {
    InCluster,
    External { url: String },
}

pub struct ClusterClient {
    client: Client,
    namespace: Option<String>,
    ingress_class: Regex,
    fetch_secrets: bool,
}

impl ClusterClient {
    pub async fn new(
        mode: TransportMode,
        namespace: Option<String>,
        ingress_class: Regex,
        fetch_secrets: bool,
    ) -> ClientResult<Self> {
        let config = match mode {
            TransportMode::InCluster => {
                if env::var("KUBERNETES_SERVICE_HOST").is_err()
                    || env::var("KUBERNETES_SERVICE_PORT").is_err()
                {
                    return Err(ClientError::ApiServerUrlNotFound);
                }
                Config::incluster().map_err(|e| ClientError::Config(e.to_string()))?
            }
            TransportMode::External { url } => {
                Config::new(url.parse().map_err(|e: http::uri::InvalidUri| {
                    ClientError::Config(e.to_string())
                })?)
            }
        };
        let client = Client::try_from(config)?;
        Ok(ClusterClient {
            client,
            namespace,
            ingress_class,
            fetch_secrets,
        })
    }

    fn path(&self, cluster_wide: &str, namespaced_fmt: impl Fn(&str) -> String) -> String {
        match &self.namespace {
            Some(ns) => namespaced_fmt(ns),
            None => cluster_wide.to_string(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = Request::builder()
            .uri(path)
            .body(Vec::new())
            .map_err(|e| ClientError::Config(e.to_string()))?;
        self.client.request(request).await.map_err(ClientError::from)
    }

    /// Whether an Ingress passes the ingress-class filter (spec.md §4.1).
    fn admits(&self, ingress: &Ingress) -> bool {
        let annotation_class = ingress.metadata.annotations.as_ref().and_then(|a| {
            a.get(crate::consts::INGRESS_CLASS)
                .or_else(|| a.get(crate::consts::INGRESS_CLASS_ZALANDO))
                .map(String::as_str)
        });
        let spec_class = ingress
            .spec
            .as_ref()
            .and_then(|s| s.ingress_class_name.as_deref());

        match annotation_class.or(spec_class) {
            None => true,
            Some(class) => class
                .split(',')
                .map(str::trim)
                .any(|c| self.ingress_class.is_match(c)),
        }
    }

    /// Fetches one consistent snapshot. The four resource kinds are fetched
    /// concurrently since they are independent (spec.md §5).
    pub async fn fetch_cluster_state(&self) -> ClientResult<Snapshot> {
        let ingresses_path = self.path("/apis/networking.k8s.io/v1/ingresses", |ns| {
            format!("/apis/networking.k8s.io/v1/namespaces/{ns}/ingresses")
        });
        let services_path = self.path("/api/v1/services", |ns| format!("/api/v1/namespaces/{ns}/services"));
        let endpoints_path =
            self.path("/api/v1/endpoints", |ns| format!("/api/v1/namespaces/{ns}/endpoints"));
        let secrets_path = self.path("/api/v1/secrets", |ns| format!("/api/v1/namespaces/{ns}/secrets"));

        let (ingresses, services, endpoints, secrets) = tokio::try_join!(
            self.get::<List<Ingress>>(&ingresses_path),
            self.get::<List<Service>>(&services_path),
            self.get::<List<Endpoints>>(&endpoints_path),
            self.fetch_secrets_if_enabled(&secrets_path),
        )?;

        let accepted: Vec<Ingress> = ingresses.items.into_iter().filter(|i| self.admits(i)).collect();

        Ok(Snapshot {
            ingresses: accepted,
            services: services.items,
            endpoints: endpoints.items,
            secrets,
        })
    }

    async fn fetch_secrets_if_enabled(&self, path: &str) -> ClientResult<Option<Vec<Secret>>> {
        if !self.fetch_secrets {
            return Ok(None);
        }
        let list: List<Secret> = self.get(path).await?;
        Ok(Some(list.items))
    }
}
