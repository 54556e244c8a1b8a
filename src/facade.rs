//! Data Client Facade (spec.md §4.8): orchestrates one poll cycle and exposes
//! the initial-load / update entry points. Single-producer — only the facade's
//! owning task may call `load_all`/`load_update` (spec.md §5).

use std::collections::HashMap;
use std::path::PathBuf;

use crate::certificate_registry::CertificateRegistry;
use crate::cluster_client::ClusterClient;
use crate::cluster_state::ClusterState;
use crate::default_filters;
use crate::err::ClientResult;
use crate::healthcheck::{self, HealthcheckOptions};
use crate::model::{Route, RouteId};
use crate::translator::{Translator, TranslatorConfig};

pub struct FacadeConfig {
    pub translator: TranslatorConfig,
    pub default_filters_dir: Option<PathBuf>,
    pub provide_healthcheck: bool,
    pub reverse_source_predicate: bool,
    pub debug_access_log: bool,
}

pub struct DataClientFacade {
    client: ClusterClient,
    config: FacadeConfig,
    certificate_registry: Box<dyn CertificateRegistry>,
    previous: Option<HashMap<RouteId, Route>>,
}

impl DataClientFacade {
    pub fn new(client: ClusterClient, config: FacadeConfig, certificate_registry: Box<dyn CertificateRegistry>) -> Self {
        DataClientFacade {
            client,
            config,
            certificate_registry,
            previous: None,
        }
    }

    async fn poll(&self) -> ClientResult<Vec<Route>> {
        let snapshot = self.client.fetch_cluster_state().await?;
        let state = ClusterState::new(snapshot);

        if let Some(secrets) = &state.secrets {
            self.certificate_registry.sync(secrets);
        }

        let default_filters = match &self.config.default_filters_dir {
            Some(dir) => default_filters::load(dir),
            None => HashMap::new(),
        };

        let translator = Translator::new(&state, &default_filters, &self.config.translator);
        let mut routes = translator.translate();

        if self.config.provide_healthcheck {
            let mut healthcheck_routes = healthcheck::routes(&HealthcheckOptions {
                reverse_source_predicate: self.config.reverse_source_predicate,
                debug_access_log: self.config.debug_access_log,
            });
            healthcheck_routes.extend(routes);
            routes = healthcheck_routes;
        }

        Ok(routes)
    }

    /// Triggers one poll cycle, returns the full route set, caches it as `previous`.
    pub async fn load_all(&mut self) -> ClientResult<Vec<Route>> {
        let routes = self.poll().await?;
        self.previous = Some(routes.iter().map(|r| (r.id.clone(), r.clone())).collect());
        Ok(routes)
    }

    /// Triggers one poll cycle, computes the delta against `previous`.
    /// On error, `previous` is retained unchanged (spec.md §4.8).
    pub async fn load_update(&mut self) -> ClientResult<(Vec<Route>, Vec<RouteId>)> {
        let routes = self.poll().await?;
        let fresh: HashMap<RouteId, Route> = routes.iter().map(|r| (r.id.clone(), r.clone())).collect();

        let empty = HashMap::new();
        let previous = self.previous.as_ref().unwrap_or(&empty);

        let upserts: Vec<Route> = routes
            .iter()
            .filter(|r| previous.get(&r.id) != Some(r))
            .cloned()
            .collect();
        let deleted_ids: Vec<RouteId> = previous
            .keys()
            .filter(|id| !fresh.contains_key(*id))
            .cloned()
            .collect();

        self.previous = Some(fresh);
        Ok((upserts, deleted_ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Backend, PathPredicate};

    fn route(id: &str) -> Route {
        Route {
            id: RouteId::new(id),
            host_matchers: Vec::new(),
            path_predicate: PathPredicate::Absent,
            extra_predicates: Vec::new(),
            filters: Vec::new(),
            backend: Backend::ShuntClose { status: 404 },
        }
    }

    #[test]
    fn delta_correctness_properties() {
        let previous: HashMap<RouteId, Route> =
            vec![route("a"), route("b")].into_iter().map(|r| (r.id.clone(), r)).collect();
        let fresh = [route("a"), route("c")];
        let fresh_map: HashMap<RouteId, Route> = fresh.iter().cloned().map(|r| (r.id.clone(), r)).collect();

        let upserts: Vec<RouteId> = fresh
            .iter()
            .filter(|r| previous.get(&r.id) != Some(r))
            .map(|r| r.id.clone())
            .collect();
        let deleted: Vec<RouteId> = previous
            .keys()
            .filter(|id| !fresh_map.contains_key(*id))
            .cloned()
            .collect();

        assert_eq!(upserts, vec![RouteId::new("c")]);
        assert_eq!(deleted, vec![RouteId::new("b")]);
    }
}
