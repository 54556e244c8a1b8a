use clap::Parser;
use regex::Regex;

use crate::args::KubeRoutesArgs;
use crate::certificate_registry::NoopCertificateRegistry;
use crate::cluster_client::{ClusterClient, TransportMode};
use crate::facade::{DataClientFacade, FacadeConfig};
use crate::model::PathMode;
use crate::translator::TranslatorConfig;

pub struct Context {
    pub args: KubeRoutesArgs,
    pub facade: DataClientFacade,
}

impl Context {
    pub async fn new() -> anyhow::Result<Self> {
        let args = KubeRoutesArgs::parse();

        let mode = if args.kubernetes_in_cluster {
            TransportMode::InCluster
        } else {
            let url = args
                .kubernetes_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("--kubernetes-url is required when not in-cluster"))?;
            TransportMode::External { url }
        };

        let ingress_class = Regex::new(&args.ingress_class)?;
        let client = ClusterClient::new(mode, args.namespace.clone(), ingress_class, args.fetch_secrets).await?;

        let allowed_external_names = args
            .allowed_external_names
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        let global_path_mode = PathMode::parse(&args.path_mode)
            .ok_or_else(|| anyhow::anyhow!("invalid --path-mode: {}", args.path_mode))?;

        let east_west_domain = if args.enable_east_west {
            let domain = args.east_west_domain.trim_matches('.');
            Some(if domain.is_empty() {
                crate::consts::DEFAULT_EAST_WEST_DOMAIN.to_string()
            } else {
                domain.to_string()
            })
        } else {
            None
        };

        let facade_config = FacadeConfig {
            translator: TranslatorConfig {
                global_path_mode,
                default_backend_protocol: args.default_backend_protocol.clone(),
                default_algorithm: args.default_algorithm.clone(),
                allowed_external_names,
                east_west_domain,
                redirect_default_enabled: args.redirect_default_enabled,
                redirect_default_code: args.redirect_default_code,
            },
            default_filters_dir: args.default_filters_dir.clone().map(std::path::PathBuf::from),
            provide_healthcheck: args.provide_healthcheck,
            reverse_source_predicate: args.reverse_source_predicate,
            debug_access_log: args.log_level >= tracing::level_filters::LevelFilter::DEBUG,
        };

        let facade = DataClientFacade::new(client, facade_config, Box::new(NoopCertificateRegistry));

        Ok(Context { args, facade })
    }
}
