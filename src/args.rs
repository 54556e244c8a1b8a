//! CLI configuration (spec.md §6 "Configuration").

#[derive(clap::Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
/// Kubernetes-to-route-table translator.
///
/// Polls the cluster's Ingress/Service/Endpoints state and emits a flat,
/// deterministic route table for a reverse proxy to consume.
pub struct KubeRoutesArgs {
    /// Run against the in-cluster API server using the mounted service
    /// account token and env-provided host/port.
    #[arg(long, env = "KUBERNETES_IN_CLUSTER", default_value_t = true)]
    pub kubernetes_in_cluster: bool,

    /// API server URL, used when `kubernetes_in_cluster` is false.
    #[arg(long, env = "KUBERNETES_URL")]
    pub kubernetes_url: Option<String>,

    /// Restrict fetches to a single namespace; absent means cluster-wide.
    #[arg(long, env = "KUBERNETES_NAMESPACE")]
    pub namespace: Option<String>,

    /// Regex an Ingress's class annotation must match to be admitted.
    #[arg(long, env = "INGRESS_CLASS", default_value = "skipper")]
    pub ingress_class: String,

    /// Enable the east-west mirror route for every translated Ingress.
    #[arg(long, env = "KUBERNETES_ENABLE_EAST_WEST", default_value_t = false)]
    pub enable_east_west: bool,

    /// Cluster-internal DNS domain used by the east-west mirror.
    #[arg(long, env = "KUBERNETES_EAST_WEST_DOMAIN", default_value = "")]
    pub east_west_domain: String,

    /// Global default for ImplementationSpecific path matching.
    #[arg(long, env = "PATH_MODE", default_value = "kubernetes-ingress")]
    pub path_mode: String,

    /// Emit the synthetic `/kube-system/healthz` up/down routes.
    #[arg(long, env = "PROVIDE_HEALTHCHECK", default_value_t = false)]
    pub provide_healthcheck: bool,

    /// Use `SourceFromLast` instead of `Source` on the healthcheck predicate.
    #[arg(long, env = "REVERSE_SOURCE_PREDICATE", default_value_t = false)]
    pub reverse_source_predicate: bool,

    /// Directory of per-service default filter fragments, keyed `<service>.<namespace>`.
    #[arg(long, env = "DEFAULT_FILTERS_DIR")]
    pub default_filters_dir: Option<String>,

    /// Regexes an ExternalName Service's host must match at least one of.
    #[arg(long, env = "ALLOWED_EXTERNAL_NAMES", value_delimiter = ',')]
    pub allowed_external_names: Vec<String>,

    /// Fetch Secrets and forward them to the certificate registry.
    #[arg(long, env = "FETCH_SECRETS", default_value_t = false)]
    pub fetch_secrets: bool,

    /// Default backend protocol, unless overridden per-ingress.
    #[arg(long, env = "DEFAULT_BACKEND_PROTOCOL", default_value = "http")]
    pub default_backend_protocol: String,

    /// Default load-balancer algorithm, unless overridden per-ingress.
    #[arg(long, env = "DEFAULT_ALGORITHM", default_value = "round-robin")]
    pub default_algorithm: String,

    /// Default redirect policy when an ingress doesn't set one explicitly.
    #[arg(long, env = "REDIRECT_DEFAULT_ENABLED", default_value_t = false)]
    pub redirect_default_enabled: bool,

    /// HTTP status code used by the redirect auxiliary routes.
    #[arg(long, env = "REDIRECT_DEFAULT_CODE", default_value_t = 308)]
    pub redirect_default_code: u16,

    /// Interval between poll cycles.
    #[arg(long, env = "POLL_INTERVAL_SECONDS", default_value_t = 10)]
    pub poll_interval_seconds: u64,

    /// Log level.
    #[arg(long, env = "LOG_LEVEL", default_value_t = tracing::level_filters::LevelFilter::INFO)]
    pub log_level: tracing::level_filters::LevelFilter,
}
