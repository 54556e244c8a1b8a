//! Error taxonomy (spec.md §7). `ClientError` aborts a whole poll; `ConvertError`
//! is scoped to a single path rule and is always handled by dropping that rule.

pub type ClientResult<T> = Result<T, ClientError>;
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Failures that abort the entire poll cycle (spec.md §7: TransportError, DecodeError).
/// `previous` routes are retained by the facade when one of these surfaces.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("API server URL not found")]
    ApiServerUrlNotFound,
    #[error("Kubernetes transport error: {0}")]
    Transport(#[from] kube::Error),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to decode Kubernetes API response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid URI: {0}")]
    Uri(#[from] http::uri::InvalidUri),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures scoped to a single PathRule (spec.md §7). The caller drops the
/// offending rule/artifact and continues with the rest of the ingress.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConvertError {
    #[error("path rule has no backend reference")]
    InvalidBackend,
    #[error("service {namespace}/{name} not found")]
    ServiceNotFound { namespace: String, name: String },
    #[error("namespace {0} not found")]
    ResourceNotFound(String),
    #[error("port not found for service {namespace}/{name}")]
    PortNotFound { namespace: String, name: String },
    #[error("external host {0} not allowed by configured allow-list")]
    NotAllowedExternalName(String),
    #[error("endpoints present but no matching service port: {0}")]
    InternalInconsistency(String),
}
