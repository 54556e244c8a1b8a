//! Certificate registry seam (spec.md §1: "out of scope... appears only
//! through the contract the core consumes"). TLS termination and secret
//! distribution live entirely in the implementation; the core only hands
//! fetched secrets across this trait.

use k8s_openapi::api::core::v1::Secret;

pub trait CertificateRegistry: Send + Sync {
    fn sync(&self, secrets: &[Secret]);
}

/// Default used when no certificate registry is configured.
pub struct NoopCertificateRegistry;

impl CertificateRegistry for NoopCertificateRegistry {
    fn sync(&self, _secrets: &[Secret]) {}
}
