//! Annotation keys recognized by the annotation decoder (spec.md §4.3).

pub const INGRESS_CLASS: &str = "kubernetes.io/ingress.class";
pub const INGRESS_CLASS_ZALANDO: &str = "zalando.org/ingress.class";

pub const SKIPPER_FILTER: &str = "zalando.org/skipper-filter";
pub const SKIPPER_PREDICATE: &str = "zalando.org/skipper-predicate";
pub const SKIPPER_ROUTES: &str = "zalando.org/skipper-routes";
pub const BACKEND_WEIGHTS: &str = "zalando.org/backend-weights";
pub const SKIPPER_LOADBALANCER: &str = "zalando.org/skipper-loadbalancer";
pub const SKIPPER_BACKEND_PROTOCOL: &str = "zalando.org/skipper-backend-protocol";
pub const RATELIMIT: &str = "zalando.org/ratelimit";
pub const SKIPPER_INGRESS_REDIRECT: &str = "zalando.org/skipper-ingress-redirect";
pub const SKIPPER_INGRESS_REDIRECT_CODE: &str = "zalando.org/skipper-ingress-redirect-code";
pub const SKIPPER_PATH_MODE: &str = "zalando.org/skipper-path-mode";

pub const DEFAULT_EAST_WEST_DOMAIN: &str = "skipper.cluster.local";

pub const PRIVATE_CIDRS: &[&str] = &[
    "10.0.0.0/8",
    "192.168.0.0/16",
    "172.16.0.0/12",
    "127.0.0.1/8",
    "fd00::/8",
    "::1/128",
];
