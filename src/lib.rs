//! Kubernetes-to-route-table translation core (spec.md). Fetches a cluster
//! snapshot, resolves Ingress rules into backend routes, and computes the
//! update delta between two successive polls.

pub mod annotations;
pub mod args;
pub mod certificate_registry;
pub mod cluster_client;
pub mod cluster_state;
pub mod consts;
pub mod ctx;
pub mod default_filters;
pub mod err;
pub mod facade;
pub mod healthcheck;
pub mod model;
pub mod path_converter;
pub mod route_id;
pub mod translator;
pub mod weights;
