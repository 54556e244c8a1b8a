//! Annotation Decoder (spec.md §4.3). Filter/predicate/route fragments are
//! kept as opaque strings — parsing them is delegated to the (external)
//! filter-DSL parser.

use std::collections::BTreeMap;

use crate::consts;
use crate::model::PathMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectPolicy {
    Enable,
    Disable,
    Default,
}

#[derive(Debug, Clone, Default)]
pub struct DecodedAnnotations {
    pub filter_fragment: Option<String>,
    pub predicate_fragment: Option<String>,
    pub extra_routes_fragment: Option<String>,
    pub backend_weights: Option<BTreeMap<String, f64>>,
    pub algorithm: Option<String>,
    pub backend_protocol: Option<String>,
    pub ratelimit: Option<String>,
    pub redirect: Option<RedirectPolicy>,
    pub redirect_code: Option<u16>,
    pub path_mode: Option<PathMode>,
}

impl DecodedAnnotations {
    pub fn decode(annotations: &BTreeMap<String, String>) -> Self {
        let backend_weights = annotations
            .get(consts::BACKEND_WEIGHTS)
            .and_then(|raw| match serde_json::from_str::<BTreeMap<String, f64>>(raw) {
                Ok(map) => Some(map),
                Err(err) => {
                    tracing::error!("failed to parse {}: {err}", consts::BACKEND_WEIGHTS);
                    None
                }
            });

        let redirect = annotations.get(consts::SKIPPER_INGRESS_REDIRECT).map(|v| {
            match v.to_lowercase().as_str() {
                "true" => RedirectPolicy::Enable,
                "false" => RedirectPolicy::Disable,
                _ => RedirectPolicy::Default,
            }
        });

        let redirect_code = annotations
            .get(consts::SKIPPER_INGRESS_REDIRECT_CODE)
            .and_then(|v| v.parse::<u16>().ok());

        let path_mode = annotations
            .get(consts::SKIPPER_PATH_MODE)
            .and_then(|v| PathMode::parse(v));

        DecodedAnnotations {
            filter_fragment: annotations.get(consts::SKIPPER_FILTER).cloned(),
            predicate_fragment: annotations.get(consts::SKIPPER_PREDICATE).cloned(),
            extra_routes_fragment: annotations.get(consts::SKIPPER_ROUTES).cloned(),
            backend_weights,
            algorithm: annotations.get(consts::SKIPPER_LOADBALANCER).cloned(),
            backend_protocol: annotations.get(consts::SKIPPER_BACKEND_PROTOCOL).cloned(),
            ratelimit: annotations.get(consts::RATELIMIT).cloned(),
            redirect,
            redirect_code,
            path_mode,
        }
    }

    /// `defaultFilters ⧺ annotationFilters ⧺ routeFilters` (spec.md §4.6 step 4).
    pub fn filter_chain(&self, default_filters: Option<&str>, route_filters: Option<&str>) -> Vec<String> {
        let mut chain = Vec::new();
        if let Some(rl) = &self.ratelimit {
            chain.push(rl.clone());
        }
        if let Some(default) = default_filters {
            chain.push(default.to_string());
        }
        if let Some(f) = &self.filter_fragment {
            chain.push(f.clone());
        }
        if let Some(f) = route_filters {
            chain.push(f.to_string());
        }
        chain
    }
}
