//! Request classification.
//!
//! Every intercepted request maps to exactly one [`RoutingClass`]. Rules are
//! evaluated in order and the first match wins:
//!
//! 1. API origin and POST/PUT/DELETE: [`RoutingClass::ApiWrite`]
//! 2. API origin and GET: [`RoutingClass::ApiRead`]
//! 3. listed in the shell asset registry: [`RoutingClass::ShellAsset`]
//! 4. anything else: [`RoutingClass::Passthrough`]

use crate::{Error, InterceptedRequest, ShellAssetRegistry};
use serde::{Deserialize, Serialize};
use url::Url;

/// Routing decision for one request. Derived per request, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoutingClass {
    ApiWrite,
    ApiRead,
    ShellAsset,
    Passthrough,
}

/// Pure request classifier.
#[derive(Debug, Clone)]
pub struct RequestClassifier {
    api_origin: String,
    registry: ShellAssetRegistry,
}

impl RequestClassifier {
    pub fn new(api_origin: &str, registry: ShellAssetRegistry) -> Result<Self, Error> {
        let api_origin = Url::parse(api_origin)
            .map_err(|e| Error::InvalidUrl(format!("{api_origin}: {e}")))?
            .origin()
            .ascii_serialization();
        Ok(Self { api_origin, registry })
    }

    pub fn api_origin(&self) -> &str {
        &self.api_origin
    }

    pub fn registry(&self) -> &ShellAssetRegistry {
        &self.registry
    }

    pub fn classify(&self, method: &str, url: &Url) -> RoutingClass {
        let on_api = url.origin().ascii_serialization() == self.api_origin;

        if on_api {
            if ["POST", "PUT", "DELETE"].iter().any(|m| method.eq_ignore_ascii_case(m)) {
                return RoutingClass::ApiWrite;
            }
            if method.eq_ignore_ascii_case("GET") {
                return RoutingClass::ApiRead;
            }
        }

        if self.registry.contains(url) {
            return RoutingClass::ShellAsset;
        }

        RoutingClass::Passthrough
    }

    pub fn classify_request(&self, request: &InterceptedRequest) -> RoutingClass {
        self.classify(&request.method, &request.url)
    }
}
