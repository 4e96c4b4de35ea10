//! Services are used to express ways of communicating with the DID subject or associated entities.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Service description.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Identifier for the service.
    pub id: String,

    /// The type of service.
    #[serde(rename = "type")]
    pub type_: String,

    /// Location(s) of the service.
    pub service_endpoint: Endpoint,
}

/// A service endpoint can be a string, a map or a set composed of one or more strings and/or maps.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Endpoint {
    /// A single URL.
    Url(String),

    /// A map of endpoint names to locations.
    Map(Map<String, Value>),

    /// A set of URLs and/or maps.
    Set(Vec<Endpoint>),
}

impl Endpoint {
    /// The endpoint URL when the endpoint is a single string.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn endpoint_shapes() {
        let services: Vec<Service> = serde_json::from_value(json!([
            {"id": "#hub", "type": "HubService", "serviceEndpoint": "https://hub.example.com"},
            {"id": "#agent", "type": "AgentService", "serviceEndpoint": {"uri": "https://agent.example.com"}},
            {"id": "#mixed", "type": "MixedService", "serviceEndpoint": ["https://a.example.com", {"b": "https://b.example.com"}]}
        ]))
        .expect("should deserialize");

        assert_eq!(services[0].service_endpoint.url(), Some("https://hub.example.com"));
        assert!(matches!(services[1].service_endpoint, Endpoint::Map(_)));
        let Endpoint::Set(set) = &services[2].service_endpoint else {
            panic!("should be a set");
        };
        assert_eq!(set.len(), 2);
    }
}
