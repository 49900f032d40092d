//! Endpoint status reported by the tile management API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Serving endpoint status of a tile.
///
/// Parsing is an exact, case-sensitive match against the API's values.
/// Anything unrecognised is kept verbatim in `Other` and treated like any
/// other not-ready status.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointStatus {
    Online,
    Offline,
    Provisioning,
    NotReady,
    Other(String),
}

impl EndpointStatus {
    /// The readiness sentinel. Only this status lets queued examples be applied.
    pub const READY: &'static str = "ONLINE";

    pub fn parse(value: &str) -> Self {
        match value {
            "ONLINE" => EndpointStatus::Online,
            "OFFLINE" => EndpointStatus::Offline,
            "PROVISIONING" => EndpointStatus::Provisioning,
            "NOT_READY" => EndpointStatus::NotReady,
            other => EndpointStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EndpointStatus::Online => "ONLINE",
            EndpointStatus::Offline => "OFFLINE",
            EndpointStatus::Provisioning => "PROVISIONING",
            EndpointStatus::NotReady => "NOT_READY",
            EndpointStatus::Other(s) => s,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, EndpointStatus::Online)
    }
}

impl From<String> for EndpointStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<EndpointStatus> for String {
    fn from(value: EndpointStatus) -> Self {
        match value {
            EndpointStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for EndpointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
