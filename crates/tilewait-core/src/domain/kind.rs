//! Tile kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of tile. Selects which status accessor and batch method the
/// queue calls on a `TileManager`.
///
/// Serialized with the short names the deployment files use: `KA` / `MAS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    #[serde(rename = "KA")]
    KnowledgeAssistant,

    #[serde(rename = "MAS")]
    MultiAgentSupervisor,
}

impl TileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TileKind::KnowledgeAssistant => "KA",
            TileKind::MultiAgentSupervisor => "MAS",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown tile kind: {0:?} (expected \"KA\" or \"MAS\")")]
pub struct ParseTileKindError(pub String);

impl FromStr for TileKind {
    type Err = ParseTileKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "KA" => Ok(TileKind::KnowledgeAssistant),
            "MAS" => Ok(TileKind::MultiAgentSupervisor),
            other => Err(ParseTileKindError(other.to_string())),
        }
    }
}
