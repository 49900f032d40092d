//! Tile identifiers.
//!
//! タイル ID はリモート API が払い出す不透明な文字列です。
//! ULID のように中身を解釈することはせず、キューのキーとしてのみ使います。

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Identifier of a remote tile (Knowledge Assistant / Multi-Agent Supervisor).
///
/// Opaque: the queue never parses it, it only compares and hashes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(String);

impl TileId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TileId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TileId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for TileId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn tile_id_serializes_as_plain_string() {
        let id = TileId::new("ka-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"ka-1\"");

        let back: TileId = serde_json::from_str("\"ka-1\"").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn map_lookup_by_str() {
        // Borrow<str> のおかげで &str のまま引ける
        let mut map = HashMap::new();
        map.insert(TileId::from("mas-9"), 1);
        assert_eq!(map.get("mas-9"), Some(&1));
        assert_eq!(map.get("mas-10"), None);
    }
}
