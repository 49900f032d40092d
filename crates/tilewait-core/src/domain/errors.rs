//! Errors raised by a `TileManager`.

use thiserror::Error;

use super::kind::TileKind;

/// Failure of a status check or batch apply.
///
/// The queue treats every variant as terminal for the entry it was
/// processing. `UnsupportedKind` is reported separately as a configuration
/// error. A missing tile is not an error: status methods return `Ok(None)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("tile manager does not handle {0} tiles")]
    UnsupportedKind(TileKind),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request rejected: {0}")]
    Rejected(String),
}

impl ManagerError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, ManagerError::UnsupportedKind(_))
    }
}
