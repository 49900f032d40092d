//! Domain model (tile ids, kinds, endpoint status, example payloads, errors).

pub mod errors;
pub mod example;
pub mod ids;
pub mod kind;
pub mod status;

pub use self::errors::ManagerError;
pub use self::example::{CreatedExample, ExampleQuestion};
pub use self::ids::TileId;
pub use self::kind::{ParseTileKindError, TileKind};
pub use self::status::EndpointStatus;
