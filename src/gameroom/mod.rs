//! Room coordinator: one actor per room code that keeps the roster, relays
//! actions and host snapshots, and persists a single record per room.
mod actor;
mod code;
mod room;
mod roster;
mod storage;
mod table;

pub use actor::*;
pub use code::*;
pub use room::*;
pub use roster::*;
pub use storage::*;
pub use table::*;
