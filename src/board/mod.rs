//! Board and economy value objects.
//!
//! Zones, players, ideology tracks, and the capped resource purse. Nothing
//! in here knows about phases or actions; the engine composes these.
mod player;
mod resources;
mod tracks;
mod zone;

pub mod layout;

pub use player::*;
pub use resources::*;
pub use tracks::*;
pub use zone::*;
