//! Game rules: zone control, redeployment rights, powers, phases, and the
//! pure reducer that ties them together.
mod action;
mod catalog;
mod control;
mod phase;
mod powers;
mod reducer;
mod rejection;
mod rights;
mod selection;
mod state;

pub use action::*;
pub use catalog::*;
pub use control::*;
pub use phase::*;
pub use powers::*;
pub use reducer::*;
pub use rejection::*;
pub use rights::*;
pub use selection::*;
pub use state::*;
