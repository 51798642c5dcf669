//! Room registry, WebSocket bridge, and the HTTP surface around them.
mod casino;
mod config;
mod handle;
mod local;
mod server;

pub use casino::*;
pub use config::*;
pub use handle::*;
pub use local::*;
pub use server::*;
