//! Optimistic replication of a game across participants.
//!
//! Every participant holds a [`Replica`], applies its own actions at once,
//! and broadcasts them through the room. The elected host periodically
//! publishes an authoritative snapshot; replicas accept snapshots
//! last-writer-wins on the state version. [`Session`] drives a replica over
//! any [`Transport`], with heartbeat and backed-off reconnects.
mod debounce;
mod heartbeat;
mod message;
mod replica;
mod session;
mod transport;

pub use debounce::*;
pub use heartbeat::*;
pub use message::*;
pub use replica::*;
pub use session::*;
pub use transport::*;
