//! Collaboration support.
//!
//! - [`reconcile`]: rebases the local buffer, cursor and selection against
//!   an ordered stream of remote operations
//! - [`diff`]: derives insert/delete operations between two document states
//! - [`protocol`]: JSON wire messages, version tracking and outbound batching
//! - [`transport`]: the message channel seam and an in-process queue

pub mod diff;
pub mod protocol;
pub mod reconcile;
pub mod transport;

pub use diff::{apply_operations, diff_to_operations};
pub use protocol::{
    AckMessage, ActorInfo, Message, OpMessage, OutboundBatcher, Presence, ProtocolError,
    RemoteFeed, RemoteOpMessage,
};
pub use reconcile::{TrackedOffsets, apply_remote, rebase_offset};
pub use transport::{QueueTransport, RemoteTransport, drain_inbound};
