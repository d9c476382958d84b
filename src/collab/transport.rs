//! Transport seam between a session and its collaboration server.

use std::collections::VecDeque;

use super::protocol::{OpMessage, ProtocolError, RemoteFeed, RemoteOpMessage};
use crate::editor::EditSession;

/// An ordered, bidirectional message channel.
pub trait RemoteTransport {
    /// Sends one local batch.
    fn send(&mut self, message: OpMessage);

    /// Returns the next inbound batch, in server order.
    fn poll(&mut self) -> Option<RemoteOpMessage>;
}

/// In-process transport backed by two queues.
#[derive(Debug, Default)]
pub struct QueueTransport {
    inbox: VecDeque<RemoteOpMessage>,
    outbox: Vec<OpMessage>,
}

impl QueueTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a batch as if the server had sent it.
    pub fn push_remote(&mut self, message: RemoteOpMessage) {
        self.inbox.push_back(message);
    }

    /// Takes every batch sent so far.
    pub fn take_sent(&mut self) -> Vec<OpMessage> {
        std::mem::take(&mut self.outbox)
    }
}

impl RemoteTransport for QueueTransport {
    fn send(&mut self, message: OpMessage) {
        self.outbox.push(message);
    }

    fn poll(&mut self) -> Option<RemoteOpMessage> {
        self.inbox.pop_front()
    }
}

/// Applies every pending inbound batch to `session`.
///
/// Returns the first line touched across all applied batches. Stops at the
/// first sequencing error; batches already applied stay applied.
///
/// # Errors
/// Returns [`ProtocolError::ResyncRequired`] on a version gap and
/// [`ProtocolError::UnsupportedVersion`] for foreign protocol versions.
pub fn drain_inbound(
    transport: &mut impl RemoteTransport,
    feed: &mut RemoteFeed,
    session: &mut EditSession,
) -> Result<Option<usize>, ProtocolError> {
    let mut first_line: Option<usize> = None;
    while let Some(message) = transport.poll() {
        if let Some(line) = feed.deliver(session, &message)? {
            first_line = Some(first_line.map_or(line, |f| f.min(line)));
        }
    }
    Ok(first_line)
}
