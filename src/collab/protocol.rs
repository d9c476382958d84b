//! Collaboration wire protocol.
//!
//! Messages are JSON objects tagged by `"t"` and carrying the protocol
//! version in `"v"`. Document versions are assigned by the server; a client
//! applies remote batches strictly in version order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::editor::EditSession;
use crate::editor::edit::{Operation, Position};

/// Current protocol version.
pub const PROTOCOL_VERSION: u32 = 1;

/// Errors raised while decoding or sequencing protocol messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed JSON or unknown message shape.
    #[error("Invalid message: {0}")]
    Json(#[from] serde_json::Error),

    /// Peer speaks another protocol version.
    #[error("Unsupported protocol version {0}")]
    UnsupportedVersion(u32),

    /// A version gap was detected; the document must be reloaded.
    #[error("Resync required: expected version {expected}, received {received}")]
    ResyncRequired { expected: u64, received: u64 },
}

/// Identity of the peer that produced a remote batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorInfo {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub color: String,
}

/// Selection range as sent to peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceRange {
    pub start: Position,
    pub end: Position,
}

/// Cursor and selection shared with peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Presence {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Position>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<PresenceRange>,
}

impl Presence {
    /// Captures the session's cursor and normalized selection.
    #[must_use]
    pub fn from_session(session: &EditSession) -> Self {
        Self {
            cursor: Some(session.cursor()),
            selection: session.selection().map(|sel| {
                let (start, end) = sel.normalized();
                PresenceRange { start, end }
            }),
        }
    }
}

/// Local operations sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpMessage {
    pub v: u32,
    pub op_id: String,
    /// Document version the operations were produced against.
    pub base_version: u64,
    pub ops: Vec<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<Presence>,
}

/// Operations from another client, already ordered by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteOpMessage {
    pub v: u32,
    pub version: u64,
    pub actor: ActorInfo,
    pub ops: Vec<Operation>,
}

/// Server acknowledgement of an [`OpMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AckMessage {
    pub v: u32,
    pub op_id: String,
    pub new_version: u64,
}

/// Server request to reload the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResyncRequiredMessage {
    pub v: u32,
}

/// Any protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Message {
    Op(OpMessage),
    RemoteOp(RemoteOpMessage),
    Ack(AckMessage),
    ResyncRequired(ResyncRequiredMessage),
}

impl Message {
    /// Parses a message and checks its protocol version.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let message: Self = serde_json::from_str(text)?;
        let v = message.protocol_version();
        if v != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedVersion(v));
        }
        Ok(message)
    }

    /// Serializes the message to JSON.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    const fn protocol_version(&self) -> u32 {
        match self {
            Self::Op(m) => m.v,
            Self::RemoteOp(m) => m.v,
            Self::Ack(m) => m.v,
            Self::ResyncRequired(m) => m.v,
        }
    }
}

/// Applies remote batches to a session in document-version order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoteFeed {
    version: u64,
}

impl RemoteFeed {
    /// Starts tracking from a known document version.
    #[must_use]
    pub const fn new(version: u64) -> Self {
        Self { version }
    }

    /// Last document version applied or acknowledged.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Applies a remote batch if it is the next version.
    ///
    /// Duplicates are ignored and return `Ok(None)`. A gap applies nothing
    /// and returns [`ProtocolError::ResyncRequired`]. Otherwise returns the
    /// first affected line, if the batch changed anything.
    pub fn deliver(
        &mut self,
        session: &mut EditSession,
        message: &RemoteOpMessage,
    ) -> Result<Option<usize>, ProtocolError> {
        if message.v != PROTOCOL_VERSION {
            return Err(ProtocolError::UnsupportedVersion(message.v));
        }
        if message.version <= self.version {
            debug!(version = message.version, "ignoring duplicate remote batch");
            return Ok(None);
        }
        let expected = self.version + 1;
        if message.version != expected {
            warn!(expected, received = message.version, "remote version gap");
            return Err(ProtocolError::ResyncRequired {
                expected,
                received: message.version,
            });
        }

        self.version = message.version;
        Ok(session.apply_remote_operations(&message.ops))
    }

    /// Advances past the version assigned to one of our own batches.
    pub fn acknowledge(&mut self, ack: &AckMessage) {
        self.version = self.version.max(ack.new_version);
    }

    /// Resets after the document was reloaded at `version`.
    pub fn reset(&mut self, version: u64) {
        self.version = version;
    }
}

/// Wraps locally emitted operations into [`OpMessage`]s and tracks them
/// until the server acknowledges them.
#[derive(Debug, Default)]
pub struct OutboundBatcher {
    in_flight: HashMap<String, u64>,
}

impl OutboundBatcher {
    /// Creates an empty batcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the message for one batch. Returns `None` for an empty batch.
    pub fn prepare(
        &mut self,
        base_version: u64,
        ops: Vec<Operation>,
        presence: Option<Presence>,
    ) -> Option<OpMessage> {
        let ops: Vec<Operation> = ops.into_iter().filter(|op| !op.is_noop()).collect();
        if ops.is_empty() {
            return None;
        }
        let op_id = Uuid::new_v4().to_string();
        self.in_flight.insert(op_id.clone(), base_version);
        Some(OpMessage {
            v: PROTOCOL_VERSION,
            op_id,
            base_version,
            ops,
            presence,
        })
    }

    /// Forgets an acknowledged batch. Returns false for unknown ids.
    pub fn acknowledge(&mut self, ack: &AckMessage) -> bool {
        self.in_flight.remove(&ack.op_id).is_some()
    }

    /// Number of unacknowledged batches.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Drops all pending batches, e.g. before a resync.
    pub fn clear(&mut self) {
        self.in_flight.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::editor::command::Command;

    fn remote(version: u64, ops: Vec<Operation>) -> RemoteOpMessage {
        RemoteOpMessage {
            v: PROTOCOL_VERSION,
            version,
            actor: ActorInfo {
                client_id: "peer".to_string(),
                display_name: None,
                color: "#ff0000".to_string(),
            },
            ops,
        }
    }

    #[test]
    fn test_decode_remote_op() {
        let json = r##"{"v":1,"t":"remote_op","version":4,
            "actor":{"clientId":"c1","color":"#00f"},
            "ops":[{"type":"insert","pos":0,"text":"x"}]}"##;
        let Message::RemoteOp(msg) = Message::decode(json).unwrap() else {
            panic!("expected remote_op");
        };
        assert_eq!(msg.version, 4);
        assert_eq!(msg.actor.display_name, None);
        assert_eq!(msg.ops, vec![Operation::insert(0, "x")]);
    }

    #[test]
    fn test_encode_ack_shape() {
        let msg = Message::Ack(AckMessage {
            v: 1,
            op_id: "abc".to_string(),
            new_version: 9,
        });
        let value: serde_json::Value = serde_json::from_str(&msg.encode().unwrap()).unwrap();
        assert_eq!(value["t"], "ack");
        assert_eq!(value["opId"], "abc");
        assert_eq!(value["newVersion"], 9);
    }

    #[test]
    fn test_decode_rejects_other_versions() {
        let err = Message::decode(r#"{"v":2,"t":"resync_required"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnsupportedVersion(2)));
    }

    #[test]
    fn test_feed_applies_in_order_and_ignores_duplicates() {
        let mut session = EditSession::from_str("abc");
        let mut feed = RemoteFeed::new(0);

        let first = remote(1, vec![Operation::insert(3, "d")]);
        assert_eq!(feed.deliver(&mut session, &first).unwrap(), Some(1));
        assert_eq!(feed.deliver(&mut session, &first).unwrap(), None);
        assert_eq!(session.content(), "abcd");
        assert_eq!(feed.version(), 1);
    }

    #[test]
    fn test_feed_detects_gap() {
        let mut session = EditSession::from_str("abc");
        let mut feed = RemoteFeed::new(3);
        let err = feed
            .deliver(&mut session, &remote(5, vec![Operation::delete(0, 1)]))
            .unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ResyncRequired {
                expected: 4,
                received: 5
            }
        ));
        assert_eq!(session.content(), "abc");
    }

    #[test]
    fn test_batcher_tracks_in_flight() {
        let mut session = EditSession::from_str("hi");
        session.execute_command(Command::SelectAll);
        let presence = Presence::from_session(&session);

        let mut batcher = OutboundBatcher::new();
        assert!(batcher.prepare(0, vec![Operation::insert(0, "")], None).is_none());

        let msg = batcher
            .prepare(7, vec![Operation::insert(0, "x")], Some(presence))
            .unwrap();
        assert_eq!(msg.base_version, 7);
        assert_eq!(batcher.in_flight(), 1);
        assert!(msg.presence.and_then(|p| p.selection).is_some());

        let ack = AckMessage {
            v: 1,
            op_id: msg.op_id.clone(),
            new_version: 8,
        };
        assert!(batcher.acknowledge(&ack));
        assert!(!batcher.acknowledge(&ack));
        assert_eq!(batcher.in_flight(), 0);
    }
}
