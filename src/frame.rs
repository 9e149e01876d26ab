//! Frame: the envelope for every staged intent.
//!
//! ARCHITECTURE
//! ============
//! Session operations never touch the logs directly. They build a request
//! frame, hand it to the mock socket, and the echo simulator turns it back
//! into a log record once the artificial delay has passed.
//!
//! DESIGN
//! ======
//! - Flat data: payload is always `Map<String, Value>`, never nested, except
//!   for the free-form tree-update payload which is opaque by nature.
//! - The echo simulator routes on the full `syscall` string. Anything it
//!   does not recognise is logged and left out of the logs.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// SYSCALLS
// =============================================================================

pub const CHAT_SEND: &str = "chat:send";
pub const USER_VIEW: &str = "user:view";
pub const USER_CURSOR: &str = "user:cursor";
pub const TREE_UPDATE: &str = "tree:update";

// =============================================================================
// FIELD CONSTANTS
// =============================================================================

pub const FRAME_TEXT: &str = "text";
pub const FRAME_KIND: &str = "kind";
pub const FRAME_NODE_ID: &str = "node_id";
pub const FRAME_VIEW: &str = "view";
pub const FRAME_X: &str = "x";
pub const FRAME_Y: &str = "y";
pub const FRAME_PAYLOAD: &str = "payload";
pub const FRAME_USER_NAME: &str = "user_name";
pub const FRAME_USER_AVATAR: &str = "user_avatar";

// =============================================================================
// TYPES
// =============================================================================

/// Flat key-value payload. Alias to reduce noise in signatures.
pub type Data = HashMap<String, serde_json::Value>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    pub id: Uuid,
    /// Milliseconds since Unix epoch. Set automatically at construction.
    pub ts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    /// Author user id, stamped by the session at staging time.
    pub from: Option<Uuid>,
    pub syscall: String,
    pub data: Data,
}

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// CONSTRUCTORS / BUILDERS
// =============================================================================

impl Frame {
    /// Create a request frame. Entry point for every staged intent.
    pub fn request(syscall: impl Into<String>, data: Data) -> Self {
        Self { id: Uuid::new_v4(), ts: now_ms(), session_id: None, from: None, syscall: syscall.into(), data }
    }

    #[must_use]
    pub fn with_session_id(mut self, session_id: Uuid) -> Self {
        self.session_id = Some(session_id);
        self
    }

    #[must_use]
    pub fn with_from(mut self, from: Uuid) -> Self {
        self.from = Some(from);
        self
    }

    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// ACCESSORS
// =============================================================================

impl Frame {
    #[must_use]
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(serde_json::Value::as_str)
    }

    #[must_use]
    pub fn f64_field(&self, key: &str) -> Option<f64> {
        self.data.get(key).and_then(serde_json::Value::as_f64)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_sets_fields() {
        let frame = Frame::request(CHAT_SEND, Data::new());
        assert_eq!(frame.syscall, "chat:send");
        assert!(frame.session_id.is_none());
        assert!(frame.from.is_none());
        assert!(frame.ts > 0);
    }

    #[test]
    fn typed_field_accessors() {
        let frame = Frame::request(USER_CURSOR, Data::new())
            .with_data(FRAME_X, 12.5)
            .with_data(FRAME_Y, -3.0)
            .with_data(FRAME_VIEW, "genealogy");

        assert_eq!(frame.f64_field(FRAME_X), Some(12.5));
        assert_eq!(frame.f64_field(FRAME_Y), Some(-3.0));
        assert_eq!(frame.str_field(FRAME_VIEW), Some("genealogy"));
        assert_eq!(frame.str_field(FRAME_X), None);
        assert_eq!(frame.f64_field("missing"), None);
    }

    #[test]
    fn json_round_trip_keeps_author() {
        let session_id = Uuid::new_v4();
        let author = Uuid::new_v4();
        let original = Frame::request(TREE_UPDATE, Data::new())
            .with_session_id(session_id)
            .with_from(author)
            .with_data(FRAME_NODE_ID, "m-004");

        let json = serde_json::to_string(&original).expect("serialize");
        let restored: Frame = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.session_id, Some(session_id));
        assert_eq!(restored.from, Some(author));
        assert_eq!(restored.str_field(FRAME_NODE_ID), Some("m-004"));
    }
}
