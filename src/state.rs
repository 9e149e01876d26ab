//! Shared session state.
//!
//! DESIGN
//! ======
//! `SessionState` is the single holder consumers read "live" collaboration
//! state from: the signed-in user, the roster of active users, the chat log,
//! the bounded tree-update log and the selected node. It is shared between the
//! session handle and the echo task behind an `Arc<RwLock<_>>`.
//!
//! All logs are append-only. The only eviction is the fixed-length trim on the
//! tree-update log, oldest first. Node ids are never validated.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::frame::now_ms;

/// Handle shared by the session and the echo simulator.
pub type SharedState = Arc<RwLock<SessionState>>;

// =============================================================================
// CHAT MESSAGE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    #[default]
    Text,
    System,
    Achievement,
    Announcement,
}

impl MessageKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::System => "system",
            Self::Achievement => "achievement",
            Self::Announcement => "announcement",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "text" => Some(Self::Text),
            "system" => Some(Self::System),
            "achievement" => Some(Self::Achievement),
            "announcement" => Some(Self::Announcement),
            _ => None,
        }
    }
}

/// One chat log entry. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_avatar: String,
    pub content: String,
    /// Milliseconds since Unix epoch, from the session clock.
    pub timestamp: i64,
    pub kind: MessageKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_node: Option<String>,
}

// =============================================================================
// ACTIVE USER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    #[default]
    Viewing,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CursorPosition {
    pub x: f64,
    pub y: f64,
}

/// A session participant tracked for presence and cursor display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveUser {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
    pub current_view: String,
    pub last_seen: i64,
    pub status: PresenceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<CursorPosition>,
}

impl ActiveUser {
    /// A fresh participant looking at the dashboard.
    pub fn new(name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            avatar: avatar.into(),
            current_view: "dashboard".into(),
            last_seen: now_ms(),
            status: PresenceStatus::Viewing,
            cursor: None,
        }
    }
}

// =============================================================================
// TREE UPDATE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    MemberUpdate,
    RankChange,
    VolumeUpdate,
    NewMember,
    StatusChange,
}

impl UpdateKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MemberUpdate => "member_update",
            Self::RankChange => "rank_change",
            Self::VolumeUpdate => "volume_update",
            Self::NewMember => "new_member",
            Self::StatusChange => "status_change",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "member_update" => Some(Self::MemberUpdate),
            "rank_change" => Some(Self::RankChange),
            "volume_update" => Some(Self::VolumeUpdate),
            "new_member" => Some(Self::NewMember),
            "status_change" => Some(Self::StatusChange),
            _ => None,
        }
    }
}

/// A simulated change to a member node. Never mutated after append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeUpdate {
    pub id: Uuid,
    pub kind: UpdateKind,
    pub node_id: String,
    pub data: serde_json::Value,
    pub user_id: Uuid,
    pub user_name: String,
    pub timestamp: i64,
}

/// The caller-supplied part of a tree update; the rest is filled in on echo.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeUpdateDraft {
    pub kind: UpdateKind,
    pub node_id: String,
    pub data: serde_json::Value,
}

impl TreeUpdateDraft {
    pub fn new(kind: UpdateKind, node_id: impl Into<String>, data: serde_json::Value) -> Self {
        Self { kind, node_id: node_id.into(), data }
    }
}

// =============================================================================
// SESSION STATE
// =============================================================================

pub struct SessionState {
    pub current_user: Option<ActiveUser>,
    /// Roster in first-seen order. Entries are updated in place, never removed.
    pub active_users: Vec<ActiveUser>,
    pub messages: Vec<ChatMessage>,
    pub tree_updates: VecDeque<TreeUpdate>,
    pub selected_node: Option<String>,
    update_capacity: usize,
    last_ts: i64,
}

/// Owned copy of the session state handed to renderers.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub current_user: Option<ActiveUser>,
    pub active_users: Vec<ActiveUser>,
    pub messages: Vec<ChatMessage>,
    pub tree_updates: Vec<TreeUpdate>,
    pub selected_node: Option<String>,
}

impl SessionState {
    #[must_use]
    pub fn new(update_capacity: usize) -> Self {
        Self {
            current_user: None,
            active_users: Vec::new(),
            messages: Vec::new(),
            tree_updates: VecDeque::with_capacity(update_capacity),
            selected_node: None,
            update_capacity: update_capacity.max(1),
            last_ts: 0,
        }
    }

    #[must_use]
    pub fn update_capacity(&self) -> usize {
        self.update_capacity
    }

    /// Wall-clock milliseconds, bumped so every call is strictly later than the last.
    pub fn next_timestamp(&mut self) -> i64 {
        let ts = now_ms().max(self.last_ts + 1);
        self.last_ts = ts;
        ts
    }

    pub fn push_message(&mut self, message: ChatMessage) {
        self.last_ts = self.last_ts.max(message.timestamp);
        self.messages.push(message);
    }

    /// Append a tree update, returning the evicted entry when over capacity.
    pub fn push_tree_update(&mut self, update: TreeUpdate) -> Option<TreeUpdate> {
        self.last_ts = self.last_ts.max(update.timestamp);
        self.tree_updates.push_back(update);
        if self.tree_updates.len() > self.update_capacity {
            return self.tree_updates.pop_front();
        }
        None
    }

    /// Insert a roster entry, or replace the one with the same id in place.
    pub fn upsert_active_user(&mut self, user: ActiveUser) {
        match self.active_users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => self.active_users.push(user),
        }
    }

    /// Mutable roster entry for `user_id`, created from `template` on first sight.
    pub fn roster_entry(&mut self, user_id: Uuid, template: impl FnOnce() -> ActiveUser) -> &mut ActiveUser {
        let idx = match self.active_users.iter().position(|u| u.id == user_id) {
            Some(idx) => idx,
            None => {
                let mut user = template();
                user.id = user_id;
                self.active_users.push(user);
                self.active_users.len() - 1
            }
        };
        &mut self.active_users[idx]
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_user: self.current_user.clone(),
            active_users: self.active_users.clone(),
            messages: self.messages.clone(),
            tree_updates: self.tree_updates.iter().cloned().collect(),
            selected_node: self.selected_node.clone(),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::time::Duration;

    use super::*;
    use crate::config::SessionConfig;

    /// Config with a short fixed echo delay and no sample data.
    #[must_use]
    pub fn fast_config() -> SessionConfig {
        SessionConfig {
            echo_delay: Duration::from_millis(5),
            echo_jitter: Duration::ZERO,
            activity_seed: Some(7),
            seed_samples: false,
            ..SessionConfig::default()
        }
    }

    #[must_use]
    pub fn dummy_user(name: &str) -> ActiveUser {
        ActiveUser::new(name, format!("/avatars/{}.png", name.to_lowercase()))
    }

    #[must_use]
    pub fn dummy_update(node_id: &str, timestamp: i64) -> TreeUpdate {
        TreeUpdate {
            id: Uuid::new_v4(),
            kind: UpdateKind::VolumeUpdate,
            node_id: node_id.into(),
            data: serde_json::json!({"personal_volume": 250}),
            user_id: Uuid::new_v4(),
            user_name: "Tester".into(),
            timestamp,
        }
    }

    #[must_use]
    pub fn dummy_message(content: &str, timestamp: i64) -> ChatMessage {
        ChatMessage {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_name: "Tester".into(),
            user_avatar: "/avatars/tester.png".into(),
            content: content.into(),
            timestamp,
            kind: MessageKind::Text,
            target_node: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_empty() {
        let state = SessionState::new(20);
        assert!(state.current_user.is_none());
        assert!(state.active_users.is_empty());
        assert!(state.messages.is_empty());
        assert!(state.tree_updates.is_empty());
        assert!(state.selected_node.is_none());
        assert_eq!(state.update_capacity(), 20);
    }

    #[test]
    fn timestamps_strictly_increase() {
        let mut state = SessionState::new(20);
        let mut prev = state.next_timestamp();
        for _ in 0..100 {
            let next = state.next_timestamp();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn clock_never_goes_behind_appended_records() {
        let mut state = SessionState::new(20);
        let future = now_ms() + 60_000;
        state.push_message(test_helpers::dummy_message("from the future", future));
        assert!(state.next_timestamp() > future);
    }

    #[test]
    fn update_log_evicts_oldest_past_capacity() {
        let mut state = SessionState::new(20);
        for i in 0..20 {
            assert!(state.push_tree_update(test_helpers::dummy_update(&format!("m-{i}"), i)).is_none());
        }
        let evicted = state
            .push_tree_update(test_helpers::dummy_update("m-20", 20))
            .expect("21st push should evict");

        assert_eq!(evicted.node_id, "m-0");
        assert_eq!(state.tree_updates.len(), 20);
        assert_eq!(state.tree_updates.front().map(|u| u.node_id.as_str()), Some("m-1"));
        assert_eq!(state.tree_updates.back().map(|u| u.node_id.as_str()), Some("m-20"));
    }

    #[test]
    fn upsert_replaces_in_place() {
        let mut state = SessionState::new(20);
        let alice = test_helpers::dummy_user("Alice");
        let bob = test_helpers::dummy_user("Bob");
        state.upsert_active_user(alice.clone());
        state.upsert_active_user(bob);

        let mut moved = alice.clone();
        moved.current_view = "genealogy".into();
        state.upsert_active_user(moved);

        assert_eq!(state.active_users.len(), 2);
        assert_eq!(state.active_users[0].id, alice.id);
        assert_eq!(state.active_users[0].current_view, "genealogy");
    }

    #[test]
    fn roster_entry_creates_once() {
        let mut state = SessionState::new(20);
        let id = Uuid::new_v4();
        state.roster_entry(id, || test_helpers::dummy_user("Carol")).current_view = "chat".into();
        state.roster_entry(id, || test_helpers::dummy_user("Ignored")).cursor = Some(CursorPosition { x: 1.0, y: 2.0 });

        assert_eq!(state.active_users.len(), 1);
        let entry = &state.active_users[0];
        assert_eq!(entry.id, id);
        assert_eq!(entry.name, "Carol");
        assert_eq!(entry.current_view, "chat");
        assert_eq!(entry.cursor, Some(CursorPosition { x: 1.0, y: 2.0 }));
    }

    #[test]
    fn kinds_parse_their_own_labels() {
        for kind in [MessageKind::Text, MessageKind::System, MessageKind::Achievement, MessageKind::Announcement] {
            assert_eq!(MessageKind::parse(kind.as_str()), Some(kind));
        }
        for kind in [
            UpdateKind::MemberUpdate,
            UpdateKind::RankChange,
            UpdateKind::VolumeUpdate,
            UpdateKind::NewMember,
            UpdateKind::StatusChange,
        ] {
            assert_eq!(UpdateKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MessageKind::parse("shout"), None);
        assert_eq!(UpdateKind::parse(""), None);
    }

    #[test]
    fn kind_labels_match_serde() {
        let json = serde_json::to_value(UpdateKind::RankChange).unwrap();
        assert_eq!(json, serde_json::json!("rank_change"));
        let json = serde_json::to_value(MessageKind::Announcement).unwrap();
        assert_eq!(json, serde_json::json!("announcement"));
    }
}
