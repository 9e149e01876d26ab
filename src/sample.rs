//! Hard-coded participants and records inserted once at session start-up.
//!
//! These are the only "other" users the simulation ever has; nothing here is
//! driven by a second real client.

use serde_json::json;
use uuid::Uuid;

use crate::state::{ActiveUser, ChatMessage, CursorPosition, MessageKind, PresenceStatus, SessionState, TreeUpdate, UpdateKind};

pub const MICHAEL_ID: Uuid = Uuid::from_u128(0x6d69_6368_6165_6c00_0000_0000_0000_0001);
pub const JESSICA_ID: Uuid = Uuid::from_u128(0x6a65_7373_6963_6100_0000_0000_0000_0002);
pub const DAVID_ID: Uuid = Uuid::from_u128(0x6461_7669_6400_0000_0000_0000_0000_0003);
pub const SYSTEM_ID: Uuid = Uuid::nil();

/// Other participants shown in the presence bar.
#[must_use]
pub fn sample_users(now: i64) -> Vec<ActiveUser> {
    vec![
        ActiveUser {
            id: MICHAEL_ID,
            name: "Michael Chen".into(),
            avatar: "/avatars/michael.png".into(),
            current_view: "genealogy".into(),
            last_seen: now,
            status: PresenceStatus::Viewing,
            cursor: Some(CursorPosition { x: 320.0, y: 180.0 }),
        },
        ActiveUser {
            id: JESSICA_ID,
            name: "Jessica Williams".into(),
            avatar: "/avatars/jessica.png".into(),
            current_view: "dashboard".into(),
            last_seen: now - 120_000,
            status: PresenceStatus::Viewing,
            cursor: None,
        },
        ActiveUser {
            id: DAVID_ID,
            name: "David Kim".into(),
            avatar: "/avatars/david.png".into(),
            current_view: "ai-marketing".into(),
            last_seen: now - 900_000,
            status: PresenceStatus::Away,
            cursor: None,
        },
    ]
}

fn message(
    state: &mut SessionState,
    user: (Uuid, &str, &str),
    content: &str,
    kind: MessageKind,
    target_node: Option<&str>,
) -> ChatMessage {
    let (user_id, user_name, user_avatar) = user;
    ChatMessage {
        id: Uuid::new_v4(),
        user_id,
        user_name: user_name.into(),
        user_avatar: user_avatar.into(),
        content: content.into(),
        timestamp: state.next_timestamp(),
        kind,
        target_node: target_node.map(str::to_string),
    }
}

fn update(state: &mut SessionState, kind: UpdateKind, node_id: &str, data: serde_json::Value) -> TreeUpdate {
    TreeUpdate {
        id: Uuid::new_v4(),
        kind,
        node_id: node_id.into(),
        data,
        user_id: MICHAEL_ID,
        user_name: "Michael Chen".into(),
        timestamp: state.next_timestamp(),
    }
}

/// Insert the sample roster, welcome messages and recent tree updates.
pub fn seed(state: &mut SessionState) {
    let now = state.next_timestamp();
    for user in sample_users(now) {
        state.upsert_active_user(user);
    }

    let system = (SYSTEM_ID, "System", "/avatars/system.png");
    let michael = (MICHAEL_ID, "Michael Chen", "/avatars/michael.png");
    let jessica = (JESSICA_ID, "Jessica Williams", "/avatars/jessica.png");

    let messages = [
        message(state, system, "Welcome to the team collaboration space!", MessageKind::System, None),
        message(state, michael, "Emily just advanced to Director!", MessageKind::Achievement, Some("m-004")),
        message(
            state,
            jessica,
            "Leadership call moves to Friday at 10am. Bring your Q3 numbers.",
            MessageKind::Announcement,
            None,
        ),
    ];
    for msg in messages {
        state.push_message(msg);
    }

    let updates = [
        update(state, UpdateKind::RankChange, "m-004", json!({"from": "Senior Manager", "to": "Director"})),
        update(state, UpdateKind::NewMember, "m-011", json!({"name": "Noah Garcia", "sponsor": "m-006"})),
    ];
    for u in updates {
        state.push_tree_update(u);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_inserts_each_record_once() {
        let mut state = SessionState::new(20);
        seed(&mut state);

        assert_eq!(state.active_users.len(), 3);
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.tree_updates.len(), 2);
        assert!(state.current_user.is_none());
        assert!(state.messages.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn sample_roster_has_distinct_ids() {
        let users = sample_users(0);
        assert_ne!(users[0].id, users[1].id);
        assert_ne!(users[1].id, users[2].id);
        assert_ne!(users[0].id, users[2].id);
        assert!(users.iter().all(|u| u.id != SYSTEM_ID));
    }
}
