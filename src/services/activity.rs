//! Activity feed: simulated user activity plus a merged, newest-first view.
//!
//! DESIGN
//! ======
//! The generator picks a participant, an action and a member from the sample
//! hierarchy with a `StdRng`. With `activity_seed` set the sequence is fully
//! reproducible; without it the RNG is seeded from the OS.
//!
//! The feed itself is a pure function over the tree-update log, the chat log
//! (achievements and announcements only) and any generated entries.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::genealogy::Member;
use crate::sample;
use crate::state::{ChatMessage, MessageKind, TreeUpdate, UpdateKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ViewedMember,
    RankAdvanced,
    VolumeRecorded,
    JoinedTeam,
    LeftNote,
}

const KINDS: [ActivityKind; 5] = [
    ActivityKind::ViewedMember,
    ActivityKind::RankAdvanced,
    ActivityKind::VolumeRecorded,
    ActivityKind::JoinedTeam,
    ActivityKind::LeftNote,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub user_name: String,
    pub node_id: String,
    pub description: String,
    pub timestamp: i64,
}

// =============================================================================
// GENERATOR
// =============================================================================

pub struct ActivityGenerator {
    rng: StdRng,
    users: Vec<String>,
    /// (id, name) of every member in the hierarchy, pre-order.
    members: Vec<(String, String)>,
}

impl ActivityGenerator {
    /// `seed = None` draws from OS entropy. Falls back to a placeholder
    /// participant when `users` is empty.
    #[must_use]
    pub fn new(seed: Option<u64>, users: Vec<String>, tree: &Member) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let users = if users.is_empty() { vec!["A teammate".to_string()] } else { users };
        let mut members = Vec::new();
        tree.walk(&mut |m| members.push((m.id.clone(), m.name.clone())));
        Self { rng, users, members }
    }

    /// Generator over the sample roster, seeded from `activity_seed`.
    #[must_use]
    pub fn from_config(config: &SessionConfig, tree: &Member) -> Self {
        let users = sample::sample_users(0).into_iter().map(|u| u.name).collect();
        Self::new(config.activity_seed, users, tree)
    }

    pub fn next_entry(&mut self, timestamp: i64) -> ActivityEntry {
        let kind = *KINDS.choose(&mut self.rng).unwrap_or(&ActivityKind::ViewedMember);
        let user_name = self
            .users
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        let (node_id, member_name) = self
            .members
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();

        let description = match kind {
            ActivityKind::ViewedMember => format!("{user_name} is viewing {member_name}'s branch"),
            ActivityKind::RankAdvanced => format!("{member_name} qualified for a new rank"),
            ActivityKind::VolumeRecorded => {
                let volume: u32 = self.rng.random_range(1..=40) * 25;
                format!("{member_name} recorded {volume} PV")
            }
            ActivityKind::JoinedTeam => format!("{user_name} welcomed a new recruit under {member_name}"),
            ActivityKind::LeftNote => format!("{user_name} left a note on {member_name}"),
        };

        ActivityEntry {
            id: uuid::Builder::from_random_bytes(self.rng.random()).into_uuid(),
            kind,
            user_name,
            node_id,
            description,
            timestamp,
        }
    }

    /// `count` entries, `spacing_ms` apart, starting at `start`.
    pub fn take(&mut self, count: usize, start: i64, spacing_ms: i64) -> Vec<ActivityEntry> {
        let mut ts = start;
        (0..count)
            .map(|_| {
                let entry = self.next_entry(ts);
                ts += spacing_ms;
                entry
            })
            .collect()
    }
}

// =============================================================================
// FEED
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Update,
    Message,
    Activity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedItem {
    pub source: FeedSource,
    pub text: String,
    pub node_id: Option<String>,
    pub timestamp: i64,
}

/// One-line description of a tree update.
#[must_use]
pub fn describe_update(update: &TreeUpdate) -> String {
    let who = &update.user_name;
    let node = &update.node_id;
    let field = |key: &str| update.data.get(key).and_then(serde_json::Value::as_str);

    match update.kind {
        UpdateKind::MemberUpdate => format!("{who} updated member {node}"),
        UpdateKind::RankChange => match field("to") {
            Some(rank) => format!("{who} recorded {node} advancing to {rank}"),
            None => format!("{who} recorded a rank change for {node}"),
        },
        UpdateKind::VolumeUpdate => match update.data.get("personal_volume").and_then(serde_json::Value::as_u64) {
            Some(pv) => format!("{who} set {node} volume to {pv} PV"),
            None => format!("{who} updated volume for {node}"),
        },
        UpdateKind::NewMember => match field("name") {
            Some(name) => format!("{who} added {name} ({node}) to the team"),
            None => format!("{who} added new member {node}"),
        },
        UpdateKind::StatusChange => match field("status") {
            Some(status) => format!("{who} marked {node} as {status}"),
            None => format!("{who} changed the status of {node}"),
        },
    }
}

/// Merge the logs into a newest-first feed of at most `limit` items.
#[must_use]
pub fn build_feed(
    updates: &[TreeUpdate],
    messages: &[ChatMessage],
    generated: &[ActivityEntry],
    limit: usize,
) -> Vec<FeedItem> {
    let updates = updates.iter().map(|u| FeedItem {
        source: FeedSource::Update,
        text: describe_update(u),
        node_id: Some(u.node_id.clone()),
        timestamp: u.timestamp,
    });
    let messages = messages
        .iter()
        .filter(|m| matches!(m.kind, MessageKind::Achievement | MessageKind::Announcement))
        .map(|m| FeedItem {
            source: FeedSource::Message,
            text: format!("{}: {}", m.user_name, m.content),
            node_id: m.target_node.clone(),
            timestamp: m.timestamp,
        });
    let generated = generated.iter().map(|a| FeedItem {
        source: FeedSource::Activity,
        text: a.description.clone(),
        node_id: Some(a.node_id.clone()),
        timestamp: a.timestamp,
    });

    let mut feed: Vec<FeedItem> = updates.chain(messages).chain(generated).collect();
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed.truncate(limit);
    feed
}

#[cfg(test)]
#[path = "activity_test.rs"]
mod tests;
