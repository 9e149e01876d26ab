//! Echo simulator: stands in for the network peer.
//!
//! DESIGN
//! ======
//! A single background task drains the staged-intent queue. Each frame is
//! held until `staged_at + echo_delay + jitter`, then turned into a fully
//! formed record (fresh UUID, session-clock timestamp, authored by whoever
//! staged it) and appended to the matching log. The frame is then delivered
//! to socket subscribers so consumers can re-render.
//!
//! ORDERING
//! ========
//! A frame's due time is clamped to be no earlier than its predecessor's, so
//! records land in staging order even when jitter would reorder the timers.
//! Aborting the task drops every pending timer with it.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::frame::{
    CHAT_SEND, FRAME_KIND, FRAME_NODE_ID, FRAME_PAYLOAD, FRAME_TEXT, FRAME_USER_AVATAR, FRAME_USER_NAME, FRAME_VIEW,
    FRAME_X, FRAME_Y, Frame, TREE_UPDATE, USER_CURSOR, USER_VIEW,
};
use crate::socket::EchoPeer;
use crate::state::{
    ActiveUser, ChatMessage, CursorPosition, MessageKind, PresenceStatus, SessionState, SharedState, TreeUpdate,
    UpdateKind,
};

/// Delay policy for the simulated round trip.
struct EchoTiming {
    delay: Duration,
    jitter_ms: u64,
    rng: StdRng,
}

impl EchoTiming {
    fn from_config(config: &SessionConfig) -> Self {
        let rng = match config.activity_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            delay: config.echo_delay,
            jitter_ms: u64::try_from(config.echo_jitter.as_millis()).unwrap_or(u64::MAX),
            rng,
        }
    }

    fn sample(&mut self) -> Duration {
        if self.jitter_ms == 0 {
            return self.delay;
        }
        self.delay + Duration::from_millis(self.rng.random_range(0..=self.jitter_ms))
    }
}

/// Spawn the echo task. Abort the handle to tear the simulation down.
pub fn spawn_echo_task(state: SharedState, peer: EchoPeer, config: &SessionConfig) -> JoinHandle<()> {
    let timing = EchoTiming::from_config(config);
    debug!(delay_ms = ?timing.delay, jitter_ms = timing.jitter_ms, "echo simulator configured");
    tokio::spawn(run_echo(state, peer, timing))
}

async fn run_echo(state: SharedState, mut peer: EchoPeer, mut timing: EchoTiming) {
    let mut last_due = Instant::now();
    while let Some(staged) = peer.recv().await {
        let due = (staged.staged_at + timing.sample()).max(last_due);
        last_due = due;
        tokio::time::sleep_until(due).await;

        let applied = {
            let mut guard = state.write().await;
            apply_frame(&mut guard, &staged.frame)
        };
        if applied {
            peer.deliver(staged.frame);
        }
    }
    debug!("echo peer closed");
}

// =============================================================================
// RECORD CONSTRUCTION
// =============================================================================

/// Turn one delivered frame into a log record. Returns false when the frame
/// was malformed or unroutable and nothing changed.
pub fn apply_frame(state: &mut SessionState, frame: &Frame) -> bool {
    let Some(author) = frame.from else {
        warn!(syscall = %frame.syscall, "frame without author dropped");
        return false;
    };

    match frame.syscall.as_str() {
        CHAT_SEND => apply_chat(state, author, frame),
        TREE_UPDATE => apply_tree_update(state, author, frame),
        USER_VIEW | USER_CURSOR => apply_presence(state, author, frame),
        other => {
            warn!(syscall = other, "unknown syscall ignored by echo simulator");
            false
        }
    }
}

fn author_name(frame: &Frame) -> String {
    frame.str_field(FRAME_USER_NAME).unwrap_or_default().to_string()
}

fn author_avatar(frame: &Frame) -> String {
    frame.str_field(FRAME_USER_AVATAR).unwrap_or_default().to_string()
}

fn apply_chat(state: &mut SessionState, author: Uuid, frame: &Frame) -> bool {
    let Some(text) = frame.str_field(FRAME_TEXT) else {
        warn!("chat frame without text dropped");
        return false;
    };
    let kind = frame
        .str_field(FRAME_KIND)
        .and_then(MessageKind::parse)
        .unwrap_or_default();

    let message = ChatMessage {
        id: Uuid::new_v4(),
        user_id: author,
        user_name: author_name(frame),
        user_avatar: author_avatar(frame),
        content: text.to_string(),
        timestamp: state.next_timestamp(),
        kind,
        target_node: frame.str_field(FRAME_NODE_ID).map(str::to_string),
    };
    debug!(message_id = %message.id, kind = kind.as_str(), "chat message echoed");
    state.push_message(message);
    true
}

fn apply_tree_update(state: &mut SessionState, author: Uuid, frame: &Frame) -> bool {
    let Some(kind) = frame.str_field(FRAME_KIND).and_then(UpdateKind::parse) else {
        warn!("tree update without a known kind dropped");
        return false;
    };
    let Some(node_id) = frame.str_field(FRAME_NODE_ID) else {
        warn!("tree update without node id dropped");
        return false;
    };

    let update = TreeUpdate {
        id: Uuid::new_v4(),
        kind,
        node_id: node_id.to_string(),
        data: frame
            .data
            .get(FRAME_PAYLOAD)
            .cloned()
            .unwrap_or(serde_json::Value::Null),
        user_id: author,
        user_name: author_name(frame),
        timestamp: state.next_timestamp(),
    };
    debug!(update_id = %update.id, kind = kind.as_str(), node_id, "tree update echoed");
    if let Some(evicted) = state.push_tree_update(update) {
        debug!(evicted = %evicted.id, "tree update log trimmed");
    }
    true
}

fn apply_presence(state: &mut SessionState, author: Uuid, frame: &Frame) -> bool {
    let now = state.next_timestamp();
    let name = author_name(frame);
    let avatar = author_avatar(frame);
    let entry = state.roster_entry(author, || ActiveUser::new(name, avatar));

    entry.last_seen = now;
    entry.status = PresenceStatus::Viewing;
    if let Some(view) = frame.str_field(FRAME_VIEW) {
        entry.current_view = view.to_string();
    }
    if let (Some(x), Some(y)) = (frame.f64_field(FRAME_X), frame.f64_field(FRAME_Y)) {
        entry.cursor = Some(CursorPosition { x, y });
    }
    true
}

#[cfg(test)]
#[path = "echo_test.rs"]
mod tests;
