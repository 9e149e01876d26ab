//! Collaboration session: the state holder consumers talk to.
//!
//! ARCHITECTURE
//! ============
//! `CollabSession` owns the shared `SessionState`, the session end of the
//! mock socket, and the echo task. Operations apply their local effect
//! immediately (view label, cursor, selection) and stage an intent frame; the
//! echo simulator appends the corresponding record after the artificial delay.
//! Selection is local only and is published on a `watch` channel so tree
//! views can follow it without polling the shared state.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here fails observably. Empty chat text and a missing current user
//! are silent no-ops. The intent queue is unbounded, so an emit only fails
//! after the echo task is gone, and that is logged. There is no
//! acknowledgment or delivery confirmation.

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::frame::{
    CHAT_SEND, Data, FRAME_KIND, FRAME_NODE_ID, FRAME_PAYLOAD, FRAME_TEXT, FRAME_USER_AVATAR, FRAME_USER_NAME,
    FRAME_VIEW, FRAME_X, FRAME_Y, Frame, TREE_UPDATE, USER_CURSOR, USER_VIEW, now_ms,
};
use crate::sample;
use crate::services::echo::spawn_echo_task;
use crate::socket::{self, MockSocket};
use crate::state::{
    ActiveUser, ChatMessage, CursorPosition, MessageKind, PresenceStatus, SessionSnapshot, SessionState, SharedState,
    TreeUpdate, TreeUpdateDraft,
};

pub struct CollabSession {
    id: Uuid,
    state: SharedState,
    socket: MockSocket,
    selection: watch::Sender<Option<String>>,
    echo: JoinHandle<()>,
}

impl CollabSession {
    /// Start a session: seed sample records (if enabled) and spawn the echo task.
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn start(config: SessionConfig, current_user: Option<ActiveUser>) -> Self {
        let id = Uuid::new_v4();
        let mut initial = SessionState::new(config.update_log_capacity);
        if config.seed_samples {
            sample::seed(&mut initial);
        }
        initial.current_user = current_user;
        let (selection, _) = watch::channel(initial.selected_node.clone());

        let state: SharedState = std::sync::Arc::new(tokio::sync::RwLock::new(initial));
        let (socket, peer) = socket::pair(config.event_buffer_capacity);
        let echo = spawn_echo_task(state.clone(), peer, &config);

        info!(session_id = %id, seed_samples = config.seed_samples, "collaboration session started");
        Self { id, state, socket, selection, echo }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Shared state handle for renderers that hold their own read guard.
    #[must_use]
    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    /// Receive hook: frames delivered by the echo simulator.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Frame> {
        self.socket.subscribe()
    }

    /// Selection feed: the current selected node, re-marked on every change.
    #[must_use]
    pub fn watch_selection(&self) -> watch::Receiver<Option<String>> {
        self.selection.subscribe()
    }

    /// Tear the session down, dropping any echo still waiting on its timer.
    pub fn shutdown(self) {
        // Drop aborts the echo task.
        info!(session_id = %self.id, "collaboration session stopped");
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Replace the signed-in user. `None` turns every author-bound op into a no-op.
    pub async fn set_current_user(&self, user: Option<ActiveUser>) {
        self.state.write().await.current_user = user;
    }

    /// Stage a chat message. Empty or whitespace-only text is ignored.
    pub async fn send_message(&self, text: &str, kind: Option<MessageKind>, target_node: Option<&str>) {
        if text.trim().is_empty() {
            debug!("empty chat message ignored");
            return;
        }
        let Some(user) = self.current_user().await else {
            debug!("chat message without current user ignored");
            return;
        };

        let mut frame = self
            .author_frame(CHAT_SEND, &user)
            .with_data(FRAME_TEXT, text)
            .with_data(FRAME_KIND, kind.unwrap_or_default().as_str());
        if let Some(node) = target_node {
            frame = frame.with_data(FRAME_NODE_ID, node);
        }
        self.stage(frame);
    }

    /// Update the current user's view label and last-seen time, then stage it.
    pub async fn update_current_view(&self, view: &str) {
        let user = {
            let mut guard = self.state.write().await;
            let Some(user) = guard.current_user.as_mut() else {
                debug!("view change without current user ignored");
                return;
            };
            user.current_view = view.to_string();
            user.last_seen = now_ms();
            user.status = PresenceStatus::Viewing;
            user.clone()
        };
        let frame = self.author_frame(USER_VIEW, &user).with_data(FRAME_VIEW, view);
        self.stage(frame);
    }

    /// Record the current user's pointer position and stage it. Every call is
    /// staged independently.
    pub async fn update_cursor_position(&self, x: f64, y: f64) {
        let user = {
            let mut guard = self.state.write().await;
            let Some(user) = guard.current_user.as_mut() else {
                return;
            };
            user.cursor = Some(CursorPosition { x, y });
            user.last_seen = now_ms();
            user.clone()
        };
        let frame = self
            .author_frame(USER_CURSOR, &user)
            .with_data(FRAME_X, x)
            .with_data(FRAME_Y, y);
        self.stage(frame);
    }

    /// Set or clear the single globally selected node and notify watchers.
    pub async fn select_node(&self, node_id: Option<&str>) {
        let selected = node_id.map(str::to_string);
        self.state.write().await.selected_node.clone_from(&selected);
        self.selection.send_if_modified(|current| {
            if *current == selected {
                return false;
            }
            *current = selected;
            true
        });
    }

    /// Stage a tree mutation.
    pub async fn send_tree_update(&self, draft: TreeUpdateDraft) {
        let Some(user) = self.current_user().await else {
            debug!(node_id = %draft.node_id, "tree update without current user ignored");
            return;
        };
        let frame = self
            .author_frame(TREE_UPDATE, &user)
            .with_data(FRAME_KIND, draft.kind.as_str())
            .with_data(FRAME_NODE_ID, draft.node_id)
            .with_data(FRAME_PAYLOAD, draft.data);
        self.stage(frame);
    }

    // =========================================================================
    // READERS
    // =========================================================================

    pub async fn current_user(&self) -> Option<ActiveUser> {
        self.state.read().await.current_user.clone()
    }

    pub async fn active_users(&self) -> Vec<ActiveUser> {
        self.state.read().await.active_users.clone()
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.read().await.messages.clone()
    }

    /// Tree updates, oldest first.
    pub async fn tree_updates(&self) -> Vec<TreeUpdate> {
        self.state.read().await.tree_updates.iter().cloned().collect()
    }

    pub async fn selected_node(&self) -> Option<String> {
        self.state.read().await.selected_node.clone()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.snapshot()
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    fn author_frame(&self, syscall: &str, user: &ActiveUser) -> Frame {
        Frame::request(syscall, Data::new())
            .with_session_id(self.id)
            .with_from(user.id)
            .with_data(FRAME_USER_NAME, user.name.clone())
            .with_data(FRAME_USER_AVATAR, user.avatar.clone())
    }

    fn stage(&self, frame: Frame) {
        let syscall = frame.syscall.clone();
        match self.socket.emit(frame) {
            Ok(()) => debug!(session_id = %self.id, %syscall, "intent staged"),
            Err(e) => warn!(session_id = %self.id, error = %e, "intent dropped"),
        }
    }
}

impl Drop for CollabSession {
    fn drop(&mut self) {
        self.echo.abort();
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
