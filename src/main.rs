use std::time::Duration;

use collabtree::genealogy::{TreeView, sample_tree};
use collabtree::services::activity::{self, ActivityGenerator};
use collabtree::services::chatbot::ChatWidget;
use collabtree::state::{ActiveUser, MessageKind, TreeUpdateDraft, UpdateKind};
use collabtree::{CollabSession, SessionConfig};

const FEED_LIMIT: usize = 10;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = SessionConfig::from_env().expect("invalid session config");
    let me = ActiveUser::new("Sarah Johnson", "/avatars/sarah.png");
    let session = CollabSession::start(config, Some(me));
    let mut deliveries = session.subscribe();

    session.update_current_view("genealogy").await;
    session.update_cursor_position(412.0, 236.0).await;
    session.select_node(Some("m-004")).await;
    session
        .send_message("Emily's branch is on fire this month!", Some(MessageKind::Achievement), Some("m-004"))
        .await;
    session
        .send_tree_update(TreeUpdateDraft::new(
            UpdateKind::VolumeUpdate,
            "m-004",
            serde_json::json!({"personal_volume": 2_650}),
        ))
        .await;

    // Four intents staged above; wait for each echo.
    let wait = config.echo_delay + config.echo_jitter + Duration::from_secs(1);
    for _ in 0..4 {
        match tokio::time::timeout(wait, deliveries.recv()).await {
            Ok(Ok(frame)) => tracing::info!(syscall = %frame.syscall, "echo delivered"),
            Ok(Err(e)) => tracing::warn!(error = %e, "delivery stream lagged"),
            Err(_) => {
                tracing::warn!("echo did not arrive in time");
                break;
            }
        }
    }

    let snapshot = session.snapshot().await;
    tracing::info!(
        users = snapshot.active_users.len(),
        messages = snapshot.messages.len(),
        updates = snapshot.tree_updates.len(),
        selected = ?snapshot.selected_node,
        "session state"
    );

    let mut tree = TreeView::new(sample_tree());
    tree.sync_selection(&mut session.watch_selection());
    let layout = tree.layout();
    tracing::info!(nodes = layout.nodes.len(), width = layout.width, height = layout.height, "tree layout");

    let mut generator = ActivityGenerator::from_config(&config, tree.root());
    let generated = generator.take(3, collabtree::frame::now_ms(), 1_000);
    for item in activity::build_feed(&snapshot.tree_updates, &snapshot.messages, &generated, FEED_LIMIT) {
        tracing::info!(source = ?item.source, "{}", item.text);
    }

    let mut widget = ChatWidget::new();
    if let Some(reply) = widget.send("How much does it cost?") {
        tracing::info!(topic = reply.topic, suggestions = ?reply.suggestions, "{}", reply.text);
    }

    session.shutdown();
}
