use super::*;
use crate::genealogy::sample_tree;
use crate::state::test_helpers;

fn names() -> Vec<String> {
    vec!["Michael Chen".into(), "Jessica Williams".into()]
}

// =============================================================================
// ActivityGenerator
// =============================================================================

#[test]
fn same_seed_yields_same_sequence() {
    let tree = sample_tree();
    let mut a = ActivityGenerator::new(Some(99), names(), &tree);
    let mut b = ActivityGenerator::new(Some(99), names(), &tree);

    assert_eq!(a.take(25, 1_000, 10), b.take(25, 1_000, 10));
}

#[test]
fn different_seeds_diverge() {
    let tree = sample_tree();
    let mut a = ActivityGenerator::new(Some(1), names(), &tree);
    let mut b = ActivityGenerator::new(Some(2), names(), &tree);

    let a: Vec<String> = a.take(25, 0, 1).into_iter().map(|e| e.description).collect();
    let b: Vec<String> = b.take(25, 0, 1).into_iter().map(|e| e.description).collect();
    assert_ne!(a, b);
}

#[test]
fn entries_reference_known_members_and_users() {
    let tree = sample_tree();
    let mut generator = ActivityGenerator::new(Some(5), names(), &tree);

    for entry in generator.take(50, 0, 1) {
        assert!(tree.find(&entry.node_id).is_some(), "unknown node {}", entry.node_id);
        assert!(names().contains(&entry.user_name));
        assert!(!entry.description.is_empty());
    }
}

#[test]
fn take_spaces_timestamps() {
    let mut generator = ActivityGenerator::new(Some(5), names(), &sample_tree());
    let stamps: Vec<i64> = generator.take(4, 100, 50).iter().map(|e| e.timestamp).collect();
    assert_eq!(stamps, vec![100, 150, 200, 250]);
}

#[test]
fn empty_roster_uses_placeholder() {
    let mut generator = ActivityGenerator::new(Some(3), Vec::new(), &sample_tree());
    assert_eq!(generator.next_entry(0).user_name, "A teammate");
}

#[test]
fn from_config_is_reproducible_with_seed() {
    let config = SessionConfig { activity_seed: Some(11), ..SessionConfig::default() };
    let tree = sample_tree();
    let mut a = ActivityGenerator::from_config(&config, &tree);
    let mut b = ActivityGenerator::from_config(&config, &tree);
    assert_eq!(a.next_entry(0), b.next_entry(0));
}

// =============================================================================
// describe_update / build_feed
// =============================================================================

#[test]
fn describe_uses_payload_when_present() {
    let mut update = test_helpers::dummy_update("m-004", 1);
    update.kind = UpdateKind::RankChange;
    update.data = serde_json::json!({"to": "Director"});
    assert_eq!(describe_update(&update), "Tester recorded m-004 advancing to Director");

    update.data = serde_json::Value::Null;
    assert_eq!(describe_update(&update), "Tester recorded a rank change for m-004");
}

#[test]
fn describe_volume_update() {
    let update = test_helpers::dummy_update("m-010", 1);
    assert_eq!(describe_update(&update), "Tester set m-010 volume to 250 PV");
}

#[test]
fn feed_is_newest_first_and_limited() {
    let updates = vec![test_helpers::dummy_update("m-002", 10), test_helpers::dummy_update("m-003", 30)];
    let mut achievement = test_helpers::dummy_message("Emily hit Director", 20);
    achievement.kind = MessageKind::Achievement;
    let plain = test_helpers::dummy_message("just chatting", 40);
    let generated = ActivityGenerator::new(Some(1), names(), &sample_tree()).take(1, 25, 0);

    let feed = build_feed(&updates, &[achievement, plain], &generated, 3);

    let stamps: Vec<i64> = feed.iter().map(|f| f.timestamp).collect();
    assert_eq!(stamps, vec![30, 25, 20]);
    assert_eq!(feed[0].source, FeedSource::Update);
    assert_eq!(feed[1].source, FeedSource::Activity);
    assert_eq!(feed[2].source, FeedSource::Message);
    assert_eq!(feed[2].text, "Tester: Emily hit Director");
}

#[test]
fn feed_skips_plain_chat() {
    let plain = test_helpers::dummy_message("hello", 5);
    assert!(build_feed(&[], &[plain], &[], 10).is_empty());
}
