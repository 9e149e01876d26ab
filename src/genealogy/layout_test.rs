use super::*;
use crate::genealogy::{MemberStatus, sample_tree};

fn leaf(id: &str) -> Member {
    Member::new(id, id, Rank::Associate, MemberStatus::Active, 100, "2024-01-01")
}

#[test]
fn single_node_sits_in_first_slot() {
    let layout = compute(&leaf("solo"), None);

    assert_eq!(layout.nodes.len(), 1);
    assert!(layout.links.is_empty());
    let node = &layout.nodes[0];
    assert!((node.x - NODE_WIDTH / 2.0).abs() < f64::EPSILON);
    assert!(node.y.abs() < f64::EPSILON);
    assert!((layout.width - NODE_WIDTH).abs() < f64::EPSILON);
    assert!((layout.height - NODE_HEIGHT).abs() < f64::EPSILON);
}

#[test]
fn parent_is_centred_over_children() {
    let root = leaf("root").with_children(vec![leaf("a"), leaf("b"), leaf("c")]);
    let layout = compute(&root, None);

    let a = layout.node("a").unwrap();
    let c = layout.node("c").unwrap();
    let root = layout.node("root").unwrap();
    assert!((root.x - (a.x + c.x) / 2.0).abs() < f64::EPSILON);
    assert!((a.y - LEVEL_HEIGHT).abs() < f64::EPSILON);
    assert_eq!(a.depth, 1);
    assert!(c.x > a.x);
}

#[test]
fn siblings_never_overlap() {
    let layout = compute(&sample_tree(), None);
    let mut leaves: Vec<&NodePlacement> = layout
        .nodes
        .iter()
        .filter(|n| !layout.links.iter().any(|l| l.parent == n.id))
        .collect();
    leaves.sort_by(|a, b| a.x.total_cmp(&b.x));

    for pair in leaves.windows(2) {
        assert!(pair[1].x - pair[0].x >= NODE_WIDTH + SIBLING_GAP - f64::EPSILON);
    }
}

#[test]
fn nodes_are_in_pre_order_with_one_link_per_child() {
    let tree = sample_tree();
    let layout = compute(&tree, None);

    assert_eq!(layout.nodes.len(), tree.member_count());
    assert_eq!(layout.links.len(), tree.member_count() - 1);
    assert_eq!(layout.nodes[0].id, "m-001");
    assert_eq!(layout.nodes[1].id, "m-002");
    assert_eq!(layout.nodes[2].id, "m-004");
}

#[test]
fn selection_highlights_upline_only() {
    let layout = compute(&sample_tree(), Some("m-009"));

    let highlighted: Vec<&str> = layout
        .nodes
        .iter()
        .filter(|n| n.highlighted)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(highlighted, vec!["m-001", "m-002", "m-004", "m-009"]);

    let selected: Vec<&str> = layout.nodes.iter().filter(|n| n.selected).map(|n| n.id.as_str()).collect();
    assert_eq!(selected, vec!["m-009"]);

    let hot_links = layout.links.iter().filter(|l| l.highlighted).count();
    assert_eq!(hot_links, 3);
}

#[test]
fn unknown_selection_highlights_nothing() {
    let layout = compute(&sample_tree(), Some("m-999"));
    assert!(layout.nodes.iter().all(|n| !n.highlighted && !n.selected));
    assert!(layout.links.iter().all(|l| !l.highlighted));
}
