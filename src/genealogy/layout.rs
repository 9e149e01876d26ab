//! Layout engine: places genealogy members on a layered grid.
//!
//! Leaves take consecutive horizontal slots in pre-order, each parent is
//! centred over its first and last child, and depth sets the row. The
//! selected member and its upline are flagged for highlighting.

use std::collections::HashSet;

use serde::Serialize;

use super::{Member, Rank};

// Layout constants (in logical pixels).
pub const NODE_WIDTH: f64 = 180.0;
pub const NODE_HEIGHT: f64 = 80.0;
pub const SIBLING_GAP: f64 = 40.0;
pub const LEVEL_HEIGHT: f64 = 140.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePlacement {
    pub id: String,
    pub name: String,
    pub rank: Rank,
    /// Horizontal centre of the node box.
    pub x: f64,
    /// Top edge of the node box.
    pub y: f64,
    pub depth: usize,
    pub selected: bool,
    /// On the path from the root to the selected member.
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub parent: String,
    pub child: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeLayout {
    /// Members in pre-order.
    pub nodes: Vec<NodePlacement>,
    pub links: Vec<Link>,
    pub width: f64,
    pub height: f64,
}

impl TreeLayout {
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&NodePlacement> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

struct Placer<'a> {
    highlighted: HashSet<&'a str>,
    selected: Option<&'a str>,
    next_slot: usize,
    max_depth: usize,
    nodes: Vec<NodePlacement>,
    links: Vec<Link>,
}

/// Lay out `root`, flagging `selected` and its upline.
#[must_use]
pub fn compute(root: &Member, selected: Option<&str>) -> TreeLayout {
    let path = selected.and_then(|id| root.path_to(id)).unwrap_or_default();
    let mut placer = Placer {
        selected: path.last().copied(),
        highlighted: path.into_iter().collect(),
        next_slot: 0,
        max_depth: 0,
        nodes: Vec::new(),
        links: Vec::new(),
    };
    placer.place(root, 0);

    #[allow(clippy::cast_precision_loss)]
    let slots = placer.next_slot as f64;
    #[allow(clippy::cast_precision_loss)]
    let rows = (placer.max_depth + 1) as f64;

    TreeLayout {
        width: slots * (NODE_WIDTH + SIBLING_GAP) - SIBLING_GAP,
        height: rows * LEVEL_HEIGHT - (LEVEL_HEIGHT - NODE_HEIGHT),
        nodes: placer.nodes,
        links: placer.links,
    }
}

impl<'a> Placer<'a> {
    /// Place `member` and its subtree, returning the member's x centre.
    fn place(&mut self, member: &'a Member, depth: usize) -> f64 {
        self.max_depth = self.max_depth.max(depth);
        let idx = self.nodes.len();
        let on_path = self.highlighted.contains(member.id.as_str());

        #[allow(clippy::cast_precision_loss)]
        let y = depth as f64 * LEVEL_HEIGHT;
        self.nodes.push(NodePlacement {
            id: member.id.clone(),
            name: member.name.clone(),
            rank: member.rank,
            x: 0.0,
            y,
            depth,
            selected: self.selected == Some(member.id.as_str()),
            highlighted: on_path,
        });

        let x = if member.children.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let slot = self.next_slot as f64;
            self.next_slot += 1;
            slot * (NODE_WIDTH + SIBLING_GAP) + NODE_WIDTH / 2.0
        } else {
            let mut first = None;
            let mut last = 0.0;
            for child in &member.children {
                self.links.push(Link {
                    parent: member.id.clone(),
                    child: child.id.clone(),
                    highlighted: on_path && self.highlighted.contains(child.id.as_str()),
                });
                let cx = self.place(child, depth + 1);
                first.get_or_insert(cx);
                last = cx;
            }
            (first.unwrap_or(last) + last) / 2.0
        };

        self.nodes[idx].x = x;
        x
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
