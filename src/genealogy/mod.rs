//! Genealogy tree: the static sample recruitment hierarchy.
//!
//! DESIGN
//! ======
//! The hierarchy is a plain owned tree (`Member` with `children`). It is not
//! derived from the tree-update log; updates describe changes but never
//! mutate this data. `TreeView` pairs the hierarchy with the selected node and
//! keeps a computed layout in sync with both.

pub mod layout;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use self::layout::TreeLayout;

// =============================================================================
// RANK
// =============================================================================

/// Tier label with an associated sort level (Associate = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
    Associate,
    SeniorAssociate,
    Manager,
    SeniorManager,
    Director,
    ExecutiveDirector,
    DiamondDirector,
}

impl Rank {
    pub const ALL: [Rank; 7] = [
        Rank::Associate,
        Rank::SeniorAssociate,
        Rank::Manager,
        Rank::SeniorManager,
        Rank::Director,
        Rank::ExecutiveDirector,
        Rank::DiamondDirector,
    ];

    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::Associate => 1,
            Self::SeniorAssociate => 2,
            Self::Manager => 3,
            Self::SeniorManager => 4,
            Self::Director => 5,
            Self::ExecutiveDirector => 6,
            Self::DiamondDirector => 7,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Associate => "Associate",
            Self::SeniorAssociate => "Senior Associate",
            Self::Manager => "Manager",
            Self::SeniorManager => "Senior Manager",
            Self::Director => "Director",
            Self::ExecutiveDirector => "Executive Director",
            Self::DiamondDirector => "Diamond Director",
        }
    }

    /// The next tier up, `None` at the top.
    #[must_use]
    pub fn next(self) -> Option<Rank> {
        Self::ALL.get(usize::from(self.level())).copied()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// MEMBER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Inactive,
    Pending,
}

/// One recruited member and their direct recruits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub rank: Rank,
    pub status: MemberStatus,
    pub personal_volume: u32,
    /// ISO-8601 join date.
    pub joined: String,
    pub children: Vec<Member>,
}

impl Member {
    pub fn new(id: &str, name: &str, rank: Rank, status: MemberStatus, personal_volume: u32, joined: &str) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rank,
            status,
            personal_volume,
            joined: joined.into(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_children(mut self, children: Vec<Member>) -> Self {
        self.children = children;
        self
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Member> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Ids from this node down to `id`, inclusive. `None` if absent.
    #[must_use]
    pub fn path_to(&self, id: &str) -> Option<Vec<&str>> {
        if self.id == id {
            return Some(vec![self.id.as_str()]);
        }
        for child in &self.children {
            if let Some(mut path) = child.path_to(id) {
                path.insert(0, self.id.as_str());
                return Some(path);
            }
        }
        None
    }

    #[must_use]
    pub fn member_count(&self) -> usize {
        1 + self.children.iter().map(Member::member_count).sum::<usize>()
    }

    /// Levels in the subtree; a lone node has depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Member::depth).max().unwrap_or(0)
    }

    /// Personal volume of this member plus everyone below.
    #[must_use]
    pub fn group_volume(&self) -> u64 {
        u64::from(self.personal_volume) + self.children.iter().map(Member::group_volume).sum::<u64>()
    }

    /// Head count per rank across the subtree.
    #[must_use]
    pub fn rank_counts(&self) -> BTreeMap<Rank, usize> {
        let mut counts = BTreeMap::new();
        self.walk(&mut |m| *counts.entry(m.rank).or_insert(0) += 1);
        counts
    }

    /// Pre-order visit of the subtree.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Member)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// The built-in sample hierarchy rendered by the tree view.
#[must_use]
pub fn sample_tree() -> Member {
    use MemberStatus::{Active, Inactive, Pending};

    Member::new("m-001", "Sarah Johnson", Rank::DiamondDirector, Active, 4_200, "2019-03-14").with_children(vec![
        Member::new("m-002", "Michael Chen", Rank::ExecutiveDirector, Active, 3_100, "2019-08-02").with_children(vec![
            Member::new("m-004", "Emily Rodriguez", Rank::Director, Active, 2_400, "2020-06-21").with_children(vec![
                Member::new("m-008", "Olivia Martinez", Rank::Manager, Active, 1_350, "2021-11-09"),
                Member::new("m-009", "Liam Anderson", Rank::SeniorAssociate, Active, 780, "2022-04-30"),
            ]),
            Member::new("m-005", "David Kim", Rank::SeniorManager, Active, 1_900, "2020-09-15").with_children(vec![
                Member::new("m-010", "Ava Thompson", Rank::Associate, Active, 420, "2023-01-18"),
            ]),
        ]),
        Member::new("m-003", "Jessica Williams", Rank::Director, Active, 2_650, "2019-10-27").with_children(vec![
            Member::new("m-006", "James Wilson", Rank::Manager, Active, 1_200, "2021-02-03").with_children(vec![
                Member::new("m-011", "Noah Garcia", Rank::Associate, Pending, 0, "2024-05-12"),
            ]),
            Member::new("m-007", "Sophia Brown", Rank::SeniorAssociate, Inactive, 150, "2021-07-19"),
        ]),
    ])
}

// =============================================================================
// TREE VIEW
// =============================================================================

/// Hierarchy + selection + the layout derived from both.
pub struct TreeView {
    root: Member,
    selected: Option<String>,
    layout: TreeLayout,
}

impl TreeView {
    #[must_use]
    pub fn new(root: Member) -> Self {
        let layout = layout::compute(&root, None);
        Self { root, selected: None, layout }
    }

    #[must_use]
    pub fn root(&self) -> &Member {
        &self.root
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    #[must_use]
    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    /// Change the selection; the layout is recomputed only when it differs.
    pub fn select(&mut self, node_id: Option<&str>) {
        if self.selected.as_deref() == node_id {
            return;
        }
        self.selected = node_id.map(str::to_string);
        self.relayout();
    }

    /// Follow a session's selection feed. Returns whether the layout was
    /// recomputed.
    pub fn sync_selection(&mut self, selection: &mut watch::Receiver<Option<String>>) -> bool {
        let latest = selection.borrow_and_update().clone();
        if self.selected == latest {
            return false;
        }
        self.select(latest.as_deref());
        true
    }

    /// Swap the hierarchy and recompute the layout.
    pub fn set_root(&mut self, root: Member) {
        self.root = root;
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout = layout::compute(&self.root, self.selected.as_deref());
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
