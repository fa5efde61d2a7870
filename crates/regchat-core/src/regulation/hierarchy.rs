//! Grouping of regulations into a category tree.
//!
//! Every regulation declares zero or more `/`-delimited paths. The builder
//! turns the flat list into a tree of named groups with the regulations as
//! leaves. An item listing several paths appears once under each of them.
//! Items without a path sit directly under the root.
//!
//! Children keep first-encounter order; nothing is sorted.

use super::model::RegulationItem;
use serde::Serialize;

/// Reserved name of the synthetic root group.
pub const ROOT_GROUP_NAME: &str = "<root>";

/// Path separator used in `RegulationItem::hierarchies`.
pub const PATH_SEPARATOR: char = '/';

/// A node in the regulation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GroupNode {
    Group(Group),
    Leaf(RegulationItem),
}

impl GroupNode {
    /// Display name: the group name or the regulation title.
    pub fn name(&self) -> &str {
        match self {
            GroupNode::Group(group) => &group.name,
            GroupNode::Leaf(item) => &item.title,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            GroupNode::Group(group) => Some(group),
            GroupNode::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&RegulationItem> {
        match self {
            GroupNode::Group(_) => None,
            GroupNode::Leaf(item) => Some(item),
        }
    }
}

/// A named group of nodes.
///
/// Sibling groups never share a name; sibling leaves may.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub name: String,
    pub children: Vec<GroupNode>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Creates an empty root group.
    pub fn root() -> Self {
        Self::new(ROOT_GROUP_NAME)
    }

    /// Returns the direct child group with the given name.
    pub fn child_group(&self, name: &str) -> Option<&Group> {
        self.children
            .iter()
            .filter_map(GroupNode::as_group)
            .find(|group| group.name == name)
    }

    /// Number of leaves in this subtree.
    pub fn leaf_count(&self) -> usize {
        self.children
            .iter()
            .map(|child| match child {
                GroupNode::Group(group) => group.leaf_count(),
                GroupNode::Leaf(_) => 1,
            })
            .sum()
    }

    /// Every leaf in depth-first order, paired with the names of its
    /// ancestor groups below this one.
    pub fn leaves_with_paths(&self) -> Vec<(Vec<&str>, &RegulationItem)> {
        let mut out = Vec::new();
        let mut trail = Vec::new();
        collect_leaves(self, &mut trail, &mut out);
        out
    }
}

fn collect_leaves<'a>(
    group: &'a Group,
    trail: &mut Vec<&'a str>,
    out: &mut Vec<(Vec<&'a str>, &'a RegulationItem)>,
) {
    for child in &group.children {
        match child {
            GroupNode::Group(inner) => {
                trail.push(&inner.name);
                collect_leaves(inner, trail, out);
                trail.pop();
            }
            GroupNode::Leaf(item) => out.push((trail.clone(), item)),
        }
    }
}

/// Builds the regulation tree.
pub struct HierarchyBuilder;

impl HierarchyBuilder {
    /// Groups `items` into a tree under a synthetic root.
    pub fn build(items: &[RegulationItem]) -> Group {
        let mut root = Group::root();

        for item in items {
            if item.is_ungrouped() {
                root.children.push(GroupNode::Leaf(item.clone()));
                continue;
            }

            for path in &item.hierarchies {
                let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
                Self::resolve_path(&mut root, &segments)
                    .children
                    .push(GroupNode::Leaf(item.clone()));
            }
        }

        root
    }

    /// Walks `segments` from `root`, creating missing groups, and returns the
    /// group reached. Leaves are never matched.
    pub fn resolve_path<'a, S: AsRef<str>>(root: &'a mut Group, segments: &[S]) -> &'a mut Group {
        let mut current = root;

        for segment in segments {
            let segment = segment.as_ref();
            let index = match current.children.iter().position(
                |child| matches!(child, GroupNode::Group(group) if group.name == segment),
            ) {
                Some(index) => index,
                None => {
                    current.children.push(GroupNode::Group(Group::new(segment)));
                    current.children.len() - 1
                }
            };

            // The index points at a group: either found by the predicate above
            // or just pushed.
            let GroupNode::Group(next) = &mut current.children[index] else {
                unreachable!("resolved child is always a group")
            };
            current = next;
        }

        current
    }
}
