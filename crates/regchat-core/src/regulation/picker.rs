//! Collapsible picker over the regulation tree.
//!
//! The picker renders the tree depth-first. Each group is a section that
//! starts collapsed and flips between collapsed and expanded when toggled;
//! each regulation is an entry that can be selected. Rows carry their depth
//! so the host can indent one step per level.

use super::hierarchy::{Group, GroupNode, HierarchyBuilder};
use super::model::RegulationItem;
use crate::error::{RegchatError, Result};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Position of a node, as child indexes from the root.
///
/// Two groups with the same name in different branches have different paths,
/// so they toggle independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    pub fn new(indexes: Vec<usize>) -> Self {
        Self(indexes)
    }

    pub fn indexes(&self) -> &[usize] {
        &self.0
    }

    fn child(&self, index: usize) -> Self {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Self(indexes)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Disclosure icon shown next to a section name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DisclosureIcon {
    /// Collapsed section
    ChevronDown,
    /// Expanded section
    ChevronUp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PickerRowKind {
    Section {
        name: String,
        expanded: bool,
        icon: DisclosureIcon,
    },
    Entry {
        title: String,
        partition_key: String,
    },
}

/// One visible line of the picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerRow {
    pub path: NodePath,
    pub depth: usize,
    pub kind: PickerRowKind,
}

/// View state of the regulation picker.
#[derive(Debug, Clone)]
pub struct RegulationPicker {
    root: Group,
    expanded: HashSet<NodePath>,
}

impl RegulationPicker {
    /// Builds the tree for `items`; every section starts collapsed.
    pub fn new(items: &[RegulationItem]) -> Self {
        Self::from_tree(HierarchyBuilder::build(items))
    }

    pub fn from_tree(root: Group) -> Self {
        Self {
            root,
            expanded: HashSet::new(),
        }
    }

    pub fn tree(&self) -> &Group {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    pub fn is_expanded(&self, path: &NodePath) -> bool {
        self.expanded.contains(path)
    }

    /// Visible rows, depth-first. Children of collapsed sections are hidden.
    pub fn rows(&self) -> Vec<PickerRow> {
        let mut rows = Vec::new();
        self.push_rows(&self.root, &NodePath::default(), 0, &mut rows);
        rows
    }

    fn push_rows(&self, group: &Group, parent: &NodePath, depth: usize, rows: &mut Vec<PickerRow>) {
        for (index, child) in group.children.iter().enumerate() {
            let path = parent.child(index);
            match child {
                GroupNode::Group(inner) => {
                    let expanded = self.is_expanded(&path);
                    rows.push(PickerRow {
                        path: path.clone(),
                        depth,
                        kind: PickerRowKind::Section {
                            name: inner.name.clone(),
                            expanded,
                            icon: if expanded {
                                DisclosureIcon::ChevronUp
                            } else {
                                DisclosureIcon::ChevronDown
                            },
                        },
                    });
                    if expanded {
                        self.push_rows(inner, &path, depth + 1, rows);
                    }
                }
                GroupNode::Leaf(item) => rows.push(PickerRow {
                    path,
                    depth,
                    kind: PickerRowKind::Entry {
                        title: item.title.clone(),
                        partition_key: item.partition_key.clone(),
                    },
                }),
            }
        }
    }

    /// Flips a section between collapsed and expanded. Returns the new state.
    pub fn toggle(&mut self, path: &NodePath) -> Result<bool> {
        match self.node(path) {
            Some(GroupNode::Group(_)) => {}
            _ => return Err(RegchatError::not_found("picker section", path.to_string())),
        }

        if self.expanded.remove(path) {
            Ok(false)
        } else {
            self.expanded.insert(path.clone());
            Ok(true)
        }
    }

    /// Returns the regulation wrapped by the entry at `path`.
    pub fn select(&self, path: &NodePath) -> Result<&RegulationItem> {
        match self.node(path) {
            Some(GroupNode::Leaf(item)) => Ok(item),
            _ => Err(RegchatError::not_found("picker entry", path.to_string())),
        }
    }

    fn node(&self, path: &NodePath) -> Option<&GroupNode> {
        let (last, parents) = path.indexes().split_last()?;
        let mut group = &self.root;
        for index in parents {
            group = group.children.get(*index)?.as_group()?;
        }
        group.children.get(*last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RegulationPicker {
        RegulationPicker::new(&[
            RegulationItem::new("Overview", "overview"),
            RegulationItem::new("OPPS 2024", "OPPS_2024").with_hierarchy("CMS/Outpatient"),
            RegulationItem::new("PFS 2024", "PFS_2024").with_hierarchy("CMS"),
        ])
    }

    fn section_names(rows: &[PickerRow]) -> Vec<(usize, String)> {
        rows.iter()
            .map(|row| {
                let label = match &row.kind {
                    PickerRowKind::Section { name, .. } => format!("[{name}]"),
                    PickerRowKind::Entry { title, .. } => title.clone(),
                };
                (row.depth, label)
            })
            .collect()
    }

    #[test]
    fn test_sections_start_collapsed() {
        let picker = sample();
        let rows = picker.rows();

        assert_eq!(
            section_names(&rows),
            vec![(0, "Overview".to_string()), (0, "[CMS]".to_string())]
        );
        assert!(matches!(
            rows[1].kind,
            PickerRowKind::Section {
                expanded: false,
                icon: DisclosureIcon::ChevronDown,
                ..
            }
        ));
    }

    #[test]
    fn test_toggle_expands_and_collapses() {
        let mut picker = sample();
        let cms = NodePath::new(vec![1]);

        assert!(picker.toggle(&cms).unwrap());
        assert_eq!(
            section_names(&picker.rows()),
            vec![
                (0, "Overview".to_string()),
                (0, "[CMS]".to_string()),
                (1, "[Outpatient]".to_string()),
                (1, "PFS 2024".to_string()),
            ]
        );

        let outpatient = NodePath::new(vec![1, 0]);
        assert!(picker.toggle(&outpatient).unwrap());
        let rows = picker.rows();
        assert_eq!(rows[3].depth, 2);
        assert!(matches!(&rows[3].kind, PickerRowKind::Entry { title, .. } if title == "OPPS 2024"));
        assert!(matches!(
            rows[1].kind,
            PickerRowKind::Section {
                icon: DisclosureIcon::ChevronUp,
                ..
            }
        ));

        assert!(!picker.toggle(&cms).unwrap());
        assert_eq!(picker.rows().len(), 2);

        // Inner state survives collapsing the parent.
        assert!(picker.toggle(&cms).unwrap());
        assert_eq!(picker.rows().len(), 5);
    }

    #[test]
    fn test_select_returns_wrapped_item() {
        let picker = sample();
        let item = picker.select(&NodePath::new(vec![0])).unwrap();
        assert_eq!(item.partition_key, "overview");

        let nested = picker.select(&NodePath::new(vec![1, 0, 0])).unwrap();
        assert_eq!(nested.partition_key, "OPPS_2024");
    }

    #[test]
    fn test_invalid_paths_are_not_found() {
        let mut picker = sample();
        assert!(picker.select(&NodePath::new(vec![1])).unwrap_err().is_not_found());
        assert!(picker.toggle(&NodePath::new(vec![0])).unwrap_err().is_not_found());
        assert!(picker.toggle(&NodePath::new(vec![9, 9])).is_err());
        assert!(picker.select(&NodePath::default()).is_err());
    }
}
