//! Regulation domain module.
//!
//! - `model`: the regulation record returned by the API (`RegulationItem`)
//! - `hierarchy`: grouping into a category tree (`HierarchyBuilder`, `GroupNode`)
//! - `picker`: collapsible depth-first view over the tree (`RegulationPicker`)

mod hierarchy;
mod model;
mod picker;

pub use hierarchy::{Group, GroupNode, HierarchyBuilder, PATH_SEPARATOR, ROOT_GROUP_NAME};
pub use model::{RegulationItem, find_by_partition_key};
pub use picker::{DisclosureIcon, NodePath, PickerRow, PickerRowKind, RegulationPicker};
