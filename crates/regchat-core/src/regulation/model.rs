//! Regulation domain model.

use serde::{Deserialize, Deserializer, Serialize};

/// A regulation document offered by the summarization API.
///
/// `hierarchies` holds zero or more `/`-delimited category paths. The API
/// sometimes sends `null` or omits the field; both deserialize to an empty list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegulationItem {
    /// Display title
    pub title: String,
    /// Unique identifier, used by the backend as its lookup key
    pub partition_key: String,
    /// Category paths, e.g. `"CMS/Final Rules/2024"`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub hierarchies: Vec<String>,
}

impl RegulationItem {
    pub fn new(title: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            partition_key: partition_key.into(),
            hierarchies: Vec::new(),
        }
    }

    /// Adds a category path.
    pub fn with_hierarchy(mut self, path: impl Into<String>) -> Self {
        self.hierarchies.push(path.into());
        self
    }

    /// Returns true if the item declares no category path.
    pub fn is_ungrouped(&self) -> bool {
        self.hierarchies.is_empty()
    }
}

/// Finds a regulation by partition key.
pub fn find_by_partition_key<'a>(
    regulations: &'a [RegulationItem],
    partition_key: &str,
) -> Option<&'a RegulationItem> {
    regulations
        .iter()
        .find(|regulation| regulation.partition_key == partition_key)
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
