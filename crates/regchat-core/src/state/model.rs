//! Client state that persists across runs.

use crate::auth::IdToken;
use crate::regulation::RegulationItem;
use serde::{Deserialize, Serialize};

/// Persisted client state.
///
/// # Fields
///
/// * `selected_regulation` - Regulation new questions are asked about.
/// * `user_id` - Anonymous id used before sign-in was introduced. Present
///   only until its conversations have been migrated to the signed-in user.
/// * `id_token` - Token of the current sign-in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_regulation: Option<RegulationItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<IdToken>,
}
