//! Conversation history panel: ordering, elapsed-time labels, highlighting.

use super::model::ConversationSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Reverse;

/// A conversation as shown in the history panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationListItem {
    pub id: String,
    pub name: String,
    pub regulation: String,
    /// e.g. "5 min", "3 hours", "2 days"
    pub elapsed: String,
    pub sequence_count: u32,
    /// The conversation currently open in the chat panel
    pub active: bool,
}

/// Sorts most recently updated first, then most recently created.
///
/// Conversations without a parseable timestamp sort after those with one.
pub fn sort_conversations(conversations: &mut [ConversationSummary]) {
    conversations.sort_by_key(|c| (Reverse(c.updated_at()), Reverse(c.created_at())));
}

/// Elapsed time since `then`, in the coarsest unit under its next step.
pub fn format_elapsed(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = now.signed_duration_since(then).num_minutes();
    if minutes < 0 {
        return "0 min".to_string();
    }
    if minutes < 60 {
        return format!("{minutes} min");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours} hours");
    }

    format!("{} days", hours / 24)
}

/// Sorts `conversations` and turns them into panel items.
///
/// The elapsed label uses the update time and falls back to the creation
/// time for conversations that were never updated.
pub fn build_list_items(
    mut conversations: Vec<ConversationSummary>,
    now: DateTime<Utc>,
    active_id: Option<&str>,
) -> Vec<ConversationListItem> {
    sort_conversations(&mut conversations);

    conversations
        .into_iter()
        .map(|conversation| {
            let elapsed = conversation
                .updated_at()
                .or_else(|| conversation.created_at())
                .map(|then| format_elapsed(then, now))
                .unwrap_or_else(|| "0 min".to_string());
            ConversationListItem {
                active: active_id == Some(conversation.id.as_str()),
                id: conversation.id,
                name: conversation.name,
                regulation: conversation.regulation,
                elapsed,
                sequence_count: conversation.sequence_count,
            }
        })
        .collect()
}

/// Marks the item matching `active_id` and clears every other mark.
pub fn highlight_active(items: &mut [ConversationListItem], active_id: Option<&str>) {
    for item in items {
        item.active = active_id == Some(item.id.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn summary(id: &str, updated: Option<&str>, created: &str) -> ConversationSummary {
        ConversationSummary {
            id: id.to_string(),
            name: format!("Conversation {id}"),
            regulation: "OPPS_2024".to_string(),
            updated: updated.map(str::to_string),
            created: Some(created.to_string()),
            sequence_count: 2,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format_elapsed_units() {
        let now = now();
        assert_eq!(format_elapsed(now + Duration::minutes(5), now), "0 min");
        assert_eq!(format_elapsed(now - Duration::seconds(30), now), "0 min");
        assert_eq!(format_elapsed(now - Duration::minutes(59), now), "59 min");
        assert_eq!(format_elapsed(now - Duration::minutes(60), now), "1 hours");
        assert_eq!(format_elapsed(now - Duration::hours(23), now), "23 hours");
        assert_eq!(format_elapsed(now - Duration::hours(49), now), "2 days");
    }

    #[test]
    fn test_sort_by_updated_then_created() {
        let mut conversations = vec![
            summary("old", Some("2024-05-01 10:00:00+00:00"), "2024-04-01 10:00:00+00:00"),
            summary("never-updated", None, "2024-05-30 10:00:00+00:00"),
            summary("new", Some("2024-05-31 10:00:00+00:00"), "2024-04-01 10:00:00+00:00"),
            summary("tie-later", Some("2024-05-01 10:00:00+00:00"), "2024-04-02 10:00:00+00:00"),
        ];

        sort_conversations(&mut conversations);

        let ids: Vec<&str> = conversations.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "tie-later", "old", "never-updated"]);
    }

    #[test]
    fn test_build_list_items_marks_active() {
        let conversations = vec![
            summary("a", Some("2024-06-01 11:30:00+00:00"), "2024-06-01 11:00:00+00:00"),
            summary("b", None, "2024-05-30 12:00:00+00:00"),
        ];

        let items = build_list_items(conversations, now(), Some("b"));

        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].elapsed, "30 min");
        assert!(!items[0].active);
        assert_eq!(items[1].elapsed, "2 days");
        assert!(items[1].active);
    }

    #[test]
    fn test_highlight_active_moves_mark() {
        let mut items = build_list_items(
            vec![summary("a", None, "2024-06-01 11:00:00+00:00")],
            now(),
            Some("a"),
        );
        highlight_active(&mut items, None);
        assert!(!items[0].active);
        highlight_active(&mut items, Some("a"));
        assert!(items[0].active);
    }
}
