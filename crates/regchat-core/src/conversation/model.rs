//! Conversation domain models.
//!
//! These mirror the JSON shapes of the summarization API: the conversation
//! list entries, a loaded conversation with its log, and the log messages.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One prompt/response exchange of a conversation.
///
/// `sequence` defines the order within a conversation. The API does not
/// guarantee the log arrives sorted; see [`sort_by_sequence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    pub sequence: i64,
    /// The user's prompt exactly as typed
    #[serde(default, deserialize_with = "null_as_empty")]
    pub prompt_raw: String,
    /// The assistant's reply (markdown)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub response: String,
}

impl ConversationMessage {
    pub fn new(sequence: i64, prompt_raw: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            sequence,
            prompt_raw: prompt_raw.into(),
            response: response.into(),
        }
    }
}

/// Sorts a log ascending by `sequence`. The sort is stable, so duplicate
/// sequence numbers keep their source order.
pub fn sort_by_sequence(log: &mut [ConversationMessage]) {
    log.sort_by_key(|message| message.sequence);
}

/// A conversation as returned by `/conversations/load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadedConversation {
    /// Partition key of the regulation the conversation is about
    pub regulation: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub log: Vec<ConversationMessage>,
}

/// An entry of `/conversations/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub name: String,
    /// Partition key of the regulation
    pub regulation: String,
    /// Last update time; `None` until the first exchange is stored
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub sequence_count: u32,
}

impl ConversationSummary {
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated.as_deref().and_then(parse_timestamp)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.as_deref().and_then(parse_timestamp)
    }
}

/// Parses the timestamps the backend emits.
///
/// Accepts RFC 3339 (`2024-05-01T12:00:00Z`) and the space-separated form
/// with offset (`2024-05-01 12:00:00.123456+00:00`). A value without offset
/// is taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_sort_by_sequence_is_stable() {
        let mut log = vec![
            ConversationMessage::new(3, "c", "C"),
            ConversationMessage::new(1, "a", "A"),
            ConversationMessage::new(2, "b1", "B1"),
            ConversationMessage::new(2, "b2", "B2"),
        ];

        sort_by_sequence(&mut log);

        let prompts: Vec<&str> = log.iter().map(|m| m.prompt_raw.as_str()).collect();
        assert_eq!(prompts, vec!["a", "b1", "b2", "c"]);
    }

    #[test]
    fn test_loaded_conversation_tolerates_nulls() {
        let json = r#"{
            "regulation": "OPPS_2024",
            "log": [{"sequence": 1, "promptRaw": null, "response": "hi"}]
        }"#;
        let loaded: LoadedConversation = serde_json::from_str(json).unwrap();
        assert_eq!(loaded.log[0].prompt_raw, "");
        assert_eq!(loaded.log[0].response, "hi");

        let without_log: LoadedConversation =
            serde_json::from_str(r#"{"regulation": "OPPS_2024", "log": null}"#).unwrap();
        assert!(without_log.log.is_empty());
    }

    #[test]
    fn test_parse_backend_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();

        assert_eq!(parse_timestamp("2024-05-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-01 12:30:00+00:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-05-01 14:30:00.000000+02:00"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("2024-05-01 12:30:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_summary_deserialize() {
        let json = r#"{
            "id": "c-1", "name": "Payment rates", "regulation": "OPPS_2024",
            "updated": null, "created": "2024-05-01 12:30:00+00:00", "sequenceCount": 4
        }"#;
        let summary: ConversationSummary = serde_json::from_str(json).unwrap();
        assert!(summary.updated_at().is_none());
        assert!(summary.created_at().is_some());
        assert_eq!(summary.sequence_count, 4);
    }
}
