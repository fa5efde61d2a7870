//! HTML fragments for hosts that embed the chat panel in a page.

use crate::markdown::{escape_html, render_markdown};
use regchat_core::conversation::{ConversationListItem, EntryKind, Transcript, TranscriptEntry};
use regchat_core::regulation::{DisclosureIcon, PickerRow, PickerRowKind};

/// Element id of the scope separator.
pub const SEPARATOR_ID: &str = "out-of-scope-separator";
/// Class added to entries outside the context window.
pub const FADED_CLASS: &str = "faded-message";
/// Class added to the open conversation in the history panel.
pub const ACTIVE_CONVERSATION_CLASS: &str = "active-conversation";

pub fn render_entry(entry: &TranscriptEntry) -> String {
    let (class, body) = match entry.kind {
        EntryKind::Prompt => ("message user-message", escape_html(&entry.text)),
        EntryKind::Response => ("message message-content", render_markdown(&entry.text)),
        EntryKind::Notice => ("message message-content", escape_html(&entry.text)),
        EntryKind::Error => ("message error-message", escape_html(&entry.text)),
        EntryKind::Separator => {
            return format!(
                r#"<div id="{SEPARATOR_ID}" class="separator-message">{}</div>"#,
                escape_html(&entry.text)
            );
        }
    };

    if entry.historical {
        format!(r#"<div class="{class} {FADED_CLASS}">{body}</div>"#)
    } else {
        format!(r#"<div class="{class}">{body}</div>"#)
    }
}

pub fn render_transcript(transcript: &Transcript) -> String {
    transcript
        .entries()
        .iter()
        .map(render_entry)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_conversation_item(item: &ConversationListItem) -> String {
    let class = if item.active {
        format!("conversation-item {ACTIVE_CONVERSATION_CLASS}")
    } else {
        "conversation-item".to_string()
    };
    format!(
        concat!(
            r#"<div class="{}" data-conversation-id="{}">"#,
            r#"<strong>{}</strong> ({})<br>"#,
            r#"<span class="conversation-meta">Updated: {} ago</span> | "#,
            r#"<span class="conversation-meta">{} messages</span></div>"#
        ),
        class,
        escape_html(&item.id),
        escape_html(&item.name),
        escape_html(&item.regulation),
        escape_html(&item.elapsed),
        item.sequence_count,
    )
}

/// Visible picker rows. Sections are headers that the host wires to
/// `toggle`; entries are buttons wired to `select`.
pub fn render_picker_rows(rows: &[PickerRow]) -> String {
    rows.iter()
        .map(|row| {
            let indent = row.depth;
            match &row.kind {
                PickerRowKind::Section { name, icon, .. } => {
                    let icon = match icon {
                        DisclosureIcon::ChevronDown => "chevron-down",
                        DisclosureIcon::ChevronUp => "chevron-up",
                    };
                    format!(
                        r#"<div class="collapsible-section-header depth-{indent}" data-path="{}"><span class="{icon}"></span><span>{}</span></div>"#,
                        row.path,
                        escape_html(name)
                    )
                }
                PickerRowKind::Entry { title, .. } => format!(
                    r#"<button class="regulation-entry depth-{indent}" data-path="{}">{}</button>"#,
                    row.path,
                    escape_html(title)
                ),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
