//! Terminal rendering for the interactive client.

use colored::Colorize;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regchat_core::conversation::{ConversationListItem, EntryKind, TranscriptEntry};
use regchat_core::regulation::{DisclosureIcon, PickerRow, PickerRowKind};

use crate::markdown::separate_numbered_items;

/// Renders a response as plain terminal text.
///
/// Headings and strong text are bold, inline code is highlighted, list items
/// get a bullet or their number. Raw HTML is shown verbatim as text.
pub fn markdown_to_terminal(text: &str) -> String {
    let prepared = separate_numbered_items(text);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::new();
    let mut bold = 0usize;
    let mut lists: Vec<Option<u64>> = Vec::new();

    for event in Parser::new_ext(&prepared, options) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                bold += 1;
                if level == HeadingLevel::H1 {
                    out.push('\n');
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                bold = bold.saturating_sub(1);
                out.push_str("\n\n");
            }
            Event::Start(Tag::Strong) => bold += 1,
            Event::End(TagEnd::Strong) => bold = bold.saturating_sub(1),
            Event::Start(Tag::List(start)) => lists.push(start),
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::Start(Tag::Item) => {
                let indent = "  ".repeat(lists.len().saturating_sub(1));
                let marker = match lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}.");
                        *number += 1;
                        marker
                    }
                    _ => "•".to_string(),
                };
                out.push_str(&format!("{indent}{marker} "));
            }
            Event::End(TagEnd::Item) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Event::End(TagEnd::Paragraph) => {
                out.push('\n');
                if lists.is_empty() {
                    out.push('\n');
                }
            }
            Event::End(TagEnd::TableRow) | Event::End(TagEnd::TableHead) => out.push('\n'),
            Event::End(TagEnd::TableCell) => out.push_str(" | "),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                if bold > 0 {
                    out.push_str(&text.bold().to_string());
                } else {
                    out.push_str(&text);
                }
            }
            Event::Code(code) => out.push_str(&code.yellow().to_string()),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::Rule => out.push_str("────────\n"),
            _ => {}
        }
    }

    out.trim_end().to_string()
}

pub fn render_entry(entry: &TranscriptEntry) -> String {
    let rendered = match entry.kind {
        EntryKind::Prompt => format!("{} {}", "you>".cyan().bold(), entry.text),
        EntryKind::Response => markdown_to_terminal(&entry.text),
        EntryKind::Notice => entry.text.yellow().to_string(),
        EntryKind::Error => entry.text.red().to_string(),
        EntryKind::Separator => {
            return format!("{}\n{}", "─".repeat(40).dimmed(), entry.text.dimmed().italic());
        }
    };

    if entry.historical {
        rendered.dimmed().to_string()
    } else {
        rendered
    }
}

pub fn render_conversation_item(index: usize, item: &ConversationListItem) -> String {
    let marker = if item.active { "*" } else { " " };
    format!(
        "{marker}{:>3}. {} ({}) {}",
        index + 1,
        item.name.bold(),
        item.regulation,
        format!("updated {} ago | {} messages", item.elapsed, item.sequence_count).dimmed()
    )
}

/// One line per visible row; `number` is what the user types to pick it.
pub fn render_picker_row(number: usize, row: &PickerRow) -> String {
    let indent = "  ".repeat(row.depth);
    match &row.kind {
        PickerRowKind::Section { name, icon, .. } => {
            let icon = match icon {
                DisclosureIcon::ChevronDown => "▸",
                DisclosureIcon::ChevronUp => "▾",
            };
            format!("{number:>3}. {indent}{icon} {}", name.bold())
        }
        PickerRowKind::Entry { title, .. } => format!("{number:>3}. {indent}  {title}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_numbered_list_after_paragraph() {
        plain();
        let text = markdown_to_terminal("Changes:\n1. Rates\n2. Codes");
        assert_eq!(text, "Changes:\n\n1. Rates\n2. Codes");
    }

    #[test]
    fn test_bullets_and_code() {
        plain();
        let text = markdown_to_terminal("- uses `APC`\n- second");
        assert_eq!(text, "• uses APC\n• second");
    }

    #[test]
    fn test_prompt_line() {
        plain();
        let mut transcript = regchat_core::conversation::Transcript::new();
        transcript.push_prompt("What changed?");
        assert_eq!(render_entry(&transcript.entries()[0]), "you> What changed?");
    }

    #[test]
    fn test_picker_row_indent() {
        plain();
        let row = PickerRow {
            path: regchat_core::regulation::NodePath::new(vec![0, 1]),
            depth: 1,
            kind: PickerRowKind::Entry {
                title: "OPPS 2024".to_string(),
                partition_key: "OPPS_2024".to_string(),
            },
        };
        assert_eq!(render_picker_row(3, &row), "  3.     OPPS 2024");
    }
}
