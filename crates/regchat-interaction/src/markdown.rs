//! Markdown rendering for assistant responses.
//!
//! Responses are rendered with GFM tables and strikethrough. Single line
//! breaks are kept as `<br />`. The output is sanitized on the event stream:
//! raw HTML in the source is escaped instead of passed through, and link or
//! image targets using a script-capable scheme are replaced with `#`.

use once_cell::sync::Lazy;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};
use regex::Regex;

static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\d+\.").expect("numbered item pattern is valid"));

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "vbscript:", "data:"];

/// Inserts a blank line before every line starting with `N.`, so numbered
/// items following a paragraph line start a list.
pub fn separate_numbered_items(text: &str) -> String {
    NUMBERED_ITEM.replace_all(text, "\n$0").into_owned()
}

/// Renders a response to sanitized HTML.
pub fn render_markdown(text: &str) -> String {
    let prepared = separate_numbered_items(text);

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let events = Parser::new_ext(&prepared, options).map(sanitize_event);

    let mut output = String::with_capacity(prepared.len() * 3 / 2);
    html::push_html(&mut output, events);
    output
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    if is_blocked_url(&url) {
        CowStr::Borrowed("#")
    } else {
        url
    }
}

/// Browsers ignore whitespace and control characters inside a scheme, so
/// they are dropped before comparing.
fn is_blocked_url(url: &str) -> bool {
    let normalized: String = url
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCKED_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

/// Escapes text for use in HTML element content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
