//! Message text post-processing

use regex::Regex;
use std::sync::OnceLock;

static BOLD: OnceLock<Regex> = OnceLock::new();

fn bold_pattern() -> &'static Regex {
    BOLD.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid bold pattern"))
}

/// Strip the Markdown code fence models like to wrap replies in
pub fn sanitize_ai_text(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix("```").unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix("markdown").unwrap_or(trimmed);
    trimmed.trim().to_string()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape text for Telegram's HTML parse mode and turn `**bold**` into `<b>`
pub fn format_telegram_html(text: &str) -> String {
    let escaped = escape_html(text.trim());
    bold_pattern()
        .replace_all(&escaped, "<b>$1</b>")
        .into_owned()
}
