//! Best-effort conversion of rich (HTML) message bodies into a
//! plain-text fallback.
//!
//! This is not an HTML parser: malformed markup degrades gracefully
//! instead of erroring, and the output is only ever used as the
//! `text/plain` alternative of an outgoing mail.

use std::sync::LazyLock;

use regex::{Captures, Regex};

#[allow(clippy::unwrap_used, reason = "Patterns are compile-time constants")]
fn pattern(re: &str) -> Regex {
    Regex::new(re).unwrap()
}

/// Blocks whose content never belongs in a text rendering. One pattern
/// per tag since the regex engine has no backreferences.
static NON_VISIBLE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "noscript", "template", "head"]
        .iter()
        .map(|tag| pattern(&format!(r"(?is)<\s*{tag}\b.*?</\s*{tag}\s*>")))
        .collect()
});

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<\s*(?:br|hr)\s*/?\s*>"));

static BLOCK_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(
        r"(?i)</\s*(?:p|div|section|article|header|footer|aside|form|nav|main|figure|figcaption|h[1-6])\s*>",
    )
});

static LIST_ITEM_OPEN: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<\s*li[^>]*>"));
static LIST_ITEM_CLOSE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</\s*li\s*>"));
static LIST_CLOSE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</\s*(?:ul|ol)\s*>"));

static TABLE_CELL_CLOSE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</\s*(?:td|th)\s*>"));
static TABLE_ROW_CLOSE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</\s*tr\s*>"));
static TABLE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?i)</\s*(?:thead|tbody|tfoot|table)\s*>"));

static QUOTE_OPEN: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)<\s*blockquote[^>]*>"));
static QUOTE_CLOSE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(?i)</\s*blockquote\s*>"));

static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| pattern(r"<[^>]+>"));

static ENTITY_HEX: LazyLock<Regex> = LazyLock::new(|| pattern(r"&#x([0-9a-fA-F]+);"));
static ENTITY_DEC: LazyLock<Regex> = LazyLock::new(|| pattern(r"&#([0-9]+);"));

static MANY_NEWLINES: LazyLock<Regex> = LazyLock::new(|| pattern(r"\n{3,}"));
static MANY_SPACES: LazyLock<Regex> = LazyLock::new(|| pattern("[ \u{a0}]{2,}"));

/// Decode numeric character references and the common named entities.
fn decode_entities(input: &str) -> String {
    let decoded = ENTITY_HEX.replace_all(input, |caps: &Captures<'_>| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });
    let decoded = ENTITY_DEC.replace_all(&decoded, |caps: &Captures<'_>| {
        caps[1]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    decoded
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&lsquo;", "\u{2018}")
        .replace("&rsquo;", "\u{2019}")
        .replace("&ldquo;", "\u{201c}")
        .replace("&rdquo;", "\u{201d}")
        .replace("&hellip;", "\u{2026}")
        .replace("&mdash;", "\u{2014}")
        .replace("&ndash;", "\u{2013}")
}

/// Render an HTML body as plain text.
///
/// Total: any input yields a (possibly empty) string. Structural
/// elements become line breaks, list items become bullets, table cells
/// become tab-separated fields, quote blocks get a `> ` prefix, and all
/// remaining markup is stripped before whitespace is normalized.
#[must_use]
pub fn html_to_text(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let mut s = html.to_string();

    for block in NON_VISIBLE.iter() {
        s = block.replace_all(&s, "").into_owned();
    }

    s = LINE_BREAK.replace_all(&s, "\n").into_owned();
    s = BLOCK_CLOSE.replace_all(&s, "\n\n").into_owned();

    s = LIST_ITEM_OPEN.replace_all(&s, "\n\u{2022} ").into_owned();
    s = LIST_ITEM_CLOSE.replace_all(&s, "").into_owned();
    s = LIST_CLOSE.replace_all(&s, "\n").into_owned();

    s = TABLE_CELL_CLOSE.replace_all(&s, "\t").into_owned();
    s = TABLE_ROW_CLOSE.replace_all(&s, "\n").into_owned();
    s = TABLE_CLOSE.replace_all(&s, "\n").into_owned();

    s = QUOTE_OPEN.replace_all(&s, "\n> ").into_owned();
    s = QUOTE_CLOSE.replace_all(&s, "\n").into_owned();

    s = ANY_TAG.replace_all(&s, "").into_owned();
    s = decode_entities(&s);

    // Tabs came from table cells; two spaces keeps columns apart.
    s = s.replace('\t', "  ");
    s = MANY_NEWLINES.replace_all(&s, "\n\n").into_owned();

    s = s
        .lines()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("\n");

    s = MANY_SPACES.replace_all(&s, " ").into_owned();

    s.trim().to_string()
}
