//! Renderer for the markdown subset used by news articles and tips.
//!
//! Supported syntax: `#`/`##`/`###` headings, `***both***`, `**bold**`,
//! `*italic*`, `[text](url)`, `![alt](url)`, `> quote` and `- item` lines,
//! and newline-based paragraph breaks. Anything else is kept as literal,
//! HTML-escaped text.
//!
//! Rendering runs in three steps: the source is split into [`Block`]s, each
//! line is scanned into [`Inline`] spans, and the spans are emitted. Literal
//! text is escaped at emission time, so escaping always happens before any
//! tag is produced and raw HTML in the source is never passed through.

use crate::rendering::links::is_safe_url;

const PARAGRAPH_OPEN: &str = "<p class=\"mb-4\">";
const PARAGRAPH_CLOSE: &str = "</p>";
const PARAGRAPH_BREAK: &str = "</p><p class=\"mb-4\">";
const LINE_BREAK: &str = "<br/>";

/// Emphasis and link labels deeper than this are emitted literally.
const MAX_INLINE_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Heading(u8),
    Quote,
    ListItem,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    Strong,
    Em,
    StrongEm,
}

impl Emphasis {
    fn delimiter(&self) -> &'static str {
        match self {
            Emphasis::StrongEm => "***",
            Emphasis::Strong => "**",
            Emphasis::Em => "*",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Inline<'a> {
    Text(&'a str),
    Emphasis(Emphasis, Vec<Inline<'a>>),
    Link { label: Vec<Inline<'a>>, url: &'a str },
    Image { alt: &'a str, url: &'a str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Block<'a> {
    Line(LineKind, Vec<Inline<'a>>),
    /// A run of consecutive newlines.
    Newlines(usize),
}

/// Render a markdown-subset string to HTML.
///
/// Never fails: unknown syntax is passed through as escaped text and the
/// whole output is wrapped in one paragraph.
///
/// ```
/// use drnoflu::rendering::markdown::render_markdown;
///
/// assert_eq!(render_markdown(""), "<p class=\"mb-4\"></p>");
/// assert_eq!(
///     render_markdown("**Taxe** due"),
///     "<p class=\"mb-4\"><strong>Taxe</strong> due</p>"
/// );
/// ```
pub fn render_markdown(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 64);
    out.push_str(PARAGRAPH_OPEN);

    for block in parse_blocks(source) {
        match block {
            Block::Newlines(count) => {
                for _ in 0..count / 2 {
                    out.push_str(PARAGRAPH_BREAK);
                }
                if count % 2 == 1 {
                    out.push_str(LINE_BREAK);
                }
            }
            Block::Line(kind, inlines) => emit_line(kind, &inlines, &mut out),
        }
    }

    out.push_str(PARAGRAPH_CLOSE);
    out
}

/// Reduce a markdown-subset string to plain text of at most `max_chars` characters.
///
/// Markup is dropped, image alt text and link labels are kept, and every
/// line break collapses to a single space.
pub fn plain_text(source: &str, max_chars: usize) -> String {
    let mut text = String::with_capacity(source.len());

    for block in parse_blocks(source) {
        match block {
            Block::Newlines(_) => text.push(' '),
            Block::Line(_, inlines) => emit_text(&inlines, &mut text),
        }
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match collapsed.char_indices().nth(max_chars) {
        Some((cut, _)) => collapsed[..cut].trim_end().to_string(),
        None => collapsed,
    }
}

fn parse_blocks(source: &str) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut newlines = 0;

    for (index, line) in source.split('\n').enumerate() {
        if index > 0 {
            newlines += 1;
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() {
            continue;
        }
        if newlines > 0 {
            blocks.push(Block::Newlines(newlines));
            newlines = 0;
        }
        let (kind, content) = classify_line(line);
        blocks.push(Block::Line(kind, parse_inline(content, 0)));
    }

    if newlines > 0 {
        blocks.push(Block::Newlines(newlines));
    }
    blocks
}

/// Longest heading prefix first, so `###` is never read as `#`.
fn classify_line(line: &str) -> (LineKind, &str) {
    if let Some(rest) = line.strip_prefix("### ") {
        (LineKind::Heading(3), rest)
    } else if let Some(rest) = line.strip_prefix("## ") {
        (LineKind::Heading(2), rest)
    } else if let Some(rest) = line.strip_prefix("# ") {
        (LineKind::Heading(1), rest)
    } else if let Some(rest) = line.strip_prefix('>') {
        (LineKind::Quote, rest.strip_prefix(' ').unwrap_or(rest))
    } else if let Some(rest) = line.strip_prefix("- ") {
        (LineKind::ListItem, rest)
    } else {
        (LineKind::Plain, line)
    }
}

fn is_special(c: char) -> bool {
    matches!(c, '!' | '[' | '*')
}

/// Delimiters that can no longer close anywhere in the rest of a line.
///
/// A failed search for `](` or for a closing `*` run from one offset fails
/// from every later offset too, so each is searched for at most once per
/// failure instead of once per opening character.
#[derive(Debug, Default)]
struct Exhausted {
    bracket_target: bool,
    emphasis: [bool; 3],
}

impl Exhausted {
    fn emphasis_slot(kind: Emphasis) -> usize {
        match kind {
            Emphasis::StrongEm => 0,
            Emphasis::Strong => 1,
            Emphasis::Em => 2,
        }
    }
}

fn parse_inline(text: &str, depth: usize) -> Vec<Inline<'_>> {
    let mut spans = Vec::new();
    let mut rest = text;
    let mut exhausted = Exhausted::default();

    while let Some(pos) = rest.find(is_special) {
        if pos > 0 {
            spans.push(Inline::Text(&rest[..pos]));
        }
        let tail = &rest[pos..];

        let parsed = if depth >= MAX_INLINE_DEPTH {
            None
        } else if tail.starts_with("![") {
            parse_image(tail, &mut exhausted)
        } else if tail.starts_with('[') {
            parse_link(tail, depth, &mut exhausted)
        } else if tail.starts_with('*') {
            parse_emphasis(tail, depth, &mut exhausted)
        } else {
            None
        };

        match parsed {
            Some((span, consumed)) => {
                spans.push(span);
                rest = &tail[consumed..];
            }
            None => {
                // All special characters are one byte long.
                spans.push(Inline::Text(&tail[..1]));
                rest = &tail[1..];
            }
        }
    }

    if !rest.is_empty() {
        spans.push(Inline::Text(rest));
    }
    spans
}

/// Split `[label](url)` at the start of `tail` into (label, url, consumed bytes).
fn split_bracket_target<'a>(
    tail: &'a str,
    exhausted: &mut Exhausted,
) -> Option<(&'a str, &'a str, usize)> {
    if exhausted.bracket_target {
        return None;
    }
    let body = tail.strip_prefix('[')?;

    // The first `](` after this bracket is also the first one after any
    // later bracket, so a miss here is a miss for the rest of the line.
    let target = body.find("](").and_then(|label_end| {
        let after_label = &body[label_end + 2..];
        after_label
            .find(')')
            .map(|url_end| (label_end, after_label, url_end))
    });
    let Some((label_end, after_label, url_end)) = target else {
        exhausted.bracket_target = true;
        return None;
    };

    let label = &body[..label_end];
    let url = &after_label[..url_end];
    let consumed = 1 + label_end + 2 + url_end + 1;
    Some((label, url, consumed))
}

fn parse_image<'a>(tail: &'a str, exhausted: &mut Exhausted) -> Option<(Inline<'a>, usize)> {
    let (alt, url, consumed) = split_bracket_target(&tail[1..], exhausted)?;
    Some((Inline::Image { alt, url }, consumed + 1))
}

fn parse_link<'a>(
    tail: &'a str,
    depth: usize,
    exhausted: &mut Exhausted,
) -> Option<(Inline<'a>, usize)> {
    let (label, url, consumed) = split_bracket_target(tail, exhausted)?;
    Some((
        Inline::Link {
            label: parse_inline(label, depth + 1),
            url,
        },
        consumed,
    ))
}

/// Longest delimiter first: `***`, then `**`, then `*`.
fn parse_emphasis<'a>(
    tail: &'a str,
    depth: usize,
    exhausted: &mut Exhausted,
) -> Option<(Inline<'a>, usize)> {
    for kind in [Emphasis::StrongEm, Emphasis::Strong, Emphasis::Em] {
        let slot = Exhausted::emphasis_slot(kind);
        if exhausted.emphasis[slot] {
            continue;
        }
        let delimiter = kind.delimiter();
        let Some(body) = tail.strip_prefix(delimiter) else {
            continue;
        };
        let Some(close) = body.find(delimiter) else {
            exhausted.emphasis[slot] = true;
            continue;
        };
        if close == 0 {
            continue;
        }
        let inner = parse_inline(&body[..close], depth + 1);
        return Some((Inline::Emphasis(kind, inner), delimiter.len() * 2 + close));
    }
    None
}

fn emit_line(kind: LineKind, inlines: &[Inline<'_>], out: &mut String) {
    let (open, close) = match kind {
        LineKind::Heading(1) => ("<h1>", "</h1>"),
        LineKind::Heading(2) => ("<h2>", "</h2>"),
        LineKind::Heading(_) => ("<h3>", "</h3>"),
        LineKind::Quote => ("<blockquote>", "</blockquote>"),
        LineKind::ListItem => ("<li>", "</li>"),
        LineKind::Plain => ("", ""),
    };
    out.push_str(open);
    emit_html(inlines, out);
    out.push_str(close);
}

fn emit_html(inlines: &[Inline<'_>], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => escape_text(text, out),
            Inline::Emphasis(kind, inner) => {
                let (open, close) = match kind {
                    Emphasis::StrongEm => ("<strong><em>", "</em></strong>"),
                    Emphasis::Strong => ("<strong>", "</strong>"),
                    Emphasis::Em => ("<em>", "</em>"),
                };
                out.push_str(open);
                emit_html(inner, out);
                out.push_str(close);
            }
            Inline::Link { label, url } => {
                if is_safe_url(url) {
                    out.push_str("<a href=\"");
                    escape_attribute(url.trim(), out);
                    out.push_str("\" target=\"_blank\" rel=\"noopener\">");
                    emit_html(label, out);
                    out.push_str("</a>");
                } else {
                    tracing::debug!("Dropping unsafe link target");
                    emit_html(label, out);
                }
            }
            Inline::Image { alt, url } => {
                if is_safe_url(url) {
                    out.push_str("<img src=\"");
                    escape_attribute(url.trim(), out);
                    out.push_str("\" alt=\"");
                    escape_attribute(alt, out);
                    out.push_str("\" />");
                } else {
                    tracing::debug!("Dropping unsafe image source");
                    escape_text(alt, out);
                }
            }
        }
    }
}

fn emit_text(inlines: &[Inline<'_>], out: &mut String) {
    for inline in inlines {
        match inline {
            Inline::Text(text) => out.push_str(text),
            Inline::Emphasis(_, inner) => emit_text(inner, out),
            Inline::Link { label, .. } => emit_text(label, out),
            Inline::Image { alt, .. } => out.push_str(alt),
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attribute(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => escape_text_char(c, out),
        }
    }
}

fn escape_text_char(c: char, out: &mut String) {
    let mut buf = [0u8; 4];
    escape_text(c.encode_utf8(&mut buf), out);
}
