//! Markdown host.
//!
//! Runs the filter over CommonMark/GFM source without pandoc in the loop.
//! Each prose text run is split into whitespace-delimited words, and each
//! word is handed to the [`Filter`] as one text unit, which is how pandoc
//! tokenizes `Str` nodes. Code blocks and YAML metadata are left alone.
//!
//! Replacement text is inserted as literal text: characters that would
//! otherwise open emphasis, code, links or HTML are written as numeric
//! character references, and so are list, heading and fence markers when a
//! replacement starts a line.
//!
//! ## Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use metavars_lib::{Clock, Filter, Registry};
//! use metavars_lib::markdown::filter_markdown;
//!
//! let registry = Registry::builtin(Clock::fixed_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
//! let output = filter_markdown("Generated on {today()}", &Filter::new(&registry)).unwrap();
//! assert!(output.contains("Generated on 2024-01-01"));
//! ```

use lazy_static::lazy_static;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use pulldown_cmark_to_cmark::cmark;
use regex::Regex;

use crate::error::{MetavarsError, Result};
use crate::filter::Filter;
use crate::node::{Attr, Inline};

lazy_static! {
    /// Text that opens a block when it begins a line: bullets, ordered
    /// list markers, ATX headings, setext underlines and `~~~` fences.
    static ref BLOCK_MARKER: Regex =
        Regex::new(r"^(?:[-+*]|\d{1,9}[.)]|#{1,6}|=+|-+|~{3,})(?:\s|$)").unwrap();
}

/// Characters with inline meaning in CommonMark/GFM.
const INLINE_SPECIAL: &[char] = &['\\', '*', '_', '`', '[', ']', '<', '>', '|', '~', '&'];

/// Creates a parser with standard GFM options.
fn create_parser(content: &str) -> Parser<'_> {
    let opts = Options::ENABLE_GFM
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
    Parser::new_ext(content, opts)
}

/// Filters markdown source and renders it back to markdown.
pub fn filter_markdown(content: &str, filter: &Filter<'_>) -> Result<String> {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut verbatim_depth: u32 = 0;
    let mut replaced = 0;

    for event in TextMergeStream::new(create_parser(content)) {
        match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Start(Tag::MetadataBlock(_)) => {
                verbatim_depth += 1;
                events.push(event);
            }
            Event::End(TagEnd::CodeBlock) | Event::End(TagEnd::MetadataBlock(_)) => {
                verbatim_depth = verbatim_depth.saturating_sub(1);
                events.push(event);
            }
            Event::Text(text) if verbatim_depth == 0 => {
                let line_start = starts_line(events.last());
                replaced += filter_text(text, line_start, filter, &mut events)?;
            }
            other => events.push(other),
        }
    }

    tracing::info!(replaced, "Filtered markdown document");

    let mut output = String::new();
    cmark(events.iter(), &mut output).map_err(|e| MetavarsError::Render(e.to_string()))?;
    Ok(output)
}

/// Whether a text run following `previous` begins a new source line.
fn starts_line(previous: Option<&Event<'_>>) -> bool {
    matches!(
        previous,
        Some(
            Event::Start(Tag::Paragraph | Tag::Item)
                | Event::SoftBreak
                | Event::HardBreak
        )
    )
}

/// Filters one text run word by word, pushing the resulting events.
///
/// Returns the number of words replaced. An untouched run is pushed back
/// as the original event.
fn filter_text<'a>(
    text: CowStr<'a>,
    line_start: bool,
    filter: &Filter<'_>,
    events: &mut Vec<Event<'a>>,
) -> Result<usize> {
    let mut pending = String::new();
    let mut rendered: Vec<Event<'a>> = Vec::new();
    let mut replaced = 0;

    for piece in text.split_inclusive(char::is_whitespace) {
        let word = piece.trim_end();
        let gap = &piece[word.len()..];

        if !word.is_empty() {
            let at_line_start = line_start && pending.is_empty() && rendered.is_empty();
            match filter.apply(&Inline::text(word))? {
                None => {
                    tracing::trace!(text = word, "No placeholder");
                    pending.push_str(word);
                }
                Some(Inline::Str(plain)) => {
                    replaced += 1;
                    pending.push_str(&escape_literal(&plain, at_line_start));
                }
                Some(rich) => {
                    replaced += 1;
                    if !pending.is_empty() {
                        rendered.push(Event::Text(CowStr::from(std::mem::take(&mut pending))));
                    }
                    push_inline(rich, &mut rendered);
                }
            }
        }
        pending.push_str(gap);
    }

    if replaced == 0 {
        events.push(Event::Text(text));
        return Ok(0);
    }

    if !pending.is_empty() {
        rendered.push(Event::Text(CowStr::from(pending)));
    }
    events.extend(rendered);
    Ok(replaced)
}

/// Renders an inline node as markdown events.
///
/// Node kinds markdown has syntax for map onto it; the rest fall back to
/// inline HTML, the way pandoc's markdown writer handles them.
fn push_inline(inline: Inline, out: &mut Vec<Event<'_>>) {
    match inline {
        Inline::Str(text) => out.push(Event::Text(CowStr::from(escape_literal(&text, false)))),
        Inline::Space => out.push(Event::Text(CowStr::Borrowed(" "))),
        Inline::SoftBreak => out.push(Event::SoftBreak),
        Inline::LineBreak => out.push(Event::HardBreak),
        Inline::Code(_, code) => out.push(Event::Code(CowStr::from(code))),
        Inline::Emph(children) => {
            wrap_tag(Tag::Emphasis, TagEnd::Emphasis, children, out);
        }
        Inline::Strong(children) => {
            wrap_tag(Tag::Strong, TagEnd::Strong, children, out);
        }
        Inline::Strikeout(children) => {
            wrap_tag(Tag::Strikethrough, TagEnd::Strikethrough, children, out);
        }
        Inline::Superscript(children) => wrap_html("<sup>".to_string(), "</sup>", children, out),
        Inline::Subscript(children) => wrap_html("<sub>".to_string(), "</sub>", children, out),
        Inline::SmallCaps(children) => wrap_html(
            r#"<span style="font-variant: small-caps;">"#.to_string(),
            "</span>",
            children,
            out,
        ),
        Inline::Span(attr, children) => wrap_html(span_open(&attr), "</span>", children, out),
    }
}

/// Makes replacement text read back as the same literal text.
///
/// Markdown-significant characters become numeric character references,
/// which CommonMark never treats as structure.
fn escape_literal(text: &str, line_start: bool) -> String {
    let marker = (line_start && BLOCK_MARKER.is_match(text)).then(|| {
        // Ordered list markers are neutralized at their delimiter.
        if text.starts_with(|c: char| c.is_ascii_digit()) {
            text.find(['.', ')']).unwrap_or(0)
        } else {
            0
        }
    });

    let mut out = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        if Some(i) == marker || INLINE_SPECIAL.contains(&c) {
            out.push_str(&format!("&#{};", u32::from(c)));
        } else {
            out.push(c);
        }
    }
    out
}

fn wrap_tag<'a>(start: Tag<'a>, end: TagEnd, children: Vec<Inline>, out: &mut Vec<Event<'a>>) {
    out.push(Event::Start(start));
    for child in children {
        push_inline(child, out);
    }
    out.push(Event::End(end));
}

fn wrap_html(open: String, close: &'static str, children: Vec<Inline>, out: &mut Vec<Event<'_>>) {
    out.push(Event::InlineHtml(CowStr::from(open)));
    for child in children {
        push_inline(child, out);
    }
    out.push(Event::InlineHtml(CowStr::Borrowed(close)));
}

/// Opening `<span>` carrying `attr`; key/value pairs become `data-` attributes.
fn span_open(attr: &Attr) -> String {
    let Attr(id, classes, pairs) = attr;
    let mut open = String::from("<span");
    if !id.is_empty() {
        open.push_str(&format!(
            r#" id="{}""#,
            html_escape::encode_double_quoted_attribute(id)
        ));
    }
    if !classes.is_empty() {
        open.push_str(&format!(
            r#" class="{}""#,
            html_escape::encode_double_quoted_attribute(&classes.join(" "))
        ));
    }
    for (key, value) in pairs {
        open.push_str(&format!(
            r#" data-{}="{}""#,
            key,
            html_escape::encode_double_quoted_attribute(value)
        ));
    }
    open.push('>');
    open
}
