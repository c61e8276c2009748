//! Tag formatting and output framing.

use core::fmt::Write as _;

use crate::config::SectionDirectives;

/// Line terminator appended after break and font tags.
pub const LINE_TERMINATOR: &str = "\n";

/// Largest alignment or zero-pad width a format item may ask for.
const MAX_ITEM_WIDTH: u32 = 1_000_000;

/// Fill a tag template's `{0}` placeholders with `arg`.
///
/// An item is `{0[,align][:format]}`. A positive `align` right-aligns the
/// value in that many columns and a negative one left-aligns it. The `D<n>`
/// (or `d<n>`) format zero-pads integers to `n` digits; any other format
/// writes the value unchanged. `{{` and `}}` are literal braces. Brace text
/// that is not a valid item is copied as-is.
pub fn format_tag(template: &str, arg: impl core::fmt::Display) -> String {
    let mut out = String::with_capacity(template.len() + 8);
    let mut rest = template;
    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if let Some((item, after)) = split_item(tail) {
            item.write(&mut out, &arg);
            rest = after;
        } else {
            out.push_str(&tail[..1]);
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

/// A parsed `{0[,align][:format]}` item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FormatItem<'t> {
    align: i32,
    format: &'t str,
}

/// Split a leading format item off `tail`, which starts with `{`.
fn split_item(tail: &str) -> Option<(FormatItem<'_>, &str)> {
    let body_and_rest = tail.strip_prefix('{')?;
    let end = body_and_rest.find('}')?;
    let body = &body_and_rest[..end];
    if body.contains('{') {
        return None;
    }
    let (head, format) = body.split_once(':').unwrap_or((body, ""));
    let (index, align) = match head.split_once(',') {
        Some((index, align)) => (index, align.trim().parse::<i32>().ok()?),
        None => (head, 0),
    };
    if index.trim_end() != "0" || align.unsigned_abs() > MAX_ITEM_WIDTH {
        return None;
    }
    Some((FormatItem { align, format }, &body_and_rest[end + 1..]))
}

impl FormatItem<'_> {
    fn write(&self, out: &mut String, arg: &impl core::fmt::Display) {
        let text = arg.to_string();
        let text = zero_padded(&text, self.format).unwrap_or(text);
        let width = self.align.unsigned_abs() as usize;
        let _ = if self.align < 0 {
            write!(out, "{:<width$}", text)
        } else {
            write!(out, "{:>width$}", text)
        };
    }
}

/// Apply a `D<n>` format to an integer's text; `None` leaves it as written.
fn zero_padded(text: &str, format: &str) -> Option<String> {
    let digits = format.strip_prefix(['D', 'd'])?;
    let width: u32 = if digits.is_empty() { 0 } else { digits.parse().ok()? };
    if width > MAX_ITEM_WIDTH || text.parse::<i64>().is_err() {
        return None;
    }
    let (sign, magnitude) = match text.strip_prefix('-') {
        Some(magnitude) => ("-", magnitude),
        None => ("", text),
    };
    let width = width as usize;
    Some(format!("{sign}{magnitude:0>width$}"))
}

/// An open/close tag pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagPair<'a> {
    pub open: &'a str,
    pub close: &'a str,
}

/// Resolved tags of one section, formatted once per render call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionTags {
    pub paragraph_open: String,
    pub paragraph_close: String,
    pub lead_tab_open: String,
    pub lead_tab_close: String,
    /// `TagBreak` plus the line terminator.
    pub line_break: String,
}

impl SectionTags {
    pub fn new(directives: &SectionDirectives, paragraph_size: i32, lead_tab_size: i32) -> Self {
        Self {
            paragraph_open: format_tag(&directives.tag_size_open, paragraph_size),
            paragraph_close: directives.tag_size_close.clone(),
            lead_tab_open: format_tag(&directives.tag_size_open, lead_tab_size),
            lead_tab_close: directives.tag_size_close.clone(),
            line_break: format!("{}{}", directives.tag_break, LINE_TERMINATOR),
        }
    }
}

/// Accumulates the markup of one render call.
#[derive(Debug)]
pub struct MarkupAssembler<'d> {
    directives: &'d SectionDirectives,
    tags: SectionTags,
    out: String,
}

impl<'d> MarkupAssembler<'d> {
    /// Start output with the header and the font-open tag.
    pub fn begin(directives: &'d SectionDirectives, tags: SectionTags, font_family: &str) -> Self {
        let mut out = String::with_capacity(4096);
        if let Some(header) = directives.header.as_deref() {
            out.push_str(header);
        }
        out.push_str(&format_tag(&directives.tag_font_open, font_family));
        out.push_str(LINE_TERMINATOR);
        Self {
            directives,
            tags,
            out,
        }
    }

    /// Paragraph pair, or the italic pair for quoted lines.
    pub fn body_pair(&self, italic: bool) -> TagPair<'_> {
        if italic {
            TagPair {
                open: &self.directives.tag_italic_open,
                close: &self.directives.tag_italic_close,
            }
        } else {
            TagPair {
                open: &self.tags.paragraph_open,
                close: &self.tags.paragraph_close,
            }
        }
    }

    /// A blank line: a non-breaking space inside the paragraph pair.
    pub fn push_empty_line(&mut self) {
        self.out.push_str(&self.tags.paragraph_open);
        self.out.push_str(&self.directives.non_breakable_space);
        self.out.push_str(&self.tags.paragraph_close);
        self.out.push_str(&self.tags.line_break);
    }

    /// Lead-tab marker, rendered at the lead-tab size.
    pub fn push_lead_tab(&mut self) {
        self.out.push_str(&self.tags.lead_tab_open);
        self.out.push_str(&self.directives.lead_tab_val);
        self.out.push_str(&self.tags.lead_tab_close);
    }

    /// One logical line: sub-lines joined by breaks inside the active pair.
    pub fn push_sub_lines<S: AsRef<str>>(&mut self, italic: bool, sub_lines: &[S]) {
        let pair = self.body_pair(italic);
        let mut chunk = String::from(pair.open);
        let last = sub_lines.len().saturating_sub(1);
        for (idx, sub_line) in sub_lines.iter().enumerate() {
            push_expanding_tabs(&mut chunk, sub_line.as_ref(), &self.directives.tab_val);
            if idx == last {
                chunk.push_str(pair.close);
            }
            chunk.push_str(&self.tags.line_break);
        }
        if sub_lines.is_empty() {
            chunk.push_str(pair.close);
            chunk.push_str(&self.tags.line_break);
        }
        self.out.push_str(&chunk);
    }

    /// Close with the font tag and the footer.
    pub fn finish(mut self) -> String {
        self.out.push_str(&self.directives.tag_font_close);
        self.out.push_str(LINE_TERMINATOR);
        if let Some(footer) = self.directives.footer.as_deref() {
            self.out.push_str(footer);
        }
        self.out
    }
}

fn push_expanding_tabs(out: &mut String, text: &str, tab_val: &str) {
    let mut parts = text.split('\t');
    if let Some(first) = parts.next() {
        out.push_str(first);
    }
    for part in parts {
        out.push_str(tab_val);
        out.push_str(part);
    }
}
