//! Per-line substitution and classification.

use crate::config::GlobalDirectives;

const LEAD_TAB: char = '\t';

/// Fate of one input line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineClass {
    /// Matched `IgnoreLinePrefix`; produces nothing.
    Ignored,
    /// Matched `EndOnPrefix`; this and every later line produce nothing.
    EndOfInput,
    /// Empty after substitution.
    Empty,
    /// Text to emit, possibly wrapped.
    Body(BodyLine),
}

/// A line that reaches emission, with recognised prefixes stripped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyLine {
    /// Matched `ItalicPrefix`; use the italic tag pair.
    pub italic: bool,
    /// Started with a tab; one tab was stripped.
    pub lead_tab: bool,
    pub text: String,
}

/// Apply substitutions, then evaluate the rules top to bottom.
pub fn classify_line(original: &str, globals: &GlobalDirectives) -> LineClass {
    let line = globals.replace.apply(original);

    if starts_with_prefix(&line, globals.ignore_line_prefix.as_deref()) {
        return LineClass::Ignored;
    }
    if starts_with_prefix(&line, globals.end_on_prefix.as_deref()) {
        return LineClass::EndOfInput;
    }
    if line.is_empty() {
        return LineClass::Empty;
    }

    let mut text = line.as_str();
    let mut italic = false;
    if let Some(prefix) = globals.italic_prefix.as_deref().filter(|p| !p.is_empty()) {
        if let Some(stripped) = text.strip_prefix(prefix) {
            italic = true;
            text = stripped;
        }
    }

    // Only one tab is lead markup; any further tabs are body text.
    let lead_tab = match text.strip_prefix(LEAD_TAB) {
        Some(stripped) => {
            text = stripped;
            true
        }
        None => false,
    };

    LineClass::Body(BodyLine {
        italic,
        lead_tab,
        text: text.to_string(),
    })
}

fn starts_with_prefix(line: &str, prefix: Option<&str>) -> bool {
    prefix.is_some_and(|p| !p.is_empty() && line.starts_with(p))
}
