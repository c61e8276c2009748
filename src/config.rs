//! Typed configuration reads and the resolved render surfaces.

use serde::Serialize;

use crate::ini::{IniSection, IniStore};

/// Name of the pseudo-section holding literal find/replace pairs.
pub const REPLACE_SECTION: &str = "replace";

pub const DEFAULT_WRAP_AFTER_CHARACTERS: u32 = 92;
pub const DEFAULT_PARAGRAPH_SIZE: i32 = 112;
pub const DEFAULT_LEAD_TAB_SIZE: i32 = 165;
pub const DEFAULT_LEAD_TAB_SPACES: usize = 3;
pub const DEFAULT_TAB_SPACES: usize = 3;
pub const DEFAULT_FONT_FAMILY: &str = "Verdana";

const BOOLEAN_TRUE: &[&str] = &["1", "true", "t", "yes", "y", "ja", "j"];
const BOOLEAN_FALSE: &[&str] = &["0", "false", "f", "no", "n", "nee"];

/// Parse an integer in invariant format: optional sign, surrounded by
/// ASCII whitespace only (tab through carriage return, and space).
pub fn parse_int(value: &str) -> Option<i32> {
    value
        .trim_matches(|c: char| matches!(c, '\t'..='\r' | ' '))
        .parse()
        .ok()
}

/// Parse one of the recognised boolean tokens, ignoring case.
pub fn parse_bool(value: &str) -> Option<bool> {
    if BOOLEAN_TRUE.iter().any(|t| t.eq_ignore_ascii_case(value)) {
        Some(true)
    } else if BOOLEAN_FALSE.iter().any(|t| t.eq_ignore_ascii_case(value)) {
        Some(false)
    } else {
        None
    }
}

impl IniSection {
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.get(key)
    }

    pub fn get_int(&self, key: &str) -> Option<i32> {
        let raw = self.get(key)?;
        let parsed = parse_int(raw);
        if parsed.is_none() {
            log::warn!("[{}] {}={:?} is not an integer", self.name(), key, raw);
        }
        parsed
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        let raw = self.get(key)?;
        let parsed = parse_bool(raw);
        if parsed.is_none() {
            log::warn!("[{}] {}={:?} is not a boolean", self.name(), key, raw);
        }
        parsed
    }
}

impl IniStore {
    /// String lookup; `section = None` is the global section.
    pub fn get_string(&self, section: Option<&str>, key: &str) -> Option<&str> {
        self.section(section)?.get_string(key)
    }

    pub fn get_int(&self, section: Option<&str>, key: &str) -> Option<i32> {
        self.section(section)?.get_int(key)
    }

    pub fn get_bool(&self, section: Option<&str>, key: &str) -> Option<bool> {
        self.section(section)?.get_bool(key)
    }

    /// Names of the sections whose `Render` directive is true, in source order.
    pub fn render_sections(&self) -> Vec<&str> {
        self.sections()
            .filter(|s| s.get_bool("Render").unwrap_or(false))
            .map(IniSection::name)
            .collect()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

fn count_or(value: Option<i32>, default: usize) -> usize {
    value.map_or(default, |v| usize::try_from(v).unwrap_or(0))
}

/// Session-wide render options read from the global section.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderConfig {
    /// Wrap threshold in `0` glyphs; zero disables wrapping.
    pub wrap_after_characters: u32,
    /// Paragraph font size in percent of the base size.
    pub paragraph_size: i32,
    /// Lead-tab font size in percent of the base size.
    pub lead_tab_size: i32,
    /// Spaces measured for one lead tab.
    pub lead_tab_spaces: usize,
    /// Spaces a body tab counts as when measuring.
    pub tab_spaces: usize,
    pub font_family: String,
    pub end_on: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wrap_after_characters: DEFAULT_WRAP_AFTER_CHARACTERS,
            paragraph_size: DEFAULT_PARAGRAPH_SIZE,
            lead_tab_size: DEFAULT_LEAD_TAB_SIZE,
            lead_tab_spaces: DEFAULT_LEAD_TAB_SPACES,
            tab_spaces: DEFAULT_TAB_SPACES,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            end_on: None,
        }
    }
}

impl RenderConfig {
    /// Resolve from the global section, falling back to defaults per option.
    pub fn from_store(store: &IniStore) -> Self {
        let Some(global) = store.section(None) else {
            return Self::default();
        };
        Self {
            wrap_after_characters: global
                .get_int("WrapAfterCharacters")
                .map_or(DEFAULT_WRAP_AFTER_CHARACTERS, |v| {
                    u32::try_from(v).unwrap_or(0)
                }),
            paragraph_size: global
                .get_int("ParagraphSize")
                .unwrap_or(DEFAULT_PARAGRAPH_SIZE),
            lead_tab_size: global
                .get_int("LeadTabSize")
                .unwrap_or(DEFAULT_LEAD_TAB_SIZE),
            lead_tab_spaces: count_or(global.get_int("LeadTabSpaces"), DEFAULT_LEAD_TAB_SPACES),
            tab_spaces: count_or(global.get_int("TabSpaces"), DEFAULT_TAB_SPACES),
            font_family: global
                .get_string("FontFamily")
                .unwrap_or(DEFAULT_FONT_FAMILY)
                .to_string(),
            end_on: global.get_string("EndOn").map(str::to_string),
        }
    }

    pub fn wrap_enabled(&self) -> bool {
        self.wrap_after_characters != 0
    }
}

/// Literal find/replace pairs, applied in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplaceTable {
    pairs: Vec<(String, String)>,
}

impl ReplaceTable {
    pub fn new<I, F, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (F, R)>,
        F: Into<String>,
        R: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(f, r)| (f.into(), r.into()))
                .filter(|(f, _)| !f.is_empty())
                .collect(),
        }
    }

    pub fn from_store(store: &IniStore) -> Self {
        store
            .section(Some(REPLACE_SECTION))
            .map(|s| Self::new(s.entries()))
            .unwrap_or_default()
    }

    /// Substitute every pair across the whole line.
    ///
    /// Later pairs see the output of earlier ones. Applying the table twice
    /// equals applying it once only when no replacement re-matches a pattern;
    /// keeping it that way is up to the configuration author.
    pub fn apply(&self, line: &str) -> String {
        let mut out = line.to_string();
        for (find, replace) in &self.pairs {
            if out.contains(find.as_str()) {
                out = out.replace(find.as_str(), replace);
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Classification prefixes and substitutions shared by every section.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalDirectives {
    pub italic_prefix: Option<String>,
    pub ignore_line_prefix: Option<String>,
    pub end_on_prefix: Option<String>,
    pub replace: ReplaceTable,
}

impl GlobalDirectives {
    pub fn from_store(store: &IniStore) -> Self {
        Self {
            italic_prefix: non_empty(store.get_string(None, "ItalicPrefix")),
            ignore_line_prefix: non_empty(store.get_string(None, "IgnoreLinePrefix")),
            end_on_prefix: non_empty(store.get_string(None, "EndOnPrefix")),
            replace: ReplaceTable::from_store(store),
        }
    }
}

/// Markup literals of one output variant. Missing directives are empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SectionDirectives {
    pub lead_tab_val: String,
    pub tab_val: String,
    pub non_breakable_space: String,
    pub tag_font_open: String,
    pub tag_font_close: String,
    pub tag_size_open: String,
    pub tag_size_close: String,
    pub tag_break: String,
    pub tag_italic_open: String,
    pub tag_italic_close: String,
    pub header: Option<String>,
    pub footer: Option<String>,
}

impl SectionDirectives {
    pub fn from_store(store: &IniStore, section: &str) -> Self {
        let Some(s) = store.section(Some(section)) else {
            log::debug!("section [{}] not found, using empty directives", section);
            return Self::default();
        };
        let get = |key: &str| s.get_string(key).unwrap_or_default().to_string();
        Self {
            lead_tab_val: get("LeadTabVal"),
            tab_val: get("TabVal"),
            non_breakable_space: get("NonBreakableSpace"),
            tag_font_open: get("TagFontOpen"),
            tag_font_close: get("TagFontClose"),
            tag_size_open: get("TagSizeOpen"),
            tag_size_close: get("TagSizeClose"),
            tag_break: get("TagBreak"),
            tag_italic_open: get("TagItalicOpen"),
            tag_italic_close: get("TagItalicClose"),
            header: non_empty(s.get_string("Header")),
            footer: non_empty(s.get_string("Footer")),
        }
    }
}
