//! Line-oriented INI store with ordered, case-insensitive sections.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::segment::split_lines;

const LINE_COMMENT: char = ';';
const SECTION_START: char = '[';
const SECTION_END: char = ']';
const VALUE_SPLIT: char = '=';

/// What to do with a `[section` header that is missing its closing bracket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvalidSectionStrategy {
    /// Fail the parse.
    #[default]
    Reject,
    /// Drop the keys that follow until the next valid header.
    Ignore,
    /// Keep adding keys to the section that was active before the bad header.
    Merge,
}

/// What to do when a section header repeats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateSectionStrategy {
    /// Fail the parse.
    #[default]
    Reject,
    /// Drop the keys of the repeated section.
    Ignore,
    /// Add the keys to the existing section.
    Merge,
    /// Discard the existing keys and start over in place.
    Replace,
}

/// What to do when a key repeats inside one section.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateKeyStrategy {
    /// Fail the parse.
    #[default]
    Reject,
    /// Keep the first value.
    Ignore,
    /// Keep the last value.
    Replace,
}

/// Parser policy surface.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IniOptions {
    pub invalid_section: InvalidSectionStrategy,
    pub duplicate_section: DuplicateSectionStrategy,
    pub duplicate_key: DuplicateKeyStrategy,
}

impl IniOptions {
    /// Merge bad and repeated sections, last key wins.
    pub fn lenient() -> Self {
        Self {
            invalid_section: InvalidSectionStrategy::Merge,
            duplicate_section: DuplicateSectionStrategy::Merge,
            duplicate_key: DuplicateKeyStrategy::Replace,
        }
    }
}

/// INI parse or load error.
#[derive(Debug)]
pub enum IniError {
    /// Reading the file failed.
    Io { path: PathBuf, source: io::Error },
    /// A `[` header without a closing `]` under [`InvalidSectionStrategy::Reject`].
    InvalidSection { path: Option<PathBuf>, line: usize },
    /// A repeated header under [`DuplicateSectionStrategy::Reject`].
    DuplicateSection {
        path: Option<PathBuf>,
        line: usize,
        name: String,
    },
    /// A repeated key under [`DuplicateKeyStrategy::Reject`].
    DuplicateKey {
        path: Option<PathBuf>,
        line: usize,
        key: String,
    },
}

impl IniError {
    fn with_path(mut self, file: &Path) -> Self {
        match &mut self {
            Self::Io { .. } => {}
            Self::InvalidSection { path, .. }
            | Self::DuplicateSection { path, .. }
            | Self::DuplicateKey { path, .. } => *path = Some(file.to_path_buf()),
        }
        self
    }

    /// 1-based line number of the offending line, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Io { .. } => None,
            Self::InvalidSection { line, .. }
            | Self::DuplicateSection { line, .. }
            | Self::DuplicateKey { line, .. } => Some(*line),
        }
    }
}

fn write_location(f: &mut fmt::Formatter<'_>, path: Option<&PathBuf>, line: usize) -> fmt::Result {
    match path {
        Some(path) => write!(f, "[{}:{}]", path.display(), line),
        None => write!(f, "[line {}]", line),
    }
}

impl fmt::Display for IniError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read {}: {}", path.display(), source)
            }
            Self::InvalidSection { path, line } => {
                write_location(f, path.as_ref(), *line)?;
                write!(f, " invalid section specification")
            }
            Self::DuplicateSection { path, line, name } => {
                write_location(f, path.as_ref(), *line)?;
                write!(f, " duplicate section specification: [{}]", name)
            }
            Self::DuplicateKey { path, line, key } => {
                write_location(f, path.as_ref(), *line)?;
                write!(f, " duplicate key specification: {}", key)
            }
        }
    }
}

impl std::error::Error for IniError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Case-insensitive name comparison used for sections and keys.
pub(crate) fn names_match(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// One named section; keys keep their first-seen order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IniSection {
    name: String,
    entries: Vec<(String, String)>,
}

impl IniSection {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Section name as written in the header; empty for the global section.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| names_match(k, key))
            .map(|(_, v)| v.as_str())
    }

    /// Key/value pairs in source order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| names_match(k, key))
    }
}

/// Parsed configuration: the global section followed by named sections.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IniStore {
    sections: Vec<IniSection>,
}

impl Default for IniStore {
    fn default() -> Self {
        Self {
            sections: vec![IniSection::new(String::new())],
        }
    }
}

/// Where keys of the line being parsed go.
#[derive(Clone, Copy)]
enum Target {
    Stored(usize),
    Discard,
}

impl IniStore {
    /// Parse INI text.
    pub fn parse(text: &str, options: IniOptions) -> Result<Self, IniError> {
        let mut store = Self::default();
        let mut target = Target::Stored(0);

        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        for (idx, original) in split_lines(text).enumerate() {
            let line_no = idx + 1;
            let line = original.trim_start();
            if line.is_empty() || line.starts_with(LINE_COMMENT) {
                continue;
            }

            if line.starts_with(SECTION_START) {
                target = store.open_section(line.trim_end(), line_no, target, options)?;
                continue;
            }

            let (key, value) = line.split_once(VALUE_SPLIT).unwrap_or((line, ""));
            let Target::Stored(section_idx) = target else {
                continue;
            };
            let section = &mut store.sections[section_idx];
            match section.position(key) {
                None => section.entries.push((key.to_string(), value.to_string())),
                Some(existing) => match options.duplicate_key {
                    DuplicateKeyStrategy::Reject => {
                        return Err(IniError::DuplicateKey {
                            path: None,
                            line: line_no,
                            key: key.to_string(),
                        });
                    }
                    DuplicateKeyStrategy::Ignore => {
                        log::warn!("ini line {}: ignoring duplicate key {:?}", line_no, key);
                    }
                    DuplicateKeyStrategy::Replace => {
                        section.entries[existing].1 = value.to_string();
                    }
                },
            }
        }

        Ok(store)
    }

    /// Read and parse an INI file.
    pub fn load(path: impl AsRef<Path>, options: IniOptions) -> Result<Self, IniError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| IniError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&bytes);
        Self::parse(&text, options).map_err(|err| err.with_path(path))
    }

    fn open_section(
        &mut self,
        header: &str,
        line_no: usize,
        current: Target,
        options: IniOptions,
    ) -> Result<Target, IniError> {
        let Some(name) = header
            .strip_prefix(SECTION_START)
            .and_then(|rest| rest.strip_suffix(SECTION_END))
        else {
            return match options.invalid_section {
                InvalidSectionStrategy::Reject => Err(IniError::InvalidSection {
                    path: None,
                    line: line_no,
                }),
                InvalidSectionStrategy::Ignore => {
                    log::warn!("ini line {}: dropping keys of invalid section", line_no);
                    Ok(Target::Discard)
                }
                InvalidSectionStrategy::Merge => {
                    log::warn!("ini line {}: skipping invalid section header", line_no);
                    Ok(current)
                }
            };
        };

        let Some(existing) = self.position(name) else {
            self.sections.push(IniSection::new(name));
            return Ok(Target::Stored(self.sections.len() - 1));
        };

        match options.duplicate_section {
            DuplicateSectionStrategy::Reject => Err(IniError::DuplicateSection {
                path: None,
                line: line_no,
                name: name.to_string(),
            }),
            DuplicateSectionStrategy::Ignore => {
                log::warn!("ini line {}: dropping duplicate section [{}]", line_no, name);
                Ok(Target::Discard)
            }
            DuplicateSectionStrategy::Merge => Ok(Target::Stored(existing)),
            DuplicateSectionStrategy::Replace => {
                self.sections[existing].entries.clear();
                Ok(Target::Stored(existing))
            }
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| names_match(&s.name, name))
    }

    /// Look up a section; `None` or `""` is the global section.
    pub fn section(&self, name: Option<&str>) -> Option<&IniSection> {
        self.position(name.unwrap_or_default())
            .map(|idx| &self.sections[idx])
    }

    pub fn exists(&self, name: Option<&str>) -> bool {
        self.section(name).is_some()
    }

    /// Raw value lookup; missing section or key yields `None`.
    pub fn get(&self, section: Option<&str>, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    /// All sections in source order, the global section first.
    pub fn sections(&self) -> impl Iterator<Item = &IniSection> {
        self.sections.iter()
    }
}
