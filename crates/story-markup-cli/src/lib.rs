//! Host shell around the `story-markup` renderer.
//!
//! Validates the manuscript, finds and loads `StoryFormatter.ini`, renders
//! every section flagged with `Render`, and writes one file per section next
//! to the story: `<dir>/<story stem>.<section>`.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use story_markup::{
    split_lines, HeuristicMeasurer, IniError, IniOptions, IniStore, RenderConfig, RenderStats,
    StoryRenderer, TextMeasurer, WidthReference,
};
use story_markup_fontdue::{FontLoadError, FontdueMeasurer};

/// Configuration file looked up next to the story and in its ancestors.
pub const CONFIG_FILE_NAME: &str = "StoryFormatter.ini";
/// Largest story accepted, in bytes.
pub const MAX_STORY_BYTES: u64 = 250 * 1024;
/// Largest story accepted, in lines.
pub const MAX_STORY_LINES: usize = 10_000;

/// Errors surfaced by the host shell.
#[derive(Debug)]
pub enum ShellError {
    MissingStoryPath,
    StoryNotFound(PathBuf),
    /// Expected configuration file; when searched, the one beside the story.
    ConfigNotFound(PathBuf),
    StoryTooLarge {
        path: PathBuf,
        bytes: u64,
        limit: u64,
    },
    TooManyLines {
        path: PathBuf,
        lines: usize,
        limit: usize,
    },
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    Config(IniError),
    Font(FontLoadError),
    Json(serde_json::Error),
}

impl core::fmt::Display for ShellError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingStoryPath => write!(f, "please specify a story file to process"),
            Self::StoryNotFound(path) => write!(f, "story file not found: {}", path.display()),
            Self::ConfigNotFound(path) => write!(f, "config file not found: {}", path.display()),
            Self::StoryTooLarge { path, bytes, limit } => write!(
                f,
                "story file too large: {} (bytes={} limit={})",
                path.display(),
                bytes,
                limit
            ),
            Self::TooManyLines { path, lines, limit } => write!(
                f,
                "story has too many lines: {} (lines={} limit={})",
                path.display(),
                lines,
                limit
            ),
            Self::Read { path, source } => write!(f, "cannot read {}: {}", path.display(), source),
            Self::Write { path, source } => {
                write!(f, "cannot write {}: {}", path.display(), source)
            }
            Self::Config(err) => write!(f, "config error: {}", err),
            Self::Font(err) => write!(f, "{}", err),
            Self::Json(err) => write!(f, "json error: {}", err),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Config(err) => Some(err),
            Self::Font(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<IniError> for ShellError {
    fn from(err: IniError) -> Self {
        Self::Config(err)
    }
}

impl From<FontLoadError> for ShellError {
    fn from(err: FontLoadError) -> Self {
        Self::Font(err)
    }
}

impl From<serde_json::Error> for ShellError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// What to render and where.
#[derive(Clone, Debug, Default)]
pub struct ShellOptions {
    pub story: PathBuf,
    /// Explicit configuration file; otherwise searched upward from the story.
    pub config: Option<PathBuf>,
    /// Font file for measurement; otherwise the heuristic measurer.
    pub font_file: Option<PathBuf>,
    /// Restrict rendering to these sections (matched case-insensitively).
    pub sections: Vec<String>,
    /// Keep the output in memory instead of writing files.
    pub dry_run: bool,
}

/// Join command-line words into one story path.
///
/// Paths with spaces arrive split when the caller forgets to quote them.
/// The joined path is kept verbatim, surrounding spaces included.
pub fn story_path_from_words<S: AsRef<str>>(words: &[S]) -> Result<PathBuf, ShellError> {
    let joined = words
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        return Err(ShellError::MissingStoryPath);
    }
    Ok(PathBuf::from(joined))
}

/// Find [`CONFIG_FILE_NAME`] in `start` or the nearest ancestor holding one.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Directory holding `story`; `.` for a bare file name.
fn story_dir(story: &Path) -> &Path {
    match story.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// `<dir>/<story stem>.<section>`.
pub fn output_path(story: &Path, section: &str) -> PathBuf {
    let stem = story
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    story_dir(story).join(format!("{}.{}", stem, section))
}

/// Read a story as lines ended by `\r\n`, `\n` or a lone `\r`.
pub fn read_story_lines(path: &Path) -> Result<Vec<String>, ShellError> {
    let bytes = std::fs::read(path).map_err(|source| ShellError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = String::from_utf8_lossy(&bytes);
    let text: &str = &decoded;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<String> = split_lines(text).map(str::to_string).collect();
    if lines.len() > MAX_STORY_LINES {
        return Err(ShellError::TooManyLines {
            path: path.to_path_buf(),
            lines: lines.len(),
            limit: MAX_STORY_LINES,
        });
    }
    Ok(lines)
}

/// A validated story with its configuration.
#[derive(Debug)]
pub struct Manuscript {
    pub story: PathBuf,
    pub config_path: PathBuf,
    pub store: IniStore,
    pub lines: Vec<String>,
}

impl Manuscript {
    /// Validate the story and load its configuration.
    pub fn open(opts: &ShellOptions) -> Result<Self, ShellError> {
        let story = opts.story.clone();
        if story.as_os_str().is_empty() {
            return Err(ShellError::MissingStoryPath);
        }
        if !story.is_file() {
            return Err(ShellError::StoryNotFound(story));
        }

        let config_path = match &opts.config {
            Some(path) if path.is_file() => path.clone(),
            Some(path) => return Err(ShellError::ConfigNotFound(path.clone())),
            None => {
                let dir = story_dir(&story);
                // Absolute, so a relative story path still searches past `.`.
                let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
                find_config(&start)
                    .ok_or_else(|| ShellError::ConfigNotFound(dir.join(CONFIG_FILE_NAME)))?
            }
        };

        let bytes = std::fs::metadata(&story)
            .map_err(|source| ShellError::Read {
                path: story.clone(),
                source,
            })?
            .len();
        if bytes > MAX_STORY_BYTES {
            return Err(ShellError::StoryTooLarge {
                path: story,
                bytes,
                limit: MAX_STORY_BYTES,
            });
        }

        let lines = read_story_lines(&story)?;
        let store = IniStore::load(&config_path, IniOptions::lenient())?;
        log::debug!(
            "opened {} ({} lines) with {}",
            story.display(),
            lines.len(),
            config_path.display()
        );
        Ok(Self {
            story,
            config_path,
            store,
            lines,
        })
    }

    /// Sections to render: `Render` is true and, when `only` is non-empty,
    /// the name is listed there.
    pub fn selected_sections<S: AsRef<str>>(&self, only: &[S]) -> Vec<&str> {
        let flagged = self.store.render_sections();
        if only.is_empty() {
            return flagged;
        }
        for wanted in only {
            let wanted = wanted.as_ref();
            if !flagged.iter().any(|name| same_name(name, wanted)) {
                log::warn!("section [{}] is missing or not flagged Render", wanted);
            }
        }
        flagged
            .into_iter()
            .filter(|name| only.iter().any(|w| same_name(name, w.as_ref())))
            .collect()
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Pick the measurement backend for `opts`.
pub fn measurer_for(opts: &ShellOptions) -> Result<Arc<dyn TextMeasurer>, ShellError> {
    match &opts.font_file {
        Some(path) => Ok(FontdueMeasurer::from_file(path)?.shared()),
        None => Ok(HeuristicMeasurer::shared()),
    }
}

/// Markup of one rendered section.
#[derive(Clone, Debug)]
pub struct RenderedSection {
    pub section: String,
    pub output: PathBuf,
    pub markup: String,
    pub stats: RenderStats,
}

/// Render every selected section with one shared session.
pub fn render_sections<S: AsRef<str>>(
    manuscript: &Manuscript,
    measurer: Arc<dyn TextMeasurer>,
    only: &[S],
) -> Vec<RenderedSection> {
    let renderer = StoryRenderer::new(&manuscript.store, measurer);
    manuscript
        .selected_sections(only)
        .into_iter()
        .map(|section| {
            let (markup, stats) = renderer.render_with_stats(&manuscript.lines, section);
            RenderedSection {
                section: section.to_string(),
                output: output_path(&manuscript.story, section),
                markup,
                stats,
            }
        })
        .collect()
}

/// Write each section to its output path.
pub fn write_sections(sections: &[RenderedSection]) -> Result<(), ShellError> {
    for rendered in sections {
        std::fs::write(&rendered.output, &rendered.markup).map_err(|source| {
            ShellError::Write {
                path: rendered.output.clone(),
                source,
            }
        })?;
        log::info!(
            "wrote [{}] to {}",
            rendered.section,
            rendered.output.display()
        );
    }
    Ok(())
}

/// Open, render and (unless `dry_run`) write.
pub fn run(opts: &ShellOptions) -> Result<Vec<RenderedSection>, ShellError> {
    let manuscript = Manuscript::open(opts)?;
    let measurer = measurer_for(opts)?;
    let rendered = render_sections(&manuscript, measurer, &opts.sections);
    if rendered.is_empty() {
        log::warn!(
            "no section in {} has Render enabled",
            manuscript.config_path.display()
        );
    }
    if !opts.dry_run {
        write_sections(&rendered)?;
    }
    Ok(rendered)
}

/// Resolved configuration, as printed by `--print-config`.
#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub config_path: PathBuf,
    pub render: RenderConfig,
    pub widths: WidthReference,
    pub sections: Vec<String>,
}

impl ConfigReport {
    pub fn build(opts: &ShellOptions) -> Result<Self, ShellError> {
        let manuscript = Manuscript::open(opts)?;
        let measurer = measurer_for(opts)?;
        let renderer = StoryRenderer::new(&manuscript.store, measurer);
        Ok(Self {
            config_path: manuscript.config_path.clone(),
            render: renderer.config().clone(),
            widths: renderer.metrics().widths(),
            sections: manuscript
                .selected_sections(&opts.sections)
                .into_iter()
                .map(str::to_string)
                .collect(),
        })
    }

    pub fn to_json(&self) -> Result<String, ShellError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
