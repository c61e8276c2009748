//! Font-file text measurement for `story-markup`.
//!
//! [`FontdueMeasurer`] measures strings by summing the horizontal advances of
//! each glyph in a parsed TrueType/OpenType face. The face is loaded once; the
//! requested family name is ignored since a measurer wraps exactly one face.

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

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use fontdue::{Font, FontSettings};
use story_markup::{FontDescriptor, TextMeasurer};

/// Error loading a font face.
#[derive(Debug)]
pub enum FontLoadError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The bytes are not a face fontdue can parse.
    Parse(&'static str),
}

impl core::fmt::Display for FontLoadError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read font file {}: {}", path.display(), source)
            }
            Self::Parse(reason) => write!(f, "font parse error: {}", reason),
        }
    }
}

impl std::error::Error for FontLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(_) => None,
        }
    }
}

/// Glyph advance per (char, pixel size bits).
type AdvanceCache = HashMap<(char, u32), f32>;

/// Measures text with the advances of one font face.
pub struct FontdueMeasurer {
    font: Font,
    advances: Mutex<AdvanceCache>,
}

impl core::fmt::Debug for FontdueMeasurer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontdueMeasurer")
            .field("name", &self.font.name())
            .field("glyphs", &self.font.glyph_count())
            .field("cached", &self.cache().len())
            .finish()
    }
}

impl FontdueMeasurer {
    /// Parse a face from raw font bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontLoadError> {
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(FontLoadError::Parse)?;
        log::debug!(
            "loaded font face {:?} ({} glyphs)",
            font.name(),
            font.glyph_count()
        );
        Ok(Self {
            font,
            advances: Mutex::new(HashMap::new()),
        })
    }

    /// Read and parse a face from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FontLoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| FontLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Create a shared measurer trait object for renderer wiring.
    pub fn shared(self) -> Arc<dyn TextMeasurer> {
        Arc::new(self)
    }

    fn cache(&self) -> MutexGuard<'_, AdvanceCache> {
        // A poisoned cache only holds finished f32 values.
        match self.advances.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn advance(&self, cache: &mut AdvanceCache, ch: char, px: f32) -> f32 {
        *cache
            .entry((ch, px.to_bits()))
            .or_insert_with(|| self.font.metrics(ch, px).advance_width)
    }
}

impl TextMeasurer for FontdueMeasurer {
    fn measure_text_px(&self, text: &str, font: &FontDescriptor) -> f32 {
        let px = font.size_px();
        if text.is_empty() || px <= 0.0 {
            return 0.0;
        }
        let mut cache = self.cache();
        text.chars()
            .map(|ch| self.advance(&mut cache, ch, px))
            .sum()
    }
}
