//! Text measurement surface.

use std::sync::Arc;

use serde::Serialize;

/// Pixels per em used to turn font descriptors into pixel sizes.
pub const PX_PER_EM: f32 = 16.0;

/// Font family plus size in em.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FontDescriptor {
    pub family: String,
    pub size_em: f32,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size_em: f32) -> Self {
        Self {
            family: family.into(),
            size_em,
        }
    }

    /// Descriptor for a configured size in percent.
    ///
    /// The page's base font is 10pt, which is 0.8em; `size` scales that.
    pub fn from_size(family: impl Into<String>, size: i32) -> Self {
        Self::new(family, 0.8 * (size as f32 / 100.0))
    }

    pub fn size_px(&self) -> f32 {
        self.size_em * PX_PER_EM
    }
}

/// Rendered-width oracle for the wrap engine.
///
/// Implementations must count trailing whitespace: `"a "` measures wider
/// than `"a"`.
pub trait TextMeasurer: Send + Sync {
    /// Measure rendered text width for the provided font.
    fn measure_text_px(&self, text: &str, font: &FontDescriptor) -> f32;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for Arc<T> {
    fn measure_text_px(&self, text: &str, font: &FontDescriptor) -> f32 {
        (**self).measure_text_px(text, font)
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure_text_px(&self, text: &str, font: &FontDescriptor) -> f32 {
        (**self).measure_text_px(text, font)
    }
}

/// Glyph-class width model that needs no font files.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicMeasurer;

impl HeuristicMeasurer {
    pub fn shared() -> Arc<dyn TextMeasurer> {
        Arc::new(Self)
    }
}

impl TextMeasurer for HeuristicMeasurer {
    fn measure_text_px(&self, text: &str, font: &FontDescriptor) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let family = font.family.to_ascii_lowercase();
        let monospace = is_monospace_family(&family);
        let em_sum: f32 = if monospace {
            text.chars().map(|ch| if ch == '\t' { 2.4 } else { 0.6 }).sum()
        } else {
            text.chars().map(proportional_glyph_em_width).sum()
        };

        // Wide humanist faces run noticeably larger than the class table.
        let family_scale = if family.contains("verdana") || family.contains("tahoma") {
            1.10
        } else if family.contains("serif") && !family.contains("sans") {
            1.03
        } else {
            1.00
        };
        (em_sum * font.size_px() * family_scale).max(0.0)
    }
}

fn is_monospace_family(family: &str) -> bool {
    ["mono", "courier", "consol", "fixed"]
        .iter()
        .any(|needle| family.contains(needle))
}

fn proportional_glyph_em_width(ch: char) -> f32 {
    match ch {
        ' ' | '\u{00A0}' => 0.32,
        '\t' => 1.28,
        'i' | 'l' | 'I' | '|' | '!' => 0.24,
        '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
        '-' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => 0.34,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
        'f' | 't' | 'j' | 'r' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
        c if c.is_ascii_digit() => 0.52,
        c if c.is_ascii_uppercase() => 0.64,
        c if c.is_ascii_lowercase() => 0.52,
        c if c.is_whitespace() => 0.32,
        c if c.is_ascii_punctuation() => 0.42,
        _ => 0.56,
    }
}
