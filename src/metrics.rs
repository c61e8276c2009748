//! Session-scoped fonts and reference widths.

use std::sync::Arc;

use serde::Serialize;

use crate::config::RenderConfig;
use crate::measure::{FontDescriptor, TextMeasurer};

/// Pre-measured widths every line is compared against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct WidthReference {
    /// Width of `wrap_after_characters` zeros; zero disables wrapping.
    pub wrap_after_width: f32,
    /// Width of `lead_tab_spaces` spaces in the lead-tab font.
    pub lead_tab_width: f32,
}

/// Fonts, tab expansion and reference widths, computed once per session.
#[derive(Clone)]
pub struct FontMetrics {
    measurer: Arc<dyn TextMeasurer>,
    paragraph_font: FontDescriptor,
    lead_tab_font: FontDescriptor,
    tab_width_val: String,
    wrap_enabled: bool,
    widths: WidthReference,
}

impl core::fmt::Debug for FontMetrics {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FontMetrics")
            .field("paragraph_font", &self.paragraph_font)
            .field("lead_tab_font", &self.lead_tab_font)
            .field("tab_spaces", &self.tab_width_val.len())
            .field("wrap_enabled", &self.wrap_enabled)
            .field("widths", &self.widths)
            .finish()
    }
}

impl FontMetrics {
    pub fn new(cfg: &RenderConfig, measurer: Arc<dyn TextMeasurer>) -> Self {
        let family = cfg.font_family.as_str();
        let paragraph_font = FontDescriptor::from_size(family, cfg.paragraph_size);
        let lead_tab_font = FontDescriptor::from_size(family, cfg.lead_tab_size);
        let mut metrics = Self {
            measurer,
            paragraph_font,
            lead_tab_font,
            tab_width_val: " ".repeat(cfg.tab_spaces),
            wrap_enabled: cfg.wrap_enabled(),
            widths: WidthReference::default(),
        };

        let lead_tab_width = metrics
            .measurer
            .measure_text_px(&" ".repeat(cfg.lead_tab_spaces), &metrics.lead_tab_font);
        // Measure the zeros directly rather than multiplying one glyph: the
        // measurer may pad each call.
        let wrap_after_width = if cfg.wrap_enabled() {
            metrics.measure_paragraph(&"0".repeat(cfg.wrap_after_characters as usize))
        } else {
            0.0
        };
        metrics.widths = WidthReference {
            wrap_after_width,
            lead_tab_width,
        };

        log::debug!(
            "font metrics: paragraph={:?} lead_tab={:?} widths={:?}",
            metrics.paragraph_font,
            metrics.lead_tab_font,
            metrics.widths
        );
        metrics
    }

    /// Paragraph-font width with tabs counted as `tab_spaces` spaces.
    pub fn measure_paragraph(&self, text: &str) -> f32 {
        if text.contains('\t') {
            let expanded = text.replace('\t', &self.tab_width_val);
            self.measurer.measure_text_px(&expanded, &self.paragraph_font)
        } else {
            self.measurer.measure_text_px(text, &self.paragraph_font)
        }
    }

    /// False when `wrap_after_characters` is zero.
    pub fn wrap_enabled(&self) -> bool {
        self.wrap_enabled
    }

    pub fn widths(&self) -> WidthReference {
        self.widths
    }

    pub fn wrap_after_width(&self) -> f32 {
        self.widths.wrap_after_width
    }

    pub fn lead_tab_width(&self) -> f32 {
        self.widths.lead_tab_width
    }

    pub fn paragraph_font(&self) -> &FontDescriptor {
        &self.paragraph_font
    }
}
