//! Greedy word-wrap against measured widths.

use crate::metrics::FontMetrics;
use crate::segment::consume_word;

/// Wraps body text into sub-lines no wider than the reference width.
#[derive(Clone, Copy, Debug)]
pub struct WrapEngine<'a> {
    metrics: &'a FontMetrics,
}

impl<'a> WrapEngine<'a> {
    pub fn new(metrics: &'a FontMetrics) -> Self {
        Self { metrics }
    }

    /// Split `text` into sub-lines.
    ///
    /// `leading_width` is space already taken on the first sub-line (a lead
    /// tab); it is dropped after the first flush. Sub-lines are right-trimmed
    /// and keep their raw tabs. The first word of a sub-line is always
    /// accepted, so an over-long word sits alone instead of being split.
    /// With wrapping disabled the text comes back verbatim as one sub-line.
    pub fn wrap(&self, text: &str, leading_width: f32) -> Vec<String> {
        if !self.metrics.wrap_enabled() {
            return vec![text.to_string()];
        }
        let limit = self.metrics.wrap_after_width();

        let mut out = Vec::new();
        let mut leading_width = leading_width;
        let mut candidate = String::with_capacity(text.len());
        let mut previous = String::new();
        let mut first_word = true;
        let mut remaining = text;

        while !remaining.is_empty() {
            let (word, rest) = consume_word(remaining);
            remaining = rest;
            candidate.push_str(word);
            let current = candidate.trim_end();

            if first_word {
                previous = current.to_string();
                first_word = false;
                continue;
            }

            let width = leading_width + self.metrics.measure_paragraph(current);
            if width <= limit {
                previous = current.to_string();
                continue;
            }

            log::trace!("wrap flush at {:.2}px > {:.2}px: {:?}", width, limit, previous);
            out.push(core::mem::take(&mut previous));
            candidate.clear();
            candidate.push_str(word);
            previous = candidate.trim_end().to_string();
            leading_width = 0.0;
        }

        out.push(previous);
        out
    }
}
