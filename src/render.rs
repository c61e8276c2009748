//! Render sessions: one per configuration, one call per output section.

use std::sync::Arc;

use crate::classify::{classify_line, LineClass};
use crate::config::{GlobalDirectives, RenderConfig, SectionDirectives};
use crate::ini::IniStore;
use crate::markup::{MarkupAssembler, SectionTags};
use crate::measure::TextMeasurer;
use crate::metrics::FontMetrics;
use crate::wrap::WrapEngine;

/// Resolved inputs of a render call, independent of any configuration store.
#[derive(Clone, Debug)]
pub struct RenderInputs<'a> {
    pub cfg: &'a RenderConfig,
    pub globals: &'a GlobalDirectives,
    pub directives: &'a SectionDirectives,
    pub metrics: &'a FontMetrics,
}

/// Per-line counters of a render call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub lines_in: usize,
    pub ignored: usize,
    pub empty: usize,
    pub body: usize,
    pub sub_lines: usize,
    /// 0-based index of the line that stopped rendering, if any.
    pub ended_at: Option<usize>,
}

/// Render `lines` into one markup document.
///
/// Never fails: missing directives render as empty text.
pub fn render_lines<S: AsRef<str>>(
    inputs: &RenderInputs<'_>,
    lines: &[S],
) -> (String, RenderStats) {
    let tags = SectionTags::new(
        inputs.directives,
        inputs.cfg.paragraph_size,
        inputs.cfg.lead_tab_size,
    );
    let mut out = MarkupAssembler::begin(inputs.directives, tags, &inputs.cfg.font_family);
    let wrapper = WrapEngine::new(inputs.metrics);
    let mut stats = RenderStats {
        lines_in: lines.len(),
        ..RenderStats::default()
    };

    for (idx, line) in lines.iter().enumerate() {
        match classify_line(line.as_ref(), inputs.globals) {
            LineClass::Ignored => stats.ignored += 1,
            LineClass::EndOfInput => {
                log::info!("end prefix on line {}, skipping the rest", idx + 1);
                stats.ended_at = Some(idx);
                break;
            }
            LineClass::Empty => {
                stats.empty += 1;
                out.push_empty_line();
            }
            LineClass::Body(body) => {
                stats.body += 1;
                let mut leading_width = 0.0;
                if body.lead_tab {
                    out.push_lead_tab();
                    leading_width += inputs.metrics.lead_tab_width();
                }
                let sub_lines = wrapper.wrap(&body.text, leading_width);
                stats.sub_lines += sub_lines.len();
                out.push_sub_lines(body.italic, &sub_lines);
            }
        }
    }

    (out.finish(), stats)
}

/// Renderer bound to one configuration and one measurer.
///
/// Fonts and reference widths are measured once in [`StoryRenderer::new`]
/// and reused by every [`StoryRenderer::render`] call.
pub struct StoryRenderer<'a> {
    store: &'a IniStore,
    cfg: RenderConfig,
    globals: GlobalDirectives,
    metrics: FontMetrics,
}

impl core::fmt::Debug for StoryRenderer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StoryRenderer")
            .field("cfg", &self.cfg)
            .field("globals", &self.globals)
            .field("metrics", &self.metrics)
            .finish()
    }
}

impl<'a> StoryRenderer<'a> {
    pub fn new(store: &'a IniStore, measurer: Arc<dyn TextMeasurer>) -> Self {
        let cfg = RenderConfig::from_store(store);
        let globals = GlobalDirectives::from_store(store);
        let metrics = FontMetrics::new(&cfg, measurer);
        Self {
            store,
            cfg,
            globals,
            metrics,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.cfg
    }

    pub fn globals(&self) -> &GlobalDirectives {
        &self.globals
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Render `lines` with the directives of `section`.
    pub fn render<S: AsRef<str>>(&self, lines: &[S], section: &str) -> String {
        self.render_with_stats(lines, section).0
    }

    pub fn render_with_stats<S: AsRef<str>>(
        &self,
        lines: &[S],
        section: &str,
    ) -> (String, RenderStats) {
        let directives = SectionDirectives::from_store(self.store, section);
        let inputs = RenderInputs {
            cfg: &self.cfg,
            globals: &self.globals,
            directives: &directives,
            metrics: &self.metrics,
        };
        let (markup, stats) = render_lines(&inputs, lines);
        log::debug!("rendered section [{}]: {:?}", section, stats);
        (markup, stats)
    }
}
