//! Pixel-width word-wrap renderer for plain-text stories.
//!
//! A story is a sequence of lines. Each line is run through the configured
//! substitutions, classified (ignored, end marker, empty, italic, lead tab),
//! wrapped greedily by measured width, and emitted between the tag literals
//! of one configuration section.
//!
//! ```
//! use story_markup::{HeuristicMeasurer, IniOptions, IniStore, StoryRenderer};
//!
//! let ini = "WrapAfterCharacters=40\n[Html]\nTagBreak=<br>\nTagSizeOpen=<span>\nTagSizeClose=</span>\n";
//! let store = IniStore::parse(ini, IniOptions::lenient()).unwrap();
//! let renderer = StoryRenderer::new(&store, HeuristicMeasurer::shared());
//! let markup = renderer.render(&["Once upon a time."], "Html");
//! assert!(markup.contains("<span>Once upon a time.</span><br>"));
//! ```

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

pub mod classify;
pub mod config;
pub mod ini;
pub mod markup;
pub mod measure;
pub mod metrics;
pub mod render;
pub mod segment;
pub mod wrap;

pub use classify::{classify_line, BodyLine, LineClass};
pub use config::{
    parse_bool, parse_int, GlobalDirectives, RenderConfig, ReplaceTable, SectionDirectives,
    REPLACE_SECTION,
};
pub use ini::{
    DuplicateKeyStrategy, DuplicateSectionStrategy, IniError, IniOptions, IniSection, IniStore,
    InvalidSectionStrategy,
};
pub use markup::{format_tag, MarkupAssembler, SectionTags, LINE_TERMINATOR};
pub use measure::{FontDescriptor, HeuristicMeasurer, TextMeasurer, PX_PER_EM};
pub use metrics::{FontMetrics, WidthReference};
pub use render::{render_lines, RenderInputs, RenderStats, StoryRenderer};
pub use segment::{consume_word, split_lines, SplitLines};
pub use wrap::WrapEngine;
