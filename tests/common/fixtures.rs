use std::sync::Arc;

use story_markup::{FontDescriptor, IniOptions, IniStore, TextMeasurer};

/// Two render sections, one disabled, global prefixes and a replace table.
pub const SAMPLE_INI: &str = "\
; sample configuration
WrapAfterCharacters=20
ParagraphSize=100
LeadTabSize=150
LeadTabSpaces=2
TabSpaces=4
FontFamily=Georgia
ItalicPrefix=>
IgnoreLinePrefix=#
EndOnPrefix=THE END

[replace]
--=&mdash;
...=&hellip;

[Html]
Render=yes
Header=<html><body>
Footer=</body></html>
TagFontOpen=<div style=\"font-family:{0}\">
TagFontClose=</div>
TagSizeOpen=<span style=\"font-size:{0}%\">
TagSizeClose=</span>
TagBreak=<br/>
TagItalicOpen=<em>
TagItalicClose=</em>
NonBreakableSpace=&nbsp;
LeadTabVal=&emsp;
TabVal=&ensp;

[BBCode]
Render=true
TagFontOpen=[font={0}]
TagFontClose=[/font]
TagSizeOpen=[size={0}]
TagSizeClose=[/size]
TagBreak=
TagItalicOpen=[i]
TagItalicClose=[/i]
NonBreakableSpace=_
LeadTabVal=~~

[Draft]
Render=no
TagBreak=<br>
";

pub const SAMPLE_STORY: &[&str] = &[
    "# title card, not rendered",
    "\tIt was a dark and stormy night -- the rain fell.",
    "",
    ">Quiet... please",
    "Short line.",
    "THE END",
    "Never rendered.",
];

pub const SAMPLE_HTML: &str = "<html><body><div style=\"font-family:Georgia\">\n\
<span style=\"font-size:150%\">&emsp;</span><span style=\"font-size:100%\">It was a dark and<br/>\n\
stormy night &mdash;<br/>\n\
the rain fell.</span><br/>\n\
<span style=\"font-size:100%\">&nbsp;</span><br/>\n\
<em>Quiet&hellip; please</em><br/>\n\
<span style=\"font-size:100%\">Short line.</span><br/>\n\
</div>\n\
</body></html>";

pub const SAMPLE_BBCODE: &str = "[font=Georgia]\n\
[size=150]~~[/size][size=100]It was a dark and\n\
stormy night &mdash;\n\
the rain fell.[/size]\n\
[size=100]_[/size]\n\
[i]Quiet&hellip; please[/i]\n\
[size=100]Short line.[/size]\n\
[/font]\n";

/// One pixel per char at every size: widths equal char counts.
pub struct CharCount;

impl TextMeasurer for CharCount {
    fn measure_text_px(&self, text: &str, _font: &FontDescriptor) -> f32 {
        text.chars().count() as f32
    }
}

pub fn char_count() -> Arc<dyn TextMeasurer> {
    Arc::new(CharCount)
}

pub fn sample_store() -> IniStore {
    IniStore::parse(SAMPLE_INI, IniOptions::lenient()).expect("sample ini parses")
}

/// Store with the given global keys ahead of one `[Test]` section.
pub fn store_with(globals: &str, section: &str) -> IniStore {
    let text = format!("{}\n[Test]\nRender=yes\n{}\n", globals, section);
    IniStore::parse(&text, IniOptions::lenient()).expect("test ini parses")
}

/// Deterministic multi-paragraph manuscript of `lines` lines.
pub fn long_story(lines: usize) -> Vec<String> {
    const WORDS: &[&str] = &[
        "the", "lantern", "swung", "over", "a", "harbour", "quiet", "as", "slate", "while",
        "gulls", "argued", "about", "nothing", "--", "until", "morning...",
    ];
    (0..lines)
        .map(|idx| match idx % 9 {
            0 => String::new(),
            4 => format!("\t{}", sentence(WORDS, idx, 14)),
            7 => format!(">{}", sentence(WORDS, idx, 6)),
            _ => sentence(WORDS, idx, 10 + idx % 13),
        })
        .collect()
}

fn sentence(words: &[&str], seed: usize, count: usize) -> String {
    (0..count)
        .map(|i| words[(seed * 7 + i * 3) % words.len()])
        .collect::<Vec<_>>()
        .join(" ")
}
