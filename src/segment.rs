//! Word segmentation on whitespace boundaries.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScanState {
    /// Skipping whitespace before the word.
    Leading,
    /// Inside the word.
    Word,
    /// Inside the separator after the word.
    Separator,
}

/// Split off the next word.
///
/// Returns `(word, rest)` where `word` carries any leading whitespace, the
/// non-whitespace run and the separator that follows it, and `rest` starts
/// at the next word. `word + rest == line` always holds. When no further
/// word follows, `word` is the whole line and `rest` is empty.
pub fn consume_word(line: &str) -> (&str, &str) {
    let mut state = ScanState::Leading;
    for (idx, ch) in line.char_indices() {
        let ws = ch.is_whitespace();
        state = match (state, ws) {
            (ScanState::Leading, false) => ScanState::Word,
            (ScanState::Word, true) => ScanState::Separator,
            (ScanState::Separator, false) => return line.split_at(idx),
            (state, _) => state,
        };
    }
    (line, "")
}

/// Split text into lines ended by `\r\n`, `\n` or a lone `\r`.
///
/// A terminator at the very end does not start another line.
pub fn split_lines(text: &str) -> SplitLines<'_> {
    SplitLines { rest: text }
}

#[derive(Clone, Debug)]
pub struct SplitLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SplitLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }
        let Some(pos) = self.rest.find(['\r', '\n']) else {
            let line = self.rest;
            self.rest = "";
            return Some(line);
        };
        let line = &self.rest[..pos];
        let skip = if self.rest[pos..].starts_with("\r\n") { 2 } else { 1 };
        self.rest = &self.rest[pos + skip..];
        Some(line)
    }
}
