//! Message line editor.
//!
//! Single-line input with a grapheme-based cursor. Rendering lives in
//! [`super::render`]; this is state only.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// State of the message input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    /// Current text value
    pub value: String,
    /// Cursor position (in graphemes)
    pub cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) fn with_value(mut self, value: impl Into<String>) -> Self {
        let v = value.into();
        self.cursor = v.graphemes(true).count();
        self.value = v;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, c: char) {
        let byte_offset = self.grapheme_to_byte_offset(self.cursor);
        self.value.insert(byte_offset, c);
        // A combining mark merges into the previous grapheme.
        self.cursor = self.value[..byte_offset + c.len_utf8()].graphemes(true).count();
    }

    /// Insert pasted text at the cursor. Line breaks become spaces.
    pub fn insert_str(&mut self, text: &str) {
        let text = text.replace(['\r', '\n'], " ");
        let byte_offset = self.grapheme_to_byte_offset(self.cursor);
        self.value.insert_str(byte_offset, &text);
        self.cursor = self.value[..byte_offset + text.len()].graphemes(true).count();
    }

    /// Delete the grapheme before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let new_cursor = self.cursor - 1;
            let start_byte = self.grapheme_to_byte_offset(new_cursor);
            let end_byte = self.grapheme_to_byte_offset(self.cursor);
            self.value.replace_range(start_byte..end_byte, "");
            self.cursor = new_cursor;
        }
    }

    /// Delete the grapheme at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let start_byte = self.grapheme_to_byte_offset(self.cursor);
            let end_byte = self.grapheme_to_byte_offset(self.cursor + 1);
            self.value.replace_range(start_byte..end_byte, "");
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Take the line, leaving the input empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }

    /// Display columns between the start of the line and the cursor.
    pub fn cursor_column(&self) -> usize {
        let byte_offset = self.grapheme_to_byte_offset(self.cursor);
        self.value[..byte_offset].width()
    }

    fn len(&self) -> usize {
        self.value.graphemes(true).count()
    }

    fn grapheme_to_byte_offset(&self, grapheme_idx: usize) -> usize {
        self.value
            .grapheme_indices(true)
            .nth(grapheme_idx)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.value.len())
    }
}
