//! Single-line text editing (pure state transitions).
//!
//! Used by the filter prompt and the add-target form. The cursor is a
//! character index, so multi-byte input edits correctly.

/// Text being edited plus cursor position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    text: String,
    cursor: usize,
}

impl TextInput {
    /// Start editing `text` with the cursor at the end.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Consume the input, returning the text.
    pub fn into_text(self) -> String {
        self.text
    }

    /// Insert a character at the cursor and advance.
    pub fn insert(mut self, ch: char) -> Self {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
        self
    }

    /// Delete the character before the cursor. No-op at position 0.
    pub fn backspace(mut self) -> Self {
        if self.cursor > 0 {
            let at = self.byte_offset(self.cursor - 1);
            self.text.remove(at);
            self.cursor -= 1;
        }
        self
    }

    /// Delete the character under the cursor. No-op at the end.
    pub fn delete(mut self) -> Self {
        if self.cursor < self.text.chars().count() {
            let at = self.byte_offset(self.cursor);
            self.text.remove(at);
        }
        self
    }

    /// Move left, saturating at 0.
    pub fn left(mut self) -> Self {
        self.cursor = self.cursor.saturating_sub(1);
        self
    }

    /// Move right, saturating at the end.
    pub fn right(mut self) -> Self {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
        self
    }

    /// Move to the start.
    pub fn home(mut self) -> Self {
        self.cursor = 0;
        self
    }

    /// Move to the end.
    pub fn end(mut self) -> Self {
        self.cursor = self.text.chars().count();
        self
    }

    fn byte_offset(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}
