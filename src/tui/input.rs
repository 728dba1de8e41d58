//! Text field editing
//!
//! Unified editing operations for the path and pattern input fields, with
//! Emacs-style bindings handled in the engine. Cursor positions are in
//! characters, not bytes, so multibyte patterns edit cleanly.

/// Editing operations applicable to a text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOperation {
    InsertChar(char),
    MoveCursorToStart,
    MoveCursorToEnd,
    MoveCursorLeft,
    MoveCursorRight,
    DeleteCharForward,
    DeleteCharBackward,
    KillToEnd,
    ClearLine,
}

/// One editable input field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    pub text: String,
    /// Cursor position in characters.
    pub cursor: usize,
}

impl TextField {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Apply an editing operation. Returns true when the text changed.
    pub fn apply(&mut self, operation: InputOperation) -> bool {
        match operation {
            InputOperation::InsertChar(c) => {
                let at = self.byte_index(self.cursor);
                self.text.insert(at, c);
                self.cursor += 1;
                true
            }
            InputOperation::MoveCursorToStart => {
                self.cursor = 0;
                false
            }
            InputOperation::MoveCursorToEnd => {
                self.cursor = self.char_count();
                false
            }
            InputOperation::MoveCursorLeft => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            InputOperation::MoveCursorRight => {
                self.cursor = (self.cursor + 1).min(self.char_count());
                false
            }
            InputOperation::DeleteCharForward => {
                if self.cursor < self.char_count() {
                    let at = self.byte_index(self.cursor);
                    self.text.remove(at);
                    true
                } else {
                    false
                }
            }
            InputOperation::DeleteCharBackward => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.text.remove(at);
                    true
                } else {
                    false
                }
            }
            InputOperation::KillToEnd => {
                if self.cursor < self.char_count() {
                    let at = self.byte_index(self.cursor);
                    self.text.truncate(at);
                    true
                } else {
                    false
                }
            }
            InputOperation::ClearLine => {
                let changed = !self.text.is_empty();
                self.text.clear();
                self.cursor = 0;
                changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_cursor_movement() {
        let mut field = TextField::default();
        for c in "hello".chars() {
            assert!(field.apply(InputOperation::InsertChar(c)));
        }
        assert_eq!(field.text, "hello");
        assert_eq!(field.cursor, 5);

        field.apply(InputOperation::MoveCursorToStart);
        assert_eq!(field.cursor, 0);
        field.apply(InputOperation::MoveCursorRight);
        field.apply(InputOperation::InsertChar('X'));
        assert_eq!(field.text, "hXello");
    }

    #[test]
    fn test_delete_backward_and_forward() {
        let mut field = TextField {
            text: "abc".into(),
            cursor: 2,
        };
        assert!(field.apply(InputOperation::DeleteCharBackward));
        assert_eq!(field.text, "ac");
        assert_eq!(field.cursor, 1);

        assert!(field.apply(InputOperation::DeleteCharForward));
        assert_eq!(field.text, "a");
        assert!(!field.apply(InputOperation::DeleteCharForward));
    }

    #[test]
    fn test_kill_to_end_and_clear() {
        let mut field = TextField {
            text: "pattern".into(),
            cursor: 3,
        };
        assert!(field.apply(InputOperation::KillToEnd));
        assert_eq!(field.text, "pat");

        assert!(field.apply(InputOperation::ClearLine));
        assert!(field.is_empty());
        assert_eq!(field.cursor, 0);
        assert!(!field.apply(InputOperation::ClearLine));
    }

    #[test]
    fn test_multibyte_editing_stays_on_char_boundaries() {
        let mut field = TextField::default();
        for c in "日本語".chars() {
            field.apply(InputOperation::InsertChar(c));
        }
        assert_eq!(field.cursor, 3);

        field.apply(InputOperation::MoveCursorLeft);
        field.apply(InputOperation::DeleteCharBackward);
        assert_eq!(field.text, "日語");
        assert_eq!(field.cursor, 1);
    }
}
