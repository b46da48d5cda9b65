use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Byte offset of character `char_pos` in `buffer`
fn byte_index(buffer: &str, char_pos: usize) -> usize {
    buffer
        .char_indices()
        .nth(char_pos)
        .map(|(i, _)| i)
        .unwrap_or(buffer.len())
}

/// Handle single-line text input for a buffer with a cursor counted in characters.
/// Returns true if the event was handled, false otherwise
pub fn handle_text_editor_input(event: KeyEvent, buffer: &mut String, cursor_pos: &mut usize) -> bool {
    let len = buffer.chars().count();
    let pos = (*cursor_pos).min(len);

    match event.code {
        KeyCode::Char(c) => {
            if event.modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'u' => {
                        // Clear to start
                        buffer.drain(..byte_index(buffer, pos));
                        *cursor_pos = 0;
                    }
                    'k' => {
                        let at = byte_index(buffer, pos);
                        buffer.truncate(at);
                        *cursor_pos = pos;
                    }
                    'a' => *cursor_pos = 0,
                    'e' => *cursor_pos = len,
                    'w' => {
                        // Delete word before cursor
                        let chars: Vec<char> = buffer.chars().collect();
                        let mut start = pos;
                        while start > 0 && chars[start - 1].is_whitespace() {
                            start -= 1;
                        }
                        while start > 0 && !chars[start - 1].is_whitespace() {
                            start -= 1;
                        }
                        let (from, to) = (byte_index(buffer, start), byte_index(buffer, pos));
                        buffer.drain(from..to);
                        *cursor_pos = start;
                    }
                    _ => return false,
                }
            } else {
                buffer.insert(byte_index(buffer, pos), c);
                *cursor_pos = pos + 1;
            }
            true
        }
        KeyCode::Backspace => {
            if pos > 0 {
                buffer.remove(byte_index(buffer, pos - 1));
                *cursor_pos = pos - 1;
            }
            true
        }
        KeyCode::Delete => {
            if pos < len {
                buffer.remove(byte_index(buffer, pos));
            }
            true
        }
        KeyCode::Left => {
            *cursor_pos = pos.saturating_sub(1);
            true
        }
        KeyCode::Right => {
            *cursor_pos = (pos + 1).min(len);
            true
        }
        KeyCode::Home => {
            *cursor_pos = 0;
            true
        }
        KeyCode::End => {
            *cursor_pos = len;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn edits_multibyte_text_by_character() {
        let mut buffer = "naïve".to_string();
        let mut cursor = 5;

        handle_text_editor_input(key(KeyCode::Left), &mut buffer, &mut cursor);
        handle_text_editor_input(key(KeyCode::Left), &mut buffer, &mut cursor);
        handle_text_editor_input(key(KeyCode::Backspace), &mut buffer, &mut cursor);
        assert_eq!(buffer, "nave");
        assert_eq!(cursor, 2);

        handle_text_editor_input(key(KeyCode::Char('é')), &mut buffer, &mut cursor);
        assert_eq!(buffer, "naéve");
        handle_text_editor_input(key(KeyCode::Delete), &mut buffer, &mut cursor);
        assert_eq!(buffer, "naée");
    }

    #[test]
    fn control_shortcuts() {
        let mut buffer = "order items".to_string();
        let mut cursor = 11;

        handle_text_editor_input(ctrl('w'), &mut buffer, &mut cursor);
        assert_eq!(buffer, "order ");
        assert_eq!(cursor, 6);

        handle_text_editor_input(ctrl('a'), &mut buffer, &mut cursor);
        handle_text_editor_input(key(KeyCode::Right), &mut buffer, &mut cursor);
        handle_text_editor_input(ctrl('k'), &mut buffer, &mut cursor);
        assert_eq!(buffer, "o");

        handle_text_editor_input(ctrl('e'), &mut buffer, &mut cursor);
        handle_text_editor_input(ctrl('u'), &mut buffer, &mut cursor);
        assert!(buffer.is_empty());
        assert_eq!(cursor, 0);

        assert!(!handle_text_editor_input(ctrl('x'), &mut buffer, &mut cursor));
    }
}
