use crate::app::Prompt;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Split `text` around a character cursor: (before, under cursor, after)
fn split_at_cursor(text: &str, cursor: usize) -> (String, String, String) {
    let before: String = text.chars().take(cursor).collect();
    let at: String = text.chars().skip(cursor).take(1).collect();
    let after: String = text.chars().skip(cursor + 1).collect();
    (before, at, after)
}

/// Render a one-line input box over the screen
pub fn render_prompt(frame: &mut Frame, area: Rect, prompt: &Prompt) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);
    let popup_area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(rows[1])[1];

    let (before, at, after) = split_at_cursor(&prompt.buffer, prompt.cursor);
    let cursor_style = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let line = Line::from(vec![
        Span::styled(before, Style::default().fg(Color::White)),
        Span::styled(if at.is_empty() { " ".to_string() } else { at }, cursor_style),
        Span::styled(after, Style::default().fg(Color::White)),
    ]);

    let editor = Paragraph::new(line).block(
        Block::default()
            .title(format!(" {} (Enter confirm, Esc cancel) ", prompt.kind.title()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    );

    frame.render_widget(Clear, popup_area);
    frame.render_widget(editor, popup_area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_split_counts_characters() {
        assert_eq!(
            split_at_cursor("añb", 1),
            ("a".to_string(), "ñ".to_string(), "b".to_string())
        );
        assert_eq!(
            split_at_cursor("ab", 2),
            ("ab".to_string(), String::new(), String::new())
        );
    }
}
