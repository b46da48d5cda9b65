mod diagram;
mod help;
mod info;
mod tables;
mod text_editor;
mod versions;

use crate::app::{App, StatusKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub use diagram::render_diagram;
pub use help::render_help;
pub use info::render_info;
pub use tables::{render_fields, render_relationships, render_tables};
pub use text_editor::render_prompt;
pub use versions::render_versions;

/// Render the main UI
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();

    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(size);

    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25), // Lists
            Constraint::Percentage(50), // Canvas
            Constraint::Percentage(25), // Info
        ])
        .split(vertical_chunks[0]);

    let list_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(35),
            Constraint::Percentage(25),
        ])
        .split(horizontal_chunks[0]);

    render_tables(frame, list_chunks[0], app);
    render_fields(frame, list_chunks[1], app);
    render_relationships(frame, list_chunks[2], app);
    render_diagram(frame, horizontal_chunks[1], app);
    render_info(frame, horizontal_chunks[2], app);
    render_status(frame, vertical_chunks[1], app);

    if app.state.show_versions {
        render_versions(frame, size, app);
    }
    if app.state.show_help {
        render_help(frame, size);
    }
    if let Some(prompt) = &app.state.prompt {
        render_prompt(frame, size, prompt);
    }
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let line = match &app.state.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => Color::Green,
                StatusKind::Error => Color::Red,
            };
            Line::from(Span::styled(status.text.as_str(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            "? help  Ctrl+S save  Ctrl+Z undo  Ctrl+Y redo  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

/// Centered popup area, sized in percent of `r`
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
