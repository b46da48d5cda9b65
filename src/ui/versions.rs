use crate::app::App;
use crate::ui::centered_rect;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render_versions(frame: &mut Frame, area: Rect, app: &App) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Versions (Enter restore, n capture, Esc close) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    if app.state.versions_loading && app.state.versions.is_empty() {
        let loading = Paragraph::new("Loading versions...")
            .style(Style::default().fg(Color::Yellow))
            .block(block);
        frame.render_widget(loading, popup_area);
        return;
    }
    if app.state.versions.is_empty() {
        let empty = Paragraph::new("No versions yet. Press n to capture one.")
            .style(Style::default().fg(Color::Gray))
            .block(block);
        frame.render_widget(empty, popup_area);
        return;
    }

    let items: Vec<ListItem> = app
        .state
        .versions
        .iter()
        .map(|version| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    version.timestamp.format("%Y-%m-%d %H:%M:%S ").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(version.name.clone()),
                Span::styled(
                    format!("  {} tables, by {}", version.nodes.len(), version.created_by),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let mut list_state = ListState::default();
    list_state.select(Some(app.state.selected_version_index));

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut list_state);
}
