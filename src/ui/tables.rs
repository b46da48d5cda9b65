use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

fn pane_block(title: String, focused: bool) -> Block<'static> {
    let (border_style, title_style) = if focused {
        (
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )
    } else {
        (Style::default().fg(Color::Gray), Style::default().fg(Color::Gray))
    };

    Block::default()
        .title(format!(" {} ", title))
        .title_style(title_style)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn render_list(frame: &mut Frame, area: Rect, items: Vec<ListItem>, block: Block, selected: usize) {
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(selected));
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn render_tables(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let items: Vec<ListItem> = session
        .nodes()
        .iter()
        .map(|node| {
            let mut spans = vec![Span::raw(node.label.clone())];
            spans.push(Span::styled(
                format!(" ({})", node.fields.len()),
                Style::default().fg(Color::DarkGray),
            ));
            if app.state.connect_source.as_deref() == Some(node.id.as_str()) {
                spans.push(Span::styled(" [source]", Style::default().fg(Color::Magenta)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let block = pane_block(
        format!("Tables ({})", session.nodes().len()),
        app.state.focus == Focus::Tables,
    );
    render_list(frame, area, items, block, app.state.selected_table_index);
}

pub fn render_fields(frame: &mut Frame, area: Rect, app: &App) {
    let table = app.state.selected_table(app.session());
    let items: Vec<ListItem> = table
        .map(|t| t.fields.as_slice())
        .unwrap_or_default()
        .iter()
        .map(|field| {
            let mut spans = vec![
                Span::styled(
                    if field.is_primary_key { "* " } else { "  " },
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(field.name.clone()),
                Span::styled(
                    format!(" {}", field.field_type),
                    Style::default().fg(Color::Cyan),
                ),
            ];
            if field.is_foreign_key {
                spans.push(Span::styled(" FK", Style::default().fg(Color::Green)));
            }
            if field.is_nullable {
                spans.push(Span::styled(" NULL", Style::default().fg(Color::DarkGray)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = match table {
        Some(t) => format!("Fields of {}", t.label),
        None => "Fields".to_string(),
    };
    let block = pane_block(title, app.state.focus == Focus::Fields);
    render_list(frame, area, items, block, app.state.selected_field_index);
}

pub fn render_relationships(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let label = |id: &str| {
        session
            .node(id)
            .map(|n| n.label.clone())
            .unwrap_or_else(|| format!("?{}", id))
    };
    let items: Vec<ListItem> = session
        .edges()
        .iter()
        .map(|edge| {
            ListItem::new(Line::from(vec![
                Span::raw(label(&edge.source)),
                Span::styled(
                    format!(" {} ", edge.relation_type),
                    Style::default().fg(Color::LightGreen),
                ),
                Span::raw(label(&edge.target)),
            ]))
        })
        .collect();

    let block = pane_block(
        format!("Relationships ({})", session.edges().len()),
        app.state.focus == Focus::Relationships,
    );
    render_list(frame, area, items, block, app.state.selected_edge_index);
}
