use crate::app::App;
use crate::types::{RelationshipEdge, TableNode};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::collections::HashMap;

/// Canvas units per terminal column / row
const UNITS_PER_COL: f64 = 10.0;
const UNITS_PER_ROW: f64 = 25.0;

const BOX_WIDTH: u16 = 24;
const MAX_FIELDS_SHOWN: usize = 5;

pub fn render_diagram(frame: &mut Frame, area: Rect, app: &App) {
    let title = match app.diagram() {
        Some(diagram) => format!(" {} ", diagram.name),
        None => " Diagram ".to_string(),
    };
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if app.state.diagram_loading && app.diagram().is_none() {
        let loading = Paragraph::new("Loading diagram...").style(Style::default().fg(Color::Yellow));
        frame.render_widget(loading, inner);
        return;
    }

    let session = app.session();
    if session.nodes().is_empty() {
        let empty = Paragraph::new("No tables yet. Press 'a' to add one.")
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, inner);
        return;
    }

    let boxes = place_boxes(session.nodes(), inner);
    let selected = app
        .state
        .selected_table(session)
        .map(|t| t.id.as_str());

    let buf = frame.buffer_mut();
    for edge in session.edges() {
        if let (Some(from), Some(to)) = (boxes.get(edge.source.as_str()), boxes.get(edge.target.as_str())) {
            draw_connector(buf, inner, *from, *to, edge);
        }
    }

    for node in session.nodes() {
        let Some(rect) = boxes.get(node.id.as_str()) else {
            continue;
        };
        let border = if Some(node.id.as_str()) == selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else if app.state.connect_source.as_deref() == Some(node.id.as_str()) {
            Style::default().fg(Color::Magenta)
        } else {
            Style::default().fg(Color::White)
        };
        render_table_box(frame, *rect, node, border);
    }
}

fn box_height(node: &TableNode) -> u16 {
    let shown = node.fields.len().min(MAX_FIELDS_SHOWN);
    let overflow = usize::from(node.fields.len() > MAX_FIELDS_SHOWN);
    (shown + overflow + 2).max(3) as u16
}

/// Project canvas positions onto terminal cells, clipped to `area`
fn place_boxes(nodes: &[TableNode], area: Rect) -> HashMap<&str, Rect> {
    let min_x = nodes.iter().map(|n| n.position.x).fold(f64::INFINITY, f64::min);
    let min_y = nodes.iter().map(|n| n.position.y).fold(f64::INFINITY, f64::min);

    nodes
        .iter()
        .filter_map(|node| {
            let col = ((node.position.x - min_x) / UNITS_PER_COL).round() as u16;
            let row = ((node.position.y - min_y) / UNITS_PER_ROW).round() as u16;
            if col >= area.width || row >= area.height {
                return None;
            }
            let x = area.x + col;
            let y = area.y + row;
            let width = BOX_WIDTH.min(area.right() - x);
            let height = box_height(node).min(area.bottom() - y);
            Some((node.id.as_str(), Rect::new(x, y, width, height)))
        })
        .collect()
}

fn render_table_box(frame: &mut Frame, area: Rect, table: &TableNode, border: Style) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let block = Block::default()
        .title(table.label.as_str())
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(border);
    let inner = block.inner(area);
    frame.render_widget(ratatui::widgets::Clear, area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = table
        .fields
        .iter()
        .take(MAX_FIELDS_SHOWN)
        .map(|field| {
            let key = if field.is_primary_key {
                Span::styled("*", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else if field.is_foreign_key {
                Span::styled("~", Style::default().fg(Color::Green))
            } else {
                Span::raw(" ")
            };
            Line::from(vec![
                key,
                Span::raw(field.name.clone()),
                Span::styled(
                    format!(" {}", field.field_type),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();
    if table.fields.len() > MAX_FIELDS_SHOWN {
        lines.push(Line::from(Span::styled(
            format!("... {} more", table.fields.len() - MAX_FIELDS_SHOWN),
            Style::default().fg(Color::DarkGray),
        )));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Elbow connector: out of the source's right edge, across, then down or up
/// into the target's top or bottom edge
fn draw_connector(buf: &mut Buffer, area: Rect, from: Rect, to: Rect, edge: &RelationshipEdge) {
    let style = Style::default().fg(Color::LightGreen);
    let start_x = from.right();
    let start_y = from.y + from.height / 2;
    let end_x = to.x + to.width / 2;
    let end_y = if to.y > start_y { to.y } else { to.bottom().saturating_sub(1) };

    let (left, right) = (start_x.min(end_x), start_x.max(end_x));
    for x in left..=right {
        put(buf, area, x, start_y, "─", style);
    }
    let (top, bottom) = (start_y.min(end_y), start_y.max(end_y));
    for y in top..=bottom {
        put(buf, area, end_x, y, "│", style);
    }
    let corner = match (end_x >= start_x, end_y >= start_y) {
        (true, true) => "┐",
        (true, false) => "┘",
        (false, true) => "┌",
        (false, false) => "└",
    };
    put(buf, area, end_x, start_y, corner, style);

    let label = edge.relation_type.as_str();
    let label_x = left + (right - left) / 2;
    if start_y > area.y {
        for (i, ch) in label.chars().enumerate() {
            let mut tmp = [0u8; 4];
            put(buf, area, label_x + i as u16, start_y - 1, ch.encode_utf8(&mut tmp), style);
        }
    }
}

fn put(buf: &mut Buffer, area: Rect, x: u16, y: u16, symbol: &str, style: Style) {
    if x >= area.x && x < area.right() && y >= area.y && y < area.bottom() {
        buf.get_mut(x, y).set_symbol(symbol).set_style(style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldType, Position};

    #[test]
    fn boxes_follow_canvas_positions() {
        let nodes = vec![
            TableNode::new("a", "a", Position::new(100.0, 50.0)),
            TableNode::new("b", "b", Position::new(400.0, 50.0)),
            TableNode::new("far", "far", Position::new(100_000.0, 0.0)),
        ];
        let area = Rect::new(1, 1, 80, 30);
        let boxes = place_boxes(&nodes, area);

        assert_eq!(boxes["a"], Rect::new(1, 3, BOX_WIDTH, 3));
        assert_eq!(boxes["b"].x, 31);
        assert!(!boxes.contains_key("far"));
    }

    #[test]
    fn box_height_caps_fields() {
        let fields = (0..9)
            .map(|i| Field::new(format!("f{}", i), FieldType::Text))
            .collect();
        let node = TableNode::new("t", "t", Position::default()).with_fields(fields);
        assert_eq!(box_height(&node), (MAX_FIELDS_SHOWN + 3) as u16);
    }
}
