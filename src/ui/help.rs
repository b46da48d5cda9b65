use crate::ui::centered_rect;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("Tab / Shift+Tab", "Cycle tables, fields, relationships"),
            ("Up / Down", "Move selection"),
            ("Shift+Arrows", "Move the selected table"),
        ],
    ),
    (
        "Editing",
        &[
            ("a", "Add table"),
            ("r", "Rename table or field"),
            ("f", "Add field (name or name:TYPE)"),
            ("t", "Cycle field type"),
            ("p / k / o", "Toggle primary key / foreign key / nullable"),
            ("c", "Connect: press on source, then on target"),
            ("Delete", "Delete selected table, field or relationship"),
            ("l", "Auto layout"),
            ("x x", "Reset diagram"),
            ("Ctrl+Z", "Undo"),
            ("Ctrl+Y / Ctrl+Shift+Z", "Redo"),
        ],
    ),
    (
        "Diagram",
        &[
            ("Ctrl+S", "Save now"),
            ("v", "Validate schema"),
            ("h", "Version history"),
            ("n", "Capture a named version"),
            ("Ctrl+E", "Export JSON"),
            ("?", "Show this help"),
            ("Esc", "Close panel / cancel"),
            ("q", "Save and quit"),
        ],
    ),
];

pub fn render_help(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title("Help (Press ? or Esc to close)")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let mut lines = vec![
        Line::from(Span::styled(
            "erdly - ER diagram editor",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (title, keys) in SECTIONS {
        lines.push(Line::from(Span::styled(
            format!("{}:", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        for (key, action) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<22}", key), Style::default().fg(Color::Cyan)),
                Span::raw(*action),
            ]));
        }
        lines.push(Line::from(""));
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(para, inner);
}
