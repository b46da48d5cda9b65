use crate::app::App;
use crate::validate::{Severity, Summary};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use std::time::Instant;

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    ))
}

fn entry(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{}: ", label), Style::default().fg(Color::Cyan)),
        Span::raw(value),
    ])
}

pub fn render_info(frame: &mut Frame, area: Rect, app: &App) {
    let session = app.session();
    let mut lines = Vec::new();

    lines.push(heading("Diagram"));
    match app.diagram() {
        Some(diagram) => {
            lines.push(entry("Name", diagram.name.clone()));
            if !diagram.description.is_empty() {
                lines.push(entry("About", diagram.description.clone()));
            }
            lines.push(entry(
                "Shared",
                match &diagram.public_id {
                    Some(id) if diagram.is_public => id.clone(),
                    _ => "no".to_string(),
                },
            ));
        }
        None => lines.push(Line::from("No diagram open")),
    }
    lines.push(entry(
        "Tables",
        format!("{} / {} relationships", session.nodes().len(), session.edges().len()),
    ));
    lines.push(Line::from(""));

    lines.push(heading("History"));
    let history = session.history();
    let step = if history.is_empty() {
        "empty".to_string()
    } else {
        format!("{} of {}", history.history_index() + 1, history.len())
    };
    lines.push(entry("Step", step));
    lines.push(entry(
        "Undo/Redo",
        format!(
            "{} / {}",
            if session.can_undo() { "yes" } else { "no" },
            if session.can_redo() { "yes" } else { "no" }
        ),
    ));
    lines.push(Line::from(""));

    lines.push(heading("Saving"));
    lines.push(entry(
        "Last saved",
        app.state
            .last_saved
            .map(|ts| ts.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "not yet".to_string()),
    ));
    if let Some(left) = app.persistence().time_until_autosave(Instant::now()) {
        lines.push(entry("Auto-save in", format!("{}s", left.as_secs())));
    }

    if let Some(diagnostics) = &app.state.diagnostics {
        lines.push(Line::from(""));
        lines.push(heading("Validation"));
        lines.push(Line::from(Summary::of(diagnostics).to_string()));
        for diagnostic in diagnostics {
            let color = match diagnostic.severity {
                Severity::Error => Color::Red,
                Severity::Warning => Color::Yellow,
            };
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", diagnostic.severity), Style::default().fg(color)),
                Span::raw(diagnostic.message.clone()),
            ]));
        }
    }

    let para = Paragraph::new(lines)
        .block(
            Block::default()
                .title(" Info ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(para, area);
}
