mod state;
mod text_editor;

use crate::editor::{grid_layout, EditorSession};
use crate::export::{default_file_name, export_json, ExportFormat};
use crate::persist::PersistenceCoordinator;
use crate::types::{DiagramRecord, Field, FieldType, RelationType};
use crate::validate::Summary;
use crate::worker::{SaveTrigger, Worker, WorkerMessage, WorkerResponse};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

pub use state::{AppState, Focus, Prompt, PromptKind, StatusKind};
use text_editor::handle_text_editor_input;

/// Canvas units a table moves per Shift+Arrow press
const DRAG_STEP: f64 = 20.0;

/// Main application controller
pub struct App {
    pub state: AppState,
    session: EditorSession,
    persistence: PersistenceCoordinator,
    worker: Worker,
    export_dir: PathBuf,
    should_quit: bool,
}

impl App {
    pub fn new(worker: Worker, persistence: PersistenceCoordinator, export_dir: PathBuf) -> Self {
        Self {
            state: AppState::new(),
            session: EditorSession::new(),
            persistence,
            worker,
            export_dir,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn diagram(&self) -> Option<&DiagramRecord> {
        self.persistence.diagram()
    }

    pub fn persistence(&self) -> &PersistenceCoordinator {
        &self.persistence
    }

    /// Check if application should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Ask the worker for a diagram; `None` opens the most recent one
    pub fn open_diagram(&mut self, diagram_id: Option<String>) {
        self.persistence.detach();
        self.state.diagram_loading = true;
        if let Err(e) = self.worker.send(WorkerMessage::LoadDiagram { diagram_id }) {
            self.state.diagram_loading = false;
            self.state.set_error(format!("Load diagram failed: {}", e), Instant::now());
        }
    }

    /// Run timers: auto-save and status expiry
    pub fn tick(&mut self, now: Instant) {
        self.state.expire_status(now);
        if let Err(e) = self.persistence.tick(now, &self.session, &self.worker) {
            warn!(error = %e, "auto-save not queued");
            self.state.set_error(format!("Auto-save failed: {}", e), now);
        }
    }

    /// Process worker responses
    pub fn process_worker_responses(&mut self) -> Result<()> {
        while let Some(response) = self.worker.try_recv()? {
            self.handle_response(response, Instant::now());
        }
        Ok(())
    }

    fn handle_response(&mut self, response: WorkerResponse, now: Instant) {
        match response {
            WorkerResponse::DiagramLoaded { diagram } => {
                let name = diagram.name.clone();
                self.persistence.attach(diagram, &mut self.session, now);
                self.state = AppState::new();
                self.state.set_status(format!("Opened \"{}\"", name), now);
            }
            WorkerResponse::DiagramSaved {
                diagram_id,
                updated_at,
                trigger,
            } => {
                self.persistence.record_saved(&diagram_id, updated_at);
                self.state.last_saved = Some(updated_at);
                match trigger {
                    SaveTrigger::Auto => {}
                    SaveTrigger::Manual => self.state.set_status("Diagram saved", now),
                    SaveTrigger::Restore => self.state.set_status("Version restored", now),
                }
            }
            WorkerResponse::VersionSaved { version } => {
                if !version.name.starts_with("Before restore") {
                    self.state
                        .set_status(format!("Version \"{}\" saved", version.name), now);
                }
                if self.state.show_versions {
                    self.request_versions(now);
                }
            }
            WorkerResponse::VersionsLoaded {
                diagram_id,
                versions,
            } => {
                if self.diagram().is_some_and(|d| d.id == diagram_id) {
                    self.state.versions = versions;
                    self.state.versions_loading = false;
                    self.state.clamp_selection(&self.session);
                }
            }
            WorkerResponse::Error { message } => {
                self.state.diagram_loading = false;
                self.state.versions_loading = false;
                self.state.set_error(message, now);
            }
        }
    }

    /// Handle a key event
    pub fn handle_key_event(&mut self, event: KeyEvent) -> Result<()> {
        let now = Instant::now();

        if self.state.prompt.is_some() {
            self.handle_prompt_key(event, now);
            return Ok(());
        }

        if !is_drag_key(&event) {
            self.session.finish_drag();
        }
        if event.code != KeyCode::Char('x') {
            self.state.confirm_reset = false;
        }

        if event.modifiers.contains(KeyModifiers::CONTROL) {
            self.handle_control_key(event, now);
            return Ok(());
        }

        if self.state.show_help {
            if matches!(event.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                self.state.show_help = false;
            }
            return Ok(());
        }

        match event.code {
            KeyCode::Char('q') => self.quit(now),
            KeyCode::Char('?') => self.state.show_help = true,
            KeyCode::Esc => {
                if self.state.show_versions {
                    self.state.show_versions = false;
                } else if self.state.diagnostics.is_some() {
                    self.state.diagnostics = None;
                } else if self.state.connect_source.take().is_some() {
                    self.state.set_status("Connect cancelled", now);
                }
            }
            KeyCode::Tab => self.state.next_focus(),
            KeyCode::BackTab => self.state.prev_focus(),
            _ if is_drag_key(&event) && self.can_edit_graph() => {
                self.drag_selected(event.code);
            }
            KeyCode::Up => self.state.move_up(&self.session),
            KeyCode::Down => self.state.move_down(&self.session),
            KeyCode::Enter if self.state.show_versions => self.restore_selected_version(now),
            KeyCode::Char('h') => self.toggle_versions(now),
            KeyCode::Char('n') => {
                if self.diagram().is_some() {
                    self.state.prompt = Some(Prompt::new(PromptKind::VersionName, ""));
                }
            }
            _ if !self.can_edit_graph() => {}
            KeyCode::Delete => self.delete_selected(now),
            KeyCode::Char('a') => {
                let id = self.session.add_table();
                self.state.select_table(&self.session, &id);
                self.state.focus = Focus::Tables;
            }
            KeyCode::Char('r') => self.start_rename(now),
            KeyCode::Char('f') => match self.state.selected_table(&self.session) {
                Some(table) => {
                    let kind = PromptKind::AddField {
                        table_id: table.id.clone(),
                    };
                    self.state.prompt = Some(Prompt::new(kind, ""));
                }
                None => self.state.set_error("Add a table first", now),
            },
            KeyCode::Char('t') => {
                self.edit_selected_field(now, |f| f.field_type = f.field_type.next());
            }
            KeyCode::Char('p') => {
                self.edit_selected_field(now, |f| f.is_primary_key = !f.is_primary_key);
            }
            KeyCode::Char('k') => {
                self.edit_selected_field(now, |f| f.is_foreign_key = !f.is_foreign_key);
            }
            KeyCode::Char('o') => {
                self.edit_selected_field(now, |f| f.is_nullable = !f.is_nullable);
            }
            KeyCode::Char('c') => self.connect_selected(now),
            KeyCode::Char('l') => {
                if self.session.apply_layout(grid_layout) {
                    self.state.set_status("Layout applied", now);
                } else if !self.session.nodes().is_empty() {
                    self.state.set_status("Layout unchanged", now);
                }
            }
            KeyCode::Char('x') => {
                if self.state.confirm_reset {
                    self.state.confirm_reset = false;
                    if self.session.reset() {
                        self.state.clamp_selection(&self.session);
                        self.state.set_status("Diagram reset", now);
                    } else {
                        self.state.set_status("Diagram is already empty", now);
                    }
                } else {
                    self.state.confirm_reset = true;
                    self.state.set_status("Press x again to remove every table", now);
                }
            }
            KeyCode::Char('v') => {
                let diagnostics = self.session.validate();
                let summary = Summary::of(&diagnostics);
                if summary.errors > 0 {
                    self.state.set_error(summary.to_string(), now);
                } else {
                    self.state.set_status(summary.to_string(), now);
                }
                self.state.diagnostics = Some(diagnostics);
            }
            _ => {}
        }
        Ok(())
    }

    /// Graph edits are off while the versions panel is open, and while a
    /// load is in flight since its arrival replaces the graph
    fn can_edit_graph(&self) -> bool {
        !self.state.show_versions && !self.state.diagram_loading
    }

    fn handle_control_key(&mut self, event: KeyEvent, now: Instant) {
        let shift = event.modifiers.contains(KeyModifiers::SHIFT);
        match event.code {
            KeyCode::Char('s') => self.save_now(now),
            KeyCode::Char('e') => self.export(now),
            _ if self.state.diagram_loading => {}
            KeyCode::Char('z') | KeyCode::Char('Z') if shift || event.code == KeyCode::Char('Z') => {
                self.redo(now)
            }
            KeyCode::Char('z') => {
                if self.session.undo() {
                    self.state.clamp_selection(&self.session);
                } else {
                    self.state.set_status("Nothing to undo", now);
                }
            }
            KeyCode::Char('y') => self.redo(now),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, event: KeyEvent, now: Instant) {
        match event.code {
            KeyCode::Esc => self.state.prompt = None,
            KeyCode::Enter => {
                if let Some(prompt) = self.state.prompt.take() {
                    self.submit_prompt(prompt, now);
                }
            }
            _ => {
                if let Some(prompt) = self.state.prompt.as_mut() {
                    handle_text_editor_input(event, &mut prompt.buffer, &mut prompt.cursor);
                }
            }
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt, now: Instant) {
        let input = prompt.buffer.trim();
        match prompt.kind {
            PromptKind::RenameTable { table_id } => {
                self.session.rename_table(&table_id, input);
            }
            PromptKind::RenameField { table_id, field_id } => {
                if !input.is_empty() {
                    self.session
                        .update_field(&table_id, &field_id, |f| f.name = input.to_string());
                }
            }
            PromptKind::AddField { table_id } => {
                let (name, field_type) = match input.split_once(':') {
                    Some((name, ty)) => match ty.parse::<FieldType>() {
                        Ok(field_type) => (name, field_type),
                        Err(e) => {
                            self.state.set_error(e, now);
                            return;
                        }
                    },
                    None => (input, FieldType::default()),
                };
                if self.session.add_field(&table_id, name, field_type).is_some() {
                    self.state.focus = Focus::Fields;
                    self.state.selected_field_index = self
                        .state
                        .selected_table(&self.session)
                        .map_or(0, |t| t.fields.len().saturating_sub(1));
                }
            }
            PromptKind::VersionName => {
                if let Err(e) = self
                    .persistence
                    .capture_version(input, &self.session, &self.worker)
                {
                    self.state.set_error(format!("Save version failed: {}", e), now);
                }
            }
        }
    }

    fn start_rename(&mut self, now: Instant) {
        let Some(table) = self.state.selected_table(&self.session) else {
            self.state.set_error("No table selected", now);
            return;
        };
        let prompt = match (self.state.focus, self.state.selected_field(&self.session)) {
            (Focus::Fields, Some(field)) => Prompt::new(
                PromptKind::RenameField {
                    table_id: table.id.clone(),
                    field_id: field.id.clone(),
                },
                &field.name,
            ),
            _ => Prompt::new(
                PromptKind::RenameTable {
                    table_id: table.id.clone(),
                },
                &table.label,
            ),
        };
        self.state.prompt = Some(prompt);
    }

    fn edit_selected_field(&mut self, now: Instant, edit: impl FnOnce(&mut Field)) {
        let selected = self
            .state
            .selected_table(&self.session)
            .zip(self.state.selected_field(&self.session))
            .map(|(t, f)| (t.id.clone(), f.id.clone()));
        match selected {
            Some((table_id, field_id)) => {
                self.session.update_field(&table_id, &field_id, edit);
            }
            None => self.state.set_error("No field selected", now),
        }
    }

    fn delete_selected(&mut self, now: Instant) {
        let deleted = match self.state.focus {
            Focus::Tables => match self.state.selected_table(&self.session) {
                Some(table) => {
                    let id = table.id.clone();
                    self.session.delete_table(&id)
                }
                None => false,
            },
            Focus::Relationships => match self.state.selected_edge(&self.session) {
                Some(edge) => {
                    let id = edge.id.clone();
                    self.session.delete_relationship(&id)
                }
                None => false,
            },
            Focus::Fields => {
                let selected = self
                    .state
                    .selected_table(&self.session)
                    .zip(self.state.selected_field(&self.session))
                    .map(|(t, f)| (t.id.clone(), f.id.clone()));
                selected.is_some_and(|(table_id, field_id)| {
                    self.session.remove_field(&table_id, &field_id)
                })
            }
        };
        if deleted {
            self.state.clamp_selection(&self.session);
        } else {
            self.state.set_status("Nothing selected", now);
        }
    }

    fn connect_selected(&mut self, now: Instant) {
        let Some(table) = self.state.selected_table(&self.session) else {
            self.state.set_error("No table selected", now);
            return;
        };
        let target = table.id.clone();
        match self.state.connect_source.take() {
            None => {
                self.state.set_status(
                    format!("Connecting from {}: select a target and press c", table.label),
                    now,
                );
                self.state.connect_source = Some(target);
            }
            Some(source) => {
                match self
                    .session
                    .connect(&source, &target, RelationType::default())
                {
                    Some(_) => {
                        self.state.selected_edge_index = self.session.edges().len() - 1;
                        self.state.set_status("Relationship added", now);
                    }
                    None => self.state.set_error("Source table no longer exists", now),
                }
            }
        }
    }

    fn drag_selected(&mut self, code: KeyCode) {
        let (dx, dy) = match code {
            KeyCode::Left => (-DRAG_STEP, 0.0),
            KeyCode::Right => (DRAG_STEP, 0.0),
            KeyCode::Up => (0.0, -DRAG_STEP),
            _ => (0.0, DRAG_STEP),
        };
        if let Some(table) = self.state.selected_table(&self.session) {
            let id = table.id.clone();
            let position = table.position.offset(dx, dy);
            self.session.drag_table(&id, position);
        }
    }

    fn redo(&mut self, now: Instant) {
        if self.session.redo() {
            self.state.clamp_selection(&self.session);
        } else {
            self.state.set_status("Nothing to redo", now);
        }
    }

    fn save_now(&mut self, now: Instant) {
        if let Err(e) = self.persistence.save_now(&self.session, &self.worker) {
            self.state.set_error(format!("Save failed: {}", e), now);
        }
    }

    fn toggle_versions(&mut self, now: Instant) {
        self.state.show_versions = !self.state.show_versions;
        if self.state.show_versions {
            self.state.selected_version_index = 0;
            self.request_versions(now);
        }
    }

    fn request_versions(&mut self, now: Instant) {
        match self.persistence.request_versions(&self.worker) {
            Ok(()) => self.state.versions_loading = true,
            Err(e) => self.state.set_error(format!("Load versions failed: {}", e), now),
        }
    }

    fn restore_selected_version(&mut self, now: Instant) {
        let Some(version) = self.state.selected_version().cloned() else {
            return;
        };
        match self
            .persistence
            .restore_version(&version, &mut self.session, &self.worker, true)
        {
            Ok(()) => {
                self.state.show_versions = false;
                self.state.clamp_selection(&self.session);
            }
            Err(e) => self.state.set_error(format!("Restore failed: {}", e), now),
        }
    }

    fn export(&mut self, now: Instant) {
        let Some(diagram) = self.diagram() else {
            return;
        };
        let record = diagram.with_graph(self.session.snapshot());
        let path = self
            .export_dir
            .join(default_file_name(&record, ExportFormat::Json));
        match export_json(&record, &path) {
            Ok(()) => {
                info!(path = %path.display(), "diagram exported");
                self.state
                    .set_status(format!("Exported to {}", path.display()), now);
            }
            Err(e) => self.state.set_error(format!("Export failed: {:#}", e), now),
        }
    }

    fn quit(&mut self, now: Instant) {
        if self.diagram().is_some() {
            // Queued before shutdown, so the worker writes it before stopping
            self.save_now(now);
        }
        self.persistence.detach();
        self.should_quit = true;
    }

    /// Shutdown the application
    pub fn shutdown(self) -> Result<()> {
        self.worker.shutdown()
    }
}

fn is_drag_key(event: &KeyEvent) -> bool {
    event.modifiers.contains(KeyModifiers::SHIFT)
        && matches!(
            event.code,
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::persist::DEFAULT_AUTOSAVE_INTERVAL;
    use crate::types::Position;
    use tempfile::TempDir;

    fn app() -> (App, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let worker = Worker::new(Database::in_memory().unwrap().into_connection());
        let persistence = PersistenceCoordinator::new(DEFAULT_AUTOSAVE_INTERVAL, "tester");
        let mut app = App::new(worker, persistence, dir.path().to_path_buf());
        app.open_diagram(None);
        pump(&mut app);
        (app, dir)
    }

    /// Handle exactly one worker response, waiting for it
    fn pump(app: &mut App) {
        let response = app.worker.recv().unwrap();
        app.handle_response(response, Instant::now());
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap();
    }

    fn press_with(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        app.handle_key_event(KeyEvent::new(code, modifiers)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn opening_loads_an_empty_diagram() {
        let (app, _dir) = app();
        assert_eq!(app.diagram().unwrap().name, "Untitled diagram");
        assert!(app.session().nodes().is_empty());
        assert!(!app.session().can_undo());
    }

    #[test]
    fn connect_then_delete_cascades_and_undoes() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.state.selected_table_index, 1);

        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Char('c'));
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('c'));
        assert_eq!(app.session().edges().len(), 1);
        let edge = app.session().edges()[0].clone();
        assert_eq!(edge.relation_type, RelationType::OneToMany);
        assert_eq!(
            app.session().node(&edge.source).unwrap().label,
            "table_1"
        );

        press(&mut app, KeyCode::Delete);
        assert_eq!(app.session().nodes().len(), 1);
        assert!(app.session().edges().is_empty());

        press_with(&mut app, KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert_eq!(app.session().nodes().len(), 2);
        assert_eq!(app.session().edges().len(), 1);

        press_with(
            &mut app,
            KeyCode::Char('Z'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        );
        assert!(app.session().edges().is_empty());

        press_with(&mut app, KeyCode::Char('z'), KeyModifiers::CONTROL);
        press_with(&mut app, KeyCode::Char('y'), KeyModifiers::CONTROL);
        assert!(app.session().edges().is_empty());
    }

    #[test]
    fn keyboard_drag_is_one_edit() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        let len = app.session().history().len();

        for _ in 0..3 {
            press_with(&mut app, KeyCode::Right, KeyModifiers::SHIFT);
        }
        assert_eq!(app.session().history().len(), len);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.session().history().len(), len + 1);
        assert_eq!(
            app.session().nodes()[0].position,
            Position::new(3.0 * DRAG_STEP, 0.0)
        );
    }

    #[test]
    fn field_prompt_accepts_a_type() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('f'));
        type_text(&mut app, "email:text");
        press(&mut app, KeyCode::Enter);

        let table = &app.session().nodes()[0];
        assert_eq!(table.fields.len(), 1);
        assert_eq!(table.fields[0].name, "email");
        assert_eq!(table.fields[0].field_type, FieldType::Text);
        assert_eq!(app.state.focus, Focus::Fields);

        press(&mut app, KeyCode::Char('p'));
        press(&mut app, KeyCode::Char('t'));
        let field = &app.session().nodes()[0].fields[0];
        assert!(field.is_primary_key);
        assert_eq!(field.field_type, FieldType::Integer);

        press(&mut app, KeyCode::Char('f'));
        type_text(&mut app, "bad:blob");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().nodes()[0].fields.len(), 1);
        assert_eq!(app.state.status.as_ref().unwrap().kind, StatusKind::Error);
    }

    #[test]
    fn edits_wait_for_a_pending_load() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        let id = app.diagram().unwrap().id.clone();
        press_with(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        pump(&mut app);

        app.open_diagram(Some(id));
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Char('r'));
        press_with(&mut app, KeyCode::Char('z'), KeyModifiers::CONTROL);
        assert_eq!(app.session().nodes().len(), 1);
        assert!(app.state.prompt.is_none());

        pump(&mut app);
        assert!(!app.state.diagram_loading);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.session().nodes().len(), 2);
    }

    #[test]
    fn reset_needs_two_presses() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.session().nodes().len(), 1);
        press(&mut app, KeyCode::Char('x'));
        assert!(app.session().nodes().is_empty());
    }

    #[test]
    fn validate_reports_summary() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('f'));
        type_text(&mut app, "email");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('v'));

        assert_eq!(app.state.diagnostics.as_ref().unwrap().len(), 1);
        assert_eq!(
            app.state.status.as_ref().unwrap().text,
            "Found 0 error(s) and 1 warning(s)"
        );
    }

    #[test]
    fn save_and_version_round_trip() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        press_with(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL);
        pump(&mut app);
        assert_eq!(app.state.status.as_ref().unwrap().text, "Diagram saved");
        assert!(app.state.last_saved.is_some());

        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "one table");
        press(&mut app, KeyCode::Enter);
        pump(&mut app);

        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('h'));
        pump(&mut app);
        assert_eq!(app.state.versions.len(), 1);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.session().nodes().len(), 1);
        assert!(!app.session().can_undo());
        assert!(!app.state.show_versions);

        // pre-restore snapshot, then the restored save
        pump(&mut app);
        pump(&mut app);
        assert_eq!(app.state.status.as_ref().unwrap().text, "Version restored");
    }

    #[test]
    fn export_writes_json_next_to_working_dir() {
        let (mut app, dir) = app();
        press(&mut app, KeyCode::Char('a'));
        press_with(&mut app, KeyCode::Char('e'), KeyModifiers::CONTROL);

        let written = std::fs::read_to_string(dir.path().join("untitled-diagram.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["nodes"][0]["label"], "table_1");
    }

    #[test]
    fn quit_queues_a_final_save() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('a'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
        assert!(matches!(
            app.worker.recv().unwrap(),
            WorkerResponse::DiagramSaved {
                trigger: SaveTrigger::Manual,
                ..
            }
        ));
        app.shutdown().unwrap();
    }
}
