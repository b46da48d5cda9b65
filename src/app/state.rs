use crate::editor::EditorSession;
use crate::types::{DiagramVersion, Field, RelationshipEdge, TableNode};
use crate::validate::Diagnostic;
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// How long a status message stays on screen
pub const STATUS_TTL: Duration = Duration::from_secs(4);

/// Which list currently has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Tables,
    Fields,
    Relationships,
}

/// What a text prompt will do with its input when submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptKind {
    RenameTable { table_id: String },
    RenameField { table_id: String, field_id: String },
    AddField { table_id: String },
    VersionName,
}

impl PromptKind {
    pub fn title(&self) -> &'static str {
        match self {
            PromptKind::RenameTable { .. } => "Rename table",
            PromptKind::RenameField { .. } => "Rename field",
            PromptKind::AddField { .. } => "New field (name or name:TYPE)",
            PromptKind::VersionName => "Version name",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub buffer: String,
    /// Cursor position in characters
    pub cursor: usize,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: &str) -> Self {
        Self {
            kind,
            buffer: initial.to_string(),
            cursor: initial.chars().count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Transient line shown at the bottom of the screen
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: Instant,
}

/// Presentation state; the graph itself lives in the editing session
#[derive(Debug)]
pub struct AppState {
    pub focus: Focus,
    pub selected_table_index: usize,
    pub selected_field_index: usize,
    pub selected_edge_index: usize,

    /// Source table picked by the first `c` press
    pub connect_source: Option<String>,
    pub confirm_reset: bool,

    pub diagram_loading: bool,
    pub last_saved: Option<DateTime<Utc>>,

    // Versions panel
    pub show_versions: bool,
    pub versions: Vec<DiagramVersion>,
    pub versions_loading: bool,
    pub selected_version_index: usize,

    pub diagnostics: Option<Vec<Diagnostic>>,
    pub prompt: Option<Prompt>,
    pub status: Option<StatusMessage>,
    pub show_help: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            focus: Focus::Tables,
            selected_table_index: 0,
            selected_field_index: 0,
            selected_edge_index: 0,
            connect_source: None,
            confirm_reset: false,
            diagram_loading: false,
            last_saved: None,
            show_versions: false,
            versions: Vec::new(),
            versions_loading: false,
            selected_version_index: 0,
            diagnostics: None,
            prompt: None,
            status: None,
            show_help: false,
        }
    }

    pub fn selected_table<'a>(&self, session: &'a EditorSession) -> Option<&'a TableNode> {
        session.nodes().get(self.selected_table_index)
    }

    pub fn selected_field<'a>(&self, session: &'a EditorSession) -> Option<&'a Field> {
        self.selected_table(session)?
            .fields
            .get(self.selected_field_index)
    }

    pub fn selected_edge<'a>(&self, session: &'a EditorSession) -> Option<&'a RelationshipEdge> {
        session.edges().get(self.selected_edge_index)
    }

    pub fn selected_version(&self) -> Option<&DiagramVersion> {
        self.versions.get(self.selected_version_index)
    }

    /// Select the table with `id`, if present
    pub fn select_table(&mut self, session: &EditorSession, id: &str) {
        if let Some(index) = session.nodes().iter().position(|n| n.id == id) {
            self.selected_table_index = index;
            self.selected_field_index = 0;
        }
    }

    /// Keep every selection inside the session's current lists
    pub fn clamp_selection(&mut self, session: &EditorSession) {
        self.selected_table_index = clamp(self.selected_table_index, session.nodes().len());
        let fields = self.selected_table(session).map_or(0, |t| t.fields.len());
        self.selected_field_index = clamp(self.selected_field_index, fields);
        self.selected_edge_index = clamp(self.selected_edge_index, session.edges().len());
        self.selected_version_index = clamp(self.selected_version_index, self.versions.len());
        if let Some(source) = &self.connect_source {
            if session.node(source).is_none() {
                self.connect_source = None;
            }
        }
    }

    /// Move selection up in the focused list
    pub fn move_up(&mut self, session: &EditorSession) {
        if self.show_versions {
            self.selected_version_index = wrap_prev(self.selected_version_index, self.versions.len());
            return;
        }
        match self.focus {
            Focus::Tables => {
                self.selected_table_index =
                    wrap_prev(self.selected_table_index, session.nodes().len());
                self.selected_field_index = 0;
            }
            Focus::Fields => {
                let len = self.selected_table(session).map_or(0, |t| t.fields.len());
                self.selected_field_index = wrap_prev(self.selected_field_index, len);
            }
            Focus::Relationships => {
                self.selected_edge_index =
                    wrap_prev(self.selected_edge_index, session.edges().len());
            }
        }
    }

    /// Move selection down in the focused list
    pub fn move_down(&mut self, session: &EditorSession) {
        if self.show_versions {
            self.selected_version_index = wrap_next(self.selected_version_index, self.versions.len());
            return;
        }
        match self.focus {
            Focus::Tables => {
                self.selected_table_index =
                    wrap_next(self.selected_table_index, session.nodes().len());
                self.selected_field_index = 0;
            }
            Focus::Fields => {
                let len = self.selected_table(session).map_or(0, |t| t.fields.len());
                self.selected_field_index = wrap_next(self.selected_field_index, len);
            }
            Focus::Relationships => {
                self.selected_edge_index =
                    wrap_next(self.selected_edge_index, session.edges().len());
            }
        }
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tables => Focus::Fields,
            Focus::Fields => Focus::Relationships,
            Focus::Relationships => Focus::Tables,
        };
    }

    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Tables => Focus::Relationships,
            Focus::Fields => Focus::Tables,
            Focus::Relationships => Focus::Fields,
        };
    }

    pub fn set_status(&mut self, text: impl Into<String>, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Info,
            shown_at: now,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind: StatusKind::Error,
            shown_at: now,
        });
    }

    /// Drop the status line once it has been visible for [`STATUS_TTL`]
    pub fn expire_status(&mut self, now: Instant) {
        if self
            .status
            .as_ref()
            .is_some_and(|s| now.duration_since(s.shown_at) >= STATUS_TTL)
        {
            self.status = None;
        }
    }
}

fn clamp(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}

fn wrap_prev(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (index + len - 1) % len
    }
}

fn wrap_next(index: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (index + 1) % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_and_clamps() {
        let mut session = EditorSession::new();
        session.load(Vec::new(), Vec::new());
        let mut state = AppState::new();

        state.move_down(&session);
        assert_eq!(state.selected_table_index, 0);

        session.add_table();
        session.add_table();
        let third = session.add_table();
        state.move_up(&session);
        assert_eq!(state.selected_table_index, 2);
        state.move_down(&session);
        assert_eq!(state.selected_table_index, 0);

        state.select_table(&session, &third);
        session.delete_table(&third);
        state.clamp_selection(&session);
        assert_eq!(state.selected_table_index, 1);
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut state = AppState::new();
        state.next_focus();
        assert_eq!(state.focus, Focus::Fields);
        state.prev_focus();
        state.prev_focus();
        assert_eq!(state.focus, Focus::Relationships);
    }

    #[test]
    fn status_expires() {
        let mut state = AppState::new();
        let now = Instant::now();
        state.set_error("Save failed: disk is full", now);
        state.expire_status(now + Duration::from_secs(1));
        assert!(state.status.is_some());
        state.expire_status(now + STATUS_TTL);
        assert!(state.status.is_none());
    }
}
