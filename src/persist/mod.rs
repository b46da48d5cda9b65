use crate::editor::EditorSession;
use crate::types::{DiagramRecord, DiagramVersion, NewVersion};
use crate::worker::{SaveTrigger, Worker, WorkerMessage};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_AUTOSAVE_INTERVAL: Duration = Duration::from_secs(10);

/// Bridges the open editing session to the durable store.
///
/// Every store operation is queued on the [`Worker`]; results come back as
/// worker responses. A failed send is returned as an error before any
/// in-memory state is touched.
#[derive(Debug)]
pub struct PersistenceCoordinator {
    diagram: Option<DiagramRecord>,
    interval: Duration,
    next_autosave: Option<Instant>,
    user: String,
}

impl PersistenceCoordinator {
    pub fn new(interval: Duration, user: impl Into<String>) -> Self {
        Self {
            diagram: None,
            interval,
            next_autosave: None,
            user: user.into(),
        }
    }

    /// The diagram currently open, as last sent to the store
    pub fn diagram(&self) -> Option<&DiagramRecord> {
        self.diagram.as_ref()
    }

    /// Open `diagram` in `session` and start the auto-save timer
    pub fn attach(&mut self, diagram: DiagramRecord, session: &mut EditorSession, now: Instant) {
        if let Some(previous) = &self.diagram {
            if previous.id != diagram.id {
                debug!(from = %previous.id, to = %diagram.id, "switching diagrams");
            }
        }
        session.load(diagram.nodes.clone(), diagram.edges.clone());
        info!(diagram_id = %diagram.id, name = %diagram.name, "diagram attached");
        self.diagram = Some(diagram);
        self.next_autosave = Some(now + self.interval);
    }

    /// Close the diagram and cancel the timer. Saves already queued still complete.
    pub fn detach(&mut self) -> Option<DiagramRecord> {
        self.next_autosave = None;
        self.diagram.take()
    }

    pub fn autosave_due(&self, now: Instant) -> bool {
        self.next_autosave.is_some_and(|deadline| now >= deadline)
    }

    /// Time left until the next auto-save, if the timer is running
    pub fn time_until_autosave(&self, now: Instant) -> Option<Duration> {
        self.next_autosave
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Queue an auto-save when the timer has fired. Returns whether a save was sent.
    pub fn tick(&mut self, now: Instant, session: &EditorSession, worker: &Worker) -> Result<bool> {
        if !self.autosave_due(now) {
            return Ok(false);
        }
        self.next_autosave = Some(now + self.interval);
        self.save(session, worker, SaveTrigger::Auto)?;
        Ok(true)
    }

    /// Save immediately, bypassing the timer
    pub fn save_now(&mut self, session: &EditorSession, worker: &Worker) -> Result<()> {
        self.save(session, worker, SaveTrigger::Manual)
    }

    /// Store a named copy of the current graph
    pub fn capture_version(
        &mut self,
        name: &str,
        session: &EditorSession,
        worker: &Worker,
    ) -> Result<()> {
        let diagram = self.attached()?;
        let name = match name.trim() {
            "" => format!("Snapshot - {}", version_stamp(Utc::now())),
            trimmed => trimmed.to_string(),
        };
        worker
            .send(WorkerMessage::SaveVersion {
                version: NewVersion {
                    diagram_id: diagram.id.clone(),
                    name,
                    graph: session.snapshot(),
                    created_by: self.user.clone(),
                },
            })
            .context("Failed to queue version")
    }

    /// Ask the store for the open diagram's versions
    pub fn request_versions(&self, worker: &Worker) -> Result<()> {
        let diagram = self.attached()?;
        worker
            .send(WorkerMessage::FetchVersions {
                diagram_id: diagram.id.clone(),
            })
            .context("Failed to request versions")
    }

    /// Replace the session's graph with `version`.
    ///
    /// With `snapshot_current`, the graph being replaced is stored first as a
    /// "Before restore" version. The session gets a fresh timeline and the
    /// restored graph is saved as the diagram's current record.
    pub fn restore_version(
        &mut self,
        version: &DiagramVersion,
        session: &mut EditorSession,
        worker: &Worker,
        snapshot_current: bool,
    ) -> Result<()> {
        let diagram = self.attached()?;
        if version.diagram_id != diagram.id {
            bail!(
                "Version {} belongs to diagram {}, not {}",
                version.id,
                version.diagram_id,
                diagram.id
            );
        }

        if snapshot_current {
            worker
                .send(WorkerMessage::SaveVersion {
                    version: NewVersion {
                        diagram_id: diagram.id.clone(),
                        name: format!("Before restore - {}", version_stamp(Utc::now())),
                        graph: session.snapshot(),
                        created_by: self.user.clone(),
                    },
                })
                .context("Failed to queue pre-restore version")?;
        }

        session.load(version.nodes.clone(), version.edges.clone());
        info!(version_id = %version.id, name = %version.name, "version restored");
        self.save(session, worker, SaveTrigger::Restore)
    }

    /// Record a completed save of the open diagram
    pub fn record_saved(&mut self, diagram_id: &str, updated_at: DateTime<Utc>) {
        match self.diagram.as_mut() {
            Some(diagram) if diagram.id == diagram_id => diagram.updated_at = updated_at,
            _ => debug!(diagram_id, "save completed for a diagram no longer open"),
        }
    }

    fn save(&mut self, session: &EditorSession, worker: &Worker, trigger: SaveTrigger) -> Result<()> {
        let record = self.attached()?.with_graph(session.snapshot());
        worker
            .send(WorkerMessage::SaveDiagram {
                diagram: record.clone(),
                trigger,
            })
            .with_context(|| format!("Failed to queue {}", trigger))?;
        debug!(diagram_id = %record.id, %trigger, "save queued");
        self.diagram = Some(record);
        Ok(())
    }

    fn attached(&self) -> Result<&DiagramRecord> {
        match &self.diagram {
            Some(diagram) => Ok(diagram),
            None => bail!("No diagram is open"),
        }
    }
}

fn version_stamp(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}
