use crate::db;
use crate::db::error::format_storage_error;
use crate::types::{DiagramRecord, DiagramVersion, NewVersion};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::fmt;
use std::sync::mpsc;
use std::thread;
use tracing::{info, warn};

/// What caused a diagram save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Auto,
    Manual,
    Restore,
}

impl fmt::Display for SaveTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveTrigger::Auto => f.write_str("Auto-save"),
            SaveTrigger::Manual => f.write_str("Save"),
            SaveTrigger::Restore => f.write_str("Restore"),
        }
    }
}

/// Messages sent to the worker thread
#[derive(Debug)]
pub enum WorkerMessage {
    /// Load a diagram; without an id the most recently updated one is opened,
    /// or a new one is created when the store is empty
    LoadDiagram {
        diagram_id: Option<String>,
    },
    SaveDiagram {
        diagram: DiagramRecord,
        trigger: SaveTrigger,
    },
    SaveVersion {
        version: NewVersion,
    },
    FetchVersions {
        diagram_id: String,
    },
    Shutdown,
}

/// Responses sent back from the worker thread
#[derive(Debug)]
pub enum WorkerResponse {
    DiagramLoaded {
        diagram: DiagramRecord,
    },
    DiagramSaved {
        diagram_id: String,
        updated_at: DateTime<Utc>,
        trigger: SaveTrigger,
    },
    VersionSaved {
        version: DiagramVersion,
    },
    VersionsLoaded {
        diagram_id: String,
        versions: Vec<DiagramVersion>,
    },
    Error {
        message: String,
    },
}

/// Worker thread that owns the store connection.
///
/// Messages are handled one at a time in the order they were sent.
pub struct Worker {
    sender: mpsc::Sender<WorkerMessage>,
    receiver: mpsc::Receiver<WorkerResponse>,
    handle: thread::JoinHandle<()>,
}

impl Worker {
    /// Create a new worker with a store connection
    pub fn new(conn: Connection) -> Self {
        let (tx, rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let connection = conn;
            loop {
                match rx.recv() {
                    Ok(WorkerMessage::Shutdown) | Err(_) => break,
                    Ok(message) => {
                        let response = process(&connection, message);
                        if response_tx.send(response).is_err() {
                            // Nobody is listening any more
                            break;
                        }
                    }
                }
            }
            info!("worker stopped");
        });

        Self {
            sender: tx,
            receiver: response_rx,
            handle,
        }
    }

    /// Send a message to the worker
    pub fn send(&self, message: WorkerMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| anyhow::anyhow!("Worker thread disconnected"))
    }

    /// Try to receive a response (non-blocking)
    pub fn try_recv(&self) -> Result<Option<WorkerResponse>> {
        match self.receiver.try_recv() {
            Ok(response) => Ok(Some(response)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(anyhow::anyhow!("Worker thread disconnected"))
            }
        }
    }

    /// Receive a response (blocking)
    #[cfg(test)]
    pub fn recv(&self) -> Result<WorkerResponse> {
        self.receiver
            .recv()
            .map_err(|e| anyhow::anyhow!("Worker thread disconnected: {}", e))
    }

    /// Shutdown the worker thread once queued messages are handled
    pub fn shutdown(self) -> Result<()> {
        self.sender.send(WorkerMessage::Shutdown)?;
        self.handle
            .join()
            .map_err(|_| anyhow::anyhow!("Worker thread panicked"))?;
        Ok(())
    }
}

fn process(conn: &Connection, message: WorkerMessage) -> WorkerResponse {
    match message {
        WorkerMessage::LoadDiagram { diagram_id } => {
            match load_diagram(conn, diagram_id.as_deref()) {
                Ok(diagram) => {
                    info!(diagram_id = %diagram.id, nodes = diagram.nodes.len(), "diagram loaded");
                    WorkerResponse::DiagramLoaded { diagram }
                }
                Err(e) => failure("Load diagram", &e),
            }
        }
        WorkerMessage::SaveDiagram { diagram, trigger } => match db::save_diagram(conn, &diagram) {
            Ok(saved) => {
                info!(diagram_id = %saved.id, %trigger, "diagram persisted");
                WorkerResponse::DiagramSaved {
                    diagram_id: saved.id,
                    updated_at: saved.updated_at,
                    trigger,
                }
            }
            Err(e) => failure(&trigger.to_string(), &e),
        },
        WorkerMessage::SaveVersion { version } => match db::save_version(conn, version) {
            Ok(version) => WorkerResponse::VersionSaved { version },
            Err(e) => failure("Save version", &e),
        },
        WorkerMessage::FetchVersions { diagram_id } => {
            match db::fetch_versions(conn, &diagram_id) {
                Ok(versions) => WorkerResponse::VersionsLoaded {
                    diagram_id,
                    versions,
                },
                Err(e) => failure("Load versions", &e),
            }
        }
        WorkerMessage::Shutdown => unreachable!("shutdown is handled by the worker loop"),
    }
}

fn load_diagram(conn: &Connection, diagram_id: Option<&str>) -> Result<DiagramRecord> {
    match diagram_id {
        Some(id) => {
            db::get_diagram(conn, id)?.ok_or_else(|| db::DatabaseError::DiagramNotFound(id.to_string()).into())
        }
        None => match db::list_diagrams(conn)?.into_iter().next() {
            Some(diagram) => Ok(diagram),
            None => db::create_diagram(conn, "Untitled diagram", ""),
        },
    }
}

fn failure(action: &str, error: &anyhow::Error) -> WorkerResponse {
    warn!(action, error = %format!("{:#}", error), "store operation failed");
    WorkerResponse::Error {
        message: format_storage_error(action, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::types::{GraphSnapshot, Position, TableNode};

    fn worker() -> Worker {
        Worker::new(Database::in_memory().unwrap().into_connection())
    }

    fn loaded(worker: &Worker, diagram_id: Option<String>) -> DiagramRecord {
        worker
            .send(WorkerMessage::LoadDiagram { diagram_id })
            .unwrap();
        match worker.recv().unwrap() {
            WorkerResponse::DiagramLoaded { diagram } => diagram,
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn empty_store_gets_an_untitled_diagram() {
        let worker = worker();
        let first = loaded(&worker, None);
        assert_eq!(first.name, "Untitled diagram");
        let again = loaded(&worker, None);
        assert_eq!(again.id, first.id);
        worker.shutdown().unwrap();
    }

    #[test]
    fn unknown_diagram_is_an_error_response() {
        let worker = worker();
        worker
            .send(WorkerMessage::LoadDiagram {
                diagram_id: Some("ghost".into()),
            })
            .unwrap();
        match worker.recv().unwrap() {
            WorkerResponse::Error { message } => {
                assert!(message.starts_with("Load diagram failed"));
                assert!(message.contains("ghost"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
        worker.shutdown().unwrap();
    }

    #[test]
    fn messages_are_handled_in_order() {
        let worker = worker();
        let diagram = loaded(&worker, None);

        for label in ["first", "second", "third"] {
            let graph = GraphSnapshot::new(
                vec![TableNode::new("t", label, Position::default())],
                Vec::new(),
            );
            worker
                .send(WorkerMessage::SaveDiagram {
                    diagram: diagram.with_graph(graph),
                    trigger: SaveTrigger::Auto,
                })
                .unwrap();
        }
        for _ in 0..3 {
            assert!(matches!(
                worker.recv().unwrap(),
                WorkerResponse::DiagramSaved {
                    trigger: SaveTrigger::Auto,
                    ..
                }
            ));
        }

        let reloaded = loaded(&worker, Some(diagram.id.clone()));
        assert_eq!(reloaded.nodes[0].label, "third");
        worker.shutdown().unwrap();
    }
}
