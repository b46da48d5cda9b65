use crate::db::{format_timestamp, parse_json, parse_timestamp, DatabaseError};
use crate::types::{new_id, DiagramRecord, DiagramUpdate, GraphSnapshot};
use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;
use uuid::Uuid;

const COLUMNS: &str = "id, name, description, graph, is_public, public_id, created_at, updated_at";

fn row_to_diagram(row: &Row) -> rusqlite::Result<DiagramRecord> {
    let graph: GraphSnapshot = parse_json(3, &row.get::<_, String>(3)?)?;
    Ok(DiagramRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        nodes: graph.nodes,
        edges: graph.edges,
        is_public: row.get(4)?,
        public_id: row.get(5)?,
        created_at: parse_timestamp(6, &row.get::<_, String>(6)?)?,
        updated_at: parse_timestamp(7, &row.get::<_, String>(7)?)?,
    })
}

/// Create an empty diagram
pub fn create_diagram(conn: &Connection, name: &str, description: &str) -> Result<DiagramRecord> {
    let now = Utc::now();
    let diagram = DiagramRecord {
        id: new_id("diagram"),
        name: name.to_string(),
        description: description.to_string(),
        nodes: Vec::new(),
        edges: Vec::new(),
        created_at: now,
        updated_at: now,
        is_public: false,
        public_id: None,
    };
    write_diagram(conn, &diagram).context("Failed to create diagram")?;
    Ok(diagram)
}

pub fn get_diagram(conn: &Connection, id: &str) -> Result<Option<DiagramRecord>> {
    let diagram = conn
        .query_row(
            &format!("SELECT {} FROM diagrams WHERE id = ?", COLUMNS),
            [id],
            row_to_diagram,
        )
        .optional()
        .with_context(|| format!("Failed to load diagram: {}", id))?;
    Ok(diagram)
}

/// All diagrams, most recently updated first
pub fn list_diagrams(conn: &Connection) -> Result<Vec<DiagramRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM diagrams ORDER BY updated_at DESC, name",
        COLUMNS
    ))?;

    let diagrams: Result<Vec<DiagramRecord>, anyhow::Error> = stmt
        .query_map([], row_to_diagram)?
        .map(|r| r.map_err(anyhow::Error::from))
        .collect();

    diagrams
}

/// Write the whole record, inserting it when the id is new.
/// The stored copy is stamped with the current time.
pub fn save_diagram(conn: &Connection, diagram: &DiagramRecord) -> Result<DiagramRecord> {
    let saved = DiagramRecord {
        updated_at: Utc::now(),
        ..diagram.clone()
    };
    write_diagram(conn, &saved)
        .with_context(|| format!("Failed to save diagram: {}", diagram.id))?;
    debug!(
        diagram_id = %saved.id,
        nodes = saved.nodes.len(),
        edges = saved.edges.len(),
        "diagram saved"
    );
    Ok(saved)
}

/// Merge `update` into a stored diagram
pub fn update_diagram(conn: &Connection, id: &str, update: DiagramUpdate) -> Result<DiagramRecord> {
    let mut diagram =
        get_diagram(conn, id)?.ok_or_else(|| DatabaseError::DiagramNotFound(id.to_string()))?;

    if let Some(name) = update.name {
        diagram.name = name;
    }
    if let Some(description) = update.description {
        diagram.description = description;
    }
    if let Some(graph) = update.graph {
        diagram.nodes = graph.nodes;
        diagram.edges = graph.edges;
    }

    save_diagram(conn, &diagram)
}

/// Delete a diagram and its versions
pub fn delete_diagram(conn: &Connection, id: &str) -> Result<bool> {
    let removed = conn
        .execute("DELETE FROM diagrams WHERE id = ?", [id])
        .with_context(|| format!("Failed to delete diagram: {}", id))?;
    Ok(removed > 0)
}

/// Turn public sharing on or off. Enabling assigns a fresh public id.
pub fn set_public_sharing(conn: &Connection, id: &str, is_public: bool) -> Result<DiagramRecord> {
    let diagram =
        get_diagram(conn, id)?.ok_or_else(|| DatabaseError::DiagramNotFound(id.to_string()))?;

    let public_id = is_public.then(generate_public_id);
    save_diagram(
        conn,
        &DiagramRecord {
            is_public,
            public_id,
            ..diagram
        },
    )
}

/// Look up a diagram by its share id; only public diagrams are returned
pub fn get_public_diagram(conn: &Connection, public_id: &str) -> Result<Option<DiagramRecord>> {
    let diagram = conn
        .query_row(
            &format!(
                "SELECT {} FROM diagrams WHERE public_id = ? AND is_public = 1",
                COLUMNS
            ),
            [public_id],
            row_to_diagram,
        )
        .optional()
        .context("Failed to load shared diagram")?;
    Ok(diagram)
}

fn generate_public_id() -> String {
    format!("pub_{}", URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes()))
}

fn write_diagram(conn: &Connection, diagram: &DiagramRecord) -> Result<()> {
    let graph = serde_json::to_string(&diagram.graph()).map_err(DatabaseError::from)?;
    conn.execute(
        "INSERT INTO diagrams (id, name, description, graph, is_public, public_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name,
            description = excluded.description,
            graph = excluded.graph,
            is_public = excluded.is_public,
            public_id = excluded.public_id,
            updated_at = excluded.updated_at",
        params![
            diagram.id,
            diagram.name,
            diagram.description,
            graph,
            diagram.is_public,
            diagram.public_id,
            format_timestamp(&diagram.created_at),
            format_timestamp(&diagram.updated_at),
        ],
    )
    .map_err(DatabaseError::from)?;
    Ok(())
}
