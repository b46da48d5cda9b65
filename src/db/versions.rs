use crate::db::{format_timestamp, parse_json, parse_timestamp, DatabaseError};
use crate::types::{new_id, DiagramVersion, GraphSnapshot, NewVersion};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

/// Versions retained per diagram; older ones are dropped on insert
pub const MAX_VERSIONS_PER_DIAGRAM: usize = 20;

const COLUMNS: &str = "id, diagram_id, name, timestamp, graph, created_by";

fn row_to_version(row: &Row) -> rusqlite::Result<DiagramVersion> {
    let graph: GraphSnapshot = parse_json(4, &row.get::<_, String>(4)?)?;
    Ok(DiagramVersion {
        id: row.get(0)?,
        diagram_id: row.get(1)?,
        name: row.get(2)?,
        timestamp: parse_timestamp(3, &row.get::<_, String>(3)?)?,
        nodes: graph.nodes,
        edges: graph.edges,
        created_by: row.get(5)?,
    })
}

/// Store a version and trim the diagram's list to the
/// [`MAX_VERSIONS_PER_DIAGRAM`] most recently inserted entries
pub fn save_version(conn: &Connection, version: NewVersion) -> Result<DiagramVersion> {
    let stored = DiagramVersion {
        id: new_id("version"),
        diagram_id: version.diagram_id,
        name: version.name,
        timestamp: Utc::now(),
        nodes: version.graph.nodes,
        edges: version.graph.edges,
        created_by: version.created_by,
    };
    let graph = serde_json::to_string(&stored.graph()).map_err(DatabaseError::from)?;

    let tx = conn
        .unchecked_transaction()
        .context("Failed to start version transaction")?;
    tx.execute(
        "INSERT INTO versions (id, diagram_id, name, timestamp, graph, created_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            stored.id,
            stored.diagram_id,
            stored.name,
            format_timestamp(&stored.timestamp),
            graph,
            stored.created_by,
        ],
    )
    .with_context(|| format!("Failed to save version for diagram: {}", stored.diagram_id))?;

    let dropped = tx
        .execute(
            "DELETE FROM versions WHERE diagram_id = ?1 AND seq NOT IN (
                SELECT seq FROM versions WHERE diagram_id = ?1
                ORDER BY seq DESC LIMIT ?2
            )",
            params![stored.diagram_id, MAX_VERSIONS_PER_DIAGRAM as i64],
        )
        .context("Failed to trim version history")?;
    tx.commit().context("Failed to commit version")?;

    debug!(
        diagram_id = %stored.diagram_id,
        version_id = %stored.id,
        dropped,
        "version saved"
    );
    Ok(stored)
}

/// Versions of a diagram, most recently inserted first
pub fn fetch_versions(conn: &Connection, diagram_id: &str) -> Result<Vec<DiagramVersion>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM versions WHERE diagram_id = ? ORDER BY seq DESC",
        COLUMNS
    ))?;

    let versions: Result<Vec<DiagramVersion>, anyhow::Error> = stmt
        .query_map([diagram_id], row_to_version)?
        .map(|r| r.map_err(anyhow::Error::from))
        .collect();

    versions
}

pub fn get_version(conn: &Connection, id: &str) -> Result<Option<DiagramVersion>> {
    let version = conn
        .query_row(
            &format!("SELECT {} FROM versions WHERE id = ?", COLUMNS),
            [id],
            row_to_version,
        )
        .optional()
        .with_context(|| format!("Failed to load version: {}", id))?;
    Ok(version)
}

pub fn delete_version(conn: &Connection, id: &str) -> Result<()> {
    let removed = conn
        .execute("DELETE FROM versions WHERE id = ?", [id])
        .with_context(|| format!("Failed to delete version: {}", id))?;
    if removed == 0 {
        return Err(DatabaseError::VersionNotFound(id.to_string()).into());
    }
    Ok(())
}
