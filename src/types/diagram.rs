use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{GraphSnapshot, RelationshipEdge, TableNode};

/// Durable record of a diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub nodes: Vec<TableNode>,
    #[serde(default)]
    pub edges: Vec<RelationshipEdge>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}

impl DiagramRecord {
    pub fn graph(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }

    /// Copy of this record carrying `graph` as its content
    pub fn with_graph(&self, graph: GraphSnapshot) -> Self {
        Self {
            nodes: graph.nodes,
            edges: graph.edges,
            ..self.clone()
        }
    }
}

/// Partial update of a diagram record
#[derive(Debug, Clone, Default)]
pub struct DiagramUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub graph: Option<GraphSnapshot>,
}

/// Named, durable snapshot of a diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramVersion {
    pub id: String,
    pub diagram_id: String,
    pub name: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub nodes: Vec<TableNode>,
    #[serde(default)]
    pub edges: Vec<RelationshipEdge>,
    pub created_by: String,
}

impl DiagramVersion {
    pub fn graph(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }
}

/// A version about to be stored; id and timestamp are assigned on insert
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub diagram_id: String,
    pub name: String,
    pub graph: GraphSnapshot,
    pub created_by: String,
}
