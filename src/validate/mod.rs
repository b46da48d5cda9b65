use crate::types::{RelationshipEdge, TableNode};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Severity of a schema diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warning => f.write_str("warning"),
        }
    }
}

/// A single finding about the schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
}

/// Aggregated diagnostic counts for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub errors: usize,
    pub warnings: usize,
}

impl Summary {
    pub fn of(diagnostics: &[Diagnostic]) -> Self {
        diagnostics.iter().fold(Self::default(), |mut acc, d| {
            match d.severity {
                Severity::Error => acc.errors += 1,
                Severity::Warning => acc.warnings += 1,
            }
            acc
        })
    }

    pub fn is_clean(&self) -> bool {
        self.errors == 0 && self.warnings == 0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            write!(f, "Schema is valid!")
        } else {
            write!(
                f,
                "Found {} error(s) and {} warning(s)",
                self.errors, self.warnings
            )
        }
    }
}

/// Check a graph for missing primary keys, duplicate field names and
/// relationships pointing at tables that do not exist.
///
/// Pure: the output depends only on the input, in table order then edge order.
pub fn validate_schema(nodes: &[TableNode], edges: &[RelationshipEdge]) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for node in nodes {
        if !node.fields.is_empty() && !node.fields.iter().any(|f| f.is_primary_key) {
            diagnostics.push(Diagnostic {
                severity: Severity::Warning,
                message: format!("Table \"{}\" has no primary key", node.label),
                node_id: Some(node.id.clone()),
                field_id: None,
            });
        }

        let mut seen = HashSet::new();
        let mut duplicates: Vec<String> = Vec::new();
        let mut first_duplicate_field = None;
        for field in &node.fields {
            let name = field.name.to_lowercase();
            if !seen.insert(name.clone()) && !duplicates.contains(&name) {
                first_duplicate_field.get_or_insert_with(|| field.id.clone());
                duplicates.push(name);
            }
        }
        if !duplicates.is_empty() {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                message: format!(
                    "Table \"{}\" has duplicate field names: {}",
                    node.label,
                    duplicates.join(", ")
                ),
                node_id: Some(node.id.clone()),
                field_id: first_duplicate_field,
            });
        }
    }

    let node_ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    for edge in edges {
        let missing: Vec<&str> = [edge.source.as_str(), edge.target.as_str()]
            .into_iter()
            .filter(|id| !node_ids.contains(id))
            .collect();
        if !missing.is_empty() {
            diagnostics.push(Diagnostic {
                severity: Severity::Error,
                message: format!(
                    "Relationship \"{}\" references non-existent table: {}",
                    edge.id,
                    missing.join(", ")
                ),
                node_id: None,
                field_id: None,
            });
        }
    }

    diagnostics
}
