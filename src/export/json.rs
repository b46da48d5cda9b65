use crate::types::{DiagramRecord, RelationshipEdge, TableNode};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedDiagram<'a> {
    id: &'a str,
    name: &'a str,
    description: &'a str,
    updated_at: DateTime<Utc>,
    is_public: bool,
    public_id: Option<&'a str>,
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    diagram: ExportedDiagram<'a>,
    nodes: &'a [TableNode],
    edges: &'a [RelationshipEdge],
}

/// Pretty-printed export document for `diagram`
pub fn render_json(diagram: &DiagramRecord) -> Result<String> {
    let document = ExportDocument {
        diagram: ExportedDiagram {
            id: &diagram.id,
            name: &diagram.name,
            description: &diagram.description,
            updated_at: diagram.updated_at,
            is_public: diagram.is_public,
            public_id: diagram.public_id.as_deref(),
        },
        nodes: &diagram.nodes,
        edges: &diagram.edges,
    };
    serde_json::to_string_pretty(&document).context("Failed to serialize JSON")
}

/// Export a diagram to a JSON file
pub fn export_json(diagram: &DiagramRecord, output_path: &Path) -> Result<()> {
    let output = render_json(diagram)?;

    let mut file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;
    file.write_all(output.as_bytes())
        .context("Failed to write JSON file")?;
    file.flush().context("Failed to flush file")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldType, Position, RelationType};
    use serde_json::Value as JsonValue;

    fn diagram() -> DiagramRecord {
        let now = Utc::now();
        DiagramRecord {
            id: "diagram-1".into(),
            name: "Shop".into(),
            description: "orders".into(),
            nodes: vec![
                TableNode::new("users", "users", Position::new(0.0, 0.0)).with_fields(vec![
                    Field::new("id", FieldType::Uuid).primary_key(),
                    Field::new("email", FieldType::Varchar).nullable(),
                ]),
                TableNode::new("orders", "orders", Position::new(300.0, 0.0)),
            ],
            edges: vec![RelationshipEdge::new(
                "r1",
                "users",
                "orders",
                RelationType::OneToMany,
            )],
            created_at: now,
            updated_at: now,
            is_public: true,
            public_id: Some("pub_abc".into()),
        }
    }

    #[test]
    fn document_carries_metadata_and_graph() {
        let value: JsonValue = serde_json::from_str(&render_json(&diagram()).unwrap()).unwrap();

        assert_eq!(value["diagram"]["id"], "diagram-1");
        assert_eq!(value["diagram"]["isPublic"], true);
        assert_eq!(value["diagram"]["publicId"], "pub_abc");
        assert!(value["diagram"]["updatedAt"].is_string());
        assert!(value["diagram"].get("createdAt").is_none());

        assert_eq!(value["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(value["nodes"][0]["fields"][0]["type"], "UUID");
        assert_eq!(value["nodes"][0]["fields"][0]["isPrimaryKey"], true);
        assert_eq!(value["edges"][0]["source"], "users");
    }

    #[test]
    fn rendering_does_not_change_the_diagram() {
        let original = diagram();
        let copy = original.clone();
        render_json(&original).unwrap();
        assert_eq!(original, copy);
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");
        let shop = diagram();
        export_json(&shop, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, render_json(&shop).unwrap());
    }
}
