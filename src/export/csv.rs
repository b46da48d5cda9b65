use crate::types::DiagramRecord;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Export one row per field to CSV
pub fn export_csv(diagram: &DiagramRecord, output_path: &Path) -> Result<()> {
    let mut file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

    let mut writer = csv::Writer::from_writer(&mut file);

    writer
        .write_record(["table", "field", "type", "primary_key", "foreign_key", "nullable"])
        .context("Failed to write CSV header")?;

    for node in &diagram.nodes {
        for field in &node.fields {
            writer
                .write_record([
                    node.label.as_str(),
                    field.name.as_str(),
                    field.field_type.as_str(),
                    bool_cell(field.is_primary_key),
                    bool_cell(field.is_foreign_key),
                    bool_cell(field.is_nullable),
                ])
                .with_context(|| format!("Failed to write row for {}.{}", node.label, field.name))?;
        }
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

fn bool_cell(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldType, Position, TableNode};
    use chrono::Utc;

    #[test]
    fn one_row_per_field() {
        let now = Utc::now();
        let diagram = DiagramRecord {
            id: "diagram-1".into(),
            name: "Shop".into(),
            description: String::new(),
            nodes: vec![
                TableNode::new("users", "users", Position::default()).with_fields(vec![
                    Field::new("id", FieldType::Uuid).primary_key(),
                    Field::new("note, extra", FieldType::Text).nullable(),
                ]),
                TableNode::new("empty", "empty", Position::default()),
                TableNode::new("orders", "orders", Position::default())
                    .with_fields(vec![Field::new("user_id", FieldType::Uuid).foreign_key()]),
            ],
            edges: Vec::new(),
            created_at: now,
            updated_at: now,
            is_public: false,
            public_id: None,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fields.csv");
        export_csv(&diagram, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(
            lines,
            vec![
                "table,field,type,primary_key,foreign_key,nullable",
                "users,id,UUID,true,false,false",
                "users,\"note, extra\",TEXT,false,false,true",
                "orders,user_id,UUID,false,true,false",
            ]
        );
    }
}
