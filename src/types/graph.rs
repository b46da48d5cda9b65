use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Generate an id of the form `<prefix>-<uuid>`
pub fn new_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// Canvas position of a table
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Scalar column types supported by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    #[default]
    Varchar,
    Text,
    Integer,
    Bigint,
    Decimal,
    Boolean,
    Date,
    Timestamp,
    Json,
    Uuid,
}

impl FieldType {
    pub const ALL: [FieldType; 10] = [
        FieldType::Varchar,
        FieldType::Text,
        FieldType::Integer,
        FieldType::Bigint,
        FieldType::Decimal,
        FieldType::Boolean,
        FieldType::Date,
        FieldType::Timestamp,
        FieldType::Json,
        FieldType::Uuid,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Varchar => "VARCHAR",
            FieldType::Text => "TEXT",
            FieldType::Integer => "INTEGER",
            FieldType::Bigint => "BIGINT",
            FieldType::Decimal => "DECIMAL",
            FieldType::Boolean => "BOOLEAN",
            FieldType::Date => "DATE",
            FieldType::Timestamp => "TIMESTAMP",
            FieldType::Json => "JSON",
            FieldType::Uuid => "UUID",
        }
    }

    /// Next type in menu order, wrapping around
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown field type: {}", s))
    }
}

/// A column of a table node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    #[serde(default)]
    pub is_nullable: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: new_id("field"),
            name: name.into(),
            field_type,
            is_primary_key: false,
            is_foreign_key: false,
            is_nullable: false,
        }
    }

    #[cfg(test)]
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    #[cfg(test)]
    pub fn foreign_key(mut self) -> Self {
        self.is_foreign_key = true;
        self
    }

    #[cfg(test)]
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }
}

/// A table on the diagram canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableNode {
    pub id: String,
    pub position: Position,
    pub label: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl TableNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            position,
            label: label.into(),
            fields: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }
}

/// Partial update merged into a node by `GraphStore::update_node`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub label: Option<String>,
    pub position: Option<Position>,
    pub fields: Option<Vec<Field>>,
}

impl NodePatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }

    pub fn position(position: Position) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn fields(fields: Vec<Field>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.label.is_none() && self.position.is_none() && self.fields.is_none()
    }

    pub fn apply(self, node: &mut TableNode) {
        if let Some(label) = self.label {
            node.label = label;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        if let Some(fields) = self.fields {
            node.fields = fields;
        }
    }
}

/// Relationship cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RelationType {
    #[serde(rename = "1-1")]
    OneToOne,
    #[default]
    #[serde(rename = "1-n")]
    OneToMany,
    #[serde(rename = "n-n")]
    ManyToMany,
}

impl RelationType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelationType::OneToOne => "1-1",
            RelationType::OneToMany => "1-n",
            RelationType::ManyToMany => "n-n",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Directed relationship between two tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub relation_type: RelationType,
}

impl RelationshipEdge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        relation_type: RelationType,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            relation_type,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Owned point-in-time copy of the whole graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<TableNode>,
    #[serde(default)]
    pub edges: Vec<RelationshipEdge>,
}

impl GraphSnapshot {
    pub fn new(nodes: Vec<TableNode>, edges: Vec<RelationshipEdge>) -> Self {
        Self { nodes, edges }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_uses_camel_case_wire_names() {
        let field = Field {
            id: "f1".into(),
            name: "email".into(),
            field_type: FieldType::Varchar,
            is_primary_key: false,
            is_foreign_key: true,
            is_nullable: true,
        };
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "VARCHAR");
        assert_eq!(json["isForeignKey"], true);
        assert_eq!(json["isNullable"], true);
    }

    #[test]
    fn relation_type_serializes_as_cardinality_tag() {
        let edge = RelationshipEdge::new("e1", "a", "b", RelationType::ManyToMany);
        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["relationType"], "n-n");

        let parsed: RelationshipEdge =
            serde_json::from_str(r#"{"id":"e2","source":"a","target":"b"}"#).unwrap();
        assert_eq!(parsed.relation_type, RelationType::OneToMany);
    }

    #[test]
    fn field_type_cycles_and_parses() {
        assert_eq!(FieldType::Uuid.next(), FieldType::Varchar);
        assert_eq!(FieldType::Varchar.next(), FieldType::Text);
        assert_eq!("bigint".parse::<FieldType>(), Ok(FieldType::Bigint));
        assert!("money".parse::<FieldType>().is_err());
    }

    #[test]
    fn patch_only_touches_present_members() {
        let mut node = TableNode::new("t1", "users", Position::new(1.0, 2.0))
            .with_fields(vec![Field::new("id", FieldType::Integer)]);
        NodePatch::label("accounts").apply(&mut node);
        assert_eq!(node.label, "accounts");
        assert_eq!(node.position, Position::new(1.0, 2.0));
        assert_eq!(node.fields.len(), 1);
    }
}
