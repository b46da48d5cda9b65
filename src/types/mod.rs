pub mod diagram;
pub mod graph;

pub use diagram::{DiagramRecord, DiagramUpdate, DiagramVersion, NewVersion};
pub use graph::{
    new_id, Field, FieldType, GraphSnapshot, NodePatch, Position, RelationType, RelationshipEdge,
    TableNode,
};
