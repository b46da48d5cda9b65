use crate::types::{new_id, GraphSnapshot, NodePatch, RelationshipEdge, TableNode};
use tracing::debug;

/// Canonical set of tables and relationships for one open diagram.
///
/// All structural mutation goes through these primitives. Operations on ids
/// that do not exist are no-ops; the returned `bool` reports whether anything
/// changed. The store never snapshots or persists itself.
#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    nodes: Vec<TableNode>,
    edges: Vec<RelationshipEdge>,
}

impl GraphStore {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[TableNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[RelationshipEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&TableNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&RelationshipEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Bulk replace, used on load and version restore. No validation.
    pub fn replace_all(&mut self, nodes: Vec<TableNode>, edges: Vec<RelationshipEdge>) {
        debug!(nodes = nodes.len(), edges = edges.len(), "graph replaced");
        self.nodes = nodes;
        self.edges = edges;
    }

    /// Append a node and return the id it was stored under.
    ///
    /// An empty or already used id is replaced with a freshly generated one.
    pub fn add_node(&mut self, mut node: TableNode) -> String {
        if node.id.is_empty() || self.contains_node(&node.id) {
            let fresh = new_id("table");
            debug!(requested = %node.id, assigned = %fresh, "node id reassigned");
            node.id = fresh;
        }
        let id = node.id.clone();
        self.nodes.push(node);
        id
    }

    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                patch.apply(node);
                true
            }
            None => {
                debug!(node_id = id, "update of unknown node ignored");
                false
            }
        }
    }

    /// Remove a node together with every edge that references it
    pub fn delete_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            debug!(node_id = id, "delete of unknown node ignored");
            return false;
        }
        let edges_before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        debug!(
            node_id = id,
            cascaded_edges = edges_before - self.edges.len(),
            "node deleted"
        );
        true
    }

    /// Append an edge and return the id it was stored under.
    ///
    /// Endpoints are not checked here; dangling references are reported by
    /// the schema validator.
    pub fn add_edge(&mut self, mut edge: RelationshipEdge) -> String {
        if edge.id.is_empty() || self.edge(&edge.id).is_some() {
            edge.id = new_id("rel");
        }
        let id = edge.id.clone();
        self.edges.push(edge);
        id
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        self.edges.len() != before
    }

    /// Deep copy of the current graph
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::new(self.nodes.clone(), self.edges.clone())
    }

    pub fn restore(&mut self, snapshot: &GraphSnapshot) {
        self.nodes = snapshot.nodes.clone();
        self.edges = snapshot.edges.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldType, Position, RelationType};

    fn table(id: &str) -> TableNode {
        TableNode::new(id, id, Position::default())
    }

    fn edge(id: &str, source: &str, target: &str) -> RelationshipEdge {
        RelationshipEdge::new(id, source, target, RelationType::OneToMany)
    }

    fn sample() -> GraphStore {
        let mut store = GraphStore::new();
        store.replace_all(
            vec![table("a"), table("b"), table("c")],
            vec![
                edge("ab", "a", "b"),
                edge("bc", "b", "c"),
                edge("ca", "c", "a"),
                edge("bb", "b", "b"),
            ],
        );
        store
    }

    #[test]
    fn delete_node_cascades_to_edges() {
        for victim in ["a", "b", "c"] {
            let mut store = sample();
            assert!(store.delete_node(victim));
            assert!(!store.contains_node(victim));
            assert!(store.edges().iter().all(|e| !e.touches(victim)));
        }

        let mut store = sample();
        store.delete_node("b");
        let remaining: Vec<&str> = store.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(remaining, vec!["ca"]);
    }

    #[test]
    fn unknown_ids_are_no_ops() {
        let mut store = sample();
        let before = store.snapshot();
        assert!(!store.delete_node("ghost"));
        assert!(!store.delete_edge("ghost"));
        assert!(!store.update_node("ghost", NodePatch::label("x")));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn duplicate_node_id_is_reassigned() {
        let mut store = sample();
        let id = store.add_node(table("a"));
        assert_ne!(id, "a");
        assert!(id.starts_with("table-"));
        assert_eq!(store.nodes().len(), 4);

        let id = store.add_node(table(""));
        assert!(!id.is_empty());
        assert!(store.contains_node(&id));
    }

    #[test]
    fn add_edge_does_not_check_endpoints() {
        let mut store = sample();
        let id = store.add_edge(edge("dangling", "a", "ghost"));
        assert_eq!(id, "dangling");
        assert_eq!(store.edges().len(), 5);
    }

    #[test]
    fn update_node_merges_patch() {
        let mut store = sample();
        let fields = vec![Field::new("id", FieldType::Uuid).primary_key()];
        assert!(store.update_node("a", NodePatch::fields(fields.clone())));
        let node = store.node("a").unwrap();
        assert_eq!(node.fields, fields);
        assert_eq!(node.label, "a");
    }

    #[test]
    fn snapshot_is_detached_from_live_graph() {
        let mut store = sample();
        let snap = store.snapshot();
        store.delete_node("a");
        store.update_node("b", NodePatch::label("renamed"));
        assert_eq!(snap.nodes.len(), 3);
        assert_eq!(snap.nodes[1].label, "b");
        store.restore(&snap);
        assert_eq!(store.snapshot(), snap);
    }
}
