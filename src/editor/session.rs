use crate::editor::history::HistoryManager;
use crate::editor::layout::{generate_table_name, next_free_position, LayoutFn};
use crate::editor::store::GraphStore;
use crate::types::{
    new_id, Field, FieldType, GraphSnapshot, NodePatch, Position, RelationType, RelationshipEdge,
    TableNode,
};
use crate::validate::{validate_schema, Diagnostic};
use tracing::debug;

/// Editing session for one open diagram.
///
/// Owns the graph and its undo timeline. Every public edit that changes the
/// graph ends with exactly one history push; edits that change nothing push
/// nothing. Table drags are the exception: intermediate moves are not recorded
/// and the whole drag is committed as one edit by [`EditorSession::finish_drag`],
/// which every other edit and undo/redo call implicitly.
#[derive(Debug, Default)]
pub struct EditorSession {
    store: GraphStore,
    history: HistoryManager,
    drag_pending: bool,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[TableNode] {
        self.store.nodes()
    }

    pub fn edges(&self) -> &[RelationshipEdge] {
        self.store.edges()
    }

    pub fn node(&self, id: &str) -> Option<&TableNode> {
        self.store.node(id)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        self.store.snapshot()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn validate(&self) -> Vec<Diagnostic> {
        validate_schema(self.store.nodes(), self.store.edges())
    }

    /// Replace the graph and start a fresh timeline
    pub fn load(&mut self, nodes: Vec<TableNode>, edges: Vec<RelationshipEdge>) {
        self.drag_pending = false;
        self.history.load(&mut self.store, nodes, edges);
    }

    pub fn add_table(&mut self) -> String {
        let label = generate_table_name(self.store.nodes().iter().map(|n| n.label.as_str()));
        let position = next_free_position(self.store.nodes());
        self.add_table_node(TableNode::new(new_id("table"), label, position))
    }

    pub fn add_table_node(&mut self, node: TableNode) -> String {
        self.finish_drag();
        let id = self.store.add_node(node);
        self.commit("add table");
        id
    }

    pub fn update_table(&mut self, id: &str, patch: NodePatch) -> bool {
        self.finish_drag();
        if patch.is_empty() || !self.store.update_node(id, patch) {
            return false;
        }
        self.commit("update table");
        true
    }

    pub fn rename_table(&mut self, id: &str, label: &str) -> bool {
        let label = label.trim();
        if label.is_empty() || self.store.node(id).is_some_and(|n| n.label == label) {
            return false;
        }
        self.update_table(id, NodePatch::label(label))
    }

    pub fn delete_table(&mut self, id: &str) -> bool {
        self.delete_selection(&[id.to_string()], &[])
    }

    /// Delete selected tables, or when no table is selected, selected relationships
    pub fn delete_selection(&mut self, node_ids: &[String], edge_ids: &[String]) -> bool {
        self.finish_drag();
        let changed = if !node_ids.is_empty() {
            node_ids
                .iter()
                .fold(false, |acc, id| self.store.delete_node(id) || acc)
        } else {
            edge_ids
                .iter()
                .fold(false, |acc, id| self.store.delete_edge(id) || acc)
        };
        if changed {
            self.commit("delete selection");
        }
        changed
    }

    /// Connect two existing tables; `None` when either endpoint is unknown
    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        relation_type: RelationType,
    ) -> Option<String> {
        self.finish_drag();
        if !self.store.contains_node(source) || !self.store.contains_node(target) {
            debug!(source, target, "connect with unknown endpoint ignored");
            return None;
        }
        let id = self.store.add_edge(RelationshipEdge::new(
            new_id("rel"),
            source,
            target,
            relation_type,
        ));
        self.commit("connect");
        Some(id)
    }

    pub fn delete_relationship(&mut self, id: &str) -> bool {
        self.delete_selection(&[], &[id.to_string()])
    }

    pub fn add_field(&mut self, table_id: &str, name: &str, field_type: FieldType) -> Option<String> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let field = Field::new(name, field_type);
        let field_id = field.id.clone();
        self.edit_fields(table_id, |fields| {
            fields.push(field);
            true
        })
        .then_some(field_id)
    }

    /// Apply `edit` to one field of a table
    pub fn update_field(
        &mut self,
        table_id: &str,
        field_id: &str,
        edit: impl FnOnce(&mut Field),
    ) -> bool {
        self.edit_fields(table_id, |fields| {
            match fields.iter_mut().find(|f| f.id == field_id) {
                Some(field) => {
                    let before = field.clone();
                    edit(field);
                    *field != before
                }
                None => false,
            }
        })
    }

    pub fn remove_field(&mut self, table_id: &str, field_id: &str) -> bool {
        self.edit_fields(table_id, |fields| {
            let before = fields.len();
            fields.retain(|f| f.id != field_id);
            fields.len() != before
        })
    }

    /// Move a table without recording history; see [`EditorSession::finish_drag`]
    pub fn drag_table(&mut self, id: &str, position: Position) -> bool {
        let moved = self.store.update_node(id, NodePatch::position(position));
        self.drag_pending |= moved;
        moved
    }

    /// Commit a pending drag as a single edit
    pub fn finish_drag(&mut self) -> bool {
        if !self.drag_pending {
            return false;
        }
        self.drag_pending = false;
        self.commit("drag");
        true
    }

    pub fn apply_layout(&mut self, layout: LayoutFn) -> bool {
        self.finish_drag();
        let nodes = layout(self.store.nodes(), self.store.edges());
        let edges = self.store.edges().to_vec();
        self.replace_graph("layout", nodes, edges)
    }

    /// Remove every table and relationship
    pub fn reset(&mut self) -> bool {
        self.finish_drag();
        self.replace_graph("reset", Vec::new(), Vec::new())
    }

    pub fn undo(&mut self) -> bool {
        self.finish_drag();
        self.history.undo(&mut self.store)
    }

    pub fn redo(&mut self) -> bool {
        self.finish_drag();
        self.history.redo(&mut self.store)
    }

    pub fn can_undo(&self) -> bool {
        self.drag_pending || self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        !self.drag_pending && self.history.can_redo()
    }

    fn edit_fields(&mut self, table_id: &str, edit: impl FnOnce(&mut Vec<Field>) -> bool) -> bool {
        self.finish_drag();
        let Some(node) = self.store.node(table_id) else {
            debug!(table_id, "field edit on unknown table ignored");
            return false;
        };
        let mut fields = node.fields.clone();
        if !edit(&mut fields) {
            return false;
        }
        self.store.update_node(table_id, NodePatch::fields(fields));
        self.commit("edit fields");
        true
    }

    /// Swap in a whole new graph, committing only if it differs
    fn replace_graph(
        &mut self,
        action: &'static str,
        nodes: Vec<TableNode>,
        edges: Vec<RelationshipEdge>,
    ) -> bool {
        let before = self.store.snapshot();
        self.store.replace_all(nodes, edges);
        if self.store.snapshot() == before {
            debug!(action, "graph unchanged");
            return false;
        }
        self.commit(action);
        true
    }

    fn commit(&mut self, action: &'static str) {
        self.history.save(&self.store);
        debug!(action, index = self.history.history_index(), "edit committed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::layout::grid_layout;

    fn session_with_two_tables() -> (EditorSession, String, String) {
        let mut session = EditorSession::new();
        session.load(Vec::new(), Vec::new());
        let a = session.add_table();
        let b = session.add_table();
        (session, a, b)
    }

    #[test]
    fn each_edit_pushes_exactly_once() {
        let (mut session, a, b) = session_with_two_tables();
        assert_eq!(session.history().len(), 3);

        session.connect(&a, &b, RelationType::OneToMany).unwrap();
        assert_eq!(session.history().len(), 4);

        let field = session.add_field(&a, "id", FieldType::Uuid).unwrap();
        assert_eq!(session.history().len(), 5);

        assert!(session.update_field(&a, &field, |f| f.is_primary_key = true));
        assert_eq!(session.history().len(), 6);

        assert!(session.delete_table(&b));
        assert_eq!(session.history().len(), 7);
        assert!(session.edges().is_empty());
    }

    #[test]
    fn no_op_edits_do_not_push() {
        let (mut session, a, _) = session_with_two_tables();
        let len = session.history().len();

        assert!(!session.delete_table("ghost"));
        assert!(!session.delete_relationship("ghost"));
        assert!(session.connect(&a, "ghost", RelationType::OneToOne).is_none());
        assert!(session.add_field("ghost", "x", FieldType::Text).is_none());
        assert!(session.add_field(&a, "   ", FieldType::Text).is_none());
        assert!(!session.rename_table(&a, "table_1"));
        assert!(!session.update_field(&a, "ghost", |f| f.is_nullable = true));
        assert!(!session.finish_drag());

        // two tables added side by side already sit on the layout grid
        assert!(!session.apply_layout(grid_layout));
        assert_eq!(session.history().len(), len);

        session.add_table();
        assert!(session.apply_layout(grid_layout));
        let len = session.history().len();
        assert!(!session.apply_layout(grid_layout));
        assert_eq!(session.history().len(), len);

        let mut empty = EditorSession::new();
        empty.load(Vec::new(), Vec::new());
        assert!(!empty.reset());
        assert_eq!(empty.history().len(), 1);
        assert!(!empty.can_undo());
    }

    #[test]
    fn table_names_are_generated() {
        let (session, a, b) = session_with_two_tables();
        assert_eq!(session.node(&a).unwrap().label, "table_1");
        assert_eq!(session.node(&b).unwrap().label, "table_2");
    }

    #[test]
    fn drag_commits_once() {
        let (mut session, a, _) = session_with_two_tables();
        let len = session.history().len();
        let start = session.node(&a).unwrap().position;

        for step in 1..=10 {
            assert!(session.drag_table(&a, start.offset(step as f64, 0.0)));
        }
        assert_eq!(session.history().len(), len);
        assert!(session.can_undo());

        assert!(session.undo());
        assert_eq!(session.history().len(), len + 1);
        assert_eq!(session.node(&a).unwrap().position, start);

        assert!(session.redo());
        assert_eq!(session.node(&a).unwrap().position, start.offset(10.0, 0.0));
    }

    #[test]
    fn delete_selection_prefers_tables() {
        let (mut session, a, b) = session_with_two_tables();
        let c = session.add_table();
        let ab = session.connect(&a, &b, RelationType::OneToMany).unwrap();
        let bc = session.connect(&b, &c, RelationType::OneToMany).unwrap();
        let len = session.history().len();

        assert!(session.delete_selection(&[a.clone()], &[bc.clone()]));
        assert_eq!(session.history().len(), len + 1);
        assert!(session.node(&a).is_none());
        assert_eq!(session.edges().len(), 1);
        assert_eq!(session.edges()[0].id, bc);

        assert!(session.delete_selection(&[], &[bc, ab]));
        assert!(session.edges().is_empty());
        assert_eq!(session.history().len(), len + 2);
    }

    #[test]
    fn field_edits_round_trip_through_undo() {
        let (mut session, a, _) = session_with_two_tables();
        let field = session.add_field(&a, "email", FieldType::Varchar).unwrap();
        assert!(session.update_field(&a, &field, |f| f.field_type = f.field_type.next()));
        assert!(session.remove_field(&a, &field));
        assert!(session.node(&a).unwrap().fields.is_empty());

        session.undo();
        assert_eq!(
            session.node(&a).unwrap().fields[0].field_type,
            FieldType::Text
        );
        session.undo();
        assert_eq!(
            session.node(&a).unwrap().fields[0].field_type,
            FieldType::Varchar
        );
    }

    #[test]
    fn layout_and_reset_are_undoable() {
        let (mut session, _, _) = session_with_two_tables();
        session.add_table();
        let before = session.snapshot();

        assert!(session.apply_layout(grid_layout));
        assert_eq!(session.nodes()[2].position, Position::new(0.0, 300.0));

        assert!(session.reset());
        assert!(session.nodes().is_empty());

        session.undo();
        session.undo();
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn redo_is_lost_after_new_edit() {
        let (mut session, a, _) = session_with_two_tables();
        session.undo();
        assert!(session.can_redo());
        session.rename_table(&a, "users");
        assert!(!session.can_redo());
        let current = session.snapshot();
        assert!(!session.redo());
        assert_eq!(session.snapshot(), current);
    }
}
