use crate::editor::store::GraphStore;
use crate::types::{GraphSnapshot, RelationshipEdge, TableNode};
use tracing::debug;

/// Snapshot-based undo/redo timeline over a [`GraphStore`].
///
/// `index` is `None` exactly when the timeline is empty; otherwise it points
/// at the snapshot matching the store's current content.
#[derive(Debug, Default)]
pub struct HistoryManager {
    history: Vec<GraphSnapshot>,
    index: Option<usize>,
}

impl HistoryManager {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor position, `-1` when the timeline is empty
    pub fn history_index(&self) -> isize {
        self.index.map_or(-1, |i| i as isize)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> Option<&GraphSnapshot> {
        self.index.and_then(|i| self.history.get(i))
    }

    /// Record the store's current content, dropping any redo branch
    pub fn save(&mut self, store: &GraphStore) {
        let keep = self.index.map_or(0, |i| i + 1);
        let discarded = self.history.len().saturating_sub(keep);
        self.history.truncate(keep);
        self.history.push(store.snapshot());
        self.index = Some(self.history.len() - 1);
        debug!(
            index = self.history.len() - 1,
            len = self.history.len(),
            discarded,
            "history saved"
        );
    }

    pub fn undo(&mut self, store: &mut GraphStore) -> bool {
        match self.index {
            Some(i) if i > 0 => self.move_to(i - 1, store),
            _ => false,
        }
    }

    pub fn redo(&mut self, store: &mut GraphStore) -> bool {
        match self.index {
            Some(i) if i + 1 < self.history.len() => self.move_to(i + 1, store),
            _ => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.index, Some(i) if i > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.index, Some(i) if i + 1 < self.history.len())
    }

    /// Replace the store's content and reset the timeline to a single baseline
    pub fn load(
        &mut self,
        store: &mut GraphStore,
        nodes: Vec<TableNode>,
        edges: Vec<RelationshipEdge>,
    ) {
        store.replace_all(nodes, edges);
        self.history.clear();
        self.history.push(store.snapshot());
        self.index = Some(0);
        debug!("history re-baselined");
    }

    fn move_to(&mut self, index: usize, store: &mut GraphStore) -> bool {
        self.index = Some(index);
        let Some(snapshot) = self.current() else {
            return false;
        };
        store.restore(snapshot);
        debug!(index, len = self.history.len(), "history cursor moved");
        true
    }
}
