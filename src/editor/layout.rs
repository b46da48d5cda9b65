use crate::types::{Position, RelationshipEdge, TableNode};

/// Layout strategy: takes the current graph and returns repositioned nodes
pub type LayoutFn = fn(&[TableNode], &[RelationshipEdge]) -> Vec<TableNode>;

/// Distance between grid cells, in canvas units
pub const GRID_SPACING: f64 = 300.0;

/// Arrange tables on a square-ish grid, preserving their order
pub fn grid_layout(nodes: &[TableNode], _edges: &[RelationshipEdge]) -> Vec<TableNode> {
    let per_row = (nodes.len() as f64).sqrt().ceil().max(1.0) as usize;

    nodes
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let row = index / per_row;
            let col = index % per_row;
            TableNode {
                position: Position::new(col as f64 * GRID_SPACING, row as f64 * GRID_SPACING),
                ..node.clone()
            }
        })
        .collect()
}

/// Smallest `table_N` not already taken
pub fn generate_table_name<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: Vec<&str> = existing.into_iter().collect();
    (1..)
        .map(|n| format!("table_{}", n))
        .find(|name| !taken.contains(&name.as_str()))
        .unwrap_or_else(|| "table".to_string())
}

/// Spot for a newly added table: the next free cell after the existing ones
pub fn next_free_position(nodes: &[TableNode]) -> Position {
    let index = nodes.len();
    let per_row = 4;
    Position::new(
        (index % per_row) as f64 * GRID_SPACING,
        (index / per_row) as f64 * GRID_SPACING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: &str) -> TableNode {
        TableNode::new(id, id, Position::new(-5.0, 42.0))
    }

    #[test]
    fn grid_layout_uses_square_rows() {
        let nodes: Vec<TableNode> = (0..5).map(|i| table(&format!("t{}", i))).collect();
        let laid_out = grid_layout(&nodes, &[]);

        let positions: Vec<(f64, f64)> = laid_out
            .iter()
            .map(|n| (n.position.x, n.position.y))
            .collect();
        assert_eq!(
            positions,
            vec![
                (0.0, 0.0),
                (300.0, 0.0),
                (600.0, 0.0),
                (0.0, 300.0),
                (300.0, 300.0)
            ]
        );
        assert_eq!(laid_out[3].id, "t3");
    }

    #[test]
    fn grid_layout_of_nothing_is_nothing() {
        assert!(grid_layout(&[], &[]).is_empty());
    }

    #[test]
    fn table_names_fill_first_gap() {
        assert_eq!(generate_table_name([]), "table_1");
        assert_eq!(generate_table_name(["table_1", "users", "table_3"]), "table_2");
        assert_eq!(generate_table_name(["table_1", "table_2"]), "table_3");
    }
}
