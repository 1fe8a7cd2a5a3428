//! Removal of a cluster: gravity within columns, then column compaction.

use crate::board::{Board, Cell, Position};
use crate::error::GameError;
use std::collections::BTreeMap;

/// Remove `cluster` from the board.
///
/// Tiles above a removed cell fall down by the number of removed cells below
/// them and empties fill the top of the column. A column that ends up empty is
/// dropped: every column to its right shifts one step left and an empty column
/// is appended at the right edge. Columns are handled from right to left so a
/// compaction never moves a column that still has to be processed.
///
/// The board is left untouched if the cluster is malformed (out of bounds,
/// empty cells, mixed colours or duplicates).
pub fn remove_cluster(board: &mut Board, cluster: &[Position]) -> Result<(), GameError> {
    let by_column = validate(board, cluster)?;
    let height = board.height();
    let columns = board.columns_mut();

    for (&x, rows) in by_column.iter().rev() {
        let column = &mut columns[x];
        // rows are ascending; remove bottom-most first so indices stay valid
        for &y in rows.iter().rev() {
            column.remove(y);
        }
        let removed = height - column.len();
        column.splice(0..0, std::iter::repeat_n(Cell::Empty, removed));

        if column.iter().all(|c| c.is_empty()) {
            let empty = columns.remove(x);
            columns.push(empty);
        }
    }
    Ok(())
}

/// Check the cluster and group its rows by column (ascending, no duplicates).
fn validate(
    board: &Board,
    cluster: &[Position],
) -> Result<BTreeMap<usize, Vec<usize>>, GameError> {
    let mut color = None;
    let mut by_column: BTreeMap<usize, Vec<usize>> = BTreeMap::new();

    for &Position { x, y } in cluster {
        let cell = board
            .get(x, y)
            .map_err(|e| GameError::InvalidCluster(e.to_string()))?;
        let Cell::Tile(c) = cell else {
            return Err(GameError::InvalidCluster(format!("({x}, {y}) is empty")));
        };
        match color {
            None => color = Some(c),
            Some(first) if first != c => {
                return Err(GameError::InvalidCluster(format!(
                    "({x}, {y}) has colour {c}, cluster colour is {first}"
                )));
            }
            Some(_) => {}
        }
        by_column.entry(x).or_default().push(y);
    }

    for (x, rows) in &mut by_column {
        rows.sort_unstable();
        let len = rows.len();
        rows.dedup();
        if rows.len() != len {
            return Err(GameError::InvalidCluster(format!(
                "column {x} lists a cell more than once"
            )));
        }
    }
    Ok(by_column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterMap;
    use proptest::prelude::*;

    const R: Cell = Cell::Tile(0);
    const B: Cell = Cell::Tile(1);
    const G: Cell = Cell::Tile(2);
    const E: Cell = Cell::Empty;

    fn board(rows: &[Vec<Cell>]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    fn cluster_at(b: &Board, x: usize, y: usize) -> Vec<Position> {
        ClusterMap::compute(b).cluster_at(x, y).to_vec()
    }

    #[test]
    fn test_gravity_in_single_column() {
        // top to bottom: red, red, blue
        let mut b = Board::from_columns(vec![vec![R, R, B]]).unwrap();
        let c = cluster_at(&b, 0, 0);
        remove_cluster(&mut b, &c).unwrap();
        assert_eq!(b.column(0), Some(&[E, E, B][..]));
    }

    #[test]
    fn test_cells_below_are_unaffected() {
        let mut b = Board::from_columns(vec![vec![G, R, R, B, G]]).unwrap();
        let c = cluster_at(&b, 0, 1);
        remove_cluster(&mut b, &c).unwrap();
        assert_eq!(b.column(0), Some(&[E, E, G, B, G][..]));
    }

    #[test]
    fn test_split_removal_in_column() {
        // R at rows 1 and 3 belong to one cluster through column 1
        let mut b = board(&[
            vec![G, B],
            vec![R, R],
            vec![B, R],
            vec![R, R],
        ]);
        let c = cluster_at(&b, 0, 1);
        assert_eq!(c.len(), 5);
        remove_cluster(&mut b, &c).unwrap();
        assert_eq!(b.column(0), Some(&[E, E, G, B][..]));
        assert_eq!(b.column(1), Some(&[E, E, E, B][..]));
    }

    #[test]
    fn test_emptied_column_compacts_left() {
        let mut b = board(&[
            vec![B, R, G],
            vec![B, R, G],
        ]);
        let c = cluster_at(&b, 1, 0);
        remove_cluster(&mut b, &c).unwrap();
        assert_eq!(b.column(0), Some(&[B, B][..]));
        assert_eq!(b.column(1), Some(&[G, G][..]));
        assert_eq!(b.column(2), Some(&[E, E][..]));
    }

    #[test]
    fn test_several_emptied_columns_compact() {
        let mut b = board(&[vec![R, B, G, B, R], vec![R, R, R, R, R]]);
        let c = cluster_at(&b, 0, 0);
        assert_eq!(c.len(), 7);
        remove_cluster(&mut b, &c).unwrap();
        assert_eq!(b.column(0), Some(&[E, B][..]));
        assert_eq!(b.column(1), Some(&[E, G][..]));
        assert_eq!(b.column(2), Some(&[E, B][..]));
        assert_eq!(b.column(3), Some(&[E, E][..]));
        assert_eq!(b.column(4), Some(&[E, E][..]));
    }

    #[test]
    fn test_whole_board_cleared() {
        let mut b = board(&[vec![R, R]]);
        let c = cluster_at(&b, 0, 0);
        remove_cluster(&mut b, &c).unwrap();
        assert!(b.is_empty());
        assert_eq!(b.width(), 2);
    }

    #[test]
    fn test_invalid_clusters_are_rejected() {
        let original = board(&[vec![R, B], vec![E, R]]);
        let mut b = original.clone();
        let mixed = [Position::new(0, 0), Position::new(1, 0)];
        assert!(matches!(remove_cluster(&mut b, &mixed), Err(GameError::InvalidCluster(_))));
        let outside = [Position::new(0, 0), Position::new(5, 0)];
        assert!(matches!(remove_cluster(&mut b, &outside), Err(GameError::InvalidCluster(_))));
        let empty = [Position::new(0, 1)];
        assert!(matches!(remove_cluster(&mut b, &empty), Err(GameError::InvalidCluster(_))));
        let dup = [Position::new(0, 0), Position::new(0, 0)];
        assert!(matches!(remove_cluster(&mut b, &dup), Err(GameError::InvalidCluster(_))));
        assert_eq!(b, original);
    }

    fn arb_full_board() -> impl Strategy<Value = Board> {
        (1usize..7, 1usize..7).prop_flat_map(|(w, h)| {
            proptest::collection::vec(0u8..3, w * h).prop_map(move |cells| {
                let columns = cells
                    .chunks(h)
                    .map(|col| col.iter().copied().map(Cell::Tile).collect())
                    .collect();
                Board::from_columns(columns).unwrap()
            })
        })
    }

    proptest! {
        #[test]
        fn removal_conserves_size_and_shape(b in arb_full_board(), pick in any::<prop::sample::Index>()) {
            let map = ClusterMap::compute(&b);
            let clusters: Vec<_> = map.clusters().collect();
            let cluster = clusters[pick.index(clusters.len())].to_vec();
            let before = b.non_empty_count();
            let mut after = b.clone();
            remove_cluster(&mut after, &cluster).unwrap();

            prop_assert_eq!(after.non_empty_count(), before - cluster.len());
            prop_assert_eq!(after.width(), b.width());
            for x in 0..after.width() {
                let column = after.column(x).unwrap();
                prop_assert_eq!(column.len(), b.height());
                // no tile floats above an empty cell
                let first_tile = column.iter().position(|c| !c.is_empty()).unwrap_or(column.len());
                prop_assert!(column[first_tile..].iter().all(|c| !c.is_empty()));
            }
            // empty columns only at the right edge
            let first_empty = (0..after.width())
                .find(|&x| after.column(x).unwrap().iter().all(|c| c.is_empty()))
                .unwrap_or(after.width());
            for x in first_empty..after.width() {
                prop_assert!(after.column(x).unwrap().iter().all(|c| c.is_empty()));
            }
        }
    }
}
