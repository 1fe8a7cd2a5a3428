//! Connected same-colour groups ("clusters") over a board snapshot.

use crate::board::{Board, Cell, Position};

/// Smallest cluster the player may remove.
pub const MIN_REMOVABLE: usize = 2;

const NEIGHBOURS_4: [(isize, isize); 4] = [(0, -1), (-1, 0), (1, 0), (0, 1)];

/// Partition of the non-empty cells of a board into clusters.
///
/// Each tile carries a cluster id; `members[id]` lists the positions of that
/// cluster. Empty cells have no id. The map is a snapshot: it is rebuilt from
/// scratch after every change to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterMap {
    /// ids[x][y]
    ids: Vec<Vec<Option<usize>>>,
    members: Vec<Vec<Position>>,
}

impl ClusterMap {
    /// Flood-fill every unassigned tile with an explicit stack.
    pub fn compute(board: &Board) -> Self {
        let (w, h) = (board.width(), board.height());
        let mut ids = vec![vec![None; h]; w];
        let mut members: Vec<Vec<Position>> = Vec::new();

        for x in 0..w {
            for y in 0..h {
                let Cell::Tile(color) = board.cell(x, y) else {
                    continue;
                };
                if ids[x][y].is_some() {
                    continue;
                }

                let id = members.len();
                let mut group = Vec::new();
                let mut stack = vec![Position::new(x, y)];
                ids[x][y] = Some(id);

                while let Some(pos) = stack.pop() {
                    group.push(pos);
                    for (dx, dy) in NEIGHBOURS_4 {
                        let (Some(nx), Some(ny)) =
                            (pos.x.checked_add_signed(dx), pos.y.checked_add_signed(dy))
                        else {
                            continue;
                        };
                        if nx >= w || ny >= h || ids[nx][ny].is_some() {
                            continue;
                        }
                        if board.cell(nx, ny) == Cell::Tile(color) {
                            ids[nx][ny] = Some(id);
                            stack.push(Position::new(nx, ny));
                        }
                    }
                }
                members.push(group);
            }
        }

        Self { ids, members }
    }

    /// Cluster id of the tile at (x, y); `None` for empty or out-of-range cells.
    #[inline]
    pub fn id_at(&self, x: usize, y: usize) -> Option<usize> {
        self.ids.get(x).and_then(|col| col.get(y)).copied().flatten()
    }

    /// Cluster containing (x, y), singletons included. Empty slice for empty or out-of-range cells.
    pub fn cluster_at(&self, x: usize, y: usize) -> &[Position] {
        self.id_at(x, y)
            .map_or(&[][..], |id| self.members[id].as_slice())
    }

    /// Like [`Self::cluster_at`] but only if the cluster can be removed.
    pub fn removable_at(&self, x: usize, y: usize) -> Option<&[Position]> {
        let cluster = self.cluster_at(x, y);
        (cluster.len() >= MIN_REMOVABLE).then_some(cluster)
    }

    pub fn has_removable(&self) -> bool {
        self.members.iter().any(|m| m.len() >= MIN_REMOVABLE)
    }

    /// All clusters, singletons included.
    pub fn clusters(&self) -> impl Iterator<Item = &[Position]> {
        self.members.iter().map(Vec::as_slice)
    }

    pub fn removable_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.len() >= MIN_REMOVABLE)
            .count()
    }
}
