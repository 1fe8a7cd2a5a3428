//! Board: fixed-size grid of tiles, stored column by column. y=0 is top.

use crate::error::GameError;
use rand::Rng;

/// Single cell: either empty or a tile of a given colour index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Tile(u8), // palette index
}

impl Cell {
    #[inline]
    pub fn is_empty(self) -> bool {
        self == Self::Empty
    }

    #[inline]
    pub fn color(self) -> Option<u8> {
        match self {
            Self::Empty => None,
            Self::Tile(c) => Some(c),
        }
    }
}

/// Grid coordinate: `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// columns[x][y] = cell. Every column always holds exactly `height` cells.
    columns: Vec<Vec<Cell>>,
}

impl Board {
    /// All-empty board.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            columns: vec![vec![Cell::Empty; height]; width],
        }
    }

    /// Every cell gets a colour drawn uniformly from `0..colors`.
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        colors: u8,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        if width == 0 || height == 0 || colors == 0 {
            return Err(GameError::InvalidConfiguration(format!(
                "random board needs positive size and colours, got {width}x{height} with {colors}"
            )));
        }
        let columns = (0..width)
            .map(|_| {
                (0..height)
                    .map(|_| Cell::Tile(rng.random_range(0..colors)))
                    .collect()
            })
            .collect();
        Ok(Self {
            width,
            height,
            columns,
        })
    }

    /// Build from columns (each listed top to bottom). All columns must have the same length.
    pub fn from_columns(columns: Vec<Vec<Cell>>) -> Result<Self, GameError> {
        let width = columns.len();
        let height = columns.first().map_or(0, Vec::len);
        if width == 0 || height == 0 {
            return Err(GameError::InvalidConfiguration(
                "board must have at least one row and one column".to_string(),
            ));
        }
        if let Some(x) = columns.iter().position(|c| c.len() != height) {
            return Err(GameError::InvalidConfiguration(format!(
                "column {x} has {} cells, expected {height}",
                columns[x].len()
            )));
        }
        Ok(Self {
            width,
            height,
            columns,
        })
    }

    /// Build from rows (top row first), which reads naturally in tests and layouts.
    pub fn from_rows(rows: &[Vec<Cell>]) -> Result<Self, GameError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if let Some(y) = rows.iter().position(|r| r.len() != width) {
            return Err(GameError::InvalidConfiguration(format!(
                "row {y} has {} cells, expected {width}",
                rows[y].len()
            )));
        }
        let columns = (0..width)
            .map(|x| (0..height).map(|y| rows[y][x]).collect())
            .collect();
        Self::from_columns(columns)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> GameError {
        GameError::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Result<Cell, GameError> {
        self.columns
            .get(x)
            .and_then(|col| col.get(y))
            .copied()
            .ok_or_else(|| self.out_of_bounds(x, y))
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) -> Result<(), GameError> {
        if !self.contains(x, y) {
            return Err(self.out_of_bounds(x, y));
        }
        self.columns[x][y] = cell;
        Ok(())
    }

    /// Cell lookup for in-bounds iteration; `Empty` outside the grid.
    #[inline]
    pub(crate) fn cell(&self, x: usize, y: usize) -> Cell {
        self.columns
            .get(x)
            .and_then(|col| col.get(y))
            .copied()
            .unwrap_or(Cell::Empty)
    }

    /// One column, top to bottom.
    pub fn column(&self, x: usize) -> Option<&[Cell]> {
        self.columns.get(x).map(Vec::as_slice)
    }

    pub(crate) fn columns_mut(&mut self) -> &mut Vec<Vec<Cell>> {
        &mut self.columns
    }

    pub fn non_empty_count(&self) -> usize {
        self.columns
            .iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().flatten().all(|c| c.is_empty())
    }

    /// True if two 4-adjacent cells share a colour.
    pub fn has_adjacent_pair(&self) -> bool {
        for x in 0..self.width {
            for y in 0..self.height {
                let Cell::Tile(c) = self.cell(x, y) else {
                    continue;
                };
                if self.cell(x + 1, y) == Cell::Tile(c) || self.cell(x, y + 1) == Cell::Tile(c) {
                    return true;
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_random_fills_every_cell_within_palette() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::random(8, 5, 3, &mut rng).unwrap();
        assert_eq!(board.non_empty_count(), 40);
        for x in 0..8 {
            for y in 0..5 {
                let c = board.get(x, y).unwrap().color().unwrap();
                assert!(c < 3);
            }
        }
    }

    #[test]
    fn test_random_rejects_degenerate_input() {
        let mut rng = StdRng::seed_from_u64(7);
        for (w, h, colors) in [(0, 5, 3), (8, 0, 3), (8, 5, 0)] {
            assert!(matches!(
                Board::random(w, h, colors, &mut rng),
                Err(GameError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_get_out_of_bounds() {
        let board = Board::empty(3, 2);
        assert_eq!(
            board.get(3, 0),
            Err(GameError::OutOfBounds {
                x: 3,
                y: 0,
                width: 3,
                height: 2
            })
        );
        assert!(board.get(0, 2).is_err());
        assert_eq!(board.get(2, 1), Ok(Cell::Empty));
    }

    #[test]
    fn test_set_then_get() {
        let mut board = Board::empty(2, 2);
        board.set(1, 0, Cell::Tile(4)).unwrap();
        assert_eq!(board.get(1, 0), Ok(Cell::Tile(4)));
        assert!(board.set(2, 0, Cell::Tile(1)).is_err());
    }

    #[test]
    fn test_from_rows_is_column_major() {
        let board = Board::from_rows(&[
            vec![Cell::Tile(0), Cell::Tile(1)],
            vec![Cell::Tile(2), Cell::Empty],
        ])
        .unwrap();
        assert_eq!(board.width(), 2);
        assert_eq!(board.height(), 2);
        assert_eq!(board.column(0), Some(&[Cell::Tile(0), Cell::Tile(2)][..]));
        assert_eq!(board.column(1), Some(&[Cell::Tile(1), Cell::Empty][..]));
    }

    #[test]
    fn test_from_columns_rejects_ragged() {
        let err = Board::from_columns(vec![vec![Cell::Empty; 2], vec![Cell::Empty; 3]]);
        assert!(matches!(err, Err(GameError::InvalidConfiguration(_))));
        assert!(Board::from_columns(Vec::new()).is_err());
    }

    #[test]
    fn test_has_adjacent_pair() {
        let a = Cell::Tile(0);
        let b = Cell::Tile(1);
        let board = Board::from_rows(&[vec![a, b, a]]).unwrap();
        assert!(!board.has_adjacent_pair());
        let board = Board::from_rows(&[vec![a, b], vec![a, Cell::Empty]]).unwrap();
        assert!(board.has_adjacent_pair());
        assert!(!Board::empty(4, 4).has_adjacent_pair());
    }
}
