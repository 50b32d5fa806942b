//! Dense live/dead cell matrix and the evolution rule.

use life_defence_core::{CellCoord, CellRect, GRID_COLUMNS, GRID_ROWS};

const CELL_COUNT: usize = (GRID_ROWS as usize) * (GRID_COLUMNS as usize);

/// Fixed-size battlefield with non-wrapping edges.
///
/// Cells outside the grid are permanently dead for neighbour counting.
#[derive(Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<bool>,
}

impl Grid {
    /// Creates a grid with every cell dead.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![false; CELL_COUNT],
        }
    }

    /// Creates a grid with exactly the provided cells alive.
    #[must_use]
    pub fn from_cells(cells: impl IntoIterator<Item = CellCoord>) -> Self {
        let mut grid = Self::new();
        for cell in cells {
            grid.set(cell, true);
        }
        grid
    }

    /// Reports whether the cell is alive. Out-of-bounds cells are dead.
    #[must_use]
    pub fn is_alive(&self, cell: CellCoord) -> bool {
        index(cell).is_some_and(|index| self.cells[index])
    }

    /// Reports whether any cell inside the rectangle is alive.
    #[must_use]
    pub fn any_alive(&self, rect: CellRect) -> bool {
        rect.cells().any(|cell| self.is_alive(cell))
    }

    /// Counts the live cells among the eight neighbours of `cell`.
    #[must_use]
    pub fn live_neighbours(&self, cell: CellCoord) -> u8 {
        let mut count = 0;
        for neighbour in cell.neighbourhood() {
            if neighbour != cell && self.is_alive(neighbour) {
                count += 1;
            }
        }
        count
    }

    /// Computes the next generation from a full snapshot of this one.
    ///
    /// A live cell survives with two or three live neighbours, a dead cell
    /// is born with exactly three; every other cell is dead afterwards.
    #[must_use]
    pub fn step(&self) -> Self {
        let mut next = vec![false; CELL_COUNT];
        for (index, slot) in next.iter_mut().enumerate() {
            let cell = coord(index);
            let neighbours = self.live_neighbours(cell);
            *slot = matches!((self.cells[index], neighbours), (true, 2 | 3) | (false, 3));
        }
        Self { cells: next }
    }

    /// Iterates over all live cells in row-major order.
    pub fn live_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(index, _)| coord(index))
    }

    /// Number of live cells.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|alive| **alive).count()
    }

    /// Renders the grid as rows of `0`/`1` values.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.cells
            .chunks(GRID_COLUMNS as usize)
            .map(|row| row.iter().map(|alive| u8::from(*alive)).collect())
            .collect()
    }

    pub(crate) fn set(&mut self, cell: CellCoord, alive: bool) {
        if let Some(index) = index(cell) {
            self.cells[index] = alive;
        } else {
            debug_assert!(false, "cell {cell:?} lies outside the grid");
        }
    }

    pub(crate) fn clear(&mut self) {
        self.cells.fill(false);
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("rows", &GRID_ROWS)
            .field("columns", &GRID_COLUMNS)
            .field("population", &self.population())
            .finish()
    }
}

fn index(cell: CellCoord) -> Option<usize> {
    if cell.row() < GRID_ROWS && cell.column() < GRID_COLUMNS {
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        Some(row * GRID_COLUMNS as usize + column)
    } else {
        None
    }
}

fn coord(index: usize) -> CellCoord {
    let columns = GRID_COLUMNS as usize;
    // Both quotient and remainder are bounded by the grid dimensions.
    CellCoord::new((index / columns) as u32, (index % columns) as u32)
}
