use crate::domain::MoveError;
use crate::protocol::{Mark, CELL_COUNT};
use serde::{Deserialize, Serialize};
use std::fmt;

/// All eight three-in-a-row lines (rows, columns, diagonals)
pub const WINNING_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Content of a single board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Marked(Mark),
}

impl Cell {
    pub fn mark(self) -> Option<Mark> {
        match self {
            Cell::Empty => None,
            Cell::Marked(mark) => Some(mark),
        }
    }

    pub fn is_empty(self) -> bool {
        matches!(self, Cell::Empty)
    }
}

/// 3×3 board in row-major order
///
/// A marked cell is never overwritten; only a whole-board reset clears it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; CELL_COUNT],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    /// Cell at `index`, or `None` if the index is off the board
    pub fn get(&self, index: u8) -> Option<Cell> {
        self.cells.get(usize::from(index)).copied()
    }

    /// Check that `index` addresses an empty cell
    pub fn check_free(&self, index: u8) -> Result<(), MoveError> {
        match self.get(index) {
            None => Err(MoveError::CellOutOfRange(index)),
            Some(Cell::Marked(_)) => Err(MoveError::CellOccupied(index)),
            Some(Cell::Empty) => Ok(()),
        }
    }

    /// Stamp `mark` on an empty cell
    pub fn place(&mut self, index: u8, mark: Mark) -> Result<(), MoveError> {
        self.check_free(index)?;
        self.cells[usize::from(index)] = Cell::Marked(mark);
        Ok(())
    }

    /// Mark owning a complete line, if any
    pub fn winner(&self) -> Option<Mark> {
        WINNING_LINES.iter().find_map(|[a, b, c]| {
            let mark = self.cells[*a].mark()?;
            (self.cells[*b].mark() == Some(mark) && self.cells[*c].mark() == Some(mark))
                .then_some(mark)
        })
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|cell| !cell.is_empty())
    }

    pub fn marked_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (row, chunk) in self.cells.chunks(3).enumerate() {
            if row > 0 {
                writeln!(f, "---+---+---")?;
            }
            let line: Vec<String> = chunk
                .iter()
                .enumerate()
                .map(|(col, cell)| match cell {
                    Cell::Empty => format!(" {} ", row * 3 + col),
                    Cell::Marked(mark) => format!(" {} ", mark),
                })
                .collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}
