//! The 15×15 board and the five-in-a-row check.

/// Board edge length.
pub const BOARD_SIZE: usize = 15;

/// Stones needed in a line to win.
const WIN_LENGTH: usize = 5;

/// One cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stone {
    #[default]
    Empty,
    White,
    Black,
}

/// The grid, indexed `[row][col]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Board {
    cells: [[Stone; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts wire coordinates to indices, or `None` if off the board.
    pub fn position(row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < BOARD_SIZE && col < BOARD_SIZE).then_some((row, col))
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Stone> {
        self.cells.get(row)?.get(col).copied()
    }

    pub fn is_empty_at(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(Stone::Empty)
    }

    /// Puts `stone` at `(row, col)`. Callers check bounds and occupancy
    /// first; out-of-range coordinates are ignored.
    pub fn place(&mut self, row: usize, col: usize, stone: Stone) {
        if let Some(cell) = self.cells.get_mut(row).and_then(|r| r.get_mut(col)) {
            *cell = stone;
        }
    }

    /// Number of non-empty cells.
    pub fn stone_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| **cell != Stone::Empty)
            .count()
    }

    /// Whether the stone at `(row, col)` completes a line of five or
    /// more of `stone` along any axis. Longer lines also win.
    pub fn check_win(&self, row: usize, col: usize, stone: Stone) -> bool {
        if stone == Stone::Empty {
            return false;
        }
        const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];
        AXES.iter().any(|&(dr, dc)| {
            let line = 1
                + self.run_length(row, col, dr, dc, stone)
                + self.run_length(row, col, -dr, -dc, stone);
            line >= WIN_LENGTH
        })
    }

    /// Counts consecutive `stone`s from `(row, col)` exclusive, walking
    /// by `(dr, dc)` until the edge or a different cell.
    fn run_length(&self, row: usize, col: usize, dr: isize, dc: isize, stone: Stone) -> usize {
        let mut count = 0;
        let (mut r, mut c) = (row, col);
        loop {
            let (Some(next_r), Some(next_c)) =
                (r.checked_add_signed(dr), c.checked_add_signed(dc))
            else {
                return count;
            };
            if self.get(next_r, next_c) != Some(stone) {
                return count;
            }
            count += 1;
            (r, c) = (next_r, next_c);
        }
    }
}
