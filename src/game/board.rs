use super::player::Player;

pub const BOARD_SIZE: usize = 8;
pub const NUM_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Scan order for the capture rule: W, SW, S, SE, E, NE, N, NW in (dx, dy).
const DIRECTIONS: [(isize, isize); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Black,
    White,
}

impl Cell {
    /// +1 for Black, -1 for White, 0 for Empty.
    pub fn sign(self) -> i8 {
        match self {
            Cell::Empty => 0,
            Cell::Black => 1,
            Cell::White => -1,
        }
    }

    /// The owner of a non-empty cell.
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Black => Some(Player::Black),
            Cell::White => Some(Player::White),
        }
    }
}

/// The 8x8 grid. Cells change only through [`Board::place`], which flips
/// the captured runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    /// Create the standard opening: two pieces of each color on the
    /// diagonals of the center square.
    pub fn new() -> Self {
        let mut cells = [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE];
        cells[3][3] = Cell::White;
        cells[4][4] = Cell::White;
        cells[3][4] = Cell::Black;
        cells[4][3] = Cell::Black;
        Board { cells }
    }

    /// Get the cell at (x, y).
    pub fn get(&self, x: usize, y: usize) -> Cell {
        self.cells[x][y]
    }

    /// Cells that `player` would flip by playing at (x, y).
    ///
    /// In each direction, contiguous opponent pieces are collected until the
    /// scan leaves the opponent's color; the run only counts if it ends on one
    /// of `player`'s own pieces. Occupied cells never flip anything.
    pub fn flips_for(&self, x: usize, y: usize, player: Player) -> Vec<(usize, usize)> {
        if self.cells[x][y] != Cell::Empty {
            return Vec::new();
        }

        let own = player.to_cell();
        let opponent = player.other().to_cell();
        let mut flips = Vec::new();

        for &(dx, dy) in DIRECTIONS.iter() {
            let mut run = Vec::new();
            let mut cx = x as isize + dx;
            let mut cy = y as isize + dy;
            while let Some(cell) = self.cell_at(cx, cy) {
                if cell == opponent {
                    run.push((cx as usize, cy as usize));
                } else {
                    if cell == own {
                        flips.extend_from_slice(&run);
                    }
                    break;
                }
                cx += dx;
                cy += dy;
            }
        }

        flips
    }

    /// Whether `player` may play at (x, y).
    pub fn is_legal(&self, x: usize, y: usize, player: Player) -> bool {
        !self.flips_for(x, y, player).is_empty()
    }

    /// Whether `player` has at least one legal placement.
    pub fn has_legal_move(&self, player: Player) -> bool {
        (0..BOARD_SIZE).any(|x| (0..BOARD_SIZE).any(|y| self.is_legal(x, y, player)))
    }

    /// Place a piece for `player` at (x, y), flipping every captured run.
    /// Returns the flipped cells; empty means the placement was rejected and
    /// the board is unchanged.
    pub fn place(&mut self, x: usize, y: usize, player: Player) -> Vec<(usize, usize)> {
        let flips = self.flips_for(x, y, player);
        if flips.is_empty() {
            return flips;
        }
        for &(fx, fy) in &flips {
            self.cells[fx][fy] = player.to_cell();
        }
        self.cells[x][y] = player.to_cell();
        flips
    }

    /// Number of cells holding `cell`.
    pub fn count(&self, cell: Cell) -> u32 {
        self.cells
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == cell)
            .count() as u32
    }

    /// Bounds-checked read used by the directional scan.
    fn cell_at(&self, x: isize, y: isize) -> Option<Cell> {
        if x < 0 || y < 0 || x >= BOARD_SIZE as isize || y >= BOARD_SIZE as isize {
            None
        } else {
            Some(self.cells[x as usize][y as usize])
        }
    }

    /// Swap every piece's color.
    #[cfg(test)]
    pub fn mirrored(&self) -> Board {
        let mut cells = self.cells;
        for row in cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = match *cell {
                    Cell::Empty => Cell::Empty,
                    Cell::Black => Cell::White,
                    Cell::White => Cell::Black,
                };
            }
        }
        Board { cells }
    }

    #[cfg(test)]
    pub(crate) fn from_cells(cells: [[Cell; BOARD_SIZE]; BOARD_SIZE]) -> Self {
        Board { cells }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> [[Cell; BOARD_SIZE]; BOARD_SIZE] {
        [[Cell::Empty; BOARD_SIZE]; BOARD_SIZE]
    }

    #[test]
    fn test_opening_layout() {
        let board = Board::new();
        assert_eq!(board.get(3, 3), Cell::White);
        assert_eq!(board.get(4, 4), Cell::White);
        assert_eq!(board.get(3, 4), Cell::Black);
        assert_eq!(board.get(4, 3), Cell::Black);
        assert_eq!(board.count(Cell::Empty), 60);
    }

    #[test]
    fn test_opening_black_moves() {
        let board = Board::new();
        let mut legal = Vec::new();
        for x in 0..BOARD_SIZE {
            for y in 0..BOARD_SIZE {
                if board.is_legal(x, y, Player::Black) {
                    legal.push((x, y));
                }
            }
        }
        assert_eq!(legal, vec![(2, 3), (3, 2), (4, 5), (5, 4)]);
    }

    #[test]
    fn test_place_flips_single_piece() {
        let mut board = Board::new();
        let flipped = board.place(2, 3, Player::Black);
        assert_eq!(flipped, vec![(3, 3)]);
        assert_eq!(board.get(2, 3), Cell::Black);
        assert_eq!(board.get(3, 3), Cell::Black);
        assert_eq!(board.count(Cell::Black), 4);
        assert_eq!(board.count(Cell::White), 1);
    }

    #[test]
    fn test_occupied_cell_never_legal() {
        let board = Board::new();
        assert!(board.flips_for(3, 3, Player::Black).is_empty());
        assert!(board.flips_for(3, 4, Player::White).is_empty());
    }

    #[test]
    fn test_run_without_anchor_not_captured() {
        // B W W . along row 0: White at (0,1),(0,2) are anchored by Black at (0,0)
        // only when playing at (0,3).
        let mut cells = empty();
        cells[0][1] = Cell::White;
        cells[0][2] = Cell::White;
        let board = Board::from_cells(cells);
        assert!(!board.is_legal(0, 3, Player::Black));

        cells[0][0] = Cell::Black;
        let board = Board::from_cells(cells);
        assert_eq!(board.flips_for(0, 3, Player::Black), vec![(0, 2), (0, 1)]);
    }

    #[test]
    fn test_multiple_directions_flip() {
        let mut cells = empty();
        cells[2][2] = Cell::Black;
        cells[3][3] = Cell::White;
        cells[4][2] = Cell::Black;
        cells[4][3] = Cell::White;
        let mut board = Board::from_cells(cells);
        let flipped = board.place(4, 4, Player::Black);
        assert_eq!(flipped.len(), 2);
        assert!(flipped.contains(&(3, 3)));
        assert!(flipped.contains(&(4, 3)));
        assert_eq!(board.count(Cell::White), 0);
    }

    #[test]
    fn test_rejected_place_leaves_board_unchanged() {
        let mut board = Board::new();
        let before = board;
        assert!(board.place(0, 0, Player::Black).is_empty());
        assert_eq!(board, before);
    }

    #[test]
    fn test_mirrored_swaps_colors() {
        let board = Board::new().mirrored();
        assert_eq!(board.get(3, 3), Cell::Black);
        assert_eq!(board.get(3, 4), Cell::White);
    }
}
