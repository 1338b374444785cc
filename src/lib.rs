//! # Minegrid
//!
//! `minegrid` is a library to handle the state of a grid-reveal mine puzzle:
//! a square board is seeded with hidden mines, and the player opens cells and
//! flags suspected mines, winning once every safe cell is open.
//!
//! The engine is deliberately small. Opening a safe cell reveals the cell and
//! its immediate ring of safe neighbors, and nothing further: there is no
//! recursive cascade through zero-count regions. Front-ends drive the engine
//! through [`Game::open`] and [`Game::toggle_flag`] and render it through the
//! read-only accessors.

use std::cmp;
use std::fmt::{self, Display};

use log::{debug, warn};
use rand::prelude::*;

/// A mine puzzle game.
pub struct Game {
    board: Board,
}

impl Game {
    /// Create a new game, placing mines with the thread-local RNG.
    pub fn new(config: Config) -> Game {
        Game::with_rng(config, &mut rand::thread_rng())
    }

    /// Create a new game, placing mines with the supplied RNG.
    ///
    /// Useful for reproducible boards; [`Game::new`] is the common path.
    pub fn with_rng(config: Config, rng: &mut impl Rng) -> Game {
        Game {
            board: Board::new(config, rng),
        }
    }

    /// Open the cell at `(x, y)`.
    ///
    /// Opening a safe closed cell also opens every closed, unflagged, safe
    /// cell in its immediate ring. Opening an unflagged mine signals
    /// [`Outcome::MineHit`]; a flag fully protects a mine from a losing
    /// click. Out-of-bounds coordinates and already-open or flagged targets
    /// are no-ops that signal [`Outcome::Continue`].
    pub fn open(&mut self, x: usize, y: usize) -> Outcome {
        self.board.open(x, y)
    }

    /// Toggle the flag on the cell at `(x, y)`.
    ///
    /// A closed cell becomes flagged and a flagged cell becomes closed; an
    /// open cell is left alone. Out-of-bounds coordinates are a no-op.
    pub fn toggle_flag(&mut self, x: usize, y: usize) {
        self.board.toggle_flag(x, y);
    }

    /// Check if every safe cell has been opened.
    ///
    /// Mines never need to be flagged (or touched at all) to win.
    pub fn is_finished(&self) -> bool {
        self.board.is_finished()
    }

    /// Get the board side length.
    pub fn size(&self) -> usize {
        self.board.size
    }

    /// Get the number of mines on the board.
    pub fn mines(&self) -> usize {
        self.board.mine_count
    }

    /// Count the currently flagged cells.
    pub fn flagged(&self) -> usize {
        self.board.flagged()
    }

    /// Get the visibility of the cell at `(x, y)`, or `None` out of bounds.
    pub fn visibility(&self, x: usize, y: usize) -> Option<Visibility> {
        self.board.visible.get(y)?.get(x).copied()
    }

    /// Get the neighbor-mine count of the cell at `(x, y)`.
    ///
    /// Returns `None` out of bounds and for mine cells, which hold no count.
    pub fn neighbor_mines(&self, x: usize, y: usize) -> Option<u8> {
        match self.board.mines.get(y)?.get(x)? {
            Cell::Count(n) => Some(*n),
            Cell::Mine => None,
        }
    }

    /// Check if the cell at `(x, y)` is a mine; out of bounds is not a mine.
    ///
    /// Intended for end-of-game reveals.
    pub fn is_mine(&self, x: usize, y: usize) -> bool {
        self.board.is_mine(x, y)
    }

    /// Get an end-of-game view of the board with every mine uncovered.
    pub fn reveal(&self) -> Reveal {
        Reveal { board: &self.board }
    }
}

impl Display for Game {
    /// Display the game.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let remaining = self.board.mine_count as isize - self.board.flagged() as isize;
        writeln!(f, "mines left: {}", remaining)?;
        write!(f, "{}", self.board)
    }
}

/// Game configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    size: usize,
    mines: usize,
}

impl Config {
    /// Create a new Config.
    ///
    /// The board side is clamped to at least 1 and the mine count to the
    /// board area.
    pub fn new(size: usize, mines: usize) -> Config {
        let size = cmp::max(size, 1);
        let area = size * size;
        if mines > area {
            warn!("mine count {} exceeds board area, clamped to {}", mines, area);
        }
        Config {
            size,
            mines: cmp::min(mines, area),
        }
    }
}

impl Default for Config {
    /// An 8x8 board with 10 mines.
    fn default() -> Config {
        Config::new(8, 10)
    }
}

/// Board on which the game is played.
///
/// Two parallel grids: `mines` is fixed at construction, `visible` is the
/// only thing the player's moves touch. Both are indexed `[y][x]`.
#[derive(Debug)]
struct Board {
    size: usize,
    mines: Vec<Vec<Cell>>,
    visible: Vec<Vec<Visibility>>,
    mine_count: usize,
}

// Accessors for Board
impl Board {
    /// Check if a coordinate lies on the board.
    fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.size && y < self.size
    }

    /// Apply a ring offset, returning the neighbor only while on the board.
    fn offset(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        self.in_bounds(nx, ny).then_some((nx, ny))
    }

    /// Check if the cell at `(x, y)` is a mine; out of bounds is not a mine.
    fn is_mine(&self, x: usize, y: usize) -> bool {
        self.in_bounds(x, y) && matches!(self.mines[y][x], Cell::Mine)
    }

    /// Count the flagged cells.
    fn flagged(&self) -> usize {
        self.visible
            .iter()
            .flatten()
            .filter(|&&v| v == Visibility::Flagged)
            .count()
    }
}

// Game logic for Board
impl Board {
    /// Create a new Board with mines placed and neighbor counts derived.
    fn new(config: Config, rng: &mut impl Rng) -> Board {
        let Config { size, mines } = config;

        let mut board = Board {
            size,
            mines: vec![vec![Cell::Count(0); size]; size],
            visible: vec![vec![Visibility::Closed; size]; size],
            mine_count: mines,
        };
        board.place_mines(rng);
        board.count_neighbors();
        board
    }

    /// Randomly place `mine_count` mines.
    ///
    /// Rejection sampling: draw uniform coordinates and retry duplicates
    /// until enough distinct cells are mined. `mine_count` never exceeds the
    /// board area (see [`Config::new`]), so this terminates.
    fn place_mines(&mut self, rng: &mut impl Rng) {
        let mut placed = 0;
        while placed < self.mine_count {
            let x = rng.gen_range(0..self.size);
            let y = rng.gen_range(0..self.size);
            if !matches!(self.mines[y][x], Cell::Mine) {
                self.mines[y][x] = Cell::Mine;
                placed += 1;
            }
        }
        debug!("placed {} mines on a {}x{} board", placed, self.size, self.size);
    }

    /// Store the neighbor-mine count in every non-mine cell.
    ///
    /// Computed once after placement; the mine layer never changes again.
    fn count_neighbors(&mut self) {
        for y in 0..self.size {
            for x in 0..self.size {
                if matches!(self.mines[y][x], Cell::Mine) {
                    continue;
                }

                let mut count = 0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        // Skip counting self
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        if let Some((nx, ny)) = self.offset(x, y, dx, dy) {
                            count += self.is_mine(nx, ny) as u8;
                        }
                    }
                }
                self.mines[y][x] = Cell::Count(count);
            }
        }
    }

    /// Open the cell at `(x, y)`.
    fn open(&mut self, x: usize, y: usize) -> Outcome {
        // An invalid coordinate never reports a loss.
        if !self.in_bounds(x, y) {
            return Outcome::Continue;
        }

        // A flag protects a mine from the losing click.
        if self.visible[y][x] != Visibility::Flagged && matches!(self.mines[y][x], Cell::Mine) {
            return Outcome::MineHit;
        }

        // Open and flagged targets are left alone.
        if self.visible[y][x] != Visibility::Closed {
            return Outcome::Continue;
        }

        // Sweep the target's ring, offset (0, 0) included, so the target
        // opens through the same pass as its neighbors. Already-open cells
        // are untouched, which is what stops the reveal at one ring.
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some((nx, ny)) = self.offset(x, y, dx, dy) else {
                    continue;
                };
                if matches!(self.mines[ny][nx], Cell::Mine)
                    || self.visible[ny][nx] == Visibility::Flagged
                {
                    continue;
                }
                if self.visible[ny][nx] == Visibility::Closed {
                    self.visible[ny][nx] = Visibility::Open;
                }
            }
        }

        Outcome::Continue
    }

    /// Toggle the flag on the cell at `(x, y)`.
    ///
    /// Out-of-bounds coordinates are a no-op, matching `open`.
    fn toggle_flag(&mut self, x: usize, y: usize) {
        if !self.in_bounds(x, y) {
            return;
        }

        match self.visible[y][x] {
            Visibility::Closed => self.visible[y][x] = Visibility::Flagged,
            Visibility::Flagged => self.visible[y][x] = Visibility::Closed,
            Visibility::Open => (),
        }
    }

    /// Check if every safe cell has been opened.
    fn is_finished(&self) -> bool {
        let mut settled = 0;
        for y in 0..self.size {
            for x in 0..self.size {
                match (self.mines[y][x], self.visible[y][x]) {
                    (Cell::Mine, _) => settled += 1,
                    (Cell::Count(_), Visibility::Open) => settled += 1,
                    _ => (),
                }
            }
        }
        settled == self.size * self.size
    }
}

impl Display for Board {
    /// Display the game board.
    ///
    /// | Cell            | Char |
    /// | --------------- | ---- |
    /// | closed          | `◻`  |
    /// | flagged         | `⚑`  |
    /// | open, count 0   | ` `  |
    /// | open, count `n` | `n`  |
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Column rail
        write!(f, "  ")?;
        for x in 0..self.size {
            write!(f, " {}", x % 10)?;
        }
        writeln!(f)?;

        for y in 0..self.size {
            write!(f, "{:2}", y)?;
            for x in 0..self.size {
                match self.visible[y][x] {
                    Visibility::Closed => write!(f, " ◻")?,
                    Visibility::Flagged => write!(f, " ⚑")?,
                    Visibility::Open => match self.mines[y][x] {
                        Cell::Count(0) => write!(f, "  ")?,
                        Cell::Count(n) => write!(f, " {}", n)?,
                        // Unreachable in play: mines never open.
                        Cell::Mine => write!(f, " *")?,
                    },
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// End-of-game view of a board, uncovering every mine.
///
/// Obtained from [`Game::reveal`]; both front-ends print it after a win or
/// a losing click.
pub struct Reveal<'a> {
    board: &'a Board,
}

impl Display for Reveal<'_> {
    /// Display the board with mines as `*` and safe cells as their counts.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for y in 0..self.board.size {
            for x in 0..self.board.size {
                match self.board.mines[y][x] {
                    Cell::Mine => write!(f, " *")?,
                    Cell::Count(0) => write!(f, "  ")?,
                    Cell::Count(n) => write!(f, " {}", n)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A cell of the mine layer.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Cell {
    /// A hidden mine.
    Mine,
    /// A safe cell holding the number of mines among its up-to-8 neighbors.
    Count(u8),
}

/// The visibility of a board cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Closed,
    Open,
    Flagged,
}

/// The outcome of opening a cell.
///
/// Hitting a mine is an ordinary result the caller acts on, not an error;
/// the engine performs no terminal transition of its own.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The game goes on.
    Continue,
    /// An unflagged mine was opened; the caller decides to end the session.
    MineHit,
}

impl Outcome {
    /// Check if this outcome is a losing click.
    pub fn is_mine_hit(self) -> bool {
        matches!(self, Outcome::MineHit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Build a game with mines at known positions.
    fn rigged(size: usize, mines: &[(usize, usize)]) -> Game {
        let mut board = Board {
            size,
            mines: vec![vec![Cell::Count(0); size]; size],
            visible: vec![vec![Visibility::Closed; size]; size],
            mine_count: mines.len(),
        };
        for &(x, y) in mines {
            board.mines[y][x] = Cell::Mine;
        }
        board.count_neighbors();
        Game { board }
    }

    fn seeded(config: Config, seed: u64) -> Game {
        Game::with_rng(config, &mut StdRng::seed_from_u64(seed))
    }

    fn count_mines(game: &Game) -> usize {
        let n = game.size();
        (0..n)
            .flat_map(|y| (0..n).map(move |x| (x, y)))
            .filter(|&(x, y)| game.is_mine(x, y))
            .count()
    }

    #[test]
    fn placement_yields_exact_mine_count() {
        for seed in 0..8 {
            let game = seeded(Config::new(8, 10), seed);
            assert_eq!(count_mines(&game), 10);
        }
    }

    #[test]
    fn excess_mine_count_is_clamped_to_area() {
        let game = seeded(Config::new(3, 100), 1);
        assert_eq!(game.mines(), 9);
        assert_eq!(count_mines(&game), 9);
    }

    #[test]
    fn board_starts_closed() {
        let game = seeded(Config::default(), 2);
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(game.visibility(x, y), Some(Visibility::Closed));
            }
        }
    }

    #[test]
    fn neighbor_counts_match_adjacent_mines() {
        // mine 1 0
        //  2   2 1
        //  1 mine 1
        let game = rigged(3, &[(0, 0), (1, 2)]);

        assert_eq!(game.neighbor_mines(1, 0), Some(1));
        assert_eq!(game.neighbor_mines(2, 0), Some(0));
        assert_eq!(game.neighbor_mines(0, 1), Some(2));
        assert_eq!(game.neighbor_mines(1, 1), Some(2));
        assert_eq!(game.neighbor_mines(2, 1), Some(1));
        assert_eq!(game.neighbor_mines(0, 2), Some(1));
        assert_eq!(game.neighbor_mines(2, 2), Some(1));
        // Mine cells hold no count.
        assert_eq!(game.neighbor_mines(0, 0), None);
    }

    #[test]
    fn counts_agree_with_recount_on_random_boards() {
        for seed in 0..4 {
            let game = seeded(Config::new(6, 12), seed);
            for y in 0..6 {
                for x in 0..6 {
                    if game.is_mine(x, y) {
                        continue;
                    }
                    let mut expect = 0;
                    for dy in -1isize..=1 {
                        for dx in -1isize..=1 {
                            if dx == 0 && dy == 0 {
                                continue;
                            }
                            let nx = x.wrapping_add_signed(dx);
                            let ny = y.wrapping_add_signed(dy);
                            expect += game.is_mine(nx, ny) as u8;
                        }
                    }
                    assert_eq!(game.neighbor_mines(x, y), Some(expect));
                }
            }
        }
    }

    #[test]
    fn open_out_of_bounds_is_a_noop() {
        let mut game = rigged(3, &[(1, 1)]);
        let before = game.board.visible.clone();

        assert_eq!(game.open(3, 0), Outcome::Continue);
        assert_eq!(game.open(0, 3), Outcome::Continue);
        assert_eq!(game.open(usize::MAX, usize::MAX), Outcome::Continue);
        assert_eq!(game.board.visible, before);
    }

    #[test]
    fn open_on_mine_is_a_hit_and_mutates_nothing() {
        let mut game = rigged(3, &[(1, 1)]);
        let before = game.board.visible.clone();

        assert_eq!(game.open(1, 1), Outcome::MineHit);
        assert_eq!(game.board.visible, before);
    }

    #[test]
    fn flag_protects_a_mine_from_a_losing_click() {
        let mut game = rigged(8, &[(2, 3)]);
        game.toggle_flag(2, 3);

        assert_eq!(game.open(2, 3), Outcome::Continue);
        assert_eq!(game.visibility(2, 3), Some(Visibility::Flagged));
    }

    #[test]
    fn open_reveals_the_target_and_its_ring() {
        let game = {
            let mut game = rigged(5, &[]);
            assert_eq!(game.open(2, 2), Outcome::Continue);
            game
        };

        for y in 0..5usize {
            for x in 0..5usize {
                let ring = x.abs_diff(2) <= 1 && y.abs_diff(2) <= 1;
                let expect = if ring { Visibility::Open } else { Visibility::Closed };
                assert_eq!(game.visibility(x, y), Some(expect), "cell ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn open_never_reveals_mine_or_flagged_neighbors() {
        let mut game = rigged(3, &[(0, 0)]);
        game.toggle_flag(2, 2);

        assert_eq!(game.open(1, 1), Outcome::Continue);
        assert_eq!(game.visibility(0, 0), Some(Visibility::Closed));
        assert_eq!(game.visibility(2, 2), Some(Visibility::Flagged));
        assert_eq!(game.visibility(1, 1), Some(Visibility::Open));
        assert_eq!(game.visibility(1, 0), Some(Visibility::Open));
    }

    #[test]
    fn open_does_not_cascade_past_one_ring() {
        // A fully safe board: the far corner must stay closed until the
        // player works over to it ring by ring.
        let mut game = rigged(5, &[]);

        assert_eq!(game.open(0, 0), Outcome::Continue);
        assert_eq!(game.visibility(1, 1), Some(Visibility::Open));
        assert_eq!(game.visibility(2, 2), Some(Visibility::Closed));
        assert_eq!(game.visibility(4, 4), Some(Visibility::Closed));
    }

    #[test]
    fn open_on_an_open_cell_is_a_noop() {
        let mut game = rigged(5, &[(4, 4)]);
        assert_eq!(game.open(0, 0), Outcome::Continue);
        let before = game.board.visible.clone();

        // Re-opening must not spread a second ring through (1, 1).
        assert_eq!(game.open(1, 1), Outcome::Continue);
        assert_eq!(game.board.visible, before);
    }

    #[test]
    fn open_on_a_flagged_safe_cell_is_a_noop() {
        let mut game = rigged(3, &[(0, 0)]);
        game.toggle_flag(2, 2);
        let before = game.board.visible.clone();

        assert_eq!(game.open(2, 2), Outcome::Continue);
        assert_eq!(game.board.visible, before);
    }

    #[test]
    fn toggle_flag_round_trips_a_closed_cell() {
        let mut game = rigged(3, &[]);

        game.toggle_flag(1, 1);
        assert_eq!(game.visibility(1, 1), Some(Visibility::Flagged));
        game.toggle_flag(1, 1);
        assert_eq!(game.visibility(1, 1), Some(Visibility::Closed));
    }

    #[test]
    fn toggle_flag_on_an_open_cell_is_a_noop() {
        let mut game = rigged(3, &[]);
        assert_eq!(game.open(0, 0), Outcome::Continue);

        game.toggle_flag(0, 0);
        assert_eq!(game.visibility(0, 0), Some(Visibility::Open));
    }

    #[test]
    fn toggle_flag_out_of_bounds_is_a_noop() {
        let mut game = rigged(3, &[]);
        let before = game.board.visible.clone();

        game.toggle_flag(9, 9);
        assert_eq!(game.board.visible, before);
    }

    #[test]
    fn flagged_counts_flags() {
        let mut game = rigged(4, &[(0, 0)]);
        assert_eq!(game.flagged(), 0);

        game.toggle_flag(0, 0);
        game.toggle_flag(3, 3);
        assert_eq!(game.flagged(), 2);

        game.toggle_flag(3, 3);
        assert_eq!(game.flagged(), 1);
    }

    #[test]
    fn finished_once_every_safe_cell_is_open() {
        let mut game = rigged(2, &[(0, 0)]);
        assert!(!game.is_finished());

        assert_eq!(game.open(1, 1), Outcome::Continue);
        // The ring around (1, 1) covers every safe cell.
        assert!(game.is_finished());
    }

    #[test]
    fn finished_ignores_flags_on_mines() {
        let mut game = rigged(2, &[(0, 0)]);
        assert_eq!(game.open(1, 1), Outcome::Continue);
        game.toggle_flag(0, 0);

        assert!(game.is_finished());
    }

    #[test]
    fn empty_board_opens_out_without_a_hit() {
        let mut game = seeded(Config::new(8, 0), 3);

        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(game.open(x, y), Outcome::Continue);
            }
        }
        for y in 0..8 {
            for x in 0..8 {
                assert_eq!(game.visibility(x, y), Some(Visibility::Open));
            }
        }
        assert!(game.is_finished());
    }

    #[test]
    fn single_cell_mine_board_is_vacuously_won() {
        let mut game = seeded(Config::new(1, 1), 4);

        // No safe cells to open, so the win condition already holds.
        assert!(game.is_finished());
        assert_eq!(game.open(0, 0), Outcome::MineHit);
    }

    #[test]
    fn reveal_uncovers_every_mine() {
        // Mines render as `*`, counts as digits, zeros as blanks.
        let game = rigged(3, &[(0, 0)]);
        assert_eq!(game.reveal().to_string(), " * 1  \n 1 1  \n      \n");
    }

    #[test]
    fn config_clamps_size_to_at_least_one() {
        let mut game = seeded(Config::new(0, 0), 5);
        assert_eq!(game.size(), 1);
        assert!(!game.is_finished());
        assert_eq!(game.open(0, 0), Outcome::Continue);
        assert!(game.is_finished());
    }
}
