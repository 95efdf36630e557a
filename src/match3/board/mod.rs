pub(crate) mod fill;
pub(crate) mod grid;
pub(crate) mod pretty;
pub(crate) mod queries;
pub(crate) mod shuffle;
pub(crate) mod virtual_board;

use rand::{SeedableRng, rngs::StdRng};

use super::prelude::*;

pub use grid::Grid;
pub use virtual_board::{CellUpdate, VirtualBoard};

/// A match-3 board: the cell grid, the pool of pieces it may spawn, the move counter and the
/// strategies used to roll pieces and detect sequences.
///
/// The board never refuses gameplay calls while locked; locking is only a signal for the caller.
pub struct Board {
    /// Requested dimensions; the grid takes them on the next preparation.
    grid_width: usize,
    grid_height: usize,

    /// Empty until prepared, then exactly `grid_width * grid_height` cells.
    grid: Grid,

    /// Distinct piece definitions to roll from.
    available_pieces: Vec<Piece>,

    fill_mode: FillMode,
    remaining_moves: u32,
    locked: bool,

    /// Positions that may not hold pieces, reapplied whenever the grid is rebuilt.
    disabled: Vec<Coord>,

    generator: Box<dyn PieceGenerator>,
    finder: Box<dyn SequenceFinder>,

    /// Randomness for the board's own decisions (shuffle pairings).
    rng: StdRng,

    events: Notifier<BoardEvent>,
}

impl std::fmt::Debug for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Board")
            .field("grid_width", &self.grid_width)
            .field("grid_height", &self.grid_height)
            .field("available_pieces", &self.available_pieces.len())
            .field("fill_mode", &self.fill_mode)
            .field("remaining_moves", &self.remaining_moves)
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}

impl Board {
    /// Creates an unprepared board. Dimensions below three are raised to three; missing strategies
    /// fall back to a [PieceWeightGenerator] and a [LinearSequenceFinder].
    pub fn new(
        width: usize,
        height: usize,
        initial_moves: u32,
        generator: Option<Box<dyn PieceGenerator>>,
        finder: Option<Box<dyn SequenceFinder>>,
    ) -> Board {
        Board {
            grid_width: width.max(MIN_GRID_WIDTH),
            grid_height: height.max(MIN_GRID_HEIGHT),
            grid: Grid::default(),
            available_pieces: vec![],
            fill_mode: FillMode::default(),
            remaining_moves: initial_moves,
            locked: false,
            disabled: vec![],
            generator: generator.unwrap_or_else(|| Box::new(PieceWeightGenerator::new())),
            finder: finder.unwrap_or_else(|| Box::new(LinearSequenceFinder::new())),
            rng: StdRng::from_os_rng(),
            events: Notifier::default(),
        }
    }

    /// Creates an unprepared board from a `(width, height)` pair.
    pub fn from_size(
        size: (usize, usize),
        initial_moves: u32,
        generator: Option<Box<dyn PieceGenerator>>,
        finder: Option<Box<dyn SequenceFinder>>,
    ) -> Board {
        Board::new(size.0, size.1, initial_moves, generator, finder)
    }

    /// Pins the board's own randomness.
    pub fn with_seed(mut self, seed: u64) -> Board {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_fill_mode(mut self, fill_mode: FillMode) -> Board {
        self.fill_mode = fill_mode;
        self
    }

    pub fn with_available_pieces(mut self, pieces: impl IntoIterator<Item = Piece>) -> Board {
        self.add_available_pieces(pieces);
        self
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Direct access to the cells; the cells themselves keep disabled positions free of pieces.
    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn finder(&self) -> &dyn SequenceFinder {
        self.finder.as_ref()
    }

    /// Every sequence currently on the board, largest first.
    pub fn find_board_sequences(&self) -> Vec<Sequence> {
        self.finder.find_board_sequences(&self.grid)
    }

    /// The most specific sequence through the given cell, if there is one.
    pub fn find_match_from_cell(&self, coord: &Coord) -> Option<Sequence> {
        self.finder.find_match_from_cell(&self.grid, coord)
    }

    // events

    pub fn subscribe(&mut self, listener: impl FnMut(&BoardEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub(crate) fn emit(&mut self, event: BoardEvent) {
        self.events.emit(&event);
    }

    // sizing

    pub fn grid_width(&self) -> usize {
        self.grid_width
    }

    pub fn grid_height(&self) -> usize {
        self.grid_height
    }

    /// The number of cells a prepared grid of this board holds.
    pub fn dimensions(&self) -> usize {
        self.grid_width * self.grid_height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.grid_width, self.grid_height)
    }

    /// Resizes the board; the grid picks the new size up on `prepare_grid_cells(None, true)`.
    pub fn change_grid_width(&mut self, width: usize) {
        self.grid_width = width.max(MIN_GRID_WIDTH);
    }

    pub fn change_grid_height(&mut self, height: usize) {
        self.grid_height = height.max(MIN_GRID_HEIGHT);
    }

    pub fn change_grid_size(&mut self, width: usize, height: usize) {
        self.change_grid_width(width);
        self.change_grid_height(height);
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    pub fn change_fill_mode(&mut self, fill_mode: FillMode) {
        self.fill_mode = fill_mode;
    }

    // moves

    pub fn remaining_moves(&self) -> u32 {
        self.remaining_moves
    }

    /// Sets the move counter, clamping negative values to zero.
    pub fn change_remaining_moves(&mut self, moves: i64) {
        self.set_remaining_moves(moves.clamp(0, u32::MAX as i64) as u32);
    }

    pub fn increase_move(&mut self) {
        self.increase_moves(1);
    }

    pub fn increase_moves(&mut self, amount: u32) {
        self.set_remaining_moves(self.remaining_moves.saturating_add(amount));
    }

    pub fn decrease_move(&mut self) {
        self.decrease_moves(1);
    }

    pub fn decrease_moves(&mut self, amount: u32) {
        self.set_remaining_moves(self.remaining_moves.saturating_sub(amount));
    }

    /// Locks the board on the transition into zero moves, and only then.
    fn set_remaining_moves(&mut self, moves: u32) {
        let previous = self.remaining_moves;
        self.remaining_moves = moves;
        if previous > 0 && moves == 0 {
            log::debug!("spent all moves; locking the board");
            self.lock();
            self.emit(BoardEvent::SpentAllMoves);
        }
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_free(&self) -> bool {
        !self.locked
    }

    // piece pool

    pub fn available_pieces(&self) -> &[Piece] {
        &self.available_pieces
    }

    /// Adds a piece definition unless an equal one is already available.
    pub fn add_available_piece(&mut self, piece: Piece) {
        if !self.available_pieces.contains(&piece) {
            self.available_pieces.push(piece);
        }
    }

    pub fn add_available_pieces(&mut self, pieces: impl IntoIterator<Item = Piece>) {
        pieces.into_iter().for_each(|piece| self.add_available_piece(piece));
    }

    /// Removes every definition equal to the piece; returns whether anything was removed.
    pub fn remove_available_piece(&mut self, piece: &Piece) -> bool {
        let before = self.available_pieces.len();
        self.available_pieces.retain(|available| available != piece);
        before != self.available_pieces.len()
    }

    pub fn remove_available_pieces<'p>(&mut self, pieces: impl IntoIterator<Item = &'p Piece>) {
        for piece in pieces {
            self.remove_available_piece(piece);
        }
    }

    // gameplay

    /// Swaps the pieces of two cells, publishing whether it happened.
    pub fn swap(&mut self, from: &Coord, to: &Coord) -> bool {
        let swapped = self.grid.pair_mut(from, to).is_some_and(|(a, b)| a.swap_piece_with(b));
        let event = match swapped {
            true => BoardEvent::Swapped { from: *from, to: *to },
            _    => BoardEvent::SwapRejected { from: *from, to: *to },
        };
        log::trace!("{event:?}");
        self.emit(event);
        swapped
    }

    /// Publishes a snapshot of the sequence, then empties its cells on the board.
    pub fn consume_sequence(&mut self, sequence: &mut Sequence) {
        self.emit(BoardEvent::SequenceConsumed(sequence.clone()));
        sequence.consume(&mut self.grid);
    }

    /// Commits a resolution planned by [Board::move_pieces_and_fill_empty_cells]: every live cell
    /// takes the piece its virtual counterpart ended up with.
    pub fn apply(&mut self, virtual_board: VirtualBoard) -> Result<()> {
        let planned = virtual_board.into_grid();
        if (planned.width(), planned.height()) != (self.grid.width(), self.grid.height()) {
            return Err(anyhow!(
                "cannot apply a {}x{} resolution to a {}x{} grid",
                planned.width(),
                planned.height(),
                self.grid.width(),
                self.grid.height()
            ));
        }

        for (live, planned) in self.grid.iter_mut().zip(planned.iter()) {
            live.remove_piece();
            if let Some(piece) = &planned.piece {
                live.assign_piece(piece.clone());
            }
        }
        Ok(())
    }
}
