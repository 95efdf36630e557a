use itertools::Itertools;

use crate::match3::prelude::*;

/// One step of a planned resolution, in the order it should be replayed.
#[derive(Clone, Debug, PartialEq)]
pub enum CellUpdate {
    /// A piece fell one step.
    Movement { from: Coord, to: Coord, piece: Piece },
    /// A new piece appeared in an empty cell.
    Fill { at: Coord, piece: Piece },
}

impl CellUpdate {
    pub fn is_movement(&self) -> bool {
        matches!(self, CellUpdate::Movement { .. })
    }

    pub fn is_fill(&self) -> bool {
        matches!(self, CellUpdate::Fill { .. })
    }

    /// Where the piece ends up.
    pub fn target(&self) -> Coord {
        match self {
            CellUpdate::Movement { to, .. } => *to,
            CellUpdate::Fill { at, .. }     => *at,
        }
    }

    pub fn piece(&self) -> &Piece {
        match self {
            CellUpdate::Movement { piece, .. } | CellUpdate::Fill { piece, .. } => piece,
        }
    }
}

/// A private copy of the board's grid on which falls and refills are planned.
///
/// Only the downward links are kept. Nothing here touches the live board: hand the result to
/// [Board::apply] to commit it, or drop it to discard it.
#[derive(Clone, Debug)]
pub struct VirtualBoard {
    grid: Grid,
    fill_mode: FillMode,
    updates: Vec<CellUpdate>,
}

impl VirtualBoard {
    fn snapshot(live: &Grid, fill_mode: FillMode) -> VirtualBoard {
        let mut grid = live.clone();
        for cell in grid.iter_mut() {
            cell.neighbours = cell.neighbours.downward();
        }
        VirtualBoard { grid, fill_mode, updates: vec![] }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub(crate) fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    pub fn cell(&self, col: isize, row: isize) -> Option<&GridCell> {
        self.grid.cell(col, row)
    }

    pub fn updates(&self) -> &[CellUpdate] {
        &self.updates
    }

    pub fn into_updates(self) -> Vec<CellUpdate> {
        self.updates
    }

    pub fn movement_updates(&self) -> Vec<&CellUpdate> {
        self.updates.iter().filter(|update| update.is_movement()).collect()
    }

    pub fn fill_updates(&self) -> Vec<&CellUpdate> {
        self.updates.iter().filter(|update| update.is_fill()).collect()
    }

    /// Cells of the plan that could still take a piece.
    pub fn empty_cells(&self) -> Vec<&GridCell> {
        self.grid.iter().filter(|cell| cell.is_available()).collect()
    }

    /// Drops pieces one step at a time until nothing can fall any further.
    fn settle(&mut self) {
        loop {
            let pending = pending_fall_moves(&self.grid, self.fill_mode);
            if pending.is_empty() {
                break;
            }

            for from in pending {
                // earlier moves in this pass may have taken the target
                let Some(to) = self.grid.get(&from).and_then(|cell| fall_target(&self.grid, cell, self.fill_mode)) else {
                    continue;
                };
                let Some((source, target)) = self.grid.pair_mut(&from, &to) else {
                    continue;
                };
                let Some(piece) = source.remove_piece() else {
                    continue;
                };
                target.assign_piece(piece.clone());
                self.updates.push(CellUpdate::Movement { from, to, piece });
            }
        }
    }

    /// Rolls a piece into every cell still available, top row first.
    fn refill(&mut self, generator: &mut dyn PieceGenerator, pieces: &mut [Piece]) -> Result<()> {
        let empty = self
            .empty_cells()
            .into_iter()
            .map(GridCell::coord)
            .sorted_by_key(|coord| (coord.row, coord.col))
            .collect_vec();

        for at in empty {
            let piece = generator.roll(pieces, None)?;
            if let Some(cell) = self.grid.get_mut(&at) {
                cell.assign_piece(piece.clone());
                self.updates.push(CellUpdate::Fill { at, piece });
            }
        }
        Ok(())
    }
}

/// Where the piece in the cell would fall next under the fill mode, if anywhere.
///
/// Side-down tries the cell below before the bottom diagonals, so an empty cell below is always
/// taken even when both diagonals are occupied.
fn fall_target(grid: &Grid, cell: &GridCell, fill_mode: FillMode) -> Option<Coord> {
    let piece = cell.piece.as_ref()?;
    if !piece.piece_type.can_be_moved() {
        return None;
    }

    let bottom = grid.get(&cell.neighbours.bottom?)?;
    let available = |coord: Option<Coord>| coord.and_then(|c| grid.get(&c)).filter(|c| c.is_available());
    match fill_mode {
        FillMode::InPlace  => None,
        FillMode::FallDown => bottom.is_available().then(|| bottom.coord()),
        FillMode::SideDown => available(Some(bottom.coord()))
            .or_else(|| available(cell.neighbours.bottom_left))
            .or_else(|| available(cell.neighbours.bottom_right))
            .map(GridCell::coord),
    }
}

/// Cells whose piece can fall right now, lowest rows first.
pub(crate) fn pending_fall_moves(grid: &Grid, fill_mode: FillMode) -> Vec<Coord> {
    grid.iter()
        .filter(|cell| fall_target(grid, cell, fill_mode).is_some())
        .map(GridCell::coord)
        .sorted_by_key(|coord| (std::cmp::Reverse(coord.row), coord.col))
        .collect()
}

impl Board {
    /// Cells on the live board whose piece could fall under the current fill mode.
    pub fn pending_fall_moves(&self) -> Vec<Coord> {
        pending_fall_moves(&self.grid, self.fill_mode)
    }

    /// Plans how pieces fall and which new pieces appear, without touching the live grid.
    ///
    /// Unless the fill mode is in-place, pieces drop one step per update until nothing can fall;
    /// every cell left empty then gets a rolled piece. Replay the returned updates, then commit them
    /// with [Board::apply] or drop the plan.
    pub fn move_pieces_and_fill_empty_cells(&mut self) -> Result<VirtualBoard> {
        if self.grid.is_empty() {
            return Err(anyhow!("cannot resolve falls on a board whose grid is not prepared"));
        }

        let mut plan = VirtualBoard::snapshot(&self.grid, self.fill_mode);
        if self.fill_mode != FillMode::InPlace {
            plan.settle();
        }
        plan.refill(self.generator.as_mut(), &mut self.available_pieces)?;

        log::debug!(
            "planned {} movements and {} fills",
            plan.movement_updates().len(),
            plan.fill_updates().len()
        );
        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match3::board::tests::filled_board;

    /// A board laid out by hand; letters are normal pieces, `.` is empty and `#` disabled.
    fn laid_out(rows: &[&str], fill_mode: FillMode) -> Board {
        let generator: Box<dyn PieceGenerator> = Box::new(PieceWeightGenerator::seeded(9));
        let mut board = Board::new(rows[0].len(), rows.len(), 5, Some(generator), None)
            .with_fill_mode(fill_mode)
            .with_available_pieces(["x", "y", "z"].map(Piece::normal));
        board.prepare_grid_cells(None, false);
        for (row, line) in rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let coord = Coord::new(col, row);
                match ch {
                    '.' => {}
                    '#' => board.set_cells_that_cannot_contain_pieces(&[coord]),
                    _   => board.grid_mut().get_mut(&coord).unwrap().assign_piece(Piece::normal(&ch.to_string())),
                }
            }
        }
        board
    }

    fn shape_at(grid: &Grid, col: usize, row: usize) -> Option<String> {
        grid.get(&Coord::new(col, row)).and_then(|cell| cell.piece.as_ref()).map(|p| p.shape().to_owned())
    }

    #[test]
    fn consumed_top_row_is_only_refilled() {
        let mut board = filled_board(true);
        let mut top = board.create_sequence_from_row(0);
        board.consume_sequence(&mut top);

        let plan = board.move_pieces_and_fill_empty_cells().unwrap();
        assert_eq!(plan.updates().len(), board.grid_width());
        assert!(plan.updates().iter().all(|u| u.is_fill() && u.target().row == 0));
        assert!(plan.empty_cells().is_empty());
        assert_eq!(board.empty_cells().len(), board.grid_width());
    }

    #[test]
    fn in_place_never_moves_pieces() {
        let mut board = filled_board(true);
        board.change_fill_mode(FillMode::InPlace);
        let mut middle = board.create_sequence_from_coords(&[Coord::new(2, 3), Coord::new(3, 3), Coord::new(4, 3)]);
        board.consume_sequence(&mut middle);

        let plan = board.move_pieces_and_fill_empty_cells().unwrap();
        assert!(plan.movement_updates().is_empty());
        assert_eq!(plan.fill_updates().len(), 3);
        assert!(plan.fill_updates().iter().all(|u| u.target().row == 3));
    }

    #[test]
    fn falling_pieces_stack_at_the_bottom() {
        let mut board = laid_out(&["abc", "d.f", "...", "g.i"], FillMode::FallDown);
        let plan = board.move_pieces_and_fill_empty_cells().unwrap();

        // g stops the first column, so d and a settle right above it
        let grid = plan.grid();
        assert_eq!(shape_at(grid, 0, 1).as_deref(), Some("a"));
        assert_eq!(shape_at(grid, 0, 2).as_deref(), Some("d"));
        assert_eq!(shape_at(grid, 1, 3).as_deref(), Some("b"));
        assert_eq!(shape_at(grid, 2, 2).as_deref(), Some("f"));
        assert_eq!(shape_at(grid, 2, 1).as_deref(), Some("c"));

        // a: 1 step, d: 1 step, b: 3 steps, c: 1 step, f: 1 step
        assert_eq!(plan.movement_updates().len(), 7);
        assert_eq!(plan.fill_updates().len(), 5);
        assert!(plan.fill_updates().iter().all(|u| u.target().row < 3));
        assert!(plan.empty_cells().is_empty());

        // the live board has not moved
        assert_eq!(shape_at(board.grid(), 1, 0).as_deref(), Some("b"));
        assert_eq!(board.pending_fall_moves().len(), 3);
    }

    #[test]
    fn side_down_slides_past_blocked_cells() {
        let mut board = laid_out(&["ab.", "c#.", "dez"], FillMode::SideDown);
        let plan = board.move_pieces_and_fill_empty_cells().unwrap();

        // b cannot fall onto the disabled cell, so it slides to the bottom right
        let grid = plan.grid();
        assert_eq!(shape_at(grid, 2, 1).as_deref(), Some("b"));
        assert!(matches!(
            plan.movement_updates()[0],
            CellUpdate::Movement { from, to, .. } if *from == Coord::new(1, 0) && *to == Coord::new(2, 1)
        ));
        assert!(grid.get(&Coord::new(1, 1)).is_some_and(|cell| cell.is_empty() && !cell.can_contain_piece()));
    }

    #[test]
    fn side_down_falls_straight_when_the_diagonals_are_taken() {
        let board = laid_out(&["xyz", "y.z", "zxy"], FillMode::SideDown);
        let grid = board.grid();
        let top = grid.get(&Coord::new(1, 0)).unwrap();

        assert_eq!(fall_target(grid, top, FillMode::SideDown), Some(Coord::new(1, 1)));
        assert_eq!(fall_target(grid, top, FillMode::FallDown), Some(Coord::new(1, 1)));
        assert!(board.pending_fall_moves().contains(&Coord::new(1, 0)));
    }

    #[test]
    fn obstacles_hold_their_ground() {
        let mut board = laid_out(&["a..", "...", "xyz"], FillMode::FallDown);
        board.grid_mut().get_mut(&Coord::new(0, 0)).unwrap().remove_piece();
        board.grid_mut().get_mut(&Coord::new(0, 0)).unwrap().assign_piece(Piece::obstacle("rock"));

        let plan = board.move_pieces_and_fill_empty_cells().unwrap();
        assert!(plan.movement_updates().is_empty());
        assert_eq!(shape_at(plan.grid(), 0, 0).as_deref(), Some("rock"));
    }

    #[test]
    fn applying_commits_the_plan() {
        let mut board = laid_out(&["abc", "d.f", "...", "g.i"], FillMode::FallDown);
        let plan = board.move_pieces_and_fill_empty_cells().unwrap();
        let expected = plan.grid().iter().map(|cell| cell.piece.clone()).collect_vec();

        board.apply(plan).unwrap();
        assert_eq!(board.grid().iter().map(|cell| cell.piece.clone()).collect_vec(), expected);
        assert!(board.empty_cells().is_empty());
        assert!(board.pending_fall_moves().is_empty());
    }

    #[test]
    fn unprepared_boards_cannot_resolve() {
        let mut board = Board::new(3, 3, 0, None, None);
        assert!(board.move_pieces_and_fill_empty_cells().is_err());
    }
}
