use itertools::Itertools;

use crate::match3::prelude::*;

impl Board {
    /// Builds the grid and its neighbour links, then disables the given positions (or the ones
    /// recorded earlier when `None`). Does nothing on a prepared grid unless `overwrite` is set.
    ///
    /// Returns whether the grid was (re)built.
    pub fn prepare_grid_cells(&mut self, disabled: Option<&[Coord]>, overwrite: bool) -> bool {
        if !self.grid.is_empty() && !overwrite {
            return false;
        }

        if let Some(disabled) = disabled {
            self.disabled = disabled.iter().copied().unique().collect();
        }
        self.grid = Grid::new(self.grid_width, self.grid_height);
        for coord in self.disabled.iter() {
            if let Some(cell) = self.grid.get_mut(coord) {
                cell.set_can_contain_piece(false);
            }
        }

        log::debug!(
            "prepared a {}x{} grid with {} disabled cells",
            self.grid_width,
            self.grid_height,
            self.disabled.len()
        );
        self.emit(BoardEvent::Prepared);
        true
    }

    /// Lets the given cells hold pieces again.
    pub fn set_cells_that_can_contain_pieces(&mut self, coords: &[Coord]) {
        for coord in coords {
            if let Some(cell) = self.grid.get_mut(coord) {
                cell.set_can_contain_piece(true);
            }
        }
        self.disabled.retain(|coord| !coords.contains(coord));
    }

    /// Clears and disables the given cells; they stay disabled across grid rebuilds.
    pub fn set_cells_that_cannot_contain_pieces(&mut self, coords: &[Coord]) {
        for coord in coords {
            if let Some(cell) = self.grid.get_mut(coord) {
                cell.set_can_contain_piece(false);
            }
            if !self.disabled.contains(coord) {
                self.disabled.push(*coord);
            }
        }
    }

    /// Fills every empty cell that can take a piece, from `preselected` where it names the position
    /// and from the available pieces otherwise.
    ///
    /// Needs a prepared grid and at least three distinct available pieces; otherwise nothing happens.
    /// When matches are not allowed and nothing was preselected, the matches are rolled away afterwards.
    pub fn fill_initial_board(
        &mut self,
        allow_matches_on_start: bool,
        preselected: Option<&HashMap<Coord, Piece>>,
    ) -> Result<()> {
        if self.grid.is_empty() || self.available_pieces.len() < MIN_AVAILABLE_PIECES {
            log::debug!(
                "not filling: the grid is unprepared or only {} pieces are available",
                self.available_pieces.len()
            );
            return Ok(());
        }

        let targets = self.grid.iter().filter(|cell| cell.is_available()).map(GridCell::coord).collect_vec();
        for coord in targets {
            let piece = match preselected.and_then(|pieces| pieces.get(&coord)) {
                Some(piece) => piece.clone(),
                None        => self.generator.roll(&mut self.available_pieces, None)?,
            };
            if let Some(cell) = self.grid.get_mut(&coord) {
                cell.assign_piece(piece);
            }
        }

        let starved = self.grid.iter().filter(|cell| cell.is_available()).count();
        if starved > 0 {
            return Err(anyhow!("{starved} cells are still empty after filling the board"));
        }

        if !allow_matches_on_start && preselected.is_none_or(HashMap::is_empty) {
            self.remove_matches_from_board()?;
        }

        log::debug!("filled the board");
        self.emit(BoardEvent::Filled);
        Ok(())
    }

    /// Re-rolls pieces until the finder sees no sequence. Each pass replaces the first third (plus one)
    /// of every sequence with pieces of the same kind but a different look, avoiding looks already
    /// picked for that sequence while there are others to choose from.
    pub fn remove_matches_from_board(&mut self) -> Result<()> {
        for pass in 0..MAX_REMATCH_PASSES {
            let sequences = self.finder.find_board_sequences(&self.grid);
            if sequences.is_empty() {
                log::debug!("the board is free of matches after {pass} passes");
                return Ok(());
            }
            log::trace!("pass {pass}: re-rolling pieces in {} sequences", sequences.len());

            for sequence in sequences {
                let mut excluded = sequence.pieces().into_iter().map(|piece| piece.piece_type.clone()).collect_vec();
                let matched = excluded.len();

                for cell in sequence.cells().iter().take(sequence.size() / 3 + 1) {
                    let kind = [cell.piece.as_ref().map_or(PieceKind::Normal, Piece::kind)];
                    let roll = self
                        .roll_excluding(&excluded, &kind)
                        .or_else(|_| self.roll_excluding(&excluded[..matched], &kind));
                    let Ok(piece) = roll else {
                        log::trace!("no replacement for the piece at {}", cell.coord());
                        continue;
                    };

                    excluded.push(piece.piece_type.clone());
                    if let Some(target) = self.grid.get_mut(&cell.coord()) {
                        target.remove_piece();
                        target.assign_piece(piece);
                    }
                }
            }
        }

        Err(anyhow!("the board still has matches after {MAX_REMATCH_PASSES} passes; the available pieces are too alike"))
    }

    /// Rolls from the available pieces that look like none of the excluded types.
    fn roll_excluding(&mut self, excluded: &[PieceType], only: &[PieceKind]) -> Result<Piece> {
        let mut candidates = self
            .available_pieces
            .iter()
            .filter(|piece| !excluded.iter().any(|t| piece.piece_type.same_look(t)))
            .cloned()
            .collect_vec();
        self.generator.roll(&mut candidates, Some(only))
    }

    /// Rolls a fresh piece from the available pieces.
    pub fn generate_random_piece(&mut self, only: Option<&[PieceKind]>) -> Result<Piece> {
        self.generator.roll(&mut self.available_pieces, only)
    }

    /// Rolls a piece into the cell if it can take one. Returns whether the cell was filled.
    pub fn generate_random_piece_on_cell(&mut self, coord: &Coord, only: Option<&[PieceKind]>) -> Result<bool> {
        let Some(cell) = self.grid.get(coord) else {
            return Err(anyhow!("no cell at {coord}"));
        };
        if !cell.is_available() {
            return Ok(false);
        }

        let piece = self.generate_random_piece(only)?;
        if let Some(cell) = self.grid.get_mut(coord) {
            cell.assign_piece(piece);
        }
        Ok(true)
    }

    /// Rolls pieces into every given cell that can take one; returns how many were filled.
    pub fn generate_random_pieces_on_cells(&mut self, coords: &[Coord], only: Option<&[PieceKind]>) -> Result<usize> {
        let mut filled = 0;
        for coord in coords {
            if self.generate_random_piece_on_cell(coord, only)? {
                filled += 1;
            }
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match3::board::tests::{filled_board, recorded, shapes};

    #[test]
    fn preparing_is_idempotent_without_overwrite() {
        let mut board = Board::new(4, 3, 0, None, None);
        let events = recorded(&mut board);

        assert!(board.prepare_grid_cells(None, false));
        assert!(!board.prepare_grid_cells(None, false));
        assert_eq!(board.grid().len(), 12);
        assert_eq!(board.grid().iter().count(), 12);

        board.change_grid_size(5, 5);
        assert!(board.prepare_grid_cells(None, true));
        assert_eq!(board.grid().iter().count(), 25);

        let prepared = events.borrow().iter().filter(|e| matches!(e, BoardEvent::Prepared)).count();
        assert_eq!(prepared, 2);
    }

    #[test]
    fn disabled_cells_survive_a_rebuild() {
        let mut board = Board::new(4, 4, 0, None, None).with_available_pieces(shapes());
        board.prepare_grid_cells(Some(&[Coord::new(1, 1)]), false);
        board.set_cells_that_cannot_contain_pieces(&[Coord::new(2, 2)]);
        board.prepare_grid_cells(None, true);

        let disabled = board.cells_that_cannot_contain_pieces().iter().map(|c| c.coord()).collect_vec();
        assert_eq!(disabled, vec![Coord::new(1, 1), Coord::new(2, 2)]);

        board.set_cells_that_can_contain_pieces(&[Coord::new(1, 1)]);
        board.prepare_grid_cells(None, true);
        assert_eq!(board.cells_that_cannot_contain_pieces().len(), 1);

        board.fill_initial_board(true, None).unwrap();
        assert!(board.cell(2, 2).is_some_and(GridCell::is_empty));
        assert!(board.empty_cells().is_empty());
    }

    #[test]
    fn fills_every_cell_with_normal_pieces() {
        let board = filled_board(true);
        assert_eq!(board.dimensions(), 56);
        assert_eq!(board.grid().iter().count(), 56);
        assert!(board.empty_cells().is_empty());
        assert!(board.grid().iter().all(|cell| cell.piece.as_ref().is_some_and(Piece::is_normal)));
    }

    #[test]
    fn fills_without_starting_matches() {
        for seed in 0..5 {
            let generator: Box<dyn PieceGenerator> = Box::new(PieceWeightGenerator::seeded(seed));
            let mut board = Board::new(8, 7, 10, Some(generator), None).with_available_pieces(shapes());
            board.prepare_grid_cells(None, false);
            board.fill_initial_board(false, None).unwrap();

            assert!(board.empty_cells().is_empty());
            assert!(board.find_board_sequences().is_empty(), "seed {seed} left matches behind");
        }
    }

    #[test]
    fn filling_needs_a_grid_and_enough_pieces() {
        let mut board = Board::new(3, 3, 0, None, None).with_available_pieces(shapes());
        let events = recorded(&mut board);
        board.fill_initial_board(true, None).unwrap();
        assert!(board.grid().is_empty());

        board.remove_available_pieces(&shapes()[..2]);
        board.prepare_grid_cells(None, false);
        board.fill_initial_board(true, None).unwrap();
        assert_eq!(board.empty_cells().len(), 9);
        assert!(!events.borrow().iter().any(|e| matches!(e, BoardEvent::Filled)));
    }

    #[test]
    fn a_uniform_pool_cannot_shed_its_matches() {
        let pool = vec![
            Piece::normal("apple").with_weight(1000.0).unwrap(),
            Piece::obstacle("rock").with_weight(0.001).unwrap(),
            Piece::obstacle("stone").with_weight(0.001).unwrap(),
        ];
        let generator: Box<dyn PieceGenerator> = Box::new(PieceWeightGenerator::seeded(3));
        let mut board = Board::new(3, 3, 0, Some(generator), None).with_available_pieces(pool);
        let events = recorded(&mut board);
        board.prepare_grid_cells(None, false);

        let err = board.fill_initial_board(false, None).unwrap_err();
        assert!(err.to_string().contains("still has matches"));
        assert!(board.empty_cells().is_empty());
        assert!(!board.find_board_sequences().is_empty());
        assert!(!events.borrow().iter().any(|e| matches!(e, BoardEvent::Filled)));
    }

    #[test]
    fn preselected_pieces_take_priority() {
        let mut board = Board::new(3, 3, 0, None, None).with_available_pieces(shapes());
        board.prepare_grid_cells(None, false);
        let star = Piece::special("star");
        let preselected = HashMap::from([(Coord::new(1, 1), star.clone())]);
        board.fill_initial_board(false, Some(&preselected)).unwrap();

        let centre = board.cell(1, 1).and_then(|cell| cell.piece.as_ref()).unwrap();
        assert!(centre.same_instance(&star));
        assert!(board.empty_cells().is_empty());
    }

    #[test]
    fn random_pieces_only_land_on_available_cells() {
        let mut board = Board::new(3, 3, 0, None, None).with_available_pieces(shapes());
        board.prepare_grid_cells(Some(&[Coord::new(0, 0)]), false);

        let filled = board
            .generate_random_pieces_on_cells(&[Coord::new(0, 0), Coord::new(1, 0), Coord::new(1, 0)], None)
            .unwrap();
        assert_eq!(filled, 1);
        assert!(board.generate_random_piece_on_cell(&Coord::new(5, 5), None).is_err());
        assert!(board.generate_random_piece(Some(&[PieceKind::Special])).is_err());
    }
}
