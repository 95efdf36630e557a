use itertools::Itertools;
use uuid::Uuid;

use crate::match3::prelude::*;

impl Board {
    /// Bounds-checked lookup; negative or out-of-range positions give `None`.
    pub fn cell(&self, col: isize, row: isize) -> Option<&GridCell> {
        self.grid.cell(col, row)
    }

    pub fn cells_from_row(&self, row: usize) -> Vec<&GridCell> {
        self.grid.row(row)
    }

    pub fn cells_from_column(&self, col: usize) -> Vec<&GridCell> {
        self.grid.column(col)
    }

    /// Cells that could take a piece right now.
    pub fn empty_cells(&self) -> Vec<&GridCell> {
        self.grid.iter().filter(|cell| cell.is_available()).collect()
    }

    pub fn empty_cells_from_row(&self, row: usize) -> Vec<&GridCell> {
        self.grid.row(row).into_iter().filter(|cell| cell.is_available()).collect()
    }

    pub fn empty_cells_from_column(&self, col: usize) -> Vec<&GridCell> {
        self.grid.column(col).into_iter().filter(|cell| cell.is_available()).collect()
    }

    pub fn cells_that_can_contain_pieces(&self) -> Vec<&GridCell> {
        self.grid.iter().filter(|cell| cell.can_contain_piece()).collect()
    }

    pub fn cells_that_cannot_contain_pieces(&self) -> Vec<&GridCell> {
        self.grid.iter().filter(|cell| !cell.can_contain_piece()).collect()
    }

    pub fn find_cell_with_piece(&self, id: &Uuid) -> Option<&GridCell> {
        self.grid.iter().find(|cell| cell.piece.as_ref().is_some_and(|piece| piece.id == *id))
    }

    // corners

    pub fn top_left_corner_cell(&self) -> Option<&GridCell> {
        self.grid.iter().find(|cell| cell.is_top_left_corner())
    }

    pub fn top_right_corner_cell(&self) -> Option<&GridCell> {
        self.grid.iter().find(|cell| cell.is_top_right_corner())
    }

    pub fn bottom_left_corner_cell(&self) -> Option<&GridCell> {
        self.grid.iter().find(|cell| cell.is_bottom_left_corner())
    }

    pub fn bottom_right_corner_cell(&self) -> Option<&GridCell> {
        self.grid.iter().find(|cell| cell.is_bottom_right_corner())
    }

    // walks

    /// Cells reached by stepping repeatedly from the origin, nearest first, excluding the origin.
    /// The distance is clamped to the grid and the walk stops at the edge.
    fn walk(&self, from: &Coord, step: OffsetCoord, distance: usize) -> Vec<&GridCell> {
        let distance = distance.min(self.grid.width().max(self.grid.height()));
        (1..=distance as isize)
            .map_while(|i| {
                let target = OffsetCoord::from(from) + OffsetCoord::new(step.cols * i, step.rows * i);
                self.grid.cell(target.cols, target.rows)
            })
            .collect()
    }

    pub fn upper_cells_from(&self, from: &Coord, distance: usize) -> Vec<&GridCell> {
        self.walk(from, UP, distance)
    }

    pub fn bottom_cells_from(&self, from: &Coord, distance: usize) -> Vec<&GridCell> {
        self.walk(from, DOWN, distance)
    }

    pub fn left_cells_from(&self, from: &Coord, distance: usize) -> Vec<&GridCell> {
        self.walk(from, LEFT, distance)
    }

    pub fn right_cells_from(&self, from: &Coord, distance: usize) -> Vec<&GridCell> {
        self.walk(from, RIGHT, distance)
    }

    pub fn top_left_diagonal_cells_from(&self, from: &Coord, distance: usize) -> Vec<&GridCell> {
        self.walk(from, UP_LEFT, distance)
    }

    pub fn top_right_diagonal_cells_from(&self, from: &Coord, distance: usize) -> Vec<&GridCell> {
        self.walk(from, UP_RIGHT, distance)
    }

    pub fn bottom_left_diagonal_cells_from(&self, from: &Coord, distance: usize) -> Vec<&GridCell> {
        self.walk(from, DOWN_LEFT, distance)
    }

    pub fn bottom_right_diagonal_cells_from(&self, from: &Coord, distance: usize) -> Vec<&GridCell> {
        self.walk(from, DOWN_RIGHT, distance)
    }

    /// The linked neighbours of a cell, cardinal first.
    pub fn adjacent_cells_from(&self, from: &Coord, include_diagonals: bool) -> Vec<&GridCell> {
        let Some(origin) = self.grid.get(from) else {
            return vec![];
        };
        let diagonal = if include_diagonals { origin.neighbours.diagonal() } else { [None; 4] };
        origin
            .neighbours
            .cardinal()
            .into_iter()
            .chain(diagonal)
            .flatten()
            .filter_map(|coord| self.grid.get(&coord))
            .collect()
    }

    /// The whole row and column through a cell, the cell itself included once.
    pub fn cross_cells_from(&self, from: &Coord) -> Vec<&GridCell> {
        if self.grid.get(from).is_none() {
            return vec![];
        }
        self.grid.row(from.row).into_iter().chain(self.grid.column(from.col)).unique_by(|cell| cell.coord()).collect()
    }

    /// Both full diagonals through a cell, the cell itself included once.
    pub fn cross_diagonal_cells_from(&self, from: &Coord) -> Vec<&GridCell> {
        let Some(origin) = self.grid.get(from) else {
            return vec![];
        };
        let reach = self.grid.width().max(self.grid.height());
        std::iter::once(origin)
            .chain(self.top_left_diagonal_cells_from(from, reach))
            .chain(self.top_right_diagonal_cells_from(from, reach))
            .chain(self.bottom_left_diagonal_cells_from(from, reach))
            .chain(self.bottom_right_diagonal_cells_from(from, reach))
            .collect()
    }

    // selections

    pub fn cells_with_kind(&self, kind: PieceKind) -> Vec<&GridCell> {
        self.grid.iter().filter(|cell| has_kind(cell, kind)).collect()
    }

    pub fn cells_from_row_of_kind(&self, row: usize, kind: PieceKind) -> Vec<&GridCell> {
        self.grid.row(row).into_iter().filter(|cell| has_kind(cell, kind)).collect()
    }

    pub fn cells_from_column_of_kind(&self, col: usize, kind: PieceKind) -> Vec<&GridCell> {
        self.grid.column(col).into_iter().filter(|cell| has_kind(cell, kind)).collect()
    }

    /// Shapes compare trimmed and case-insensitively.
    pub fn cells_with_shape(&self, shape: &str) -> Vec<&GridCell> {
        self.grid.iter().filter(|cell| has_shape(cell, shape)).collect()
    }

    pub fn cells_from_row_of_shape(&self, row: usize, shape: &str) -> Vec<&GridCell> {
        self.grid.row(row).into_iter().filter(|cell| has_shape(cell, shape)).collect()
    }

    pub fn cells_from_column_of_shape(&self, col: usize, shape: &str) -> Vec<&GridCell> {
        self.grid.column(col).into_iter().filter(|cell| has_shape(cell, shape)).collect()
    }

    // sequences built by hand, whatever the pieces are

    pub fn create_sequence_from_cells(&self, cells: Vec<&GridCell>) -> Sequence {
        Sequence::new(cells.into_iter().cloned().collect(), None)
    }

    pub fn create_sequence_from_coords(&self, coords: &[Coord]) -> Sequence {
        self.create_sequence_from_cells(coords.iter().filter_map(|coord| self.grid.get(coord)).collect())
    }

    pub fn create_sequence_from_row(&self, row: usize) -> Sequence {
        self.create_sequence_from_cells(self.cells_from_row(row))
    }

    pub fn create_sequence_from_column(&self, col: usize) -> Sequence {
        self.create_sequence_from_cells(self.cells_from_column(col))
    }

    pub fn create_sequence_from_row_of_kind(&self, row: usize, kind: PieceKind) -> Sequence {
        self.create_sequence_from_cells(self.cells_from_row_of_kind(row, kind))
    }

    pub fn create_sequence_from_column_of_kind(&self, col: usize, kind: PieceKind) -> Sequence {
        self.create_sequence_from_cells(self.cells_from_column_of_kind(col, kind))
    }

    pub fn create_sequence_with_kind(&self, kind: PieceKind) -> Sequence {
        self.create_sequence_from_cells(self.cells_with_kind(kind))
    }

    pub fn create_sequence_from_row_of_shape(&self, row: usize, shape: &str) -> Sequence {
        self.create_sequence_from_cells(self.cells_from_row_of_shape(row, shape))
    }

    pub fn create_sequence_from_column_of_shape(&self, col: usize, shape: &str) -> Sequence {
        self.create_sequence_from_cells(self.cells_from_column_of_shape(col, shape))
    }

    pub fn create_sequence_with_shape(&self, shape: &str) -> Sequence {
        self.create_sequence_from_cells(self.cells_with_shape(shape))
    }
}

fn has_kind(cell: &GridCell, kind: PieceKind) -> bool {
    cell.piece.as_ref().is_some_and(|piece| piece.kind() == kind)
}

fn has_shape(cell: &GridCell, shape: &str) -> bool {
    cell.piece.as_ref().is_some_and(|piece| piece.piece_type.has_shape(shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match3::board::tests::{filled_board, shapes};

    fn coords(cells: Vec<&GridCell>) -> Vec<(usize, usize)> {
        cells.into_iter().map(|cell| (cell.column(), cell.row())).collect()
    }

    fn prepared(width: usize, height: usize) -> Board {
        let mut board = Board::new(width, height, 0, None, None);
        board.prepare_grid_cells(None, false);
        board
    }

    #[test]
    fn walks_stop_at_the_edge() {
        let board = prepared(5, 5);
        let origin = Coord::new(1, 2);

        assert_eq!(coords(board.upper_cells_from(&origin, 10)), vec![(1, 1), (1, 0)]);
        assert_eq!(coords(board.bottom_cells_from(&origin, 1)), vec![(1, 3)]);
        assert_eq!(coords(board.left_cells_from(&origin, 3)), vec![(0, 2)]);
        assert_eq!(coords(board.right_cells_from(&origin, 2)), vec![(2, 2), (3, 2)]);
        assert_eq!(coords(board.top_right_diagonal_cells_from(&origin, 9)), vec![(2, 1), (3, 0)]);
        assert_eq!(coords(board.bottom_left_diagonal_cells_from(&origin, 9)), vec![(0, 3)]);
        assert!(board.upper_cells_from(&origin, 0).is_empty());
    }

    #[test]
    fn adjacent_and_cross_cells() {
        let board = prepared(4, 4);
        let corner = Coord::new(0, 0);
        assert_eq!(board.adjacent_cells_from(&corner, false).len(), 2);
        assert_eq!(board.adjacent_cells_from(&corner, true).len(), 3);
        assert_eq!(board.adjacent_cells_from(&Coord::new(1, 1), true).len(), 8);

        assert_eq!(board.cross_cells_from(&Coord::new(1, 1)).len(), 7);
        assert_eq!(board.cross_diagonal_cells_from(&Coord::new(1, 1)).len(), 6);
        assert!(board.cross_cells_from(&Coord::new(4, 0)).is_empty());
    }

    #[test]
    fn corners() {
        let board = prepared(4, 3);
        assert_eq!(board.top_left_corner_cell().map(GridCell::coord), Some(Coord::new(0, 0)));
        assert_eq!(board.top_right_corner_cell().map(GridCell::coord), Some(Coord::new(3, 0)));
        assert_eq!(board.bottom_left_corner_cell().map(GridCell::coord), Some(Coord::new(0, 2)));
        assert_eq!(board.bottom_right_corner_cell().map(GridCell::coord), Some(Coord::new(3, 2)));
    }

    #[test]
    fn selections_filter_by_kind_and_shape() {
        let mut board = prepared(3, 3);
        let grid = board.grid_mut();
        grid.get_mut(&Coord::new(0, 0)).unwrap().assign_piece(Piece::normal("Square"));
        grid.get_mut(&Coord::new(1, 0)).unwrap().assign_piece(Piece::special("square"));
        grid.get_mut(&Coord::new(1, 1)).unwrap().assign_piece(Piece::normal("circle"));

        assert_eq!(coords(board.cells_with_shape(" SQUARE ")), vec![(0, 0), (1, 0)]);
        assert_eq!(coords(board.cells_from_row_of_kind(0, PieceKind::Normal)), vec![(0, 0)]);
        assert_eq!(coords(board.cells_from_column_of_shape(1, "circle")), vec![(1, 1)]);
        assert_eq!(board.create_sequence_with_kind(PieceKind::Normal).size(), 2);
        assert!(board.create_sequence_from_row_of_shape(0, "square").is_horizontal());
        assert_eq!(board.empty_cells_from_row(0).len(), 1);
        assert_eq!(board.empty_cells_from_column(1).len(), 1);
    }

    #[test]
    fn finds_pieces_by_identity() {
        let board = filled_board(true);
        let piece = board.cell(3, 4).and_then(|cell| cell.piece.clone()).unwrap();
        assert_eq!(board.find_cell_with_piece(&piece.id).map(GridCell::coord), Some(Coord::new(3, 4)));
        assert!(board.find_cell_with_piece(&shapes()[0].id).is_none());
    }
}
