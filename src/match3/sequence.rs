use itertools::Itertools;

use crate::match3::prelude::*;

/// The geometry of a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Horizontal,
    Vertical,
    Diagonal,
    TShape,
    LShape,
    Irregular,
}

/// A run of matched cells. The cells are snapshots taken when the sequence was built;
/// consuming the sequence empties the matching cells of a grid.
#[derive(Clone, Debug)]
pub struct Sequence {
    cells: Vec<GridCell>,
    shape: Shape,
}

impl Sequence {
    /// Builds a sequence, dropping empty cells and repeated positions while keeping input order.
    /// The shape is detected from the cells when none is given.
    pub fn new(cells: Vec<GridCell>, shape: Option<Shape>) -> Sequence {
        let cells = cells
            .into_iter()
            .filter(GridCell::has_piece)
            .unique_by(GridCell::coord)
            .collect_vec();
        let shape = shape.unwrap_or_else(|| Sequence::detect_shape(&cells));
        Sequence { cells, shape }
    }

    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.cells.iter().map(GridCell::coord)
    }

    pub fn contains(&self, coord: &Coord) -> bool {
        self.coords().any(|c| c == *coord)
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Relabels the sequence.
    pub fn with_shape(mut self, shape: Shape) -> Sequence {
        self.shape = shape;
        self
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    /// The pieces of the cells that still hold one.
    pub fn pieces(&self) -> Vec<&Piece> {
        self.cells.iter().filter_map(|cell| cell.piece.as_ref()).collect()
    }

    /// Removes the piece from every cell of the sequence on the grid. The sequence is spent afterwards.
    pub fn consume(&mut self, grid: &mut Grid) {
        for cell in self.cells.iter_mut() {
            if let Some(target) = grid.get_mut(&cell.coord()) {
                target.remove_piece();
            }
            cell.remove_piece();
        }
    }

    /// The cell at `size / 2`; needs at least three cells.
    pub fn middle_cell(&self) -> Option<&GridCell> {
        if self.cells.len() >= 3 { self.cells.get(self.cells.len() / 2) } else { None }
    }

    pub fn top_edge_cell(&self) -> Option<&GridCell> {
        if self.is_vertical() { self.cells.first() } else { None }
    }

    pub fn bottom_edge_cell(&self) -> Option<&GridCell> {
        if self.is_vertical() { self.cells.last() } else { None }
    }

    pub fn left_edge_cell(&self) -> Option<&GridCell> {
        if self.is_horizontal() { self.cells.first() } else { None }
    }

    pub fn right_edge_cell(&self) -> Option<&GridCell> {
        if self.is_horizontal() { self.cells.last() } else { None }
    }

    pub fn is_horizontal(&self) -> bool {
        self.shape == Shape::Horizontal
    }

    pub fn is_vertical(&self) -> bool {
        self.shape == Shape::Vertical
    }

    pub fn is_diagonal(&self) -> bool {
        self.shape == Shape::Diagonal
    }

    pub fn is_t_shape(&self) -> bool {
        self.shape == Shape::TShape
    }

    pub fn is_l_shape(&self) -> bool {
        self.shape == Shape::LShape
    }

    pub fn is_horizontal_or_vertical(&self) -> bool {
        self.is_horizontal() || self.is_vertical()
    }

    /// Classifies consecutive cells: all in one row, else all in one column, else all diagonal steps.
    fn detect_shape(cells: &[GridCell]) -> Shape {
        let pairs = || cells.iter().tuple_windows::<(_, _)>();

        if pairs().all(|(prev, next)| next.in_same_row_as(prev)) {
            Shape::Horizontal
        } else if pairs().all(|(prev, next)| next.in_same_column_as(prev)) {
            Shape::Vertical
        } else if pairs().all(|(prev, next)| next.in_diagonal_with(prev)) {
            Shape::Diagonal
        } else {
            Shape::Irregular
        }
    }
}
