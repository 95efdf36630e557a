use crate::match3::prelude::*;

/// Links from a cell to its eight surrounding cells, by position. The board owns every cell;
/// these are lookups into it, recomputed whenever the grid is rebuilt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Neighbours {
    pub up: Option<Coord>,
    pub bottom: Option<Coord>,
    pub right: Option<Coord>,
    pub left: Option<Coord>,
    pub top_right: Option<Coord>,
    pub top_left: Option<Coord>,
    pub bottom_right: Option<Coord>,
    pub bottom_left: Option<Coord>,
}

impl Neighbours {
    /// Computes all eight links of a cell on a grid of the given size.
    pub fn on_grid(coord: &Coord, width: usize, height: usize) -> Neighbours {
        let at = |offset: OffsetCoord| {
            let candidate = coord + &offset;
            if candidate.in_bounds_signed(width, height) { candidate.coerce() } else { None }
        };
        Neighbours {
            up: at(UP),
            bottom: at(DOWN),
            right: at(RIGHT),
            left: at(LEFT),
            top_right: at(UP_RIGHT),
            top_left: at(UP_LEFT),
            bottom_right: at(DOWN_RIGHT),
            bottom_left: at(DOWN_LEFT),
        }
    }

    /// Only the downward links; enough to resolve falling pieces.
    pub fn downward(&self) -> Neighbours {
        Neighbours {
            bottom: self.bottom,
            bottom_right: self.bottom_right,
            bottom_left: self.bottom_left,
            ..Neighbours::default()
        }
    }

    pub fn cardinal(&self) -> [Option<Coord>; 4] {
        [self.up, self.right, self.left, self.bottom]
    }

    pub fn diagonal(&self) -> [Option<Coord>; 4] {
        [self.bottom_right, self.bottom_left, self.top_right, self.top_left]
    }
}

/// A single addressable grid position that may hold a piece.
///
/// Equality is positional: two cells are the same cell when they share column and row,
/// whatever they currently contain.
#[derive(Clone, Debug)]
pub struct GridCell {
    coord: Coord,
    can_contain_piece: bool,
    pub piece: Option<Piece>,
    pub neighbours: Neighbours,
}

impl PartialEq for GridCell {
    fn eq(&self, other: &Self) -> bool {
        self.coord == other.coord
    }
}
impl Eq for GridCell {}

impl std::hash::Hash for GridCell {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.coord.hash(state);
    }
}

impl GridCell {
    /// Creates an empty cell; negative coordinates are rejected.
    pub fn new(column: isize, row: isize) -> Result<GridCell> {
        let Some(coord) = OffsetCoord::new(column, row).coerce() else {
            return Err(anyhow!("a grid cell cannot have a negative column {column} or row {row}"));
        };
        Ok(GridCell::at(coord))
    }

    /// Creates an empty cell at a coordinate that is already known to be valid.
    pub fn at(coord: Coord) -> GridCell {
        GridCell { coord, can_contain_piece: true, piece: None, neighbours: Neighbours::default() }
    }

    /// Creates a cell already holding the given piece.
    pub fn with_piece(mut self, piece: Piece) -> GridCell {
        self.assign_piece(piece);
        self
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    pub fn column(&self) -> usize {
        self.coord.col
    }

    pub fn row(&self) -> usize {
        self.coord.row
    }

    pub fn is_empty(&self) -> bool {
        self.piece.is_none()
    }

    pub fn has_piece(&self) -> bool {
        self.piece.is_some()
    }

    pub fn can_contain_piece(&self) -> bool {
        self.can_contain_piece
    }

    /// Empty and able to take a piece.
    pub fn is_available(&self) -> bool {
        self.can_contain_piece && self.is_empty()
    }

    /// Marks whether the cell may hold a piece; a disabled cell drops whatever it held.
    pub fn set_can_contain_piece(&mut self, value: bool) {
        self.can_contain_piece = value;
        if !value {
            self.piece = None;
        }
    }

    /// Places the piece in the cell. Does nothing when the cell is occupied or cannot hold pieces.
    pub fn assign_piece(&mut self, piece: Piece) {
        if self.is_available() {
            self.piece = Some(piece);
        }
    }

    pub fn remove_piece(&mut self) -> Option<Piece> {
        self.piece.take()
    }

    /// Determines whether the pieces of both cells can trade places.
    pub fn can_swap_piece_with(&self, other: &GridCell) -> bool {
        let (Some(lhs), Some(rhs)) = (&self.piece, &other.piece) else {
            return false;
        };
        self.can_contain_piece
            && other.can_contain_piece
            && !lhs.locked
            && !rhs.locked
            && self != other
            && !lhs.piece_type.same_look(&rhs.piece_type)
            && lhs.piece_type.can_be_swapped()
            && rhs.piece_type.can_be_swapped()
    }

    /// Exchanges the pieces of both cells if allowed; never swaps partially.
    pub fn swap_piece_with(&mut self, other: &mut GridCell) -> bool {
        if !self.can_swap_piece_with(other) {
            return false;
        }
        std::mem::swap(&mut self.piece, &mut other.piece);
        true
    }

    pub fn in_same_row_as(&self, other: &GridCell) -> bool {
        self.coord.row == other.coord.row
    }

    pub fn in_same_column_as(&self, other: &GridCell) -> bool {
        self.coord.col == other.coord.col
    }

    pub fn in_same_position_as(&self, other: &GridCell) -> bool {
        self == other
    }

    pub fn is_row_neighbour_of(&self, other: &GridCell) -> bool {
        self.coord.row_neighbour_of(&other.coord)
    }

    pub fn is_column_neighbour_of(&self, other: &GridCell) -> bool {
        self.coord.column_neighbour_of(&other.coord)
    }

    pub fn is_adjacent_to(&self, other: &GridCell) -> bool {
        self.is_row_neighbour_of(other) || self.is_column_neighbour_of(other)
    }

    pub fn in_diagonal_with(&self, other: &GridCell) -> bool {
        self.coord.diagonal_to(&other.coord)
    }

    // position checks; each one reads the [up, bottom, right, left] links

    fn links(&self) -> [bool; 4] {
        let n = &self.neighbours;
        [n.up.is_some(), n.bottom.is_some(), n.right.is_some(), n.left.is_some()]
    }

    pub fn is_top_left_corner(&self) -> bool {
        self.links() == [false, true, true, false]
    }

    pub fn is_top_right_corner(&self) -> bool {
        self.links() == [false, true, false, true]
    }

    pub fn is_bottom_left_corner(&self) -> bool {
        self.links() == [true, false, true, false]
    }

    pub fn is_bottom_right_corner(&self) -> bool {
        self.links() == [true, false, false, true]
    }

    pub fn is_top_border(&self) -> bool {
        self.links() == [false, true, true, true]
    }

    pub fn is_bottom_border(&self) -> bool {
        self.links() == [true, false, true, true]
    }

    pub fn is_right_border(&self) -> bool {
        self.links() == [true, true, false, true]
    }

    pub fn is_left_border(&self) -> bool {
        self.links() == [true, true, true, false]
    }
}
