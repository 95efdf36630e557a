use crate::utils::prelude::*;

/// Simple board coordinate; column grows to the right and row grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord {
    pub col: usize,
    pub row: usize,
}

impl std::str::FromStr for Coord {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let Some((col, row)) = s.split_once(',') else {
            return Err(anyhow!("expected a coordinate of the form col,row; received {s}"));
        };
        let [col, row] = [col, row].map(|x| x.trim().parse::<usize>());
        Ok(Coord { col: col?, row: row? })
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

impl Coord {
    /// Determines whether or not the coord lies on a grid of the given size.
    pub fn in_bounds(&self, width: usize, height: usize) -> bool {
        self.col < width && self.row < height
    }

    /// Constructs a new coord.
    pub fn new(col: usize, row: usize) -> Coord {
        Coord { col, row }
    }

    /// Whether the other coord is exactly one diagonal step away.
    pub fn diagonal_to(&self, other: &Coord) -> bool {
        self.col.abs_diff(other.col) == 1 && self.row.abs_diff(other.row) == 1
    }

    /// Whether the other coord shares the row and sits one column away.
    pub fn row_neighbour_of(&self, other: &Coord) -> bool {
        self.row == other.row && self.col.abs_diff(other.col) == 1
    }

    /// Whether the other coord shares the column and sits one row away.
    pub fn column_neighbour_of(&self, other: &Coord) -> bool {
        self.col == other.col && self.row.abs_diff(other.row) == 1
    }
}

// Simple offset pair that can be used to calculate neighbours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OffsetCoord {
    pub cols: isize,
    pub rows: isize,
}

pub const UP: OffsetCoord = OffsetCoord { cols: 0, rows: -1 };
pub const DOWN: OffsetCoord = OffsetCoord { cols: 0, rows: 1 };
pub const LEFT: OffsetCoord = OffsetCoord { cols: -1, rows: 0 };
pub const RIGHT: OffsetCoord = OffsetCoord { cols: 1, rows: 0 };
pub const UP_LEFT: OffsetCoord = OffsetCoord { cols: -1, rows: -1 };
pub const UP_RIGHT: OffsetCoord = OffsetCoord { cols: 1, rows: -1 };
pub const DOWN_LEFT: OffsetCoord = OffsetCoord { cols: -1, rows: 1 };
pub const DOWN_RIGHT: OffsetCoord = OffsetCoord { cols: 1, rows: 1 };

/// Offsets that turn a coordinate into one of its orthogonal neighbours.
pub static ORTHOGONAL_OFFSETS: [OffsetCoord; 4] = [UP, RIGHT, LEFT, DOWN];

/// Offsets that turn a coordinate into one of its diagonal neighbours.
pub static DIAGONAL_OFFSETS: [OffsetCoord; 4] = [DOWN_RIGHT, DOWN_LEFT, UP_RIGHT, UP_LEFT];

impl OffsetCoord {
    /// Coerces the offset into a coordinate, if neither component is negative.
    pub fn coerce(&self) -> Option<Coord> {
        if self.cols < 0 || self.rows < 0 {
            return None;
        }
        Some(Coord { col: self.cols as usize, row: self.rows as usize })
    }

    /// Determines whether or not the coord lies on a grid of the given size.
    pub fn in_bounds_signed(&self, width: usize, height: usize) -> bool {
        0 <= self.cols && (self.cols as usize) < width && 0 <= self.rows && (self.rows as usize) < height
    }

    /// Constructs a new offset coord.
    pub fn new(cols: isize, rows: isize) -> OffsetCoord {
        OffsetCoord { cols, rows }
    }
}

// C -> OC

impl From<Coord> for OffsetCoord {
    fn from(value: Coord) -> Self {
        OffsetCoord::from(&value)
    }
}

impl From<&Coord> for OffsetCoord {
    fn from(value: &Coord) -> Self {
        OffsetCoord {
            cols: value.col as isize,
            rows: value.row as isize,
        }
    }
}

// OC + OC

impl Add<&OffsetCoord> for &OffsetCoord {
    type Output = OffsetCoord;
    fn add(self, rhs: &OffsetCoord) -> Self::Output {
        OffsetCoord {
            cols: self.cols + rhs.cols,
            rows: self.rows + rhs.rows,
        }
    }
}

impl Add<OffsetCoord> for OffsetCoord {
    type Output = OffsetCoord;
    fn add(self, rhs: OffsetCoord) -> Self::Output {
        &self + &rhs
    }
}

// C + OC

impl Add<&OffsetCoord> for &Coord {
    type Output = OffsetCoord;
    fn add(self, rhs: &OffsetCoord) -> Self::Output {
        &OffsetCoord::from(self) + rhs
    }
}

impl Add<OffsetCoord> for Coord {
    type Output = OffsetCoord;
    fn add(self, rhs: OffsetCoord) -> Self::Output {
        &self + &rhs
    }
}

// C - C

impl Sub<&Coord> for &Coord {
    type Output = OffsetCoord;
    fn sub(self, rhs: &Coord) -> Self::Output {
        let [lhs, rhs] = [OffsetCoord::from(self), OffsetCoord::from(rhs)];
        OffsetCoord {
            cols: lhs.cols - rhs.cols,
            rows: lhs.rows - rhs.rows,
        }
    }
}

impl Sub<Coord> for Coord {
    type Output = OffsetCoord;
    fn sub(self, rhs: Coord) -> Self::Output {
        &self - &rhs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_off_the_grid_do_not_coerce() {
        let origin = Coord::new(0, 0);
        assert_eq!((origin + UP).coerce(), None);
        assert_eq!((origin + LEFT).coerce(), None);
        assert_eq!((origin + DOWN_RIGHT).coerce(), Some(Coord::new(1, 1)));
    }

    #[test]
    fn neighbour_predicates() {
        let c = Coord::new(2, 2);
        assert!(c.row_neighbour_of(&Coord::new(3, 2)));
        assert!(!c.row_neighbour_of(&Coord::new(4, 2)));
        assert!(c.column_neighbour_of(&Coord::new(2, 1)));
        assert!(c.diagonal_to(&Coord::new(1, 3)));
        assert!(!c.diagonal_to(&Coord::new(2, 3)));
        assert_eq!(Coord::new(3, 1) - c, OffsetCoord::new(1, -1));
    }

    #[test]
    fn parses_coords() {
        assert_eq!("4, 7".parse::<Coord>().unwrap(), Coord::new(4, 7));
        assert!("47".parse::<Coord>().is_err());
        assert!("-1,2".parse::<Coord>().is_err());
    }
}
