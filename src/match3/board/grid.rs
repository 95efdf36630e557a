use crate::match3::prelude::*;

/// The arena of cells on a board, indexed `[column][row]`.
///
/// A grid is either empty (not prepared yet) or holds exactly `width * height` cells whose
/// neighbour links agree with their positions.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Vec<GridCell>>,
}

impl Grid {
    /// Allocates a fully linked grid of fresh, empty cells.
    pub fn new(width: usize, height: usize) -> Grid {
        let cells = (0..width)
            .map(|col| (0..height).map(|row| GridCell::at(Coord::new(col, row))).collect())
            .collect();
        let mut grid = Grid { width, height, cells };
        grid.update_neighbours();
        grid
    }

    /// Recomputes the eight links of every cell from its position.
    pub fn update_neighbours(&mut self) {
        let [width, height] = [self.width, self.height];
        for cell in self.iter_mut() {
            cell.neighbours = Neighbours::on_grid(&cell.coord(), width, height);
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The number of cells in the grid.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, coord: &Coord) -> Option<&GridCell> {
        self.cells.get(coord.col)?.get(coord.row)
    }

    pub fn get_mut(&mut self, coord: &Coord) -> Option<&mut GridCell> {
        self.cells.get_mut(coord.col)?.get_mut(coord.row)
    }

    /// Bounds-checked lookup by signed position; anything off the grid is `None`.
    pub fn cell(&self, col: isize, row: isize) -> Option<&GridCell> {
        self.get(&OffsetCoord::new(col, row).coerce()?)
    }

    /// Two distinct cells borrowed mutably at once, in the order asked for.
    pub fn pair_mut(&mut self, a: &Coord, b: &Coord) -> Option<(&mut GridCell, &mut GridCell)> {
        if a == b || !a.in_bounds(self.width, self.height) || !b.in_bounds(self.width, self.height) {
            return None;
        }

        if a.col == b.col {
            let column = &mut self.cells[a.col];
            let (lo, hi) = column.split_at_mut(a.row.max(b.row));
            let [first, second] = [&mut lo[a.row.min(b.row)], &mut hi[0]];
            Some(if a.row < b.row { (first, second) } else { (second, first) })
        } else {
            let (left, right) = if a.col < b.col { (a, b) } else { (b, a) };
            let (lo, hi) = self.cells.split_at_mut(right.col);
            let [first, second] = [&mut lo[left.col][left.row], &mut hi[0][right.row]];
            Some(if a.col < b.col { (first, second) } else { (second, first) })
        }
    }

    /// Walks the grid column by column, top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GridCell> {
        self.cells.iter_mut().flatten()
    }

    /// The cells of one row, left to right.
    pub fn row(&self, row: usize) -> Vec<&GridCell> {
        self.cells.iter().filter_map(|column| column.get(row)).collect()
    }

    /// The cells of one column, top to bottom.
    pub fn column(&self, col: usize) -> Vec<&GridCell> {
        self.cells.get(col).map(|column| column.iter().collect()).unwrap_or_default()
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        self.iter().map(GridCell::coord)
    }
}
