use itertools::Itertools;

use crate::match3::prelude::*;

/// How a run treats cells without a piece in the middle of a row or column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GapPolicy {
    /// A run only grows through direct neighbours, so an empty or disabled cell ends it.
    #[default]
    Breaks,
    /// Empty cells are invisible; the run continues with the next piece in the line.
    Transparent,
}

/// Detects sequences of matching pieces on a grid.
pub trait SequenceFinder {
    /// Scans one row of cells (left to right) for horizontal runs, largest first.
    fn find_horizontal_sequences(&self, cells: &[&GridCell]) -> Vec<Sequence>;

    /// Scans one column of cells (top to bottom) for vertical runs, largest first.
    fn find_vertical_sequences(&self, cells: &[&GridCell]) -> Vec<Sequence>;

    /// Joins a horizontal and a vertical sequence that cross at one's midpoint. `None` while T
    /// shapes are disabled.
    fn find_t_shape_sequence(&self, a: &Sequence, b: &Sequence) -> Option<Sequence>;

    /// Joins a horizontal and a vertical sequence that meet at their edges. `None` while L shapes
    /// are disabled.
    fn find_l_shape_sequence(&self, a: &Sequence, b: &Sequence) -> Option<Sequence>;

    /// Every sequence on the grid, largest first.
    fn find_board_sequences(&self, grid: &Grid) -> Vec<Sequence>;

    /// The most specific sequence that contains the given cell, if any. Only the cell's own row and
    /// column are scanned.
    fn find_match_from_cell(&self, grid: &Grid, coord: &Coord) -> Option<Sequence>;

    fn find_horizontal_board_sequences(&self, grid: &Grid) -> Vec<Sequence> {
        (0..grid.height()).flat_map(|row| self.find_horizontal_sequences(&grid.row(row))).collect()
    }

    fn find_vertical_board_sequences(&self, grid: &Grid) -> Vec<Sequence> {
        (0..grid.width()).flat_map(|col| self.find_vertical_sequences(&grid.column(col))).collect()
    }
}

/// The default finder: a single linear pass per row and column, followed by T and L composition.
///
/// Composite shapes supersede their constituents. A horizontal or vertical run that took part in a
/// T or L is reported only as part of that composite, and each run joins at most one composite.
#[derive(Clone, Debug)]
pub struct LinearSequenceFinder {
    pub min_match: usize,
    pub max_match: usize,
    pub horizontal: bool,
    pub vertical: bool,
    pub t_shape: bool,
    pub l_shape: bool,
    pub gap_policy: GapPolicy,
    pub match_policy: MatchPolicy,
}

impl Default for LinearSequenceFinder {
    fn default() -> Self {
        LinearSequenceFinder {
            min_match: MIN_MATCH,
            max_match: DEFAULT_MAX_MATCH,
            horizontal: true,
            vertical: true,
            t_shape: false,
            l_shape: false,
            gap_policy: GapPolicy::default(),
            match_policy: MatchPolicy::default(),
        }
    }
}

impl LinearSequenceFinder {
    pub fn new() -> LinearSequenceFinder {
        LinearSequenceFinder::default()
    }

    /// Sets the minimum run length; never lower than three. Raises the maximum to match if needed.
    pub fn with_min_match(mut self, min_match: usize) -> Self {
        self.min_match = min_match.max(MIN_MATCH);
        self.max_match = self.max_match.max(self.min_match);
        self
    }

    /// Sets the maximum run length; never lower than the minimum.
    pub fn with_max_match(mut self, max_match: usize) -> Self {
        self.max_match = max_match.max(self.min_match);
        self
    }

    pub fn with_gap_policy(mut self, gap_policy: GapPolicy) -> Self {
        self.gap_policy = gap_policy;
        self
    }

    pub fn with_match_policy(mut self, match_policy: MatchPolicy) -> Self {
        self.match_policy = match_policy;
        self
    }

    pub fn enable_horizontal_shape(mut self) -> Self {
        self.horizontal = true;
        self
    }

    pub fn disable_horizontal_shape(mut self) -> Self {
        self.horizontal = false;
        self
    }

    pub fn enable_vertical_shape(mut self) -> Self {
        self.vertical = true;
        self
    }

    pub fn disable_vertical_shape(mut self) -> Self {
        self.vertical = false;
        self
    }

    pub fn enable_t_shape(mut self) -> Self {
        self.t_shape = true;
        self
    }

    pub fn disable_t_shape(mut self) -> Self {
        self.t_shape = false;
        self
    }

    pub fn enable_l_shape(mut self) -> Self {
        self.l_shape = true;
        self
    }

    pub fn disable_l_shape(mut self) -> Self {
        self.l_shape = false;
        self
    }

    /// Two pieces belong to the same run when either one matches the other.
    fn pieces_match(&self, lhs: &GridCell, rhs: &GridCell) -> bool {
        match (&lhs.piece, &rhs.piece) {
            (Some(a), Some(b)) => {
                a.match_with_policy(b, self.match_policy) || b.match_with_policy(a, self.match_policy)
            }
            _ => false,
        }
    }

    /// Moves the run into the results if its length is acceptable, and empties it either way.
    fn flush(&self, run: &mut Vec<&GridCell>, shape: Shape, found: &mut Vec<Sequence>) {
        if (self.min_match..=self.max_match).contains(&run.len()) {
            found.push(Sequence::new(run.iter().map(|&cell| cell.clone()).collect(), Some(shape)));
        }
        run.clear();
    }

    fn scan(&self, cells: &[&GridCell], shape: Shape) -> Vec<Sequence> {
        let neighbours = |prev: &GridCell, next: &GridCell| match shape {
            Shape::Horizontal => next.is_row_neighbour_of(prev),
            _                 => next.is_column_neighbour_of(prev),
        };

        let mut found = vec![];
        let mut run: Vec<&GridCell> = vec![];
        for &cell in cells.iter().filter(|cell| cell.has_piece()) {
            let extends = run.last().is_none_or(|&prev| {
                (self.gap_policy == GapPolicy::Transparent || neighbours(prev, cell)) && self.pieces_match(prev, cell)
            });

            if extends {
                run.push(cell);
                if run.len() >= self.max_match {
                    self.flush(&mut run, shape, &mut found);
                }
            } else {
                self.flush(&mut run, shape, &mut found);
                run.push(cell);
            }
        }
        self.flush(&mut run, shape, &mut found);

        by_size_descending(&mut found);
        found
    }

    /// Orders the pair as (horizontal, vertical), or gives up if it is not one of each.
    fn split<'s>(a: &'s Sequence, b: &'s Sequence) -> Option<(&'s Sequence, &'s Sequence)> {
        match (a.shape(), b.shape()) {
            (Shape::Horizontal, Shape::Vertical) => Some((a, b)),
            (Shape::Vertical, Shape::Horizontal) => Some((b, a)),
            _                                    => None,
        }
    }

    fn join(horizontal: &Sequence, vertical: &Sequence, shape: Shape) -> Sequence {
        let cells = horizontal.cells().iter().chain(vertical.cells()).cloned().collect_vec();
        Sequence::new(cells, Some(shape))
    }

    /// Tries L first and T second.
    fn compose(&self, horizontal: &Sequence, vertical: &Sequence) -> Option<Sequence> {
        self.find_l_shape_sequence(horizontal, vertical).or_else(|| self.find_t_shape_sequence(horizontal, vertical))
    }
}

fn same_cell(lhs: Option<&GridCell>, rhs: Option<&GridCell>) -> bool {
    matches!((lhs, rhs), (Some(a), Some(b)) if a == b)
}

fn by_size_descending(sequences: &mut [Sequence]) {
    sequences.sort_by(|a, b| b.size().cmp(&a.size()));
}

impl SequenceFinder for LinearSequenceFinder {
    fn find_horizontal_sequences(&self, cells: &[&GridCell]) -> Vec<Sequence> {
        self.scan(cells, Shape::Horizontal)
    }

    fn find_vertical_sequences(&self, cells: &[&GridCell]) -> Vec<Sequence> {
        self.scan(cells, Shape::Vertical)
    }

    fn find_t_shape_sequence(&self, a: &Sequence, b: &Sequence) -> Option<Sequence> {
        if !self.t_shape {
            return None;
        }
        let (h, v) = LinearSequenceFinder::split(a, b)?;
        let crossing = same_cell(h.middle_cell(), v.top_edge_cell())
            || same_cell(h.middle_cell(), v.bottom_edge_cell())
            || same_cell(v.middle_cell(), h.left_edge_cell())
            || same_cell(v.middle_cell(), h.right_edge_cell());
        crossing.then(|| LinearSequenceFinder::join(h, v, Shape::TShape))
    }

    fn find_l_shape_sequence(&self, a: &Sequence, b: &Sequence) -> Option<Sequence> {
        if !self.l_shape {
            return None;
        }
        let (h, v) = LinearSequenceFinder::split(a, b)?;
        let cornered = [h.left_edge_cell(), h.right_edge_cell()]
            .into_iter()
            .cartesian_product([v.top_edge_cell(), v.bottom_edge_cell()])
            .any(|(lhs, rhs)| same_cell(lhs, rhs));
        cornered.then(|| LinearSequenceFinder::join(h, v, Shape::LShape))
    }

    fn find_board_sequences(&self, grid: &Grid) -> Vec<Sequence> {
        let horizontal = if self.horizontal { self.find_horizontal_board_sequences(grid) } else { vec![] };
        let vertical = if self.vertical { self.find_vertical_board_sequences(grid) } else { vec![] };

        let mut used_horizontal = HashSet::new();
        let mut used_vertical = HashSet::new();
        let mut sequences = vec![];

        if self.t_shape || self.l_shape {
            for ((i, h), (j, v)) in horizontal.iter().enumerate().cartesian_product(vertical.iter().enumerate()) {
                if used_horizontal.contains(&i) || used_vertical.contains(&j) {
                    continue;
                }
                if let Some(composite) = self.compose(h, v) {
                    log::trace!("composed a {:?} of size {}", composite.shape(), composite.size());
                    used_horizontal.insert(i);
                    used_vertical.insert(j);
                    sequences.push(composite);
                }
            }
        }

        sequences.extend(
            horizontal.into_iter().enumerate().filter(|(i, _)| !used_horizontal.contains(i)).map(|(_, s)| s),
        );
        sequences.extend(
            vertical.into_iter().enumerate().filter(|(j, _)| !used_vertical.contains(j)).map(|(_, s)| s),
        );
        by_size_descending(&mut sequences);
        sequences
    }

    fn find_match_from_cell(&self, grid: &Grid, coord: &Coord) -> Option<Sequence> {
        if !grid.get(coord)?.has_piece() {
            return None;
        }

        let containing = |sequences: Vec<Sequence>| sequences.into_iter().find(|s| s.contains(coord));
        let horizontal = self
            .horizontal
            .then(|| containing(self.find_horizontal_sequences(&grid.row(coord.row))))
            .flatten();
        let vertical = self
            .vertical
            .then(|| containing(self.find_vertical_sequences(&grid.column(coord.col))))
            .flatten();

        if let (Some(h), Some(v)) = (&horizontal, &vertical) {
            let composite = self.find_t_shape_sequence(h, v).or_else(|| self.find_l_shape_sequence(h, v));
            if composite.is_some() {
                return composite;
            }
        }

        match (horizontal, vertical) {
            (Some(h), Some(v)) => Some(if v.size() > h.size() { v } else { h }),
            (h, v)             => h.or(v),
        }
    }
}
