use regex::Regex;

use crate::match3::prelude::*;

/// Glyph used for an empty cell in a layout.
pub const EMPTY_GLYPH: char = '.';

/// Glyph used for a cell that cannot hold pieces.
pub const DISABLED_GLYPH: char = '#';

/// Glyph used for any obstacle.
pub const OBSTACLE_GLYPH: char = '%';

/// The character a piece type is written as: the first letter of its shape, lowercase for normal
/// pieces and uppercase for special ones. Obstacles share a single glyph.
pub fn glyph(piece_type: &PieceType) -> char {
    let first = piece_type.shape.chars().next().unwrap_or('?');
    match piece_type.kind {
        PieceKind::Normal   => first.to_ascii_lowercase(),
        PieceKind::Special  => first.to_ascii_uppercase(),
        PieceKind::Obstacle => OBSTACLE_GLYPH,
    }
}

/// A piece definition written as `shape[:kind][:weight]`, e.g. `square`, `star:special` or `gem:normal:2.5`.
#[derive(Clone, Debug)]
pub struct PieceSpec {
    pub repr: String,
    pub piece: Piece,
}

impl std::str::FromStr for PieceSpec {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let pattern = Regex::new(
            "^(?<shape>[A-Za-z][A-Za-z0-9_-]*)(?::(?<kind>[A-Za-z]+))?(?::(?<weight>[0-9]+(?:\\.[0-9]+)?))?$",
        )?;
        let Some(matches) = pattern.captures(s.trim()) else {
            return Err(anyhow!("could not parse piece {s}; expected shape[:kind][:weight]"));
        };

        let kind = match matches.name("kind") {
            Some(kind) => kind.as_str().parse::<PieceKind>()?,
            None       => PieceKind::Normal,
        };
        let shape = matches.name("shape").map_or("", |m| m.as_str());
        let mut piece = Piece::new(PieceType::new(kind, shape, None));
        if let Some(weight) = matches.name("weight") {
            piece = piece.with_weight(weight.as_str().parse::<f64>()?)?;
        }

        Ok(PieceSpec { repr: s.to_owned(), piece })
    }
}

impl From<PieceSpec> for Piece {
    fn from(value: PieceSpec) -> Self {
        value.piece
    }
}

/// A single position of a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayoutCell {
    Empty,
    Disabled,
    Piece(char),
}

/// A hand-written board, one string per row separated by `/`, e.g. `ab.c/#abc/cc%a`.
///
/// Every row must have the same length. Letters refer to pieces by [glyph], `.` leaves a cell empty,
/// `#` disables it and `%` places an obstacle.
#[derive(Clone, Debug)]
pub struct Layout {
    pub repr: String,
    pub width: usize,
    pub height: usize,
    cells: Vec<(Coord, LayoutCell)>,
}

impl std::str::FromStr for Layout {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let rows = s.trim().split('/').collect::<Vec<&str>>();
        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(anyhow!("layout cannot be empty"));
        }

        let mut cells = vec![];
        for (row, line) in rows.iter().enumerate() {
            if line.chars().count() != width {
                return Err(anyhow!("row {row} of layout {s} has {} cells, expected {width}", line.chars().count()));
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = match ch {
                    EMPTY_GLYPH                                 => LayoutCell::Empty,
                    DISABLED_GLYPH                              => LayoutCell::Disabled,
                    OBSTACLE_GLYPH                              => LayoutCell::Piece(ch),
                    ch if ch.is_ascii_alphabetic()              => LayoutCell::Piece(ch),
                    _                                           => return Err(anyhow!("invalid layout cell {ch}")),
                };
                cells.push((Coord::new(col, row), cell));
            }
        }

        Ok(Layout { repr: s.to_owned(), width, height: rows.len(), cells })
    }
}

impl Layout {
    pub fn get(&self, coord: &Coord) -> Option<LayoutCell> {
        self.cells.iter().find(|(c, _)| c == coord).map(|(_, cell)| *cell)
    }

    /// Positions marked as disabled.
    pub fn disabled(&self) -> Vec<Coord> {
        self.cells.iter().filter(|(_, cell)| *cell == LayoutCell::Disabled).map(|(coord, _)| *coord).collect()
    }

    /// Turns every piece glyph into a fresh piece taken from the legend, keyed by position.
    pub fn pieces(&self, legend: &[Piece]) -> Result<HashMap<Coord, Piece>> {
        let mut pieces = HashMap::new();
        for (coord, cell) in self.cells.iter() {
            let LayoutCell::Piece(ch) = cell else {
                continue;
            };
            let Some(piece) = legend.iter().find(|piece| glyph(&piece.piece_type) == *ch) else {
                return Err(anyhow!("no available piece is written as {ch}"));
            };
            pieces.insert(*coord, piece.spawn());
        }
        Ok(pieces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_piece_specs() {
        let square = "square".parse::<PieceSpec>().unwrap().piece;
        assert_eq!(square.kind(), PieceKind::Normal);
        assert_eq!(square.weight, 1.0);

        let star = "star:special:2.5".parse::<PieceSpec>().unwrap().piece;
        assert_eq!(star.kind(), PieceKind::Special);
        assert_eq!(star.weight, 2.5);

        let gem = Piece::from("gem:3".parse::<PieceSpec>().unwrap());
        assert_eq!((gem.kind(), gem.weight), (PieceKind::Normal, 3.0));

        let rock = "rock:o".parse::<PieceSpec>().unwrap().piece;
        assert!(rock.is_obstacle() && rock.locked);
    }

    #[test]
    fn rejects_bad_piece_specs() {
        for bad in ["", ":normal", "gem:metal", "gem:normal:0", "gem:normal:-1", "gem::2"] {
            assert!(bad.parse::<PieceSpec>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn glyphs_follow_kind() {
        assert_eq!(glyph(&PieceType::normal("Square")), 's');
        assert_eq!(glyph(&PieceType::special("star")), 'S');
        assert_eq!(glyph(&PieceType::obstacle("rock")), OBSTACLE_GLYPH);
    }

    #[test]
    fn parses_layouts() {
        let layout = "ab.c/#abc/cc%A".parse::<Layout>().unwrap();
        assert_eq!((layout.width, layout.height), (4, 3));
        assert_eq!(layout.get(&Coord::new(2, 0)), Some(LayoutCell::Empty));
        assert_eq!(layout.get(&Coord::new(0, 1)), Some(LayoutCell::Disabled));
        assert_eq!(layout.get(&Coord::new(3, 2)), Some(LayoutCell::Piece('A')));
        assert_eq!(layout.disabled(), vec![Coord::new(0, 1)]);

        assert!("abc/ab".parse::<Layout>().is_err());
        assert!("".parse::<Layout>().is_err());
        assert!("a!c".parse::<Layout>().is_err());
    }

    #[test]
    fn resolves_layout_pieces_against_a_legend() {
        let legend = vec![Piece::normal("apple"), Piece::special("apple"), Piece::obstacle("rock")];
        let layout = "aA%/.#a".parse::<Layout>().unwrap();
        let pieces = layout.pieces(&legend).unwrap();

        assert_eq!(pieces.len(), 4);
        assert!(pieces[&Coord::new(1, 0)].is_special());
        assert!(pieces[&Coord::new(2, 0)].is_obstacle());
        assert!(!pieces[&Coord::new(0, 0)].same_instance(&legend[0]));

        assert!("ab/ba/ab".parse::<Layout>().unwrap().pieces(&legend).is_err());
    }
}
