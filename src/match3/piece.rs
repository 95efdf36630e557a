use uuid::Uuid;

use crate::utils::prelude::*;

/// The category of a piece; decides what the piece is allowed to do on the board.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PieceKind {
    #[default]
    Normal = 0,
    Special = 1,
    Obstacle = 2,
}

impl PieceKind {
    /// Gets the piece kinds in order.
    pub fn all() -> [PieceKind; 3] {
        [PieceKind::Normal, PieceKind::Special, PieceKind::Obstacle]
    }

    /// Notates the kind.
    pub fn notate(&self) -> String {
        match self {
            PieceKind::Normal   => "normal",
            PieceKind::Special  => "special",
            PieceKind::Obstacle => "obstacle",
        }.into()
    }
}

impl std::str::FromStr for PieceKind {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" | "n"   => Ok(PieceKind::Normal),
            "special" | "s"  => Ok(PieceKind::Special),
            "obstacle" | "o" => Ok(PieceKind::Obstacle),
            _                => Err(anyhow!("invalid notation {s} for PieceKind"))
        }
    }
}

/// Which pieces a normal piece is willing to match against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// Normal matches normal, special matches special.
    #[default]
    Strict,
    /// Normal pieces also match special pieces of the same shape and color.
    NormalMatchesSpecial,
}

/// The classification of a piece: its kind, plus the shape and color that decide what it matches.
#[derive(Clone, Debug)]
pub struct PieceType {
    pub kind: PieceKind,
    pub shape: String,
    pub color: Option<String>,
}

impl PartialEq for PieceType {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.same_look(other)
    }
}
impl Eq for PieceType {}

impl PieceType {
    pub fn new(kind: PieceKind, shape: &str, color: Option<&str>) -> PieceType {
        PieceType { kind, shape: shape.trim().to_owned(), color: color.map(str::to_owned) }
    }

    pub fn normal(shape: &str) -> PieceType {
        PieceType::new(PieceKind::Normal, shape, None)
    }

    pub fn special(shape: &str) -> PieceType {
        PieceType::new(PieceKind::Special, shape, None)
    }

    pub fn obstacle(shape: &str) -> PieceType {
        PieceType::new(PieceKind::Obstacle, shape, None)
    }

    /// Attaches a display color to the type.
    pub fn with_color(mut self, color: &str) -> PieceType {
        self.color = Some(color.to_owned());
        self
    }

    /// Whether the shape is the given one; shapes compare trimmed and case-insensitively.
    pub fn has_shape(&self, shape: &str) -> bool {
        self.shape.trim().eq_ignore_ascii_case(shape.trim())
    }

    /// Same shape and same color, regardless of kind.
    pub fn same_look(&self, other: &PieceType) -> bool {
        self.has_shape(&other.shape) && self.color == other.color
    }

    /// Determines whether this type matches the other one under the given policy.
    ///
    /// - obstacles never match anything, and nothing matches an obstacle
    /// - specials only match specials
    /// - normals match normals, and specials too if the policy allows it
    pub fn match_with(&self, other: &PieceType, policy: MatchPolicy) -> bool {
        let compatible = match (self.kind, other.kind) {
            (PieceKind::Obstacle, _) | (_, PieceKind::Obstacle) => false,
            (PieceKind::Special, PieceKind::Special)            => true,
            (PieceKind::Special, PieceKind::Normal)             => false,
            (PieceKind::Normal, PieceKind::Normal)              => true,
            (PieceKind::Normal, PieceKind::Special)             => policy == MatchPolicy::NormalMatchesSpecial,
        };
        compatible && self.same_look(other)
    }

    pub fn can_be_shuffled(&self) -> bool {
        self.kind != PieceKind::Obstacle
    }

    pub fn can_be_moved(&self) -> bool {
        self.kind != PieceKind::Obstacle
    }

    pub fn can_be_swapped(&self) -> bool {
        self.kind != PieceKind::Obstacle
    }
}

/// A game token. Each piece carries a fresh identity, a type, and the weight used when rolling it.
#[derive(Clone, Debug)]
pub struct Piece {
    pub id: Uuid,
    pub piece_type: PieceType,
    pub weight: f64,
    pub locked: bool,

    /// Running cumulative weight; only meaningful during a roll, reset to zero afterwards.
    pub(crate) accumulated_weight: f64,
}

/// Pieces are equal when they look the same (kind, shape and color); identity lives in `id`.
impl PartialEq for Piece {
    fn eq(&self, other: &Self) -> bool {
        self.piece_type == other.piece_type
    }
}

impl Piece {
    /// Creates a new piece with a weight of 1. Obstacles start locked.
    pub fn new(piece_type: PieceType) -> Piece {
        let locked = piece_type.kind == PieceKind::Obstacle;
        Piece { id: Uuid::new_v4(), piece_type, weight: 1.0, locked, accumulated_weight: 0.0 }
    }

    pub fn normal(shape: &str) -> Piece {
        Piece::new(PieceType::normal(shape))
    }

    pub fn special(shape: &str) -> Piece {
        Piece::new(PieceType::special(shape))
    }

    pub fn obstacle(shape: &str) -> Piece {
        Piece::new(PieceType::obstacle(shape))
    }

    /// Sets the roll weight; weights must be finite and strictly positive.
    pub fn with_weight(mut self, weight: f64) -> Result<Piece> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(anyhow!("piece weight must be a positive number, received {weight}"));
        }
        self.weight = weight;
        Ok(self)
    }

    /// Produces a copy of this piece with a fresh identity and a clean roll accumulator.
    pub fn spawn(&self) -> Piece {
        Piece { id: Uuid::new_v4(), accumulated_weight: 0.0, ..self.clone() }
    }

    pub fn kind(&self) -> PieceKind {
        self.piece_type.kind
    }

    pub fn shape(&self) -> &str {
        &self.piece_type.shape
    }

    pub fn is_normal(&self) -> bool {
        self.kind() == PieceKind::Normal
    }

    pub fn is_special(&self) -> bool {
        self.kind() == PieceKind::Special
    }

    pub fn is_obstacle(&self) -> bool {
        self.kind() == PieceKind::Obstacle
    }

    /// Whether both handles point at the very same piece, not just a lookalike.
    pub fn same_instance(&self, other: &Piece) -> bool {
        self.id == other.id
    }

    /// Matches under the strict policy.
    pub fn match_with(&self, other: &Piece) -> bool {
        self.match_with_policy(other, MatchPolicy::Strict)
    }

    pub fn match_with_policy(&self, other: &Piece, policy: MatchPolicy) -> bool {
        self.piece_type.match_with(&other.piece_type, policy)
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub(crate) fn reset_accumulated_weight(&mut self) {
        self.accumulated_weight = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacles_start_locked_and_never_match() {
        let rock = Piece::obstacle("rock");
        assert!(rock.locked);
        assert!(!rock.match_with(&Piece::obstacle("rock")));
        assert!(!Piece::normal("rock").match_with(&rock));
        assert!(!rock.piece_type.can_be_moved());
        assert!(!rock.piece_type.can_be_shuffled());
        assert!(!rock.piece_type.can_be_swapped());
    }

    #[test]
    fn shapes_match_trimmed_and_case_insensitively() {
        let a = Piece::normal("Square");
        let b = Piece::normal(" square ");
        assert!(a.match_with(&b));
        assert!(!a.match_with(&Piece::normal("circle")));
    }

    #[test]
    fn color_takes_part_in_matching() {
        let red = Piece::new(PieceType::normal("gem").with_color("red"));
        let blue = Piece::new(PieceType::normal("gem").with_color("blue"));
        assert!(!red.match_with(&blue));
        assert!(red.match_with(&red.spawn()));
    }

    #[test]
    fn special_matching_depends_on_policy() {
        let normal = Piece::normal("star");
        let special = Piece::special("star");

        assert!(special.match_with(&Piece::special("star")));
        assert!(!special.match_with(&normal));
        assert!(!normal.match_with(&special));
        assert!(normal.match_with_policy(&special, MatchPolicy::NormalMatchesSpecial));
        assert!(!special.match_with_policy(&normal, MatchPolicy::NormalMatchesSpecial));
    }

    #[test]
    fn spawn_gives_a_fresh_identity() {
        let piece = Piece::normal("circle").with_weight(2.5).unwrap();
        let copy = piece.spawn();
        assert_eq!(piece, copy);
        assert!(!piece.same_instance(&copy));
        assert_eq!(copy.weight, 2.5);
        assert!(piece.same_instance(&piece.clone()));
    }

    #[test]
    fn rejects_bad_weights() {
        assert!(Piece::normal("a").with_weight(0.0).is_err());
        assert!(Piece::normal("a").with_weight(-1.0).is_err());
        assert!(Piece::normal("a").with_weight(f64::NAN).is_err());
    }

    #[test]
    fn parses_kinds() {
        for kind in PieceKind::all() {
            assert_eq!(kind.notate().parse::<PieceKind>().unwrap(), kind);
        }
        assert!("boulder".parse::<PieceKind>().is_err());
    }
}
