use crate::utils::prelude::*;

pub const MIN_GRID_WIDTH: usize = 3;
pub const MIN_GRID_HEIGHT: usize = 3;
pub const MIN_MATCH: usize = 3;
pub const DEFAULT_MAX_MATCH: usize = 5;

/// Distinct piece definitions required before a board agrees to fill itself.
pub const MIN_AVAILABLE_PIECES: usize = 3;

/// Upper bound on the re-roll passes used to strip matches off a freshly filled board.
pub const MAX_REMATCH_PASSES: usize = 512;

/// How empty cells are replenished after a sequence is consumed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Pieces fall straight down into empty cells, then the gaps left at the top are refilled.
    #[default]
    FallDown,
    /// Nothing moves; every empty cell is refilled where it is.
    InPlace,
    /// Pieces fall straight down, sliding into an empty bottom diagonal when the cell below is taken.
    SideDown,
}

impl FillMode {
    /// Notates the fill mode.
    pub fn notate(&self) -> String {
        match self {
            FillMode::FallDown => "fall-down",
            FillMode::InPlace  => "in-place",
            FillMode::SideDown => "side-down",
        }.into()
    }
}

impl std::str::FromStr for FillMode {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fall-down" | "falldown" | "fall" => Ok(FillMode::FallDown),
            "in-place" | "inplace" | "place"  => Ok(FillMode::InPlace),
            "side-down" | "sidedown" | "side" => Ok(FillMode::SideDown),
            _                                 => Err(anyhow!("invalid notation {s} for FillMode"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FillMode;

    #[test]
    fn parses_fill_modes() {
        assert_eq!("fall-down".parse::<FillMode>().unwrap(), FillMode::FallDown);
        assert_eq!("InPlace".parse::<FillMode>().unwrap(), FillMode::InPlace);
        assert_eq!("side".parse::<FillMode>().unwrap(), FillMode::SideDown);
        assert!("sideways".parse::<FillMode>().is_err());
    }

    #[test]
    fn notation_round_trips() {
        for mode in [FillMode::FallDown, FillMode::InPlace, FillMode::SideDown] {
            assert_eq!(mode.notate().parse::<FillMode>().unwrap(), mode);
        }
    }
}
