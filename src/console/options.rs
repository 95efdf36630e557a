use clap::Parser;
use crate::prelude::*;

#[derive(Clone, Debug, Parser)]
#[command(version, about = "Plays match-3 boards over a line protocol on stdin/stdout")]
pub struct ConsoleOptions {
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[arg(long, default_value_t = 8)]
    pub width: usize,

    #[arg(long, default_value_t = 7)]
    pub height: usize,

    #[arg(short, long, default_value_t = 20)]
    pub moves: u32,

    #[arg(short, long)]
    pub seed: Option<u64>,

    #[arg(short, long, default_value = "fall-down")]
    pub fill_mode: FillMode,

    /// Piece definitions as shape[:kind][:weight]; repeat or separate with commas.
    #[arg(short, long, value_delimiter = ',')]
    pub pieces: Vec<PieceSpec>,

    #[arg(long)]
    pub min_match: Option<usize>,

    #[arg(long)]
    pub max_match: Option<usize>,

    #[arg(short, long, default_value_t = false)]
    pub t_shape: bool,

    #[arg(short = 'L', long, default_value_t = false)]
    pub l_shape: bool,

    #[arg(long, default_value_t = false)]
    pub transparent_gaps: bool,

    #[arg(long, default_value_t = false)]
    pub normal_matches_special: bool,

    #[arg(short, long, default_value_t = false)]
    pub allow_matches_on_start: bool,
}

/// Everything needed to start a game session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    pub width: usize,
    pub height: usize,
    pub moves: u32,
    pub seed: Option<u64>,
    pub fill_mode: FillMode,
    pub pieces: Vec<Piece>,
    pub finder: LinearSequenceFinder,
    pub allow_matches_on_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            width: 8,
            height: 7,
            moves: 20,
            seed: None,
            fill_mode: FillMode::default(),
            pieces: ["square", "circle", "triangle", "prism"].map(Piece::normal).to_vec(),
            finder: LinearSequenceFinder::default(),
            allow_matches_on_start: false,
        }
    }
}

impl SessionConfig {
    /// Builds an unprepared board for this session.
    pub fn board(&self) -> Board {
        let generator: Box<dyn PieceGenerator> = match self.seed {
            Some(seed) => Box::new(PieceWeightGenerator::seeded(seed)),
            None       => Box::new(PieceWeightGenerator::new()),
        };
        let board = Board::new(self.width, self.height, self.moves, Some(generator), Some(Box::new(self.finder.clone())))
            .with_fill_mode(self.fill_mode)
            .with_available_pieces(self.pieces.iter().cloned());
        match self.seed {
            Some(seed) => board.with_seed(seed),
            None       => board,
        }
    }
}

impl ConsoleOptions {
    pub fn session_config(&self) -> SessionConfig {
        let mut config = SessionConfig {
            width: self.width,
            height: self.height,
            moves: self.moves,
            seed: self.seed,
            fill_mode: self.fill_mode,
            allow_matches_on_start: self.allow_matches_on_start,
            ..SessionConfig::default()
        };

        if !self.pieces.is_empty() {
            config.pieces = self.pieces.iter().map(|spec| spec.piece.clone()).collect();
        }
        if let Some(min_match) = self.min_match {
            config.finder = config.finder.with_min_match(min_match);
        }
        if let Some(max_match) = self.max_match {
            config.finder = config.finder.with_max_match(max_match);
        }
        if self.t_shape {
            config.finder = config.finder.enable_t_shape();
        }
        if self.l_shape {
            config.finder = config.finder.enable_l_shape();
        }
        if self.transparent_gaps {
            config.finder = config.finder.with_gap_policy(GapPolicy::Transparent);
        }
        if self.normal_matches_special {
            config.finder = config.finder.with_match_policy(MatchPolicy::NormalMatchesSpecial);
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_become_a_session() {
        let options = ConsoleOptions::parse_from([
            "match3", "--width", "6", "--seed", "3", "-f", "side-down", "-p", "gem:normal:2,star:special", "-p", "orb",
            "--min-match", "4", "-t",
        ]);
        let config = options.session_config();

        assert_eq!((config.width, config.height, config.moves), (6, 7, 20));
        assert_eq!(config.fill_mode, FillMode::SideDown);
        assert_eq!(config.pieces.len(), 3);
        assert_eq!(config.pieces[0].weight, 2.0);
        assert_eq!(config.finder.min_match, 4);
        assert_eq!(config.finder.max_match, 5);
        assert!(config.finder.t_shape && !config.finder.l_shape);

        let board = config.board();
        assert_eq!(board.size(), (6, 7));
        assert_eq!(board.available_pieces().len(), 3);
    }

    #[test]
    fn defaults_use_four_plain_shapes() {
        let config = ConsoleOptions::parse_from(["match3"]).session_config();
        assert_eq!(config.pieces.len(), 4);
        assert_eq!(config.finder.gap_policy, GapPolicy::Breaks);
        assert!(!config.allow_matches_on_start);
    }
}
