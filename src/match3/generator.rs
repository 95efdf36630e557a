use itertools::Itertools;
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::match3::prelude::*;

/// Picks new pieces for the board out of a pool of available pieces.
pub trait PieceGenerator {
    /// Rolls one piece out of `pieces`, restricted to the given kinds if any. The result is a fresh
    /// piece; the pool itself is left as it was.
    fn roll(&mut self, pieces: &mut [Piece], only: Option<&[PieceKind]>) -> Result<Piece>;
}

/// Weighted random selection: every candidate wins with probability proportional to its weight.
///
/// Asking for a single kind always yields a piece of that kind, so a caller that needs at least one
/// piece per kind can roll once per kind.
#[derive(Clone, Debug)]
pub struct PieceWeightGenerator {
    rng: StdRng,
}

impl Default for PieceWeightGenerator {
    fn default() -> Self {
        PieceWeightGenerator::new()
    }
}

impl PieceWeightGenerator {
    pub fn new() -> PieceWeightGenerator {
        PieceWeightGenerator { rng: StdRng::from_os_rng() }
    }

    /// A generator that replays the same rolls for the same seed.
    pub fn seeded(seed: u64) -> PieceWeightGenerator {
        PieceWeightGenerator { rng: StdRng::seed_from_u64(seed) }
    }
}

impl PieceGenerator for PieceWeightGenerator {
    /// Each attempt:
    /// 1. shuffles the candidates so tied weights carry no positional bias
    /// 2. stores the running weight total on every candidate
    /// 3. draws a value in `[0, total]` and takes the first candidate whose running total reaches it
    ///
    /// Rounding can leave the draw above every running total, in which case we simply try again.
    fn roll(&mut self, pieces: &mut [Piece], only: Option<&[PieceKind]>) -> Result<Piece> {
        if pieces.is_empty() {
            return Err(anyhow!("pieces to roll cannot be empty"));
        }

        let mut candidates = (0..pieces.len())
            .filter(|&i| only.map_or(true, |kinds| kinds.contains(&pieces[i].kind())))
            .collect_vec();
        if candidates.is_empty() {
            return Err(anyhow!("no available piece is of the kinds {:?}", only.unwrap_or_default()));
        }

        let selected = loop {
            candidates.shuffle(&mut self.rng);

            let mut total = 0.0;
            for &i in candidates.iter() {
                pieces[i].reset_accumulated_weight();
                total += pieces[i].weight;
                pieces[i].accumulated_weight = total;
            }
            if !(total > 0.0 && total.is_finite()) {
                candidates.iter().for_each(|&i| pieces[i].reset_accumulated_weight());
                return Err(anyhow!("total roll weight must be positive, received {total}"));
            }

            let roll = self.rng.random_range(0.0..=total);
            if let Some(&i) = candidates.iter().find(|&&i| roll <= pieces[i].accumulated_weight) {
                break pieces[i].spawn();
            }
            log::trace!("roll {roll} fell past the cumulative total {total}; rolling again");
        };

        candidates.iter().for_each(|&i| pieces[i].reset_accumulated_weight());
        Ok(selected)
    }
}
