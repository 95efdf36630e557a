use itertools::Itertools;
use rand::{Rng, seq::SliceRandom};

use crate::match3::prelude::*;

impl Board {
    /// Trades pieces between random pairs of cells.
    ///
    /// Only pieces that can be shuffled and moved take part, minus the excepted kinds and cells. Every
    /// cell is paired at most once, and only with a partner it can actually swap with. Returns the
    /// realized pairings as `from -> to`.
    pub fn shuffle(&mut self, except_kinds: &[PieceKind], except_cells: &[Coord]) -> Result<HashMap<Coord, Coord>> {
        if self.grid.is_empty() {
            return Err(anyhow!("cannot shuffle a board whose grid is not prepared"));
        }

        let mut pending = self
            .grid
            .iter()
            .filter(|cell| {
                cell.piece.as_ref().is_some_and(|piece| {
                    piece.piece_type.can_be_shuffled()
                        && piece.piece_type.can_be_moved()
                        && !except_kinds.contains(&piece.kind())
                })
            })
            .map(GridCell::coord)
            .filter(|coord| !except_cells.contains(coord))
            .collect_vec();
        if pending.is_empty() {
            return Err(anyhow!("there are no pieces to shuffle"));
        }
        pending.shuffle(&mut self.rng);

        let mut pairings = HashMap::new();
        while let Some(from) = pending.pop() {
            let partners = pending
                .iter()
                .enumerate()
                .filter(|(_, to)| {
                    let [a, b] = [&from, *to].map(|coord| self.grid.get(coord));
                    a.zip(b).is_some_and(|(a, b)| a.can_swap_piece_with(b))
                })
                .map(|(i, _)| i)
                .collect_vec();
            if partners.is_empty() {
                continue;
            }

            let to = pending.swap_remove(partners[self.rng.random_range(0..partners.len())]);
            if let Some((a, b)) = self.grid.pair_mut(&from, &to) {
                if a.swap_piece_with(b) {
                    pairings.insert(from, to);
                }
            }
        }

        log::debug!("shuffled {} pairs of pieces", pairings.len());
        Ok(pairings)
    }
}
