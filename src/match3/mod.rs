/*
 *  A deterministic, engine-agnostic simulation core for match-3 puzzle boards.
 */

pub mod board;
pub mod cell;
pub mod consts;
pub mod coords;
pub mod events;
pub mod finder;
pub mod generator;
pub mod notation;
pub mod piece;
pub mod sequence;

pub mod prelude {
    pub(crate) use crate::utils::prelude::*;

    pub use super::{
        board::{Board, CellUpdate, Grid, VirtualBoard},
        cell::{GridCell, Neighbours},
        consts::*,
        coords::{self, *},
        events::{BoardEvent, ListenerId, Notifier},
        finder::{GapPolicy, LinearSequenceFinder, SequenceFinder},
        generator::{PieceGenerator, PieceWeightGenerator},
        notation::*,
        piece::{MatchPolicy, Piece, PieceKind, PieceType},
        sequence::{Sequence, Shape},
    };
}
