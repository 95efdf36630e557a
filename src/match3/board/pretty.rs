use itertools::Itertools;

use crate::match3::prelude::*;

fn cell_glyph(cell: &GridCell) -> char {
    match &cell.piece {
        Some(piece)                          => glyph(&piece.piece_type),
        None if !cell.can_contain_piece()    => DISABLED_GLYPH,
        None                                 => EMPTY_GLYPH,
    }
}

impl Grid {
    fn glyph_rows(&self) -> Vec<String> {
        (0..self.height()).map(|row| self.row(row).into_iter().map(cell_glyph).collect()).collect()
    }
}

impl Board {
    /// Notates the board as a layout string, rows joined by `/`.
    pub fn notate(&self) -> String {
        self.grid.glyph_rows().join("/")
    }

    /// Pretty-prints the board, one row per line.
    pub fn pretty(&self) -> String {
        self.grid.glyph_rows().iter().map(|row| row.chars().join(" ")).join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notation_reads_back_as_a_layout() {
        let legend = vec![Piece::normal("apple"), Piece::normal("berry"), Piece::normal("cherry"), Piece::special("apple")];
        let layout = "abc/A#./cba".parse::<Layout>().unwrap();

        let mut board = Board::new(layout.width, layout.height, 0, None, None).with_available_pieces(legend.clone());
        board.prepare_grid_cells(Some(&layout.disabled()), false);
        for (coord, piece) in layout.pieces(&legend).unwrap() {
            board.grid_mut().get_mut(&coord).unwrap().assign_piece(piece);
        }

        assert_eq!(board.notate(), "abc/A#./cba");
        assert_eq!(board.pretty(), "a b c\nA # .\nc b a");
    }
}
