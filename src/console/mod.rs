mod options;

use std::{
    cell::Cell,
    io::{BufRead, Write},
    rc::Rc,
};

use itertools::Itertools;
pub use options::{ConsoleOptions, SessionConfig};

use crate::prelude::*;

/// A line-oriented driver for a single game session. Each command prints its output followed by
/// `ok`, or `err` and the reason.
pub struct Match3Console {
    board: Option<Board>,
    config: SessionConfig,

    /// Pieces consumed in the current game, counted from the board's events.
    score: Rc<Cell<usize>>,
}

impl Match3Console {
    pub fn new(options: ConsoleOptions) -> Match3Console {
        Match3Console::with_config(options.session_config())
    }

    pub fn with_config(config: SessionConfig) -> Match3Console {
        Match3Console { board: None, config, score: Rc::new(Cell::new(0)) }
    }

    /// Serves commands from stdin until `quit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        self.serve(stdin.lock(), &mut stdout)
    }

    /// Serves commands from any line source; replies go to `out`.
    pub fn serve(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        for line in input.lines() {
            let line = line?;
            let args = line.split_whitespace().collect::<Vec<&str>>();
            let cmd = *args.first().unwrap_or(&"");
            if cmd == "quit" {
                break;
            }

            let reply = self.apply(cmd, args.get(1..).unwrap_or_default());
            match reply {
                Ok(text) => {
                    log::debug!("command completed successfully: {line}");
                    write!(out, "{text}")?;
                    writeln!(out, "ok")?;
                }
                Err(err) => {
                    log::warn!("encountered recoverable error:\n{err}");
                    writeln!(out, "err\n{err}")?;
                    writeln!(out, "ok")?;
                }
            }
            out.flush()?;
        }
        Ok(())
    }

    /// Runs a command, producing its reply text.
    fn apply(&mut self, cmd: &str, args: &[&str]) -> Result<String> {
        match cmd {
            ""        => Ok(String::new()),
            "board"   => self.show_board(),
            "info"    => Ok(self.info()),
            "moves"   => self.moves(),
            "newgame" => self.new_game(args),
            "shuffle" => self.shuffle(),
            "swap"    => self.swap(args),
            _         => Err(anyhow!("unrecognized command {cmd}")),
        }
    }

    /// Starts a new game, optionally from a layout such as `sct/cts/#sc`.
    fn new_game(&mut self, args: &[&str]) -> Result<String> {
        let mut board = match args.first() {
            Some(repr) => {
                let layout = repr.parse::<Layout>()?;
                let config = SessionConfig { width: layout.width, height: layout.height, ..self.config.clone() };
                let mut board = config.board();
                board.prepare_grid_cells(Some(&layout.disabled()), true);
                let preselected = layout.pieces(board.available_pieces())?;
                board.fill_initial_board(true, Some(&preselected))?;
                board
            }
            None => {
                let mut board = self.config.board();
                board.prepare_grid_cells(None, true);
                board.fill_initial_board(self.config.allow_matches_on_start, None)?;
                board
            }
        };

        self.score.set(0);
        let score = self.score.clone();
        board.subscribe(move |event| match event {
            BoardEvent::SequenceConsumed(sequence) => score.set(score.get() + sequence.size()),
            BoardEvent::SpentAllMoves              => log::info!("no moves left"),
            _                                      => {}
        });

        let reply = format!("{}\n", board.notate());
        self.board = Some(board);
        Ok(reply)
    }

    fn show_board(&mut self) -> Result<String> {
        Ok(format!("{}\n", self.ensure_started()?.pretty()))
    }

    fn moves(&mut self) -> Result<String> {
        let board = self.ensure_started()?;
        Ok(format!("{} {}\n", board.remaining_moves(), if board.is_locked() { "locked" } else { "free" }))
    }

    fn shuffle(&mut self) -> Result<String> {
        let board = self.ensure_started()?;
        let pairings = board.shuffle(&[], &[])?;
        Ok(format!("{}\n{}\n", pairings.len(), board.notate()))
    }

    /// Plays a swap given as `c1 r1 c2 r2`. A swap that makes no match is undone; one that does costs a
    /// move and cascades until the board settles.
    fn swap(&mut self, args: &[&str]) -> Result<String> {
        let [c1, r1, c2, r2] = match args {
            [c1, r1, c2, r2] => [c1, r1, c2, r2].map(|arg| arg.parse::<usize>()),
            _                => return Err(anyhow!("expected swap c1 r1 c2 r2, received {} arguments", args.len())),
        };
        let [from, to] = [Coord::new(c1?, r1?), Coord::new(c2?, r2?)];

        let board = self.ensure_started()?;
        if board.is_locked() {
            return Err(anyhow!("the board is locked"));
        }
        if !(from.row_neighbour_of(&to) || from.column_neighbour_of(&to)) {
            return Err(anyhow!("cells {from} and {to} are not adjacent"));
        }
        if !board.swap(&from, &to) {
            return Err(anyhow!("cannot swap {from} and {to}"));
        }

        let mut matched = distinct([from, to].iter().filter_map(|coord| board.find_match_from_cell(coord)));
        if matched.is_empty() {
            board.swap(&to, &from);
            return Err(anyhow!("swapping {from} and {to} makes no match"));
        }
        board.decrease_move();

        let mut cascades = 0;
        while !matched.is_empty() {
            if cascades >= MAX_REMATCH_PASSES {
                return Err(anyhow!("the board did not settle after {cascades} cascades"));
            }
            for sequence in matched.iter_mut() {
                board.consume_sequence(sequence);
            }
            let plan = board.move_pieces_and_fill_empty_cells()?;
            log::trace!("cascade {cascades}: {} updates", plan.updates().len());
            board.apply(plan)?;
            matched = board.find_board_sequences();
            cascades += 1;
        }

        Ok(format!("{} {}\n{}\n", cascades, self.score.get(), self.ensure_started()?.notate()))
    }

    // accessors

    fn ensure_started(&mut self) -> Result<&mut Board> {
        self.board.as_mut().ok_or_else(|| anyhow!("no game in progress"))
    }

    // basic printers

    /// The console's id line.
    fn info(&self) -> String {
        format!("id {} v{}\n", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// Drops sequences covering the same cells as an earlier one, so no run is consumed twice.
fn distinct(sequences: impl IntoIterator<Item = Sequence>) -> Vec<Sequence> {
    sequences.into_iter().unique_by(|sequence| sequence.coords().sorted().collect_vec()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(input: &str) -> String {
        let config = SessionConfig { seed: Some(5), moves: 3, ..SessionConfig::default() };
        let mut console = Match3Console::with_config(config);
        let mut out = vec![];
        console.serve(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn commands_need_a_game() {
        let out = session("board\nmoves\n");
        assert_eq!(out, "err\nno game in progress\nok\nerr\nno game in progress\nok\n");
    }

    #[test]
    fn unknown_commands_are_reported() {
        assert_eq!(session("dance\n"), "err\nunrecognized command dance\nok\n");
    }

    #[test]
    fn new_games_print_the_board() {
        let out = session("newgame\nmoves\nquit\ninfo\n");
        let lines = out.lines().collect_vec();
        assert_eq!(lines[0].split('/').count(), 7);
        assert!(lines[0].split('/').all(|row| row.len() == 8));
        assert_eq!(lines[1], "ok");
        assert_eq!(lines[2], "3 free");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn matching_swaps_cascade_and_score() {
        // swapping the circle at 2,0 with the square below it completes the top row
        let out = session("newgame ssct/ctsc/tcts\nswap 2 0 2 1\nmoves\n");
        let lines = out.lines().collect_vec();

        assert_eq!(lines[0], "ssct/ctsc/tcts");
        let [cascades, score] = lines[2].split(' ').map(|n| n.parse::<usize>().unwrap()).collect_vec()[..] else {
            panic!("unexpected swap reply {}", lines[2]);
        };
        assert!(cascades >= 1);
        assert!(score >= 3);
        assert_eq!(lines[5], "2 free");
    }

    #[test]
    fn swaps_without_a_match_are_undone() {
        let out = session("newgame sct/cts/tsc\nswap 0 0 1 0\nboard\n");
        let lines = out.lines().collect_vec();
        assert_eq!(lines[2], "err");
        assert_eq!(lines[3], "swapping 0,0 and 1,0 makes no match");
        assert_eq!(lines[5], "s c t");
    }

    #[test]
    fn malformed_swaps_are_rejected() {
        let out = session("newgame sct/cts/tsc\nswap 0 0\nswap 0 0 2 0\nswap x 0 1 0\n");
        let errors = out.lines().filter(|line| *line == "err").count();
        assert_eq!(errors, 3);
    }

    #[test]
    fn the_same_run_is_only_kept_once() {
        let run = |cols: [usize; 3]| {
            let cells = cols.map(|col| GridCell::at(Coord::new(col, 0)).with_piece(Piece::normal("square")));
            Sequence::new(cells.to_vec(), None)
        };

        let kept = distinct([run([0, 1, 2]), run([2, 1, 0]), run([1, 2, 3])]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].coords().collect_vec(), vec![Coord::new(1, 0), Coord::new(2, 0), Coord::new(3, 0)]);
    }
}
