//! Universal Chess Interface protocol loop.

pub mod command;
pub mod options;
pub mod print;

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::board::{Board, Color};
use crate::engine::TimeControl;
use crate::search::{InfoCallback, Pool, SearchController, SearchLimits};

use command::{parse_command, GoParams, UciCommand};
use options::{OptionAction, UciOptions};

const ENGINE_NAME: &str = concat!("Castellan ", env!("CARGO_PKG_VERSION"));
const ENGINE_AUTHOR: &str = "the castellan authors";

struct UciEngine {
    board: Board,
    pool: Arc<Mutex<Pool>>,
    options: UciOptions,
    active_search: Option<(SearchController, JoinHandle<()>)>,
}

impl UciEngine {
    fn new() -> Self {
        let options = UciOptions::default();
        UciEngine {
            board: Board::new(),
            pool: Arc::new(Mutex::new(Pool::new(options.threads, options.hash_mb))),
            options,
            active_search: None,
        }
    }

    /// Block until any running search has printed its `bestmove`.
    fn finish_search(&mut self) {
        if let Some((_, handle)) = self.active_search.take() {
            handle.join().expect("search thread panicked");
        }
    }

    fn stop_search(&mut self) {
        if let Some((controller, _)) = &self.active_search {
            controller.stop();
        }
        self.finish_search();
    }

    fn handle_setoption(&mut self, name: &str, value: Option<&str>) {
        if self.active_search.is_some() {
            log::warn!("setoption '{name}' ignored while searching");
            return;
        }
        match self.options.apply(name, value) {
            OptionAction::ResizeHash(mb) => self.pool.lock().set_hash(mb),
            OptionAction::SetThreads(threads) => self.pool.lock().set_threads(threads),
            OptionAction::SetTablebasePath(path) => self.pool.lock().set_tablebase_path(&path),
            OptionAction::SetMoveOverhead(ms) => self.pool.lock().set_move_overhead(ms),
            OptionAction::SetChess960(enabled) => self.board.set_chess960(enabled),
            OptionAction::None => {}
        }
    }

    /// Apply a `position` command. A malformed FEN leaves the board
    /// untouched; an illegal move stops the move list at the last legal
    /// point (both are logged, never fatal).
    fn handle_position(&mut self, fen: Option<&str>, moves: &[String]) {
        let mut board = match fen {
            Some(fen) => match Board::from_fen(fen) {
                Ok(board) => board,
                Err(e) => {
                    log::warn!("position ignored: {e}");
                    return;
                }
            },
            None => Board::new(),
        };
        board.set_chess960(self.options.chess960);

        for text in moves {
            match board.parse_move(text) {
                Ok(mv) => {
                    let legal = board.make_move(mv);
                    debug_assert!(legal, "parse_move returned an illegal move");
                }
                Err(e) => {
                    log::warn!("stopping move application: {e}");
                    break;
                }
            }
        }
        self.board = board;
    }

    fn build_limits(&mut self, params: &GoParams) -> SearchLimits {
        let (time_left, increment) = match self.board.side_to_move() {
            Color::White => (params.wtime, params.winc),
            Color::Black => (params.btime, params.binc),
        };

        let time = if params.infinite {
            TimeControl::Infinite
        } else if let Some(movetime) = params.movetime {
            TimeControl::MoveTime { time_ms: movetime }
        } else if let Some(remaining) = time_left {
            TimeControl::Incremental {
                remaining_ms: remaining,
                increment_ms: increment.unwrap_or(0),
                moves_to_go: params.movestogo.filter(|&m| m > 0),
            }
        } else {
            TimeControl::Infinite
        };

        let mut searchmoves = Vec::new();
        let mut scratch = self.board.clone();
        for text in &params.searchmoves {
            match scratch.parse_move(text) {
                Ok(mv) => searchmoves.push(mv),
                Err(e) => log::warn!("searchmoves entry ignored: {e}"),
            }
        }

        SearchLimits {
            time,
            depth: params.depth,
            nodes: params.nodes,
            infinite: params.infinite,
            ponder: params.ponder,
            searchmoves,
        }
    }

    fn handle_go(&mut self, params: &GoParams) {
        self.stop_search();

        let limits = self.build_limits(params);
        let board = self.board.clone();
        let pool = Arc::clone(&self.pool);
        let multi_pv = self.options.multi_pv;
        let chess960 = self.options.chess960;
        let controller = self.pool.lock().controller();

        let info: InfoCallback = Arc::new(move |report| {
            println!("{}", print::format_info(report, chess960));
        });

        // The master worker searches on this thread, so it needs the same
        // deep-recursion stack as the pool's helper threads.
        let handle = std::thread::Builder::new()
            .name("uci-search".to_string())
            .stack_size(32 * 1024 * 1024)
            .spawn(move || {
                let result = pool.lock().go(&board, limits, multi_pv, Some(info));
                println!("{}", print::format_bestmove(&result, chess960));
            })
            .expect("failed to spawn search thread");

        self.active_search = Some((controller, handle));
    }

    /// Handle one command; returns `false` on `quit`.
    fn handle(&mut self, line: &str) -> bool {
        match parse_command(line) {
            UciCommand::Uci => {
                println!("id name {ENGINE_NAME}");
                println!("id author {ENGINE_AUTHOR}");
                self.options.print();
                println!("uciok");
            }
            UciCommand::IsReady => println!("readyok"),
            UciCommand::UciNewGame => {
                self.stop_search();
                self.pool.lock().new_game();
                self.board = Board::new();
                self.board.set_chess960(self.options.chess960);
            }
            UciCommand::SetOption { name, value } => {
                self.handle_setoption(&name, value.as_deref());
            }
            UciCommand::Position { fen, moves } => {
                self.stop_search();
                self.handle_position(fen.as_deref(), &moves);
            }
            UciCommand::Go(params) => self.handle_go(&params),
            UciCommand::Stop => self.stop_search(),
            UciCommand::PonderHit => {
                if let Some((controller, _)) = &self.active_search {
                    controller.ponderhit();
                }
            }
            UciCommand::Quit => {
                self.stop_search();
                return false;
            }
            UciCommand::Unknown(text) => {
                if !text.is_empty() {
                    log::warn!("unknown command '{text}'");
                }
            }
        }
        true
    }
}

/// Run the UCI loop. `first_line` is the already-consumed line that
/// selected this protocol (usually `uci`).
pub fn run<I>(first_line: Option<String>, lines: I)
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut engine = UciEngine::new();

    if let Some(line) = first_line {
        if !engine.handle(&line) {
            return;
        }
    }
    for line in lines {
        let Ok(line) = line else { break };
        if !engine.handle(&line) {
            break;
        }
    }
    engine.stop_search();
}
