//! XBoard/WinBoard protocol loop.
//!
//! The secondary protocol: coordinate moves in and out, clocks in
//! centiseconds, thinking output behind `post`. Thinking searches run
//! synchronously on the protocol thread; analysis runs on its own thread so
//! `exit` and position edits stay responsive.

pub mod command;
pub mod output;

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;

use crate::board::{Board, Color};
use crate::engine::TimeControl;
use crate::search::{InfoCallback, Pool, SearchController, SearchLimits};

use command::{parse_command, XBoardCommand};
use output::{
    adjudicate, format_engine_move, format_error, format_features, format_illegal_move,
    format_pong, format_thinking,
};

const ENGINE_NAME: &str = concat!("Castellan ", env!("CARGO_PKG_VERSION"));

struct XBoardHandler {
    board: Board,
    pool: Arc<Mutex<Pool>>,
    force_mode: bool,
    engine_color: Option<Color>,
    post: bool,
    max_depth: Option<i32>,
    seconds_per_move: Option<u32>,
    engine_time_cs: u64,
    moves_per_session: Option<u32>,
    increment_seconds: u32,
    analyze_mode: bool,
    analysis: Option<(SearchController, JoinHandle<()>)>,
}

impl XBoardHandler {
    fn new() -> Self {
        XBoardHandler {
            board: Board::new(),
            pool: Arc::new(Mutex::new(Pool::new(1, 64))),
            force_mode: false,
            engine_color: Some(Color::Black),
            post: true,
            max_depth: None,
            seconds_per_move: None,
            engine_time_cs: 0,
            moves_per_session: None,
            increment_seconds: 0,
            analyze_mode: false,
            analysis: None,
        }
    }

    fn stop_analysis(&mut self) {
        if let Some((controller, handle)) = self.analysis.take() {
            controller.stop();
            handle.join().expect("analysis thread panicked");
        }
    }

    fn start_analysis(&mut self) {
        self.stop_analysis();
        let board = self.board.clone();
        let pool = Arc::clone(&self.pool);
        let chess960 = board.is_chess960();
        let controller = self.pool.lock().controller();
        let info: InfoCallback = Arc::new(move |report| {
            println!("{}", format_thinking(report, chess960));
        });
        let limits = SearchLimits {
            time: TimeControl::Infinite,
            infinite: true,
            ..SearchLimits::default()
        };
        // The master worker searches on this thread; match the pool's
        // helper stack size.
        let handle = std::thread::Builder::new()
            .name("xboard-analyze".to_string())
            .stack_size(32 * 1024 * 1024)
            .spawn(move || {
                pool.lock().go(&board, limits, 1, Some(info));
            })
            .expect("failed to spawn analysis thread");
        self.analysis = Some((controller, handle));
    }

    fn restart_analysis_if_active(&mut self) {
        if self.analyze_mode {
            self.start_analysis();
        }
    }

    fn search_limits(&self) -> SearchLimits {
        let time = if let Some(seconds) = self.seconds_per_move {
            TimeControl::from_seconds_per_move(seconds)
        } else if self.engine_time_cs > 0 {
            TimeControl::from_centiseconds(
                self.engine_time_cs,
                self.increment_seconds,
                self.moves_per_session,
            )
        } else if self.max_depth.is_some() {
            TimeControl::Infinite
        } else {
            // Thinking is synchronous: without any limit from the GUI, fall
            // back to a fixed time so the loop stays responsive.
            TimeControl::MoveTime { time_ms: 5_000 }
        };
        SearchLimits {
            time,
            depth: self.max_depth,
            ..SearchLimits::default()
        }
    }

    /// Search the current position and play the best move.
    fn think_and_move(&mut self) {
        let limits = self.search_limits();
        let chess960 = self.board.is_chess960();
        let info: Option<InfoCallback> = if self.post {
            Some(Arc::new(move |report: &crate::search::SearchReport| {
                println!("{}", format_thinking(report, chess960));
            }))
        } else {
            None
        };

        let result = self.pool.lock().go(&self.board, limits, 1, info);
        let Some(best) = result.best_move else {
            return;
        };
        println!("{}", format_engine_move(&self.board, best));
        let applied = self.board.make_move(best);
        debug_assert!(applied, "searched best move was illegal");
        if let Some(result_string) = adjudicate(&mut self.board) {
            println!("{result_string}");
        }
    }

    fn engine_to_move(&self) -> bool {
        !self.force_mode
            && !self.analyze_mode
            && self.engine_color == Some(self.board.side_to_move())
    }

    fn handle_user_move(&mut self, text: &str) {
        self.stop_analysis();
        match self.board.parse_move(text) {
            Ok(mv) => {
                let applied = self.board.make_move(mv);
                debug_assert!(applied, "parse_move returned an illegal move");
                if let Some(result_string) = adjudicate(&mut self.board) {
                    println!("{result_string}");
                } else if self.engine_to_move() {
                    self.think_and_move();
                }
                self.restart_analysis_if_active();
            }
            Err(_) => println!("{}", format_illegal_move(text)),
        }
    }

    /// Handle one command; returns `false` on `quit`.
    fn handle(&mut self, line: &str) -> bool {
        match parse_command(line) {
            XBoardCommand::XBoard => {}
            XBoardCommand::ProtoVer(version) => {
                if version >= 2 {
                    println!("{}", format_features(ENGINE_NAME));
                }
            }
            XBoardCommand::New => {
                self.stop_analysis();
                self.board = Board::new();
                self.pool.lock().new_game();
                self.force_mode = false;
                self.analyze_mode = false;
                self.engine_color = Some(Color::Black);
                self.max_depth = None;
            }
            XBoardCommand::SetBoard(fen) => {
                self.stop_analysis();
                match Board::from_fen(&fen) {
                    Ok(board) => {
                        self.board = board;
                        self.restart_analysis_if_active();
                    }
                    Err(e) => println!("{}", format_error(&fen, &e.to_string())),
                }
            }
            XBoardCommand::UserMove(text) => self.handle_user_move(&text),
            XBoardCommand::Go => {
                self.force_mode = false;
                self.engine_color = Some(self.board.side_to_move());
                if self.engine_to_move() {
                    self.think_and_move();
                }
            }
            XBoardCommand::Force => {
                self.stop_analysis();
                self.force_mode = true;
                self.engine_color = None;
            }
            XBoardCommand::Analyze => {
                self.force_mode = false;
                self.analyze_mode = true;
                self.start_analysis();
            }
            XBoardCommand::ExitAnalyze => {
                self.analyze_mode = false;
                self.stop_analysis();
            }
            XBoardCommand::Time(cs) => self.engine_time_cs = cs,
            XBoardCommand::OTime(_) => {}
            XBoardCommand::Level {
                moves_per_session,
                base_seconds: _,
                increment_seconds,
            } => {
                self.moves_per_session = (moves_per_session > 0).then_some(moves_per_session);
                self.increment_seconds = increment_seconds;
                self.seconds_per_move = None;
            }
            XBoardCommand::SetDepth(depth) => self.max_depth = Some(depth.max(1)),
            XBoardCommand::SetTime(seconds) => self.seconds_per_move = Some(seconds),
            XBoardCommand::Memory(mb) => self.pool.lock().set_hash(mb.max(1)),
            XBoardCommand::Cores(n) => self.pool.lock().set_threads(n),
            XBoardCommand::EgtPath(path) => self.pool.lock().set_tablebase_path(&path),
            XBoardCommand::Ping(value) => println!("{}", format_pong(value)),
            // Pondering on the opponent's time is not wired into the
            // synchronous XBoard loop; accept the toggles quietly.
            XBoardCommand::Hard | XBoardCommand::Easy => {}
            XBoardCommand::Post => self.post = true,
            XBoardCommand::NoPost => self.post = false,
            XBoardCommand::MoveNow => {
                // Thinking is synchronous here; only analysis can be
                // interrupted mid-flight.
                if let Some((controller, _)) = &self.analysis {
                    controller.stop();
                }
            }
            XBoardCommand::Undo => {
                self.stop_analysis();
                if self.board.ply() > 0 {
                    self.board.unmake_move();
                }
                self.restart_analysis_if_active();
            }
            XBoardCommand::Remove => {
                self.stop_analysis();
                for _ in 0..2 {
                    if self.board.ply() > 0 {
                        self.board.unmake_move();
                    }
                }
                self.restart_analysis_if_active();
            }
            XBoardCommand::Result(_) => {
                self.stop_analysis();
                self.force_mode = true;
            }
            XBoardCommand::Quit => {
                self.stop_analysis();
                return false;
            }
            XBoardCommand::Ignored => {}
            XBoardCommand::Unknown(text) => {
                if !text.is_empty() {
                    println!("{}", format_error(&text, "unknown command"));
                }
            }
        }
        true
    }
}

/// Run the XBoard loop; the `xboard` greeting has already been consumed.
pub fn run<I>(lines: I)
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut handler = XBoardHandler::new();
    for line in lines {
        let Ok(line) = line else { break };
        if !handler.handle(&line) {
            break;
        }
    }
    handler.stop_analysis();
}
