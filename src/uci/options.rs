//! UCI options: declaration and application.

use crate::search::MAX_THREADS;

pub const DEFAULT_HASH_MB: usize = 64;
pub const MAX_HASH_MB: usize = 65536;
pub const MAX_MULTI_PV: usize = 256;

/// The option set exposed over `setoption`.
#[derive(Debug, Clone)]
pub struct UciOptions {
    pub hash_mb: usize,
    pub threads: usize,
    pub multi_pv: usize,
    pub ponder: bool,
    pub syzygy_path: Option<String>,
    pub move_overhead_ms: u64,
    pub chess960: bool,
}

impl Default for UciOptions {
    fn default() -> Self {
        UciOptions {
            hash_mb: DEFAULT_HASH_MB,
            threads: 1,
            multi_pv: 1,
            ponder: false,
            syzygy_path: None,
            move_overhead_ms: 100,
            chess960: false,
        }
    }
}

/// Requested side effect of a `setoption`, applied by the engine loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionAction {
    ResizeHash(usize),
    SetThreads(usize),
    SetTablebasePath(String),
    SetMoveOverhead(u64),
    SetChess960(bool),
    None,
}

impl UciOptions {
    /// Print the option declarations for the `uci` handshake.
    pub fn print(&self) {
        println!(
            "option name Hash type spin default {} min 1 max {MAX_HASH_MB}",
            self.hash_mb
        );
        println!(
            "option name Threads type spin default {} min 1 max {MAX_THREADS}",
            self.threads
        );
        println!(
            "option name MultiPV type spin default {} min 1 max {MAX_MULTI_PV}",
            self.multi_pv
        );
        println!(
            "option name Ponder type check default {}",
            if self.ponder { "true" } else { "false" }
        );
        println!("option name SyzygyPath type string default <empty>");
        println!(
            "option name MoveOverhead type spin default {} min 0 max 10000",
            self.move_overhead_ms
        );
        println!(
            "option name UCI_Chess960 type check default {}",
            if self.chess960 { "true" } else { "false" }
        );
    }

    /// Apply a `setoption`; returns the side effect the engine must carry
    /// out on the pool or board.
    pub fn apply(&mut self, name: &str, value: Option<&str>) -> OptionAction {
        match name.trim().to_ascii_lowercase().as_str() {
            "hash" => {
                let mb = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(DEFAULT_HASH_MB)
                    .clamp(1, MAX_HASH_MB);
                self.hash_mb = mb;
                OptionAction::ResizeHash(mb)
            }
            "threads" => {
                let threads = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, MAX_THREADS);
                self.threads = threads;
                OptionAction::SetThreads(threads)
            }
            "multipv" => {
                self.multi_pv = value
                    .and_then(|v| v.parse::<usize>().ok())
                    .unwrap_or(1)
                    .clamp(1, MAX_MULTI_PV);
                OptionAction::None
            }
            "ponder" => {
                self.ponder = parse_bool(value);
                OptionAction::None
            }
            "syzygypath" => match value {
                Some(path) if !path.is_empty() && path != "<empty>" => {
                    self.syzygy_path = Some(path.to_string());
                    OptionAction::SetTablebasePath(path.to_string())
                }
                _ => {
                    self.syzygy_path = None;
                    OptionAction::None
                }
            },
            "moveoverhead" | "move overhead" => {
                let ms = value
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(100)
                    .min(10_000);
                self.move_overhead_ms = ms;
                OptionAction::SetMoveOverhead(ms)
            }
            "uci_chess960" => {
                self.chess960 = parse_bool(value);
                OptionAction::SetChess960(self.chess960)
            }
            other => {
                log::warn!("ignoring unknown option '{other}'");
                OptionAction::None
            }
        }
    }
}

fn parse_bool(value: Option<&str>) -> bool {
    matches!(
        value.map(str::trim).map(str::to_ascii_lowercase).as_deref(),
        Some("true" | "1" | "on")
    )
}
