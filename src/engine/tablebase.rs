//! Endgame tablebase hook.
//!
//! Probing itself is an external collaborator; this module owns the hook
//! points the search and the protocols use: the configured path, the piece
//! limit gating probes, and a WDL query that a real prober can be wired
//! into.

use std::path::PathBuf;

use crate::board::Board;

/// Tablebase configuration shared by all workers.
pub struct Tablebases {
    path: Option<PathBuf>,
    /// Positions with more pieces than this are never probed.
    max_pieces: u32,
}

impl Tablebases {
    #[must_use]
    pub fn new() -> Self {
        Tablebases {
            path: None,
            max_pieces: 6,
        }
    }

    /// Record the tablebase directory (UCI `SyzygyPath`, XBoard `egtpath`).
    /// Initialization of a real prober may be slow; today only the path is
    /// validated and remembered.
    pub fn set_path(&mut self, path: &str) {
        let path = PathBuf::from(path);
        if path.is_dir() {
            log::info!("tablebase path set to {}", path.display());
            self.path = Some(path);
        } else {
            log::warn!("tablebase path {} is not a directory", path.display());
            self.path = None;
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Should the search probe this position at all?
    #[must_use]
    pub fn should_probe(&self, board: &Board) -> bool {
        self.is_enabled() && board.occupancy().count() <= self.max_pieces
    }

    /// Win/draw/loss probe from the side to move's perspective: negative =
    /// loss, 0 = draw, positive = win. Returns `None` until a prober is
    /// wired in.
    #[must_use]
    pub fn probe_wdl(&self, board: &Board) -> Option<i32> {
        let _ = board;
        None
    }
}

impl Default for Tablebases {
    fn default() -> Self {
        Tablebases::new()
    }
}
