//! Engine-level collaborators of the search: time management and the
//! endgame tablebase hook.

pub mod tablebase;
pub mod time;

pub use tablebase::Tablebases;
pub use time::{TimeControl, TimeManager};
