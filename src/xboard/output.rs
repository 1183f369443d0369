//! XBoard output formatting.

use crate::board::{Board, Color};
use crate::search::constants::{is_mate_score, mate_distance};
use crate::search::SearchReport;
use crate::uci::print::format_move;

/// Feature negotiation for `protover 2`.
#[must_use]
pub fn format_features(name: &str) -> String {
    format!(
        "feature done=0\n\
         feature myname=\"{name}\" setboard=1 usermove=1 ping=1 memory=1 smp=1 \
         analyze=1 sigint=0 sigterm=0 reuse=1 time=1 colors=0 san=0 debug=1 \
         variants=\"normal,fischerandom\"\n\
         feature done=1"
    )
}

#[must_use]
pub fn format_engine_move(board: &Board, mv: crate::board::Move) -> String {
    format!("move {}", format_move(mv, board.is_chess960()))
}

#[must_use]
pub fn format_illegal_move(text: &str) -> String {
    format!("Illegal move: {text}")
}

#[must_use]
pub fn format_error(command: &str, reason: &str) -> String {
    format!("Error ({reason}): {command}")
}

#[must_use]
pub fn format_pong(value: u32) -> String {
    format!("pong {value}")
}

/// A `post` thinking line: `<ply> <score> <time-cs> <nodes> <pv>`. Mate
/// scores use the conventional 100000 + moves encoding.
#[must_use]
pub fn format_thinking(report: &SearchReport, chess960: bool) -> String {
    let score = if is_mate_score(report.score) {
        let mate = mate_distance(report.score);
        if mate > 0 {
            100_000 + mate
        } else {
            -100_000 + mate
        }
    } else {
        report.score
    };
    let mut line = format!(
        "{} {} {} {}",
        report.depth,
        score,
        report.time_ms / 10,
        report.nodes
    );
    for &mv in &report.pv {
        line.push(' ');
        line.push_str(&format_move(mv, chess960));
    }
    line
}

/// Game-ending adjudication for the current position, if any.
#[must_use]
pub fn adjudicate(board: &mut Board) -> Option<String> {
    if board.generate_legal().is_empty() {
        let stm = board.side_to_move();
        return Some(if board.in_check(stm) {
            match stm {
                Color::White => "0-1 {Black mates}".to_string(),
                Color::Black => "1-0 {White mates}".to_string(),
            }
        } else {
            "1/2-1/2 {Stalemate}".to_string()
        });
    }
    if board.is_fifty_move_draw() {
        return Some("1/2-1/2 {50 move rule}".to_string());
    }
    if board.is_insufficient_material() {
        return Some("1/2-1/2 {Insufficient material}".to_string());
    }
    None
}
