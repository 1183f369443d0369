//! UCI output formatting.

use crate::board::{CastleSide, CastlingRights, Color, Move};
use crate::search::constants::{is_mate_score, mate_distance};
use crate::search::{SearchReport, SearchResult};
use crate::tt::Bound;

/// Coordinate notation for protocol output. Castling is stored internally
/// as king-from to rook-from; classical GUIs expect the king's g/c
/// destination instead, Chess960 GUIs the internal form.
#[must_use]
pub fn format_move(mv: Move, chess960: bool) -> String {
    if mv.is_castling() && !chess960 {
        // Castling always starts from the back rank, so the rank names the
        // side castling.
        let color = if mv.from().rank() == 0 {
            Color::White
        } else {
            Color::Black
        };
        let side = if mv.is_castle_kingside() {
            CastleSide::King
        } else {
            CastleSide::Queen
        };
        return format!(
            "{}{}",
            mv.from(),
            CastlingRights::king_destination(color, side)
        );
    }
    mv.to_string()
}

/// One `info` line for a search report.
#[must_use]
pub fn format_info(report: &SearchReport, chess960: bool) -> String {
    let mut line = format!(
        "info depth {} seldepth {} multipv {}",
        report.depth, report.seldepth, report.multipv
    );

    if is_mate_score(report.score) {
        line.push_str(&format!(" score mate {}", mate_distance(report.score)));
    } else {
        line.push_str(&format!(" score cp {}", report.score));
    }
    match report.bound {
        Bound::Lower => line.push_str(" lowerbound"),
        Bound::Upper => line.push_str(" upperbound"),
        _ => {}
    }

    line.push_str(&format!(
        " nodes {} nps {} hashfull {} time {}",
        report.nodes, report.nps, report.hashfull, report.time_ms
    ));

    if !report.pv.is_empty() {
        line.push_str(" pv");
        for &mv in &report.pv {
            line.push(' ');
            line.push_str(&format_move(mv, chess960));
        }
    }
    line
}

/// The final `bestmove` line. A position with no legal move reports the
/// null move.
#[must_use]
pub fn format_bestmove(result: &SearchResult, chess960: bool) -> String {
    let Some(best) = result.best_move else {
        return "bestmove 0000".to_string();
    };
    match result.ponder_move {
        Some(ponder) => format!(
            "bestmove {} ponder {}",
            format_move(best, chess960),
            format_move(ponder, chess960)
        ),
        None => format!("bestmove {}", format_move(best, chess960)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;
    use crate::search::constants::CHECKMATE;

    #[test]
    fn test_castle_formatting() {
        let castle = Move::castle_kingside(Square::E1, Square::H1);
        assert_eq!(format_move(castle, false), "e1g1");
        assert_eq!(format_move(castle, true), "e1h1");

        let long = Move::castle_queenside(Square::E8, Square::A8);
        assert_eq!(format_move(long, false), "e8c8");
        assert_eq!(format_move(long, true), "e8a8");
    }

    #[test]
    fn test_info_line_cp() {
        let report = SearchReport {
            depth: 10,
            seldepth: 14,
            multipv: 1,
            score: 35,
            bound: Bound::Exact,
            nodes: 12345,
            nps: 100_000,
            time_ms: 123,
            hashfull: 17,
            pv: vec![Move::quiet(
                "e2".parse().unwrap(),
                "e4".parse().unwrap(),
            )],
        };
        let line = format_info(&report, false);
        assert_eq!(
            line,
            "info depth 10 seldepth 14 multipv 1 score cp 35 nodes 12345 nps 100000 hashfull 17 time 123 pv e2e4"
        );
    }

    #[test]
    fn test_info_line_mate_and_bound() {
        let report = SearchReport {
            depth: 6,
            seldepth: 6,
            multipv: 1,
            score: CHECKMATE - 7,
            bound: Bound::Lower,
            nodes: 1,
            nps: 0,
            time_ms: 0,
            hashfull: 0,
            pv: vec![],
        };
        let line = format_info(&report, false);
        assert!(line.contains("score mate 4"));
        assert!(line.contains("lowerbound"));
        assert!(!line.contains(" pv"));
    }

    #[test]
    fn test_bestmove_lines() {
        let mv = Move::quiet("g1".parse().unwrap(), "f3".parse().unwrap());
        let reply = Move::quiet("g8".parse().unwrap(), "f6".parse().unwrap());
        let with_ponder = SearchResult {
            best_move: Some(mv),
            ponder_move: Some(reply),
            score: 0,
            depth: 1,
        };
        assert_eq!(
            format_bestmove(&with_ponder, false),
            "bestmove g1f3 ponder g8f6"
        );

        let stalemated = SearchResult {
            best_move: None,
            ponder_move: None,
            score: 0,
            depth: 0,
        };
        assert_eq!(format_bestmove(&stalemated, false), "bestmove 0000");
    }
}
