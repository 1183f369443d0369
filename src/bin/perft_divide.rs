//! Perft divide utility: per-root-move node counts for generator debugging.
//!
//! Usage: `perft_divide <depth> [fen]` (startpos when no FEN is given).

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use castellan::board::Board;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(depth) = args.first().and_then(|s| s.parse::<usize>().ok()) else {
        eprintln!("usage: perft_divide <depth> [fen]");
        return ExitCode::FAILURE;
    };

    let mut board = if args.len() > 1 {
        match Board::from_fen(&args[1..].join(" ")) {
            Ok(board) => board,
            Err(e) => {
                eprintln!("bad FEN: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        Board::new()
    };

    let start = Instant::now();
    let divide = board.perft_divide(depth);
    let total: u64 = divide.iter().map(|(_, nodes)| nodes).sum();

    for (mv, nodes) in &divide {
        println!("{mv}: {nodes}");
    }
    let elapsed = start.elapsed();
    println!();
    println!("total {total} in {elapsed:.2?}");
    ExitCode::SUCCESS
}
