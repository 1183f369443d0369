use std::io::{self, BufRead};

use castellan::{uci, xboard};

/// Read the first line to pick the protocol: an `xboard` greeting selects
/// the XBoard loop, anything else (usually `uci`) goes to the UCI loop.
fn main() {
    // env_logger writes to stderr, so diagnostics never corrupt the
    // protocol stream on stdout.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    match lines.next() {
        Some(Ok(first)) if first.trim() == "xboard" => xboard::run(lines),
        Some(Ok(first)) => uci::run(Some(first), lines),
        _ => {}
    }
}
