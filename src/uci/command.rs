//! UCI command parsing.

/// Parameters of a `go` command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movestogo: Option<u64>,
    pub depth: Option<i32>,
    pub nodes: Option<u64>,
    pub movetime: Option<u64>,
    pub infinite: bool,
    pub ponder: bool,
    pub searchmoves: Vec<String>,
}

/// A parsed UCI command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    SetOption { name: String, value: Option<String> },
    Position { fen: Option<String>, moves: Vec<String> },
    Go(GoParams),
    Stop,
    PonderHit,
    Quit,
    /// Anything unrecognized, kept for logging.
    Unknown(String),
}

/// Parse one line of UCI input.
#[must_use]
pub fn parse_command(line: &str) -> UciCommand {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = parts.first() else {
        return UciCommand::Unknown(String::new());
    };

    match head {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "setoption" => parse_setoption(&parts),
        "position" => parse_position(&parts),
        "go" => UciCommand::Go(parse_go(&parts)),
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "quit" => UciCommand::Quit,
        _ => UciCommand::Unknown(line.to_string()),
    }
}

fn parse_setoption(parts: &[&str]) -> UciCommand {
    let mut name_parts: Vec<&str> = Vec::new();
    let mut value_parts: Vec<&str> = Vec::new();
    let mut mode = "";

    for part in parts.iter().skip(1) {
        match *part {
            "name" => mode = "name",
            "value" => mode = "value",
            _ => match mode {
                "name" => name_parts.push(part),
                "value" => value_parts.push(part),
                _ => {}
            },
        }
    }

    UciCommand::SetOption {
        name: name_parts.join(" "),
        value: if value_parts.is_empty() {
            None
        } else {
            Some(value_parts.join(" "))
        },
    }
}

fn parse_position(parts: &[&str]) -> UciCommand {
    let mut fen = None;
    let mut moves = Vec::new();
    let mut i = 1;

    if i < parts.len() {
        if parts[i] == "startpos" {
            i += 1;
        } else if parts[i] == "fen" {
            i += 1;
            let start = i;
            while i < parts.len() && parts[i] != "moves" {
                i += 1;
            }
            fen = Some(parts[start..i].join(" "));
        }
    }

    if i < parts.len() && parts[i] == "moves" {
        moves = parts[i + 1..].iter().map(|s| (*s).to_string()).collect();
    }

    UciCommand::Position { fen, moves }
}

fn parse_go(parts: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 1;

    while i < parts.len() {
        match parts[i] {
            "wtime" => params.wtime = next_number(parts, &mut i),
            "btime" => params.btime = next_number(parts, &mut i),
            "winc" => params.winc = next_number(parts, &mut i),
            "binc" => params.binc = next_number(parts, &mut i),
            "movestogo" => params.movestogo = next_number(parts, &mut i),
            "depth" => params.depth = next_number(parts, &mut i),
            "nodes" => params.nodes = next_number(parts, &mut i),
            "movetime" => params.movetime = next_number(parts, &mut i),
            "mate" => {
                // Searching "mate N" maps onto a depth bound.
                let mate: Option<i32> = next_number(parts, &mut i);
                params.depth = mate.map(|m| 2 * m);
            }
            "infinite" => params.infinite = true,
            "ponder" => params.ponder = true,
            "searchmoves" => {
                while i + 1 < parts.len() && !is_go_keyword(parts[i + 1]) {
                    i += 1;
                    params.searchmoves.push(parts[i].to_string());
                }
            }
            _ => {}
        }
        i += 1;
    }
    params
}

fn is_go_keyword(token: &str) -> bool {
    matches!(
        token,
        "wtime"
            | "btime"
            | "winc"
            | "binc"
            | "movestogo"
            | "depth"
            | "nodes"
            | "movetime"
            | "mate"
            | "infinite"
            | "ponder"
            | "searchmoves"
    )
}

fn next_number<T: std::str::FromStr>(parts: &[&str], i: &mut usize) -> Option<T> {
    if *i + 1 < parts.len() {
        *i += 1;
        parts[*i].parse().ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse_command("uci"), UciCommand::Uci);
        assert_eq!(parse_command("isready"), UciCommand::IsReady);
        assert_eq!(parse_command("stop"), UciCommand::Stop);
        assert_eq!(parse_command("ponderhit"), UciCommand::PonderHit);
        assert_eq!(parse_command("quit"), UciCommand::Quit);
    }

    #[test]
    fn test_setoption() {
        let cmd = parse_command("setoption name Hash value 128");
        assert_eq!(
            cmd,
            UciCommand::SetOption {
                name: "Hash".to_string(),
                value: Some("128".to_string()),
            }
        );
        // Multi-word names and values survive.
        let cmd = parse_command("setoption name Move Overhead value 30");
        assert_eq!(
            cmd,
            UciCommand::SetOption {
                name: "Move Overhead".to_string(),
                value: Some("30".to_string()),
            }
        );
    }

    #[test]
    fn test_position_startpos_moves() {
        let cmd = parse_command("position startpos moves e2e4 e7e5");
        assert_eq!(
            cmd,
            UciCommand::Position {
                fen: None,
                moves: vec!["e2e4".to_string(), "e7e5".to_string()],
            }
        );
    }

    #[test]
    fn test_position_fen() {
        let fen = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
        let cmd = parse_command(&format!("position fen {fen} moves e5g6"));
        assert_eq!(
            cmd,
            UciCommand::Position {
                fen: Some(fen.to_string()),
                moves: vec!["e5g6".to_string()],
            }
        );
    }

    #[test]
    fn test_go_clock() {
        let cmd = parse_command("go wtime 30000 btime 28000 winc 500 binc 500 movestogo 20");
        let UciCommand::Go(params) = cmd else {
            panic!("expected go");
        };
        assert_eq!(params.wtime, Some(30_000));
        assert_eq!(params.btime, Some(28_000));
        assert_eq!(params.winc, Some(500));
        assert_eq!(params.movestogo, Some(20));
        assert!(!params.infinite);
    }

    #[test]
    fn test_go_searchmoves_stops_at_keyword() {
        let cmd = parse_command("go searchmoves e2e4 d2d4 depth 8");
        let UciCommand::Go(params) = cmd else {
            panic!("expected go");
        };
        assert_eq!(params.searchmoves, vec!["e2e4", "d2d4"]);
        assert_eq!(params.depth, Some(8));
    }

    #[test]
    fn test_go_infinite_and_ponder() {
        let UciCommand::Go(params) = parse_command("go ponder infinite") else {
            panic!("expected go");
        };
        assert!(params.infinite);
        assert!(params.ponder);
    }
}
