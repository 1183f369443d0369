//! XBoard command parsing.

/// A parsed XBoard command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XBoardCommand {
    XBoard,
    ProtoVer(u32),
    New,
    SetBoard(String),
    UserMove(String),
    Go,
    Force,
    Analyze,
    ExitAnalyze,
    /// Engine clock, centiseconds.
    Time(u64),
    /// Opponent clock, centiseconds.
    OTime(u64),
    Level {
        moves_per_session: u32,
        base_seconds: u32,
        increment_seconds: u32,
    },
    /// `sd`: maximum search depth.
    SetDepth(i32),
    /// `st`: seconds per move.
    SetTime(u32),
    /// Hash size in MB.
    Memory(usize),
    Cores(usize),
    EgtPath(String),
    Ping(u32),
    Hard,
    Easy,
    Post,
    NoPost,
    MoveNow,
    Undo,
    Remove,
    Result(String),
    Quit,
    /// Protocol chatter that needs no action (accepted, rejected, random,
    /// computer, name, ...).
    Ignored,
    Unknown(String),
}

/// Parse one line of XBoard input. Bare coordinate moves (sent when
/// `usermove` was not negotiated) are treated as moves.
#[must_use]
pub fn parse_command(line: &str) -> XBoardCommand {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = parts.first() else {
        return XBoardCommand::Ignored;
    };

    match head {
        "xboard" => XBoardCommand::XBoard,
        "protover" => XBoardCommand::ProtoVer(number(&parts, 1).unwrap_or(1)),
        "new" => XBoardCommand::New,
        "setboard" => XBoardCommand::SetBoard(parts[1..].join(" ")),
        "usermove" => match parts.get(1) {
            Some(mv) => XBoardCommand::UserMove((*mv).to_string()),
            None => XBoardCommand::Unknown(line.to_string()),
        },
        "go" => XBoardCommand::Go,
        "force" => XBoardCommand::Force,
        "analyze" => XBoardCommand::Analyze,
        "exit" => XBoardCommand::ExitAnalyze,
        "time" => XBoardCommand::Time(number(&parts, 1).unwrap_or(0)),
        "otim" => XBoardCommand::OTime(number(&parts, 1).unwrap_or(0)),
        "level" => parse_level(&parts).unwrap_or_else(|| XBoardCommand::Unknown(line.to_string())),
        "sd" => match number(&parts, 1) {
            Some(depth) => XBoardCommand::SetDepth(depth),
            None => XBoardCommand::Unknown(line.to_string()),
        },
        "st" => match number(&parts, 1) {
            Some(seconds) => XBoardCommand::SetTime(seconds),
            None => XBoardCommand::Unknown(line.to_string()),
        },
        "memory" => match number(&parts, 1) {
            Some(mb) => XBoardCommand::Memory(mb),
            None => XBoardCommand::Unknown(line.to_string()),
        },
        "cores" => match number(&parts, 1) {
            Some(n) => XBoardCommand::Cores(n),
            None => XBoardCommand::Unknown(line.to_string()),
        },
        "egtpath" => match (parts.get(1), parts.get(2)) {
            (Some(&"syzygy"), Some(path)) => XBoardCommand::EgtPath((*path).to_string()),
            _ => XBoardCommand::Ignored,
        },
        "ping" => XBoardCommand::Ping(number(&parts, 1).unwrap_or(0)),
        "hard" => XBoardCommand::Hard,
        "easy" => XBoardCommand::Easy,
        "post" => XBoardCommand::Post,
        "nopost" => XBoardCommand::NoPost,
        "?" => XBoardCommand::MoveNow,
        "undo" => XBoardCommand::Undo,
        "remove" => XBoardCommand::Remove,
        "result" => XBoardCommand::Result(parts[1..].join(" ")),
        "quit" => XBoardCommand::Quit,
        "accepted" | "rejected" | "random" | "computer" | "name" | "white" | "black" | "draw"
        | "rating" | "ics" | "variant" => XBoardCommand::Ignored,
        _ if looks_like_move(head) && parts.len() == 1 => {
            XBoardCommand::UserMove(head.to_string())
        }
        _ => XBoardCommand::Unknown(line.to_string()),
    }
}

fn number<T: std::str::FromStr>(parts: &[&str], idx: usize) -> Option<T> {
    parts.get(idx).and_then(|s| s.parse().ok())
}

/// `level MPS BASE INC`; BASE is minutes, optionally `minutes:seconds`.
fn parse_level(parts: &[&str]) -> Option<XBoardCommand> {
    let moves_per_session: u32 = number(parts, 1)?;
    let base = parts.get(2)?;
    let base_seconds = if let Some((minutes, seconds)) = base.split_once(':') {
        minutes.parse::<u32>().ok()? * 60 + seconds.parse::<u32>().ok()?
    } else {
        base.parse::<u32>().ok()? * 60
    };
    let increment_seconds: u32 = number(parts, 3)?;
    Some(XBoardCommand::Level {
        moves_per_session,
        base_seconds,
        increment_seconds,
    })
}

fn looks_like_move(token: &str) -> bool {
    let bytes = token.as_bytes();
    (4..=5).contains(&bytes.len())
        && bytes[0].is_ascii_lowercase()
        && bytes[0] >= b'a'
        && bytes[0] <= b'h'
        && bytes[1].is_ascii_digit()
        && bytes[2] >= b'a'
        && bytes[2] <= b'h'
        && bytes[3].is_ascii_digit()
}
