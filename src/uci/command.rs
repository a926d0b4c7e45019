//! Command-line tokenizing (`spec.md` §6.1): turns one input line into
//! a [`UciCommand`], with `go`'s sub-tokens further parsed into
//! [`GoParams`].

#[derive(Debug, Clone)]
pub enum UciCommand {
    Uci,
    IsReady,
    UciNewGame,
    Position(Vec<String>),
    Go(GoParams),
    Perft(usize),
    Bench(Vec<String>),
    SetOption { name: String, value: Option<String> },
    Debug(bool),
    Stop,
    PonderHit,
    Quit,
    Unknown(String),
}

#[derive(Default, Debug, Clone)]
pub struct GoParams {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    pub movetime: Option<u64>,
    pub movestogo: Option<u64>,
    pub depth: Option<i32>,
    pub nodes: Option<u64>,
    pub ponder: bool,
    pub infinite: bool,
    pub searchmoves: Vec<String>,
}

fn parse_next<T: std::str::FromStr>(parts: &[&str], i: usize) -> Option<T> {
    parts.get(i + 1).and_then(|v| v.parse::<T>().ok())
}

pub fn parse_go_params(parts: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut i = 1;
    while i < parts.len() {
        let consumed = match parts[i] {
            "wtime" => { params.wtime = parse_next(parts, i); 2 }
            "btime" => { params.btime = parse_next(parts, i); 2 }
            "winc" => { params.winc = parse_next(parts, i); 2 }
            "binc" => { params.binc = parse_next(parts, i); 2 }
            "movetime" => { params.movetime = parse_next(parts, i); 2 }
            "movestogo" => { params.movestogo = parse_next(parts, i); 2 }
            "nodes" => { params.nodes = parse_next(parts, i); 2 }
            "depth" => { params.depth = parse_next(parts, i); 2 }
            "mate" => {
                // `spec.md` §6.1: mate N maps onto depth 2N+1.
                let n: Option<i32> = parse_next(parts, i);
                params.depth = n.map(|n| 2 * n + 1);
                2
            }
            "ponder" => { params.ponder = true; 1 }
            "infinite" => { params.infinite = true; 1 }
            "searchmoves" => {
                let rest = &parts[i + 1..];
                let count = rest.iter().take_while(|s| s.len() >= 4 && s.len() <= 5 && s.chars().next().is_some_and(|c| c.is_ascii_lowercase())).count();
                params.searchmoves = rest[..count].iter().map(|s| (*s).to_string()).collect();
                1 + count
            }
            _ => 1,
        };
        i += consumed;
    }
    params
}

pub fn parse_uci_command(line: &str) -> Option<UciCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    let owned = || parts.iter().map(|p| (*p).to_string()).collect::<Vec<String>>();

    let cmd = match parts[0] {
        "uci" => UciCommand::Uci,
        "isready" => UciCommand::IsReady,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => UciCommand::Position(owned()),
        "go" => UciCommand::Go(parse_go_params(&parts)),
        "perft" => UciCommand::Perft(parts.get(1).and_then(|v| v.parse().ok()).unwrap_or(1)),
        "bench" => UciCommand::Bench(owned()),
        "setoption" => {
            let (name, value) = parse_setoption(&parts)?;
            UciCommand::SetOption { name, value }
        }
        "debug" => UciCommand::Debug(parts.get(1) == Some(&"on")),
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "quit" | "exit" => UciCommand::Quit,
        _ => UciCommand::Unknown(trimmed.to_string()),
    };
    Some(cmd)
}

fn parse_setoption(parts: &[&str]) -> Option<(String, Option<String>)> {
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
    if name_parts.is_empty() {
        return None;
    }
    let name = name_parts.join(" ");
    let value = if value_parts.is_empty() { None } else { Some(value_parts.join(" ")) };
    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mate_n_maps_to_depth_two_n_plus_one() {
        let params = parse_go_params(&["go", "mate", "3"]);
        assert_eq!(params.depth, Some(7));
    }

    #[test]
    fn setoption_splits_multi_word_name_and_value() {
        let cmd = parse_uci_command("setoption name Move Overhead value 50").unwrap();
        match cmd {
            UciCommand::SetOption { name, value } => {
                assert_eq!(name, "Move Overhead");
                assert_eq!(value, Some("50".to_string()));
            }
            _ => panic!("expected SetOption"),
        }
    }

    #[test]
    fn unknown_command_is_preserved_verbatim() {
        match parse_uci_command("frobnicate now").unwrap() {
            UciCommand::Unknown(text) => assert_eq!(text, "frobnicate now"),
            _ => panic!("expected Unknown"),
        }
    }
}
