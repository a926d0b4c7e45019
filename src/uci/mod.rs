//! The line-oriented front end (`spec.md` §6.1): reads commands from
//! stdin, owns the [`EngineController`], and writes `info`/`bestmove`
//! lines to stdout behind one lock so the search thread's `info` lines
//! and the front end's own replies never interleave mid-line
//! (`spec.md` §5's output-stream serialization).

pub mod command;
pub mod notation;
pub mod options;
pub mod report;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use crate::engine::{EngineController, SearchParams, SearchResult};
use crate::nnue::network::Network;
use crate::position::{make_move, parse_fen};
use crate::search::TimeControl;

use command::{parse_uci_command, GoParams, UciCommand};
use notation::{format_move, parse_uci_move};
use options::{UciOptionAction, UciOptions};

const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
const DEFAULT_TT_MB: usize = 16;

#[cfg(not(feature = "embedded_nnue"))]
const DEFAULT_NNUE_PATHS: &[&str] = &["default.nnue", "nets/default.nnue"];

/// Load the evaluator: the compiled-in blob when `embedded_nnue` is on,
/// otherwise the first of a few common file paths that exists.
fn load_default_network() -> Result<Network, crate::error::EngineError> {
    #[cfg(feature = "embedded_nnue")]
    {
        Network::embedded()
    }
    #[cfg(not(feature = "embedded_nnue"))]
    {
        for path in DEFAULT_NNUE_PATHS {
            if let Ok(bytes) = std::fs::read(path) {
                return Network::from_bytes(&bytes);
            }
        }
        Err(crate::error::EngineError::NnueLoad(format!(
            "no NNUE weight file found in {DEFAULT_NNUE_PATHS:?}; build with --features embedded_nnue or place one of those files next to the binary"
        )))
    }
}

fn stdout_lock_println(line: &str) {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    let _ = writeln!(lock, "{line}");
    let _ = lock.flush();
}

fn time_control_from(params: &GoParams, white_to_move: bool) -> TimeControl {
    if params.infinite {
        return TimeControl::Infinite;
    }
    if let Some(ms) = params.movetime {
        return TimeControl::MoveTime { time_ms: ms };
    }
    if params.depth.is_some() && params.wtime.is_none() && params.btime.is_none() {
        return TimeControl::Depth;
    }
    let (time_left_ms, inc_ms) = if white_to_move {
        (params.wtime.unwrap_or(0), params.winc.unwrap_or(0))
    } else {
        (params.btime.unwrap_or(0), params.binc.unwrap_or(0))
    };
    if time_left_ms == 0 {
        return TimeControl::Infinite;
    }
    TimeControl::Incremental { time_left_ms, inc_ms, movestogo: params.movestogo }
}

/// `position` (`spec.md` §6.1): parse `startpos`/`fen`, replay `moves`,
/// and feed every position reached along the way into the repetition
/// ring, `normalize`-ing it once at the end (§4.9: "called at root
/// setup") so pre-root game-history repeats are visible to the search
/// as `root_history`, not just in-search ones.
fn apply_position_command(controller: &mut EngineController, net: &Network, parts: &[String]) {
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();
    let mut i = 1;
    let mut pos = if parts.get(i) == Some(&"startpos") {
        i += 1;
        match parse_fen(STARTPOS_FEN, net) {
            Ok(p) => p,
            Err(_) => return,
        }
    } else if parts.get(i) == Some(&"fen") {
        i += 1;
        if i + 6 > parts.len() {
            stdout_lock_println("info string position fen: missing fields");
            return;
        }
        let fen = parts[i..i + 6].join(" ");
        i += 6;
        match parse_fen(&fen, net) {
            Ok(p) => p,
            Err(e) => {
                stdout_lock_println(&format!("info string bad fen: {e}"));
                return;
            }
        }
    } else {
        stdout_lock_println("info string position: expected startpos or fen");
        return;
    };

    controller.with_search_state(|state| {
        state.repetition.clear();
        state.repetition.push(pos.zobrist);
    });

    if parts.get(i) == Some(&"moves") {
        i += 1;
        while i < parts.len() {
            match parse_uci_move(&pos, net, parts[i]) {
                Some(mv) => {
                    pos = make_move(&pos, net, mv);
                    controller.with_search_state(|state| {
                        if pos.rule50 == 0 {
                            state.repetition.clear();
                        }
                        state.repetition.push(pos.zobrist);
                    });
                }
                None => {
                    stdout_lock_println(&format!("info string illegal move {}", parts[i]));
                    break;
                }
            }
            i += 1;
        }
    }

    controller.with_search_state(|state| state.repetition.normalize());
    controller.set_position(pos);
}

fn handle_go(controller: &mut EngineController, params: GoParams, move_overhead_ms: u64) {
    let white_to_move = controller.position().side_to_move() == crate::types::Color::White;
    let time_control = time_control_from(&params, white_to_move);

    let search_params = SearchParams {
        max_depth: params.depth,
        nodes_limit: params.nodes.unwrap_or(0),
        move_overhead_ms,
        time_control,
    };

    let pos_for_report = controller.position().clone();
    let net_for_report = Arc::clone(controller.network());
    let info_cb: crate::engine::InfoCallback = Arc::new(move |report| {
        let line = report::format_info_line(&pos_for_report, &net_for_report, report);
        stdout_lock_println(&line);
    });
    controller.set_info_callback(Some(info_cb));

    let delay_bestmove = params.ponder || params.infinite;
    let pos_for_bestmove = controller.position().clone();
    let net_for_bestmove = Arc::clone(controller.network());
    controller.start_search(search_params, delay_bestmove, move |result: SearchResult| {
        match result.best_move {
            Some(mv) => stdout_lock_println(&format!("bestmove {}", format_move(&pos_for_bestmove, mv))),
            None => stdout_lock_println("bestmove 0000"),
        }
        let _ = &net_for_bestmove;
    });
}

/// Run the command loop until `quit`/`exit` or end of input.
pub fn run() {
    let net = match load_default_network() {
        Ok(net) => net,
        Err(e) => {
            eprintln!("info string fatal: {e}");
            std::process::exit(1);
        }
    };

    let mut controller = EngineController::new(DEFAULT_TT_MB, net);
    let net = Arc::clone(controller.network());
    let mut options = UciOptions::new(DEFAULT_TT_MB);
    let mut debug_on = false;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let Some(cmd) = parse_uci_command(&line) else { continue };

        match cmd {
            UciCommand::Uci => options.print(),
            UciCommand::IsReady => {
                controller.stop_search();
                stdout_lock_println("readyok");
            }
            UciCommand::UciNewGame => controller.new_game(),
            UciCommand::Position(parts) => apply_position_command(&mut controller, &net, &parts),
            UciCommand::Go(params) => handle_go(&mut controller, params, options.move_overhead_ms),
            UciCommand::Perft(depth) => run_perft(&controller, &net, depth),
            UciCommand::Bench(tokens) => run_bench(&net, &tokens),
            UciCommand::SetOption { name, value } => {
                if let UciOptionAction::ResizeHash(mb) = options.apply(&name, value.as_deref()) {
                    controller.resize_hash(mb);
                }
            }
            UciCommand::Debug(on) => {
                debug_on = on;
                if debug_on {
                    stdout_lock_println("info string debug on");
                }
            }
            UciCommand::Stop => {
                controller.signal_stop();
                controller.release_delayed_bestmove();
            }
            UciCommand::PonderHit => controller.release_delayed_bestmove(),
            UciCommand::Quit => {
                controller.stop_search();
                break;
            }
            UciCommand::Unknown(text) => stdout_lock_println(&format!("info string unknown command: {text}")),
        }
    }
}

/// `bench [go-limit-string]` (`spec.md` §6.1): a fixed-suite node-count
/// diagnostic alongside `perft`, not a full timed search benchmark —
/// same recursive counter, a small set of well-known positions instead
/// of just the current one.
const BENCH_POSITIONS: &[&str] = &[
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
    "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
    "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
];
const BENCH_DEFAULT_DEPTH: usize = 4;

fn run_bench(net: &Network, tokens: &[String]) {
    use std::time::Instant;

    let depth = tokens.get(1).and_then(|t| t.parse::<usize>().ok()).unwrap_or(BENCH_DEFAULT_DEPTH);

    fn count(pos: &crate::position::Position, net: &Network, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }
        crate::position::generate_moves(pos, net)
            .into_iter()
            .map(|mv| count(&make_move(pos, net, mv), net, depth - 1))
            .sum()
    }

    let start = Instant::now();
    let mut total_nodes = 0u64;
    for fen in BENCH_POSITIONS {
        let Ok(pos) = parse_fen(fen, net) else { continue };
        total_nodes += count(&pos, net, depth);
    }
    let elapsed = start.elapsed();
    let nps = if elapsed.as_secs_f64() > 0.0 { (total_nodes as f64 / elapsed.as_secs_f64()) as u64 } else { 0 };
    stdout_lock_println(&format!(
        "info string bench depth {depth} positions {} nodes {total_nodes} nps {nps} time {:?}",
        BENCH_POSITIONS.len(),
        elapsed
    ));
}

fn run_perft(controller: &EngineController, net: &Network, depth: usize) {
    use std::time::Instant;

    fn count(pos: &crate::position::Position, net: &Network, depth: usize) -> u64 {
        if depth == 0 {
            return 1;
        }
        crate::position::generate_moves(pos, net)
            .into_iter()
            .map(|mv| count(&make_move(pos, net, mv), net, depth - 1))
            .sum()
    }

    let start = Instant::now();
    let nodes = count(controller.position(), net, depth);
    let elapsed = start.elapsed();
    stdout_lock_println(&format!("info string perft depth {depth} nodes {nodes} time {:?}", elapsed));
}
