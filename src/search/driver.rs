//! Root iterative-deepening driver (`spec.md` §4.12's root loop, §6.4's
//! time allocation and §5's cancellation contract).
//!
//! One call to [`search_root`] runs however many depths fit the given
//! [`SearchLimits`], handing one [`SearchReport`] per completed
//! iteration to `on_report` so the UCI layer can turn it into an `info`
//! line without this module knowing anything about UCI formatting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::nnue::network::Network;
use crate::position::{generate_moves, Position};
use crate::score::{is_mate_score, Score, DRAW_SCORE, MINUS_INFINITY, PLUS_INFINITY};
use crate::types::{Move, MAX_PLY};

use super::context::SearchContext;
use super::node::negamax;
use super::state::SearchState;
use super::time::{HardDeadline, NodeBudget};
use super::timeman::{MoveComplexity, TimeControl};

/// Inputs to one `go` (`spec.md` §6.1): how deep/long/much to search.
#[derive(Clone, Copy, Debug)]
pub struct SearchLimits {
    pub max_depth: i32,
    pub nodes_limit: u64,
    pub move_overhead_ms: u64,
    pub time_control: TimeControl,
}

impl Default for SearchLimits {
    fn default() -> Self {
        SearchLimits {
            max_depth: (MAX_PLY - 1) as i32,
            nodes_limit: 0,
            move_overhead_ms: 30,
            time_control: TimeControl::Infinite,
        }
    }
}

/// One completed root iteration, reported before moving to the next
/// depth (or stopping).
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub depth: i32,
    pub score: Score,
    pub nodes: u64,
    pub time_ms: u64,
    pub nps: u64,
    pub pv: Vec<Move>,
}

const ASPIRATION_DELTA_SHALLOW: Score = 35;
const ASPIRATION_DELTA_DEEP: Score = 20;
const ASPIRATION_MAX_DELTA: Score = 800;
/// Below this depth an aspiration window is more likely to cost a
/// re-search than it saves, so search the first few iterations full-width.
const ASPIRATION_MIN_DEPTH: i32 = 2;

/// Run iterative deepening from `pos` until a limit trips or `stop` is
/// externally set; returns the best move found, if any legal move
/// exists (`None` for checkmate/stalemate at the root).
#[allow(clippy::too_many_arguments)]
pub fn search_root(
    pos: &Position,
    net: &Network,
    state: &mut SearchState,
    limits: SearchLimits,
    stop: Arc<AtomicBool>,
    mut on_report: impl FnMut(&SearchReport),
) -> Option<Move> {
    let root_moves = generate_moves(pos, net);
    if root_moves.is_empty() {
        return None;
    }
    if root_moves.len() == 1 {
        return Some(root_moves[0]);
    }

    state.new_search();

    let start = Instant::now();
    let mut complexity = MoveComplexity::default();
    let mut total_nodes: u64 = 0;

    let initial_deadline = limits
        .time_control
        .compute_deadlines(limits.move_overhead_ms, complexity)
        .map_or(HardDeadline::none(), |(_, hard_ms)| HardDeadline::at(start + Duration::from_millis(hard_ms)));
    let mut budget = NodeBudget::new(Arc::clone(&stop), limits.nodes_limit, initial_deadline);

    let mut best_move: Option<Move> = None;
    let mut score: Score = DRAW_SCORE;

    for depth in 1..=limits.max_depth {
        if stop.load(Ordering::Acquire) {
            break;
        }

        if let Some((iteration_ms, hard_ms)) = limits.time_control.compute_deadlines(limits.move_overhead_ms, complexity) {
            let elapsed = start.elapsed().as_millis() as u64;
            if depth > 1 && elapsed >= iteration_ms {
                break;
            }
            total_nodes += budget.nodes();
            budget = NodeBudget::new(Arc::clone(&stop), limits.nodes_limit, HardDeadline::at(start + Duration::from_millis(hard_ms)));
        }

        let mut delta = if depth <= 5 { ASPIRATION_DELTA_SHALLOW } else { ASPIRATION_DELTA_DEEP };
        let mut alpha = if depth < ASPIRATION_MIN_DEPTH { MINUS_INFINITY } else { (score - delta).max(MINUS_INFINITY) };
        let mut beta = if depth < ASPIRATION_MIN_DEPTH { PLUS_INFINITY } else { (score + delta).min(PLUS_INFINITY) };

        let iteration_score = loop {
            let mut ctx = SearchContext::new(
                net, &mut state.tt, &mut state.killers, &mut state.counters, &mut state.follow_ups,
                &mut state.pv, &state.repetition, &mut budget, best_move,
            );
            let value = negamax(&mut ctx, pos, 0, depth, alpha, beta, true, None);

            if stop.load(Ordering::Acquire) {
                break None;
            }
            if is_mate_score(value) {
                break Some(value);
            }
            if value <= alpha {
                beta = (alpha + beta) / 2;
                alpha = (value - delta).max(MINUS_INFINITY);
                delta = delta.saturating_mul(2);
            } else if value >= beta {
                beta = (value + delta).min(PLUS_INFINITY);
                delta = delta.saturating_mul(3) / 2;
            } else {
                break Some(value);
            }
            if delta > ASPIRATION_MAX_DELTA {
                alpha = MINUS_INFINITY;
                beta = PLUS_INFINITY;
            }
        };

        let Some(value) = iteration_score else { break };
        score = value;

        let pv = state.pv.line().to_vec();
        let new_best = pv.first().copied().or(best_move);
        let best_move_changed = best_move.is_some() && new_best != best_move;
        best_move = new_best;
        complexity = complexity.update(best_move_changed);

        let nodes = total_nodes + budget.nodes();
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let nps = if elapsed_ms > 0 { nodes * 1000 / elapsed_ms } else { nodes };
        on_report(&SearchReport { depth, score, nodes, time_ms: elapsed_ms, nps, pv });

        if is_mate_score(score) {
            break;
        }
    }

    best_move
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nnue::network::{Network, HIDDEN, INPUTS};
    use crate::position::parse_fen;
    use std::sync::atomic::AtomicBool;

    fn startpos_network() -> Network {
        Network {
            input_weights: Box::new([[0i16; HIDDEN]; INPUTS]),
            input_bias: [0i16; HIDDEN],
            output_weights: [0i16; HIDDEN * 2],
            output_bias: 0,
        }
    }

    #[test]
    fn returns_the_only_legal_move_without_searching() {
        let net = startpos_network();
        let pos = parse_fen("8/8/8/8/8/8/6k1/5K1R w - - 0 1", &net).unwrap();
        let mut state = SearchState::new(4);
        let stop = Arc::new(AtomicBool::new(false));
        let limits = SearchLimits { max_depth: 1, ..SearchLimits::default() };
        let best = search_root(&pos, &net, &mut state, limits, stop, |_| {});
        assert!(best.is_some());
    }

    #[test]
    fn depth_limited_search_returns_a_move_and_reports_every_depth() {
        let net = startpos_network();
        let pos = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &net).unwrap();
        let mut state = SearchState::new(4);
        let stop = Arc::new(AtomicBool::new(false));
        let limits = SearchLimits { max_depth: 3, ..SearchLimits::default() };
        let mut depths_seen = Vec::new();
        let best = search_root(&pos, &net, &mut state, limits, stop, |report| {
            depths_seen.push(report.depth);
        });
        assert!(best.is_some());
        assert_eq!(depths_seen, vec![1, 2, 3]);
    }

    #[test]
    fn external_stop_flag_halts_before_max_depth() {
        let net = startpos_network();
        let pos = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &net).unwrap();
        let mut state = SearchState::new(4);
        let stop = Arc::new(AtomicBool::new(true));
        let limits = SearchLimits { max_depth: 20, ..SearchLimits::default() };
        let mut reports = 0;
        let best = search_root(&pos, &net, &mut state, limits, stop, |_| reports += 1);
        assert!(best.is_some());
        assert_eq!(reports, 0);
    }
}
