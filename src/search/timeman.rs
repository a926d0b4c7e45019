//! Time-budget computation (`spec.md` §6.4).
//!
//! Converts per-color remaining time into a soft "iteration" deadline
//! (checked only between root iterations, governing whether the driver
//! starts the next depth at all) and a hard deadline (fed into
//! [`super::HardDeadline`], enforced mid-search by the node budget).

const MIN_MOVES_TO_GO: u64 = 10;
const LONG_TIME_CONTROL_MS: u64 = 300_000;
const MEDIUM_TIME_CONTROL_MS: u64 = 60_000;
const LONG_MOVES_ESTIMATE: u64 = 40;
const MEDIUM_MOVES_ESTIMATE: u64 = 30;
const SHORT_MOVES_ESTIMATE: u64 = 25;

/// Root-iteration complexity bonus/penalty, as the Fibonacci ratios
/// `spec.md` §6.4 names (3/5/8 over a `Normal` baseline of 5): an
/// unchanged best move after an iteration promotes toward `Easy`, a
/// changed one demotes toward `Hard`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveComplexity {
    Easy,
    Normal,
    Hard,
}

impl MoveComplexity {
    const NORMAL_RATIO: u64 = 5;

    fn ratio(self) -> u64 {
        match self {
            MoveComplexity::Easy => 3,
            MoveComplexity::Normal => Self::NORMAL_RATIO,
            MoveComplexity::Hard => 8,
        }
    }

    /// React to a completed root iteration: `Easy` only after the best
    /// move has held for at least one prior iteration too, so a single
    /// calm iteration after a `Hard` spike doesn't instantly relax.
    pub fn update(self, best_move_changed: bool) -> Self {
        if best_move_changed {
            MoveComplexity::Hard
        } else {
            match self {
                MoveComplexity::Hard => MoveComplexity::Normal,
                _ => MoveComplexity::Easy,
            }
        }
    }
}

impl Default for MoveComplexity {
    fn default() -> Self {
        MoveComplexity::Normal
    }
}

/// The `go` command's time-control inputs, already decomposed by the
/// front end (`spec.md` §6.1's `go` sub-tokens).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeControl {
    #[default]
    Infinite,
    Depth,
    MoveTime {
        time_ms: u64,
    },
    Incremental {
        time_left_ms: u64,
        inc_ms: u64,
        movestogo: Option<u64>,
    },
}

impl TimeControl {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, TimeControl::Infinite | TimeControl::Depth)
    }

    /// `(iteration_deadline_ms, hard_deadline_ms)` measured from search
    /// start, or `None` for an unlimited control (depth-only/infinite).
    pub fn compute_deadlines(&self, move_overhead_ms: u64, complexity: MoveComplexity) -> Option<(u64, u64)> {
        match *self {
            TimeControl::Infinite | TimeControl::Depth => None,
            TimeControl::MoveTime { time_ms } => {
                let t = time_ms.saturating_sub(move_overhead_ms).max(1);
                Some((t, t))
            }
            TimeControl::Incremental { time_left_ms, inc_ms, movestogo } => {
                Some(incremental_deadlines(time_left_ms, inc_ms, movestogo, move_overhead_ms, complexity))
            }
        }
    }
}

fn estimate_moves_to_go(safe_ms: u64, movestogo: Option<u64>) -> u64 {
    movestogo
        .unwrap_or_else(|| {
            if safe_ms > LONG_TIME_CONTROL_MS {
                LONG_MOVES_ESTIMATE
            } else if safe_ms > MEDIUM_TIME_CONTROL_MS {
                MEDIUM_MOVES_ESTIMATE
            } else {
                SHORT_MOVES_ESTIMATE
            }
        })
        .max(MIN_MOVES_TO_GO)
}

fn incremental_deadlines(
    time_left_ms: u64,
    inc_ms: u64,
    movestogo: Option<u64>,
    move_overhead_ms: u64,
    complexity: MoveComplexity,
) -> (u64, u64) {
    let safe_ms = time_left_ms.saturating_sub(move_overhead_ms);
    let moves_to_go = estimate_moves_to_go(safe_ms, movestogo);
    let average = safe_ms / moves_to_go + inc_ms;
    let scaled = (average * complexity.ratio() / MoveComplexity::NORMAL_RATIO).max(1);
    let iteration_deadline = scaled.min(safe_ms.max(1));
    let hard_deadline = (scaled * 3).max(iteration_deadline).min(safe_ms.max(1));
    (iteration_deadline, hard_deadline)
}
