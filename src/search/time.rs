//! Node-count budget and cancellation (`spec.md` §4.13, §5).
//!
//! The search thread owns one [`NodeBudget`]: it decrements a small
//! thread-local quota on every visited node and only touches the
//! shared atomic `stop` flag and the wall clock when the quota runs
//! dry, so a hot search loop isn't hammering an atomic load every
//! node. The timer thread (owned by the engine controller) sets `stop`
//! directly on an external deadline; the search never sleeps itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

const QUOTA_REFILL: u64 = 2048;

/// The hard wall-clock and/or move-count deadline the search must not
/// cross; `None` means "no such deadline" (ponder/infinite mode).
#[derive(Clone, Copy, Default)]
pub struct HardDeadline {
    pub at: Option<Instant>,
}

impl HardDeadline {
    pub fn none() -> Self {
        HardDeadline { at: None }
    }

    pub fn at(deadline: Instant) -> Self {
        HardDeadline { at: Some(deadline) }
    }

    fn is_past(&self) -> bool {
        self.at.is_some_and(|d| Instant::now() >= d)
    }
}

/// Thread-local countdown plus the shared flag it refreshes against.
pub struct NodeBudget {
    nodes: u64,
    nodes_limit: u64,
    quota: u64,
    stop: Arc<AtomicBool>,
    deadline: HardDeadline,
}

impl NodeBudget {
    pub fn new(stop: Arc<AtomicBool>, nodes_limit: u64, deadline: HardDeadline) -> Self {
        NodeBudget { nodes: 0, nodes_limit, quota: QUOTA_REFILL, stop, deadline }
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Call once per visited search node. Returns `true` if the search
    /// must unwind now (either an external stop request or a limit this
    /// call discovered).
    pub fn count_node(&mut self) -> bool {
        self.nodes += 1;
        if self.quota > 0 {
            self.quota -= 1;
            return self.stop.load(Ordering::Acquire);
        }
        self.quota = QUOTA_REFILL;

        if self.nodes_limit > 0 && self.nodes >= self.nodes_limit {
            self.stop.store(true, Ordering::Release);
        } else if self.deadline.is_past() {
            self.stop.store(true, Ordering::Release);
        }
        self.stop.load(Ordering::Acquire)
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}
