//! Per-search mutable state (`spec.md` §4.12's node state minus what
//! lives on the recursion stack itself): the structures shared across
//! every node of one `go` — TT, history tables, PV table, root-side
//! repetition ring and node budget — plus the branch-local repetition
//! trail a node pushes onto and its caller pops back off.

use crate::history::{CounterMoves, FollowUpMoves, Killers};
use crate::nnue::network::Network;
use crate::pv::PrincipalVariation;
use crate::repetition::RepetitionRing;
use crate::tt::TranspositionTable;
use crate::types::Move;

use super::time::NodeBudget;

pub struct SearchContext<'a> {
    pub net: &'a Network,
    pub tt: &'a mut TranspositionTable,
    pub killers: &'a mut Killers,
    pub counters: &'a mut CounterMoves,
    pub follow_ups: &'a mut FollowUpMoves,
    pub pv: &'a mut PrincipalVariation,
    pub root_history: &'a RepetitionRing,
    pub budget: &'a mut NodeBudget,
    pub root_best: Option<Move>,
    /// Zobrists of every position visited so far along the current
    /// search branch, pushed before recursing into a child and popped
    /// on the way back out -- the "node-level bloom" `spec.md` §4.9
    /// describes, kept as a plain trail since a branch can run deeper
    /// than the root ring's 50-entry cap.
    branch: Vec<u64>,
}

impl<'a> SearchContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        net: &'a Network,
        tt: &'a mut TranspositionTable,
        killers: &'a mut Killers,
        counters: &'a mut CounterMoves,
        follow_ups: &'a mut FollowUpMoves,
        pv: &'a mut PrincipalVariation,
        root_history: &'a RepetitionRing,
        budget: &'a mut NodeBudget,
        root_best: Option<Move>,
    ) -> Self {
        SearchContext { net, tt, killers, counters, follow_ups, pv, root_history, budget, root_best, branch: Vec::new() }
    }

    pub fn is_repetition(&self, zobrist: u64) -> bool {
        self.root_history.has(zobrist) || self.branch.contains(&zobrist)
    }

    pub fn push_branch(&mut self, zobrist: u64) {
        self.branch.push(zobrist);
    }

    pub fn pop_branch(&mut self) {
        self.branch.pop();
    }
}
