//! Everything a search needs that outlives one `go` (`spec.md` §6.1's
//! `ucinewgame`/`position` lifecycle): the transposition table, the
//! three history tables, the PV table and the root-side repetition
//! ring. Bundled so the engine controller can hand one `&mut` to the
//! search thread and clear it all in one place between games.

use crate::history::{CounterMoves, FollowUpMoves, Killers};
use crate::pv::PrincipalVariation;
use crate::repetition::RepetitionRing;
use crate::tt::TranspositionTable;

pub struct SearchState {
    pub tt: TranspositionTable,
    pub killers: Killers,
    pub counters: CounterMoves,
    pub follow_ups: FollowUpMoves,
    pub pv: PrincipalVariation,
    pub repetition: RepetitionRing,
}

impl SearchState {
    pub fn new(tt_mb: usize) -> Self {
        SearchState {
            tt: TranspositionTable::new(tt_mb),
            killers: Killers::new(),
            counters: CounterMoves::new(),
            follow_ups: FollowUpMoves::new(),
            pv: PrincipalVariation::new(),
            repetition: RepetitionRing::new(),
        }
    }

    /// Start a new search within the same game: age the TT so this
    /// iteration's entries win ties against the last search's, but keep
    /// history tables and repetition (both carry useful signal across
    /// moves of the same game).
    pub fn new_search(&mut self) {
        self.tt.new_generation();
        self.pv.clear();
    }

    /// `ucinewgame` (`spec.md` §6.1): forget everything, since none of
    /// it says anything useful about an unrelated game.
    pub fn clear_for_new_game(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.counters.clear();
        self.follow_ups.clear();
        self.pv.clear();
        self.repetition.clear();
    }

    pub fn resize_hash(&mut self, mb: usize) {
        self.tt = TranspositionTable::new(mb);
    }
}
