//! Transposition table (`spec.md` §4.8).
//!
//! Direct-mapped, power-of-two slot count, one packed 8-byte entry per
//! slot: `{zobrist-high-bits:29, score:14, bound:2, draft:6, from:6,
//! to:6, can-be-killer:1}`. Score is biased by 8192 before packing so
//! the whole `[-8192, 8191]` range fits the 14-bit field unsigned.
//! Storage is always-replace — a write never consults what was in the
//! slot before it.

use crate::types::{Move, Square};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundType {
    /// The stored score is the position's exact minimax value.
    Exact,
    /// The search failed high; the true score is at least this.
    LowerBound,
    /// The search failed low; the true score is at most this.
    UpperBound,
}

const SCORE_BITS: u32 = 14;
const SCORE_MASK: u64 = (1 << SCORE_BITS) - 1;
const SCORE_BIAS: i64 = 8192;

const BOUND_SHIFT: u32 = SCORE_BITS;
const BOUND_MASK: u64 = 0b11;

const DRAFT_SHIFT: u32 = BOUND_SHIFT + 2;
const DRAFT_MASK: u64 = 0b11_1111;

const FROM_SHIFT: u32 = DRAFT_SHIFT + 6;
const SQUARE_MASK: u64 = 0b11_1111;

const TO_SHIFT: u32 = FROM_SHIFT + 6;

const KILLER_SHIFT: u32 = TO_SHIFT + 6;

const HASH_HIGH_SHIFT: u32 = KILLER_SHIFT + 1;

fn bound_tag(bound: BoundType) -> u64 {
    match bound {
        BoundType::UpperBound => 1,
        BoundType::LowerBound => 2,
        BoundType::Exact => 3,
    }
}

fn bound_from_tag(tag: u64) -> Option<BoundType> {
    match tag {
        1 => Some(BoundType::UpperBound),
        2 => Some(BoundType::LowerBound),
        3 => Some(BoundType::Exact),
        _ => None,
    }
}

/// Pack one slot. `best_move` uses the null-move encoding (`A8`→`A8`,
/// both squares zero) for "no move", the same sentinel the move type
/// itself uses, so no separate presence bit is needed.
fn pack(hash: u64, depth: u32, score: i32, bound: BoundType, best_move: Option<Move>, can_be_killer: bool) -> u64 {
    let biased_score = (score as i64 + SCORE_BIAS) as u64 & SCORE_MASK;
    let (from, to) = match best_move {
        Some(mv) => (mv.from.0 as u64, mv.to.0 as u64),
        None => (0, 0),
    };
    let hash_high = hash >> HASH_HIGH_SHIFT;

    (hash_high << HASH_HIGH_SHIFT)
        | ((can_be_killer as u64) << KILLER_SHIFT)
        | ((to & SQUARE_MASK) << TO_SHIFT)
        | ((from & SQUARE_MASK) << FROM_SHIFT)
        | (((depth as u64) & DRAFT_MASK) << DRAFT_SHIFT)
        | (bound_tag(bound) << BOUND_SHIFT)
        | biased_score
}

fn unpack(slot: u64) -> Option<ProbeResult> {
    let bound_type = bound_from_tag((slot >> BOUND_SHIFT) & BOUND_MASK)?;
    let score = ((slot & SCORE_MASK) as i64 - SCORE_BIAS) as i32;
    let depth = ((slot >> DRAFT_SHIFT) & DRAFT_MASK) as u32;
    let from = ((slot >> FROM_SHIFT) & SQUARE_MASK) as u8;
    let to = ((slot >> TO_SHIFT) & SQUARE_MASK) as u8;
    let can_be_killer = (slot >> KILLER_SHIFT) & 1 != 0;
    let best_move = if from == 0 && to == 0 { None } else { Some(Move::new(Square(from), Square(to))) };
    Some(ProbeResult { depth, score, bound_type, best_move, can_be_killer })
}

fn hash_high_bits(hash: u64) -> u64 {
    hash >> HASH_HIGH_SHIFT
}

pub struct TranspositionTable {
    table: Vec<u64>,
    mask: usize,
    occupied: usize,
}

impl TranspositionTable {
    /// A table sized to at most `size_mb` megabytes, rounded down to the
    /// largest power-of-two slot count that fits (a minimum of 1024 slots
    /// regardless of how small `size_mb` is).
    pub fn new(size_mb: usize) -> Self {
        let requested = (size_mb * 1024 * 1024) / std::mem::size_of::<u64>();
        let num_slots = if requested < 1024 {
            1024
        } else if requested.is_power_of_two() {
            requested
        } else {
            requested.next_power_of_two() / 2
        };
        TranspositionTable { table: vec![0u64; num_slots], mask: num_slots - 1, occupied: 0 }
    }

    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Start a new search. Always-replace storage means entries aren't
    /// aged for eviction priority; kept only so callers have a place to
    /// mark "a new iteration started" without touching table contents.
    pub fn new_generation(&mut self) {}

    pub fn probe(&self, hash: u64) -> Option<ProbeResult> {
        let slot = self.table[self.index(hash)];
        let result = unpack(slot)?;
        if (slot >> HASH_HIGH_SHIFT) != hash_high_bits(hash) {
            return None;
        }
        Some(result)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &mut self,
        hash: u64,
        depth: u32,
        score: i32,
        bound_type: BoundType,
        best_move: Option<Move>,
        can_be_killer: bool,
    ) {
        let index = self.index(hash);
        if self.table[index] == 0 {
            self.occupied += 1;
        }
        self.table[index] = pack(hash, depth, score, bound_type, best_move, can_be_killer);
    }

    pub fn clear(&mut self) {
        self.table.fill(0);
        self.occupied = 0;
    }

    /// Fill level in the UCI `hashfull` per-mille convention.
    pub fn hashfull_per_mille(&self) -> u32 {
        if self.table.is_empty() {
            return 0;
        }
        ((self.occupied as u64 * 1000) / self.table.len() as u64) as u32
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(64)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ProbeResult {
    pub depth: u32,
    pub score: i32,
    pub bound_type: BoundType,
    pub best_move: Option<Move>,
    pub can_be_killer: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Square;

    fn mv(from: u8, to: u8) -> Move {
        Move::new(Square(from), Square(to))
    }

    #[test]
    fn stores_and_probes_back_an_entry() {
        let mut tt = TranspositionTable::new(1);
        tt.store(0xABCD, 6, 42, BoundType::Exact, Some(mv(12, 28)), true);
        let found = tt.probe(0xABCD).expect("entry just stored");
        assert_eq!(found.score, 42);
        assert_eq!(found.depth, 6);
        assert_eq!(found.best_move, Some(mv(12, 28)));
        assert!(found.can_be_killer);
    }

    #[test]
    fn probe_misses_for_unstored_hash() {
        let tt = TranspositionTable::new(1);
        assert!(tt.probe(0x1234).is_none());
    }

    #[test]
    fn negative_and_boundary_scores_round_trip() {
        let mut tt = TranspositionTable::new(1);
        for score in [-8191, -1, 0, 1, 8191] {
            tt.store(99, 0, score, BoundType::Exact, None, false);
            assert_eq!(tt.probe(99).unwrap().score, score);
        }
    }

    #[test]
    fn store_always_replaces_even_a_deeper_existing_entry() {
        let mut tt = TranspositionTable::new(1);
        tt.store(7, 20, 10, BoundType::LowerBound, None, false);
        tt.store(7, 1, 20, BoundType::Exact, Some(mv(0, 1)), false);
        let found = tt.probe(7).unwrap();
        assert_eq!(found.depth, 1);
        assert_eq!(found.score, 20);
        assert_eq!(found.best_move, Some(mv(0, 1)));
    }

    #[test]
    fn a_colliding_index_with_different_high_bits_is_a_miss() {
        let mut tt = TranspositionTable::new(1);
        tt.store(5, 1, 1, BoundType::Exact, None, false);
        let colliding = 5 | (1u64 << 40); // same index bits, different high bits
        assert!(tt.probe(colliding).is_none());
    }

    #[test]
    fn clear_resets_occupancy() {
        let mut tt = TranspositionTable::new(1);
        tt.store(1, 1, 1, BoundType::Exact, None, false);
        tt.clear();
        assert_eq!(tt.hashfull_per_mille(), 0);
        assert!(tt.probe(1).is_none());
    }
}
