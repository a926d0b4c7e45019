//! Repetition detector (`spec.md` §4.9): a 50-entry ring per color,
//! each slot carrying a Bloom-style mini-hash of everything pushed
//! before it so most probes short-circuit without a linear scan.

const RING_SIZE: usize = 50;

#[derive(Clone, Copy)]
struct Entry {
    zobrist: u64,
    bloom: u64,
}

/// One color's history since the last irreversible move.
#[derive(Clone)]
pub struct RepetitionRing {
    entries: Vec<Entry>,
    running_bloom: u64,
}

fn bloom_bit(z: u64) -> u64 {
    1u64 << (z % 64)
}

impl RepetitionRing {
    pub fn new() -> Self {
        RepetitionRing { entries: Vec::with_capacity(RING_SIZE), running_bloom: 0 }
    }

    /// The root-side bloom: ORs every zobrist pushed so far, used as a
    /// cheap pre-filter by search nodes extending this branch.
    pub fn bloom(&self) -> u64 {
        self.running_bloom
    }

    /// Push `z` onto the ring, recording the bloom of everything pushed
    /// before it. Called after every reversible move; an irreversible
    /// move (capture, pawn move, loss of castling/en-passant rights)
    /// should `clear` instead, since no earlier position can repeat.
    pub fn push(&mut self, z: u64) {
        if self.entries.len() == RING_SIZE {
            self.entries.remove(0);
        }
        self.entries.push(Entry { zobrist: z, bloom: self.running_bloom });
        self.running_bloom |= bloom_bit(z);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.running_bloom = 0;
    }

    /// Whether `z` occurs anywhere in the ring. The bloom check is a
    /// fast negative filter: if `z`'s bit was never ORed in, it cannot
    /// have been pushed, so the scan is skipped entirely.
    pub fn has(&self, z: u64) -> bool {
        if self.running_bloom & bloom_bit(z) == 0 {
            return false;
        }
        self.entries.iter().any(|e| e.zobrist == z)
    }

    /// Called once at root setup: drops the root position itself (the
    /// most recently pushed entry) and keeps only zobrists that recur
    /// at least twice in what remains, recomputing blooms from scratch.
    /// A full ring is the one case that needs a linearize-then-rebuild
    /// pass, since `Vec::remove(0)` already keeps entries in ascending
    /// age order and a simple drop-last would otherwise disagree with
    /// the bloom ordering `push` assumes.
    pub fn normalize(&mut self) {
        self.entries.pop();

        let mut counts = std::collections::HashMap::new();
        for e in &self.entries {
            *counts.entry(e.zobrist).or_insert(0u32) += 1;
        }
        let kept: Vec<u64> = self.entries.iter().map(|e| e.zobrist).filter(|z| counts[z] >= 2).collect();

        self.entries.clear();
        self.running_bloom = 0;
        for z in kept {
            self.push(z);
        }
    }
}

impl Default for RepetitionRing {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_finds_a_pushed_zobrist() {
        let mut ring = RepetitionRing::new();
        ring.push(10);
        ring.push(20);
        assert!(ring.has(10));
        assert!(ring.has(20));
        assert!(!ring.has(30));
    }

    #[test]
    fn clear_forgets_all_history() {
        let mut ring = RepetitionRing::new();
        ring.push(10);
        ring.clear();
        assert!(!ring.has(10));
        assert_eq!(ring.bloom(), 0);
    }

    #[test]
    fn normalize_drops_root_and_keeps_only_repeats() {
        let mut ring = RepetitionRing::new();
        ring.push(1);
        ring.push(2);
        ring.push(1);
        ring.push(99); // root, dropped by normalize
        ring.normalize();
        assert!(ring.has(1));
        assert!(!ring.has(2));
        assert!(!ring.has(99));
    }

    #[test]
    fn ring_evicts_oldest_entry_past_capacity() {
        let mut ring = RepetitionRing::new();
        for z in 0..(RING_SIZE as u64 + 5) {
            ring.push(z);
        }
        assert!(!ring.has(0));
        assert!(ring.has(RING_SIZE as u64 + 4));
    }
}
