//! Dual-perspective NNUE evaluator (`spec.md` §4.5).
//!
//! Each side carries its own accumulator half, updated incrementally by
//! [`crate::position::make_move`] rather than recomputed from scratch.
//! The two halves are swapped along with everything else in
//! [`crate::position::Position`] when the side to move flips, so
//! `evaluate` always receives "mover's half, then opponent's half" in
//! that order. Every operation here takes the active [`Network`]
//! explicitly; nothing in this module reaches for a global.

pub mod network;
pub mod simd;

use crate::types::{PieceKind, Square};
use network::{feature_index, Network, HIDDEN, QA, QB, SCALE};

/// One side's accumulator: the hidden-layer pre-activation values for
/// that side's perspective.
#[derive(Clone)]
pub struct NnueHalf {
    pub values: [i16; HIDDEN],
}

impl NnueHalf {
    pub fn zeroed(net: &Network) -> Self {
        NnueHalf { values: net.input_bias }
    }

    #[inline]
    pub fn add(&mut self, net: &Network, own: bool, kind: PieceKind, sq: Square) {
        let feat = feature_index(own, kind, sq);
        simd::accumulate(&mut self.values, &net.input_weights[feat], 1);
    }

    #[inline]
    pub fn remove(&mut self, net: &Network, own: bool, kind: PieceKind, sq: Square) {
        let feat = feature_index(own, kind, sq);
        simd::accumulate(&mut self.values, &net.input_weights[feat], -1);
    }

    /// Net effect of moving a piece from `from` to `to` without changing
    /// kind or ownership: one add, one remove.
    #[inline]
    pub fn relocate(&mut self, net: &Network, own: bool, kind: PieceKind, from: Square, to: Square) {
        self.remove(net, own, kind, from);
        self.add(net, own, kind, to);
    }
}

/// Evaluate from the mover's perspective: `mover` is the half belonging
/// to the side to move, `opponent` the other. SCReLU: clip to `[0, QA]`,
/// square, dot with the output layer, then `(sum / QA + bias) * SCALE /
/// (QA * QB)`.
pub fn evaluate(net: &Network, mover: &NnueHalf, opponent: &NnueHalf) -> i32 {
    let mut acc: i64 = 0;
    for (i, &v) in mover.values.iter().enumerate() {
        let clipped = v.clamp(0, QA as i16) as i32;
        acc += (clipped * clipped) as i64 * net.output_weights[i] as i64;
    }
    for (i, &v) in opponent.values.iter().enumerate() {
        let clipped = v.clamp(0, QA as i16) as i32;
        acc += (clipped * clipped) as i64 * net.output_weights[HIDDEN + i] as i64;
    }
    let out = acc / QA as i64 + net.output_bias as i64;
    (out * SCALE as i64 / (QA as i64 * QB as i64)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_network() -> Network {
        Network {
            input_weights: Box::new([[0i16; HIDDEN]; network::INPUTS]),
            input_bias: [0i16; HIDDEN],
            output_weights: [0i16; HIDDEN * 2],
            output_bias: 0,
        }
    }

    #[test]
    fn add_then_remove_is_identity() {
        let net = tiny_network();
        let mut half = NnueHalf::zeroed(&net);
        let before = half.values;
        half.add(&net, true, PieceKind::Knight, Square::new(12));
        half.remove(&net, true, PieceKind::Knight, Square::new(12));
        assert_eq!(half.values, before);
    }

    #[test]
    fn zero_network_evaluates_to_output_bias_scaled() {
        let net = tiny_network();
        let mover = NnueHalf::zeroed(&net);
        let opponent = NnueHalf::zeroed(&net);
        assert_eq!(evaluate(&net, &mover, &opponent), 0);
    }
}
