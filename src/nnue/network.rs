//! Network weights: 768 inputs (own/opponent x 6 kinds x 64 squares)
//! feeding a single 128-wide hidden layer per perspective, combined by a
//! SCReLU output layer (`spec.md` §4.5).
//!
//! A [`Network`] is plain data with no knowledge of where its bytes came
//! from; the engine front-end decides that (a file path, an embedded
//! blob behind `embedded_nnue`, or a test fixture) and hands a
//! `&Network` down to every [`super::NnueHalf`] operation. No global
//! singleton here, matching the rest of the ambient configuration.

use crate::types::{PieceKind, Square};

pub const INPUTS: usize = 768;
pub const HIDDEN: usize = 128;

/// Quantization scales: activations are clipped to `[0, QA]` before
/// squaring, hidden-to-output weights are scaled by `QB`, and the final
/// dot product is divided by `QA * QB` before `SCALE` is applied.
pub const QA: i32 = 255;
pub const QB: i32 = 64;
pub const SCALE: i32 = 400;

pub struct Network {
    pub input_weights: Box<[[i16; HIDDEN]; INPUTS]>,
    pub input_bias: [i16; HIDDEN],
    pub output_weights: [i16; HIDDEN * 2],
    pub output_bias: i16,
}

/// Index of the input feature for a piece of kind `kind` on `sq` (own
/// view of the accumulator's perspective), `own` indicating whether the
/// piece belongs to that perspective's side.
#[inline]
pub fn feature_index(own: bool, kind: PieceKind, sq: Square) -> usize {
    let side_block = if own { 0 } else { 6 * 64 };
    side_block + kind.index() * 64 + sq.index()
}

impl Network {
    /// Parse a little-endian, tightly-packed weight file: input weights,
    /// input biases, output weights, output bias, in that order.
    pub fn from_bytes(bytes: &[u8]) -> Result<Network, crate::error::EngineError> {
        let expected = (INPUTS * HIDDEN + HIDDEN + HIDDEN * 2 + 1) * 2;
        if bytes.len() < expected {
            return Err(crate::error::EngineError::NnueLoad(format!(
                "expected at least {expected} bytes, got {}",
                bytes.len()
            )));
        }
        let mut cursor = bytes.chunks_exact(2).map(|c| i16::from_le_bytes([c[0], c[1]]));
        let mut input_weights = Box::new([[0i16; HIDDEN]; INPUTS]);
        for row in input_weights.iter_mut() {
            for w in row.iter_mut() {
                *w = cursor.next().unwrap();
            }
        }
        let mut input_bias = [0i16; HIDDEN];
        for b in input_bias.iter_mut() {
            *b = cursor.next().unwrap();
        }
        let mut output_weights = [0i16; HIDDEN * 2];
        for w in output_weights.iter_mut() {
            *w = cursor.next().unwrap();
        }
        let output_bias = cursor.next().unwrap();
        Ok(Network {
            input_weights,
            input_bias,
            output_weights,
            output_bias,
        })
    }

    /// Load the weight file baked in at compile time. Requires a real
    /// `nets/default.nnue` to exist at the workspace root; this crate
    /// does not ship one (see the `embedded_nnue` feature doc comment in
    /// `Cargo.toml`).
    #[cfg(feature = "embedded_nnue")]
    pub fn embedded() -> Result<Network, crate::error::EngineError> {
        Network::from_bytes(include_bytes!("../../nets/default.nnue"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_rejects_truncated_input() {
        let err = Network::from_bytes(&[0u8; 4]);
        assert!(err.is_err());
    }
}
