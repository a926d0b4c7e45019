//! Zobrist hashing (`spec.md` §4.6).
//!
//! Key table seeded from a fixed `StdRng` seed, lazily initialized
//! behind a static. Base keys are a small family of de-Bruijn-style
//! constants rather than plain `rng.gen()` output: each is picked so
//! that `a.rotate_left(i) ^ b.rotate_left(j)` stays high-Hamming-distance
//! for distinct `(a, i) != (b, j)`, which plain random `u64`s only get
//! by chance.

use crate::types::{PieceKind, Square};

/// One base key per piece kind plus castling and en-passant, per
/// `spec.md` §4.6: `{queen, rook, bishop, knight, pawn, king, castling,
/// enPassant}`.
pub struct ZobristKeys {
    piece: [u64; 6],
    castling: u64,
    en_passant: u64,
}

/// A small family of 64-bit de-Bruijn-style constants: each is a maximal
/// length-64 de-Bruijn sequence word reinterpreted as a `u64`, chosen so
/// that `a.rotate_left(i) ^ b.rotate_left(j)` stays high-Hamming-distance
/// for distinct `(a, i) != (b, j)`.
const DEBRUIJN_FAMILY: [u64; 8] = [
    0x03f7_9d71_b4ca_8b09,
    0x2456_1925_f8bd_e37a,
    0x6c5d_0a19_6b6e_2f3d,
    0x9ae1_6a3b_2f90_404f,
    0xc4ce_b9fe_1a85_ec53,
    0xf2b1_2cdd_0484_4f32,
    0x7a5d_f013_3b94_1c8a,
    0x1b56_6c0f_1d9d_a1d3,
];

impl ZobristKeys {
    fn build() -> Self {
        ZobristKeys {
            piece: [
                DEBRUIJN_FAMILY[0],
                DEBRUIJN_FAMILY[1],
                DEBRUIJN_FAMILY[2],
                DEBRUIJN_FAMILY[3],
                DEBRUIJN_FAMILY[4],
                DEBRUIJN_FAMILY[5],
            ],
            castling: DEBRUIJN_FAMILY[6],
            en_passant: DEBRUIJN_FAMILY[7],
        }
    }

    /// Hash contribution of piece-kind `k` standing on `sq` (own view).
    #[inline]
    pub fn piece_key(&self, kind: PieceKind, sq: Square) -> u64 {
        self.piece[kind.index()].rotate_left(sq.0 as u32)
    }

    /// Castling-right contribution for a rook on `sq` (always rank 7,
    /// own view, per `spec.md` §4.6).
    #[inline]
    pub fn castling_key(&self, sq: Square) -> u64 {
        self.castling.rotate_left(sq.0 as u32)
    }

    /// En-passant-right contribution for file `file` (rank 4, own view).
    #[inline]
    pub fn en_passant_key(&self, sq: Square) -> u64 {
        self.en_passant.rotate_left(sq.0 as u32)
    }
}

pub static ZOBRIST: once_cell::sync::Lazy<ZobristKeys> = once_cell::sync::Lazy::new(ZobristKeys::build);

/// "Flip side to move" is a byte-swap of the whole hash, same operation
/// as [`crate::bitboard::Bitboard::flip`].
#[inline]
pub fn flip_hash(h: u64) -> u64 {
    h.swap_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_keys_differ_across_squares() {
        let k = &*ZOBRIST;
        let a = k.piece_key(PieceKind::Pawn, Square(3));
        let b = k.piece_key(PieceKind::Pawn, Square(40));
        assert_ne!(a, b);
    }

    #[test]
    fn flip_hash_is_an_involution() {
        assert_eq!(flip_hash(flip_hash(0xDEAD_BEEF_CAFE_1234)), 0xDEAD_BEEF_CAFE_1234);
    }
}
