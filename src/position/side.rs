//! One side's slice of a [`super::Position`]: its pieces, their traits,
//! and the attack rows they contribute to the matrix.

use crate::attack_matrix::AttackMatrix;
use crate::bitboard::{Bitboard, TABLES};
use crate::nnue::network::Network;
use crate::nnue::NnueHalf;
use crate::sliding::{bishop_attacks, queen_attacks, rook_attacks};
use crate::types::{MAX_PIECES, PieceIndex, PieceKind, PieceTraits, Square, KING_INDEX};

/// Attack set of a single piece, own view, given the combined occupancy
/// (own pieces and the opponent's, both already expressed in this
/// side's view).
pub fn piece_attacks(kind: PieceKind, sq: Square, occupied: Bitboard) -> Bitboard {
    match kind {
        PieceKind::Queen => queen_attacks(sq, occupied),
        PieceKind::Rook => rook_attacks(sq, occupied),
        PieceKind::Bishop => bishop_attacks(sq, occupied),
        PieceKind::Knight => TABLES.knight_attacks[sq.index()],
        PieceKind::Pawn => TABLES.pawn_attacks[sq.index()],
        PieceKind::King => TABLES.king_attacks[sq.index()],
    }
}

/// Per-side position state (`spec.md` §3): pieces live in fixed slots
/// for the life of the game. A capture empties a slot; a promotion
/// mutates a slot's kind in place. The king is always slot 0.
#[derive(Clone)]
pub struct SideState {
    pub kind: [Option<PieceKind>; MAX_PIECES],
    pub square: [Option<Square>; MAX_PIECES],
    pub traits: [PieceTraits; MAX_PIECES],
    pub attacks: AttackMatrix,
    pub occupied: Bitboard,
    pub pawns: Bitboard,
    pub acc: NnueHalf,
}

impl SideState {
    pub fn empty(net: &Network) -> Self {
        SideState {
            kind: [None; MAX_PIECES],
            square: [None; MAX_PIECES],
            traits: [PieceTraits::default(); MAX_PIECES],
            attacks: AttackMatrix::new(),
            occupied: Bitboard::EMPTY,
            pawns: Bitboard::EMPTY,
            acc: NnueHalf::zeroed(net),
        }
    }

    #[inline]
    pub fn king_square(&self) -> Square {
        self.square[KING_INDEX as usize].expect("king slot always occupied")
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<PieceIndex> {
        self.square
            .iter()
            .position(|&s| s == Some(sq))
            .map(|i| i as PieceIndex)
    }

    /// First free (non-king) slot, or `None` if all 16 are in use.
    fn free_slot(&self) -> Option<PieceIndex> {
        (1..MAX_PIECES).find(|&i| self.kind[i].is_none()).map(|i| i as PieceIndex)
    }

    /// Place a new piece on the board, returning its slot. The king must
    /// be added first (and only once); every other kind goes in the
    /// first free non-king slot.
    pub fn add_piece(&mut self, kind: PieceKind, sq: Square) -> PieceIndex {
        let pi = if kind == PieceKind::King {
            KING_INDEX
        } else {
            self.free_slot().expect("side has more than 15 non-king pieces")
        };
        self.kind[pi as usize] = Some(kind);
        self.square[pi as usize] = Some(sq);
        self.traits[pi as usize] = PieceTraits::default();
        self.occupied = self.occupied | Bitboard::from_square(sq);
        if kind == PieceKind::Pawn {
            self.pawns = self.pawns | Bitboard::from_square(sq);
        }
        pi
    }

    /// Remove the piece in slot `pi`, vacating it for reuse.
    pub fn remove_piece(&mut self, pi: PieceIndex) {
        if let Some(sq) = self.square[pi as usize].take() {
            self.occupied = self.occupied.without(Bitboard::from_square(sq));
            self.pawns = self.pawns.without(Bitboard::from_square(sq));
        }
        self.kind[pi as usize] = None;
        self.traits[pi as usize] = PieceTraits::default();
        self.attacks.clear_piece(pi);
    }

    /// Relocate slot `pi` to `to`, leaving its kind and traits untouched.
    pub fn relocate(&mut self, pi: PieceIndex, to: Square) {
        let kind = self.kind[pi as usize].expect("relocate of an empty slot");
        if let Some(from) = self.square[pi as usize] {
            self.occupied = self.occupied.without(Bitboard::from_square(from));
            if kind == PieceKind::Pawn {
                self.pawns = self.pawns.without(Bitboard::from_square(from));
            }
        }
        self.square[pi as usize] = Some(to);
        self.occupied = self.occupied | Bitboard::from_square(to);
        if kind == PieceKind::Pawn {
            self.pawns = self.pawns | Bitboard::from_square(to);
        }
    }

    /// Change slot `pi`'s kind in place (promotion).
    pub fn set_kind(&mut self, pi: PieceIndex, kind: PieceKind) {
        if self.kind[pi as usize] == Some(PieceKind::Pawn) {
            if let Some(sq) = self.square[pi as usize] {
                self.pawns = self.pawns.without(Bitboard::from_square(sq));
            }
        }
        self.kind[pi as usize] = Some(kind);
    }

    /// Recompute slot `pi`'s row in the attack matrix from its current
    /// square and kind, given the combined occupancy (own view).
    pub fn refresh_attacks(&mut self, pi: PieceIndex, occupied: Bitboard) {
        match (self.kind[pi as usize], self.square[pi as usize]) {
            (Some(kind), Some(sq)) => {
                self.attacks.set_piece(pi, piece_attacks(kind, sq, occupied));
            }
            _ => self.attacks.clear_piece(pi),
        }
    }

    pub fn iter_pieces(&self) -> impl Iterator<Item = (PieceIndex, PieceKind, Square)> + '_ {
        (0..MAX_PIECES as PieceIndex).filter_map(move |pi| {
            let kind = self.kind[pi as usize]?;
            let sq = self.square[pi as usize]?;
            Some((pi, kind, sq))
        })
    }
}
