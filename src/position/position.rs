//! The position itself: two [`SideState`]s, a Zobrist hash and the
//! fifty-move counter (`spec.md` §3).

use crate::bitboard::Bitboard;
use crate::nnue::evaluate;
use crate::nnue::network::Network;
use crate::types::{Color, PieceIndex, PieceKind, Side, Square};
use crate::zobrist::ZOBRIST;

use super::side::SideState;

#[derive(Clone)]
pub struct Position {
    sides: [SideState; 2],
    /// Absolute color to move. Everything else on `Position` is stored
    /// relative to that side ("my"/"op"), per `spec.md` §3.
    pub stm: Color,
    pub zobrist: u64,
    pub rule50: u8,
    pub ply_from_root: u32,
}

impl Position {
    pub fn empty(stm: Color, net: &Network) -> Self {
        Position {
            sides: [SideState::empty(net), SideState::empty(net)],
            stm,
            zobrist: 0,
            rule50: 0,
            ply_from_root: 0,
        }
    }

    #[inline]
    pub fn side(&self, s: Side) -> &SideState {
        &self.sides[s.index()]
    }

    #[inline]
    pub fn side_mut(&mut self, s: Side) -> &mut SideState {
        &mut self.sides[s.index()]
    }

    /// Swap perspectives: the side that is about to move becomes "op",
    /// the side that was "op" becomes the one about to move. Zobrist,
    /// rule50 and ply are carried over unflipped/unincremented; the
    /// caller (`make_move`/`make_null_move`) finishes the job.
    pub(super) fn swap_perspective(&self) -> Position {
        Position {
            sides: [self.sides[1].clone(), self.sides[0].clone()],
            stm: !self.stm,
            zobrist: self.zobrist,
            rule50: self.rule50,
            ply_from_root: self.ply_from_root,
        }
    }

    /// Combined occupancy expressed in `side`'s own view: its own pieces
    /// plus the opponent's, rank-mirrored into this side's frame.
    #[inline]
    pub fn occupied_for(&self, s: Side) -> Bitboard {
        self.side(s).occupied | self.side(s.flip()).occupied.flip()
    }

    /// Recompute both sides' attack rows from scratch. Zobrist, material
    /// and the NNUE accumulators stay incremental; only the attack
    /// matrix is rebuilt here, after FEN parsing and after every move.
    pub fn recompute_attacks(&mut self) {
        for s in [Side::My, Side::Op] {
            let occ = self.occupied_for(s);
            for pi in 0..crate::types::MAX_PIECES as crate::types::PieceIndex {
                self.side_mut(s).refresh_attacks(pi, occ);
            }
        }
    }

    /// The color about to move.
    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.stm
    }

    pub fn is_in_check(&self) -> bool {
        let king_sq = self.side(Side::My).king_square();
        self.side(Side::Op)
            .attacks
            .attackers_of(king_sq.flip())
            .any()
    }

    /// Static evaluation from the side-to-move's perspective.
    pub fn evaluate(&self, net: &Network) -> i32 {
        evaluate(net, &self.side(Side::My).acc, &self.side(Side::Op).acc)
    }

    pub fn material_score(&self) -> i32 {
        let mut score = 0;
        for (_, kind, _) in self.side(Side::My).iter_pieces() {
            score += kind.value();
        }
        for (_, kind, _) in self.side(Side::Op).iter_pieces() {
            score -= kind.value();
        }
        score
    }

    /// Place a piece on the board, updating Zobrist and both sides'
    /// NNUE accumulators (every piece is a feature for both
    /// perspectives, own for its owner and mirrored for the other
    /// side). Attack rows are left to a follow-up [`Position::recompute_attacks`]
    /// call since FEN parsing places every piece before any attacks are
    /// meaningful.
    pub fn place_piece(&mut self, net: &Network, owner: Side, kind: PieceKind, sq: Square) -> PieceIndex {
        self.zobrist ^= ZOBRIST.piece_key(kind, sq);
        self.side_mut(owner).acc.add(net, true, kind, sq);
        self.side_mut(owner.flip()).acc.add(net, false, kind, sq.flip());
        self.side_mut(owner).add_piece(kind, sq)
    }

    /// Test-only helper: place a piece and immediately refresh just its
    /// own attack row, without a full FEN parse.
    #[cfg(test)]
    pub fn place_for_test(&mut self, s: Side, kind: PieceKind, sq: Square, net: &Network) -> PieceIndex {
        let pi = self.place_piece(net, s, kind, sq);
        let occ = self.occupied_for(s);
        self.side_mut(s).refresh_attacks(pi, occ);
        pi
    }
}
