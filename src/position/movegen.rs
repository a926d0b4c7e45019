//! Legal move generation (`spec.md` §4.4.4).
//!
//! Pins and checks are not tracked incrementally (see the module doc
//! comment on [`super::make_move`]), so this generator takes the
//! simplest correct route instead of reconstructing that state by hand:
//! generate every pseudo-legal move a piece's geometry allows, then
//! confirm each one by actually playing it and checking whether the
//! mover's own king ends up attacked. Castling additionally checks that
//! the king's transit squares are safe before the move is even tried,
//! since "doesn't castle through check" is about squares the simulated
//! final position can't see.

use crate::bitboard::{Bitboard, TABLES};
use crate::nnue::network::Network;
use crate::types::{File, Move, PieceKind, PieceTraits, Rank, Side, Square, KING_INDEX};

use super::make_move::{castling_destinations, make_move};
use super::position::Position;

/// All legal moves for the side to move.
pub fn generate_moves(pos: &Position, net: &Network) -> Vec<Move> {
    let mut moves = pseudo_legal_moves(pos);
    moves.extend(en_passant_moves(pos));
    moves.retain(|&mv| leaves_own_king_safe(pos, net, mv));
    moves
}

/// Whether `mv` is one of `pos`'s legal moves. Used by UCI's `position
/// ... moves ...` parsing, not by search (which calls
/// [`generate_moves`] directly).
pub fn is_legal(pos: &Position, net: &Network, mv: Move) -> bool {
    generate_moves(pos, net).contains(&mv)
}

fn leaves_own_king_safe(pos: &Position, net: &Network, mv: Move) -> bool {
    let child = make_move(pos, net, mv);
    let mover_king = child.side(Side::Op).king_square();
    !child.side(Side::My).attacks.attackers_of(mover_king.flip()).any()
}

fn pseudo_legal_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::with_capacity(48);
    let my_own = pos.side(Side::My).occupied;

    for (pi, kind, sq) in pos.side(Side::My).iter_pieces() {
        match kind {
            PieceKind::King => continue,
            PieceKind::Pawn => generate_pawn_moves(pos, sq, &mut moves),
            _ => {
                let dests = pos.side(Side::My).attacks.attacks_of(pi).without(my_own);
                for to in dests.iter() {
                    moves.push(Move::new(sq, to));
                }
            }
        }
    }

    let king_sq = pos.side(Side::My).king_square();
    let king_dests = pos.side(Side::My).attacks.attacks_of(KING_INDEX).without(my_own);
    for to in king_dests.iter() {
        moves.push(Move::new(king_sq, to));
    }

    generate_castling_moves(pos, king_sq, &mut moves);
    moves
}

fn generate_pawn_moves(pos: &Position, sq: Square, moves: &mut Vec<Move>) {
    let pi = pos.side(Side::My).piece_at(sq).expect("pawn square came from iter_pieces");
    let opp_occ = pos.side(Side::Op).occupied.flip();
    let captures = pos.side(Side::My).attacks.attacks_of(pi) & opp_occ;
    for to in captures.iter() {
        push_pawn_move(moves, sq, to);
    }

    if sq.rank().0 < 7 {
        let combined = pos.occupied_for(Side::My);
        let one = Square::of(sq.file(), Rank::new(sq.rank().0 + 1));
        if !combined.has(one) {
            push_pawn_move(moves, sq, one);
            if sq.rank().0 == 1 {
                let two = Square::of(sq.file(), Rank::new(sq.rank().0 + 2));
                if !combined.has(two) {
                    moves.push(Move::new(sq, two));
                }
            }
        }
    }
}

/// Push a pawn move, expanding it into the four promotion choices when
/// `to` lands on the last rank (`spec.md` §3's promotion encoding: the
/// real destination is always rank 7, and `to.rank()` instead names the
/// promoted kind).
fn push_pawn_move(moves: &mut Vec<Move>, from: Square, to: Square) {
    if to.rank().0 == 7 {
        for promo_rank in 0..4u8 {
            moves.push(Move::new(from, Square::of(to.file(), Rank::new(promo_rank))));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

fn en_passant_moves(pos: &Position) -> Vec<Move> {
    let mut moves = Vec::new();
    for (opi, kind, op_sq) in pos.side(Side::Op).iter_pieces() {
        if kind != PieceKind::Pawn || !pos.side(Side::Op).traits[opi as usize].has(PieceTraits::EN_PASSANT) {
            continue;
        }
        let ep_sq = op_sq.flip();
        if ep_sq.rank().0 >= 7 {
            continue;
        }
        let dest = Square::of(ep_sq.file(), Rank::new(ep_sq.rank().0 + 1));
        for df in [-1i32, 1] {
            let f = ep_sq.file().0 as i32 + df;
            if !(0..8).contains(&f) {
                continue;
            }
            let candidate = Square::of(File::new(f as u8), ep_sq.rank());
            if let Some(pi) = pos.side(Side::My).piece_at(candidate) {
                if pos.side(Side::My).kind[pi as usize] == Some(PieceKind::Pawn) {
                    moves.push(Move::new(candidate, dest));
                }
            }
        }
    }
    moves
}

/// Castling is encoded as `from = rook square, to = king square`
/// (`spec.md` §3). Legal when: the king is not currently in check, no
/// piece sits between king and rook (or on either's destination square,
/// beyond the two pieces themselves), and every square the king passes
/// through — including its final square — is unattacked.
fn generate_castling_moves(pos: &Position, king_sq: Square, moves: &mut Vec<Move>) {
    if pos.is_in_check() {
        return;
    }
    let danger = pos.side(Side::Op).attacks.attacked_squares().flip();
    for (pi, kind, rook_sq) in pos.side(Side::My).iter_pieces() {
        if kind != PieceKind::Rook || !pos.side(Side::My).traits[pi as usize].has(PieceTraits::CASTLING) {
            continue;
        }
        let (king_to, rook_to) = castling_destinations(king_sq, rook_sq);
        let occ_excluding_both = pos
            .occupied_for(Side::My)
            .without(Bitboard::from_square(king_sq))
            .without(Bitboard::from_square(rook_sq));
        if (TABLES.between(king_sq, rook_sq) & occ_excluding_both).any() {
            continue;
        }
        if occ_excluding_both.has(king_to) || occ_excluding_both.has(rook_to) {
            continue;
        }
        let transit = TABLES.between(king_sq, king_to) | Bitboard::from_square(king_to);
        if (transit & danger).any() {
            continue;
        }
        moves.push(Move::new(rook_sq, king_sq));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nnue::network::{HIDDEN, INPUTS};

    fn test_network() -> Network {
        Network {
            input_weights: Box::new([[0i16; HIDDEN]; INPUTS]),
            input_bias: [0i16; HIDDEN],
            output_weights: [0i16; HIDDEN * 2],
            output_bias: 0,
        }
    }

    #[test]
    fn startpos_has_twenty_legal_moves() {
        let net = test_network();
        let pos = super::super::fen::parse_fen(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &net,
        )
        .unwrap();
        assert_eq!(generate_moves(&pos, &net).len(), 20);
    }

    #[test]
    fn king_in_corner_with_no_other_pieces_has_three_moves() {
        let net = test_network();
        let mut pos = Position::empty(crate::types::Color::White, &net);
        pos.place_for_test(Side::My, PieceKind::King, Square::of(File::new(0), Rank::new(0)), &net);
        pos.place_for_test(Side::Op, PieceKind::King, Square::of(File::new(4), Rank::new(4)), &net);
        assert_eq!(generate_moves(&pos, &net).len(), 3);
    }

    #[test]
    fn pinned_rook_cannot_leave_the_pin_line() {
        let net = test_network();
        let mut pos = Position::empty(crate::types::Color::White, &net);
        pos.place_for_test(Side::My, PieceKind::King, Square::of(File::new(4), Rank::new(0)), &net);
        pos.place_for_test(Side::My, PieceKind::Rook, Square::of(File::new(4), Rank::new(3)), &net);
        pos.place_for_test(Side::Op, PieceKind::King, Square::of(File::new(4), Rank::new(7)), &net);
        pos.place_for_test(Side::Op, PieceKind::Rook, Square::of(File::new(4), Rank::new(6)), &net);
        let moves = generate_moves(&pos, &net);
        let rook_sq = Square::of(File::new(4), Rank::new(3));
        for mv in moves.iter().filter(|m| m.from == rook_sq) {
            assert_eq!(mv.to.file().0, 4, "pinned rook left the file");
        }
    }
}
