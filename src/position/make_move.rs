//! Incremental move application (`spec.md` §4.4.1-§4.4.3).
//!
//! The position is always stored from the mover's perspective, so
//! making a move starts by swapping "my" and "op": the side about to
//! move becomes the new "op" (its pieces are the ones we are about to
//! relocate), and the side that is about to move *next* becomes the new
//! "my" (captures remove pieces from here). Every square named on the
//! incoming [`Move`] is in the mover's own view; the same physical
//! square in the opponent's own view is its [`Square::flip`].
//!
//! Pin/checker bookkeeping is recomputed on demand by move generation
//! from the (already incremental) attack matrix rather than threaded
//! through every branch below as separate trait updates; see
//! `DESIGN.md` for why that trade was made. Castling-right,
//! en-passant-right and promotable bits are still fully incremental.

use crate::nnue::network::Network;
use crate::types::{File, Move, PieceIndex, PieceKind, PieceTraits, Rank, Side, Square};
use crate::zobrist::{flip_hash, ZOBRIST};

use super::position::Position;

/// Rook/king destination squares for castling, own view. Orthodox rule:
/// the king ends on file C (queenside, rook file below the king's) or
/// file G (kingside); the rook ends adjacent to the king on the side it
/// came from. Chess960 boards reuse the same rule with arbitrary
/// starting rook files.
pub(super) fn castling_destinations(king_from: Square, rook_from: Square) -> (Square, Square) {
    let rank = king_from.rank();
    if rook_from.file().0 < king_from.file().0 {
        (Square::of(File::new(2), rank), Square::of(File::new(3), rank))
    } else {
        (Square::of(File::new(6), rank), Square::of(File::new(5), rank))
    }
}

/// Relocate a piece that stays under the same owner and kind, keeping
/// Zobrist and both sides' NNUE accumulators in sync. `mover` is the
/// owning side *after* the perspective swap (always `Side::Op` for a
/// piece that is actually moving this ply).
fn relocate_with_bookkeeping(
    pos: &mut Position,
    net: &Network,
    mover: Side,
    pi: PieceIndex,
    kind: PieceKind,
    from: Square,
    to: Square,
) {
    pos.zobrist ^= ZOBRIST.piece_key(kind, from);
    pos.zobrist ^= ZOBRIST.piece_key(kind, to);
    pos.side_mut(mover).acc.relocate(net, true, kind, from, to);
    pos.side_mut(mover.flip()).acc.relocate(net, false, kind, from.flip(), to.flip());
    pos.side_mut(mover).relocate(pi, to);
}

/// Remove a piece from `owner`'s slots (own view `sq`), updating Zobrist
/// and both accumulators. Returns its kind if one was present.
fn remove_with_bookkeeping(pos: &mut Position, net: &Network, owner: Side, sq: Square) -> Option<PieceKind> {
    let pi = pos.side(owner).piece_at(sq)?;
    let kind = pos.side(owner).kind[pi as usize].unwrap();
    if kind == PieceKind::Rook && pos.side(owner).traits[pi as usize].has(PieceTraits::CASTLING) {
        pos.zobrist ^= ZOBRIST.castling_key(sq);
    }
    pos.zobrist ^= ZOBRIST.piece_key(kind, sq);
    pos.side_mut(owner).acc.remove(net, true, kind, sq);
    pos.side_mut(owner.flip()).acc.remove(net, false, kind, sq.flip());
    pos.side_mut(owner).remove_piece(pi);
    Some(kind)
}

/// Apply `mv` to `parent`, returning the resulting child position.
/// `mv` must already be legal (movegen's job, not this function's).
pub fn make_move(parent: &Position, net: &Network, mv: Move) -> Position {
    let mut child = parent.swap_perspective();
    child.ply_from_root += 1;
    child.rule50 += 1;

    clear_stale_en_passant(&mut child);

    let from = mv.from;
    let to = mv.to;
    let mover = Side::Op;
    let pi = child
        .side(mover)
        .piece_at(from)
        .expect("make_move: no piece on `from`");
    let kind = child.side(mover).kind[pi as usize].expect("slot has a square but no kind");

    if kind == PieceKind::Pawn && from.rank().0 == 6 {
        apply_promotion(&mut child, net, pi, from, to);
    } else if kind == PieceKind::Pawn {
        apply_pawn_move(&mut child, net, pi, from, to);
    } else if kind == PieceKind::Rook && to == child.side(mover).king_square() {
        apply_castle(&mut child, net, pi, from, to);
    } else if kind == PieceKind::King {
        apply_king_move(&mut child, net, pi, from, to);
    } else {
        apply_piece_move(&mut child, net, pi, kind, from, to);
    }

    // A relocated leaper's own attack row is stale until refreshed, and
    // any slider's row can change even when it didn't move itself (a
    // blocker left its path). Recomputing every piece on both sides is
    // simpler than tracking exactly which rows a given move invalidates.
    child.recompute_attacks();

    child.zobrist = flip_hash(child.zobrist);
    child
}

/// The null move: flips the side to move and drops stale en-passant
/// rights but touches no piece (`spec.md` §4.4.2, used by null-move
/// pruning).
pub fn make_null_move(parent: &Position) -> Position {
    let mut child = parent.swap_perspective();
    child.ply_from_root += 1;
    child.rule50 += 1;
    clear_stale_en_passant(&mut child);
    child.zobrist = flip_hash(child.zobrist);
    child
}

/// The en-passant right set by a double push survives exactly one
/// reply. By the time this ply's move is being applied, any flag still
/// sitting on the (pre-swap) opponent's pawn is from two plies ago and
/// must be dropped. After the swap that side is `Side::My`.
fn clear_stale_en_passant(pos: &mut Position) {
    let side = pos.side_mut(Side::My);
    if let Some(pi) = (0..crate::types::MAX_PIECES as PieceIndex)
        .find(|&pi| side.traits[pi as usize].has(PieceTraits::EN_PASSANT))
    {
        side.traits[pi as usize].clear(PieceTraits::EN_PASSANT);
        if let Some(sq) = side.square[pi as usize] {
            pos.zobrist ^= ZOBRIST.en_passant_key(sq);
        }
    }
}

/// Handles every non-promotion pawn move: straight advances, ordinary
/// diagonal captures, and en-passant captures. A diagonal move onto a
/// square with no piece on it can only be en passant (movegen never
/// generates a diagonal pawn move into empty air otherwise); the
/// captured pawn then sits beside the mover, one rank behind `to`.
fn apply_pawn_move(pos: &mut Position, net: &Network, pi: PieceIndex, from: Square, to: Square) {
    pos.rule50 = 0;
    if from.file() != to.file() {
        if remove_with_bookkeeping(pos, net, Side::My, to.flip()).is_none() {
            let captured_sq = Square::of(to.file(), from.rank()).flip();
            remove_with_bookkeeping(pos, net, Side::My, captured_sq);
        }
    }
    relocate_with_bookkeeping(pos, net, Side::Op, pi, PieceKind::Pawn, from, to);
    if from.rank().0 == 1 && to.rank().0 == 3 {
        set_en_passant_if_capturable(pos, to);
    }
}

/// After a double push, mark the pawn en-passant-capturable only if an
/// opposing pawn actually stands beside it (`spec.md` §4.4.3's
/// simplification: we skip the pin-legality simulation and mark
/// geometric adjacency only -- movegen still verifies king safety when
/// the capture is attempted).
fn set_en_passant_if_capturable(pos: &mut Position, pawn_sq: Square) {
    let opp_view = pawn_sq.flip();
    let op_pi = pos.side(Side::Op).piece_at(pawn_sq).expect("just-moved pawn is at `to`");
    let neighbour_files = [opp_view.file().0.checked_sub(1), Some(opp_view.file().0 + 1).filter(|&f| f < 8)];
    let has_capturer = neighbour_files.into_iter().flatten().any(|f| {
        let candidate = Square::of(File::new(f), opp_view.rank());
        matches!(
            pos.side(Side::My).piece_at(candidate).map(|pi| pos.side(Side::My).kind[pi as usize]),
            Some(Some(PieceKind::Pawn))
        )
    });
    if has_capturer {
        pos.side_mut(Side::Op).traits[op_pi as usize].set(PieceTraits::EN_PASSANT);
        pos.zobrist ^= ZOBRIST.en_passant_key(pawn_sq);
    }
}

fn apply_promotion(pos: &mut Position, net: &Network, pi: PieceIndex, from: Square, to_encoded: Square) {
    pos.rule50 = 0;
    let promoted = PieceKind::from_promotion_rank(to_encoded.rank()).expect("promotion move carries a promotion rank");
    let real_to = Square::of(to_encoded.file(), Rank::new(7));
    if real_to.file() != from.file() {
        remove_with_bookkeeping(pos, net, Side::My, real_to.flip());
    }
    // Promotion mutates slot `pi` in place (kind changes) rather than
    // freeing and re-acquiring a slot, so it keeps the same index for
    // the rest of the game.
    pos.zobrist ^= ZOBRIST.piece_key(PieceKind::Pawn, from);
    pos.side_mut(Side::Op).acc.remove(net, true, PieceKind::Pawn, from);
    pos.side_mut(Side::My).acc.remove(net, false, PieceKind::Pawn, from.flip());
    pos.side_mut(Side::Op).relocate(pi, real_to);
    pos.side_mut(Side::Op).set_kind(pi, promoted);
    pos.zobrist ^= ZOBRIST.piece_key(promoted, real_to);
    pos.side_mut(Side::Op).acc.add(net, true, promoted, real_to);
    pos.side_mut(Side::My).acc.add(net, false, promoted, real_to.flip());
}

fn apply_king_move(pos: &mut Position, net: &Network, pi: PieceIndex, from: Square, to: Square) {
    clear_own_castling_rights(pos);
    if remove_with_bookkeeping(pos, net, Side::My, to.flip()).is_some() {
        pos.rule50 = 0;
    }
    relocate_with_bookkeeping(pos, net, Side::Op, pi, PieceKind::King, from, to);
}

fn clear_own_castling_rights(pos: &mut Position) {
    for rpi in 0..crate::types::MAX_PIECES as PieceIndex {
        if pos.side(Side::Op).traits[rpi as usize].has(PieceTraits::CASTLING) {
            pos.side_mut(Side::Op).traits[rpi as usize].clear(PieceTraits::CASTLING);
            if let Some(sq) = pos.side(Side::Op).square[rpi as usize] {
                pos.zobrist ^= ZOBRIST.castling_key(sq);
            }
        }
    }
}

fn apply_castle(pos: &mut Position, net: &Network, pi: PieceIndex, rook_from: Square, king_from: Square) {
    pos.rule50 = 0;
    let (king_to, rook_to) = castling_destinations(king_from, rook_from);
    let king_pi = pos.side(Side::Op).piece_at(king_from).expect("castling needs the king on its square");

    clear_own_castling_rights(pos);

    relocate_with_bookkeeping(pos, net, Side::Op, pi, PieceKind::Rook, rook_from, rook_to);
    relocate_with_bookkeeping(pos, net, Side::Op, king_pi, PieceKind::King, king_from, king_to);
}

fn apply_piece_move(pos: &mut Position, net: &Network, pi: PieceIndex, kind: PieceKind, from: Square, to: Square) {
    if pos.side(Side::Op).traits[pi as usize].has(PieceTraits::CASTLING) {
        pos.side_mut(Side::Op).traits[pi as usize].clear(PieceTraits::CASTLING);
        pos.zobrist ^= ZOBRIST.castling_key(from);
    }
    if remove_with_bookkeeping(pos, net, Side::My, to.flip()).is_some() {
        pos.rule50 = 0;
    }
    relocate_with_bookkeeping(pos, net, Side::Op, pi, kind, from, to);
}
