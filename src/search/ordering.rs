//! Move ordering (`spec.md` §4.10's fall-through list) plus the "tiny
//! SEE" that separates good from losing captures.
//!
//! Every move is assigned the first [`Category`] it matches, then
//! moves are sorted by `(category, tiebreak)` so the search tries
//! cutoff-likely moves first. Categories double as the late-move
//! reduction amount for that move (`spec.md` §4.12 step 10/11).

use crate::history::{CounterMoves, FollowUpMoves, Killers};
use crate::position::Position;
use crate::types::{Move, PieceKind, Rank, Side};

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Category {
    TtMove,
    RootBest,
    GoodCapture,
    Killer,
    CounterOrFollowUp,
    SafeQuietOfficer,
    SafePawnPush,
    QuietOfficer,
    PawnMove,
    KingQuiet,
    LosingCapture,
    LosingQuietOfficer,
}

impl Category {
    /// Reduction applied to every candidate in this bucket beyond the
    /// first, before LMR's own move-count-dependent scaling.
    pub fn base_reduction(self) -> u32 {
        match self {
            Category::SafeQuietOfficer => 2,
            Category::LosingQuietOfficer => 4,
            _ => 0,
        }
    }
}

/// Whether `pos`'s side-to-move piece at `sq` (My, own view) is
/// attacked only by pieces worth no more than it, or is defended by a
/// pawn, or has at least as many defenders as attackers — the "safe"
/// test reused for both quiet officer moves and passed-pawn pushes.
fn is_safe_destination(pos: &Position, kind: PieceKind, to: crate::types::Square) -> bool {
    let attackers = pos.side(Side::Op).attacks.attackers_of(to.flip());
    if !attackers.any() {
        return true;
    }
    let defenders = pos.side(Side::My).attacks.attackers_of(to);
    let cheapest_attacker = attackers
        .iter()
        .filter_map(|pi| pos.side(Side::Op).kind[pi as usize])
        .map(PieceKind::value)
        .min()
        .unwrap_or(i32::MAX);
    cheapest_attacker <= kind.value() || defenders.popcount() >= attackers.popcount()
}

/// Whether a capturing move comes out ahead materially, per `spec.md`
/// §4.10's "tiny SEE": cheap-takes-expensive is always good; an
/// expensive piece taking a cheap one is only good when the square
/// isn't pawn-defended and the attackers don't merely match or trail
/// the defenders.
fn is_good_capture(pos: &Position, mover_kind: PieceKind, victim: PieceKind, to: crate::types::Square) -> bool {
    if mover_kind.value() <= victim.value() {
        return true;
    }
    let defenders = pos.side(Side::Op).attacks.attackers_of(to.flip());
    let attackers = pos.side(Side::My).attacks.attackers_of(to);
    let defended_by_pawn = defenders
        .iter()
        .filter_map(|pi| pos.side(Side::Op).kind[pi as usize])
        .any(|k| k == PieceKind::Pawn);
    !defended_by_pawn && attackers.popcount() > defenders.popcount()
}

fn victim_kind(pos: &Position, to: crate::types::Square) -> Option<PieceKind> {
    pos.side(Side::Op).piece_at(to.flip()).and_then(|pi| pos.side(Side::Op).kind[pi as usize])
}

/// A move's ordering bucket plus whether it's eligible to become a
/// killer/counter/follow-up on a cutoff: quiet (no victim) and not a
/// queen promotion (`spec.md` §4.11), independent of which category a
/// TT-move or root-best hit preempted it into.
pub fn classify(
    pos: &Position,
    mv: Move,
    mover_kind: PieceKind,
    tt_move: Option<Move>,
    root_best: Option<Move>,
    killers: &Killers,
    counters: &CounterMoves,
    follow_ups: &FollowUpMoves,
    grandparent_move: Option<Move>,
    ply: usize,
) -> (Category, bool) {
    // Promotion moves are only ever pawn moves starting from rank 6
    // (`spec.md`'s encoding otherwise collides with an ordinary double
    // push landing on rank 3, whose `to.rank()` is also `< 4`).
    let is_promotion = mover_kind == PieceKind::Pawn && mv.from.rank().0 == 6;
    let promoted_kind = is_promotion.then(|| PieceKind::from_promotion_rank(mv.to.rank())).flatten();
    let is_underpromotion = promoted_kind.is_some() && promoted_kind != Some(PieceKind::Queen);
    let promotes_to_queen = promoted_kind == Some(PieceKind::Queen);
    let real_to = if is_promotion { crate::types::Square::of(mv.to.file(), Rank::new(7)) } else { mv.to };
    let is_capture = victim_kind(pos, real_to).is_some();
    let is_quiet = !is_capture && !promotes_to_queen;

    if tt_move == Some(mv) {
        return (Category::TtMove, is_quiet);
    }
    if root_best == Some(mv) {
        return (Category::RootBest, is_quiet);
    }

    if let Some(victim) = victim_kind(pos, real_to) {
        if promotes_to_queen || is_good_capture(pos, mover_kind, victim, real_to) {
            return (Category::GoodCapture, is_quiet);
        }
        return (Category::LosingCapture, is_quiet);
    }
    if promotes_to_queen {
        return (Category::GoodCapture, is_quiet);
    }

    if killers.at(ply).contains(&mv) {
        return (Category::Killer, is_quiet);
    }
    if counters.at(mover_kind, mv.to.index() as u8).contains(&mv) {
        return (Category::CounterOrFollowUp, is_quiet);
    }
    if let Some(gp) = grandparent_move {
        if follow_ups.at(gp).contains(&mv) {
            return (Category::CounterOrFollowUp, is_quiet);
        }
    }

    let cat = match mover_kind {
        PieceKind::King => Category::KingQuiet,
        PieceKind::Pawn if is_underpromotion => Category::PawnMove,
        PieceKind::Pawn => {
            if is_safe_destination(pos, mover_kind, mv.to) {
                Category::SafePawnPush
            } else {
                Category::PawnMove
            }
        }
        _ => {
            if is_safe_destination(pos, mover_kind, mv.to) {
                Category::SafeQuietOfficer
            } else {
                Category::LosingQuietOfficer
            }
        }
    };
    (cat, is_quiet)
}

/// Classify and sort `moves` by category, preserving generation order
/// within a category (a stable sort, matching `spec.md`'s fall-through
/// list). Returns each move paired with its category and its
/// history-eligibility flag so the caller can look up its base LMR
/// reduction and `canBeKiller` status without reclassifying.
#[allow(clippy::too_many_arguments)]
pub fn order_moves(
    pos: &Position,
    moves: Vec<Move>,
    tt_move: Option<Move>,
    root_best: Option<Move>,
    killers: &Killers,
    counters: &CounterMoves,
    follow_ups: &FollowUpMoves,
    grandparent_move: Option<Move>,
    ply: usize,
) -> Vec<(Move, Category, bool)> {
    let mut classified: Vec<(Move, Category, bool)> = moves
        .into_iter()
        .map(|mv| {
            let kind = pos
                .side(Side::My)
                .piece_at(mv.from)
                .and_then(|pi| pos.side(Side::My).kind[pi as usize])
                .unwrap_or(PieceKind::Pawn);
            let (cat, is_quiet) =
                classify(pos, mv, kind, tt_move, root_best, killers, counters, follow_ups, grandparent_move, ply);
            (mv, cat, is_quiet)
        })
        .collect();
    classified.sort_by_key(|&(_, cat, _)| cat);
    classified
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nnue::network::{Network, HIDDEN, INPUTS};
    use crate::types::{Color, File, Square};

    fn test_network() -> Network {
        Network {
            input_weights: Box::new([[0i16; HIDDEN]; INPUTS]),
            input_bias: [0i16; HIDDEN],
            output_weights: [0i16; HIDDEN * 2],
            output_bias: 0,
        }
    }

    #[test]
    fn category_order_places_tt_move_before_everything_else() {
        assert!(Category::TtMove < Category::GoodCapture);
        assert!(Category::GoodCapture < Category::QuietOfficer);
        assert!(Category::SafeQuietOfficer < Category::LosingQuietOfficer);
    }

    #[test]
    fn quiet_knight_move_with_no_defenders_classifies_as_king_quiet_or_officer() {
        let net = test_network();
        let mut pos = Position::empty(Color::White, &net);
        pos.place_for_test(Side::My, PieceKind::King, Square::of(File::new(0), Rank::new(0)), &net);
        pos.place_for_test(Side::My, PieceKind::Knight, Square::of(File::new(1), Rank::new(0)), &net);
        pos.place_for_test(Side::Op, PieceKind::King, Square::of(File::new(7), Rank::new(7)), &net);

        let killers = Killers::new();
        let counters = CounterMoves::new();
        let follow_ups = FollowUpMoves::new();
        let mv = Move::new(Square::of(File::new(1), Rank::new(0)), Square::of(File::new(3), Rank::new(1)));
        let (cat, is_quiet) = classify(&pos, mv, PieceKind::Knight, None, None, &killers, &counters, &follow_ups, None, 0);
        assert_eq!(cat, Category::SafeQuietOfficer);
        assert!(is_quiet);
    }
}
