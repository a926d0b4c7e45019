//! Negamax search node and quiescence (`spec.md` §4.12).
//!
//! The position model is functional (`make_move` returns a fresh child
//! rather than mutating in place), so there is no unmake bookkeeping
//! here: every recursive call just owns its own `Position` and the
//! parent's borrow ends when the call returns.

use crate::material::is_insufficient_material;
use crate::position::{generate_moves, make_move, make_null_move, Position};
use crate::score::{
    from_tt, mate_in, mated_in, to_tt, Score, DRAW_SCORE, MINUS_INFINITY,
};
use crate::tt::BoundType;
use crate::types::{Move, PieceKind, Ply, Side, MAX_PLY};

use super::context::SearchContext;
use super::ordering::{classify, order_moves, Category};

/// Static-null-move (reverse futility) margins, indexed by `draft`
/// clamped to `1..=3`; `spec.md` §4.12 step 8 gives these exactly.
const STATIC_NULL_MARGIN: [Score; 4] = [0, 50, 150, 200];
/// Razoring uses the same schedule: `spec.md` names the static-null
/// margins but leaves razoring's unspecified, so this reuses them
/// rather than inventing a second table.
const RAZOR_MARGIN: [Score; 4] = STATIC_NULL_MARGIN;

fn has_non_pawn_material(pos: &Position) -> bool {
    pos.side(Side::My).iter_pieces().any(|(_, k, _)| !matches!(k, PieceKind::Pawn | PieceKind::King))
}

fn mover_kind(pos: &Position, mv: Move) -> PieceKind {
    pos.side(Side::My).piece_at(mv.from).and_then(|pi| pos.side(Side::My).kind[pi as usize]).unwrap_or(PieceKind::Pawn)
}

/// Extra reduction beyond a category's [`Category::base_reduction`]:
/// none for the first move or at shallow draft, a PV node gets one ply
/// back, and a "safe passed-pawn push" is reduced further the closer it
/// is to its own back rank (it had farthest to go before it mattered).
fn lmr_reduction(category: Category, mv: Move, move_index: usize, draft: i32, is_pv: bool) -> i32 {
    if move_index < 1 || draft < 2 {
        return 0;
    }
    let mut r = category.base_reduction() as i32;
    if category == Category::SafePawnPush {
        r += (5i32 - mv.to.rank().0 as i32).max(0);
    }
    if is_pv && r > 0 {
        r -= 1;
    }
    r.clamp(0, draft - 1)
}

/// Negamax with principal-variation search. Returns the side-to-move's
/// score for `pos` at `(alpha, beta)`; also updates `ctx`'s TT, PV and
/// history tables along the way.
#[allow(clippy::too_many_arguments)]
pub fn negamax(
    ctx: &mut SearchContext,
    pos: &Position,
    ply: usize,
    draft: i32,
    mut alpha: Score,
    mut beta: Score,
    is_pv: bool,
    grandparent_move: Option<Move>,
) -> Score {
    if ctx.budget.count_node() {
        return pos.evaluate(ctx.net);
    }

    let moves = generate_moves(pos, ctx.net);
    if moves.is_empty() {
        return if pos.is_in_check() { mated_in(ply as Ply) } else { DRAW_SCORE };
    }

    if ply >= MAX_PLY {
        return pos.evaluate(ctx.net);
    }

    alpha = alpha.max(mated_in(ply as Ply));
    beta = beta.min(mate_in(ply as Ply + 1));
    if alpha >= beta {
        return alpha;
    }

    if pos.rule50 >= 100 || is_insufficient_material(pos) || ctx.is_repetition(pos.zobrist) {
        return DRAW_SCORE;
    }

    let in_check = pos.is_in_check();
    let draft = if in_check { draft + 1 } else { draft };

    let tt_hit = ctx.tt.probe(pos.zobrist);
    let tt_move = tt_hit.and_then(|e| e.best_move);
    if let Some(entry) = tt_hit {
        if entry.depth as i32 >= draft && !is_pv {
            let stored = from_tt(entry.score, ply as Ply);
            match entry.bound_type {
                BoundType::Exact => return stored,
                BoundType::LowerBound if stored >= beta => return stored,
                BoundType::UpperBound if stored <= alpha => return stored,
                _ => {}
            }
        }
    }

    if draft <= 0 && !in_check {
        return quiescence(ctx, pos, ply, alpha, beta);
    }

    let eval = pos.evaluate(ctx.net);

    if !in_check && !is_pv && draft >= 1 && draft <= 3 {
        let idx = draft as usize;
        if eval - STATIC_NULL_MARGIN[idx] >= beta {
            return eval;
        }
        if eval + RAZOR_MARGIN[idx] < alpha {
            return quiescence(ctx, pos, ply, alpha, beta);
        }
    }

    if !is_pv && !in_check && has_non_pawn_material(pos) && eval >= beta {
        let r = 4 + (draft - 2) / 4;
        let child = make_null_move(pos);
        ctx.push_branch(child.zobrist);
        let score = -negamax(ctx, &child, ply + 1, draft - 1 - r, -beta, -beta + 1, false, grandparent_move);
        ctx.pop_branch();
        if ctx.budget.should_stop() {
            return eval;
        }
        if score >= beta {
            return score;
        }
    }

    let root_best = if ply == 0 { ctx.root_best } else { None };
    let ordered = order_moves(pos, moves, tt_move, root_best, ctx.killers, ctx.counters, ctx.follow_ups, grandparent_move, ply);

    let mut best_score = MINUS_INFINITY;
    let mut best_move: Option<Move> = None;
    let mut best_move_is_quiet = false;
    let mut bound = BoundType::UpperBound;
    let child_pv_index = ctx.pv.index_for_ply(ply + 1);
    let mut first = true;

    for (i, (mv, category, is_quiet)) in ordered.into_iter().enumerate() {
        if ctx.budget.should_stop() {
            break;
        }

        let child = make_move(pos, ctx.net, mv);
        ctx.push_branch(child.zobrist);

        let reduction = lmr_reduction(category, mv, i, draft, is_pv);
        let reduced_draft = draft - 1 - reduction;

        let mut score = if first {
            -negamax(ctx, &child, ply + 1, reduced_draft, -beta, -alpha, is_pv, Some(mv))
        } else {
            -negamax(ctx, &child, ply + 1, reduced_draft, -(alpha + 1), -alpha, false, Some(mv))
        };

        if !first {
            if score > alpha && reduction > 0 {
                score = -negamax(ctx, &child, ply + 1, draft - 1, -(alpha + 1), -alpha, false, Some(mv));
            }
            if score > alpha && score < beta {
                score = -negamax(ctx, &child, ply + 1, draft - 1, -beta, -alpha, true, Some(mv));
            }
        }

        ctx.pop_branch();
        first = false;

        if ctx.budget.should_stop() {
            break;
        }

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
            best_move_is_quiet = is_quiet;
        }

        if score > alpha {
            alpha = score;
            bound = BoundType::Exact;
            ctx.pv.update(ply, mv, child_pv_index);

            if score >= beta {
                ctx.tt.store(pos.zobrist, draft.max(0) as u32, to_tt(score, ply as Ply), BoundType::LowerBound, Some(mv), is_quiet);
                if is_quiet {
                    ctx.killers.record(ply, mv);
                    ctx.counters.record(mover_kind(pos, mv), mv.to.index() as u8, mv);
                    if let Some(gp) = grandparent_move {
                        ctx.follow_ups.record(gp, mv);
                    }
                }
                return score;
            }
        }
    }

    let stored_move = best_move.or(tt_move);
    let stored_is_quiet = if best_move.is_some() { best_move_is_quiet } else { false };
    ctx.tt.store(pos.zobrist, draft.max(0) as u32, to_tt(best_score, ply as Ply), bound, stored_move, stored_is_quiet);
    best_score
}

/// Stand-pat quiescence search over "good captures" only (`spec.md`
/// §4.12's Quiescence subsection): no quiet moves, no underpromotions,
/// no check-escaping extension.
fn quiescence(ctx: &mut SearchContext, pos: &Position, ply: usize, mut alpha: Score, beta: Score) -> Score {
    if ctx.budget.count_node() {
        return pos.evaluate(ctx.net);
    }

    let stand_pat = pos.evaluate(ctx.net);
    if stand_pat >= beta {
        return stand_pat;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }
    if ply >= MAX_PLY {
        return stand_pat;
    }

    let mut best = stand_pat;
    for mv in generate_moves(pos, ctx.net) {
        if ctx.budget.should_stop() {
            break;
        }
        let kind = mover_kind(pos, mv);
        let (category, _) = classify(pos, mv, kind, None, None, ctx.killers, ctx.counters, ctx.follow_ups, None, ply);
        if category != Category::GoodCapture {
            continue;
        }

        let child = make_move(pos, ctx.net, mv);
        ctx.push_branch(child.zobrist);
        let score = -quiescence(ctx, &child, ply + 1, -beta, -alpha);
        ctx.pop_branch();

        if score > best {
            best = score;
            if score > alpha {
                alpha = score;
            }
        }
        if score >= beta {
            return score;
        }
    }
    best
}
