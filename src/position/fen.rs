//! FEN parsing (`spec.md` §6.3).
//!
//! The board placement field is absolute (White's home rank is "1",
//! Black's is "8"); converting a piece onto its owning side's own view
//! means: Black pieces keep their absolute square (Black is the
//! identity orientation), White pieces get [`Square::flip`]ped. This
//! falls out of the Hyperbola Quintessence pawn-direction invariant:
//! own-view pawns always advance toward increasing rank, and that is
//! already true for Black's absolute numbering.

use crate::error::PositionError;
use crate::nnue::network::Network;
use crate::types::{Color, PieceKind, PieceTraits, Side, Square};

use super::position::Position;

/// Absolute square index: row 0 is rank 8, row 7 is rank 1, matching
/// how FEN lists ranks top (8) to bottom (1).
fn absolute_index(file: u8, rank_label: u8) -> u8 {
    (8 - rank_label) * 8 + file
}

fn own_view_of(color: Color, abs_idx: u8) -> Square {
    match color {
        Color::Black => Square::new(abs_idx),
        Color::White => Square::new(abs_idx).flip(),
    }
}

fn parse_square(text: &str) -> Result<(u8, u8), PositionError> {
    let mut chars = text.chars();
    let file_ch = chars.next().ok_or_else(|| PositionError::Fen(format!("empty square {text}")))?;
    let rank_ch = chars.next().ok_or_else(|| PositionError::Fen(format!("truncated square {text}")))?;
    if chars.next().is_some() {
        return Err(PositionError::Fen(format!("square too long: {text}")));
    }
    if !('a'..='h').contains(&file_ch) || !('1'..='8').contains(&rank_ch) {
        return Err(PositionError::Fen(format!("bad square: {text}")));
    }
    Ok((file_ch as u8 - b'a', rank_ch as u8 - b'1' + 1))
}

fn piece_kind_from_char(c: char) -> Option<PieceKind> {
    match c.to_ascii_lowercase() {
        'q' => Some(PieceKind::Queen),
        'r' => Some(PieceKind::Rook),
        'b' => Some(PieceKind::Bishop),
        'n' => Some(PieceKind::Knight),
        'p' => Some(PieceKind::Pawn),
        'k' => Some(PieceKind::King),
        _ => None,
    }
}

/// Parse a full FEN record into a [`Position`].
pub fn parse_fen(fen: &str, net: &Network) -> Result<Position, PositionError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() < 4 {
        return Err(PositionError::Fen("expected at least 4 fields".to_string()));
    }
    let placement = fields[0];
    let stm = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(PositionError::Fen(format!("bad side to move: {other}"))),
    };
    let castling_field = fields[2];
    let ep_field = fields[3];
    let halfmove = fields.get(4).and_then(|s| s.parse::<u32>().ok()).unwrap_or(0);

    let mut pos = Position::empty(stm, net);
    let mut king_count = [0u8; 2];

    let mut rank_label = 8i32;
    let mut file = 0u8;
    for row in placement.split('/') {
        if rank_label < 1 {
            return Err(PositionError::Fen("too many ranks".to_string()));
        }
        file = 0;
        for c in row.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                continue;
            }
            if file >= 8 {
                return Err(PositionError::Fen("too many files in a rank".to_string()));
            }
            let kind = piece_kind_from_char(c).ok_or_else(|| PositionError::Fen(format!("bad piece char {c}")))?;
            let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
            if kind == PieceKind::Pawn && (rank_label == 8 || rank_label == 1) {
                return Err(PositionError::Fen("pawn on back rank".to_string()));
            }
            let abs_idx = absolute_index(file, rank_label as u8);
            let owner = if color == stm { Side::My } else { Side::Op };
            let own_sq = own_view_of(color, abs_idx);
            if kind == PieceKind::King {
                king_count[owner.index()] += 1;
                if king_count[owner.index()] > 1 {
                    return Err(PositionError::Fen("more than one king for a side".to_string()));
                }
            }
            pos.place_piece(net, owner, kind, own_sq);
            file += 1;
        }
        if file != 8 {
            return Err(PositionError::Fen("rank does not sum to 8 files".to_string()));
        }
        rank_label -= 1;
    }
    if rank_label != 0 {
        return Err(PositionError::Fen("expected 8 ranks".to_string()));
    }
    if king_count[Side::My.index()] != 1 || king_count[Side::Op.index()] != 1 {
        return Err(PositionError::Fen("each side needs exactly one king".to_string()));
    }

    if castling_field != "-" {
        for c in castling_field.chars() {
            apply_castling_right(&mut pos, net, stm, c)?;
        }
    }

    if ep_field != "-" {
        apply_en_passant_right(&mut pos, stm, ep_field)?;
    }

    pos.rule50 = halfmove.min(u8::MAX as u32) as u8;
    pos.recompute_attacks();
    Ok(pos)
}

fn apply_castling_right(pos: &mut Position, net: &Network, stm: Color, c: char) -> Result<(), PositionError> {
    let color = if c.is_ascii_uppercase() { Color::White } else { Color::Black };
    let owner = if color == stm { Side::My } else { Side::Op };
    let home_rank_label: u8 = if color == Color::White { 1 } else { 8 };
    let rook_file = match c.to_ascii_uppercase() {
        'K' => 7,
        'Q' => 0,
        letter @ 'A'..='H' => letter as u8 - b'A',
        _ => return Err(PositionError::Fen(format!("bad castling letter {c}"))),
    };
    let abs_idx = absolute_index(rook_file, home_rank_label);
    let own_sq = own_view_of(color, abs_idx);
    let pi = pos
        .side(owner)
        .piece_at(own_sq)
        .ok_or_else(|| PositionError::Fen(format!("no rook for castling right {c}")))?;
    if pos.side(owner).kind[pi as usize] != Some(PieceKind::Rook) {
        return Err(PositionError::Fen(format!("castling right {c} does not point at a rook")));
    }
    pos.side_mut(owner).traits[pi as usize].set(PieceTraits::CASTLING);
    pos.zobrist ^= crate::zobrist::ZOBRIST.castling_key(own_sq);
    Ok(())
}

fn apply_en_passant_right(pos: &mut Position, stm: Color, ep_field: &str) -> Result<(), PositionError> {
    let (ep_file, ep_rank_label) = parse_square(ep_field)?;
    let mover_color = !stm;
    let pawn_rank_label = match mover_color {
        Color::White => ep_rank_label + 1,
        Color::Black => ep_rank_label - 1,
    };
    let abs_idx = absolute_index(ep_file, pawn_rank_label);
    let own_sq = own_view_of(mover_color, abs_idx);
    let owner = Side::Op;
    let pi = pos
        .side(owner)
        .piece_at(own_sq)
        .ok_or_else(|| PositionError::Fen("en-passant target has no pawn behind it".to_string()))?;
    if pos.side(owner).kind[pi as usize] != Some(PieceKind::Pawn) {
        return Err(PositionError::Fen("en-passant target does not point at a pawn".to_string()));
    }
    pos.side_mut(owner).traits[pi as usize].set(PieceTraits::EN_PASSANT);
    pos.zobrist ^= crate::zobrist::ZOBRIST.en_passant_key(own_sq);
    Ok(())
}

/// Render the side to move's position back to FEN. Only used by tests
/// and `debug`/`position` style commands; the engine never round-trips
/// through text during search.
pub fn to_fen(pos: &Position) -> String {
    let mut rows = Vec::with_capacity(8);
    for rank_label in (1..=8u8).rev() {
        let mut row = String::new();
        let mut empty_run = 0u8;
        for file in 0..8u8 {
            let abs_idx = absolute_index(file, rank_label);
            let mut found = None;
            for color in [Color::White, Color::Black] {
                let owner = if color == pos.side_to_move() { Side::My } else { Side::Op };
                let own_sq = own_view_of(color, abs_idx);
                if let Some(pi) = pos.side(owner).piece_at(own_sq) {
                    let kind = pos.side(owner).kind[pi as usize].unwrap();
                    found = Some((color, kind));
                    break;
                }
            }
            match found {
                Some((color, kind)) => {
                    if empty_run > 0 {
                        row.push((b'0' + empty_run) as char);
                        empty_run = 0;
                    }
                    let ch = piece_char(kind);
                    row.push(if color == Color::White { ch.to_ascii_uppercase() } else { ch });
                }
                None => empty_run += 1,
            }
        }
        if empty_run > 0 {
            row.push((b'0' + empty_run) as char);
        }
        rows.push(row);
    }
    let placement = rows.join("/");
    let stm_field = if pos.side_to_move() == Color::White { "w" } else { "b" };
    format!("{placement} {stm_field} - - {} {}", pos.rule50, pos.ply_from_root / 2 + 1)
}

fn piece_char(kind: PieceKind) -> char {
    match kind {
        PieceKind::Queen => 'q',
        PieceKind::Rook => 'r',
        PieceKind::Bishop => 'b',
        PieceKind::Knight => 'n',
        PieceKind::Pawn => 'p',
        PieceKind::King => 'k',
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_network() -> Network {
        Network {
            input_weights: Box::new([[0i16; crate::nnue::network::HIDDEN]; crate::nnue::network::INPUTS]),
            input_bias: [0i16; crate::nnue::network::HIDDEN],
            output_weights: [0i16; crate::nnue::network::HIDDEN * 2],
            output_bias: 0,
        }
    }

    #[test]
    fn startpos_has_sixteen_pieces_per_side() {
        let net = test_network();
        let pos = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &net).unwrap();
        assert_eq!(pos.side(Side::My).iter_pieces().count(), 16);
        assert_eq!(pos.side(Side::Op).iter_pieces().count(), 16);
    }

    #[test]
    fn white_king_own_view_is_e1_flipped() {
        let net = test_network();
        let pos = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", &net).unwrap();
        let king_sq = pos.side(Side::My).king_square();
        assert_eq!(king_sq.rank().0, 0);
    }

    #[test]
    fn black_to_move_king_rank_is_still_zero_in_own_view() {
        let net = test_network();
        let pos = parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1", &net).unwrap();
        let king_sq = pos.side(Side::My).king_square();
        assert_eq!(king_sq.rank().0, 0);
    }

    #[test]
    fn rejects_truncated_fen() {
        let net = test_network();
        assert!(parse_fen("8/8/8/8/8/8/8/8", &net).is_err());
    }
}
