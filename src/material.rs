//! Insufficient-mating-material draw rule (`spec.md` §4.14).

use crate::position::Position;
use crate::types::{PieceKind, Side};

#[derive(Default, Clone, Copy)]
struct Material {
    knights: u32,
    bishops: u32,
    minors: u32,
}

fn count(pos: &Position, s: Side) -> Option<Material> {
    let mut m = Material::default();
    for (_, kind, _) in pos.side(s).iter_pieces() {
        match kind {
            PieceKind::Queen | PieceKind::Rook | PieceKind::Pawn => return None,
            PieceKind::Knight => {
                m.knights += 1;
                m.minors += 1;
            }
            PieceKind::Bishop => {
                m.bishops += 1;
                m.minors += 1;
            }
            PieceKind::King => {}
        }
    }
    Some(m)
}

/// Whether `pos` is drawn by lack of mating material: neither side has
/// a queen, rook or pawn, and the remaining minor pieces can't force
/// mate (at most a lone minor, two knights vs. nothing, or up to two
/// bishops against a single minor).
pub fn is_insufficient_material(pos: &Position) -> bool {
    let (Some(my), Some(op)) = (count(pos, Side::My), count(pos, Side::Op)) else {
        return false;
    };

    let (few, many) = if my.minors <= op.minors { (my, op) } else { (op, my) };

    if many.minors <= 1 {
        return true;
    }
    if few.minors == 0 && many.knights == 2 && many.bishops == 0 {
        return true;
    }
    if few.minors == 1 && many.minors == 2 && many.bishops == 2 {
        return true;
    }
    if few.minors == 1 && many.minors == 1 && many.bishops == 1 && few.bishops <= 1 {
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nnue::network::{Network, HIDDEN, INPUTS};
    use crate::types::{Color, File, Rank, Square};

    fn test_network() -> Network {
        Network {
            input_weights: Box::new([[0i16; HIDDEN]; INPUTS]),
            input_bias: [0i16; HIDDEN],
            output_weights: [0i16; HIDDEN * 2],
            output_bias: 0,
        }
    }

    fn bare_kings(net: &Network) -> Position {
        let mut pos = Position::empty(Color::White, net);
        pos.place_for_test(Side::My, PieceKind::King, Square::of(File::new(0), Rank::new(0)), net);
        pos.place_for_test(Side::Op, PieceKind::King, Square::of(File::new(7), Rank::new(7)), net);
        pos
    }

    #[test]
    fn lone_kings_are_a_material_draw() {
        let net = test_network();
        assert!(is_insufficient_material(&bare_kings(&net)));
    }

    #[test]
    fn king_and_pawn_is_not_a_material_draw() {
        let net = test_network();
        let mut pos = bare_kings(&net);
        pos.place_for_test(Side::My, PieceKind::Pawn, Square::of(File::new(3), Rank::new(3)), &net);
        assert!(!is_insufficient_material(&pos));
    }

    #[test]
    fn king_and_bishop_vs_king_and_bishop_is_a_draw() {
        let net = test_network();
        let mut pos = bare_kings(&net);
        pos.place_for_test(Side::My, PieceKind::Bishop, Square::of(File::new(2), Rank::new(2)), &net);
        pos.place_for_test(Side::Op, PieceKind::Bishop, Square::of(File::new(5), Rank::new(5)), &net);
        assert!(is_insufficient_material(&pos));
    }

    #[test]
    fn two_bishops_vs_lone_king_is_not_a_draw() {
        let net = test_network();
        let mut pos = bare_kings(&net);
        pos.place_for_test(Side::My, PieceKind::Bishop, Square::of(File::new(2), Rank::new(2)), &net);
        pos.place_for_test(Side::My, PieceKind::Bishop, Square::of(File::new(5), Rank::new(2)), &net);
        assert!(!is_insufficient_material(&pos));
    }
}
