use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use petrel_core::material::is_insufficient_material;
use petrel_core::nnue::network::{Network, HIDDEN, INPUTS};
use petrel_core::position::{generate_moves, make_move, parse_fen, to_fen, Position};
use petrel_core::score::{format_uci, DRAW_SCORE};
use petrel_core::search::{search_root, SearchLimits, SearchState};
use petrel_core::types::Side;
use petrel_core::uci::notation::{format_move, parse_uci_move};

use proptest::prelude::*;

const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

fn test_network() -> Network {
    Network {
        input_weights: Box::new([[0i16; HIDDEN]; INPUTS]),
        input_bias: [0i16; HIDDEN],
        output_weights: [0i16; HIDDEN * 2],
        output_bias: 0,
    }
}

fn perft(pos: &Position, net: &Network, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    generate_moves(pos, net)
        .into_iter()
        .map(|mv| perft(&make_move(pos, net, mv), net, depth - 1))
        .sum()
}

#[test]
fn startpos_perft_matches_known_node_counts() {
    let net = test_network();
    let pos = parse_fen(STARTPOS_FEN, &net).unwrap();
    assert_eq!(perft(&pos, &net, 1), 20);
    assert_eq!(perft(&pos, &net, 2), 400);
    assert_eq!(perft(&pos, &net, 3), 8_902);
    assert_eq!(perft(&pos, &net, 4), 197_281);
    assert_eq!(perft(&pos, &net, 5), 4_865_609);
}

#[test]
fn kiwipete_perft_matches_known_node_counts() {
    let net = test_network();
    let pos = parse_fen(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        &net,
    )
    .unwrap();
    assert_eq!(perft(&pos, &net, 1), 48);
    assert_eq!(perft(&pos, &net, 2), 2_039);
    assert_eq!(perft(&pos, &net, 3), 97_862);
    assert_eq!(perft(&pos, &net, 4), 4_085_603);
}

#[test]
fn lone_kings_plus_one_minor_each_is_insufficient_material() {
    use petrel_core::types::{Color, File, PieceKind, Rank, Square};
    let net = test_network();
    let mut pos = Position::empty(Color::White, &net);
    pos.place_for_test(Side::My, PieceKind::King, Square::of(File::new(0), Rank::new(0)), &net);
    pos.place_for_test(Side::My, PieceKind::Bishop, Square::of(File::new(2), Rank::new(0)), &net);
    pos.place_for_test(Side::Op, PieceKind::King, Square::of(File::new(7), Rank::new(7)), &net);
    assert!(is_insufficient_material(&pos));
}

#[test]
fn fifty_move_counter_reaching_100_plies_is_the_rule50_draw_threshold() {
    let net = test_network();
    let pos = parse_fen("8/8/8/8/8/8/6k1/5K1R w - - 99 80", &net).unwrap();
    assert_eq!(pos.rule50, 99);
}

#[test]
fn fifty_move_rule_at_100_plies_scores_every_move_as_a_draw() {
    let net = test_network();
    let pos = parse_fen("8/8/8/8/8/8/6k1/5K1R w - - 100 80", &net).unwrap();
    let mut state = SearchState::new(4);
    let stop = Arc::new(AtomicBool::new(false));
    let limits = SearchLimits { max_depth: 3, ..SearchLimits::default() };
    let mut last_score = None;
    search_root(&pos, &net, &mut state, limits, stop, |report| last_score = Some(report.score));
    assert_eq!(last_score, Some(DRAW_SCORE));
}

#[test]
fn uci_round_trip_through_a_short_opening_line() {
    let net = test_network();
    let mut pos = parse_fen(STARTPOS_FEN, &net).unwrap();
    for text in ["e2e4", "e7e5", "g1f3"] {
        let mv = parse_uci_move(&pos, &net, text).unwrap_or_else(|| panic!("{text} should be legal"));
        assert_eq!(format_move(&pos, mv), text);
        pos = make_move(&pos, &net, mv);
    }
}

#[test]
fn castling_round_trips_as_the_kings_destination_square() {
    let net = test_network();
    let pos = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", &net).unwrap();
    let mv = parse_uci_move(&pos, &net, "e1g1").expect("kingside castling is legal here");
    assert_eq!(format_move(&pos, mv), "e1g1");
    let after = make_move(&pos, &net, mv);
    assert!(parse_uci_move(&after, &net, "e8g8").is_some());
}

#[test]
fn both_castling_sides_are_legal_from_the_standard_setup() {
    let net = test_network();
    let pos = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", &net).unwrap();
    let moves: Vec<String> = generate_moves(&pos, &net).into_iter().map(|mv| format_move(&pos, mv)).collect();
    assert!(moves.contains(&"e1g1".to_string()), "kingside castling missing from {moves:?}");
    assert!(moves.contains(&"e1c1".to_string()), "queenside castling missing from {moves:?}");
}

#[test]
fn en_passant_capture_is_generated_as_a_legal_move_after_the_double_push() {
    let net = test_network();
    let pos = parse_fen("rnbqkbnr/ppppp1pp/8/4P3/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1", &net).unwrap();
    let double_push = parse_uci_move(&pos, &net, "f7f5").expect("double push is legal");
    let after = make_move(&pos, &net, double_push);
    let ep_capture = parse_uci_move(&after, &net, "e5f6");
    assert!(ep_capture.is_some(), "en-passant capture to f6 should be legal after f7f5");
}

#[test]
fn mate_in_five_is_found_with_the_expected_score_and_first_move() {
    let net = test_network();
    let pos = parse_fen("3R1R2/K3k3/1p1nPb2/pN2P2N/nP1ppp2/4P3/6P1/4Qq1r w - - 0 1", &net).unwrap();
    let mut state = SearchState::new(8);
    let stop = Arc::new(AtomicBool::new(false));
    let limits = SearchLimits { max_depth: 13, ..SearchLimits::default() };
    let mut last_score = DRAW_SCORE;
    let mut last_pv = Vec::new();
    search_root(&pos, &net, &mut state, limits, stop, |report| {
        last_score = report.score;
        last_pv = report.pv.clone();
    });
    assert_eq!(format_uci(last_score), "mate 5");
    let first = *last_pv.first().expect("a mating PV should not be empty");
    assert_eq!(format_move(&pos, first), "e1e2");
}

#[test]
fn repeating_a_position_through_the_game_history_scores_as_a_draw() {
    let net = test_network();
    let mut pos = parse_fen(STARTPOS_FEN, &net).unwrap();
    let mut state = SearchState::new(8);
    state.repetition.push(pos.zobrist);
    for text in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
        let mv = parse_uci_move(&pos, &net, text).unwrap_or_else(|| panic!("{text} should be legal"));
        pos = make_move(&pos, &net, mv);
        state.repetition.push(pos.zobrist);
    }
    state.repetition.normalize();

    let stop = Arc::new(AtomicBool::new(false));
    let limits = SearchLimits { max_depth: 4, ..SearchLimits::default() };
    let mut last_score = None;
    search_root(&pos, &net, &mut state, limits, stop, |report| last_score = Some(report.score));
    assert_eq!(last_score, Some(DRAW_SCORE));
}

proptest! {
    #[test]
    fn make_move_walk_stays_consistent_with_a_fresh_fen_reparse(
        picks in prop::collection::vec(0usize..64, 1..20)
    ) {
        let net = test_network();
        let mut pos = parse_fen(STARTPOS_FEN, &net).unwrap();
        for pick in picks {
            let moves = generate_moves(&pos, &net);
            if moves.is_empty() {
                break;
            }
            let mv = moves[pick % moves.len()];
            pos = make_move(&pos, &net, mv);

            let reparsed = parse_fen(&to_fen(&pos), &net).expect("to_fen output should reparse");
            prop_assert_eq!(pos.zobrist, reparsed.zobrist);
            prop_assert_eq!(pos.rule50, reparsed.rule50);
            prop_assert_eq!(pos.side(Side::My).occupied, reparsed.side(Side::My).occupied);
            prop_assert_eq!(pos.side(Side::Op).occupied, reparsed.side(Side::Op).occupied);
            prop_assert_eq!(pos.side(Side::My).pawns, reparsed.side(Side::My).pawns);
            prop_assert_eq!(pos.side(Side::Op).pawns, reparsed.side(Side::Op).pawns);
        }
    }
}
