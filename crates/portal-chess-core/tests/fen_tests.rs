use portal_chess_core::{
    encode_fen, parse_fen, Color, PieceKind, Square, STARTING_POSITION,
};

fn sq(label: &str) -> Square {
    Square::parse(label).unwrap()
}

#[test]
fn starting_position_round_trips() {
    let parsed = parse_fen(STARTING_POSITION).unwrap();
    assert_eq!(parsed.turn, Color::White);
    assert_eq!(parsed.fullmove_number, 1);
    assert_eq!(parsed.halfmove_clock, 0);
    assert!(parsed.castle_rights.white_king_side);
    assert!(parsed.castle_rights.black_queen_side);
    assert_eq!(encode_fen(&parsed), STARTING_POSITION);
}

#[test]
fn has_moved_is_inferred_from_initial_squares() {
    let parsed = parse_fen("7k/8/8/8/4N3/8/8/4K3 w - - 0 1").unwrap();
    let knight = parsed.board.get(sq("E4")).unwrap();
    assert!(knight.has_moved);
    let king = parsed.board.get(sq("E1")).unwrap();
    assert!(!king.has_moved);
    let displaced_king = parsed.board.get(sq("H8")).unwrap();
    assert_eq!(displaced_king.kind, PieceKind::King);
    assert!(displaced_king.has_moved);
}

#[test]
fn en_passant_field_is_parsed() {
    let parsed =
        parse_fen("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1").unwrap();
    assert_eq!(parsed.en_passant_target, Some(sq("E3")));
}

#[test]
fn malformed_fens_are_rejected() {
    assert!(parse_fen("").is_err());
    assert!(parse_fen("8/8/8/8/8/8/8 w - - 0 1").is_err());
    assert!(parse_fen("9/8/8/8/8/8/8/8 w - - 0 1").is_err());
    assert!(parse_fen("8/8/8/8/8/8/8/8 x - - 0 1").is_err());
    assert!(parse_fen("8/8/8/8/8/8/8/8 w - - zero 1").is_err());
    assert!(parse_fen("xnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1").is_err());
}
