use portal_chess_core::{
    all_legal_moves, expand, generate_base_moves, is_square_attacked, legal_moves_from,
    CastleSide, Color, MoveKind, PortalConfig, Position, PromoPiece, Square,
};

fn sq(label: &str) -> Square {
    Square::parse(label).unwrap()
}

fn position(fen: &str) -> Position {
    Position::from_fen(fen, PortalConfig::reference()).expect("valid fen")
}

#[test]
fn pawn_two_step_from_initial_state() {
    let position = Position::new();
    let bases = generate_base_moves(&position, sq("E2"));

    assert!(bases
        .iter()
        .any(|base| base.to == sq("E3") && base.kind == MoveKind::Move));
    assert!(bases
        .iter()
        .any(|base| base.to == sq("E4") && base.kind == MoveKind::Move));

    // E4 is a black-exclusive portal square, unusable by the white mover.
    let two_step = bases.iter().find(|base| base.to == sq("E4")).unwrap();
    let outcomes = expand(&position, two_step);
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].to_final, sq("E4"));
    assert!(outcomes[0].via_portal.is_none());

    let next = position.apply(&outcomes[0]).unwrap();
    assert_eq!(next.turn, Color::Black);
    assert_eq!(position.turn, Color::White);
}

#[test]
fn generator_is_empty_for_wrong_side_and_empty_squares() {
    let position = Position::new();
    assert!(generate_base_moves(&position, sq("E7")).is_empty());
    assert!(generate_base_moves(&position, sq("E5")).is_empty());
}

#[test]
fn generator_is_pure_and_deterministic() {
    let position = Position::new();
    let snapshot = position.clone();
    let first = generate_base_moves(&position, sq("B1"));
    let second = generate_base_moves(&position, sq("B1"));
    assert_eq!(first, second);
    assert_eq!(position, snapshot);
}

#[test]
fn knight_moves_from_initial_state() {
    let position = Position::new();
    let bases = generate_base_moves(&position, sq("B1"));
    let targets: Vec<Square> = bases.iter().map(|base| base.to).collect();
    assert_eq!(targets.len(), 2);
    assert!(targets.contains(&sq("A3")));
    assert!(targets.contains(&sq("C3")));
}

#[test]
fn sliders_stop_at_first_blocker_and_capture_enemies() {
    let position = position("7k/8/8/3p4/8/8/8/K2Q4 w - - 0 1");
    let bases = generate_base_moves(&position, sq("D1"));

    let up_file: Vec<_> = bases.iter().filter(|base| base.to.file == 3).collect();
    assert!(up_file
        .iter()
        .any(|base| base.to == sq("D5") && base.kind == MoveKind::Capture));
    assert!(up_file.iter().all(|base| base.to.rank <= sq("D5").rank));
}

#[test]
fn promotion_produces_four_base_moves() {
    let position = position("7k/3P4/8/8/8/8/8/K7 w - - 0 1");
    let bases = generate_base_moves(&position, sq("D7"));
    let promos: Vec<_> = bases
        .iter()
        .filter(|base| base.kind == MoveKind::Promotion)
        .collect();
    assert_eq!(promos.len(), 4);
    for promo in PromoPiece::ALL {
        assert!(promos.iter().any(|base| base.promotion == Some(promo)));
    }
}

#[test]
fn castling_generated_when_conditions_hold() {
    let position = position("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let bases = generate_base_moves(&position, sq("E1"));

    let kingside = bases
        .iter()
        .find(|base| base.kind == MoveKind::Castle && base.castle == Some(CastleSide::King));
    let queenside = bases
        .iter()
        .find(|base| base.kind == MoveKind::Castle && base.castle == Some(CastleSide::Queen));
    assert_eq!(kingside.map(|base| base.to), Some(sq("G1")));
    assert_eq!(queenside.map(|base| base.to), Some(sq("C1")));
}

#[test]
fn castling_blocked_by_attacked_path() {
    // Black rook on F8 covers F1: the pass-through square is attacked.
    let position = position("5r1k/8/8/8/8/8/8/4K2R w K - 0 1");
    assert!(is_square_attacked(&position, sq("F1"), Color::Black));
    let bases = generate_base_moves(&position, sq("E1"));
    assert!(bases.iter().all(|base| base.kind != MoveKind::Castle));
}

#[test]
fn castling_blocked_while_in_check() {
    let position = position("4r2k/8/8/8/8/8/8/4K2R w K - 0 1");
    let bases = generate_base_moves(&position, sq("E1"));
    assert!(bases.iter().all(|base| base.kind != MoveKind::Castle));
}

#[test]
fn castling_requires_empty_intermediate_squares() {
    let position = position("7k/8/8/8/8/8/8/RN2K2R w KQ - 0 1");
    let bases = generate_base_moves(&position, sq("E1"));
    assert!(bases
        .iter()
        .all(|base| base.castle != Some(CastleSide::Queen)));
    assert!(bases
        .iter()
        .any(|base| base.castle == Some(CastleSide::King)));
}

#[test]
fn castling_rights_gate_generation() {
    let position = position("7k/8/8/8/8/8/8/R3K2R w Q - 0 1");
    let bases = generate_base_moves(&position, sq("E1"));
    assert!(bases.iter().all(|base| base.castle != Some(CastleSide::King)));
    assert!(bases
        .iter()
        .any(|base| base.castle == Some(CastleSide::Queen)));
}

#[test]
fn attack_oracle_sees_portal_activation_reach() {
    // A black knight standing on D6 (black-exclusive portal) reaches C4, E4
    // and G6 by activation.
    let position = position("7k/8/3n4/8/8/8/8/K7 b - - 0 1");
    assert!(is_square_attacked(&position, sq("C4"), Color::Black));
    assert!(is_square_attacked(&position, sq("E4"), Color::Black));
    assert!(is_square_attacked(&position, sq("G6"), Color::Black));
}

#[test]
fn attack_oracle_sees_one_move_portal_reach() {
    // A black rook on D8 can quietly reach the empty D6 portal and teleport
    // onward to C4, E4 or G6.
    let position = position("3r3k/8/8/8/8/8/8/K7 b - - 0 1");
    assert!(is_square_attacked(&position, sq("E4"), Color::Black));
    assert!(is_square_attacked(&position, sq("C4"), Color::Black));
}

#[test]
fn attack_oracle_ignores_king_portal_reach() {
    // Kings are excluded from the portal scan: a black king on D6 does not
    // project attacks through the network.
    let position = position("8/8/3k4/8/8/8/8/K7 b - - 0 1");
    assert!(!is_square_attacked(&position, sq("C4"), Color::Black));
    assert!(is_square_attacked(&position, sq("D5"), Color::Black));
}

#[test]
fn check_filter_removes_self_check_moves() {
    // White king on E1 pinned rook on E2 against a black rook on E8.
    let position = position("4r2k/8/8/8/8/8/4R3/4K3 w - - 0 1");
    let legal = legal_moves_from(&position, sq("E2"));
    assert!(!legal.is_empty());
    assert!(legal.iter().all(|mv| mv.to_final.file == 4));
}

#[test]
fn all_legal_moves_from_initial_state() {
    let position = Position::new();
    let legal = all_legal_moves(&position);
    // 20 classical openers. Landings on usable portals branch further:
    // B2-B3 and E2-E3 each add three exclusive teleports, G2-G4 adds the
    // neutral teleport to B5.
    assert_eq!(legal.len(), 27);
}
