use crate::position::Position;
use crate::types::{
    BaseMove, BaseMoves, CastleSide, Color, MoveKind, MoveList, NetworkKind, Outcomes, Piece,
    PieceKind, PortalChoice, PortalTransit, PromoPiece, ResolvedMove, Square,
};

pub const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
pub const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
pub const KING_DIRS: [(i8, i8); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];
pub const KNIGHT_JUMPS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

/// Pseudo-legal base moves for the piece on `from`. Empty unless that piece
/// is owned by the side to move.
pub fn generate_base_moves(position: &Position, from: Square) -> BaseMoves {
    let Some(piece) = position.board.get(from) else {
        return BaseMoves::new();
    };
    if piece.color != position.turn {
        return BaseMoves::new();
    }
    base_moves_for(position, from, piece, true)
}

fn base_moves_for(
    position: &Position,
    from: Square,
    piece: Piece,
    with_castling: bool,
) -> BaseMoves {
    let mut out = BaseMoves::new();
    match piece.kind {
        PieceKind::Pawn => pawn_moves(position, from, piece, &mut out),
        PieceKind::Knight => step_moves(position, from, piece, &KNIGHT_JUMPS, &mut out),
        PieceKind::Bishop => slide_moves(position, from, piece, &BISHOP_DIRS, &mut out),
        PieceKind::Rook => slide_moves(position, from, piece, &ROOK_DIRS, &mut out),
        PieceKind::Queen => {
            slide_moves(position, from, piece, &ROOK_DIRS, &mut out);
            slide_moves(position, from, piece, &BISHOP_DIRS, &mut out);
        }
        PieceKind::King => {
            step_moves(position, from, piece, &KING_DIRS, &mut out);
            if with_castling {
                castle_moves(position, from, piece, &mut out);
            }
        }
    }
    portal_activation_moves(position, from, piece, &mut out);
    out
}

fn pawn_moves(position: &Position, from: Square, piece: Piece, out: &mut BaseMoves) {
    let dir: i8 = if piece.color == Color::White { 1 } else { -1 };
    let start_rank = if piece.color == Color::White { 1 } else { 6 };
    let last_rank = if piece.color == Color::White { 7 } else { 0 };

    if let Some(one) = from.offset(0, dir) {
        if position.board.is_empty(one) {
            push_pawn_advance(from, one, last_rank, MoveKind::Move, out);
            if from.rank == start_rank {
                if let Some(two) = from.offset(0, 2 * dir) {
                    if position.board.is_empty(two) {
                        let _ = out.try_push(BaseMove::new(from, two, MoveKind::Move));
                    }
                }
            }
        }
    }

    for file_delta in [-1, 1] {
        let Some(diag) = from.offset(file_delta, dir) else {
            continue;
        };
        if let Some(target) = position.board.get(diag) {
            if target.color != piece.color {
                push_pawn_advance(from, diag, last_rank, MoveKind::Capture, out);
            }
        }
    }
}

fn push_pawn_advance(
    from: Square,
    to: Square,
    last_rank: u8,
    kind: MoveKind,
    out: &mut BaseMoves,
) {
    if to.rank == last_rank {
        for promo in PromoPiece::ALL {
            let _ = out.try_push(BaseMove::promotion(from, to, promo));
        }
    } else {
        let _ = out.try_push(BaseMove::new(from, to, kind));
    }
}

fn step_moves(
    position: &Position,
    from: Square,
    piece: Piece,
    deltas: &[(i8, i8)],
    out: &mut BaseMoves,
) {
    for &(file_delta, rank_delta) in deltas {
        let Some(to) = from.offset(file_delta, rank_delta) else {
            continue;
        };
        match position.board.get(to) {
            None => {
                let _ = out.try_push(BaseMove::new(from, to, MoveKind::Move));
            }
            Some(target) if target.color != piece.color => {
                let _ = out.try_push(BaseMove::new(from, to, MoveKind::Capture));
            }
            Some(_) => {}
        }
    }
}

fn slide_moves(
    position: &Position,
    from: Square,
    piece: Piece,
    dirs: &[(i8, i8)],
    out: &mut BaseMoves,
) {
    for &(file_delta, rank_delta) in dirs {
        let mut cursor = from;
        while let Some(to) = cursor.offset(file_delta, rank_delta) {
            match position.board.get(to) {
                None => {
                    let _ = out.try_push(BaseMove::new(from, to, MoveKind::Move));
                    cursor = to;
                }
                Some(target) => {
                    if target.color != piece.color {
                        let _ = out.try_push(BaseMove::new(from, to, MoveKind::Capture));
                    }
                    break;
                }
            }
        }
    }
}

fn castle_moves(position: &Position, from: Square, king: Piece, out: &mut BaseMoves) {
    if king.has_moved {
        return;
    }
    let rank = from.rank;
    let opponent = king.color.opposite();

    for side in [CastleSide::King, CastleSide::Queen] {
        if !position.castle_rights.allows(king.color, side) {
            continue;
        }
        let (rook_file, between, through, dest): (u8, &[u8], u8, u8) = match side {
            CastleSide::King => (7, &[5, 6], 5, 6),
            CastleSide::Queen => (0, &[1, 2, 3], 3, 2),
        };
        let rook_square = Square::new_unchecked(rook_file, rank);
        let rook_ok = position
            .board
            .get(rook_square)
            .is_some_and(|rook| {
                rook.kind == PieceKind::Rook && rook.color == king.color && !rook.has_moved
            });
        if !rook_ok {
            continue;
        }
        if !between
            .iter()
            .all(|&file| position.board.is_empty(Square::new_unchecked(file, rank)))
        {
            continue;
        }
        let path = [
            from,
            Square::new_unchecked(through, rank),
            Square::new_unchecked(dest, rank),
        ];
        if path
            .iter()
            .any(|&square| is_square_attacked(position, square, opponent))
        {
            continue;
        }
        let _ = out.try_push(BaseMove::castle(
            from,
            Square::new_unchecked(dest, rank),
            side,
        ));
    }
}

/// Activation moves for a piece already standing on a portal square of a
/// network it may use: one base move per currently-valid teleport
/// destination.
fn portal_activation_moves(position: &Position, from: Square, piece: Piece, out: &mut BaseMoves) {
    let Some((network, exits)) = position.portals.network_at(from, piece.color) else {
        return;
    };
    if network == NetworkKind::Neutral && position.cooldown(piece.color) {
        return;
    }
    let forbidden = match network {
        NetworkKind::Exclusive => position.no_return_origin(piece.color, from),
        NetworkKind::Neutral => None,
    };
    for dest in exits {
        if Some(dest) == forbidden {
            continue;
        }
        if position
            .board
            .get(dest)
            .is_some_and(|occupant| occupant.color == piece.color)
        {
            continue;
        }
        let _ = out.try_push(BaseMove::new(from, dest, MoveKind::PortalActivation));
    }
}

/// Expands a base move into its resolved outcomes. Empty when the move is
/// physically impossible in this position. The STAY outcome, when present,
/// is always first; teleport outcomes follow in network-declaration order.
pub fn expand(position: &Position, base: &BaseMove) -> Outcomes {
    let mut out = Outcomes::new();
    let Some(mover) = position.board.get(base.from) else {
        return out;
    };

    match base.kind {
        // Promotions never branch: a pawn promoting onto a portal square
        // does not activate it.
        MoveKind::Promotion | MoveKind::Capture | MoveKind::Enpassant | MoveKind::Castle => {
            let _ = out.try_push(ResolvedMove::direct(*base));
        }
        MoveKind::PortalActivation => {
            let Some((network, exits)) = position.portals.network_at(base.from, mover.color)
            else {
                return out;
            };
            if !exits.contains(&base.to) {
                return out;
            }
            match position.board.get(base.to) {
                Some(occupant) if occupant.color == mover.color => {}
                occupant => {
                    let _ = out.try_push(ResolvedMove::with_portal(
                        *base,
                        base.to,
                        PortalTransit {
                            entry: base.from,
                            network,
                            choice: PortalChoice::Teleport(base.to),
                            swapped: occupant.is_some(),
                        },
                    ));
                }
            }
        }
        MoveKind::Move => match position.portals.network_at(base.to, mover.color) {
            None => {
                let _ = out.try_push(ResolvedMove::direct(*base));
            }
            Some((network, exits)) => {
                let _ = out.try_push(ResolvedMove::with_portal(
                    *base,
                    base.to,
                    PortalTransit {
                        entry: base.to,
                        network,
                        choice: PortalChoice::Stay,
                        swapped: false,
                    },
                ));
                for dest in exits {
                    match position.board.get(dest) {
                        Some(occupant) if occupant.color == mover.color => {}
                        occupant => {
                            let _ = out.try_push(ResolvedMove::with_portal(
                                *base,
                                dest,
                                PortalTransit {
                                    entry: base.to,
                                    network,
                                    choice: PortalChoice::Teleport(dest),
                                    swapped: occupant.is_some(),
                                },
                            ));
                        }
                    }
                }
            }
        },
    }
    out
}

/// Whether `attacker` attacks `square`, by direct geometry or through a
/// portal. Used for castling legality; never recurses through the
/// generator. Kings are excluded from the portal scan.
pub fn is_square_attacked(position: &Position, square: Square, attacker: Color) -> bool {
    if attacked_directly(position, square, attacker) {
        return true;
    }

    for (from, piece) in position.board.pieces() {
        if piece.color != attacker || piece.kind == PieceKind::King {
            continue;
        }

        // Standing on a portal: any activation outcome landing on `square`.
        let mut activations = BaseMoves::new();
        portal_activation_moves(position, from, piece, &mut activations);
        for base in &activations {
            if expand(position, base)
                .iter()
                .any(|outcome| outcome.to_final == square)
            {
                return true;
            }
        }

        // One quiet move onto a usable portal square, then any teleport
        // outcome landing on `square`.
        for portal_square in position.portals.squares_usable_by(attacker) {
            if !position.board.is_empty(portal_square) {
                continue;
            }
            if !can_quietly_reach(position, from, piece, portal_square) {
                continue;
            }
            let synthetic = BaseMove::new(from, portal_square, MoveKind::Move);
            if expand(position, &synthetic)
                .iter()
                .any(|outcome| outcome.to_final == square)
            {
                return true;
            }
        }
    }

    false
}

fn attacked_directly(position: &Position, square: Square, attacker: Color) -> bool {
    // Pawns capture toward their own forward direction.
    let pawn_dir: i8 = if attacker == Color::White { 1 } else { -1 };
    for file_delta in [-1, 1] {
        if let Some(origin) = square.offset(file_delta, -pawn_dir) {
            if position.board.get(origin).is_some_and(|piece| {
                piece.color == attacker && piece.kind == PieceKind::Pawn
            }) {
                return true;
            }
        }
    }

    for &(file_delta, rank_delta) in &KNIGHT_JUMPS {
        if let Some(origin) = square.offset(file_delta, rank_delta) {
            if position.board.get(origin).is_some_and(|piece| {
                piece.color == attacker && piece.kind == PieceKind::Knight
            }) {
                return true;
            }
        }
    }

    for &(file_delta, rank_delta) in &KING_DIRS {
        if let Some(origin) = square.offset(file_delta, rank_delta) {
            if position.board.get(origin).is_some_and(|piece| {
                piece.color == attacker && piece.kind == PieceKind::King
            }) {
                return true;
            }
        }
    }

    for &(file_delta, rank_delta) in &ROOK_DIRS {
        if let Some(piece) = first_piece_on_ray(position, square, file_delta, rank_delta) {
            if piece.color == attacker
                && matches!(piece.kind, PieceKind::Rook | PieceKind::Queen)
            {
                return true;
            }
        }
    }
    for &(file_delta, rank_delta) in &BISHOP_DIRS {
        if let Some(piece) = first_piece_on_ray(position, square, file_delta, rank_delta) {
            if piece.color == attacker
                && matches!(piece.kind, PieceKind::Bishop | PieceKind::Queen)
            {
                return true;
            }
        }
    }

    false
}

fn first_piece_on_ray(
    position: &Position,
    from: Square,
    file_delta: i8,
    rank_delta: i8,
) -> Option<Piece> {
    let mut cursor = from;
    while let Some(next) = cursor.offset(file_delta, rank_delta) {
        if let Some(piece) = position.board.get(next) {
            return Some(piece);
        }
        cursor = next;
    }
    None
}

/// Direct-geometry test for a quiet (non-capturing) move from `from` to an
/// empty square `to`. Pawn pushes onto the final rank are excluded; those
/// resolve as promotions and never activate a portal.
fn can_quietly_reach(position: &Position, from: Square, piece: Piece, to: Square) -> bool {
    match piece.kind {
        PieceKind::Pawn => {
            let dir: i8 = if piece.color == Color::White { 1 } else { -1 };
            let start_rank = if piece.color == Color::White { 1 } else { 6 };
            let last_rank = if piece.color == Color::White { 7 } else { 0 };
            if to.file != from.file || to.rank == last_rank {
                return false;
            }
            if from.offset(0, dir) == Some(to) {
                return true;
            }
            from.rank == start_rank
                && from.offset(0, 2 * dir) == Some(to)
                && from
                    .offset(0, dir)
                    .is_some_and(|mid| position.board.is_empty(mid))
        }
        PieceKind::Knight => KNIGHT_JUMPS
            .iter()
            .any(|&(file_delta, rank_delta)| from.offset(file_delta, rank_delta) == Some(to)),
        PieceKind::King => KING_DIRS
            .iter()
            .any(|&(file_delta, rank_delta)| from.offset(file_delta, rank_delta) == Some(to)),
        PieceKind::Bishop => clear_ray_between(position, from, to, &BISHOP_DIRS),
        PieceKind::Rook => clear_ray_between(position, from, to, &ROOK_DIRS),
        PieceKind::Queen => {
            clear_ray_between(position, from, to, &ROOK_DIRS)
                || clear_ray_between(position, from, to, &BISHOP_DIRS)
        }
    }
}

fn clear_ray_between(
    position: &Position,
    from: Square,
    to: Square,
    dirs: &[(i8, i8)],
) -> bool {
    for &(file_delta, rank_delta) in dirs {
        let mut cursor = from;
        while let Some(next) = cursor.offset(file_delta, rank_delta) {
            if next == to {
                return true;
            }
            if !position.board.is_empty(next) {
                break;
            }
            cursor = next;
        }
    }
    false
}

/// Whether `color`'s king is attacked, judged by the full generator: true
/// iff some opponent piece has a resolved outcome landing on the king
/// square. This is the final-legality definition; castling path tests use
/// [`is_square_attacked`] instead.
pub fn in_check(position: &Position, color: Color) -> bool {
    let Some(king_square) = position.board.find_king(color) else {
        return false;
    };
    let attacker = color.opposite();
    for (from, piece) in position.board.pieces() {
        if piece.color != attacker {
            continue;
        }
        // Castle outcomes land on the castling side's own back rank and can
        // never reach the king square; skip generating them.
        let bases = base_moves_for(position, from, piece, false);
        for base in &bases {
            if expand(position, base)
                .iter()
                .any(|outcome| outcome.to_final == king_square)
            {
                return true;
            }
        }
    }
    false
}

/// Keeps only the outcomes that do not leave the mover in check.
pub fn filter_check_legal(position: &Position, candidates: &[ResolvedMove]) -> MoveList {
    let mover = position.turn;
    let mut out = MoveList::new();
    for candidate in candidates {
        let legal = position
            .apply(candidate)
            .map(|next| !in_check(&next, mover))
            .unwrap_or(false);
        if legal {
            let _ = out.try_push(*candidate);
        }
    }
    out
}

/// All resolved outcomes for the piece on `from`, before check filtering.
pub fn pseudo_legal_moves_from(position: &Position, from: Square) -> MoveList {
    let mut out = MoveList::new();
    for base in &generate_base_moves(position, from) {
        for outcome in expand(position, base) {
            let _ = out.try_push(outcome);
        }
    }
    out
}

/// The legal resolved outcomes for the piece on `from`.
pub fn legal_moves_from(position: &Position, from: Square) -> MoveList {
    filter_check_legal(position, &pseudo_legal_moves_from(position, from))
}

/// Every legal resolved outcome for the side to move.
pub fn all_legal_moves(position: &Position) -> MoveList {
    let mut candidates = MoveList::new();
    for (from, piece) in position.board.pieces() {
        if piece.color != position.turn {
            continue;
        }
        for outcome in pseudo_legal_moves_from(position, from) {
            let _ = candidates.try_push(outcome);
        }
    }
    filter_check_legal(position, &candidates)
}
