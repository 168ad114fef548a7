use portal_chess_core::{
    all_legal_moves, in_check, Color, MoveKind, Position, ResolvedMove,
};

use crate::eval::{ClassicalEval, Evaluator};

pub const MATE_SCORE: i32 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<ResolvedMove>,
    pub score: i32,
    pub nodes: u64,
}

pub struct Searcher {
    eval: Box<dyn Evaluator>,
    nodes: u64,
}

impl Searcher {
    pub fn new() -> Self {
        Self::with_eval(Box::new(ClassicalEval::new()))
    }

    pub fn with_eval(eval: Box<dyn Evaluator>) -> Self {
        Self { eval, nodes: 0 }
    }

    /// Fixed-depth negamax with alpha-beta pruning over the legal resolved
    /// outcomes of the side to move.
    pub fn search(&mut self, position: &Position, depth: u8) -> SearchResult {
        self.nodes = 0;
        let depth = depth.max(1);

        let mut moves = all_legal_moves(position);
        if moves.is_empty() {
            let score = if in_check(position, position.turn) {
                -MATE_SCORE
            } else {
                0
            };
            return SearchResult {
                best_move: None,
                score,
                nodes: self.nodes,
            };
        }
        order_moves(&mut moves);

        let mut best_score = i32::MIN;
        let mut best_move = None;
        let mut alpha = -MATE_SCORE;
        let beta = MATE_SCORE;

        for mv in &moves {
            let next = position.apply(mv).expect("legal move applies");
            let score = -self.negamax(&next, depth - 1, 1, -beta, -alpha);
            if score > best_score {
                best_score = score;
                best_move = Some(*mv);
            }
            alpha = alpha.max(score);
        }

        SearchResult {
            best_move,
            score: best_score,
            nodes: self.nodes,
        }
    }

    fn negamax(&mut self, position: &Position, depth: u8, ply: u8, mut alpha: i32, beta: i32) -> i32 {
        self.nodes += 1;

        let mut moves = all_legal_moves(position);
        if moves.is_empty() {
            return if in_check(position, position.turn) {
                // Prefer shorter mates.
                -(MATE_SCORE - i32::from(ply))
            } else {
                0
            };
        }
        if depth == 0 {
            return self.eval.evaluate(position);
        }
        order_moves(&mut moves);

        let mut best = -MATE_SCORE;
        for mv in &moves {
            let next = position.apply(mv).expect("legal move applies");
            let score = -self.negamax(&next, depth - 1, ply + 1, -beta, -alpha);
            best = best.max(score);
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Captures, swaps and promotions first; cheap ordering for pruning.
fn order_moves(moves: &mut portal_chess_core::MoveList) {
    let mut ordered: Vec<ResolvedMove> = moves.iter().copied().collect();
    ordered.sort_by_key(|mv| {
        let noisy = mv.kind == MoveKind::Capture
            || mv.kind == MoveKind::Promotion
            || mv.via_portal.is_some_and(|transit| transit.swapped);
        if noisy {
            0
        } else {
            1
        }
    });
    moves.clear();
    for mv in ordered {
        let _ = moves.try_push(mv);
    }
}

/// The core's pure search entry point: the best legal outcome for `color`,
/// or `None` when it is not `color`'s turn or no legal outcome exists.
pub fn best_move(position: &Position, depth: u8, color: Color) -> Option<ResolvedMove> {
    if position.turn != color {
        return None;
    }
    Searcher::new().search(position, depth).best_move
}

/// Root moves with their search scores, best first. Used by the simulator's
/// top-K opening sampling.
pub fn ranked_root_moves(position: &Position, depth: u8) -> Vec<(ResolvedMove, i32)> {
    let depth = depth.max(1);
    let mut searcher = Searcher::new();
    let mut ranked: Vec<(ResolvedMove, i32)> = all_legal_moves(position)
        .iter()
        .map(|mv| {
            let next = position.apply(mv).expect("legal move applies");
            let score = -searcher.negamax(&next, depth - 1, 1, -MATE_SCORE, MATE_SCORE);
            (*mv, score)
        })
        .collect();
    ranked.sort_by_key(|(_, score)| -score);
    ranked
}
