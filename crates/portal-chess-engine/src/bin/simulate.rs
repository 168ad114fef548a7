use std::fs::OpenOptions;
use std::io::Write;
use std::process::exit;

use rand::Rng;

use portal_chess_core::{
    all_legal_moves, game_result, GameResult, GameStatus, Position, ResolvedMove,
};
use portal_chess_engine::{best_move, ranked_root_moves};

const MAX_PLIES: u32 = 300;

#[derive(Debug, Clone)]
struct SimConfig {
    games: u32,
    depth: u8,
    openings_log: String,
    random_prob: f64,
    top_k: usize,
    opening_ply_limit: u32,
    softmax_t: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            games: 1000,
            depth: 3,
            openings_log: "openings.log".to_string(),
            random_prob: 0.0,
            top_k: 0,
            opening_ply_limit: 8,
            softmax_t: 1.0,
        }
    }
}

fn env_override<T: std::str::FromStr>(name: &str, slot: &mut T) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => {
                eprintln!("invalid value for {name}: {raw}");
                exit(2);
            }
        }
    }
}

fn arg_override<T: std::str::FromStr>(args: &[String], index: usize, slot: &mut T) {
    if let Some(raw) = args.get(index) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => {
                eprintln!("invalid argument #{index}: {raw}");
                exit(2);
            }
        }
    }
}

/// Positional args win over environment, environment over defaults.
fn parse_config() -> SimConfig {
    let mut config = SimConfig::default();

    env_override("GAMES_TO_RUN", &mut config.games);
    env_override("AI_DEPTH", &mut config.depth);
    env_override("OPENINGS_LOG", &mut config.openings_log);
    env_override("RANDOM_MOVE_PROB", &mut config.random_prob);
    env_override("TOP_K", &mut config.top_k);
    env_override("OPENING_PLY_LIMIT", &mut config.opening_ply_limit);
    env_override("SOFTMAX_T", &mut config.softmax_t);

    let args: Vec<String> = std::env::args().collect();
    arg_override(&args, 1, &mut config.games);
    arg_override(&args, 2, &mut config.depth);
    arg_override(&args, 3, &mut config.openings_log);
    arg_override(&args, 4, &mut config.random_prob);
    arg_override(&args, 5, &mut config.top_k);
    arg_override(&args, 6, &mut config.opening_ply_limit);
    arg_override(&args, 7, &mut config.softmax_t);

    config
}

fn move_label(mv: &ResolvedMove) -> String {
    format!("{}-{}", mv.from, mv.to_final)
}

fn pick_move(
    position: &Position,
    config: &SimConfig,
    ply: u32,
    rng: &mut impl Rng,
) -> Option<ResolvedMove> {
    let legal = all_legal_moves(position);
    if legal.is_empty() {
        return None;
    }

    if config.random_prob > 0.0 && rng.random::<f64>() < config.random_prob {
        return Some(legal[rng.random_range(0..legal.len())]);
    }

    if config.top_k > 0 && ply < config.opening_ply_limit {
        let ranked = ranked_root_moves(position, config.depth);
        let pool = &ranked[..config.top_k.min(ranked.len())];
        return Some(softmax_sample(pool, config.softmax_t, rng));
    }

    best_move(position, config.depth, position.turn)
}

/// Samples from score-ranked moves with softmax temperature `t`; scores are
/// centipawns, scaled by 100 before exponentiation.
fn softmax_sample(pool: &[(ResolvedMove, i32)], t: f64, rng: &mut impl Rng) -> ResolvedMove {
    let t = if t > 0.0 { t } else { 1.0 };
    let top = pool[0].1;
    let weights: Vec<f64> = pool
        .iter()
        .map(|(_, score)| ((f64::from(*score) - f64::from(top)) / (100.0 * t)).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    let mut roll = rng.random::<f64>() * total;
    for (weight, (mv, _)) in weights.iter().zip(pool) {
        roll -= weight;
        if roll <= 0.0 {
            return *mv;
        }
    }
    pool[pool.len() - 1].0
}

struct GameRecord {
    moves: Vec<ResolvedMove>,
    result: GameResult,
    final_fen: String,
}

fn play_game(config: &SimConfig, rng: &mut impl Rng) -> GameRecord {
    let mut position = Position::new();
    let mut moves = Vec::new();

    loop {
        let result = game_result(&position);
        if result.is_over() || moves.len() as u32 >= MAX_PLIES {
            return GameRecord {
                moves,
                result,
                final_fen: position.fen(),
            };
        }
        let Some(mv) = pick_move(&position, config, moves.len() as u32, rng) else {
            return GameRecord {
                moves,
                result,
                final_fen: position.fen(),
            };
        };
        position = position.apply(&mv).expect("picked move applies");
        moves.push(mv);
    }
}

fn main() {
    let config = parse_config();
    let mut rng = rand::rng();

    let mut openings = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.openings_log)
    {
        Ok(file) => file,
        Err(err) => {
            eprintln!("cannot open openings log {}: {err}", config.openings_log);
            exit(2);
        }
    };
    let debug_path = format!("{}.debug", config.openings_log);

    eprintln!(
        "Running {} games at depth {} (randomProb={}, topK={}, openingPlyLimit={}, softmaxT={})...",
        config.games,
        config.depth,
        config.random_prob,
        config.top_k,
        config.opening_ply_limit,
        config.softmax_t
    );

    let mut checkmates = 0u32;
    let mut stalemates = 0u32;
    let mut unfinished = 0u32;

    for game in 1..=config.games {
        let record = play_game(&config, &mut rng);

        let opening: Vec<String> = record
            .moves
            .iter()
            .take(config.opening_ply_limit as usize)
            .map(move_label)
            .collect();
        if let Err(err) = writeln!(openings, "{}", opening.join(" ")) {
            eprintln!("cannot write openings log: {err}");
            exit(2);
        }

        match record.result.status {
            GameStatus::Checkmate => {
                checkmates += 1;
                // A mate inside the opening window is suspicious; keep the
                // full score for inspection.
                if (record.moves.len() as u32) <= config.opening_ply_limit {
                    log_suspicious(&debug_path, game, &record);
                }
            }
            GameStatus::Stalemate => stalemates += 1,
            GameStatus::Ongoing => unfinished += 1,
        }

        eprintln!(
            "Game {game}/{}: {} plies, {:?}{}",
            config.games,
            record.moves.len(),
            record.result.status,
            record
                .result
                .winner
                .map(|winner| format!(" ({})", winner.to_code()))
                .unwrap_or_default()
        );
    }

    eprintln!(
        "Done: {checkmates} checkmates, {stalemates} stalemates, {unfinished} move-capped games"
    );
}

fn log_suspicious(path: &str, game: u32, record: &GameRecord) {
    let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) else {
        eprintln!("cannot open debug log {path}");
        return;
    };
    let all_moves: Vec<String> = record.moves.iter().map(move_label).collect();
    let _ = writeln!(
        file,
        "game {game}: mate in {} plies | {} | {}",
        record.moves.len(),
        all_moves.join(" "),
        record.final_fen
    );
}
