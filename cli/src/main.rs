mod config;

use anyhow::{anyhow, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use driver::{BatchScheduler, SearchEvent};
use game_core::{Board, GameRules, Player, Verdict};
use games_connect4::ConnectFour;
use games_tictactoe::TicTacToe;

use crate::config::{Config, Game};

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    config.validate()?;
    init_tracing(&config.log_level);

    match config.game {
        Game::Tictactoe => play(TicTacToe, 3, false, &config).await,
        Game::Connect4 => play(ConnectFour, games_connect4::COLS, true, &config).await,
    }
}

async fn play<G>(rules: G, cols: usize, bottom_up: bool, config: &Config) -> anyhow::Result<()>
where
    G: GameRules + Copy + Send + 'static,
{
    let scheduler = BatchScheduler::new();
    for game in 1..=config.games {
        if config.games > 1 {
            info!(game, total = config.games, "starting game");
        }
        if !play_one(&scheduler, rules, cols, bottom_up, config, game).await? {
            return Ok(());
        }
    }
    Ok(())
}

/// Self-play for one game: search each position, apply the chosen
/// move, stop on a verdict. Returns `false` on ctrl-c.
async fn play_one<G>(
    scheduler: &BatchScheduler,
    rules: G,
    cols: usize,
    bottom_up: bool,
    config: &Config,
    game: u32,
) -> anyhow::Result<bool>
where
    G: GameRules + Copy + Send + 'static,
{
    let mut board = rules.new_board();
    let mut to_move = Player::A;
    let mut turn: u64 = 0;

    println!("{}", render(&board, cols, bottom_up));
    loop {
        if let Some(verdict) = rules.winner(&board) {
            match verdict {
                Verdict::Win(player) => info!(?player, "game over"),
                Verdict::Draw => info!("game drawn"),
            }
            return Ok(true);
        }

        let mut driver_config = config.driver_config();
        if let Some(seed) = driver_config.seed {
            // Distinct stream per move and game, still reproducible.
            let offset = u64::from(game - 1).wrapping_mul(1_000).wrapping_add(turn);
            driver_config.seed = Some(seed.wrapping_add(offset));
        }
        let budget = driver_config.search.simulations;
        let mut handle = scheduler.start(rules, board.clone(), to_move, driver_config);

        let bar = ProgressBar::new(u64::from(budget));
        bar.set_style(
            ProgressStyle::with_template("{prefix} [{bar:30}] {pos}/{len} simulations")
                .context("progress bar template")?
                .progress_chars("=> "),
        );
        bar.set_prefix(format!("{to_move:?}"));

        let chosen = loop {
            tokio::select! {
                event = handle.recv() => match event {
                    Some(SearchEvent::Progress(progress)) => {
                        bar.set_position(u64::from(progress.completed));
                    }
                    Some(SearchEvent::Finished { final_move, stats, degraded }) => {
                        bar.finish_and_clear();
                        if degraded {
                            info!(final_move, "search degraded, played a random legal move");
                        }
                        info!(
                            final_move,
                            nodes = stats.node_count,
                            depth = stats.max_depth,
                            "move chosen"
                        );
                        break final_move;
                    }
                    Some(SearchEvent::Failed { reason }) => {
                        bar.finish_and_clear();
                        return Err(anyhow!("search failed: {reason}"));
                    }
                    None => {
                        bar.finish_and_clear();
                        return Err(anyhow!("search task stopped without a result"));
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    handle.cancel();
                    bar.finish_and_clear();
                    info!("interrupted, abandoning the game");
                    return Ok(false);
                }
            }
        };

        board = board.with_move(chosen, to_move);
        to_move = to_move.opponent();
        turn += 1;
        println!("{}", render(&board, cols, bottom_up));
    }
}

/// Plain-text board, `cols` cells per row. `bottom_up` renders row 0
/// last, matching games where pieces stack from the bottom.
fn render(board: &Board, cols: usize, bottom_up: bool) -> String {
    let rows = board.len() / cols;
    let mut lines = Vec::with_capacity(rows);
    for row in 0..rows {
        let line: String = (0..cols)
            .map(|col| match board.cell(col + row * cols) {
                Some(Player::A) => " x",
                Some(Player::B) => " o",
                None => " .",
            })
            .collect();
        lines.push(line);
    }
    if bottom_up {
        lines.reverse();
    }
    lines.join("\n") + "\n"
}
