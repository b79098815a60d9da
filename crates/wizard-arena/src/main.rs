use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use wizard_arena::{Session, TrainingConfig};
use wizard_core::Difficulty;
use wizard_engine::{GameMode, GamePhase};
use wizard_learning::SqliteStore;

#[derive(Parser)]
#[command(name = "wizard-arena")]
#[command(about = "Self-play training and learning data tools for wizard chess")]
struct Cli {
    /// Path to the SQLite learning store
    #[arg(long, global = true, default_value = "data/learning.db")]
    db: PathBuf,

    /// Path to the training configuration
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run headless self-play games and learn from them
    Train {
        /// Number of games to play
        #[arg(short, long)]
        games: Option<u32>,
        /// Seed for strategy pairing and AI randomness
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Play one AI vs AI game and print the final board
    Play {
        /// Difficulty for both sides
        #[arg(short, long, default_value = "medium")]
        difficulty: Difficulty,
    },
    /// Show learned statistics
    Stats,
    /// Clear all learned data
    Reset,
    /// Write learned data as text
    Export {
        /// Output file; stdout if omitted
        output: Option<PathBuf>,
    },
    /// Replace learned data from an exported file
    Import {
        /// File written by `export`
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(TrainingConfig::config_path);
    let mut config = TrainingConfig::load(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    if let Commands::Train { games, seed } = &cli.command {
        if let Some(games) = games {
            config.games = *games;
        }
        if seed.is_some() {
            config.seed = *seed;
        }
    }

    let games = config.games;
    let session = open_session(&cli.db, config)?;

    match cli.command {
        Commands::Train { .. } => train(session, games).await?,
        Commands::Play { difficulty } => play(session, difficulty),
        Commands::Stats => print!("{}", session.learning_stats()),
        Commands::Reset => {
            let mut session = session;
            session.reset_learning()?;
            println!("Learning data cleared");
        }
        Commands::Export { output } => {
            let blob = session.export_training_data()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, blob)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Exported to {}", path.display());
                }
                None => println!("{}", blob),
            }
        }
        Commands::Import { input } => {
            let blob = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let mut session = session;
            if !session.import_training_data(&blob) {
                anyhow::bail!("{} is not valid learning data", input.display());
            }
            println!("Imported {} games", session.learning_stats().games_played);
        }
    }
    Ok(())
}

fn open_session(db: &Path, config: TrainingConfig) -> anyhow::Result<Session<SqliteStore>> {
    if let Some(parent) = db.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let store = SqliteStore::open(db).with_context(|| format!("opening {}", db.display()))?;
    Ok(Session::new(store, config)?)
}

async fn train(mut session: Session<SqliteStore>, games: u32) -> anyhow::Result<()> {
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            tracing::info!("Stopping after the current game");
            cancel_clone.store(true, Ordering::SeqCst);
        }
    });

    let stats = tokio::task::spawn_blocking(move || {
        let stats = session.run_mass_training(
            games,
            |p| {
                println!(
                    "Game {}/{}  W:{} D:{} B:{}",
                    p.completed, p.total, p.white_wins, p.draws, p.black_wins
                )
            },
            &cancel,
        );
        (stats, session.learning_stats())
    })
    .await?;

    println!("\n{}", stats.0);
    print!("{}", stats.1);
    Ok(())
}

fn play(mut session: Session<SqliteStore>, difficulty: Difficulty) {
    let max_plies = session.config().max_plies as usize;
    session.start_game(GameMode::AiVsAi, difficulty);
    while session.game().phase() == GamePhase::Playing {
        if session.game().state().ply_count() >= max_plies {
            println!("Draw by move cap");
            break;
        }
        match session.play_ai_turn() {
            Ok(Some(m)) => println!("{}", m),
            Ok(None) => break,
            Err(e) => {
                tracing::error!("AI move rejected: {}", e);
                break;
            }
        }
    }
    println!("{}", session.game());
    if let Some(winner) = session.game().state().winner() {
        println!("{} wins", winner);
    } else if session.game().state().is_stalemate() {
        println!("Stalemate");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_train_overrides() {
        let cli = Cli::try_parse_from(["wizard-arena", "train", "--games", "5", "--seed", "9"]).unwrap();
        match cli.command {
            Commands::Train { games, seed } => {
                assert_eq!(games, Some(5));
                assert_eq!(seed, Some(9));
            }
            _ => panic!("expected train"),
        }
        assert_eq!(cli.db, PathBuf::from("data/learning.db"));
    }

    #[test]
    fn parses_global_db_after_subcommand() {
        let cli = Cli::try_parse_from(["wizard-arena", "stats", "--db", "/tmp/x.db"]).unwrap();
        assert!(matches!(cli.command, Commands::Stats));
        assert_eq!(cli.db, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn parses_play_difficulty() {
        let cli = Cli::try_parse_from(["wizard-arena", "play", "-d", "master"]).unwrap();
        match cli.command {
            Commands::Play { difficulty } => assert_eq!(difficulty, Difficulty::Master),
            _ => panic!("expected play"),
        }
    }
}
