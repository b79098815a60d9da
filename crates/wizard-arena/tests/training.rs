use std::sync::atomic::AtomicBool;

use wizard_arena::{Session, TrainingConfig};
use wizard_core::Difficulty;
use wizard_learning::SqliteStore;

const CONFIG: &str = r#"
games = 3
max_plies = 10
seed = 42

[[strategies]]
name = "Novice"
difficulty = "easy"
weight = 3

[[strategies]]
name = "Scholar"
difficulty = "Medium"
"#;

#[test]
fn training_results_survive_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("training.toml");
    std::fs::write(&config_path, CONFIG).unwrap();
    let config = TrainingConfig::load(&config_path).unwrap();
    assert_eq!(config.strategies[1].difficulty, Difficulty::Medium);
    assert_eq!(config.strategies[1].weight, 1);

    let db = dir.path().join("learning.db");
    let stats = {
        let mut session = Session::new(SqliteStore::open(&db).unwrap(), config.clone()).unwrap();
        session.run_mass_training(config.games, |_| {}, &AtomicBool::new(false))
    };
    assert_eq!(stats.games_played + stats.failed_games, 3);
    let named: u32 = stats.strategies.values().map(|r| r.games).sum();
    assert_eq!(named, 2 * stats.games_played);
    assert!(stats
        .strategies
        .keys()
        .all(|name| name == "Novice" || name == "Scholar"));

    let reopened = Session::new(SqliteStore::open(&db).unwrap(), config).unwrap();
    let learned = reopened.learning_stats();
    assert_eq!(learned.games_played, u64::from(stats.games_played));
    assert_eq!(learned.recent_games, stats.games_played as usize);
}

#[test]
fn seeded_runs_are_reproducible() {
    let config = TrainingConfig::parse(CONFIG).unwrap();
    let run = |config: TrainingConfig| {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut session = Session::new(store, config).unwrap();
        session.run_mass_training(3, |_| {}, &AtomicBool::new(false))
    };
    assert_eq!(run(config.clone()), run(config));
}
