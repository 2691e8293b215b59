//! File round-trips and end-to-end runs of the headless runner.

use skirmish_core::replay::Replay;
use skirmish_core::team::TeamColor;
use skirmish_headless::batch::{run_batch, BatchConfig, BatchResults};
use skirmish_headless::runner::{run_match, MatchConfig};
use skirmish_headless::scenario::{FramePacing, Scenario, ScenarioError};
use skirmish_test_utils::fixtures::FIXTURE_SEED;

#[test]
fn scenario_file_resolves_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("custom.ron");

    let scenario = Scenario::duel_1v1()
        .with_max_ticks(900)
        .with_pacing(FramePacing::Jitter { min: 0.75, max: 1.5 });
    scenario.save(&path).unwrap();

    let loaded = Scenario::resolve(path.to_str().unwrap()).unwrap();
    assert_eq!(loaded, scenario);
}

#[test]
fn malformed_scenario_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ron");
    std::fs::write(&path, "(name: \"oops\", config: ").unwrap();

    assert!(matches!(
        Scenario::load(&path),
        Err(ScenarioError::ParseError(_))
    ));
}

#[test]
fn match_metrics_agree_with_final_state() {
    let scenario = Scenario::duel_1v1().with_max_ticks(8_000);
    let result = run_match(MatchConfig::new(scenario, FIXTURE_SEED)).unwrap();
    let m = &result.metrics;
    let sim = &result.simulation;

    assert_eq!(m.final_state_hash, sim.state_hash());
    assert_eq!(m.score, sim.round().score);
    assert_eq!(m.winner, sim.round().match_winner());
    assert_eq!(m.rounds.len() as u32, m.score.total());
    assert_eq!(m.red.kills, m.blue.deaths);
    assert_eq!(m.blue.kills, m.red.deaths);
    for team in TeamColor::BOTH {
        assert_eq!(m.team(team).rounds_won, m.score.of(team));
        assert_eq!(m.team(team).plants, 0);
    }
    if let Some(winner) = m.winner {
        assert_eq!(m.rounds.last().map(|r| r.winner), Some(winner));
    }
}

#[test]
fn batch_results_and_replays_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = BatchConfig::new("duel_1v1", 3)
        .with_output(dir.path().to_path_buf())
        .with_seed(40)
        .with_max_ticks(1_200)
        .with_replays(true);
    let results = run_batch(config).unwrap();
    assert!(results.errors.is_empty());
    assert_eq!(results.games.len(), 3);

    let path = dir.path().join("batch_results.json");
    results.save(&path).unwrap();
    let loaded = BatchResults::load(&path).unwrap();
    assert_eq!(loaded.games.len(), 3);
    assert_eq!(loaded.config.scenario, "duel_1v1");
    assert_eq!(loaded.summary.total_games, 3);

    for game in &results.games {
        let replay_path = dir
            .path()
            .join("replays")
            .join(format!("match_{}.replay", game.seed));
        let replay = Replay::load(&replay_path).unwrap();
        assert_eq!(replay.seed, game.seed);
        assert_eq!(replay.final_hash, game.final_state_hash);
        assert!(replay.verify().unwrap());
    }
}

#[test]
fn jittered_bomb_match_is_reproducible() {
    let scenario = Scenario::bomb_5v5().with_max_ticks(1_500);
    let a = run_match(MatchConfig::new(scenario.clone(), 77)).unwrap();
    let b = run_match(MatchConfig::new(scenario, 77)).unwrap();
    assert_eq!(a.metrics.final_state_hash, b.metrics.final_state_hash);
    assert_eq!(a.metrics.red.shots, b.metrics.red.shots);
    assert_eq!(a.metrics.blue.damage_dealt, b.metrics.blue.damage_dealt);
}
