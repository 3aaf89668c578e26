//! Replaying scripts against the built-in catalog panel.

use facet_cli::replay::Replay;
use facet_cli::script::Script;
use facet_cli::session::Session;
use facet_model::Tristate;
use facet_persist::{MemoryStore, Sinks};
use facet_state::PanelConfig;
use facet_sync::SyncSettings;

const PRICE_RANGE: &str = r#"{"steps": [
    {"at_ms": 0,   "command": {"type": "set_scalar", "field": "minPrice", "value": 10}},
    {"at_ms": 100, "command": {"type": "set_scalar", "field": "maxPrice", "value": 5}}
]}"#;

fn catalog(url: &str) -> Replay {
    Replay::mount(PanelConfig::catalog(), Sinks::in_memory(url), SyncSettings::default()).unwrap()
}

fn keys_and_due(replay: &Replay) -> Vec<(&str, u64)> {
    replay
        .commits
        .iter()
        .map(|commit| (commit.key.as_str(), commit.due_ms))
        .collect()
}

#[test]
fn price_range_commits_on_staggered_deadlines() {
    let mut replay = catalog("/catalog");
    replay.run_virtual(&Script::parse(PRICE_RANGE).unwrap()).unwrap();
    assert_eq!(replay.pending_len(), 2);
    assert!(replay.commits.is_empty());

    replay.settle_virtual();
    assert_eq!(keys_and_due(&replay), [("minPrice", 500), ("maxPrice", 650)]);
    assert_eq!(replay.commits[0].entry, Tristate::Value("10.0".to_string()));
    assert_eq!(
        replay.sinks.location.href(),
        "/catalog?minPrice=10.0&maxPrice=5.0"
    );
    assert_eq!(replay.sinks.location.history_len(), 1);
}

#[test]
fn retyping_before_the_deadline_commits_once() {
    let script = Script::parse(
        r#"{"steps": [
            {"at_ms": 0,   "command": {"type": "set_scalar", "field": "minPrice", "value": 1}},
            {"at_ms": 200, "command": {"type": "set_scalar", "field": "minPrice", "value": 12}},
            {"at_ms": 400, "command": {"type": "set_scalar", "field": "minPrice", "value": 120}}
        ]}"#,
    )
    .unwrap();
    let mut replay = catalog("/catalog");
    replay.run_virtual(&script).unwrap();
    replay.settle_virtual();
    assert_eq!(keys_and_due(&replay), [("minPrice", 900)]);
    assert_eq!(replay.sinks.location.href(), "/catalog?minPrice=120.0");
}

#[test]
fn closing_early_cancels_pending_commits() {
    let mut replay = catalog("/catalog?page=3");
    replay.run_virtual(&Script::parse(PRICE_RANGE).unwrap()).unwrap();

    assert_eq!(replay.unmount(), 2);
    assert_eq!(replay.pending_len(), 0);
    replay.settle_virtual();
    assert!(replay.commits.is_empty());
    assert_eq!(replay.sinks.location.href(), "/catalog?page=3");
    assert!(replay.sinks.tab.snapshot().is_empty());
}

#[test]
fn session_survives_a_reload_without_the_query_string() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tab.json");
    let script = Script::parse(
        r#"{"steps": [
            {"command": {"type": "add_selection", "field": "tags", "value": "red"}},
            {"command": {"type": "change_sort", "field": "price", "direction": "descending"}}
        ]}"#,
    )
    .unwrap();

    let mut first = catalog("/catalog");
    first.run_virtual(&script).unwrap();
    first.settle_virtual();
    Session::capture(&first.sinks).save(&path).unwrap();

    let mut session = Session::load(&path).unwrap();
    session.url = "/catalog".to_string();
    let second = Replay::mount(
        PanelConfig::catalog(),
        session.into_sinks(Box::new(MemoryStore::new())),
        SyncSettings::default(),
    )
    .unwrap();

    let query = second.panel.committed_query();
    assert_eq!(query.selections["tags"], ["red"]);
    assert_eq!(query.sort.len(), 1);
    assert_eq!(query.sort[0].field, "price");
}

#[tokio::test(start_paused = true)]
async fn realtime_replay_fires_on_the_tokio_clock() {
    let mut replay = catalog("/catalog");
    replay
        .run_realtime(&Script::parse(PRICE_RANGE).unwrap())
        .await
        .unwrap();
    replay.settle_realtime().await;

    assert_eq!(keys_and_due(&replay), [("minPrice", 500), ("maxPrice", 650)]);
    assert!(
        replay
            .commits
            .iter()
            .all(|commit| commit.fired_ms == commit.due_ms)
    );
    assert_eq!(replay.pending_len(), 0);
}
