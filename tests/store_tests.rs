// JSON file store tests: load defaults, malformed files, atomic replace

mod common;

use common::NOW;
use treeboard::models::{DeviceRecord, DeviceStates, Scoreboard, ScoreboardEntry};
use treeboard::store::{DeviceStore, ScoreboardStore};

#[tokio::test]
async fn missing_device_file_reads_as_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = DeviceStore::new(dir.path().join("device_states.json"));
    assert!(store.load().await.unwrap().is_none());
    assert!(store.load_or_empty().await.is_empty());
}

#[tokio::test]
async fn malformed_device_file_reads_as_empty() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("device_states.json");
    std::fs::write(&path, "{\"d1\": {\"state\": \"RED\",").unwrap();
    let store = DeviceStore::new(&path);
    assert!(store.load().await.is_err());
    assert!(store.load_or_empty().await.is_empty());
}

#[tokio::test]
async fn device_file_with_odd_fields_still_loads() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("device_states.json");
    std::fs::write(
        &path,
        r#"{
            "d1": {"state": "RED", "last_updated": 1700000000},
            "d2": {"last_updated": 1700000000.7},
            "d3": {"state": 42, "last_updated": "yesterday"},
            "d4": {}
        }"#,
    )
    .unwrap();
    let states = DeviceStore::new(&path).load_or_empty().await;
    assert_eq!(states.len(), 4);
    assert_eq!(states["d1"], DeviceRecord::new("RED", NOW));
    assert_eq!(states["d2"].last_updated, Some(NOW));
    assert_eq!(states["d2"].state, None);
    assert_eq!(states["d3"], DeviceRecord::default());
    assert_eq!(states["d4"], DeviceRecord::default());
}

#[tokio::test]
async fn device_store_save_then_load() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("device_states.json");
    let store = DeviceStore::new(&path);
    let mut states = DeviceStates::new();
    states.insert("d1".into(), DeviceRecord::new("GREEN", NOW));
    store.save(&states).await.unwrap();

    assert_eq!(store.load().await.unwrap(), Some(states));
    assert!(!dir.path().join("nested").join("device_states.json.tmp").exists());
}

#[tokio::test]
async fn scoreboard_load_scores_zeroes_trees() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("scoreboard.json");
    std::fs::write(
        &path,
        r#"{"red": {"score": 12, "trees": 4}, "green": {"score": 3, "trees": 1}}"#,
    )
    .unwrap();
    let board = ScoreboardStore::new(&path).load_scores().await;
    assert_eq!(board.red, ScoreboardEntry { score: 12, trees: 0 });
    assert_eq!(board.green, ScoreboardEntry { score: 3, trees: 0 });
    assert_eq!(board.blue, ScoreboardEntry::default());
}

#[tokio::test]
async fn malformed_scoreboard_starts_fresh() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("scoreboard.json");
    std::fs::write(&path, "not json").unwrap();
    let store = ScoreboardStore::new(&path);
    assert_eq!(store.load_scores().await, Scoreboard::default());
    assert_eq!(store.load_or_default().await, Scoreboard::default());
}

#[tokio::test]
async fn scoreboard_save_writes_color_keyed_json() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("scoreboard.json");
    let store = ScoreboardStore::new(&path);
    let board = Scoreboard {
        red: ScoreboardEntry { score: 1, trees: 1 },
        ..Scoreboard::default()
    };
    store.save(&board).await.unwrap();
    store.save(&board).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(
        raw,
        serde_json::json!({
            "red": {"score": 1, "trees": 1},
            "green": {"score": 0, "trees": 0},
            "blue": {"score": 0, "trees": 0},
        })
    );
    assert_eq!(store.load_or_default().await, board);
}
