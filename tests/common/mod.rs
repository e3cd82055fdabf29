// Shared test helpers

#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use std::time::Duration;
use treeboard::aggregation_worker::AggregationWorkerConfig;
use treeboard::config::PersistMode;
use treeboard::engine::DEFAULT_ONLINE_THRESHOLD_SECS;
use treeboard::models::{DeviceRecord, DeviceStates};
use treeboard::schedule::{ActiveWindow, PassTime};

pub const NOW: i64 = 1_700_000_000;

pub const TEST_CONFIG: &str = r#"
[server]
port = 5000
host = "127.0.0.1"

[storage]
device_states_path = "data/device_states.json"
scoreboard_path = "data/scoreboard.json"

[ingest]
api_key = "test-key"
device_ids = ["pico-1", "pico-2"]
"#;

pub fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid date")
}

/// Tuesday 2024-01-02 12:00, inside the default window.
pub fn weekday_noon() -> PassTime {
    PassTime::at(local(2024, 1, 2, 12, 0), NOW)
}

pub fn devices(entries: &[(&str, DeviceRecord)]) -> DeviceStates {
    entries
        .iter()
        .map(|(id, rec)| (id.to_string(), rec.clone()))
        .collect()
}

pub fn worker_config(persist: PersistMode) -> AggregationWorkerConfig {
    AggregationWorkerConfig {
        online_threshold_secs: DEFAULT_ONLINE_THRESHOLD_SECS,
        device_delay: Duration::ZERO,
        pass_delay: Duration::from_millis(5),
        persist,
        window: ActiveWindow::default(),
    }
}
