// Device reports as stored in device_states.json.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scoring color. Serializes lowercase ("red"), the key format of the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl Color {
    pub const ALL: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

    /// Case-insensitive match of a reported state against the scoring colors.
    /// "OFF", "NULL" and anything unrecognized are not colors.
    pub fn from_state(state: &str) -> Option<Self> {
        match state.to_uppercase().as_str() {
            "RED" => Some(Color::Red),
            "GREEN" => Some(Color::Green),
            "BLUE" => Some(Color::Blue),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States a device may submit through the ingestion endpoint. Matched exactly (uppercase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceState {
    Off,
    Red,
    Green,
    Blue,
    Null,
}

impl DeviceState {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OFF" => Some(DeviceState::Off),
            "RED" => Some(DeviceState::Red),
            "GREEN" => Some(DeviceState::Green),
            "BLUE" => Some(DeviceState::Blue),
            "NULL" => Some(DeviceState::Null),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DeviceState::Off => "OFF",
            DeviceState::Red => "RED",
            DeviceState::Green => "GREEN",
            DeviceState::Blue => "BLUE",
            DeviceState::Null => "NULL",
        }
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest report for one device. Both fields may be missing: a heartbeat before any
/// state report leaves `state` empty, and hand-edited files may drop either.
/// Non-string states and non-numeric timestamps read as absent instead of failing the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_epoch",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<i64>,
}

impl DeviceRecord {
    pub fn new(state: impl Into<String>, last_updated: i64) -> Self {
        Self {
            state: Some(state.into()),
            last_updated: Some(last_updated),
        }
    }

    /// Scoring color of the reported state, if any.
    pub fn color(&self) -> Option<Color> {
        self.state.as_deref().and_then(Color::from_state)
    }

    /// Report time in epoch seconds. A zero timestamp counts as missing.
    pub fn reported_at(&self) -> Option<i64> {
        self.last_updated.filter(|&ts| ts != 0)
    }
}

/// Device id -> latest record.
pub type DeviceStates = BTreeMap<String, DeviceRecord>;

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn lenient_epoch<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(d)?;
    Ok(value.and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64))))
}
