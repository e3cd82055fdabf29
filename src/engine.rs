// Scoreboard engine: per-device state-transition bookkeeping.
//
// The engine owns the scoreboard and the table of each device's last valid color.
// A device is in the table iff its latest processed report was online with a color,
// so every color's `trees` equals the number of table entries holding that color.

use std::collections::HashMap;

use crate::models::{Color, DeviceRecord, DeviceStates, Scoreboard};

/// Default heartbeat age (seconds) after which a device counts as offline.
pub const DEFAULT_ONLINE_THRESHOLD_SECS: u64 = 300;

/// What processing one device record did to the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceOutcome {
    /// No timestamp: neither online nor offline, nothing changed.
    Skipped,
    /// Online with a color: scored, and `previous` is the color it held before this report.
    Counted {
        color: Color,
        previous: Option<Color>,
    },
    /// Offline, or online without a color: dropped from live counts.
    Cleared { previous: Option<Color> },
}

impl DeviceOutcome {
    /// Whether the device moved between colors (or into/out of the live counts).
    pub fn is_transition(&self) -> bool {
        match *self {
            DeviceOutcome::Skipped => false,
            DeviceOutcome::Counted { color, previous } => previous != Some(color),
            DeviceOutcome::Cleared { previous } => previous.is_some(),
        }
    }
}

pub struct ScoreEngine {
    scoreboard: Scoreboard,
    previous: HashMap<String, Color>,
    online_threshold_secs: i64,
}

impl ScoreEngine {
    /// Starts from `initial` scores. Tree counts are never carried over: the previous-color
    /// table starts empty, so live counts start at zero.
    pub fn new(initial: Scoreboard, online_threshold_secs: u64) -> Self {
        Self {
            scoreboard: initial.scores_only(),
            previous: HashMap::new(),
            online_threshold_secs: i64::try_from(online_threshold_secs).unwrap_or(i64::MAX),
        }
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    /// Last valid color seen for `device_id`, if it is currently counted.
    pub fn previous_color(&self, device_id: &str) -> Option<Color> {
        self.previous.get(device_id).copied()
    }

    /// Number of devices currently counted in some color.
    pub fn tracked_devices(&self) -> usize {
        self.previous.len()
    }

    pub fn is_online(&self, last_updated: i64, now_epoch: i64) -> bool {
        now_epoch.saturating_sub(last_updated) <= self.online_threshold_secs
    }

    /// Applies one device's latest record at `now_epoch`.
    pub fn process_device(
        &mut self,
        device_id: &str,
        record: &DeviceRecord,
        now_epoch: i64,
    ) -> DeviceOutcome {
        let Some(last_updated) = record.reported_at() else {
            return DeviceOutcome::Skipped;
        };

        let color = record
            .color()
            .filter(|_| self.is_online(last_updated, now_epoch));
        let Some(color) = color else {
            let previous = self.clear(device_id);
            return DeviceOutcome::Cleared { previous };
        };

        self.scoreboard.entry_mut(color).score += 1;

        let previous = self.previous.insert(device_id.to_string(), color);
        if previous != Some(color) {
            if let Some(prev) = previous {
                self.scoreboard.entry_mut(prev).trees -= 1;
            }
            self.scoreboard.entry_mut(color).trees += 1;
        }
        DeviceOutcome::Counted { color, previous }
    }

    /// Applies every record in `devices` and returns the resulting scoreboard.
    /// The result does not depend on iteration order.
    pub fn process_pass(&mut self, devices: &DeviceStates, now_epoch: i64) -> &Scoreboard {
        for (device_id, record) in devices {
            self.process_device(device_id, record, now_epoch);
        }
        &self.scoreboard
    }

    fn clear(&mut self, device_id: &str) -> Option<Color> {
        let previous = self.previous.remove(device_id);
        if let Some(prev) = previous {
            self.scoreboard.entry_mut(prev).trees -= 1;
        }
        previous
    }
}

