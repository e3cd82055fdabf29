// Active window: the aggregation worker only scores inside a weekday range and a
// time-of-day range, both inclusive. Times compare at minute resolution.

use chrono::{DateTime, Datelike, Local, NaiveDateTime, NaiveTime, Timelike, Weekday};

const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWindow {
    pub first_weekday: Weekday,
    pub last_weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl Default for ActiveWindow {
    /// Monday to Friday, 08:00 to 22:30.
    fn default() -> Self {
        Self {
            first_weekday: Weekday::Mon,
            last_weekday: Weekday::Fri,
            start: NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(22, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl ActiveWindow {
    /// Build from config strings: weekday names ("Mon", "friday") and "HH:MM" times.
    pub fn parse(
        first_weekday: &str,
        last_weekday: &str,
        start: &str,
        end: &str,
    ) -> anyhow::Result<Self> {
        let first_weekday = first_weekday
            .parse::<Weekday>()
            .map_err(|_| anyhow::anyhow!("invalid weekday: {:?}", first_weekday))?;
        let last_weekday = last_weekday
            .parse::<Weekday>()
            .map_err(|_| anyhow::anyhow!("invalid weekday: {:?}", last_weekday))?;
        let start = NaiveTime::parse_from_str(start, TIME_FORMAT)
            .map_err(|e| anyhow::anyhow!("invalid time {:?} (expected HH:MM): {}", start, e))?;
        let end = NaiveTime::parse_from_str(end, TIME_FORMAT)
            .map_err(|e| anyhow::anyhow!("invalid time {:?} (expected HH:MM): {}", end, e))?;
        anyhow::ensure!(
            start <= end,
            "window start {} is after window end {}",
            start.format(TIME_FORMAT),
            end.format(TIME_FORMAT)
        );
        Ok(Self {
            first_weekday,
            last_weekday,
            start,
            end,
        })
    }

    /// True when `at` (local wall clock) falls inside the window.
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.contains_weekday(at.weekday()) && self.contains_time(at.time())
    }

    fn contains_weekday(&self, day: Weekday) -> bool {
        let day = day.num_days_from_monday();
        let first = self.first_weekday.num_days_from_monday();
        let last = self.last_weekday.num_days_from_monday();
        if first <= last {
            (first..=last).contains(&day)
        } else {
            // Wraps over the weekend, e.g. Fri..Mon.
            day >= first || day <= last
        }
    }

    fn contains_time(&self, time: NaiveTime) -> bool {
        let Some(minute) = NaiveTime::from_hms_opt(time.hour(), time.minute(), 0) else {
            return false;
        };
        self.start <= minute && minute <= self.end
    }
}

/// One instant seen two ways: local wall clock for the window gate, epoch seconds
/// for heartbeat age.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTime {
    pub local: NaiveDateTime,
    pub epoch: i64,
}

impl PassTime {
    pub fn now() -> Self {
        Self::from_local(Local::now())
    }

    pub fn from_local(now: DateTime<Local>) -> Self {
        Self {
            local: now.naive_local(),
            epoch: now.timestamp(),
        }
    }

    pub fn at(local: NaiveDateTime, epoch: i64) -> Self {
        Self { local, epoch }
    }
}
