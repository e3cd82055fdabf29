// Domain models: device reports in, scoreboard out

mod device;
mod scoreboard;

pub use device::{Color, DeviceRecord, DeviceState, DeviceStates};
pub use scoreboard::{Scoreboard, ScoreboardEntry};
