// Scoreboard as stored in scoreboard.json: {"red": {"score", "trees"}, "green": ..., "blue": ...}

use serde::{Deserialize, Serialize};

use super::Color;

/// Per-color totals. `score` is cumulative; `trees` is the live count of devices holding the color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreboardEntry {
    #[serde(default)]
    pub score: u64,
    #[serde(default)]
    pub trees: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    #[serde(default)]
    pub red: ScoreboardEntry,
    #[serde(default)]
    pub green: ScoreboardEntry,
    #[serde(default)]
    pub blue: ScoreboardEntry,
}

impl Scoreboard {
    pub fn entry(&self, color: Color) -> &ScoreboardEntry {
        match color {
            Color::Red => &self.red,
            Color::Green => &self.green,
            Color::Blue => &self.blue,
        }
    }

    pub fn entry_mut(&mut self, color: Color) -> &mut ScoreboardEntry {
        match color {
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
            Color::Blue => &mut self.blue,
        }
    }

    /// Keeps the cumulative scores and zeroes every live tree count.
    pub fn scores_only(mut self) -> Self {
        for color in Color::ALL {
            self.entry_mut(color).trees = 0;
        }
        self
    }

    pub fn total_trees(&self) -> i64 {
        Color::ALL.iter().map(|&c| self.entry(c).trees).sum()
    }
}
