use serde::Deserialize;

use crate::engine::DEFAULT_ONLINE_THRESHOLD_SECS;
use crate::schedule::ActiveWindow;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub ingest: IngestConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub aggregation: AggregationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub device_states_path: String,
    pub scoreboard_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Shared secret expected in the X-API-KEY header.
    pub api_key: String,
    /// Device ids accepted by the ingestion endpoint.
    pub device_ids: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_dir")]
    pub dir: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dir: default_dashboard_dir(),
        }
    }
}

fn default_dashboard_dir() -> String {
    "html".into()
}

/// When the worker writes scoreboard.json during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistMode {
    /// After every device, with `device_delay_ms` between devices.
    #[default]
    PerDevice,
    /// Once at the end of each pass.
    PerPass,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    pub online_threshold_secs: u64,
    pub device_delay_ms: u64,
    pub pass_delay_ms: u64,
    pub persist: PersistMode,
    pub first_weekday: String,
    pub last_weekday: String,
    /// "HH:MM", inclusive.
    pub window_start: String,
    /// "HH:MM", inclusive.
    pub window_end: String,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            online_threshold_secs: DEFAULT_ONLINE_THRESHOLD_SECS,
            device_delay_ms: 400,
            pass_delay_ms: 400,
            persist: PersistMode::PerDevice,
            first_weekday: "Mon".into(),
            last_weekday: "Fri".into(),
            window_start: "08:00".into(),
            window_end: "22:30".into(),
        }
    }
}

impl AggregationConfig {
    pub fn active_window(&self) -> anyhow::Result<ActiveWindow> {
        ActiveWindow::parse(
            &self.first_weekday,
            &self.last_weekday,
            &self.window_start,
            &self.window_end,
        )
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("read config {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.storage.device_states_path.is_empty(),
            "storage.device_states_path must be non-empty"
        );
        anyhow::ensure!(
            !self.storage.scoreboard_path.is_empty(),
            "storage.scoreboard_path must be non-empty"
        );
        anyhow::ensure!(
            self.storage.device_states_path != self.storage.scoreboard_path,
            "storage.device_states_path and storage.scoreboard_path must differ"
        );
        anyhow::ensure!(
            !self.ingest.api_key.is_empty(),
            "ingest.api_key must be non-empty"
        );
        anyhow::ensure!(
            !self.ingest.device_ids.is_empty(),
            "ingest.device_ids must list at least one device"
        );
        anyhow::ensure!(
            self.ingest.device_ids.iter().all(|id| !id.is_empty()),
            "ingest.device_ids must not contain empty ids"
        );
        anyhow::ensure!(
            !self.dashboard.dir.is_empty(),
            "dashboard.dir must be non-empty"
        );
        anyhow::ensure!(
            self.aggregation.online_threshold_secs > 0,
            "aggregation.online_threshold_secs must be > 0, got {}",
            self.aggregation.online_threshold_secs
        );
        self.aggregation
            .active_window()
            .map_err(|e| anyhow::anyhow!("aggregation window: {}", e))?;
        Ok(())
    }
}
