// Device registry behind the ingestion endpoint: allow-list plus the in-memory copy of
// device_states.json. Every accepted report rewrites the whole file.

use crate::models::{DeviceRecord, DeviceState, DeviceStates};
use crate::store::DeviceStore;
use std::collections::HashSet;
use tokio::sync::Mutex;

pub struct DeviceRegistry {
    allowed: HashSet<String>,
    store: DeviceStore,
    states: Mutex<DeviceStates>,
}

impl DeviceRegistry {
    /// Seeds the in-memory states from the store (empty when missing or malformed).
    pub async fn load(store: DeviceStore, allowed: impl IntoIterator<Item = String>) -> Self {
        let states = store.load_or_empty().await;
        tracing::info!(
            devices_count = states.len(),
            path = %store.path().display(),
            "device states loaded"
        );
        Self {
            allowed: allowed.into_iter().collect(),
            store,
            states: Mutex::new(states),
        }
    }

    pub fn is_known(&self, device_id: &str) -> bool {
        self.allowed.contains(device_id)
    }

    /// Replaces the device's record with `state` reported at `now_epoch`.
    pub async fn record_state(
        &self,
        device_id: &str,
        state: DeviceState,
        now_epoch: i64,
    ) -> anyhow::Result<DeviceRecord> {
        let record = DeviceRecord::new(state.as_str(), now_epoch);
        let mut states = self.states.lock().await;
        states.insert(device_id.to_string(), record.clone());
        self.store.save(&states).await?;
        Ok(record)
    }

    /// Refreshes `last_updated` only; the reported state is left as it was.
    pub async fn record_heartbeat(
        &self,
        device_id: &str,
        now_epoch: i64,
    ) -> anyhow::Result<DeviceRecord> {
        let mut states = self.states.lock().await;
        let record = states.entry(device_id.to_string()).or_default();
        record.last_updated = Some(now_epoch);
        let record = record.clone();
        self.store.save(&states).await?;
        Ok(record)
    }

    pub async fn get(&self, device_id: &str) -> Option<DeviceRecord> {
        self.states.lock().await.get(device_id).cloned()
    }
}
