//! In-memory watermark store for tests and ephemeral runs.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::WatermarkStore;
use crate::error::Result;

/// Non-durable store; values live only as long as the process.
#[derive(Default)]
pub struct InMemoryWatermarkStore {
    values: Mutex<HashMap<String, i64>>,
}

impl InMemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WatermarkStore for InMemoryWatermarkStore {
    async fn get(&self, key: &str) -> Result<i64> {
        Ok(self.values.lock().get(key).copied().unwrap_or(0))
    }

    async fn set(&self, key: &str, value: i64) -> Result<()> {
        self.values.lock().insert(key.to_string(), value);
        Ok(())
    }
}
