//! Process-lifetime record of scan service responses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

/// One recorded response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredResult {
    /// Operation that produced the result, e.g. `"full_scan"`
    pub route: String,
    pub result: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only result list shared by concurrent requests
#[derive(Debug, Default)]
pub struct ScanResultStore {
    results: RwLock<Vec<StoredResult>>,
}

impl ScanResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn append(&self, route: &str, result: serde_json::Value) {
        let entry = StoredResult {
            route: route.to_string(),
            result,
            recorded_at: Utc::now(),
        };
        self.results.write().await.push(entry);
    }

    /// Snapshot of every stored result in insertion order
    pub async fn list_all(&self) -> Vec<StoredResult> {
        self.results.read().await.clone()
    }

    pub async fn clear(&self) {
        self.results.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.results.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.results.read().await.is_empty()
    }
}
