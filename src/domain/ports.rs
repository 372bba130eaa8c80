use super::payment::PaymentStatus;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// String key-value persistence used for the cart, the card vault and the
/// identity records. Values are opaque to the store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

pub type KeyValueStoreBox = Box<dyn KeyValueStore>;
pub type SharedStore = Arc<dyn KeyValueStore>;

/// One intermediate status of a payment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseUpdate {
    pub status: PaymentStatus,
    pub label: &'static str,
    /// Zero-based phase position.
    pub index: usize,
    pub total: usize,
}

impl PhaseUpdate {
    /// Progress percentage to draw, capped at 90 until the attempt settles.
    pub fn percent(&self) -> u8 {
        let step = 100 / self.total.max(1);
        (step * (self.index + 1)).min(90) as u8
    }
}

/// Receives phase updates while a payment is simulated.
///
/// Called from the simulation task; implementations must return quickly.
pub trait ProgressObserver: Send + Sync {
    fn on_phase(&self, update: &PhaseUpdate);
}

/// Observer that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_phase(&self, _update: &PhaseUpdate) {}
}
