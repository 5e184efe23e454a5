pub mod telegram;

use anyhow::Result;

/// Best-effort outbound messaging. Delivery faults are logged by callers
/// and never abort a run.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}
