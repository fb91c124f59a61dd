//! Paced fragment delivery over a chat transport.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use planbot_shared::Result;

/// Default pause between consecutive fragments.
pub const DEFAULT_PACING: Duration = Duration::from_millis(500);

/// A sink that can deliver one message to the end user.
///
/// Production uses a chat API; the CLI prints to stdout; tests record.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, text: &str) -> Result<()>;
}

/// Delivery knobs.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryOptions {
    /// Pause inserted between fragments, never before the first one.
    pub pacing: Duration,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
        }
    }
}

/// Send fragments in order, pausing between consecutive sends.
///
/// A send failure aborts the remainder: partial delivery of an answer is
/// better than delivering its fragments out of order later.
pub async fn deliver(
    transport: &dyn ChatTransport,
    fragments: &[String],
    options: DeliveryOptions,
) -> Result<()> {
    for (index, fragment) in fragments.iter().enumerate() {
        if index > 0 && !options.pacing.is_zero() {
            tokio::time::sleep(options.pacing).await;
        }
        if let Err(e) = transport.send(fragment).await {
            warn!(index, error = %e, "fragment delivery failed, dropping the rest");
            return Err(e);
        }
        debug!(index, chars = fragment.chars().count(), "fragment delivered");
    }
    Ok(())
}
