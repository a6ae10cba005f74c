//! Transport abstraction and ordered chunk delivery.

use super::reply::Chunk;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Messaging boundary used by the navigation controller.
///
/// One instance is bound to a single inbound event (its chat, its originating
/// message and, for inline buttons, its callback).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NavigationTransport: Send + Sync {
    /// Send one chunk and wait until the platform accepted it.
    async fn send_chunk(&self, chunk: &Chunk) -> Result<()>;

    /// Remove the UI element the event originated from.
    async fn remove_ui(&self) -> Result<()>;

    /// Acknowledge the inbound event, optionally with a transient alert.
    ///
    /// Called exactly once per event.
    async fn acknowledge(&self, alert: Option<String>) -> Result<()>;
}

/// Errors from delivering a chunk sequence
#[derive(Error, Debug)]
pub enum DeliveryError {
    /// A send failed; the remaining chunks were not sent
    #[error("delivery aborted after {sent} of {total} chunks: {reason}")]
    Aborted {
        /// Chunks delivered before the failure
        sent: usize,
        /// Chunks in the sequence
        total: usize,
        /// Failure reported by the transport
        reason: String,
    },
}

/// Send `chunks` in order, pausing `pacing` between consecutive sends.
///
/// Each send is awaited before the next one starts. The first failure stops
/// the sequence.
///
/// # Errors
///
/// Returns `DeliveryError::Aborted` if a send fails.
pub async fn deliver<T>(transport: &T, chunks: &[Chunk], pacing: Duration) -> Result<(), DeliveryError>
where
    T: NavigationTransport + ?Sized,
{
    let total = chunks.len();
    for (sent, chunk) in chunks.iter().enumerate() {
        if sent > 0 && !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
        if let Err(e) = transport.send_chunk(chunk).await {
            warn!(sent, total, error = %e, "Chunk send failed, dropping the rest of the sequence");
            return Err(DeliveryError::Aborted {
                sent,
                total,
                reason: e.to_string(),
            });
        }
    }
    debug!(total, "Chunk sequence delivered");
    Ok(())
}
