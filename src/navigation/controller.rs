//! Navigation controller
//!
//! Binds the pure transition function to the conversation store and a
//! transport. Every inbound event goes through [`NavigationController::dispatch`].

use super::event::NavEvent;
use super::reply::Reply;
use super::store::{ConversationId, ConversationStore};
use super::transition::{acknowledgement, transition};
use super::transport::{deliver, DeliveryError, NavigationTransport};
use crate::catalog::Catalog;
use crate::render::ContentRenderer;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Drives per-conversation navigation.
///
/// Cheap to share: the catalog is behind an `Arc` and the store is a shared handle.
pub struct NavigationController {
    catalog: Arc<Catalog>,
    renderer: ContentRenderer,
    store: ConversationStore,
    pacing: Duration,
}

impl NavigationController {
    /// Create a controller.
    ///
    /// `pacing` is the pause between consecutive chunks of one reply.
    #[must_use]
    pub fn new(
        catalog: Arc<Catalog>,
        renderer: ContentRenderer,
        store: ConversationStore,
        pacing: Duration,
    ) -> Self {
        Self {
            catalog,
            renderer,
            store,
            pacing,
        }
    }

    /// Catalog served by this controller
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Conversation states
    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Handle one event of `conversation`.
    ///
    /// The transport is acknowledged exactly once, before the conversation is
    /// locked, so a press is answered even while an earlier reply of the same
    /// conversation is still being delivered. The conversation then stays
    /// locked until this reply is fully delivered, so a second event observes
    /// the state this one left.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError` when a chunk could not be sent. The new state is
    /// already stored at that point and is not rolled back.
    pub async fn dispatch<T>(
        &self,
        transport: &T,
        conversation: ConversationId,
        event: NavEvent,
    ) -> Result<(), DeliveryError>
    where
        T: NavigationTransport + ?Sized,
    {
        if let Err(e) = transport
            .acknowledge(acknowledgement(&event, &self.catalog))
            .await
        {
            warn!(conversation, error = %e, "Failed to acknowledge event");
        }

        let session = self.store.session(conversation);
        let mut state = session.lock().await;

        let step = transition(&state, &event, &self.catalog, &self.renderer);
        debug!(
            conversation,
            event = event.kind(),
            from = ?*state,
            to = ?step.next,
            "Navigation transition"
        );
        *state = step.next;

        match step.reply {
            Reply::Send(chunks) => {
                info!(
                    conversation,
                    section = state.section_id(),
                    chunks = chunks.len(),
                    "Sending reply"
                );
                deliver(transport, &chunks, self.pacing).await
            }
            Reply::RemoveUi => {
                if let Err(e) = transport.remove_ui().await {
                    warn!(conversation, error = %e, "Failed to remove menu message");
                }
                Ok(())
            }
            Reply::Alert(_) => Ok(()),
        }
    }
}
