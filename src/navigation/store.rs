//! Per-conversation navigation state
//!
//! Each conversation owns one mutex-guarded `NavigationState`. Holding that
//! mutex is what serialises events of the same conversation; different
//! conversations never contend.
//!
//! A handle that is still referenced outside the store is never dropped, so
//! two events of one conversation can never end up with different mutexes.

use super::state::NavigationState;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Telegram chat id of a conversation.
pub type ConversationId = i64;

/// Shared handle to one conversation's state
pub type SessionHandle = Arc<Mutex<NavigationState>>;

struct Entry {
    handle: SessionHandle,
    last_seen: Instant,
}

impl Entry {
    /// Only the store references the handle.
    fn is_unused(&self) -> bool {
        Arc::strong_count(&self.handle) == 1
    }
}

/// Store of navigation states keyed by conversation id
///
/// Conversations idle for `idle` are dropped by [`sweep`](Self::sweep), and
/// the store keeps at most `max_entries` of them by dropping the least
/// recently used. Both only ever drop unused handles. A dropped
/// conversation simply starts again from `Menu`.
#[derive(Clone)]
pub struct ConversationStore {
    sessions: Arc<std::sync::Mutex<HashMap<ConversationId, Entry>>>,
    idle: Duration,
    max_entries: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(24 * 60 * 60, 100_000)
    }
}

impl ConversationStore {
    /// Creates a new store
    ///
    /// # Arguments
    ///
    /// * `idle_secs` - Seconds without events after which a conversation is forgotten
    /// * `max_entries` - Number of conversations kept before old unused ones are dropped
    ///
    /// # Examples
    ///
    /// ```
    /// use guide_bot::navigation::ConversationStore;
    ///
    /// let store = ConversationStore::new(
    ///     86_400,  // forget after a day of silence
    ///     100_000  // keep about 100k conversations
    /// );
    /// ```
    #[must_use]
    pub fn new(idle_secs: u64, max_entries: u64) -> Self {
        Self {
            sessions: Arc::default(),
            idle: Duration::from_secs(idle_secs),
            max_entries: usize::try_from(max_entries).unwrap_or(usize::MAX).max(1),
        }
    }

    /// The state handle of a conversation, created as `Menu` on first use.
    ///
    /// Every caller gets the same handle for as long as anyone holds it.
    pub fn session(&self, id: ConversationId) -> SessionHandle {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let entry = sessions.entry(id).or_insert_with(|| Entry {
            handle: Arc::new(Mutex::new(NavigationState::default())),
            last_seen: now,
        });
        entry.last_seen = now;
        let handle = entry.handle.clone();

        if sessions.len() > self.max_entries {
            Self::evict_least_recent(&mut sessions, self.max_entries);
        }
        handle
    }

    /// Current state of a conversation without creating it.
    ///
    /// Waits for an in-flight event of that conversation to finish.
    pub async fn snapshot(&self, id: ConversationId) -> Option<NavigationState> {
        let session = {
            let sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            sessions.get(&id)?.handle.clone()
        };
        let state = session.lock().await;
        Some(state.clone())
    }

    /// Drop conversations idle for longer than the idle timeout.
    ///
    /// Returns how many were dropped.
    pub fn sweep(&self) -> usize {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        let idle = self.idle;
        sessions.retain(|_, entry| !entry.is_unused() || entry.last_seen.elapsed() < idle);
        before - sessions.len()
    }

    /// Run [`sweep`](Self::sweep) every `every` until `shutdown` is cancelled.
    #[must_use]
    pub fn spawn_sweeper(&self, every: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let dropped = store.sweep();
                        if dropped > 0 {
                            debug!(dropped, remaining = store.entry_count(), "Idle conversations dropped");
                        }
                    }
                }
            }
        })
    }

    /// Returns the current number of tracked conversations
    ///
    /// Reported by the health endpoint.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn evict_least_recent(sessions: &mut HashMap<ConversationId, Entry>, max_entries: usize) {
        let mut unused: Vec<(Instant, ConversationId)> = sessions
            .iter()
            .filter(|(_, entry)| entry.is_unused())
            .map(|(id, entry)| (entry.last_seen, *id))
            .collect();
        unused.sort_unstable();

        let excess = sessions.len().saturating_sub(max_entries);
        for (_, id) in unused.into_iter().take(excess) {
            sessions.remove(&id);
        }
    }
}
