//! Menu navigation
//!
//! A conversation is either at the menu or viewing one section. Events are
//! decoded in [`event`], resolved by the pure [`transition`] function and
//! applied by the [`NavigationController`], which owns the per-conversation
//! state and talks to the platform through a [`NavigationTransport`].

/// Navigation controller
pub mod controller;
/// Navigation events and callback payloads
pub mod event;
/// Inline keyboards
pub mod menu;
/// Outgoing replies
pub mod reply;
/// Navigation state
pub mod state;
/// Per-conversation state store
pub mod store;
/// State transition function
pub mod transition;
/// Transport boundary and chunk delivery
pub mod transport;
/// UI texts
pub mod view;

pub use controller::NavigationController;
pub use event::NavEvent;
pub use reply::{Chunk, Reply};
pub use state::NavigationState;
pub use store::{ConversationId, ConversationStore};
pub use transition::{transition, Transition};
pub use transport::{deliver, DeliveryError, NavigationTransport};
pub use view::{DefaultGuideView, GuideView};
