/// Command, message and callback handlers
pub mod handlers;
/// Telegram calls with retry
pub mod resilient;
/// Telegram implementation of the navigation transport
pub mod transport;

pub use handlers::{setup_handler, Command};
pub use transport::TelegramTransport;
