//! Guide UI texts
//!
//! Contains the messages and button labels shown by the navigation flow.

// ─────────────────────────────────────────────────────────────────────────────
// Trait definition
// ─────────────────────────────────────────────────────────────────────────────

/// Trait for guide UI text rendering
///
/// Provides all texts and labels used by menu navigation.
pub trait GuideView {
    /// Greeting shown with the menu on `/start`
    fn welcome_message() -> &'static str;

    /// Prompt shown with the menu when returning from a section
    fn menu_prompt() -> &'static str;

    /// Transient alert for an unknown section id
    fn section_not_found() -> &'static str;

    /// Reply to anything that is not a navigation request
    fn fallback_help() -> &'static str;

    /// Label of the button leading back to the menu
    fn back_label() -> &'static str;

    /// Label of the button closing the menu
    fn close_label() -> &'static str;
}

// ─────────────────────────────────────────────────────────────────────────────
// Default implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Default English implementation of `GuideView`
pub struct DefaultGuideView;

impl GuideView for DefaultGuideView {
    fn welcome_message() -> &'static str {
        "🎯 Welcome to the guide!\n\nPick a section below to start reading."
    }

    fn menu_prompt() -> &'static str {
        "📚 Choose a section:"
    }

    fn section_not_found() -> &'static str {
        "⚠️ Section not found"
    }

    fn fallback_help() -> &'static str {
        "🤔 I only understand the menu buttons.\n\nSend /start or tap the button below to open the menu."
    }

    fn back_label() -> &'static str {
        "⬅️ Back to menu"
    }

    fn close_label() -> &'static str {
        "❌ Close"
    }
}
