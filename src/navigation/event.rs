//! Navigation events and the inline callback payload codec.
//!
//! Raw callback strings are decoded here, once, at the transport boundary.

/// Callback payload of the "back to menu" button
pub const CALLBACK_BACK: &str = "back";
/// Callback payload of the "close" button
pub const CALLBACK_CLOSE: &str = "close";
/// Prefix of a section callback payload: `section:<id>`
pub const CALLBACK_SECTION_PREFIX: &str = "section:";

/// Maximum callback payload size accepted by Telegram, in bytes.
pub const TELEGRAM_CALLBACK_DATA_LIMIT: usize = 64;

/// A discrete user request driving the navigation state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    /// Show the menu from scratch
    Start,
    /// Open the section with this id
    SelectSection(String),
    /// Return to the menu
    Back,
    /// Remove the displayed keyboard message
    Close,
    /// Anything that is not a recognised navigation request
    Other(String),
}

impl NavEvent {
    /// Decode an inline button payload. Unknown payloads become `Other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use guide_bot::navigation::NavEvent;
    /// assert_eq!(NavEvent::from_callback_data("back"), NavEvent::Back);
    /// assert_eq!(
    ///     NavEvent::from_callback_data("section:atlas"),
    ///     NavEvent::SelectSection("atlas".to_string())
    /// );
    /// ```
    #[must_use]
    pub fn from_callback_data(data: &str) -> Self {
        match data {
            CALLBACK_BACK => Self::Back,
            CALLBACK_CLOSE => Self::Close,
            _ => match data.strip_prefix(CALLBACK_SECTION_PREFIX) {
                Some(id) if !id.is_empty() => Self::SelectSection(id.to_string()),
                _ => Self::Other(data.to_string()),
            },
        }
    }

    /// Free text typed by the user.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::Other(text.to_string())
    }

    /// Short name for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectSection(_) => "select_section",
            Self::Back => "back",
            Self::Close => "close",
            Self::Other(_) => "other",
        }
    }
}

/// Encode the callback payload that opens a section.
#[must_use]
pub fn section_callback_data(id: &str) -> String {
    format!("{CALLBACK_SECTION_PREFIX}{id}")
}
