use teloxide::types::InlineKeyboardMarkup;

/// One outgoing message: bounded-length text plus an optional keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Plain message text
    pub text: String,
    /// Keyboard attached to this message
    pub keyboard: Option<InlineKeyboardMarkup>,
}

impl Chunk {
    /// Text-only chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// Chunk carrying a keyboard.
    pub fn with_keyboard(text: impl Into<String>, keyboard: InlineKeyboardMarkup) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// What the transport has to do in answer to a navigation event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Send these chunks in order
    Send(Vec<Chunk>),
    /// Show a transient alert on the acknowledgement, send nothing
    Alert(String),
    /// Remove the message the event came from
    RemoveUi,
}

impl Reply {
    /// Alert text to carry on the acknowledgement, if any.
    #[must_use]
    pub fn alert(&self) -> Option<&str> {
        match self {
            Self::Alert(text) => Some(text),
            Self::Send(_) | Self::RemoveUi => None,
        }
    }
}
