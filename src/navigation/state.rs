/// Where a conversation currently is
///
/// Only the section id is kept; section data stays in the catalog.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NavigationState {
    /// Looking at the section menu
    #[default]
    Menu,
    /// Reading the section with this id
    Viewing(String),
}

impl NavigationState {
    /// Id of the section being read, if any.
    #[must_use]
    pub fn section_id(&self) -> Option<&str> {
        match self {
            Self::Menu => None,
            Self::Viewing(id) => Some(id),
        }
    }
}
