//! Pure navigation state transitions.

use super::event::NavEvent;
use super::menu::{back_keyboard, menu_keyboard};
use super::reply::{Chunk, Reply};
use super::state::NavigationState;
use super::view::{DefaultGuideView, GuideView};
use crate::catalog::Catalog;
use crate::render::ContentRenderer;

/// Next state and the reply to emit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State to store for the conversation
    pub next: NavigationState,
    /// Reply for the transport
    pub reply: Reply,
}

impl Transition {
    fn to(next: NavigationState, reply: Reply) -> Self {
        Self { next, reply }
    }

    fn stay(state: &NavigationState, reply: Reply) -> Self {
        Self::to(state.clone(), reply)
    }
}

/// Resolve `event` against `state`.
///
/// No side effects: the caller stores `next` and hands `reply` to the transport.
#[must_use]
pub fn transition(
    state: &NavigationState,
    event: &NavEvent,
    catalog: &Catalog,
    renderer: &ContentRenderer,
) -> Transition {
    match event {
        NavEvent::Start => Transition::to(
            NavigationState::Menu,
            Reply::Send(vec![Chunk::with_keyboard(
                DefaultGuideView::welcome_message(),
                menu_keyboard(catalog),
            )]),
        ),
        NavEvent::Back => Transition::to(
            NavigationState::Menu,
            Reply::Send(vec![Chunk::with_keyboard(
                DefaultGuideView::menu_prompt(),
                menu_keyboard(catalog),
            )]),
        ),
        NavEvent::SelectSection(id) => match catalog.get(id) {
            Some(section) => Transition::to(
                NavigationState::Viewing(section.id.clone()),
                Reply::Send(section_chunks(renderer.render(&section.body))),
            ),
            None => Transition::stay(
                state,
                Reply::Alert(DefaultGuideView::section_not_found().to_string()),
            ),
        },
        NavEvent::Close => Transition::stay(state, Reply::RemoveUi),
        NavEvent::Other(_) => Transition::stay(
            state,
            Reply::Send(vec![Chunk::with_keyboard(
                DefaultGuideView::fallback_help(),
                back_keyboard(),
            )]),
        ),
    }
}

/// Alert to carry on the acknowledgement of `event`.
///
/// Depends on the catalog only, so it can be answered before the
/// conversation's state is available. Always equals the alert of the
/// [`transition`] reply for the same event.
#[must_use]
pub fn acknowledgement(event: &NavEvent, catalog: &Catalog) -> Option<String> {
    match event {
        NavEvent::SelectSection(id) if catalog.get(id).is_none() => {
            Some(DefaultGuideView::section_not_found().to_string())
        }
        _ => None,
    }
}

/// Wrap rendered texts, putting the back button on the last one.
fn section_chunks(texts: Vec<String>) -> Vec<Chunk> {
    let last = texts.len().saturating_sub(1);
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            if i == last {
                Chunk::with_keyboard(text, back_keyboard())
            } else {
                Chunk::text(text)
            }
        })
        .collect()
}
