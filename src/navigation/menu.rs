//! Inline keyboards derived from the catalog.

use super::event::{section_callback_data, CALLBACK_BACK, CALLBACK_CLOSE};
use super::view::{DefaultGuideView, GuideView};
use crate::catalog::Catalog;
use crate::utils::truncate_str;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Longest button label taken from a section title, in characters.
pub const MENU_LABEL_MAX_CHARS: usize = 64;

/// Build the section menu: one row per section in catalog order, then Close.
///
/// A pure function of the catalog; equal catalogs give equal keyboards.
///
/// # Examples
///
/// ```
/// use guide_bot::catalog::Catalog;
/// use guide_bot::navigation::menu::menu_keyboard;
/// let keyboard = menu_keyboard(&Catalog::default());
/// assert_eq!(keyboard.inline_keyboard.len(), 1);
/// ```
#[must_use]
pub fn menu_keyboard(catalog: &Catalog) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = catalog
        .all()
        .iter()
        .map(|section| {
            vec![InlineKeyboardButton::callback(
                truncate_str(&section.title, MENU_LABEL_MAX_CHARS),
                section_callback_data(&section.id),
            )]
        })
        .collect();
    rows.push(vec![InlineKeyboardButton::callback(
        DefaultGuideView::close_label(),
        CALLBACK_CLOSE,
    )]);
    InlineKeyboardMarkup::new(rows)
}

/// Single "back to menu" button, attached to the last chunk of a section
/// and to the help prompt.
#[must_use]
pub fn back_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        DefaultGuideView::back_label(),
        CALLBACK_BACK,
    )]])
}
