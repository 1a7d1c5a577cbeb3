//! Delegated click handling over the message container.
//!
//! A host registers one listener on the stable container and hands each
//! click to the panel as a [`ClickTarget`]: the chain of elements from the
//! clicked node up to (not including) the container. Resolution only looks
//! at classes and the `data-message-id` attribute along that chain, so
//! blocks replaced by a later render stay clickable without re-binding.

use crate::message::MessageId;
use crate::render::{DELETE_CLASS, HIGHLIGHT_CLASS, MESSAGE_CLASS};

/// The parts of a DOM element that click resolution inspects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub classes: Vec<String>,
    /// Value of `data-message-id`, if present.
    pub message_id: Option<MessageId>,
}

impl Element {
    #[must_use]
    pub fn with_class(class: &str) -> Self {
        Self { classes: vec![class.to_owned()], message_id: None }
    }

    #[must_use]
    pub fn message_block(id: MessageId) -> Self {
        Self { classes: vec![MESSAGE_CLASS.to_owned()], message_id: Some(id) }
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Ancestry of a click, innermost element first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickTarget {
    path: Vec<Element>,
}

impl ClickTarget {
    #[must_use]
    pub fn new(path: Vec<Element>) -> Self {
        Self { path }
    }

    /// Click on the delete button of the rendered block for `id`.
    #[must_use]
    pub fn delete_button(id: MessageId) -> Self {
        Self::action_button(DELETE_CLASS, id)
    }

    /// Click on a highlight button inside the rendered block for `id`.
    #[must_use]
    pub fn highlight_button(id: MessageId) -> Self {
        Self::action_button(HIGHLIGHT_CLASS, id)
    }

    fn action_button(class: &str, id: MessageId) -> Self {
        Self::new(vec![
            Element::with_class(class),
            Element::with_class(&format!("{MESSAGE_CLASS}__actions")),
            Element::message_block(id),
        ])
    }

    /// Innermost element of the chain carrying `class`, like `Element.closest`.
    #[must_use]
    pub fn closest(&self, class: &str) -> Option<&Element> {
        self.path.iter().find(|el| el.has_class(class))
    }
}

/// What a delegated click asks the panel to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    Delete(MessageId),
    ToggleHighlight(MessageId),
}

/// Map a click to an action. Clicks outside an affordance, or inside a block
/// with no id, resolve to `None`.
#[must_use]
pub fn resolve(target: &ClickTarget) -> Option<ClickAction> {
    let action: fn(MessageId) -> ClickAction = if target.closest(DELETE_CLASS).is_some() {
        ClickAction::Delete
    } else if target.closest(HIGHLIGHT_CLASS).is_some() {
        ClickAction::ToggleHighlight
    } else {
        return None;
    };
    let id = target.closest(MESSAGE_CLASS)?.message_id.clone()?;
    Some(action(id))
}

#[cfg(test)]
#[path = "delegate_test.rs"]
mod tests;
