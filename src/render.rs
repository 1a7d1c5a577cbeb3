//! Pure projection from the latest fetch result to panel content.
//!
//! DESIGN
//! ======
//! The panel is never patched: every completed fetch is rendered from
//! scratch by [`render`] and the host replaces the whole message subtree with
//! the result. Keeping this a pure function is what makes overlapping
//! refreshes harmless; rendering the same list twice yields the same content.

use crate::message::{MessageId, MessageList};

/// Class of one rendered message block. Delegated clicks look for it.
pub const MESSAGE_CLASS: &str = "chat-message";
/// Class of the delete affordance inside a message block.
pub const DELETE_CLASS: &str = "delete-message";
/// Class of the highlight affordance hosts may add for event creators.
pub const HIGHLIGHT_CLASS: &str = "highlight-message";
/// Attribute carrying the message id on each block.
pub const MESSAGE_ID_ATTR: &str = "data-message-id";

pub const EMPTY_TEXT: &str = "No messages yet";
pub const EMPTY_HINT: &str = "Be the first to write!";
pub const ERROR_TEXT: &str = "Error loading messages";
pub const DELETE_LABEL: &str = "Delete";

/// Result of one list request, as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Loaded(MessageList),
    Failed,
}

/// One rendered message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    pub id: MessageId,
    pub display_name: String,
    pub created_at: String,
    /// Raw user text. Escaped by [`PanelContent::to_html`].
    pub body: String,
    pub deletable: bool,
    pub highlighted: bool,
}

/// Everything the message subtree shows after one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelContent {
    /// One block per message, in server order. Never empty.
    Messages(Vec<MessageBlock>),
    Empty,
    Error,
}

impl PanelContent {
    /// Count to display, or `None` when the displayed count must stay as-is.
    #[must_use]
    pub fn count(&self) -> Option<usize> {
        match self {
            Self::Messages(blocks) => Some(blocks.len()),
            Self::Empty => Some(0),
            Self::Error => None,
        }
    }

    /// Markup for a browser host. Body text is escaped; display name and
    /// timestamp are trusted server output and inserted as-is.
    #[must_use]
    pub fn to_html(&self) -> String {
        match self {
            Self::Messages(blocks) => {
                let mut html = String::new();
                for block in blocks {
                    write_block(&mut html, block);
                }
                html
            }
            Self::Empty => format!(
                "<div class=\"chat-empty\"><p>{EMPTY_TEXT}</p><small>{EMPTY_HINT}</small></div>"
            ),
            Self::Error => format!("<div class=\"chat-error\" role=\"alert\">{ERROR_TEXT}</div>"),
        }
    }
}

/// Project a fetch result onto panel content.
#[must_use]
pub fn render(outcome: &FetchOutcome) -> PanelContent {
    match outcome {
        FetchOutcome::Failed => PanelContent::Error,
        FetchOutcome::Loaded(messages) if messages.is_empty() => PanelContent::Empty,
        FetchOutcome::Loaded(messages) => PanelContent::Messages(
            messages
                .iter()
                .map(|m| MessageBlock {
                    id: m.id.clone(),
                    display_name: m.display_name.clone(),
                    created_at: m.created_at.clone(),
                    body: m.body.clone(),
                    deletable: m.can_delete,
                    highlighted: m.is_highlighted,
                })
                .collect(),
        ),
    }
}

fn write_block(html: &mut String, block: &MessageBlock) {
    let class = if block.highlighted {
        format!("{MESSAGE_CLASS} {MESSAGE_CLASS}--highlighted")
    } else {
        MESSAGE_CLASS.to_owned()
    };
    html.push_str(&format!(
        "<div class=\"{class}\" {MESSAGE_ID_ATTR}=\"{id}\">\
         <div class=\"{MESSAGE_CLASS}__header\">\
         <strong class=\"{MESSAGE_CLASS}__author\">{name}</strong>\
         <small class=\"{MESSAGE_CLASS}__time\">{time}</small>\
         </div>\
         <div class=\"message-content\">{body}</div>",
        id = escape_html(block.id.as_str()),
        name = block.display_name,
        time = block.created_at,
        body = escape_html(&block.body),
    ));
    if block.deletable {
        html.push_str(&format!(
            "<div class=\"{MESSAGE_CLASS}__actions\"><button type=\"button\" class=\"{DELETE_CLASS}\">{DELETE_LABEL}</button></div>"
        ));
    }
    html.push_str("</div>");
}

/// Escape text so it can never be interpreted as markup, in element content
/// or in a quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
