//! The host surface the panel draws into.
//!
//! SYSTEM CONTEXT
//! ==============
//! In a browser this is the DOM: the message container, the count badge, the
//! chat form, `alert` and `confirm`. The terminal host in `main.rs` prints
//! instead. The panel never holds host state of its own; in particular the
//! anti-forgery token is read through [`PanelView::csrf_token`] right before
//! each mutating request so a rotated token is picked up.

use crate::render::PanelContent;

/// Busy label shown on the submit control while a send is in flight.
pub const SENDING_LABEL: &str = "Sending...";

/// State of the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitControl {
    /// Disabled, showing a busy indicator.
    Busy,
    /// Enabled, showing `label`.
    Ready(String),
}

/// Callbacks never run under the panel's state lock, so an implementation
/// may call back into `Panel::state`. Content and count
/// writes from one fetch are never interleaved with another fetch's.
#[async_trait::async_trait]
pub trait PanelView: Send + Sync {
    /// Replace the whole message subtree.
    fn replace_content(&self, content: &PanelContent);

    fn set_count(&self, count: usize);

    /// Scroll the message container so the newest message is visible.
    fn scroll_to_end(&self);

    /// Blocking, user-visible notice.
    fn alert(&self, message: &str);

    /// Ask the user to confirm a destructive action.
    async fn confirm(&self, prompt: &str) -> bool;

    /// Current anti-forgery token from the rendered form, if any.
    fn csrf_token(&self) -> Option<String>;

    fn clear_input(&self);

    fn focus_input(&self);

    /// Current label of the submit control, restored after a send.
    fn submit_label(&self) -> String;

    fn set_submit_control(&self, state: SubmitControl);
}
