//! Deleter and highlighter: per-message actions reached from delegated clicks.

use tracing::{debug, info, trace, warn};

use crate::api::ApiError;
use crate::delegate::{ClickAction, ClickTarget, resolve};
use crate::message::MessageId;
use crate::panel::{CONNECTION_ERROR, Panel, SECURITY_ERROR, deletes};

pub const DELETE_PROMPT: &str = "Delete this message?";
/// Alert for a silent server rejection of a delete.
pub const DELETE_FAILED: &str = "Error deleting message";
/// Alert for a silent server rejection of a highlight toggle.
pub const HIGHLIGHT_FAILED: &str = "Error highlighting message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined the confirmation; nothing was sent.
    Declined,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("anti-forgery token missing")]
    MissingToken,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ActionError {
    #[must_use]
    pub fn user_message(&self, rejected_fallback: &str) -> String {
        match self {
            Self::MissingToken => SECURITY_ERROR.to_owned(),
            Self::Api(e) => e.user_message(rejected_fallback, CONNECTION_ERROR),
        }
    }
}

impl Panel {
    /// Entry point for the single click listener on the message container.
    pub async fn handle_click(&self, target: &ClickTarget) {
        match resolve(target) {
            Some(ClickAction::Delete(id)) => {
                if let Err(e) = self.delete(&id).await {
                    debug!(message_id = %id, error = %e, "delete click failed");
                }
            }
            Some(ClickAction::ToggleHighlight(id)) => {
                if let Err(e) = self.toggle_highlight(&id).await {
                    debug!(message_id = %id, error = %e, "highlight click failed");
                }
            }
            None => trace!("click outside a message action"),
        }
    }

    /// Delete one message after the user confirms, then refresh.
    ///
    /// On failure the current rendering is left as it is; the message stays
    /// visible until a later refresh says otherwise.
    ///
    /// # Errors
    ///
    /// Returns the failure after it has been alerted to the user.
    pub async fn delete(&self, id: &MessageId) -> Result<DeleteOutcome, ActionError> {
        if !self.view().confirm(DELETE_PROMPT).await {
            debug!(message_id = %id, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        match self.request_delete(id).await {
            Ok(()) => {
                info!(event_id = %self.event_id(), message_id = %id, "message deleted");
                self.refresh().await;
                Ok(DeleteOutcome::Deleted)
            }
            Err(err) => {
                warn!(message_id = %id, error = %err, "message delete failed");
                self.view().alert(&err.user_message(DELETE_FAILED));
                Err(err)
            }
        }
    }

    async fn request_delete(&self, id: &MessageId) -> Result<(), ActionError> {
        let token = self.view().csrf_token().ok_or(ActionError::MissingToken)?;
        let _in_flight = self.track(deletes);
        self.api().delete_message(id, &token).await?;
        Ok(())
    }

    /// Flip the highlight flag on one message, then refresh. Returns the new
    /// state when the server reports it.
    ///
    /// # Errors
    ///
    /// Returns the failure after it has been alerted to the user.
    pub async fn toggle_highlight(&self, id: &MessageId) -> Result<Option<bool>, ActionError> {
        let result = match self.view().csrf_token() {
            Some(token) => self.api().toggle_highlight(id, &token).await.map_err(ActionError::from),
            None => Err(ActionError::MissingToken),
        };

        match result {
            Ok(highlighted) => {
                info!(message_id = %id, ?highlighted, "message highlight toggled");
                self.refresh().await;
                Ok(highlighted)
            }
            Err(err) => {
                warn!(message_id = %id, error = %err, "message highlight failed");
                self.view().alert(&err.user_message(HIGHLIGHT_FAILED));
                Err(err)
            }
        }
    }
}

#[cfg(test)]
#[path = "delete_test.rs"]
mod tests;
