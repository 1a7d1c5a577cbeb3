//! Submitter: local validation, the send request, and submit-control state.
//!
//! ERROR HANDLING
//! ==============
//! Every failure is shown to the user here, through the view, before it is
//! returned. Callers get the `Result` for their own bookkeeping only; there
//! is nothing left for them to report.

use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::panel::{CONNECTION_ERROR, Panel, SECURITY_ERROR};
use crate::view::SubmitControl;

/// Alert for a silent server rejection of a send.
pub const SEND_FAILED: &str = "Error sending message";

/// Values of the chat form at submission time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    /// Content of the `message` field; `None` when the field is absent.
    pub message: Option<String>,
}

impl FormValues {
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self { message: Some(message.into()) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("message field not found")]
    MissingField,

    #[error("message is empty")]
    Empty,

    #[error("message has {len} characters (max {max})")]
    TooLong { len: usize, max: usize },

    #[error("anti-forgery token missing")]
    MissingToken,

    /// A send is already in flight; the submit control is disabled.
    #[error("a message is already being sent")]
    Busy,

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SubmitError {
    /// Alert text for this failure, or `None` when nothing is shown.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::MissingField => Some("Error: message field not found".to_owned()),
            Self::Empty => Some("Please write a message".to_owned()),
            Self::TooLong { max, .. } => Some(format!("Maximum {max} characters")),
            Self::MissingToken => Some(SECURITY_ERROR.to_owned()),
            Self::Busy => None,
            Self::Api(e) => Some(e.user_message(SEND_FAILED, CONNECTION_ERROR)),
        }
    }
}

/// Trim and check a message before anything touches the network.
///
/// Checks run in order: field present, non-empty after trimming, at most
/// `max_chars` characters after trimming.
///
/// # Errors
///
/// The first check that fails.
pub fn validate_message(raw: Option<&str>, max_chars: usize) -> Result<&str, SubmitError> {
    let message = raw.ok_or(SubmitError::MissingField)?.trim();
    if message.is_empty() {
        return Err(SubmitError::Empty);
    }
    let len = message.chars().count();
    if len > max_chars {
        return Err(SubmitError::TooLong { len, max: max_chars });
    }
    Ok(message)
}

impl Panel {
    /// Validate and send one message, then refresh on success.
    ///
    /// On success the input is cleared and refocused and the new message
    /// appears through the normal refresh; nothing is inserted locally. On
    /// failure the input keeps its content and no refresh happens.
    ///
    /// # Errors
    ///
    /// Returns the failure after it has been alerted to the user.
    pub async fn submit(&self, form: FormValues) -> Result<(), SubmitError> {
        match self.send(&form).await {
            Ok(()) => {
                let view = self.view();
                view.clear_input();
                view.focus_input();
                info!(event_id = %self.event_id(), "message sent");
                self.refresh().await;
                Ok(())
            }
            Err(err) => {
                self.report_submit_error(&err);
                Err(err)
            }
        }
    }

    async fn send(&self, form: &FormValues) -> Result<(), SubmitError> {
        let body = validate_message(form.message.as_deref(), self.max_message_chars())?;
        let token = self.view().csrf_token().ok_or(SubmitError::MissingToken)?;

        let _control = SubmitGuard::engage(self)?;
        self.api().send_message(self.event_id(), &token, body).await?;
        Ok(())
    }

    fn report_submit_error(&self, err: &SubmitError) {
        match err {
            SubmitError::Busy => debug!(event_id = %self.event_id(), "send already in flight; submission ignored"),
            SubmitError::Api(e) => warn!(event_id = %self.event_id(), error = %e, "message send failed"),
            local => debug!(event_id = %self.event_id(), error = %local, "message rejected locally"),
        }
        if let Some(text) = err.user_message() {
            self.view().alert(&text);
        }
        if matches!(err, SubmitError::Empty) {
            self.view().focus_input();
        }
    }
}

// =============================================================================
// SUBMIT CONTROL GUARD
// =============================================================================

/// Holds the submit control disabled for the life of one send. Dropping it
/// restores the original label on every exit path, including cancellation.
struct SubmitGuard<'a> {
    panel: &'a Panel,
    label: String,
}

impl<'a> SubmitGuard<'a> {
    fn engage(panel: &'a Panel) -> Result<Self, SubmitError> {
        {
            let mut state = panel.lock_state();
            if state.send_pending {
                return Err(SubmitError::Busy);
            }
            state.send_pending = true;
        }
        let view = panel.view();
        let label = view.submit_label();
        view.set_submit_control(SubmitControl::Busy);
        Ok(Self { panel, label })
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.panel.lock_state().send_pending = false;
        self.panel
            .view()
            .set_submit_control(SubmitControl::Ready(std::mem::take(&mut self.label)));
    }
}

#[cfg(test)]
#[path = "submit_test.rs"]
mod tests;
