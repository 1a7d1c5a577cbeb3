//! HTTP client for the event chat endpoints.
//!
//! DESIGN
//! ======
//! `ChatApi` is the seam between the panel and the server: the panel only
//! ever talks to `Arc<dyn ChatApi>`, so tests swap in scripted fakes and the
//! binary plugs in `HttpChatApi`. Response parsing lives in pure functions
//! (`parse_list`, `parse_mutation`) for testability.
//!
//! ERROR HANDLING
//! ==============
//! Every failure mode the panel distinguishes maps to one `ApiError` variant:
//! transport, non-2xx status, undecodable body, and `success: false`. A
//! rejection carries the server's reason when it sent one.
//!
//! The list endpoint checks the status before parsing. Mutations read the
//! body first: a non-2xx reply with `success: false` in it is a rejection,
//! so the server's reason reaches the user instead of a connection error.

use std::time::Duration;

use reqwest::Url;
use reqwest::header::COOKIE;
use reqwest::multipart::Form;
use tracing::debug;

use crate::config::{ConfigError, EventId};
use crate::message::{ListResponse, MessageId, MessageList, MutationResponse};

/// Form field Django reads the anti-forgery token from.
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";
/// Header carrying the same token, accepted as an alternative by the server.
pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect, TLS, body read).
    #[error("http request failed: {0}")]
    Transport(String),

    #[error("server returned HTTP {status}")]
    Status { status: u16 },

    #[error("response parse failed: {0}")]
    Decode(String),

    /// The server answered `success: false`.
    #[error("server rejected request: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    #[error("cannot build endpoint URL from base {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Text to show the user: the server's reason for a rejection, the
    /// caller's fallback for a silent rejection, or `connection_error` for
    /// anything that went wrong below the application layer.
    #[must_use]
    pub fn user_message(&self, rejected_fallback: &str, connection_error: &str) -> String {
        match self {
            Self::Rejected(Some(reason)) => reason.clone(),
            Self::Rejected(None) => rejected_fallback.to_owned(),
            Self::Transport(_) | Self::Status { .. } | Self::Decode(_) | Self::InvalidUrl(_) => {
                connection_error.to_owned()
            }
        }
    }
}

// =============================================================================
// CHAT API TRAIT
// =============================================================================

/// The three (plus highlight) request/response exchanges the panel needs.
#[async_trait::async_trait]
pub trait ChatApi: Send + Sync {
    /// All current messages for `event_id`, in server order.
    ///
    /// # Errors
    ///
    /// Any transport, status, decode or `success: false` failure.
    async fn list_messages(&self, event_id: &EventId) -> Result<MessageList, ApiError>;

    /// Post `body` to the event's chat.
    ///
    /// # Errors
    ///
    /// Any transport, status or decode failure, or a server rejection.
    async fn send_message(&self, event_id: &EventId, csrf_token: &str, body: &str) -> Result<(), ApiError>;

    /// Remove one message.
    ///
    /// # Errors
    ///
    /// Any transport, status or decode failure, or a server rejection.
    async fn delete_message(&self, message_id: &MessageId, csrf_token: &str) -> Result<(), ApiError>;

    /// Flip the highlight flag on one message, returning the new state when
    /// the server reports it.
    ///
    /// # Errors
    ///
    /// Any transport, status or decode failure, or a server rejection.
    async fn toggle_highlight(&self, message_id: &MessageId, csrf_token: &str) -> Result<Option<bool>, ApiError>;
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

pub struct HttpChatApi {
    http: reqwest::Client,
    base_url: Url,
    cookie: Option<String>,
}

impl HttpChatApi {
    /// # Errors
    ///
    /// Returns an error if `base_url` is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, request_timeout: Option<Duration>, cookie: Option<String>) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ConfigError::HttpClientBuild(e.to_string()))?;

        Ok(Self { http, base_url, cookie })
    }

    /// `base_url` joined with `segments`, with a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn with_cookie(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.cookie {
            Some(cookie) => request.header(COOKIE, cookie),
            None => request,
        }
    }

    async fn post_form(&self, url: Url, csrf_token: &str, form: Form) -> Result<MutationResponse, ApiError> {
        debug!(%url, "chat POST");
        let request = self
            .http
            .post(url)
            .header(CSRF_HEADER, csrf_token)
            .multipart(form.text(CSRF_FIELD, csrf_token.to_owned()));
        let response = self
            .with_cookie(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(failed_mutation(status.as_u16(), &text));
        }
        parse_mutation(&text)
    }
}

#[async_trait::async_trait]
impl ChatApi for HttpChatApi {
    async fn list_messages(&self, event_id: &EventId) -> Result<MessageList, ApiError> {
        let url = self.endpoint(&["chat", event_id.as_str(), "messages"])?;
        debug!(%url, "chat GET");
        let response = self
            .with_cookie(self.http.get(url))
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let text = read_body(response).await?;
        parse_list(&text)
    }

    async fn send_message(&self, event_id: &EventId, csrf_token: &str, body: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["chat", event_id.as_str(), "send"])?;
        let form = Form::new().text("message", body.to_owned());
        self.post_form(url, csrf_token, form).await?;
        Ok(())
    }

    async fn delete_message(&self, message_id: &MessageId, csrf_token: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["chat", "message", message_id.as_str(), "delete"])?;
        self.post_form(url, csrf_token, Form::new()).await?;
        Ok(())
    }

    async fn toggle_highlight(&self, message_id: &MessageId, csrf_token: &str) -> Result<Option<bool>, ApiError> {
        let url = self.endpoint(&["chat", "message", message_id.as_str(), "highlight"])?;
        let response = self.post_form(url, csrf_token, Form::new()).await?;
        Ok(response.is_highlighted)
    }
}

// =============================================================================
// PARSING
// =============================================================================

async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status { status: status.as_u16() });
    }
    response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))
}

pub(crate) fn parse_list(json: &str) -> Result<MessageList, ApiError> {
    let response: ListResponse = serde_json::from_str(json).map_err(|e| ApiError::Decode(e.to_string()))?;
    if !response.success {
        return Err(ApiError::Rejected(None));
    }
    Ok(response.messages.unwrap_or_default())
}

/// Error for a mutation answered with a non-2xx status. The server still
/// uses the usual envelope for permission and validation failures, so its
/// reason wins over the bare status when the body carries one.
pub(crate) fn failed_mutation(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<MutationResponse>(body) {
        Ok(response) if !response.success => ApiError::Rejected(response.rejection_reason()),
        _ => ApiError::Status { status },
    }
}

pub(crate) fn parse_mutation(json: &str) -> Result<MutationResponse, ApiError> {
    let response: MutationResponse = serde_json::from_str(json).map_err(|e| ApiError::Decode(e.to_string()))?;
    if !response.success {
        return Err(ApiError::Rejected(response.rejection_reason()));
    }
    Ok(response)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
