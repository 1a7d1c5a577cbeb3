//! Chat message model and the wire shapes of the `/chat/` endpoints.
//!
//! DESIGN
//! ======
//! Messages are immutable once fetched. The client never merges or patches a
//! list: every successful fetch yields a fresh `MessageList` that replaces the
//! previous one wholesale.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Server-assigned message identifier.
///
/// Opaque to the client. Numeric ids on the wire are kept in their decimal
/// form so they round-trip into URLs and `data-message-id` attributes as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for MessageId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl<'de> Deserialize<'de> for MessageId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

// =============================================================================
// MESSAGE
// =============================================================================

/// One chat message as served by `GET /chat/{event_id}/messages/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub id: MessageId,
    /// Author name. Pre-sanitized by the server.
    pub display_name: String,
    /// Display-formatted timestamp ("5 minutes ago"). Pre-sanitized by the server.
    pub created_at: String,
    /// Untrusted user text. Always rendered as text, never as markup.
    #[serde(rename = "message")]
    pub body: String,
    /// Rendering hint only; the server re-authorizes every delete.
    #[serde(default)]
    pub can_delete: bool,
    #[serde(default)]
    pub is_highlighted: bool,
}

/// Messages in server (chronological) order.
pub type MessageList = Vec<Message>;

// =============================================================================
// WIRE RESPONSES
// =============================================================================

/// Body of the list endpoint. `messages` may be absent or null on an empty log.
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    #[serde(default)]
    pub messages: Option<MessageList>,
}

/// Body of the send, delete and highlight endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Per-field form errors, returned by the send endpoint on validation failure.
    #[serde(default)]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
    /// New highlight state, returned by the highlight endpoint.
    #[serde(default)]
    pub is_highlighted: Option<bool>,
}

impl MutationResponse {
    /// The most specific server-provided reason for a rejection.
    ///
    /// Prefers `error`; otherwise the first message of the first field error.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<String> {
        if let Some(error) = self.error.as_deref().filter(|e| !e.trim().is_empty()) {
            return Some(error.to_owned());
        }
        self.errors
            .as_ref()?
            .values()
            .flat_map(|messages| messages.iter())
            .find(|m| !m.trim().is_empty())
            .cloned()
    }
}

#[cfg(test)]
#[path = "message_test.rs"]
mod tests;
