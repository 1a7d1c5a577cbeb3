//! Chat panel synchronizer for a single event.
//!
//! SYSTEM CONTEXT
//! ==============
//! Keeps a rendered message list in sync with the server-held chat log of
//! one event, and lets the participant post and delete messages. The server
//! is reached through [`api::ChatApi`]; the rendering surface (DOM, terminal)
//! through [`view::PanelView`].
//!
//! The panel is a poller: [`scheduler`] refreshes it on a fixed interval and
//! every mutation refreshes it again on success. Each refresh replaces the
//! whole list; see [`render`].

pub mod api;
pub mod config;
pub mod delegate;
pub mod delete;
mod fetch;
pub mod message;
pub mod panel;
pub mod render;
pub mod scheduler;
pub mod submit;
pub mod view;

pub use api::{ApiError, ChatApi, HttpChatApi};
pub use config::{ConfigError, EventId, PanelConfig, RefreshPolicy};
pub use delegate::{ClickAction, ClickTarget, Element};
pub use delete::{ActionError, DeleteOutcome};
pub use message::{Message, MessageId, MessageList};
pub use panel::{Panel, PanelState};
pub use render::{FetchOutcome, PanelContent, render};
pub use scheduler::{SchedulerHandle, spawn_scheduler};
pub use submit::{FormValues, SubmitError};
pub use view::{PanelView, SubmitControl};
