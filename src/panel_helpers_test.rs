//! Scripted `ChatApi` and recording `PanelView` shared by the panel tests.

use super::*;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::oneshot;

use crate::api::ApiError;
use crate::message::{Message, MessageId, MessageList};
use crate::render::PanelContent;
use crate::view::SubmitControl;

pub const TOKEN: &str = "tok-1";
pub const LABEL: &str = "Send";

// =============================================================================
// Reply
// =============================================================================

/// How the fake server answers one request.
pub enum Reply<T> {
    Now(Result<T, ApiError>),
    /// Answer when the test sends on the paired gate.
    Gated(oneshot::Receiver<Result<T, ApiError>>),
    /// Never answer.
    Hang,
}

impl<T> Reply<T> {
    async fn resolve(self) -> Result<T, ApiError> {
        match self {
            Reply::Now(result) => result,
            Reply::Gated(rx) => rx
                .await
                .unwrap_or_else(|_| Err(ApiError::Transport("gate dropped".into()))),
            Reply::Hang => std::future::pending().await,
        }
    }
}

/// A reply that resolves when the returned sender fires.
pub fn gate<T>() -> (oneshot::Sender<Result<T, ApiError>>, Reply<T>) {
    let (tx, rx) = oneshot::channel();
    (tx, Reply::Gated(rx))
}

// =============================================================================
// FakeApi
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    List(String),
    Send { event_id: String, token: String, body: String },
    Delete { id: MessageId, token: String },
    Highlight { id: MessageId, token: String },
}

/// Answers from per-endpoint queues; an empty queue answers success (an
/// empty list for reads).
#[derive(Default)]
pub struct FakeApi {
    lists: Mutex<VecDeque<Reply<MessageList>>>,
    sends: Mutex<VecDeque<Reply<()>>>,
    deletes: Mutex<VecDeque<Reply<()>>>,
    highlights: Mutex<VecDeque<Reply<Option<bool>>>>,
    calls: Mutex<Vec<ApiCall>>,
}

impl FakeApi {
    pub fn push_list(&self, reply: Reply<MessageList>) {
        self.lists.lock().unwrap().push_back(reply);
    }

    pub fn push_list_ok(&self, messages: MessageList) {
        self.push_list(Reply::Now(Ok(messages)));
    }

    pub fn push_send(&self, reply: Reply<()>) {
        self.sends.lock().unwrap().push_back(reply);
    }

    pub fn push_delete(&self, reply: Reply<()>) {
        self.deletes.lock().unwrap().push_back(reply);
    }

    pub fn push_highlight(&self, reply: Reply<Option<bool>>) {
        self.highlights.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ApiCall::List(_)))
            .count()
    }

    fn record(&self, call: ApiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn next<T>(queue: &Mutex<VecDeque<Reply<T>>>, default: impl FnOnce() -> T) -> Reply<T> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Reply::Now(Ok(default())))
}

#[async_trait::async_trait]
impl ChatApi for FakeApi {
    async fn list_messages(&self, event_id: &EventId) -> Result<MessageList, ApiError> {
        self.record(ApiCall::List(event_id.to_string()));
        next(&self.lists, Vec::new).resolve().await
    }

    async fn send_message(&self, event_id: &EventId, csrf_token: &str, body: &str) -> Result<(), ApiError> {
        self.record(ApiCall::Send { event_id: event_id.to_string(), token: csrf_token.to_owned(), body: body.to_owned() });
        next(&self.sends, || ()).resolve().await
    }

    async fn delete_message(&self, message_id: &MessageId, csrf_token: &str) -> Result<(), ApiError> {
        self.record(ApiCall::Delete { id: message_id.clone(), token: csrf_token.to_owned() });
        next(&self.deletes, || ()).resolve().await
    }

    async fn toggle_highlight(&self, message_id: &MessageId, csrf_token: &str) -> Result<Option<bool>, ApiError> {
        self.record(ApiCall::Highlight { id: message_id.clone(), token: csrf_token.to_owned() });
        next(&self.highlights, || None).resolve().await
    }
}

// =============================================================================
// RecordingView
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLog {
    pub content: Option<PanelContent>,
    pub renders: usize,
    pub count: Option<usize>,
    pub scrolls: usize,
    pub alerts: Vec<String>,
    pub confirms: Vec<String>,
    pub input_cleared: usize,
    pub focused: usize,
    pub submit: SubmitControl,
    pub submit_history: Vec<SubmitControl>,
}

pub struct RecordingView {
    log: Mutex<ViewLog>,
    token: Mutex<Option<String>>,
    confirm_answer: AtomicBool,
}

impl RecordingView {
    pub fn new() -> Self {
        Self {
            log: Mutex::new(ViewLog {
                content: None,
                renders: 0,
                count: None,
                scrolls: 0,
                alerts: Vec::new(),
                confirms: Vec::new(),
                input_cleared: 0,
                focused: 0,
                submit: SubmitControl::Ready(LABEL.to_owned()),
                submit_history: Vec::new(),
            }),
            token: Mutex::new(Some(TOKEN.to_owned())),
            confirm_answer: AtomicBool::new(true),
        }
    }

    pub fn snapshot(&self) -> ViewLog {
        self.log.lock().unwrap().clone()
    }

    pub fn set_token(&self, token: Option<&str>) {
        *self.token.lock().unwrap() = token.map(ToOwned::to_owned);
    }

    pub fn set_confirm(&self, answer: bool) {
        self.confirm_answer.store(answer, Ordering::SeqCst);
    }

    /// Number of message blocks currently rendered.
    pub fn block_count(&self) -> usize {
        match self.snapshot().content {
            Some(PanelContent::Messages(blocks)) => blocks.len(),
            _ => 0,
        }
    }
}

#[async_trait::async_trait]
impl PanelView for RecordingView {
    fn replace_content(&self, content: &PanelContent) {
        let mut log = self.log.lock().unwrap();
        log.content = Some(content.clone());
        log.renders += 1;
    }

    fn set_count(&self, count: usize) {
        self.log.lock().unwrap().count = Some(count);
    }

    fn scroll_to_end(&self) {
        self.log.lock().unwrap().scrolls += 1;
    }

    fn alert(&self, message: &str) {
        self.log.lock().unwrap().alerts.push(message.to_owned());
    }

    async fn confirm(&self, prompt: &str) -> bool {
        self.log.lock().unwrap().confirms.push(prompt.to_owned());
        self.confirm_answer.load(Ordering::SeqCst)
    }

    fn csrf_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn clear_input(&self) {
        self.log.lock().unwrap().input_cleared += 1;
    }

    fn focus_input(&self) {
        self.log.lock().unwrap().focused += 1;
    }

    fn submit_label(&self) -> String {
        LABEL.to_owned()
    }

    fn set_submit_control(&self, state: SubmitControl) {
        let mut log = self.log.lock().unwrap();
        log.submit = state.clone();
        log.submit_history.push(state);
    }
}

// =============================================================================
// Builders
// =============================================================================

pub fn message(id: u64, name: &str, body: &str, can_delete: bool) -> Message {
    Message {
        id: MessageId::from(id),
        display_name: name.to_owned(),
        created_at: "10:00".to_owned(),
        body: body.to_owned(),
        can_delete,
        is_highlighted: false,
    }
}

/// Panel for event `"42"` wired to fresh fakes.
pub fn test_panel() -> (Panel, Arc<FakeApi>, Arc<RecordingView>) {
    let api = Arc::new(FakeApi::default());
    let view = Arc::new(RecordingView::new());
    let config = PanelConfig::new("42").unwrap();
    let panel = Panel::new(&config, api.clone(), view.clone());
    (panel, api, view)
}

/// Let spawned tasks run until they block.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

pub const TICK: Duration = Duration::from_secs(5);
