//! Line-oriented terminal host for the chat panel.
//!
//! SYSTEM CONTEXT
//! ==============
//! Stands in for the browser page: stdout is the message container, stdin
//! is the chat form. A reader task forwards stdin lines into a channel; the
//! command loop in `main.rs` and [`TerminalView::confirm`] both take lines
//! from it, one at a time.

use std::sync::{Mutex, PoisonError, RwLock};

use tokio::sync::mpsc;
use tracing::trace;
use xat_panel::render::{EMPTY_HINT, EMPTY_TEXT, ERROR_TEXT, MessageBlock};
use xat_panel::view::SENDING_LABEL;
use xat_panel::{MessageId, PanelContent, PanelView, SubmitControl};

const SUBMIT_LABEL: &str = "Send";

pub const HELP: &str = "\
commands:
  <text>             send a message
  /retry             resend the last unsent message
  /delete <id>       delete a message (asks for confirmation)
  /highlight <id>    toggle the highlight on a message
  /refresh           fetch messages now
  /token <value>     replace the anti-forgery token
  /help              show this help
  /quit              leave the panel";

// =============================================================================
// COMMANDS
// =============================================================================

/// One parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Retry,
    Delete(MessageId),
    Highlight(MessageId),
    Refresh,
    Token(String),
    Help,
    Quit,
    /// A `/` line that is not a known command, or lacks its argument.
    Invalid(String),
}

impl Command {
    /// Parse one input line. Anything not starting with `/` is a message.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Self::Send(line.to_owned());
        };
        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());

        match (name, arg) {
            ("quit" | "q", None) => Self::Quit,
            ("help" | "h", None) => Self::Help,
            ("refresh" | "r", None) => Self::Refresh,
            ("retry", None) => Self::Retry,
            ("delete" | "d", Some(id)) => Self::Delete(MessageId::new(id)),
            ("highlight" | "hl", Some(id)) => Self::Highlight(MessageId::new(id)),
            ("token", Some(token)) => Self::Token(token.to_owned()),
            _ => Self::Invalid(line.trim().to_owned()),
        }
    }
}

// =============================================================================
// RENDERING
// =============================================================================

/// Plain-text rendering of panel content, one line per message.
#[must_use]
pub fn format_content(content: &PanelContent) -> String {
    match content {
        PanelContent::Messages(blocks) => blocks.iter().map(format_block).collect::<Vec<_>>().join("\n"),
        PanelContent::Empty => format!("  {EMPTY_TEXT}\n  {EMPTY_HINT}"),
        PanelContent::Error => format!("  {ERROR_TEXT}"),
    }
}

fn format_block(block: &MessageBlock) -> String {
    let marker = if block.highlighted { '*' } else { ' ' };
    let actions = if block.deletable { "  [/delete]" } else { "" };
    format!(
        "{marker}#{id} {time} {name}: {body}{actions}",
        id = escape_controls(block.id.as_str()),
        time = escape_controls(&block.created_at),
        name = escape_controls(&block.display_name),
        body = escape_controls(&block.body),
    )
}

/// Terminal counterpart of HTML escaping: control characters (newlines,
/// ESC, ...) are printed as visible escapes so message text stays on its
/// own line and never reaches the terminal as a control sequence.
#[must_use]
pub fn escape_controls(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c.is_control() {
            out.extend(c.escape_debug());
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// TERMINAL VIEW
// =============================================================================

pub struct TerminalView {
    screen: Mutex<Screen>,
    csrf_token: RwLock<Option<String>>,
    lines: tokio::sync::Mutex<mpsc::Receiver<String>>,
}

#[derive(Default)]
struct Screen {
    content: Option<PanelContent>,
    count: Option<usize>,
    /// Last submitted text, kept until a send succeeds.
    draft: Option<String>,
}

impl TerminalView {
    #[must_use]
    pub fn new(csrf_token: Option<String>, lines: mpsc::Receiver<String>) -> Self {
        Self {
            screen: Mutex::new(Screen::default()),
            csrf_token: RwLock::new(csrf_token),
            lines: tokio::sync::Mutex::new(lines),
        }
    }

    /// Next stdin line, or `None` once stdin is closed.
    pub async fn next_line(&self) -> Option<String> {
        self.lines.lock().await.recv().await
    }

    pub fn set_csrf_token(&self, token: String) {
        *self.csrf_token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn set_draft(&self, text: &str) {
        self.screen().draft = Some(text.to_owned());
    }

    #[must_use]
    pub fn draft(&self) -> Option<String> {
        self.screen().draft.clone()
    }

    fn screen(&self) -> std::sync::MutexGuard<'_, Screen> {
        self.screen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl PanelView for TerminalView {
    fn replace_content(&self, content: &PanelContent) {
        let mut screen = self.screen();
        if screen.content.as_ref() == Some(content) {
            return;
        }
        println!("{}", format_content(content));
        screen.content = Some(content.clone());
    }

    fn set_count(&self, count: usize) {
        let mut screen = self.screen();
        if screen.count != Some(count) {
            println!("-- {count} messages");
            screen.count = Some(count);
        }
    }

    fn scroll_to_end(&self) {
        trace!("terminal output is already at the end");
    }

    fn alert(&self, message: &str) {
        println!("! {}", escape_controls(message));
    }

    async fn confirm(&self, prompt: &str) -> bool {
        println!("? {prompt} [y/N]");
        match self.next_line().await {
            Some(answer) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            None => false,
        }
    }

    fn csrf_token(&self) -> Option<String> {
        self.csrf_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear_input(&self) {
        self.screen().draft = None;
    }

    fn focus_input(&self) {
        trace!("input focus requested");
    }

    fn submit_label(&self) -> String {
        SUBMIT_LABEL.to_owned()
    }

    fn set_submit_control(&self, state: SubmitControl) {
        match state {
            SubmitControl::Busy => println!("  {SENDING_LABEL}"),
            SubmitControl::Ready(label) => trace!(%label, "submit control ready"),
        }
    }
}

#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;
