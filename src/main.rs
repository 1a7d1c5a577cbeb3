mod terminal;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use xat_panel::config::{DEFAULT_BASE_URL, DEFAULT_MAX_MESSAGE_CHARS, DEFAULT_POLL_INTERVAL_MS};
use xat_panel::{ClickTarget, ConfigError, FormValues, HttpChatApi, Panel, PanelConfig, PanelView, RefreshPolicy};

use crate::terminal::{Command, HELP, TerminalView};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Parser, Debug)]
#[command(name = "xat-panel", about = "Live chat panel for one event, in the terminal")]
struct Cli {
    #[arg(long, env = "XAT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, env = "XAT_EVENT_ID")]
    event_id: String,

    /// Anti-forgery token; can be replaced at runtime with `/token`.
    #[arg(long, env = "XAT_CSRF_TOKEN")]
    csrf_token: Option<String>,

    /// Raw `Cookie` header (session and csrftoken cookies).
    #[arg(long, env = "XAT_COOKIE")]
    cookie: Option<String>,

    #[arg(long, env = "XAT_POLL_INTERVAL_MS", default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    #[arg(long, env = "XAT_MAX_MESSAGE_CHARS", default_value_t = DEFAULT_MAX_MESSAGE_CHARS)]
    max_message_chars: usize,

    #[arg(long, env = "XAT_REFRESH_POLICY", default_value = "overlap")]
    refresh_policy: RefreshPolicy,

    #[arg(long, env = "XAT_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,
}

impl Cli {
    fn panel_config(&self) -> Result<PanelConfig, ConfigError> {
        let mut config = PanelConfig::new(&self.event_id)?;
        config.base_url = self.base_url.trim_end_matches('/').to_owned();
        config.set_poll_interval_ms(self.poll_interval_ms);
        config.set_max_message_chars(self.max_message_chars);
        config.refresh_policy = self.refresh_policy;
        config.request_timeout = self
            .request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        config.cookie.clone_from(&self.cookie);
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let config = cli.panel_config()?;
    let api = HttpChatApi::new(&config.base_url, config.request_timeout, config.cookie.clone())?;

    let (line_tx, line_rx) = mpsc::channel(16);
    spawn_stdin_reader(line_tx);
    let view = Arc::new(TerminalView::new(cli.csrf_token, line_rx));

    info!(event_id = %config.event_id, base_url = %config.base_url, "chat panel starting");
    let (panel, scheduler) = Panel::start(&config, Arc::new(api), view.clone());

    run_commands(&panel, &view).await;

    scheduler.stop().await;
    Ok(())
}

/// Forward stdin lines until EOF or the receiver goes away.
fn spawn_stdin_reader(tx: mpsc::Sender<String>) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
        debug!("stdin closed");
    });
}

async fn run_commands(panel: &Panel, view: &TerminalView) {
    println!("{HELP}");
    while let Some(line) = view.next_line().await {
        match Command::parse(&line) {
            Command::Send(text) => {
                view.set_draft(&text);
                // Failures are already shown by the panel.
                if let Err(e) = panel.submit(FormValues::with_message(text)).await {
                    debug!(error = %e, "submit failed");
                }
            }
            Command::Retry => match view.draft() {
                Some(text) => {
                    if let Err(e) = panel.submit(FormValues::with_message(text)).await {
                        debug!(error = %e, "retry failed");
                    }
                }
                None => view.alert("Nothing to retry"),
            },
            Command::Delete(id) => panel.handle_click(&ClickTarget::delete_button(id)).await,
            Command::Highlight(id) => panel.handle_click(&ClickTarget::highlight_button(id)).await,
            Command::Refresh => panel.refresh().await,
            Command::Token(token) => {
                view.set_csrf_token(token);
                info!("anti-forgery token replaced");
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Invalid(input) => view.alert(&format!("Unknown command: {input} (try /help)")),
        }
    }
    info!(event_id = %panel.event_id(), "chat panel closing");
}
