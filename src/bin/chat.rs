//! Muse chat - terminal client
//!
//! Talks to the Muse proxy; never holds a provider key.

use crossterm::event::{Event as TermEvent, KeyEvent};
use muse::chat::PendingAttachment;
use muse::config::ClientConfig;
use muse::db::{Database, Persistence};
use muse::llm::{LoggingService, ProxyService};
use muse::runtime::{self, ChatHandle, ChatUpdate};
use muse::tui::{self, Action, ChatScreen};
use ratatui::DefaultTerminal;
use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env();

    // Opening the database creates its directory, which also holds the log
    let db = Database::open(&config.db_path)?;
    init_logging(&config)?;
    tracing::info!(path = %config.db_path.display(), proxy = %config.proxy_url, "Starting Muse chat");

    let llm = LoggingService::new(Arc::new(ProxyService::new(&config.proxy_url)?));
    let handle = runtime::start(Persistence::new(db), llm, config.reveal_interval);
    let mut updates = handle.subscribe();
    let mut screen = ChatScreen::new(handle.snapshot().await?);

    let (key_tx, key_rx) = mpsc::channel(64);
    spawn_input_handler(key_tx);

    let mut terminal = ratatui::init();
    let result = run(&mut terminal, &handle, &mut updates, key_rx, &mut screen).await;
    ratatui::restore();

    if let Err(e) = &result {
        tracing::error!(error = %e, "Chat client exited with error");
    }
    result
}

fn init_logging(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_path())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "muse=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();
    Ok(())
}

/// Read terminal keys on a blocking thread and forward them
fn spawn_input_handler(sender: mpsc::Sender<KeyEvent>) {
    tokio::task::spawn_blocking(move || loop {
        if sender.is_closed() {
            break;
        }
        if !matches!(crossterm::event::poll(Duration::from_millis(100)), Ok(true)) {
            continue;
        }
        match crossterm::event::read() {
            Ok(TermEvent::Key(key)) => {
                if sender.blocking_send(key).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "Failed to read terminal input");
                break;
            }
        }
    });
}

async fn run(
    terminal: &mut DefaultTerminal,
    handle: &ChatHandle,
    updates: &mut broadcast::Receiver<ChatUpdate>,
    mut keys: mpsc::Receiver<KeyEvent>,
    screen: &mut ChatScreen,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| tui::draw(frame, screen))?;

        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else { break };
                if !dispatch(screen.handle_key(key), handle, screen).await? {
                    break;
                }
            }
            update = updates.recv() => match update {
                Ok(update) => screen.apply(&update),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed updates, resynchronizing");
                    screen.view = handle.snapshot().await?;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
    Ok(())
}

/// Perform an action. Returns false when the client should exit.
async fn dispatch(
    action: Action,
    handle: &ChatHandle,
    screen: &mut ChatScreen,
) -> Result<bool, Box<dyn std::error::Error>> {
    match action {
        Action::None => {}
        Action::Quit => return Ok(false),
        Action::Send(text) => handle.send_message(text).await?,
        Action::Cancel => handle.cancel().await?,
        Action::ToggleTheme => handle.toggle_theme().await?,
        Action::NextPersona => handle.select_persona(screen.view.persona.next()).await?,
        Action::Detach => handle.detach().await?,
        Action::Attach(path) => match PendingAttachment::from_path(&path) {
            Ok(attachment) => handle.attach(attachment).await?,
            Err(e) => {
                tracing::warn!(error = %e, "Attachment rejected");
                screen.set_notice(e.to_string());
            }
        },
    }
    Ok(true)
}
