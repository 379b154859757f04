use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::Result;
use tracing::warn;

use charla_core::{
    Config, Conversation, FileStorage, LlmClient, MemoryStorage, MessageStore, Storage,
};

mod app;
mod handler;
mod tui;
mod ui;

use app::App;

/// Routes tracing output to a log file; the terminal itself belongs to
/// the TUI. Any setup failure leaves logging disabled.
fn init_logging() {
    let Some(log_dir) = dirs::data_dir().map(|dir| dir.join("charla")) else {
        return;
    };
    if fs::create_dir_all(&log_dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("charla.log"))
    else {
        return;
    };

    let _ = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        Config::new()
    });
    let client = LlmClient::new(config.api_url());

    let storage: Box<dyn Storage> = match FileStorage::open_default() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            warn!(error = %e, "history will not survive this session");
            Box::new(MemoryStorage::new())
        }
    };
    let conversation = Conversation::new(MessageStore::load(storage));
    let mut app = App::new(conversation, client);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut app, &mut terminal).await;
    tui::restore()?;

    result
}

async fn run(app: &mut App, terminal: &mut tui::Tui) -> Result<()> {
    let mut events = tui::EventHandler::new();

    // First draw captures the chat pane size; jump to the latest
    // persisted message once it is known.
    terminal.draw(|frame| ui::render(app, frame))?;
    app.scroll_to_bottom();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event);
        }
        app.poll_response().await;
    }

    Ok(())
}
