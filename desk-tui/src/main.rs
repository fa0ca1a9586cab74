/// SupportDesk terminal dashboard
/// Chat list, chat window, analytics and settings over the desk core
mod app;
mod ui;

use std::sync::Arc;
use std::time::{Duration, Instant};

use app::{needs_refresh, Action, App, ViewData};
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use supportdesk_core::events::DeskEvent;
use supportdesk_core::notify::{ChannelNotifier, Notification};
use supportdesk_core::settings::{MAX_TRANSFER_THRESHOLD, MIN_TRANSFER_THRESHOLD};
use supportdesk_core::{view, Config, Desk};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILE: &str = "desk-tui.log";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config = Config::from_args(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Logs go to a file, the terminal belongs to the dashboard
    let log_path = config
        .log_file
        .clone()
        .unwrap_or_else(|| DEFAULT_LOG_FILE.into());
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(Arc::new(log_file))
        .with_ansi(false)
        .init();

    let notifier = ChannelNotifier::new(32);
    let notifications = notifier.subscribe();
    let desk = Desk::new(config, Arc::new(notifier));
    info!("🖥️  Starting SupportDesk dashboard");

    // Wake the UI on desk events and notifications
    let (tx, mut rx) = mpsc::unbounded_channel::<UiEvent>();
    forward(desk.subscribe(), tx.clone(), UiEvent::Desk);
    forward(notifications, tx, UiEvent::Notify);

    // TUI setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = run_app(&mut terminal, &desk, &mut rx).await;
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        error!("TUI error: {}", e);
        eprintln!("TUI error: {e}");
    }
    Ok(())
}

enum UiEvent {
    Desk(DeskEvent),
    Notify(Notification),
}

fn forward<T: Clone + Send + 'static>(
    mut from: broadcast::Receiver<T>,
    to: mpsc::UnboundedSender<UiEvent>,
    wrap: fn(T) -> UiEvent,
) {
    tokio::spawn(async move {
        loop {
            match from.recv().await {
                Ok(item) => {
                    if to.send(wrap(item)).is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Dashboard lagged {} events", n);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

async fn load_view(desk: &Desk, app: &App) -> ViewData {
    let now = Local::now();
    let snapshot = desk.snapshot().await;
    let settings = desk.settings().await;
    let store = desk.store().await;
    ViewData {
        tab: store.tab(),
        rows: view::list_rows(store.visible(&app.search), store.selected_id(), now),
        selected: store.selected().cloned(),
        snapshot,
        settings,
    }
}

async fn apply(desk: &Desk, app: &mut App, action: Action) -> anyhow::Result<()> {
    match action {
        Action::None | Action::Quit => {}
        Action::SetTab(tab) => {
            desk.set_tab(tab).await;
        }
        Action::Open(id) => {
            desk.select(&id).await?;
        }
        Action::Close => desk.close_conversation().await,
        Action::Send(text) => {
            let id = desk.store().await.selected_id().map(|s| s.to_string());
            if let Some(id) = id {
                // Fire and forget: the reply shows up through the event stream
                desk.send_message(&id, &text).await?;
            }
        }
        Action::Transfer(target) => {
            let id = desk.store().await.selected_id().map(|s| s.to_string());
            if let Some(id) = id {
                desk.transfer_to(&id, target).await?;
            }
        }
        Action::Export => {
            let id = desk.store().await.selected_id().map(|s| s.to_string());
            if let Some(id) = id {
                let json = desk.export_conversation(&id).await?;
                let path = format!("conversation-{}.json", id);
                tokio::fs::write(&path, json).await?;
                app.status = Some(format!("Conversa exportada para {}", path));
            }
        }
        Action::ToggleAutoRespond => {
            let mut ai = desk.settings().await.ai;
            ai.auto_respond = !ai.auto_respond;
            desk.save_ai_settings(ai).await?;
        }
        Action::AdjustThreshold(delta) => {
            let mut ai = desk.settings().await.ai;
            let next = (ai.transfer_threshold as i64 + delta as i64)
                .clamp(MIN_TRANSFER_THRESHOLD as i64, MAX_TRANSFER_THRESHOLD as i64);
            ai.transfer_threshold = next as u32;
            desk.save_ai_settings(ai).await?;
        }
        Action::ToggleNotification(channel) => {
            let mut notifications = desk.settings().await.notifications;
            notifications.toggle(channel);
            desk.save_notification_settings(notifications).await;
        }
        Action::TestNotify => desk.test_notifications(),
    }
    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    desk: &Desk,
    rx: &mut mpsc::UnboundedReceiver<UiEvent>,
) -> std::io::Result<()> {
    let mut app = App::new();
    let mut view = load_view(desk, &app).await;
    let mut dirty = true;
    let mut last_redraw = Instant::now();

    loop {
        // Process desk events
        while let Ok(event) = rx.try_recv() {
            match event {
                UiEvent::Notify(n) => app.push_toast(n),
                UiEvent::Desk(_) => {}
            }
            dirty = true;
        }
        app.expire_toasts(Instant::now());

        if needs_refresh(dirty, last_redraw.elapsed()) {
            view = load_view(desk, &app).await;
            app.clamp_cursor(view.rows.len());
            terminal.draw(|f| ui::draw(f, &app, &view))?;
            last_redraw = Instant::now();
            dirty = false;
        }

        // Handle keys
        if event::poll(Duration::from_millis(5))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.status = None;
                    let action = app.on_key(key, &view);
                    if action == Action::Quit {
                        return Ok(());
                    }
                    if let Err(e) = apply(desk, &mut app, action).await {
                        app.status = Some(e.to_string());
                    }
                    dirty = true;
                }
            }
        }

        tokio::time::sleep(Duration::from_millis(8)).await;
    }
}
