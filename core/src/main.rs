/// SupportDesk console - Main entry point
use std::env;
use std::io::IsTerminal;
use std::sync::Arc;
use supportdesk_core::notify::{ChannelNotifier, LogNotifier};
use supportdesk_core::{console, Config, Desk};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn"))
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse configuration
    let args: Vec<String> = env::args().collect();
    let config = Config::from_args(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Piped output gets notifications through the log instead of inline banners
    let (desk, notifications) = if std::io::stdout().is_terminal() {
        let notifier = ChannelNotifier::new(32);
        let notifications = notifier.subscribe();
        (Desk::new(config, Arc::new(notifier)), Some(notifications))
    } else {
        (Desk::new(config, Arc::new(LogNotifier)), None)
    };
    info!("💬 Starting SupportDesk console");

    console::run(desk, notifications).await
}
