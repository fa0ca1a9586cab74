use crate::analytics::report;
use crate::desk::Desk;
use crate::events::DeskEvent;
use crate::model::{Conversation, Handler, Message, Sender};
use crate::notify::Notification;
use crate::settings::NotificationChannel;
use crate::store::TransferOutcome;
use crate::view::{self, ListRow, StatusDot};
use chrono::Local;
use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

/// One line typed at the console prompt
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    List,
    Tab(Handler),
    Search(String),
    Open(String),
    Close,
    Show,
    Send(String),
    Transfer(Handler),
    Export,
    Stats,
    Report(ReportKind),
    Settings,
    AutoRespond(bool),
    Threshold(u32),
    Number(String),
    ToggleNotification(NotificationChannel),
    TestNotify,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Weekly,
    Monthly,
    Topics,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((h, r)) => (h, r.trim()),
        None => (line, ""),
    };

    let handler = |s: &str| s.parse::<Handler>();

    match head {
        "list" | "ls" => Ok(Command::List),
        "tab" => Ok(Command::Tab(handler(rest)?)),
        "search" | "/" => Ok(Command::Search(rest.to_string())),
        "open" => {
            if rest.is_empty() {
                Err("Usage: open <id>".to_string())
            } else {
                Ok(Command::Open(rest.to_string()))
            }
        }
        "close" | "back" => Ok(Command::Close),
        "show" => Ok(Command::Show),
        "send" => Ok(Command::Send(rest.to_string())),
        "transfer" => Ok(Command::Transfer(handler(rest)?)),
        "export" => Ok(Command::Export),
        "stats" => Ok(Command::Stats),
        "report" => match rest {
            "" | "weekly" => Ok(Command::Report(ReportKind::Weekly)),
            "monthly" => Ok(Command::Report(ReportKind::Monthly)),
            "topics" => Ok(Command::Report(ReportKind::Topics)),
            other => Err(format!("Unknown report '{}' (weekly, monthly, topics)", other)),
        },
        "settings" => Ok(Command::Settings),
        "auto-respond" => match rest {
            "on" => Ok(Command::AutoRespond(true)),
            "off" => Ok(Command::AutoRespond(false)),
            _ => Err("Usage: auto-respond <on|off>".to_string()),
        },
        "threshold" => rest
            .parse::<u32>()
            .map(Command::Threshold)
            .map_err(|_| "Usage: threshold <1-10>".to_string()),
        "number" => Ok(Command::Number(rest.to_string())),
        "notify" => match rest {
            "email" => Ok(Command::ToggleNotification(NotificationChannel::Email)),
            "browser" => Ok(Command::ToggleNotification(NotificationChannel::Browser)),
            "sound" => Ok(Command::ToggleNotification(NotificationChannel::Sound)),
            _ => Err("Usage: notify <email|browser|sound>".to_string()),
        },
        "test-notify" => Ok(Command::TestNotify),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "" => Err(String::new()),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn print_usage() {
    println!("{}", "💬 SupportDesk".bright_cyan().bold());
    println!();
    println!("{}", "Conversations:".bright_white().bold());
    println!("  {}                      List conversations in the current tab", "list".cyan());
    println!("  {} <ai|agent>            Switch handler tab", "tab".cyan());
    println!("  {} [term]             Filter by name or last message", "search".cyan());
    println!("  {} <id>                 Open a conversation", "open".cyan());
    println!("  {}                      Show the open conversation", "show".cyan());
    println!("  {}                     Close the open conversation", "close".cyan());
    println!("  {} <text>               Send a message", "send".cyan());
    println!("  {} <ai|agent>       Transfer the open conversation", "transfer".cyan());
    println!("  {}                    Print the open conversation as JSON", "export".cyan());
    println!();
    println!("{}", "Analytics:".bright_white().bold());
    println!("  {}                     Live desk numbers", "stats".cyan());
    println!("  {} <weekly|monthly|topics>", "report".cyan());
    println!();
    println!("{}", "Settings:".bright_white().bold());
    println!("  {}                  Show settings", "settings".cyan());
    println!("  {} <on|off>     Toggle automatic replies", "auto-respond".cyan());
    println!("  {} <1-10>          Messages before suggesting a human", "threshold".cyan());
    println!("  {} <+55 ...>          WhatsApp number", "number".cyan());
    println!("  {} <email|browser|sound>  Toggle a notification channel", "notify".cyan());
    println!("  {}               Send a test notification", "test-notify".cyan());
    println!();
    println!("  {} / {}", "help".cyan(), "quit".cyan());
}

/// Interactive console over a desk. Returns when stdin closes or on `quit`.
///
/// Without a notification stream the desk is expected to log its notifications.
pub async fn run(desk: Desk, notifications: Option<broadcast::Receiver<Notification>>) -> anyhow::Result<()> {
    if let Some(notifications) = notifications {
        spawn_notification_printer(notifications);
    }
    spawn_reply_printer(desk.clone());

    print_usage();
    println!();
    let mut search_term = String::new();
    print_list(&desk, &search_term).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) if e.is_empty() => continue,
            Err(e) => {
                eprintln!("{} {}", "✗".red().bold(), e.red());
                continue;
            }
        };

        if command == Command::Quit {
            break;
        }
        if let Err(e) = execute(&desk, command, &mut search_term).await {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
        }
    }

    Ok(())
}

async fn execute(desk: &Desk, command: Command, search_term: &mut String) -> anyhow::Result<()> {
    match command {
        Command::List => print_list(desk, search_term).await,
        Command::Tab(tab) => {
            desk.set_tab(tab).await;
            print_list(desk, search_term).await;
        }
        Command::Search(term) => {
            *search_term = term;
            print_list(desk, search_term).await;
        }
        Command::Open(id) => match open_listed(desk, &id, search_term).await? {
            Some(conversation) => print_conversation(&conversation),
            None => println!("{}", format!("Conversation {} is not in the list", id).yellow()),
        },
        Command::Close => desk.close_conversation().await,
        Command::Show => match selected(desk).await {
            Some(conversation) => print_conversation(&conversation),
            None => print_no_selection(),
        },
        Command::Send(text) => {
            let Some(id) = selected_id(desk).await else {
                print_no_selection();
                return Ok(());
            };
            match desk.send_message(&id, &text).await? {
                Some(sent) => {
                    print_message(&sent.message);
                    // The reply prints itself when it lands
                    drop(sent.reply);
                }
                None => println!("{}", "Nothing to send".dimmed()),
            }
        }
        Command::Transfer(target) => {
            let Some(id) = selected_id(desk).await else {
                print_no_selection();
                return Ok(());
            };
            match desk.transfer_to(&id, target).await? {
                TransferOutcome::AlreadyHandled => {
                    println!("{}", format!("Already handled by {}", target).yellow());
                }
                TransferOutcome::Transferred { announcement, .. } => print_message(&announcement),
            }
        }
        Command::Export => {
            let Some(id) = selected_id(desk).await else {
                print_no_selection();
                return Ok(());
            };
            println!("{}", desk.export_conversation(&id).await?);
        }
        Command::Stats => print_stats(desk).await,
        Command::Report(kind) => print_report(kind),
        Command::Settings => print_settings(desk).await,
        Command::AutoRespond(on) => {
            let mut ai = desk.settings().await.ai;
            ai.auto_respond = on;
            desk.save_ai_settings(ai).await?;
        }
        Command::Threshold(n) => {
            let mut ai = desk.settings().await.ai;
            ai.transfer_threshold = n;
            desk.save_ai_settings(ai).await?;
        }
        Command::Number(number) => {
            let mut whatsapp = desk.settings().await.whatsapp;
            whatsapp.number = number;
            desk.save_whatsapp_settings(whatsapp).await?;
        }
        Command::ToggleNotification(channel) => {
            let mut notifications = desk.settings().await.notifications;
            notifications.toggle(channel);
            desk.save_notification_settings(notifications).await;
            print_settings(desk).await;
        }
        Command::TestNotify => desk.test_notifications(),
        Command::Help => print_usage(),
        Command::Quit => {}
    }
    Ok(())
}

/// Open `id` only if the current list shows it
async fn open_listed(desk: &Desk, id: &str, search_term: &str) -> crate::error::Result<Option<Conversation>> {
    if !desk.store().await.is_visible(id, search_term) {
        return Ok(None);
    }
    desk.select(id).await.map(Some)
}

async fn selected_id(desk: &Desk) -> Option<String> {
    desk.store().await.selected_id().map(|s| s.to_string())
}

async fn selected(desk: &Desk) -> Option<Conversation> {
    desk.store().await.selected().cloned()
}

fn spawn_notification_printer(mut rx: broadcast::Receiver<Notification>) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(n) => println!("{} {} {}", "🔔".yellow(), n.title.yellow().bold(), n.message.yellow()),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    });
}

/// Print replies for the open conversation as they arrive
fn spawn_reply_printer(desk: Desk) {
    let mut rx = desk.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    // Customer lines and announcements are printed by the command that made them
                    let DeskEvent::ReplyAppended { message, .. } = &event else {
                        continue;
                    };
                    let open = selected_id(&desk).await;
                    if open.is_some() && open.as_deref() == event.conversation_id() {
                        print_message(message);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Console lagged {} events", n);
                }
                Err(_) => break,
            }
        }
    });
}

async fn print_list(desk: &Desk, search_term: &str) {
    let now = Local::now();
    let (tab, rows) = {
        let store = desk.store().await;
        (store.tab(), view::list_rows(store.visible(search_term), store.selected_id(), now))
    };

    let title = match tab {
        Handler::Ai => "Atendimentos IA",
        Handler::Agent => "Atendimentos Atendente",
    };
    println!("{}", format!("{} ({})", title, rows.len()).bright_cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    if rows.is_empty() {
        println!("  {}", view::EMPTY_LIST_TEXT.dimmed());
    }
    for row in rows {
        print_row(&row);
    }
}

fn print_row(row: &ListRow) {
    let dot = match row.status_dot {
        StatusDot::Online => "●".green(),
        StatusDot::Waiting => "●".yellow(),
        StatusDot::None => " ".normal(),
    };
    let marker = if row.selected { "▶" } else { " " };
    let badge = if row.unread > 0 {
        format!(" ({})", row.unread).bright_white().on_bright_black().to_string()
    } else {
        String::new()
    };
    let preview: String = row.preview.chars().take(40).collect();
    println!(
        "{} {} {:<3} {:<16} {:>5}  {}{}",
        marker,
        dot,
        row.id.cyan(),
        row.name.bold(),
        row.time_label.dimmed(),
        preview,
        badge
    );
}

fn print_no_selection() {
    println!("{}", view::NO_SELECTION_TITLE.yellow().bold());
    println!("{}", view::NO_SELECTION_TEXT.dimmed());
}

fn print_conversation(conversation: &Conversation) {
    println!(
        "{}",
        "╭─────────────────────────────────────────────────────────────╮".bright_cyan()
    );
    println!(
        "{} {} {} [{}] · {}",
        "│".bright_cyan(),
        conversation.contact.name.bright_white().bold(),
        conversation.contact.number.dimmed(),
        conversation.status.label(),
        match conversation.handled_by {
            Handler::Ai => "IA".cyan(),
            Handler::Agent => "Atendente".magenta(),
        }
    );
    println!(
        "{}",
        "╰─────────────────────────────────────────────────────────────╯".bright_cyan()
    );
    for message in conversation.messages() {
        print_message(message);
    }
}

fn print_message(message: &Message) {
    let time = message.timestamp.format("%H:%M").to_string();
    let media = message
        .media
        .as_ref()
        .map(|m| format!(" {} {}", m.summary(), m.url().dimmed()))
        .unwrap_or_default();
    match message.sender.label() {
        None => println!("{:>60} {}", format!("{}{}", message.content, media).bright_white(), time.dimmed()),
        Some(label) => {
            let label = match message.sender {
                Sender::Ai => label.cyan().bold(),
                _ => label.magenta().bold(),
            };
            println!("{} {}{} {}", label, message.content, media, time.dimmed());
        }
    }
}

async fn print_stats(desk: &Desk) {
    let s = desk.snapshot().await;
    println!("{}", "Estatísticas ao vivo".bright_cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    println!(
        "  Conversas: {}  (ativas {}, aguardando {}, resolvidas {})",
        s.total_conversations.to_string().bold(),
        s.active.to_string().green(),
        s.waiting.to_string().yellow(),
        s.resolved
    );
    println!("  IA: {}  Atendente: {}", s.handled_by_ai, s.handled_by_agent);
    println!("  Não lidas: {}", s.unread_messages);
    println!(
        "  Mensagens: {}  Respostas: {}  Transferências: {} → atendente, {} → IA",
        s.customer_messages, s.replies, s.transfers_to_agent, s.transfers_to_ai
    );
    match s.avg_reply_ms {
        Some(ms) => println!("  Tempo médio de resposta: {:.1} s", ms as f64 / 1000.0),
        None => println!("  Tempo médio de resposta: {}", "—".dimmed()),
    }
    match s.ai_resolution_rate {
        Some(rate) => println!("  Taxa de resolução pela IA: {:.0}%", rate * 100.0),
        None => println!("  Taxa de resolução pela IA: {}", "—".dimmed()),
    }
    println!();
    for metric in report::headline_metrics() {
        println!("  {:<28} {}", metric.label, metric.value.bold());
    }
}

fn print_report(kind: ReportKind) {
    match kind {
        ReportKind::Weekly | ReportKind::Monthly => {
            let (title, series) = if kind == ReportKind::Weekly {
                ("Atendimentos da semana", report::weekly())
            } else {
                ("Evolução mensal", report::monthly())
            };
            let max = series.iter().map(|p| p.conversations).max().unwrap_or(0);
            println!("{}", title.bright_cyan().bold());
            for p in series {
                println!(
                    "  {:<4} {} {:>4}  {} {:>4}",
                    p.label,
                    report::bar(p.conversations, max, 20).cyan(),
                    p.conversations,
                    report::bar(p.resolved, max, 20).green(),
                    p.resolved
                );
            }
        }
        ReportKind::Topics => {
            println!("{}", "Assuntos mais frequentes".bright_cyan().bold());
            for share in report::topics() {
                println!(
                    "  {:<24} {} {:>3}%",
                    share.label,
                    report::bar(share.percent as u32, 100, 20).cyan(),
                    share.percent
                );
            }
            println!();
            for share in report::handoff_split() {
                println!("  {:<24} {:>3}%", share.label, share.percent);
            }
        }
    }
}

async fn print_settings(desk: &Desk) {
    let settings = desk.settings().await;
    let on_off = |b: bool| if b { "on".green() } else { "off".red() };
    println!("{}", "WhatsApp".bright_cyan().bold());
    println!("  API key:   {}", settings.whatsapp.masked_api_key());
    println!("  Número:    {}", settings.whatsapp.number);
    println!("  Boas-vindas: {}", settings.whatsapp.welcome_message);
    println!("{}", "Inteligência Artificial".bright_cyan().bold());
    println!("  Respostas automáticas: {}", on_off(settings.ai.auto_respond));
    println!(
        "  Atraso das respostas: {:.1} s",
        desk.config().reply_delay.as_secs_f64()
    );
    println!("  Limite antes de transferir: {}", settings.ai.transfer_threshold);
    println!("  Prompt: {}", settings.ai.system_prompt.dimmed());
    println!("{}", "Notificações".bright_cyan().bold());
    println!("  E-mail:    {}", on_off(settings.notifications.email));
    println!("  Navegador: {}", on_off(settings.notifications.browser));
    println!("  Sons:      {}", on_off(settings.notifications.sound));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::notify::LogNotifier;
    use std::sync::Arc;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command("list"), Ok(Command::List));
        assert_eq!(parse_command("tab agent"), Ok(Command::Tab(Handler::Agent)));
        assert_eq!(parse_command("open 3"), Ok(Command::Open("3".to_string())));
        assert_eq!(
            parse_command("send  Olá, tudo bem? "),
            Ok(Command::Send("Olá, tudo bem?".to_string()))
        );
        assert_eq!(parse_command("search"), Ok(Command::Search(String::new())));
        assert_eq!(parse_command("transfer ai"), Ok(Command::Transfer(Handler::Ai)));
        assert_eq!(parse_command("report monthly"), Ok(Command::Report(ReportKind::Monthly)));
        assert_eq!(parse_command("auto-respond off"), Ok(Command::AutoRespond(false)));
        assert_eq!(parse_command("threshold 5"), Ok(Command::Threshold(5)));
        assert_eq!(parse_command("q"), Ok(Command::Quit));
        assert_eq!(parse_command("back"), Ok(Command::Close));
        assert_eq!(
            parse_command("notify sound"),
            Ok(Command::ToggleNotification(NotificationChannel::Sound))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("open").is_err());
        assert!(parse_command("tab robots").is_err());
        assert!(parse_command("threshold many").is_err());
        assert!(parse_command("dance").is_err());
        assert!(parse_command("notify pager").is_err());
        assert_eq!(parse_command("   "), Err(String::new()));
    }

    fn desk() -> Desk {
        Desk::new(Config::default(), Arc::new(LogNotifier))
    }

    #[tokio::test]
    async fn test_open_only_listed_conversations() {
        let desk = desk();

        // "2" belongs to the agent tab while the AI tab is shown
        assert!(open_listed(&desk, "2", "").await.unwrap().is_none());
        assert!(desk.store().await.selected().is_none());
        assert_eq!(desk.conversation("1").await.unwrap().unread_count(), 3);

        // Filtered out by the search term
        assert!(open_listed(&desk, "1", "ana").await.unwrap().is_none());

        let opened = open_listed(&desk, "1", "maria").await.unwrap().unwrap();
        assert_eq!(opened.id, "1");
        assert_eq!(desk.store().await.selected_id(), Some("1"));
    }

    #[tokio::test]
    async fn test_open_unknown_id_is_not_an_error() {
        let desk = desk();
        assert!(open_listed(&desk, "99", "").await.unwrap().is_none());
    }
}
