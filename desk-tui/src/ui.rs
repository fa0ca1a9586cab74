/// Drawing: chat list, chat window, analytics and settings pages
use crate::app::{App, Mode, Page, ViewData};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};
use supportdesk_core::analytics::report;
use supportdesk_core::view::{self, StatusDot};
use supportdesk_core::{Conversation, Handler, Message, Sender};

const ACCENT: Color = Color::Cyan;

pub fn draw(f: &mut Frame, app: &App, view: &ViewData) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.size());

    draw_header(f, app, chunks[0]);
    match app.page {
        Page::Chats => draw_chats(f, app, view, chunks[1]),
        Page::Stats => draw_stats(f, view, chunks[1]),
        Page::Settings => draw_settings(f, view, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
}

fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let selected = match app.page {
        Page::Chats => 0,
        Page::Stats => 1,
        Page::Settings => 2,
    };
    let tabs = Tabs::new(vec!["1 Dashboard", "2 Estatísticas", "3 Configurações"])
        .select(selected)
        .block(bordered(" SUPPORT DESK "))
        .highlight_style(Style::default().fg(Color::Black).bg(ACCENT));
    f.render_widget(tabs, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let toast = app
        .toasts()
        .last()
        .map(|n| format!(" 🔔 {} — {} ", n.title, n.message));
    let hint = match (app.page, app.mode) {
        (_, Mode::Compose) => " Enter enviar | Esc cancelar ",
        (_, Mode::Search) => " Digite para buscar | Enter/Esc concluir ",
        (Page::Chats, Mode::Normal) => {
            " ↑↓ navegar | Enter abrir | Esc fechar | ←→ IA/Atendente | / buscar | i escrever | t transferir | e exportar | q sair "
        }
        (Page::Stats, Mode::Normal) => " 1 Dashboard | 3 Configurações | q sair ",
        (Page::Settings, Mode::Normal) => {
            " r respostas automáticas | +/- limite | e/b/s notificações | n testar | q sair "
        }
    };
    let (text, style) = match (toast, &app.status) {
        (Some(t), _) => (t, Style::default().fg(Color::Black).bg(Color::Yellow)),
        (None, Some(status)) => (format!(" {} ", status), Style::default().fg(Color::Yellow)),
        (None, None) => (hint.to_string(), Style::default().fg(ACCENT)),
    };
    let para = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(ACCENT)));
    f.render_widget(para, area);
}

fn draw_chats(f: &mut Frame, app: &App, view: &ViewData, area: Rect) {
    if view::is_compact_layout(area.width) {
        if app.show_list || view.selected.is_none() {
            draw_list(f, app, view, area);
        } else {
            draw_chat_window(f, app, view, area);
        }
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(42), Constraint::Min(0)].as_ref())
        .split(area);
    draw_list(f, app, view, chunks[0]);
    draw_chat_window(f, app, view, chunks[1]);
}

fn draw_list(f: &mut Frame, app: &App, view: &ViewData, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)].as_ref())
        .split(area);

    let search_style = if app.mode == Mode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let search_text = if app.search.is_empty() && app.mode != Mode::Search {
        "Buscar conversas...".to_string()
    } else {
        app.search.clone()
    };
    f.render_widget(
        Paragraph::new(search_text).style(search_style).block(bordered(" / ")),
        chunks[0],
    );

    let title = match view.tab {
        Handler::Ai => " IA | atendente ",
        Handler::Agent => " ia | ATENDENTE ",
    };
    if view.rows.is_empty() {
        let empty = Paragraph::new(view::EMPTY_LIST_TEXT)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(bordered(title));
        f.render_widget(empty, chunks[1]);
        return;
    }

    let items: Vec<ListItem> = view
        .rows
        .iter()
        .map(|row| {
            let dot = match row.status_dot {
                StatusDot::Online => Span::styled("● ", Style::default().fg(Color::Green)),
                StatusDot::Waiting => Span::styled("● ", Style::default().fg(Color::Yellow)),
                StatusDot::None => Span::raw("  "),
            };
            let mut header = vec![
                dot,
                Span::styled(
                    row.name.clone(),
                    Style::default().add_modifier(if row.selected { Modifier::BOLD } else { Modifier::empty() }),
                ),
                Span::styled(format!("  {}", row.time_label), Style::default().fg(Color::DarkGray)),
            ];
            if row.unread > 0 {
                header.push(Span::styled(
                    format!(" {} ", row.unread),
                    Style::default().fg(Color::White).bg(Color::DarkGray),
                ));
            }
            let preview: String = row.preview.chars().take(36).collect();
            ListItem::new(vec![
                Line::from(header),
                Line::from(Span::styled(format!("  {}", preview), Style::default().fg(Color::Gray))),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(bordered(title))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▶");
    let mut state = ListState::default();
    state.select(Some(app.cursor.min(view.rows.len() - 1)));
    f.render_stateful_widget(list, chunks[1], &mut state);
}

fn draw_chat_window(f: &mut Frame, app: &App, view: &ViewData, area: Rect) {
    let Some(conversation) = &view.selected else {
        let text = vec![
            Line::from(Span::styled(
                view::NO_SELECTION_TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(view::NO_SELECTION_TEXT, Style::default().fg(Color::DarkGray))),
        ];
        f.render_widget(
            Paragraph::new(text).alignment(Alignment::Center).block(bordered(" Conversa ")),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let title = chat_title(conversation);
    let lines: Vec<Line> = conversation.messages().iter().flat_map(message_lines).collect();
    // Keep the newest messages in view
    let visible_rows = chunks[0].height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible_rows) as u16;
    f.render_widget(
        Paragraph::new(lines)
            .block(bordered(&title))
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        chunks[0],
    );

    let (input, style) = if app.mode == Mode::Compose {
        (format!("{}▏", app.input), Style::default().fg(Color::White))
    } else {
        ("Digite uma mensagem... (i)".to_string(), Style::default().fg(Color::DarkGray))
    };
    f.render_widget(Paragraph::new(input).style(style).block(bordered(" Enviar ")), chunks[1]);
}

fn chat_title(conversation: &Conversation) -> String {
    let handler = match conversation.handled_by {
        Handler::Ai => "IA",
        Handler::Agent => "Atendente",
    };
    format!(
        " {} {} · {} · {} ",
        conversation.contact.name,
        conversation.contact.number,
        conversation.status.label(),
        handler
    )
}

fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let time = message.timestamp.format("%H:%M").to_string();
    let mut body = message.content.clone();
    if let Some(media) = &message.media {
        body = format!("{} {}", media.summary(), body);
    }
    match message.sender.label() {
        None => vec![
            Line::from(vec![
                Span::styled(body, Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
                Span::styled(format!(" {}", time), Style::default().fg(Color::DarkGray)),
            ])
            .alignment(Alignment::Right),
            Line::from(""),
        ],
        Some(label) => {
            let color = match message.sender {
                Sender::Ai => ACCENT,
                Sender::Agent | Sender::Customer => Color::Magenta,
            };
            vec![
                Line::from(Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))),
                Line::from(vec![
                    Span::raw(body),
                    Span::styled(format!(" {}", time), Style::default().fg(Color::DarkGray)),
                ]),
                Line::from(""),
            ]
        }
    }
}

fn draw_stats(f: &mut Frame, view: &ViewData, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(area);

    let s = &view.snapshot;
    let rate = |r: Option<f64>| r.map(|r| format!("{:.0}%", r * 100.0)).unwrap_or_else(|| "—".to_string());
    let mut live = vec![
        Line::from(format!("Conversas: {}", s.total_conversations)),
        Line::from(format!(
            "Ativas {} · Aguardando {} · Resolvidas {}",
            s.active, s.waiting, s.resolved
        )),
        Line::from(format!("IA {} · Atendente {}", s.handled_by_ai, s.handled_by_agent)),
        Line::from(format!("Não lidas: {}", s.unread_messages)),
        Line::from(format!("Mensagens: {} · Respostas: {}", s.customer_messages, s.replies)),
        Line::from(format!(
            "Transferências: {} → atendente · {} → IA",
            s.transfers_to_agent, s.transfers_to_ai
        )),
        Line::from(format!(
            "Tempo médio de resposta: {}",
            s.avg_reply_ms
                .map(|ms| format!("{:.1} s", ms as f64 / 1000.0))
                .unwrap_or_else(|| "—".to_string())
        )),
        Line::from(format!("Taxa de resolução pela IA: {}", rate(s.ai_resolution_rate))),
        Line::from(""),
    ];
    for metric in report::headline_metrics() {
        live.push(Line::from(vec![
            Span::raw(format!("{:<28}", metric.label)),
            Span::styled(metric.value, Style::default().add_modifier(Modifier::BOLD)),
        ]));
    }
    f.render_widget(
        Paragraph::new(live).block(bordered(" Ao vivo ")).wrap(Wrap { trim: true }),
        chunks[0],
    );

    let weekly = report::weekly();
    let max = weekly.iter().map(|p| p.conversations).max().unwrap_or(0);
    let mut lines: Vec<Line> = weekly
        .iter()
        .map(|p| {
            Line::from(vec![
                Span::raw(format!("{:<4}", p.label)),
                Span::styled(report::bar(p.conversations, max, 16), Style::default().fg(ACCENT)),
                Span::raw(format!(" {:>3} ", p.conversations)),
                Span::styled(report::bar(p.resolved, max, 16), Style::default().fg(Color::Green)),
                Span::raw(format!(" {:>3}", p.resolved)),
            ])
        })
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Assuntos mais frequentes",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for share in report::topics() {
        lines.push(Line::from(vec![
            Span::raw(format!("{:<22}", share.label)),
            Span::styled(report::bar(share.percent as u32, 100, 16), Style::default().fg(ACCENT)),
            Span::raw(format!(" {:>3}%", share.percent)),
        ]));
    }
    f.render_widget(Paragraph::new(lines).block(bordered(" Atendimentos da semana ")), chunks[1]);
}

fn draw_settings(f: &mut Frame, view: &ViewData, area: Rect) {
    let settings = &view.settings;
    let on_off = |b: bool| {
        if b {
            Span::styled("ligado", Style::default().fg(Color::Green))
        } else {
            Span::styled("desligado", Style::default().fg(Color::Red))
        }
    };
    let heading = |s: &'static str| Line::from(Span::styled(s, Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)));

    let lines = vec![
        heading("WhatsApp"),
        Line::from(format!("API key: {}", settings.whatsapp.masked_api_key())),
        Line::from(format!("Número: {}", settings.whatsapp.number)),
        Line::from(format!("Boas-vindas: {}", settings.whatsapp.welcome_message)),
        Line::from(""),
        heading("Inteligência Artificial"),
        Line::from(vec![Span::raw("Respostas automáticas (r): "), on_off(settings.ai.auto_respond)]),
        Line::from(format!(
            "Limite de mensagens antes de transferir (+/-): {}",
            settings.ai.transfer_threshold
        )),
        Line::from(Span::styled(
            settings.ai.system_prompt.clone(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        heading("Notificações"),
        Line::from(vec![Span::raw("E-mail (e): "), on_off(settings.notifications.email)]),
        Line::from(vec![Span::raw("Navegador (b): "), on_off(settings.notifications.browser)]),
        Line::from(vec![Span::raw("Sons (s): "), on_off(settings.notifications.sound)]),
    ];
    f.render_widget(
        Paragraph::new(lines).block(bordered(" Configurações ")).wrap(Wrap { trim: true }),
        area,
    );
}
