/// Terminal dashboard state and key handling
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use supportdesk_core::analytics::DeskSnapshot;
use supportdesk_core::notify::Notification;
use supportdesk_core::settings::{NotificationChannel, Settings};
use supportdesk_core::view::ListRow;
use supportdesk_core::{Conversation, Handler};

const MAX_TOASTS: usize = 3;
/// Redraw at least this often so list times and toasts stay current
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// The view is rebuilt only after a change or when the refresh interval ran out
pub fn needs_refresh(dirty: bool, since_last: Duration) -> bool {
    dirty || since_last >= REFRESH_INTERVAL
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Chats,
    Stats,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Compose,
    Search,
}

/// What the main loop should do to the desk after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    SetTab(Handler),
    Open(String),
    Close,
    Send(String),
    Transfer(Handler),
    Export,
    ToggleAutoRespond,
    AdjustThreshold(i32),
    ToggleNotification(NotificationChannel),
    TestNotify,
}

/// Everything a frame needs, read from the desk before drawing
pub struct ViewData {
    pub tab: Handler,
    pub rows: Vec<ListRow>,
    pub selected: Option<Conversation>,
    pub snapshot: DeskSnapshot,
    pub settings: Settings,
}

struct Toast {
    notification: Notification,
    shown_at: Instant,
}

pub struct App {
    pub page: Page,
    pub mode: Mode,
    pub search: String,
    pub input: String,
    /// Highlighted row in the chat list
    pub cursor: usize,
    /// Compact layout: list pane (true) or chat pane (false)
    pub show_list: bool,
    pub status: Option<String>,
    toasts: VecDeque<Toast>,
}

impl App {
    pub fn new() -> Self {
        Self {
            page: Page::Chats,
            mode: Mode::Normal,
            search: String::new(),
            input: String::new(),
            cursor: 0,
            show_list: true,
            status: None,
            toasts: VecDeque::new(),
        }
    }

    pub fn push_toast(&mut self, notification: Notification) {
        if self.toasts.len() == MAX_TOASTS {
            self.toasts.pop_front();
        }
        self.toasts.push_back(Toast {
            notification,
            shown_at: Instant::now(),
        });
    }

    /// Drop toasts whose display time ran out
    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| {
            now.duration_since(t.shown_at) < Duration::from_millis(t.notification.duration_ms)
        });
    }

    pub fn toasts(&self) -> impl Iterator<Item = &Notification> {
        self.toasts.iter().map(|t| &t.notification)
    }

    /// Keep the cursor inside a list of `len` rows
    pub fn clamp_cursor(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    pub fn on_key(&mut self, key: KeyEvent, view: &ViewData) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Action::Quit;
        }
        match self.mode {
            Mode::Compose => self.on_compose_key(key),
            Mode::Search => self.on_search_key(key),
            Mode::Normal => self.on_normal_key(key, view),
        }
    }

    fn on_compose_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                Action::None
            }
            KeyCode::Enter => {
                // Blank input keeps the composer open, nothing is sent
                if self.input.trim().is_empty() {
                    return Action::None;
                }
                let text = std::mem::take(&mut self.input);
                Action::Send(text)
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Backspace => {
                self.search.pop();
                self.cursor = 0;
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.cursor = 0;
            }
            _ => {}
        }
        Action::None
    }

    fn on_normal_key(&mut self, key: KeyEvent, view: &ViewData) -> Action {
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('1') => {
                self.page = Page::Chats;
                Action::None
            }
            KeyCode::Char('2') => {
                self.page = Page::Stats;
                Action::None
            }
            KeyCode::Char('3') => {
                self.page = Page::Settings;
                Action::None
            }
            _ => match self.page {
                Page::Chats => self.on_chats_key(key, view),
                Page::Stats => Action::None,
                Page::Settings => self.on_settings_key(key),
            },
        }
    }

    fn on_chats_key(&mut self, key: KeyEvent, view: &ViewData) -> Action {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                Action::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.cursor += 1;
                self.clamp_cursor(view.rows.len());
                Action::None
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.cursor = 0;
                self.show_list = true;
                Action::SetTab(view.tab.other())
            }
            KeyCode::Enter => match view.rows.get(self.cursor) {
                Some(row) => {
                    self.show_list = false;
                    Action::Open(row.id.clone())
                }
                None => Action::None,
            },
            KeyCode::Char('/') => {
                self.mode = Mode::Search;
                Action::None
            }
            KeyCode::Char('i') if view.selected.is_some() => {
                self.mode = Mode::Compose;
                self.show_list = false;
                Action::None
            }
            KeyCode::Char('t') => match &view.selected {
                Some(conversation) => Action::Transfer(conversation.handled_by.other()),
                None => Action::None,
            },
            KeyCode::Char('e') if view.selected.is_some() => Action::Export,
            KeyCode::Esc => {
                self.show_list = true;
                if view.selected.is_some() {
                    Action::Close
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        }
    }

    fn on_settings_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('r') => Action::ToggleAutoRespond,
            KeyCode::Char('+') => Action::AdjustThreshold(1),
            KeyCode::Char('-') => Action::AdjustThreshold(-1),
            KeyCode::Char('n') => Action::TestNotify,
            KeyCode::Char('e') => Action::ToggleNotification(NotificationChannel::Email),
            KeyCode::Char('b') => Action::ToggleNotification(NotificationChannel::Browser),
            KeyCode::Char('s') => Action::ToggleNotification(NotificationChannel::Sound),
            _ => Action::None,
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
