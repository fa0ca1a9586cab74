/// Read-only projections used by the chat list and chat window
use crate::model::{Conversation, ConversationStatus};
use chrono::{DateTime, Datelike, Local};
use serde::Serialize;

pub const EMPTY_LIST_TEXT: &str = "Nenhuma conversa encontrada";
pub const NO_SELECTION_TITLE: &str = "Nenhuma conversa selecionada";
pub const NO_SELECTION_TEXT: &str = "Selecione uma conversa da lista para visualizar as mensagens.";

/// Terminals narrower than this show one pane at a time
pub const COMPACT_WIDTH: u16 = 80;

pub fn is_compact_layout(width: u16) -> bool {
    width < COMPACT_WIDTH
}

/// Case-insensitive match on contact name or last message text.
/// An empty term keeps everything, in order.
pub fn search<'a, I>(conversations: I, term: &str) -> Vec<&'a Conversation>
where
    I: IntoIterator<Item = &'a Conversation>,
{
    let needle = term.to_lowercase();
    conversations
        .into_iter()
        .filter(|c| {
            needle.is_empty()
                || c.contact.name.to_lowercase().contains(&needle)
                || c.last_message().to_lowercase().contains(&needle)
        })
        .collect()
}

/// `HH:MM` for today, `dd/MM` otherwise
pub fn format_list_time(time: DateTime<Local>, now: DateTime<Local>) -> String {
    if time.year() == now.year() && time.month() == now.month() && time.day() == now.day() {
        time.format("%H:%M").to_string()
    } else {
        time.format("%d/%m").to_string()
    }
}

/// Indicator next to the avatar; resolved conversations show none
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusDot {
    Online,
    Waiting,
    None,
}

impl From<ConversationStatus> for StatusDot {
    fn from(status: ConversationStatus) -> Self {
        match status {
            ConversationStatus::Active => StatusDot::Online,
            ConversationStatus::Waiting => StatusDot::Waiting,
            ConversationStatus::Resolved => StatusDot::None,
        }
    }
}

/// One row of the chat list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub id: String,
    pub name: String,
    pub preview: String,
    pub time_label: String,
    /// Badge count; zero means no badge
    pub unread: usize,
    pub status_dot: StatusDot,
    pub selected: bool,
}

impl ListRow {
    pub fn build(conversation: &Conversation, selected_id: Option<&str>, now: DateTime<Local>) -> Self {
        Self {
            id: conversation.id.clone(),
            name: conversation.contact.name.clone(),
            preview: conversation.last_message().to_string(),
            time_label: conversation
                .last_message_time()
                .map(|t| format_list_time(t, now))
                .unwrap_or_default(),
            unread: conversation.unread_count(),
            status_dot: conversation.status.into(),
            selected: selected_id == Some(conversation.id.as_str()),
        }
    }
}

pub fn list_rows<'a, I>(conversations: I, selected_id: Option<&str>, now: DateTime<Local>) -> Vec<ListRow>
where
    I: IntoIterator<Item = &'a Conversation>,
{
    conversations
        .into_iter()
        .map(|c| ListRow::build(c, selected_id, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_empty_search_returns_everything_in_order() {
        let convs = seed::conversations(Local::now());
        let found = search(&convs, "");
        let ids: Vec<&str> = found.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_search_matches_name_or_last_message() {
        let convs = seed::conversations(Local::now());

        let by_name: Vec<&str> = search(&convs, "MARIA").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(by_name, vec!["1"]);

        // Ana's last message is "Obrigada pela ajuda!"
        let by_text: Vec<&str> = search(&convs, "pela ajuda").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(by_text, vec!["3"]);

        assert!(search(&convs, "zzz").is_empty());
    }

    #[test]
    fn test_search_ignores_older_messages() {
        let convs = seed::conversations(Local::now());
        // Only in Maria's first message, not her last one
        assert!(search(&convs, "#12345").is_empty());
    }

    #[test]
    fn test_format_list_time() {
        let now = Local.with_ymd_and_hms(2024, 3, 15, 18, 30, 0).unwrap();
        let earlier_today = Local.with_ymd_and_hms(2024, 3, 15, 9, 5, 0).unwrap();
        assert_eq!(format_list_time(earlier_today, now), "09:05");

        let yesterday = now - Duration::days(1);
        assert_eq!(format_list_time(yesterday, now), "14/03");
    }

    #[test]
    fn test_list_rows() {
        let now = Local::now();
        let convs = seed::conversations(now);
        let rows = list_rows(&convs, Some("3"), now);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].unread, 3);
        assert_eq!(rows[0].status_dot, StatusDot::Online);
        assert_eq!(rows[1].status_dot, StatusDot::Waiting);
        assert_eq!(rows[2].status_dot, StatusDot::None);
        assert!(rows[2].selected);
        assert!(!rows[0].selected);
    }

    #[test]
    fn test_compact_layout() {
        assert!(is_compact_layout(60));
        assert!(!is_compact_layout(120));
    }
}
