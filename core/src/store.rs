/// Conversation store: the ordered conversation list plus the current selection.
///
/// Every mutation is a plain synchronous method so it can be exercised without
/// a runtime; `Desk` wraps the store in a lock and adds the delayed replies.
use crate::error::{DeskError, Result};
use crate::model::{Conversation, Handler, Message, Sender};
use crate::seed;
use crate::view;
use chrono::{DateTime, Local};
use std::collections::HashMap;
use tracing::debug;

pub const TRANSFER_TO_AGENT_TEXT: &str = "Transferindo para um atendente humano...";
pub const TRANSFER_TO_AI_TEXT: &str = "Transferindo para o assistente virtual...";

/// Announcement appended to the thread when a conversation changes hands
pub fn transfer_announcement(target: Handler) -> &'static str {
    match target {
        Handler::Agent => TRANSFER_TO_AGENT_TEXT,
        Handler::Ai => TRANSFER_TO_AI_TEXT,
    }
}

/// Result of a transfer request
#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    /// The conversation was already owned by the requested handler
    AlreadyHandled,
    /// Handler and status changed; `announcement` was appended to the thread
    Transferred {
        from: Handler,
        to: Handler,
        announcement: Message,
    },
}

pub struct ConversationStore {
    conversations: Vec<Conversation>,
    index: HashMap<String, usize>,
    selected: Option<String>,
    tab: Handler,
}

impl ConversationStore {
    /// Create a store over `conversations`, keeping their order
    pub fn new(conversations: Vec<Conversation>, tab: Handler) -> Self {
        let index = conversations
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        Self {
            conversations,
            index,
            selected: None,
            tab,
        }
    }

    /// Store loaded with the fixed seed conversations
    pub fn seeded(now: DateTime<Local>, tab: Handler) -> Self {
        Self::new(seed::conversations(now), tab)
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.index.get(id).map(|&i| &self.conversations[i])
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Conversation> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn tab(&self) -> Handler {
        self.tab
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut Conversation> {
        match self.index.get(id) {
            Some(&i) => Ok(&mut self.conversations[i]),
            None => Err(DeskError::UnknownConversation(id.to_string())),
        }
    }

    /// Open a conversation: every message becomes read and it becomes the selection.
    /// Returns how many messages flipped to read.
    pub fn select(&mut self, id: &str) -> Result<usize> {
        let flipped = self.get_mut(id)?.mark_all_read();
        self.selected = Some(id.to_string());
        debug!("Selected conversation {} ({} marked read)", id, flipped);
        Ok(flipped)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Switch the handler tab. The selection never carries across tabs.
    /// Returns true when the tab actually changed.
    pub fn set_tab(&mut self, tab: Handler) -> bool {
        if self.tab == tab {
            return false;
        }
        self.tab = tab;
        self.selected = None;
        true
    }

    /// Append a message typed by the customer side of the chat.
    ///
    /// Whitespace-only text is ignored and yields `Ok(None)`.
    pub fn send_message(&mut self, id: &str, text: &str, now: DateTime<Local>) -> Result<Option<Message>> {
        let content = text.trim();
        let conversation = self.get_mut(id)?;
        if content.is_empty() {
            return Ok(None);
        }

        let message = Message::new(Sender::Customer, content, now, true);
        conversation.push_message(message.clone());
        debug!("Conversation {}: customer message {}", id, message.id);
        Ok(Some(message))
    }

    /// Append an automatic reply on behalf of whoever handles the conversation right now
    pub fn append_reply(&mut self, id: &str, content: &str, now: DateTime<Local>) -> Result<Message> {
        let conversation = self.get_mut(id)?;
        let message = Message::new(Sender::from(conversation.handled_by), content, now, true);
        conversation.push_message(message.clone());
        debug!("Conversation {}: {} reply {}", id, conversation.handled_by, message.id);
        Ok(message)
    }

    /// Hand a conversation to `target`.
    ///
    /// The announcement is written by the previous handler, then handler and
    /// status change together. Transferring to the current handler is a no-op.
    pub fn transfer_to(&mut self, id: &str, target: Handler, now: DateTime<Local>) -> Result<TransferOutcome> {
        let conversation = self.get_mut(id)?;
        let from = conversation.handled_by;
        if from == target {
            return Ok(TransferOutcome::AlreadyHandled);
        }

        let announcement = Message::new(Sender::from(from), transfer_announcement(target), now, true);
        conversation.push_message(announcement.clone());
        conversation.hand_off(target);

        Ok(TransferOutcome::Transferred {
            from,
            to: target,
            announcement,
        })
    }

    /// Conversations owned by `handler`, in list order
    pub fn filter_by_handler(&self, handler: Handler) -> Vec<&Conversation> {
        self.conversations
            .iter()
            .filter(|c| c.handled_by == handler)
            .collect()
    }

    /// What the chat list shows: the active tab, narrowed by the search term
    pub fn visible(&self, term: &str) -> Vec<&Conversation> {
        view::search(self.filter_by_handler(self.tab), term)
    }

    /// Whether `id` is one of the rows the list currently shows
    pub fn is_visible(&self, id: &str, term: &str) -> bool {
        self.visible(term).iter().any(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contact, ConversationStatus};

    fn assert_invariants(store: &ConversationStore) {
        for conv in store.conversations() {
            let unread = conv.messages().iter().filter(|m| !m.read).count();
            assert_eq!(conv.unread_count(), unread, "unread cache for {}", conv.id);
            let last = conv.messages().last().unwrap();
            assert_eq!(conv.last_message(), last.content);
            assert_eq!(conv.last_message_time(), Some(last.timestamp));
        }
    }

    fn seeded() -> ConversationStore {
        ConversationStore::seeded(Local::now(), Handler::Ai)
    }

    #[test]
    fn test_select_marks_everything_read() {
        let mut store = seeded();
        assert_eq!(store.get("1").unwrap().unread_count(), 3);

        let flipped = store.select("1").unwrap();
        assert_eq!(flipped, 3);

        let conv = store.get("1").unwrap();
        assert_eq!(conv.unread_count(), 0);
        assert!(conv.messages().iter().all(|m| m.read));
        assert_eq!(store.selected().map(|c| c.id.as_str()), Some("1"));
        assert_invariants(&store);
    }

    #[test]
    fn test_select_unknown_id() {
        let mut store = seeded();
        let err = store.select("nope").unwrap_err();
        assert!(matches!(err, DeskError::UnknownConversation(id) if id == "nope"));
        assert!(store.selected().is_none());
    }

    #[test]
    fn test_send_message_appends_customer_message() {
        let mut store = seeded();
        let now = Local::now();
        let msg = store.send_message("2", "  Alguma novidade?  ", now).unwrap().unwrap();

        assert_eq!(msg.sender, Sender::Customer);
        assert!(msg.read);
        assert_eq!(msg.content, "Alguma novidade?");

        let conv = store.get("2").unwrap();
        assert_eq!(conv.last_message(), "Alguma novidade?");
        assert_eq!(conv.last_message_time(), Some(now));
        assert_invariants(&store);
    }

    #[test]
    fn test_send_blank_message_is_noop() {
        let mut store = seeded();
        let before = store.get("2").unwrap().clone();
        assert!(store.send_message("2", "   \n", Local::now()).unwrap().is_none());
        assert_eq!(store.get("2").unwrap(), &before);
    }

    #[test]
    fn test_reply_uses_current_handler() {
        let mut store = seeded();
        let reply = store.append_reply("4", "Vou verificar.", Local::now()).unwrap();
        assert_eq!(reply.sender, Sender::Agent);

        store.transfer_to("4", Handler::Ai, Local::now()).unwrap();
        let reply = store.append_reply("4", "Olá!", Local::now()).unwrap();
        assert_eq!(reply.sender, Sender::Ai);
        assert_invariants(&store);
    }

    #[test]
    fn test_transfer_ai_to_agent() {
        let conv = Conversation::new(
            "x",
            Contact::new("Paula", "+55 11 91111-2222", ""),
            ConversationStatus::Waiting,
            Handler::Ai,
            vec![Message::new(Sender::Customer, "Quero falar com alguém", Local::now(), false)],
        );
        let mut store = ConversationStore::new(vec![conv], Handler::Ai);

        let outcome = store.transfer_to("x", Handler::Agent, Local::now()).unwrap();
        assert!(matches!(
            outcome,
            TransferOutcome::Transferred { from: Handler::Ai, to: Handler::Agent, .. }
        ));

        let conv = store.get("x").unwrap();
        assert_eq!(conv.handled_by, Handler::Agent);
        assert_eq!(conv.status, ConversationStatus::Waiting);
        let last = conv.messages().last().unwrap();
        assert_eq!(last.sender, Sender::Ai);
        assert_eq!(last.content, TRANSFER_TO_AGENT_TEXT);
        assert_invariants(&store);
    }

    #[test]
    fn test_transfer_agent_to_ai_activates() {
        let mut store = seeded();
        store.transfer_to("2", Handler::Ai, Local::now()).unwrap();

        let conv = store.get("2").unwrap();
        assert_eq!(conv.handled_by, Handler::Ai);
        assert_eq!(conv.status, ConversationStatus::Active);
        assert_eq!(conv.messages().last().unwrap().sender, Sender::Agent);
        assert_eq!(conv.last_message(), TRANSFER_TO_AI_TEXT);
    }

    #[test]
    fn test_transfer_is_idempotent() {
        let mut once = seeded();
        let mut twice = seeded();
        // Message ids differ between stores, compare everything else
        once.transfer_to("1", Handler::Agent, Local::now()).unwrap();
        twice.transfer_to("1", Handler::Agent, Local::now()).unwrap();
        let second = twice.transfer_to("1", Handler::Agent, Local::now()).unwrap();

        assert_eq!(second, TransferOutcome::AlreadyHandled);
        let a = once.get("1").unwrap();
        let b = twice.get("1").unwrap();
        assert_eq!(a.messages().len(), b.messages().len());
        assert_eq!(a.handled_by, b.handled_by);
        assert_eq!(a.status, b.status);
        assert_eq!(a.last_message(), b.last_message());
    }

    #[test]
    fn test_filter_by_handler_preserves_order() {
        let store = seeded();
        let agents: Vec<&str> = store
            .filter_by_handler(Handler::Agent)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(agents, vec!["2", "4"]);
        let ais: Vec<&str> = store
            .filter_by_handler(Handler::Ai)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ais, vec!["1", "3"]);
    }

    #[test]
    fn test_tab_change_clears_selection() {
        let mut store = seeded();
        store.select("1").unwrap();

        assert!(!store.set_tab(Handler::Ai));
        assert_eq!(store.selected_id(), Some("1"));

        assert!(store.set_tab(Handler::Agent));
        assert!(store.selected().is_none());
        assert_eq!(store.tab(), Handler::Agent);
    }

    #[test]
    fn test_visible_combines_tab_and_search() {
        let mut store = seeded();
        store.set_tab(Handler::Agent);
        let ids: Vec<&str> = store.visible("carlos").iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["4"]);
        assert_eq!(store.visible("").len(), 2);
    }

    #[test]
    fn test_is_visible_follows_tab_and_search() {
        let mut store = seeded();
        assert!(store.is_visible("1", ""));
        assert!(!store.is_visible("2", ""));
        assert!(!store.is_visible("1", "carlos"));
        assert!(!store.is_visible("99", ""));

        store.set_tab(Handler::Agent);
        assert!(store.is_visible("2", ""));
        assert!(!store.is_visible("1", ""));
    }

    #[test]
    fn test_clear_selection() {
        let mut store = seeded();
        store.select("3").unwrap();
        store.clear_selection();
        assert!(store.selected().is_none());
        assert_eq!(store.get("3").unwrap().unread_count(), 0);
    }
}
