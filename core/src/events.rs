/// Real-time desk events, broadcast to every front-end
use crate::model::{Handler, Message};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeskEvent {
    /// A customer message or a transfer announcement was added
    MessageAppended {
        conversation_id: String,
        message: Message,
    },
    /// A scheduled automatic reply landed
    ReplyAppended {
        conversation_id: String,
        message: Message,
    },
    /// A conversation was opened and its messages marked read
    ConversationRead { conversation_id: String },
    /// A conversation changed hands
    Transferred {
        conversation_id: String,
        from: Handler,
        to: Handler,
    },
    /// The selection was dropped (tab change or conversation closed)
    SelectionCleared,
    /// Settings were saved
    SettingsChanged,
}

impl DeskEvent {
    /// Conversation the event is about, if any
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            DeskEvent::MessageAppended { conversation_id, .. }
            | DeskEvent::ReplyAppended { conversation_id, .. }
            | DeskEvent::ConversationRead { conversation_id }
            | DeskEvent::Transferred { conversation_id, .. } => Some(conversation_id),
            DeskEvent::SelectionCleared | DeskEvent::SettingsChanged => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Sender;
    use chrono::Local;

    #[test]
    fn test_conversation_id() {
        let reply = DeskEvent::ReplyAppended {
            conversation_id: "2".to_string(),
            message: Message::new(Sender::Agent, "Vou verificar.", Local::now(), true),
        };
        assert_eq!(reply.conversation_id(), Some("2"));
        assert_eq!(DeskEvent::SelectionCleared.conversation_id(), None);

        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["type"], "reply_appended");
    }
}
