/// Shared types for the support desk: contacts, messages, conversations
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Customer,
    Ai,
    Agent,
}

impl Sender {
    /// Badge shown above a message bubble (customers get none)
    pub fn label(&self) -> Option<&'static str> {
        match self {
            Sender::Customer => None,
            Sender::Ai => Some("IA"),
            Sender::Agent => Some("Atendente"),
        }
    }
}

impl From<Handler> for Sender {
    fn from(handler: Handler) -> Self {
        match handler {
            Handler::Ai => Sender::Ai,
            Handler::Agent => Sender::Agent,
        }
    }
}

/// Lifecycle status of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Waiting,
    Resolved,
}

impl ConversationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "Ativo",
            ConversationStatus::Waiting => "Aguardando",
            ConversationStatus::Resolved => "Resolvido",
        }
    }
}

/// Responder type that currently owns a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handler {
    Ai,
    Agent,
}

impl Handler {
    /// Status a conversation takes when handed to this handler
    pub fn status_on_handoff(&self) -> ConversationStatus {
        match self {
            Handler::Ai => ConversationStatus::Active,
            Handler::Agent => ConversationStatus::Waiting,
        }
    }

    pub fn other(&self) -> Handler {
        match self {
            Handler::Ai => Handler::Agent,
            Handler::Agent => Handler::Ai,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Handler::Ai => "ai",
            Handler::Agent => "agent",
        }
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Handler {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ai" | "ia" => Ok(Handler::Ai),
            "agent" | "atendente" => Ok(Handler::Agent),
            other => Err(format!("unknown handler '{}' (expected ai or agent)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub number: String,
    pub avatar: String,
}

impl Contact {
    pub fn new(name: impl Into<String>, number: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            avatar: avatar.into(),
        }
    }
}

/// Media carried by a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaAttachment {
    Image {
        url: String,
    },
    Audio {
        url: String,
        thumbnail: Option<String>,
        duration_secs: u32,
    },
    Video {
        url: String,
        thumbnail: Option<String>,
        duration_secs: u32,
    },
}

impl MediaAttachment {
    pub fn url(&self) -> &str {
        match self {
            MediaAttachment::Image { url }
            | MediaAttachment::Audio { url, .. }
            | MediaAttachment::Video { url, .. } => url,
        }
    }

    /// Short placeholder used where the media itself cannot be shown
    pub fn summary(&self) -> String {
        match self {
            MediaAttachment::Image { .. } => "[imagem]".to_string(),
            MediaAttachment::Audio { duration_secs, .. } => {
                format!("[áudio {}]", format_duration(*duration_secs))
            }
            MediaAttachment::Video { duration_secs, .. } => {
                format!("[vídeo {}]", format_duration(*duration_secs))
            }
        }
    }
}

fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub timestamp: DateTime<Local>,
    pub sender: Sender,
    pub read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaAttachment>,
}

impl Message {
    /// Build a message with a fresh id prefixed by the sender role
    pub fn new(sender: Sender, content: impl Into<String>, timestamp: DateTime<Local>, read: bool) -> Self {
        let prefix = match sender {
            Sender::Customer => "customer",
            Sender::Ai => "ai",
            Sender::Agent => "agent",
        };
        Self {
            id: format!("{}-{}", prefix, uuid::Uuid::new_v4().simple()),
            content: content.into(),
            timestamp,
            sender,
            read,
            media: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_media(mut self, media: MediaAttachment) -> Self {
        self.media = Some(media);
        self
    }
}

/// One customer's thread plus its handling metadata.
///
/// The cached fields (`last_message`, `last_message_time`, `unread_count`) are
/// only written by [`Conversation::push_message`] and
/// [`Conversation::mark_all_read`], so they always agree with `messages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub id: String,
    pub contact: Contact,
    pub status: ConversationStatus,
    pub handled_by: Handler,
    messages: Vec<Message>,
    last_message: String,
    last_message_time: Option<DateTime<Local>>,
    unread_count: usize,
}

impl Conversation {
    pub fn new(
        id: impl Into<String>,
        contact: Contact,
        status: ConversationStatus,
        handled_by: Handler,
        messages: Vec<Message>,
    ) -> Self {
        let mut conversation = Self {
            id: id.into(),
            contact,
            status,
            handled_by,
            messages,
            last_message: String::new(),
            last_message_time: None,
            unread_count: 0,
        };
        conversation.refresh_cache();
        conversation
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    pub fn last_message_time(&self) -> Option<DateTime<Local>> {
        self.last_message_time
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    /// Append a message at the end of the thread
    pub fn push_message(&mut self, message: Message) {
        if !message.read {
            self.unread_count += 1;
        }
        self.last_message = message.content.clone();
        self.last_message_time = Some(message.timestamp);
        self.messages.push(message);
    }

    /// Flip every message to read; returns how many changed
    pub fn mark_all_read(&mut self) -> usize {
        let mut flipped = 0;
        for message in self.messages.iter_mut().filter(|m| !m.read) {
            message.read = true;
            flipped += 1;
        }
        self.unread_count = 0;
        flipped
    }

    /// Apply a handoff: handler and status always change together
    pub(crate) fn hand_off(&mut self, target: Handler) {
        self.handled_by = target;
        self.status = target.status_on_handoff();
    }

    fn refresh_cache(&mut self) {
        self.unread_count = self.messages.iter().filter(|m| !m.read).count();
        match self.messages.last() {
            Some(last) => {
                self.last_message = last.content.clone();
                self.last_message_time = Some(last.timestamp);
            }
            None => {
                self.last_message.clear();
                self.last_message_time = None;
            }
        }
    }
}
