/// SupportDesk - customer-support chat desk
///
/// Conversation store with AI / agent handoff, simulated replies,
/// settings and analytics, shared by the console and terminal front-ends.

pub mod analytics;
pub mod config;
pub mod console;
pub mod desk;
pub mod error;
pub mod events;
pub mod model;
pub mod notify;
pub mod responder;
pub mod seed;
pub mod settings;
pub mod store;
pub mod view;

pub use config::Config;
pub use desk::{Desk, PendingReply, Sent};
pub use error::{DeskError, Result};
pub use model::{Contact, Conversation, ConversationStatus, Handler, MediaAttachment, Message, Sender};
pub use store::{ConversationStore, TransferOutcome};
