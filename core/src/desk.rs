/// Support desk: the conversation store plus replies, notifications and analytics
use crate::analytics::{DeskSnapshot, StatsCollector};
use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::events::DeskEvent;
use crate::model::{Conversation, Handler, Message};
use crate::notify::{Notification, Notifier};
use crate::responder::{CannedResponder, Responder};
use crate::settings::{AiSettings, NotificationSettings, Settings, WhatsappSettings};
use crate::store::{ConversationStore, TransferOutcome};
use chrono::Local;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock, RwLockReadGuard};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A customer message that was accepted, with its scheduled reply (if any)
#[derive(Debug)]
pub struct Sent {
    pub message: Message,
    pub reply: Option<PendingReply>,
}

/// Handle on a scheduled reply. Dropping it leaves the reply running.
#[derive(Debug)]
pub struct PendingReply {
    handle: JoinHandle<Option<Message>>,
}

impl PendingReply {
    /// Wait for the reply to land; `None` if its conversation disappeared
    pub async fn wait(self) -> Option<Message> {
        match self.handle.await {
            Ok(message) => message,
            Err(e) => {
                warn!("Reply task failed: {}", e);
                None
            }
        }
    }
}

#[derive(Clone)]
pub struct Desk {
    config: Config,
    store: Arc<RwLock<ConversationStore>>,
    settings: Arc<RwLock<Settings>>,
    responder: Arc<dyn Responder>,
    notifier: Arc<dyn Notifier>,
    stats: StatsCollector,
    events: broadcast::Sender<DeskEvent>,
}

impl Desk {
    /// Desk over the seed conversations
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Self {
        let store = ConversationStore::seeded(Local::now(), config.initial_tab);
        let responder: Arc<dyn Responder> = match config.rng_seed {
            Some(seed) => Arc::new(CannedResponder::with_seed(seed)),
            None => Arc::new(CannedResponder::new()),
        };
        Self::with_parts(config, store, responder, notifier)
    }

    pub fn with_parts(
        config: Config,
        store: ConversationStore,
        responder: Arc<dyn Responder>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        info!(
            "Desk ready: {} conversations, reply delay {:?}",
            store.conversations().len(),
            config.reply_delay
        );
        Self {
            config,
            store: Arc::new(RwLock::new(store)),
            settings: Arc::new(RwLock::new(Settings::default())),
            responder,
            notifier,
            stats: StatsCollector::new(),
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.events.subscribe()
    }

    /// Read access to the store; keep the guard short, replies wait on it
    pub async fn store(&self) -> RwLockReadGuard<'_, ConversationStore> {
        self.store.read().await
    }

    pub async fn conversation(&self, id: &str) -> Option<Conversation> {
        self.store.read().await.get(id).cloned()
    }

    fn emit(&self, event: DeskEvent) {
        // Nobody listening is fine
        let _ = self.events.send(event);
    }

    // ─── Conversation operations ────────────────────────────────────────────

    /// Open a conversation and mark it read
    pub async fn select(&self, id: &str) -> Result<Conversation> {
        let mut store = self.store.write().await;
        store.select(id)?;
        let conversation = store
            .get(id)
            .cloned()
            .ok_or_else(|| DeskError::UnknownConversation(id.to_string()))?;
        drop(store);

        self.emit(DeskEvent::ConversationRead {
            conversation_id: id.to_string(),
        });
        Ok(conversation)
    }

    /// Switch the handler tab; any selection is dropped
    pub async fn set_tab(&self, tab: Handler) -> bool {
        let mut store = self.store.write().await;
        let had_selection = store.selected_id().is_some();
        let changed = store.set_tab(tab);
        drop(store);

        if changed && had_selection {
            self.emit(DeskEvent::SelectionCleared);
        }
        changed
    }

    /// Close the open conversation (the chat window's back button)
    pub async fn close_conversation(&self) {
        let mut store = self.store.write().await;
        let had_selection = store.selected_id().is_some();
        store.clear_selection();
        drop(store);

        if had_selection {
            self.emit(DeskEvent::SelectionCleared);
        }
    }

    /// Append a customer message and schedule the automatic reply.
    ///
    /// Blank text is ignored (`Ok(None)`). The reply fires after the configured
    /// delay and is written by whoever handles the conversation at that moment.
    pub async fn send_message(&self, id: &str, text: &str) -> Result<Option<Sent>> {
        let message = {
            let mut store = self.store.write().await;
            store.send_message(id, text, Local::now())?
        };
        let Some(message) = message else {
            return Ok(None);
        };

        self.stats.record_customer_message(id).await;
        self.emit(DeskEvent::MessageAppended {
            conversation_id: id.to_string(),
            message: message.clone(),
        });

        let reply = if self.settings.read().await.ai.auto_respond {
            Some(self.schedule_reply(id.to_string(), message.content.clone()))
        } else {
            debug!("Auto-respond disabled, no reply for {}", id);
            None
        };

        Ok(Some(Sent { message, reply }))
    }

    fn schedule_reply(&self, id: String, customer_text: String) -> PendingReply {
        let desk = self.clone();
        let sent_at = Instant::now();
        let handle = tokio::spawn(async move {
            sleep(desk.config.reply_delay).await;

            let message = {
                let mut store = desk.store.write().await;
                let handler = match store.get(&id) {
                    Some(conversation) => conversation.handled_by,
                    None => {
                        warn!("Dropping reply for vanished conversation {}", id);
                        return None;
                    }
                };
                let content = desk.responder.reply(&customer_text, handler);
                match store.append_reply(&id, &content, Local::now()) {
                    Ok(message) => message,
                    Err(e) => {
                        warn!("Dropping reply for {}: {}", id, e);
                        return None;
                    }
                }
            };

            desk.stats.record_reply(&id, sent_at.elapsed()).await;
            desk.emit(DeskEvent::ReplyAppended {
                conversation_id: id,
                message: message.clone(),
            });
            Some(message)
        });
        PendingReply { handle }
    }

    /// Hand a conversation to `target`; a no-op when it already owns it
    pub async fn transfer_to(&self, id: &str, target: Handler) -> Result<TransferOutcome> {
        let outcome = {
            let mut store = self.store.write().await;
            store.transfer_to(id, target, Local::now())?
        };

        if let TransferOutcome::Transferred { from, to, announcement } = &outcome {
            info!("🔀 Conversation {} transferred {} → {}", id, from, to);
            self.stats.record_transfer(id, *to).await;
            self.emit(DeskEvent::MessageAppended {
                conversation_id: id.to_string(),
                message: announcement.clone(),
            });
            self.emit(DeskEvent::Transferred {
                conversation_id: id.to_string(),
                from: *from,
                to: *to,
            });
            self.notifier.notify(&self.transfer_notification(*to));
        } else {
            debug!("Conversation {} already handled by {}", id, target);
        }

        Ok(outcome)
    }

    fn transfer_notification(&self, to: Handler) -> Notification {
        let message = match to {
            Handler::Agent => "Um agente humano assumirá a conversa em breve.",
            Handler::Ai => "A IA assumirá a conversa a partir de agora.",
        };
        Notification::new("Atendimento transferido", message, self.config.notification_duration_ms)
    }

    /// Conversation as pretty-printed JSON
    pub async fn export_conversation(&self, id: &str) -> Result<String> {
        let store = self.store.read().await;
        let conversation = store
            .get(id)
            .ok_or_else(|| DeskError::UnknownConversation(id.to_string()))?;
        Ok(serde_json::to_string_pretty(conversation)?)
    }

    // ─── Settings ───────────────────────────────────────────────────────────

    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    pub async fn save_whatsapp_settings(&self, whatsapp: WhatsappSettings) -> Result<()> {
        whatsapp.validate()?;
        self.settings.write().await.whatsapp = whatsapp;
        self.settings_saved(
            "Configurações do WhatsApp salvas",
            "As configurações de WhatsApp foram atualizadas com sucesso.",
        );
        Ok(())
    }

    pub async fn save_ai_settings(&self, ai: AiSettings) -> Result<()> {
        ai.validate()?;
        self.settings.write().await.ai = ai;
        self.settings_saved(
            "Configurações da IA salvas",
            "As configurações de IA foram atualizadas com sucesso.",
        );
        Ok(())
    }

    /// Notification switches apply immediately, there is no save step to confirm
    pub async fn save_notification_settings(&self, notifications: NotificationSettings) {
        debug!("Notification settings: {:?}", notifications);
        self.settings.write().await.notifications = notifications;
        self.emit(DeskEvent::SettingsChanged);
    }

    fn settings_saved(&self, title: &str, message: &str) {
        info!("⚙️  {}", title);
        self.emit(DeskEvent::SettingsChanged);
        self.notifier.notify(&Notification::new(
            title,
            message,
            self.config.notification_duration_ms,
        ));
    }

    /// Fire a sample notification so the operator can check delivery
    pub fn test_notifications(&self) {
        self.notifier.notify(&Notification::new(
            "Notificação de teste",
            "Se você está vendo esta mensagem, as notificações estão funcionando.",
            self.config.notification_duration_ms,
        ));
    }

    // ─── Analytics ──────────────────────────────────────────────────────────

    pub fn stats(&self) -> &StatsCollector {
        &self.stats
    }

    pub async fn snapshot(&self) -> DeskSnapshot {
        let stats = self.stats.get_all_stats().await;
        let store = self.store.read().await;
        DeskSnapshot::compute(&store, &stats)
    }
}
