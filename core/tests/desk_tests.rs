/// Desk tests
/// Delayed replies, handoff notifications, settings and events through the async facade

use std::sync::{Arc, Mutex};
use std::time::Duration;
use supportdesk_core::events::DeskEvent;
use supportdesk_core::notify::{Notification, Notifier};
use supportdesk_core::responder::{CannedResponder, REPLY_TEMPLATES, THANKS_REPLY};
use supportdesk_core::settings::{AiSettings, NotificationChannel};
use supportdesk_core::store::TRANSFER_TO_AGENT_TEXT;
use supportdesk_core::{Config, ConversationStatus, ConversationStore, Desk, DeskError, Handler, Sender, TransferOutcome};

#[derive(Default)]
struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    fn titles(&self) -> Vec<String> {
        self.seen.lock().unwrap().iter().map(|n| n.title.clone()).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: &Notification) {
        self.seen.lock().unwrap().push(notification.clone());
    }
}

fn desk() -> (Desk, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let config = Config {
        reply_delay: Duration::from_millis(1500),
        ..Default::default()
    };
    let store = ConversationStore::seeded(chrono::Local::now(), Handler::Ai);
    let desk = Desk::with_parts(
        config,
        store,
        Arc::new(CannedResponder::with_seed(1)),
        notifier.clone(),
    );
    (desk, notifier)
}

fn index_of(messages: &[supportdesk_core::Message], id: &str) -> usize {
    messages.iter().position(|m| m.id == id).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_reply_follows_its_message() {
    let (desk, _) = desk();
    desk.select("1").await.unwrap();

    let sent = desk.send_message("1", "Onde está meu pedido?").await.unwrap().unwrap();
    let reply = sent.reply.unwrap().wait().await.unwrap();

    assert_eq!(reply.sender, Sender::Ai);
    assert!(reply.read);
    assert!(REPLY_TEMPLATES.contains(&reply.content.as_str()));

    let conv = desk.conversation("1").await.unwrap();
    let messages = conv.messages();
    assert!(index_of(messages, &reply.id) > index_of(messages, &sent.message.id));
    assert_eq!(conv.last_message(), reply.content);
    assert_eq!(conv.unread_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_quick_sends_each_get_a_later_reply() {
    let (desk, _) = desk();

    let first = desk.send_message("3", "hi").await.unwrap().unwrap();
    let second = desk.send_message("3", "there").await.unwrap().unwrap();

    let first_reply = first.reply.unwrap().wait().await.unwrap();
    let second_reply = second.reply.unwrap().wait().await.unwrap();

    let conv = desk.conversation("3").await.unwrap();
    let messages = conv.messages();
    assert!(index_of(messages, &first_reply.id) > index_of(messages, &first.message.id));
    assert!(index_of(messages, &second_reply.id) > index_of(messages, &second.message.id));
    assert_eq!(messages.len(), 3 + 4);

    let unread = messages.iter().filter(|m| !m.read).count();
    assert_eq!(conv.unread_count(), unread);
    assert_eq!(conv.last_message(), messages.last().unwrap().content);
}

#[tokio::test(start_paused = true)]
async fn test_reply_waits_for_delay() {
    let (desk, _) = desk();
    let before = desk.conversation("1").await.unwrap().messages().len();

    let sent = desk.send_message("1", "oi").await.unwrap().unwrap();
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(desk.conversation("1").await.unwrap().messages().len(), before + 1);

    sent.reply.unwrap().wait().await.unwrap();
    assert_eq!(desk.conversation("1").await.unwrap().messages().len(), before + 2);
}

#[tokio::test(start_paused = true)]
async fn test_reply_uses_handler_at_fire_time() {
    let (desk, _) = desk();

    let sent = desk.send_message("1", "Quero falar com uma pessoa").await.unwrap().unwrap();
    desk.transfer_to("1", Handler::Agent).await.unwrap();

    let reply = sent.reply.unwrap().wait().await.unwrap();
    assert_eq!(reply.sender, Sender::Agent);
}

#[tokio::test(start_paused = true)]
async fn test_thanks_gets_thanks_reply() {
    let (desk, _) = desk();
    let sent = desk.send_message("2", "Muito obrigado!").await.unwrap().unwrap();
    let reply = sent.reply.unwrap().wait().await.unwrap();
    assert_eq!(reply.content, THANKS_REPLY);
    assert_eq!(reply.sender, Sender::Agent);
}

#[tokio::test]
async fn test_blank_message_is_ignored() {
    let (desk, _) = desk();
    let before = desk.conversation("1").await.unwrap();
    assert!(desk.send_message("1", "   ").await.unwrap().is_none());
    assert_eq!(desk.conversation("1").await.unwrap(), before);
}

#[tokio::test]
async fn test_unknown_conversation() {
    let (desk, notifier) = desk();
    assert!(matches!(
        desk.send_message("99", "oi").await,
        Err(DeskError::UnknownConversation(_))
    ));
    assert!(desk.select("99").await.is_err());
    assert!(desk.transfer_to("99", Handler::Agent).await.is_err());
    assert!(notifier.titles().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_auto_respond_off_schedules_nothing() {
    let (desk, _) = desk();
    let ai = AiSettings {
        auto_respond: false,
        ..Default::default()
    };
    desk.save_ai_settings(ai).await.unwrap();

    let sent = desk.send_message("1", "oi").await.unwrap().unwrap();
    assert!(sent.reply.is_none());

    tokio::time::sleep(Duration::from_secs(5)).await;
    let conv = desk.conversation("1").await.unwrap();
    assert_eq!(conv.messages().last().unwrap().id, sent.message.id);
}

#[tokio::test]
async fn test_transfer_notifies_once() {
    let (desk, notifier) = desk();

    let outcome = desk.transfer_to("1", Handler::Agent).await.unwrap();
    assert!(matches!(outcome, TransferOutcome::Transferred { .. }));
    let again = desk.transfer_to("1", Handler::Agent).await.unwrap();
    assert_eq!(again, TransferOutcome::AlreadyHandled);

    assert_eq!(notifier.titles(), vec!["Atendimento transferido".to_string()]);
    let duration = notifier.seen.lock().unwrap()[0].duration_ms;
    assert_eq!(duration, 3000);

    let conv = desk.conversation("1").await.unwrap();
    assert_eq!(conv.handled_by, Handler::Agent);
    assert_eq!(conv.status, ConversationStatus::Waiting);
    assert_eq!(conv.last_message(), TRANSFER_TO_AGENT_TEXT);

    let stats = desk.stats().get_stats("1").await.unwrap();
    assert_eq!(stats.transfers_to_agent, 1);
}

#[tokio::test]
async fn test_events_are_broadcast() {
    let (desk, _) = desk();
    let mut rx = desk.subscribe();

    desk.select("1").await.unwrap();
    desk.transfer_to("1", Handler::Agent).await.unwrap();
    assert!(desk.set_tab(Handler::Agent).await);

    assert!(matches!(rx.recv().await.unwrap(), DeskEvent::ConversationRead { conversation_id } if conversation_id == "1"));
    assert!(matches!(rx.recv().await.unwrap(), DeskEvent::MessageAppended { message, .. } if message.sender == Sender::Ai));
    assert!(matches!(
        rx.recv().await.unwrap(),
        DeskEvent::Transferred { from: Handler::Ai, to: Handler::Agent, .. }
    ));
    assert!(matches!(rx.recv().await.unwrap(), DeskEvent::SelectionCleared));

    assert!(desk.store().await.selected().is_none());
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let (desk, notifier) = desk();
    let ai = AiSettings {
        transfer_threshold: 42,
        ..Default::default()
    };
    assert!(matches!(
        desk.save_ai_settings(ai).await,
        Err(DeskError::InvalidSettings(_))
    ));
    assert_eq!(desk.settings().await.ai.transfer_threshold, 3);
    assert!(notifier.titles().is_empty());

    let mut whatsapp = desk.settings().await.whatsapp;
    whatsapp.number = "+55 11 98765-4321".to_string();
    desk.save_whatsapp_settings(whatsapp).await.unwrap();
    assert_eq!(notifier.titles(), vec!["Configurações do WhatsApp salvas".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_tracks_activity() {
    let (desk, _) = desk();
    let sent = desk.send_message("1", "oi").await.unwrap().unwrap();
    sent.reply.unwrap().wait().await.unwrap();
    desk.transfer_to("3", Handler::Agent).await.unwrap();

    let snapshot = desk.snapshot().await;
    assert_eq!(snapshot.customer_messages, 1);
    assert_eq!(snapshot.replies, 1);
    assert!(snapshot.avg_reply_ms.unwrap() >= 1500);
    assert_eq!(snapshot.transfers_to_agent, 1);
    assert_eq!(snapshot.handled_by_agent, 3);
    // Ana's thread left "resolved" when it went to an agent
    assert_eq!(snapshot.resolved, 0);
    assert_eq!(snapshot.ai_resolution_rate, None);
}

#[tokio::test]
async fn test_export_is_json() {
    let (desk, _) = desk();
    let json = desk.export_conversation("4").await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["id"], "4");
    assert_eq!(value["handled_by"], "agent");
    assert_eq!(value["messages"][0]["media"]["kind"], "video");
}

#[tokio::test(start_paused = true)]
async fn test_reply_has_its_own_event() {
    let (desk, _) = desk();
    let mut rx = desk.subscribe();

    let sent = desk.send_message("1", "oi").await.unwrap().unwrap();
    let reply = sent.reply.unwrap().wait().await.unwrap();
    assert_eq!(desk.config().reply_delay, Duration::from_millis(1500));

    let first = rx.recv().await.unwrap();
    assert!(matches!(&first, DeskEvent::MessageAppended { message, .. } if message.id == sent.message.id));
    let second = rx.recv().await.unwrap();
    assert_eq!(second.conversation_id(), Some("1"));
    assert!(matches!(second, DeskEvent::ReplyAppended { message, .. } if message.id == reply.id));
}

#[tokio::test]
async fn test_transfer_announcement_is_not_a_reply() {
    let (desk, _) = desk();
    let mut rx = desk.subscribe();

    desk.transfer_to("2", Handler::Ai).await.unwrap();
    assert!(matches!(rx.recv().await.unwrap(), DeskEvent::MessageAppended { .. }));
    assert!(matches!(rx.recv().await.unwrap(), DeskEvent::Transferred { .. }));
}

#[tokio::test]
async fn test_close_conversation() {
    let (desk, _) = desk();
    let mut rx = desk.subscribe();

    desk.select("1").await.unwrap();
    desk.close_conversation().await;
    assert!(desk.store().await.selected().is_none());
    // Nothing open, nothing to announce
    desk.close_conversation().await;

    assert!(matches!(rx.recv().await.unwrap(), DeskEvent::ConversationRead { .. }));
    assert!(matches!(rx.recv().await.unwrap(), DeskEvent::SelectionCleared));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_notification_switches_save_without_toast() {
    let (desk, notifier) = desk();
    let mut rx = desk.subscribe();

    let mut notifications = desk.settings().await.notifications;
    notifications.toggle(NotificationChannel::Sound);
    desk.save_notification_settings(notifications).await;

    assert!(desk.settings().await.notifications.sound);
    assert!(notifier.titles().is_empty());
    assert!(matches!(rx.recv().await.unwrap(), DeskEvent::SettingsChanged));
}
