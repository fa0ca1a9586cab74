/// Statistics collector for the support desk
/// Collects per-conversation message counts, reply latency and transfers
use crate::model::{ConversationStatus, Handler};
use crate::store::ConversationStore;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Activity counters for one conversation
#[derive(Debug, Clone)]
pub struct ConversationStats {
    pub conversation_id: String,
    pub customer_messages: u64,
    pub replies: u64,
    pub reply_latency: Option<Duration>, // Average delay between a message and its reply
    pub transfers_to_agent: u64,
    pub transfers_to_ai: u64,
}

impl ConversationStats {
    pub fn new(conversation_id: String) -> Self {
        Self {
            conversation_id,
            customer_messages: 0,
            replies: 0,
            reply_latency: None,
            transfers_to_agent: 0,
            transfers_to_ai: 0,
        }
    }
}

/// Statistics collector for all conversations
pub struct StatsCollector {
    stats: Arc<RwLock<HashMap<String, ConversationStats>>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record a message typed on the customer side
    pub async fn record_customer_message(&self, conversation_id: &str) {
        let mut stats = self.stats.write().await;
        let entry = stats
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationStats::new(conversation_id.to_string()));
        entry.customer_messages += 1;
    }

    /// Record an automatic reply and how long it took to arrive
    pub async fn record_reply(&self, conversation_id: &str, latency: Duration) {
        let mut stats = self.stats.write().await;
        let entry = stats
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationStats::new(conversation_id.to_string()));

        // Running mean over every reply seen so far
        let n = entry.replies as u32;
        entry.reply_latency = Some(
            entry
                .reply_latency
                .map(|avg| (avg * n + latency) / (n + 1))
                .unwrap_or(latency),
        );
        entry.replies += 1;
    }

    /// Record a handoff to `to`
    pub async fn record_transfer(&self, conversation_id: &str, to: Handler) {
        let mut stats = self.stats.write().await;
        let entry = stats
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationStats::new(conversation_id.to_string()));
        match to {
            Handler::Agent => entry.transfers_to_agent += 1,
            Handler::Ai => entry.transfers_to_ai += 1,
        }
    }

    /// Get stats for a conversation
    pub async fn get_stats(&self, conversation_id: &str) -> Option<ConversationStats> {
        let stats = self.stats.read().await;
        stats.get(conversation_id).cloned()
    }

    /// Get all stats
    pub async fn get_all_stats(&self) -> Vec<ConversationStats> {
        let stats = self.stats.read().await;
        stats.values().cloned().collect()
    }
}

impl Clone for StatsCollector {
    fn clone(&self) -> Self {
        Self {
            stats: self.stats.clone(),
        }
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Live numbers for the analytics page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeskSnapshot {
    pub total_conversations: usize,
    pub active: usize,
    pub waiting: usize,
    pub resolved: usize,
    pub handled_by_ai: usize,
    pub handled_by_agent: usize,
    pub unread_messages: usize,
    pub customer_messages: u64,
    pub replies: u64,
    pub transfers_to_agent: u64,
    pub transfers_to_ai: u64,
    /// Mean reply delay in milliseconds, weighted by reply count
    pub avg_reply_ms: Option<u64>,
    /// Share of resolved conversations closed by the AI (0.0 to 1.0)
    pub ai_resolution_rate: Option<f64>,
}

impl DeskSnapshot {
    pub fn compute(store: &ConversationStore, stats: &[ConversationStats]) -> Self {
        let conversations = store.conversations();
        let count_status = |status: ConversationStatus| conversations.iter().filter(|c| c.status == status).count();
        let count_handler = |handler: Handler| conversations.iter().filter(|c| c.handled_by == handler).count();

        let resolved = count_status(ConversationStatus::Resolved);
        let resolved_by_ai = conversations
            .iter()
            .filter(|c| c.status == ConversationStatus::Resolved && c.handled_by == Handler::Ai)
            .count();

        let replies: u64 = stats.iter().map(|s| s.replies).sum();
        let weighted_ms: u128 = stats
            .iter()
            .filter_map(|s| s.reply_latency.map(|l| l.as_millis() * s.replies as u128))
            .sum();

        Self {
            total_conversations: conversations.len(),
            active: count_status(ConversationStatus::Active),
            waiting: count_status(ConversationStatus::Waiting),
            resolved,
            handled_by_ai: count_handler(Handler::Ai),
            handled_by_agent: count_handler(Handler::Agent),
            unread_messages: conversations.iter().map(|c| c.unread_count()).sum(),
            customer_messages: stats.iter().map(|s| s.customer_messages).sum(),
            replies,
            transfers_to_agent: stats.iter().map(|s| s.transfers_to_agent).sum(),
            transfers_to_ai: stats.iter().map(|s| s.transfers_to_ai).sum(),
            avg_reply_ms: (replies > 0).then(|| (weighted_ms / replies as u128) as u64),
            ai_resolution_rate: (resolved > 0).then(|| resolved_by_ai as f64 / resolved as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    #[tokio::test]
    async fn test_stats_collector() {
        let collector = StatsCollector::new();

        collector.record_customer_message("1").await;
        collector.record_reply("1", Duration::from_millis(1000)).await;
        collector.record_reply("1", Duration::from_millis(2000)).await;
        collector.record_transfer("1", Handler::Agent).await;

        let stats = collector.get_stats("1").await;
        assert!(stats.is_some());
        let stats = stats.unwrap();
        assert_eq!(stats.customer_messages, 1);
        assert_eq!(stats.replies, 2);
        assert_eq!(stats.reply_latency, Some(Duration::from_millis(1500)));
        assert_eq!(stats.transfers_to_agent, 1);
        assert_eq!(stats.transfers_to_ai, 0);

        assert!(collector.get_stats("2").await.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_over_seed() {
        let store = ConversationStore::seeded(Local::now(), Handler::Ai);
        let collector = StatsCollector::new();
        collector.record_reply("1", Duration::from_millis(1500)).await;
        collector.record_reply("2", Duration::from_millis(500)).await;

        let snapshot = DeskSnapshot::compute(&store, &collector.get_all_stats().await);
        assert_eq!(snapshot.total_conversations, 4);
        assert_eq!(snapshot.active, 2);
        assert_eq!(snapshot.waiting, 1);
        assert_eq!(snapshot.resolved, 1);
        assert_eq!(snapshot.handled_by_ai, 2);
        assert_eq!(snapshot.handled_by_agent, 2);
        assert_eq!(snapshot.unread_messages, 4);
        assert_eq!(snapshot.replies, 2);
        assert_eq!(snapshot.avg_reply_ms, Some(1000));
        // Ana's conversation is the only resolved one and the AI closed it
        assert_eq!(snapshot.ai_resolution_rate, Some(1.0));
    }

    #[test]
    fn test_snapshot_without_activity() {
        let store = ConversationStore::new(Vec::new(), Handler::Ai);
        let snapshot = DeskSnapshot::compute(&store, &[]);
        assert_eq!(snapshot.total_conversations, 0);
        assert_eq!(snapshot.avg_reply_ms, None);
        assert_eq!(snapshot.ai_resolution_rate, None);
    }
}
