/// Analytics: live desk statistics and the reporting series
pub mod report;
pub mod stats_collector;

pub use stats_collector::{ConversationStats, DeskSnapshot, StatsCollector};
