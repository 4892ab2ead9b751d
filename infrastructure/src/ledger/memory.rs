//! Process-local usage ledger

use async_trait::async_trait;
use roundtable_application::{
    LedgerError, UsageFilter, UsageLedger, UsageRecord, UsageStats, UsageStatus,
};
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Keeps every record in memory for the life of the process.
#[derive(Default)]
pub struct InMemoryUsageLedger {
    records: RwLock<Vec<(String, UsageRecord)>>,
}

impl InMemoryUsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn records(&self) -> Vec<UsageRecord> {
        self.records
            .read()
            .await
            .iter()
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl UsageLedger for InMemoryUsageLedger {
    async fn record(&self, record: UsageRecord) -> Result<String, LedgerError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.records.write().await.push((id.clone(), record));
        Ok(id)
    }

    async fn query_stats(&self, filter: &UsageFilter) -> Result<Vec<UsageStats>, LedgerError> {
        let records = self.records.read().await;
        let mut groups: BTreeMap<(&str, &str, &str), UsageStats> = BTreeMap::new();

        for (_, record) in records.iter().filter(|(_, r)| filter.matches(r)) {
            let stats = groups
                .entry((
                    record.provider.as_str(),
                    record.model.as_str(),
                    record.operation.as_str(),
                ))
                .or_insert_with(|| UsageStats {
                    provider: record.provider.clone(),
                    model: record.model.clone(),
                    operation: record.operation.clone(),
                    ..Default::default()
                });
            stats.calls += 1;
            if record.status == UsageStatus::Error {
                stats.failures += 1;
            }
            stats.total_tokens += record.total_tokens;
            stats.total_cost += record.cost;
            stats.total_duration_ms += record.duration_ms;
        }

        Ok(groups.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(model: &str, operation: &str, tokens: u64, status: UsageStatus) -> UsageRecord {
        UsageRecord {
            api_type: "chat".to_string(),
            provider: "openai".to_string(),
            model: model.to_string(),
            operation: operation.to_string(),
            prompt_tokens: tokens,
            completion_tokens: 0,
            total_tokens: tokens,
            cost: tokens as f64 * 0.001,
            duration_ms: 100,
            status,
            error_message: None,
            discussion_id: Some("d1".to_string()),
            recorded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_record_returns_distinct_ids() {
        let ledger = InMemoryUsageLedger::new();
        let a = ledger
            .record(record("m", "discussion_turn", 1, UsageStatus::Success))
            .await
            .unwrap();
        let b = ledger
            .record(record("m", "discussion_turn", 1, UsageStatus::Success))
            .await
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(ledger.len().await, 2);
    }

    #[tokio::test]
    async fn test_stats_group_by_model_and_operation() {
        let ledger = InMemoryUsageLedger::new();
        for r in [
            record("gpt-4o", "discussion_turn", 100, UsageStatus::Success),
            record("gpt-4o", "discussion_turn", 50, UsageStatus::Error),
            record("gpt-4o", "summarize", 30, UsageStatus::Success),
            record("mini", "discussion_turn", 10, UsageStatus::Success),
        ] {
            ledger.record(r).await.unwrap();
        }

        let stats = ledger.query_stats(&UsageFilter::default()).await.unwrap();
        assert_eq!(stats.len(), 3);
        let turns = stats
            .iter()
            .find(|s| s.model == "gpt-4o" && s.operation == "discussion_turn")
            .unwrap();
        assert_eq!(turns.calls, 2);
        assert_eq!(turns.failures, 1);
        assert_eq!(turns.total_tokens, 150);
        assert_eq!(turns.total_duration_ms, 200);
    }

    #[tokio::test]
    async fn test_stats_respect_filter() {
        let ledger = InMemoryUsageLedger::new();
        ledger
            .record(record("gpt-4o", "summarize", 30, UsageStatus::Success))
            .await
            .unwrap();
        ledger
            .record(record("gpt-4o", "discussion_turn", 70, UsageStatus::Success))
            .await
            .unwrap();

        let filter = UsageFilter {
            operation: Some("summarize".to_string()),
            ..Default::default()
        };
        let stats = ledger.query_stats(&filter).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].total_tokens, 30);

        let future = UsageFilter {
            since: Some(Utc::now() + Duration::hours(1)),
            ..Default::default()
        };
        assert!(ledger.query_stats(&future).await.unwrap().is_empty());
    }
}
