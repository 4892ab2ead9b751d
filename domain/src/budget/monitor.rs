//! Budget monitor
//!
//! Time is measured in active time only: the span between `pause` and
//! `resume` is excluded. Every method takes the current instant so callers
//! can drive the monitor from a simulated clock.

use crate::llm::completion::TokenUsage;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Configured ceilings. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BudgetLimits {
    pub time_limit: Option<Duration>,
    pub token_limit: Option<u64>,
}

/// Which budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetCause {
    TimeLimit,
    TokenLimit,
}

impl BudgetCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetCause::TimeLimit => "time_limit",
            BudgetCause::TokenLimit => "token_limit",
        }
    }
}

impl std::fmt::Display for BudgetCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token totals for one discussion.
///
/// `total_tokens` counts agent turns only; summarization calls are tallied
/// in `summarization_tokens`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsageStats {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub agent_calls: u64,
    pub summarization_tokens: u64,
}

#[derive(Debug, Clone)]
pub struct BudgetMonitor {
    limits: BudgetLimits,
    started_at: Option<Instant>,
    paused_at: Option<Instant>,
    paused_total: Duration,
    usage: TokenUsageStats,
    rounds: u32,
    warned: HashSet<BudgetCause>,
}

impl BudgetMonitor {
    pub fn new(limits: BudgetLimits) -> Self {
        Self {
            limits,
            started_at: None,
            paused_at: None,
            paused_total: Duration::ZERO,
            usage: TokenUsageStats::default(),
            rounds: 0,
            warned: HashSet::new(),
        }
    }

    pub fn limits(&self) -> BudgetLimits {
        self.limits
    }

    /// Reset every counter and start the active-time clock.
    pub fn start(&mut self, now: Instant) {
        *self = Self::new(self.limits);
        self.started_at = Some(now);
    }

    pub fn pause(&mut self, now: Instant) {
        if self.started_at.is_some() && self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_duration_since(paused_at);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Active time since `start`, excluding paused spans.
    pub fn elapsed(&self, now: Instant) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let end = self.paused_at.unwrap_or(now);
        end.saturating_duration_since(started_at)
            .saturating_sub(self.paused_total)
    }

    // ==================== Counters ====================

    pub fn record_agent_usage(&mut self, usage: &TokenUsage) {
        self.usage.prompt_tokens += usage.prompt_tokens;
        self.usage.completion_tokens += usage.completion_tokens;
        self.usage.total_tokens += usage.total_tokens;
        self.usage.agent_calls += 1;
    }

    pub fn record_summarization_usage(&mut self, usage: &TokenUsage) {
        self.usage.summarization_tokens += usage.total_tokens;
    }

    pub fn usage(&self) -> TokenUsageStats {
        self.usage
    }

    /// Mirror the scheduler's round counter.
    pub fn set_rounds(&mut self, rounds: u32) {
        self.rounds = rounds;
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    // ==================== Checks ====================

    /// First exhausted budget, time before tokens.
    pub fn check(&self, now: Instant) -> Option<BudgetCause> {
        if let Some(limit) = self.limits.time_limit
            && self.elapsed(now) >= limit
        {
            return Some(BudgetCause::TimeLimit);
        }
        if let Some(limit) = self.limits.token_limit
            && self.usage.total_tokens >= limit
        {
            return Some(BudgetCause::TokenLimit);
        }
        None
    }

    /// Every exhausted budget not yet warned about; marks them warned.
    pub fn new_warnings(&mut self, now: Instant) -> Vec<BudgetCause> {
        let mut causes = Vec::new();
        if let Some(limit) = self.limits.time_limit
            && self.elapsed(now) >= limit
        {
            causes.push(BudgetCause::TimeLimit);
        }
        if let Some(limit) = self.limits.token_limit
            && self.usage.total_tokens >= limit
        {
            causes.push(BudgetCause::TokenLimit);
        }
        causes.retain(|cause| self.warned.insert(*cause));
        causes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits(secs: u64, tokens: u64) -> BudgetLimits {
        BudgetLimits {
            time_limit: Some(Duration::from_secs(secs)),
            token_limit: Some(tokens),
        }
    }

    #[test]
    fn test_paused_time_is_excluded() {
        let t0 = Instant::now();
        let mut monitor = BudgetMonitor::new(limits(60, 1000));
        monitor.start(t0);

        monitor.pause(t0 + Duration::from_secs(10));
        // Still paused: elapsed is frozen
        assert_eq!(monitor.elapsed(t0 + Duration::from_secs(100)), Duration::from_secs(10));

        monitor.resume(t0 + Duration::from_secs(100));
        assert_eq!(monitor.elapsed(t0 + Duration::from_secs(105)), Duration::from_secs(15));
    }

    #[test]
    fn test_time_limit_reached() {
        let t0 = Instant::now();
        let mut monitor = BudgetMonitor::new(limits(30, 1000));
        monitor.start(t0);
        assert_eq!(monitor.check(t0 + Duration::from_secs(29)), None);
        assert_eq!(
            monitor.check(t0 + Duration::from_secs(30)),
            Some(BudgetCause::TimeLimit)
        );
    }

    #[test]
    fn test_token_limit_counts_agent_usage_only() {
        let t0 = Instant::now();
        let mut monitor = BudgetMonitor::new(limits(600, 100));
        monitor.start(t0);

        monitor.record_summarization_usage(&TokenUsage::new(500, 500));
        assert_eq!(monitor.check(t0), None);

        monitor.record_agent_usage(&TokenUsage::new(60, 40));
        assert_eq!(monitor.check(t0), Some(BudgetCause::TokenLimit));

        let usage = monitor.usage();
        assert_eq!(usage.total_tokens, 100);
        assert_eq!(usage.agent_calls, 1);
        assert_eq!(usage.summarization_tokens, 1000);
    }

    #[test]
    fn test_warnings_fire_once_per_cause() {
        let t0 = Instant::now();
        let mut monitor = BudgetMonitor::new(limits(1, 10));
        monitor.start(t0);
        monitor.record_agent_usage(&TokenUsage::new(10, 0));

        let later = t0 + Duration::from_secs(2);
        assert_eq!(
            monitor.new_warnings(later),
            vec![BudgetCause::TimeLimit, BudgetCause::TokenLimit]
        );
        assert!(monitor.new_warnings(later).is_empty());
    }

    #[test]
    fn test_start_resets_counters() {
        let t0 = Instant::now();
        let mut monitor = BudgetMonitor::new(BudgetLimits::default());
        monitor.start(t0);
        monitor.record_agent_usage(&TokenUsage::new(1, 1));
        monitor.set_rounds(4);

        monitor.start(t0 + Duration::from_secs(5));
        assert_eq!(monitor.usage(), TokenUsageStats::default());
        assert_eq!(monitor.rounds(), 0);
        assert_eq!(monitor.check(t0 + Duration::from_secs(500)), None);
    }
}
