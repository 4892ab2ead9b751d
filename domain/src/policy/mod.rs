//! Swappable retry and quality policies

pub mod quality;
pub mod retry;

pub use quality::{DecisionCoverageScorer, NoQualityScore, QualityScorer};
pub use retry::{ExponentialBackoff, NoRetry, RetryPolicy};
