// Strategy trait definition

use async_trait::async_trait;
use std::time::Duration;

use super::errors::{ErrorKind, StrategyError};
use super::models::{NormalizedTarget, VideoDetails};

/// One self-contained way of recovering video metadata for a post.
///
/// Implementations must stop their own network/process work once `budget`
/// has elapsed; the orchestrator additionally drops the attempt future at
/// the budget, which cancels whatever is still in flight.
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Name of the strategy (for logging and the response's `strategy` field)
    fn name(&self) -> &'static str;

    /// Wall-clock budget for a single attempt
    fn budget(&self) -> Duration;

    /// Kind reported when the orchestrator cuts the attempt off at its budget
    fn timeout_kind(&self) -> ErrorKind {
        ErrorKind::NetworkError
    }

    /// Kind reported when the attempt panics
    fn fault_kind(&self) -> ErrorKind {
        ErrorKind::NoVideoFound
    }

    /// Try to extract the video for `target` within `budget`
    async fn attempt(
        &self,
        target: &NormalizedTarget,
        budget: Duration,
    ) -> Result<VideoDetails, StrategyError>;
}
