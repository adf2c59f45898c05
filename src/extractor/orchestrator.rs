// Strategy chain with ordered fallback
//
// Strategies run strictly one after another. The first attempt that yields a
// non-empty video URL ends the chain; later strategies are never started.
// When every strategy fails the chain degrades to a placeholder instead of
// erroring, because the input URL was already known to be valid.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use time::OffsetDateTime;
use tokio::time::timeout;

use super::diagnostics::diagnose_error;
use super::errors::StrategyError;
use super::models::{ExtractionOutcome, NormalizedTarget, StrategyAttempt, VideoDetails};
use super::traits::Strategy;

/// Where a request is in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Pending,
    Trying(usize),
    Succeeded,
    /// Every strategy failed; a placeholder is synthesized
    Degraded,
    /// The input itself was invalid; no strategy ran
    Failed,
}

impl ChainState {
    /// `Pending -> Trying(0)`, or straight to `Degraded` for an empty chain
    pub fn start(self, strategy_count: usize) -> Self {
        match self {
            Self::Pending if strategy_count == 0 => Self::Degraded,
            Self::Pending => Self::Trying(0),
            other => other,
        }
    }

    pub fn on_success(self) -> Self {
        match self {
            Self::Trying(_) => Self::Succeeded,
            other => other,
        }
    }

    pub fn on_failure(self, strategy_count: usize) -> Self {
        match self {
            Self::Trying(i) if i + 1 < strategy_count => Self::Trying(i + 1),
            Self::Trying(_) => Self::Degraded,
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Degraded | Self::Failed)
    }
}

/// Terminal result of running the chain for a valid target.
#[derive(Debug, Clone)]
pub enum ChainOutcome {
    Succeeded {
        details: VideoDetails,
        strategy: &'static str,
        attempts: Vec<StrategyAttempt>,
    },
    Degraded {
        placeholder: VideoDetails,
        attempts: Vec<StrategyAttempt>,
    },
}

impl ChainOutcome {
    pub fn attempts(&self) -> &[StrategyAttempt] {
        match self {
            Self::Succeeded { attempts, .. } | Self::Degraded { attempts, .. } => attempts,
        }
    }

    pub fn details(&self) -> &VideoDetails {
        match self {
            Self::Succeeded { details, .. } => details,
            Self::Degraded { placeholder, .. } => placeholder,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }

    pub fn state(&self) -> ChainState {
        match self {
            Self::Succeeded { .. } => ChainState::Succeeded,
            Self::Degraded { .. } => ChainState::Degraded,
        }
    }
}

/// Ordered, short-circuiting list of strategies.
pub struct StrategyChain {
    strategies: Vec<Box<dyn Strategy>>,
}

impl StrategyChain {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) {
        self.strategies.push(strategy);
    }

    pub fn with_strategy(mut self, strategy: Box<dyn Strategy>) -> Self {
        self.add_strategy(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub async fn run(&self, target: &NormalizedTarget) -> ChainOutcome {
        let count = self.strategies.len();
        let mut attempts = Vec::with_capacity(count);
        let mut state = ChainState::Pending.start(count);

        while let ChainState::Trying(index) = state {
            let strategy = self.strategies[index].as_ref();
            tracing::info!(
                strategy = strategy.name(),
                post_id = %target.post_id,
                budget_ms = strategy.budget().as_millis() as u64,
                "trying strategy {}/{}",
                index + 1,
                count
            );

            let started_at = OffsetDateTime::now_utc();
            let started = Instant::now();
            let outcome = run_attempt(strategy, target).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            match outcome {
                Ok(details) => {
                    tracing::info!(strategy = strategy.name(), elapsed_ms, "strategy succeeded");
                    attempts.push(StrategyAttempt {
                        strategy_name: strategy.name(),
                        started_at,
                        elapsed_ms,
                        error: None,
                        blocking_reason: None,
                    });
                    return ChainOutcome::Succeeded {
                        details,
                        strategy: strategy.name(),
                        attempts,
                    };
                }
                Err(error) => {
                    let blocking_reason = diagnose_error(&error.message);
                    tracing::warn!(
                        strategy = strategy.name(),
                        kind = %error.kind,
                        elapsed_ms,
                        reason = ?blocking_reason,
                        "strategy failed: {}",
                        error.message
                    );
                    attempts.push(StrategyAttempt {
                        strategy_name: strategy.name(),
                        started_at,
                        elapsed_ms,
                        error: Some(error),
                        blocking_reason,
                    });
                    state = state.on_failure(count);
                }
            }
        }

        tracing::warn!(
            post_id = %target.post_id,
            attempts = attempts.len(),
            "all strategies failed, degrading"
        );
        ChainOutcome::Degraded {
            placeholder: degraded_placeholder(target),
            attempts,
        }
    }
}

impl Default for StrategyChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one attempt under its budget, containing panics and empty results.
async fn run_attempt(strategy: &dyn Strategy, target: &NormalizedTarget) -> ExtractionOutcome {
    let budget = strategy.budget();
    let attempt = AssertUnwindSafe(strategy.attempt(target, budget)).catch_unwind();

    match timeout(budget, attempt).await {
        Ok(Ok(Ok(details))) if details.has_video() => Ok(details),
        Ok(Ok(Ok(_))) => Err(StrategyError::no_video("strategy returned an empty video URL")),
        Ok(Ok(Err(e))) => Err(e),
        Ok(Err(panic)) => Err(StrategyError::new(
            strategy.fault_kind(),
            format!("strategy panicked: {}", panic_message(panic.as_ref())),
        )),
        Err(_) => Err(StrategyError::new(
            strategy.timeout_kind(),
            format!("Timed out after {}ms", budget.as_millis()),
        )),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return s.to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "unknown panic".to_string()
}

/// Title-less placeholder carrying only the post id and an empty video URL.
fn degraded_placeholder(target: &NormalizedTarget) -> VideoDetails {
    VideoDetails {
        id: Some(target.post_id.clone()),
        ..VideoDetails::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::errors::ErrorKind;
    use crate::extractor::target::normalize;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    enum Behaviour {
        Succeed,
        Fail(ErrorKind),
        Hang,
        Panic,
        EmptyUrl,
    }

    struct Stub {
        name: &'static str,
        behaviour: Behaviour,
        budget: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl Stub {
        fn boxed(name: &'static str, behaviour: Behaviour, calls: &Arc<AtomicUsize>) -> Box<dyn Strategy> {
            Box::new(Self {
                name,
                behaviour,
                budget: Duration::from_millis(200),
                calls: Arc::clone(calls),
            })
        }
    }

    #[async_trait]
    impl Strategy for Stub {
        fn name(&self) -> &'static str {
            self.name
        }

        fn budget(&self) -> Duration {
            self.budget
        }

        fn timeout_kind(&self) -> ErrorKind {
            ErrorKind::WorkerTimeout
        }

        fn fault_kind(&self) -> ErrorKind {
            ErrorKind::WorkerOutputUnparsable
        }

        async fn attempt(
            &self,
            target: &NormalizedTarget,
            _budget: Duration,
        ) -> Result<VideoDetails, StrategyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Succeed => Ok(VideoDetails {
                    title: Some(format!("{} via {}", target.post_id, self.name)),
                    ..VideoDetails::with_video_url(format!("https://cdn.example/{}.mp4", self.name))
                }),
                Behaviour::Fail(kind) => Err(StrategyError::new(kind, "stub failure")),
                Behaviour::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
                Behaviour::Panic => panic!("parser exploded"),
                Behaviour::EmptyUrl => Ok(VideoDetails::with_video_url("")),
            }
        }
    }

    fn target() -> NormalizedTarget {
        normalize("https://instagram.com/p/ABC123/").unwrap()
    }

    #[test]
    fn test_state_transitions() {
        assert_eq!(ChainState::Pending.start(3), ChainState::Trying(0));
        assert_eq!(ChainState::Pending.start(0), ChainState::Degraded);
        assert_eq!(ChainState::Trying(0).on_failure(3), ChainState::Trying(1));
        assert_eq!(ChainState::Trying(2).on_failure(3), ChainState::Degraded);
        assert_eq!(ChainState::Trying(1).on_success(), ChainState::Succeeded);
        assert!(ChainState::Succeeded.is_terminal());
        assert!(ChainState::Failed.is_terminal());
        assert!(!ChainState::Trying(0).is_terminal());
        // Terminal states absorb further events
        assert_eq!(ChainState::Degraded.on_success(), ChainState::Degraded);
    }

    #[tokio::test]
    async fn test_short_circuits_on_first_success() {
        let calls: Vec<Arc<AtomicUsize>> = (0..4).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let chain = StrategyChain::new()
            .with_strategy(Stub::boxed("one", Behaviour::Fail(ErrorKind::NetworkError), &calls[0]))
            .with_strategy(Stub::boxed("two", Behaviour::Fail(ErrorKind::NoVideoFound), &calls[1]))
            .with_strategy(Stub::boxed("three", Behaviour::Succeed, &calls[2]))
            .with_strategy(Stub::boxed("four", Behaviour::Fail(ErrorKind::NetworkError), &calls[3]));

        let outcome = chain.run(&target()).await;

        assert_eq!(outcome.attempts().len(), 3);
        assert_eq!(
            calls.iter().map(|c| c.load(Ordering::SeqCst)).collect::<Vec<_>>(),
            vec![1, 1, 1, 0]
        );
        match outcome {
            ChainOutcome::Succeeded { details, strategy, .. } => {
                assert_eq!(strategy, "three");
                assert_eq!(details.video_url, "https://cdn.example/three.mp4");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hanging_strategy_times_out_and_chain_proceeds() {
        let hang_calls = Arc::new(AtomicUsize::new(0));
        let next_calls = Arc::new(AtomicUsize::new(0));
        let chain = StrategyChain::new()
            .with_strategy(Stub::boxed("hang", Behaviour::Hang, &hang_calls))
            .with_strategy(Stub::boxed("next", Behaviour::Succeed, &next_calls));

        let started = Instant::now();
        let outcome = chain.run(&target()).await;

        // budget 200ms plus generous scheduling slack
        assert!(started.elapsed() < Duration::from_millis(1500));
        let first = &outcome.attempts()[0];
        assert_eq!(first.failure_kind(), Some(ErrorKind::WorkerTimeout));
        assert!(first.elapsed_ms >= 150);
        assert_eq!(next_calls.load(Ordering::SeqCst), 1);
        assert!(!outcome.is_degraded());
    }

    #[tokio::test]
    async fn test_panicking_strategy_is_contained() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = StrategyChain::new()
            .with_strategy(Stub::boxed("boom", Behaviour::Panic, &calls))
            .with_strategy(Stub::boxed("ok", Behaviour::Succeed, &calls));

        let outcome = chain.run(&target()).await;

        let first = &outcome.attempts()[0];
        assert_eq!(first.failure_kind(), Some(ErrorKind::WorkerOutputUnparsable));
        assert!(first.error.as_ref().unwrap().message.contains("parser exploded"));
        assert_eq!(outcome.state(), ChainState::Succeeded);
    }

    #[tokio::test]
    async fn test_empty_video_url_counts_as_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = StrategyChain::new().with_strategy(Stub::boxed("empty", Behaviour::EmptyUrl, &calls));

        let outcome = chain.run(&target()).await;

        assert!(outcome.is_degraded());
        assert_eq!(outcome.attempts()[0].failure_kind(), Some(ErrorKind::NoVideoFound));
    }

    #[tokio::test]
    async fn test_exhausted_chain_degrades_with_post_id() {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = StrategyChain::new()
            .with_strategy(Stub::boxed("a", Behaviour::Fail(ErrorKind::NetworkError), &calls))
            .with_strategy(Stub::boxed("b", Behaviour::Fail(ErrorKind::WorkerNonZeroExit), &calls));

        let outcome = chain.run(&target()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.state(), ChainState::Degraded);
        let placeholder = outcome.details();
        assert_eq!(placeholder.video_url, "");
        assert_eq!(placeholder.id.as_deref(), Some("ABC123"));
        assert!(placeholder.title.is_none());
    }

    #[tokio::test]
    async fn test_empty_chain_degrades_immediately() {
        let outcome = StrategyChain::new().run(&target()).await;
        assert!(outcome.is_degraded());
        assert!(outcome.attempts().is_empty());
    }
}
