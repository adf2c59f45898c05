// Pipeline facade: validate -> strategy chain -> normalize

use std::sync::Arc;
use time::OffsetDateTime;

use super::errors::ErrorResponse;
use super::models::{CanonicalResponse, ExtractionRequest, Placeholders};
use super::normalizer;
use super::orchestrator::{ChainState, StrategyChain};
use super::strategies::{ExternalProcessInvoker, MarkupScraper, WorkerVariant};
use super::target;
use crate::config::{ConfigError, PipelineConfig};

/// One configured extraction pipeline. Cheap to share behind an `Arc`;
/// every `extract` call owns its own state.
pub struct Pipeline {
    chain: StrategyChain,
    placeholders: Placeholders,
}

impl Pipeline {
    pub fn new(chain: StrategyChain, placeholders: Placeholders) -> Self {
        Self {
            chain,
            placeholders,
        }
    }

    /// Default chain: markup scraper, full worker, simplified worker.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let markup = MarkupScraper::new(
            Arc::new(config.user_agents.clone()),
            config.proxy.as_deref(),
            config.budgets.markup(),
        )?;
        let full = ExternalProcessInvoker::new(
            WorkerVariant::Full,
            config.interpreter.clone(),
            config.full_worker_path(),
            config.budgets.full_worker(),
        );
        let simple = ExternalProcessInvoker::new(
            WorkerVariant::Simple,
            config.interpreter.clone(),
            config.simple_worker_path(),
            config.budgets.simple_worker(),
        );

        // Checked once here so the attempt budgets stay untouched
        if !full.is_available() {
            tracing::warn!(
                interpreter = %config.interpreter,
                "interpreter did not answer --version; worker strategies will likely fail"
            );
        }

        let chain = StrategyChain::new()
            .with_strategy(Box::new(markup))
            .with_strategy(Box::new(full))
            .with_strategy(Box::new(simple));

        tracing::debug!(
            profile = ?config.profile,
            strategies = ?chain.names(),
            "pipeline ready"
        );

        Ok(Self::new(chain, config.placeholders.clone()))
    }

    pub fn chain(&self) -> &StrategyChain {
        &self.chain
    }

    /// Resolve one URL. Only an invalid URL is an error; exhausting every
    /// strategy still yields a response, tagged with a warning.
    pub async fn extract(&self, raw_url: &str) -> Result<CanonicalResponse, ErrorResponse> {
        let request = ExtractionRequest::new(raw_url);

        let target = match target::normalize(&request.raw_url) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(state = ?ChainState::Failed, url = %request.raw_url, "{}", e);
                return Err(e.into());
            }
        };

        tracing::info!(post_id = %target.post_id, kind = target.kind.segment(), "extracting");
        let outcome = self.chain.run(&target).await;

        Ok(normalizer::normalize(
            &outcome,
            &target,
            &request.raw_url,
            &self.placeholders,
            OffsetDateTime::now_utc(),
        ))
    }
}
