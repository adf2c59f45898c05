// instafetch: resolve Instagram post / reel / IGTV links to playable video metadata

pub mod config;
pub mod extractor;

pub use config::{ConfigError, DeploymentProfile, PipelineConfig};
pub use extractor::{
    CanonicalResponse, ErrorKind, ErrorResponse, Pipeline, Placeholders, StatusClass, Strategy,
    StrategyChain,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Extract(#[from] ErrorResponse),
}

/// One-shot extraction with configuration from the environment and the
/// default config file. Long-running callers should build a `Pipeline`
/// once and share it.
pub async fn extract(raw_url: &str) -> Result<CanonicalResponse, Error> {
    let config = PipelineConfig::load(None)?;
    let pipeline = Pipeline::from_config(&config)?;
    Ok(pipeline.extract(raw_url).await?)
}
