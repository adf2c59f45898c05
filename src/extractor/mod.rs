// Extractor module - resolves a post URL to video metadata
//
// Flow:
//   target::normalize        validate the URL, derive the shortcode
//   StrategyChain::run       markup scraper, then the external workers
//   normalizer::normalize    one fully populated response, placeholders for gaps

pub mod diagnostics;
pub mod errors;
pub mod models;
pub mod normalizer;
pub mod orchestrator;
pub mod pipeline;
pub mod process;
pub mod strategies;
pub mod target;
pub mod traits;

pub use diagnostics::{diagnose_error, BlockingReason};
pub use errors::{ErrorKind, ErrorResponse, InvalidUrl, StatusClass, StrategyError};
pub use models::{
    CanonicalResponse, ExtractionOutcome, ExtractionRequest, NormalizedTarget, Placeholders,
    PostKind, ResponseWarning, StrategyAttempt, VideoDetails,
};
pub use orchestrator::{ChainOutcome, ChainState, StrategyChain};
pub use pipeline::Pipeline;
pub use traits::Strategy;
