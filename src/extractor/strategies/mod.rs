// Strategies - the concrete ways of recovering a post's video
//
// - Markup: fetch the public post page and read meta tags, JSON-LD or embedded state
// - Workers: delegate to an external helper script (full, then simplified)
//
// The page parsers are pure functions so the markup priority order can be
// tested without a network.

mod fields;
pub mod markup;
pub mod page_parser;
pub mod worker;

pub use markup::{MarkupScraper, FALLBACK_USER_AGENT};
pub use page_parser::{extract_from_html, MarkupSource, PageExtraction};
pub use worker::{ExternalProcessInvoker, WorkerVariant};
