// Markup scraper - fetches the public post page and reads the video from it
//
// The HTML is handed to `page_parser`, which applies the fixed priority
// order over meta tags, JSON-LD, embedded state and the loose scan.

use async_trait::async_trait;
use rand::seq::SliceRandom;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::page_parser;
use crate::extractor::errors::StrategyError;
use crate::extractor::models::{NormalizedTarget, VideoDetails};
use crate::extractor::target::CANONICAL_ORIGIN;
use crate::extractor::traits::Strategy;

pub const FALLBACK_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

pub struct MarkupScraper {
    client: Client,
    user_agents: Arc<Vec<String>>,
    origin: String,
    budget: Duration,
}

impl MarkupScraper {
    /// Build a scraper with its own pooled client. `proxy` accepts
    /// anything `reqwest::Proxy::all` does (http, https, socks5).
    pub fn new(
        user_agents: Arc<Vec<String>>,
        proxy: Option<&str>,
        budget: Duration,
    ) -> Result<Self, reqwest::Error> {
        let builder = Client::builder().timeout(budget);
        // Only the configured proxy is used; HTTP(S)_PROXY from the environment is ignored
        let builder = match proxy {
            Some(proxy_url) => builder.proxy(reqwest::Proxy::all(proxy_url)?),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build()?,
            user_agents,
            origin: CANONICAL_ORIGIN.to_string(),
            budget,
        })
    }

    /// Point the scraper at another origin (local test servers).
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into().trim_end_matches('/').to_string();
        self
    }

    fn page_url(&self, target: &NormalizedTarget) -> String {
        format!("{}/{}/{}/", self.origin, target.kind.segment(), target.post_id)
    }

    fn pick_user_agent(&self) -> &str {
        self.user_agents
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
            .unwrap_or(FALLBACK_USER_AGENT)
    }

    async fn fetch_page(&self, url: &str, budget: Duration) -> Result<String, StrategyError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.pick_user_agent())
            .header(ACCEPT, BROWSER_ACCEPT)
            .header(ACCEPT_LANGUAGE, BROWSER_ACCEPT_LANGUAGE)
            .timeout(budget)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StrategyError::network(format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed")
            )));
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl Strategy for MarkupScraper {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn budget(&self) -> Duration {
        self.budget
    }

    async fn attempt(
        &self,
        target: &NormalizedTarget,
        budget: Duration,
    ) -> Result<VideoDetails, StrategyError> {
        let url = self.page_url(target);
        tracing::debug!(%url, "fetching post page");

        let html = self.fetch_page(&url, budget).await?;

        match page_parser::extract_from_html(&html) {
            Some(found) => {
                tracing::debug!(source = found.source.as_str(), "video found in markup");
                Ok(found.details)
            }
            None => Err(StrategyError::no_video(format!(
                "No video in page markup ({} bytes)",
                html.len()
            ))),
        }
    }
}
