// URL validation and normalization

use lazy_static::lazy_static;
use regex::Regex;

use super::errors::InvalidUrl;
use super::models::{NormalizedTarget, PostKind};

pub const CANONICAL_ORIGIN: &str = "https://www.instagram.com";

lazy_static! {
    static ref HOST_RE: Regex =
        Regex::new(r"^(?i:https?://)?(?i:www\.)?(?i:instagram\.com)(?:[/?#]|$)").unwrap();
    static ref POST_RE: Regex = Regex::new(
        r"^(?i:https?://)?(?i:www\.)?(?i:instagram\.com)/(p|reel|tv)/([A-Za-z0-9_-]+)(?:/[^?#]*)?(?:[?#].*)?$"
    )
    .unwrap();
}

/// Validate `raw_url` and derive the post identifier and canonical URL.
///
/// Pure and idempotent over its own output.
pub fn normalize(raw_url: &str) -> Result<NormalizedTarget, InvalidUrl> {
    let trimmed = raw_url.trim();
    if trimmed.is_empty() {
        return Err(InvalidUrl::new(raw_url, "URL is empty"));
    }

    if !HOST_RE.is_match(trimmed) {
        return Err(InvalidUrl::new(raw_url, "not an instagram.com URL"));
    }

    let caps = POST_RE.captures(trimmed).ok_or_else(|| {
        InvalidUrl::new(raw_url, "expected a /p/, /reel/ or /tv/ link with a post id")
    })?;

    let kind = caps
        .get(1)
        .and_then(|m| PostKind::from_segment(m.as_str()))
        .ok_or_else(|| InvalidUrl::new(raw_url, "unsupported path segment"))?;
    let post_id = caps
        .get(2)
        .map(|m| m.as_str().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| InvalidUrl::new(raw_url, "missing post id"))?;

    Ok(NormalizedTarget {
        canonical_url: canonical_url(kind, &post_id),
        kind,
        post_id,
    })
}

pub fn canonical_url(kind: PostKind, post_id: &str) -> String {
    format!("{}/{}/{}/", CANONICAL_ORIGIN, kind.segment(), post_id)
}

/// True when `url` points back at a post page rather than a media asset.
pub fn is_post_page(url: &str) -> bool {
    normalize(url).is_ok()
}
