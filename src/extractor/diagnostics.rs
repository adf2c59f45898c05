// Failure diagnostics - identifies why Instagram refused to hand over a video
//
// Strategy failures carry free-form text (HTTP status lines, worker stderr,
// the worker's own `error` field). Classifying that text lets attempt logs and
// the degraded warning say *why* nothing was found.

use serde::{Deserialize, Serialize};

/// Reasons an extraction attempt may have been blocked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockingReason {
    /// Page redirected to the login wall
    LoginRequired,

    /// 429 or "please wait a few minutes"
    RateLimited,

    /// Account is private
    PrivatePost,

    /// Post deleted or never existed
    PostUnavailable,

    /// Post exists but carries no video (photo / carousel of photos)
    NotAVideo,

    /// HTTP 403 Forbidden - general access denied
    Http403Forbidden,

    /// Network timeout (soft IP block)
    NetworkTimeout,

    /// Generic/unknown blocking
    Unknown,
}

impl BlockingReason {
    /// Check if a later attempt might succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::LoginRequired | Self::RateLimited | Self::Http403Forbidden | Self::NetworkTimeout
        )
    }

    /// Check if this is permanent for the post (no workaround)
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::PostUnavailable | Self::NotAVideo | Self::PrivatePost)
    }

    /// Ranking used to pick the most telling reason out of several attempts
    pub fn severity(&self) -> u8 {
        match self {
            Self::PostUnavailable => 5,
            Self::PrivatePost => 5,
            Self::NotAVideo => 4,
            Self::LoginRequired => 3,
            Self::RateLimited => 3,
            Self::Http403Forbidden => 2,
            Self::NetworkTimeout => 1,
            Self::Unknown => 0,
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::LoginRequired => "Instagram requires login to view this post",
            Self::RateLimited => "Rate limited by Instagram",
            Self::PrivatePost => "Post belongs to a private account",
            Self::PostUnavailable => "Post unavailable or removed",
            Self::NotAVideo => "Post does not contain a video",
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::NetworkTimeout => "Network timeout (possible IP throttling)",
            Self::Unknown => "Unknown blocking reason",
        }
    }
}

/// Analyze error message and return blocking reason
pub fn diagnose_error(error: &str) -> Option<BlockingReason> {
    let lower = error.to_lowercase();

    // Check patterns in order of specificity

    if lower.contains("private account")
        || lower.contains("this account is private")
        || lower.contains("post is private")
    {
        return Some(BlockingReason::PrivatePost);
    }

    if lower.contains("http 404")
        || lower.contains("404 not found")
        || lower.contains("404 client error")
        || lower.contains("page not found")
        || lower.contains("sorry, this page isn't available")
        || lower.contains("post unavailable")
        || lower.contains("media not found")
    {
        return Some(BlockingReason::PostUnavailable);
    }

    if lower.contains("not a video")
        || lower.contains("is_video false")
        || lower.contains("no video in post")
    {
        return Some(BlockingReason::NotAVideo);
    }

    if lower.contains("login required")
        || lower.contains("accounts/login")
        || lower.contains("log in to")
        || lower.contains("requires authentication")
        || lower.contains("may require authentication")
    {
        return Some(BlockingReason::LoginRequired);
    }

    if lower.contains("429")
        || lower.contains("rate limit")
        || lower.contains("too many requests")
        || lower.contains("please wait a few minutes")
    {
        return Some(BlockingReason::RateLimited);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(BlockingReason::Http403Forbidden);
    }

    if lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("connection refused")
        || lower.contains("network unreachable")
    {
        return Some(BlockingReason::NetworkTimeout);
    }

    if !error.trim().is_empty() {
        return Some(BlockingReason::Unknown);
    }

    None
}

/// Pick the most telling reason among several attempts.
pub fn most_relevant<I>(reasons: I) -> Option<BlockingReason>
where
    I: IntoIterator<Item = BlockingReason>,
{
    reasons.into_iter().max_by_key(|r| r.severity())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_wall_detection() {
        let error = "HTTP 302 redirect to https://www.instagram.com/accounts/login/";
        assert_eq!(diagnose_error(error), Some(BlockingReason::LoginRequired));
    }

    #[test]
    fn test_serverless_worker_note_detection() {
        let error = "Direct download URL not available - Instagram may require authentication";
        assert_eq!(diagnose_error(error), Some(BlockingReason::LoginRequired));
    }

    #[test]
    fn test_rate_limit_detection() {
        let error = "HTTP 429: Too Many Requests";
        assert_eq!(diagnose_error(error), Some(BlockingReason::RateLimited));
    }

    #[test]
    fn test_unavailable_detection() {
        let error = "Failed to fetch Instagram page: 404 Client Error: Not Found";
        assert_eq!(diagnose_error(error), Some(BlockingReason::PostUnavailable));
        assert_eq!(
            diagnose_error("HTTP 404 for https://www.instagram.com/p/x/"),
            Some(BlockingReason::PostUnavailable)
        );
    }

    #[test]
    fn test_private_detection() {
        let error = "This account is private";
        assert_eq!(diagnose_error(error), Some(BlockingReason::PrivatePost));
    }

    #[test]
    fn test_timeout_detection() {
        let error = "Timed out after 15000ms";
        assert_eq!(diagnose_error(error), Some(BlockingReason::NetworkTimeout));
    }

    #[test]
    fn test_403_detection() {
        assert_eq!(
            diagnose_error("HTTP 403: Forbidden"),
            Some(BlockingReason::Http403Forbidden)
        );
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(diagnose_error("something odd"), Some(BlockingReason::Unknown));
        assert_eq!(diagnose_error("   "), None);
    }

    #[test]
    fn test_most_relevant_prefers_permanent_reasons() {
        let picked = most_relevant([
            BlockingReason::NetworkTimeout,
            BlockingReason::PostUnavailable,
            BlockingReason::Http403Forbidden,
        ]);
        assert_eq!(picked, Some(BlockingReason::PostUnavailable));
        assert_eq!(most_relevant(Vec::new()), None);
    }

    #[test]
    fn test_reason_flags() {
        assert!(BlockingReason::RateLimited.is_retryable());
        assert!(!BlockingReason::PostUnavailable.is_retryable());
        assert!(BlockingReason::NotAVideo.is_permanent());
    }
}
