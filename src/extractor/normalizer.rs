// Maps a chain outcome onto the canonical response shape

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::diagnostics::{most_relevant, BlockingReason};
use super::errors::ErrorKind;
use super::models::{CanonicalResponse, NormalizedTarget, Placeholders, ResponseWarning};
use super::orchestrator::ChainOutcome;

/// Build the canonical response. Never fails.
pub fn normalize(
    outcome: &ChainOutcome,
    target: &NormalizedTarget,
    raw_url: &str,
    placeholders: &Placeholders,
    extracted_at: OffsetDateTime,
) -> CanonicalResponse {
    let details = outcome.details();

    let height = details.height.unwrap_or(0);
    let quality = non_empty(details.quality.as_deref())
        .map(str::to_string)
        .or_else(|| (height > 0).then(|| format!("{}p", height)))
        .unwrap_or_else(|| placeholders.quality.clone());

    let (strategy, warning) = match outcome {
        ChainOutcome::Succeeded { strategy, .. } => (Some(strategy.to_string()), None),
        ChainOutcome::Degraded { attempts, .. } => {
            let reason = most_relevant(attempts.iter().filter_map(|a| a.blocking_reason));
            (None, Some(degraded_warning(reason)))
        }
    };

    CanonicalResponse {
        id: pick(details.id.as_deref(), &target.post_id),
        title: pick(details.title.as_deref(), &placeholders.title),
        description: pick(details.description.as_deref(), &placeholders.description),
        author: pick(details.author.as_deref(), &placeholders.author),
        thumbnail: pick(details.thumbnail_url.as_deref(), &placeholders.thumbnail_url),
        video_url: details.video_url.trim().to_string(),
        duration: details
            .duration_seconds
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(0.0),
        size: details.size_bytes.unwrap_or(0),
        quality,
        width: details.width.unwrap_or(0),
        height,
        format: pick(details.format.as_deref(), &placeholders.format),
        original_url: raw_url.to_string(),
        extracted_at: format_timestamp(extracted_at),
        strategy,
        warning,
    }
}

fn degraded_warning(reason: Option<BlockingReason>) -> ResponseWarning {
    let mut message =
        "Using fallback method - video extraction may be limited; no playable video URL was found"
            .to_string();
    if let Some(reason) = reason.filter(|r| *r != BlockingReason::Unknown) {
        message.push_str(&format!(" ({})", reason.description()));
    }

    ResponseWarning {
        kind: ErrorKind::AllStrategiesDegraded,
        message,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn pick(value: Option<&str>, default: &str) -> String {
    non_empty(value).unwrap_or(default).to_string()
}

fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::errors::StrategyError;
    use crate::extractor::models::{StrategyAttempt, VideoDetails};
    use crate::extractor::target;

    fn at() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn failed_attempt(message: &str) -> StrategyAttempt {
        StrategyAttempt {
            strategy_name: "markup",
            started_at: at(),
            elapsed_ms: 12,
            error: Some(StrategyError::network(message)),
            blocking_reason: crate::extractor::diagnostics::diagnose_error(message),
        }
    }

    #[test]
    fn test_degraded_response_is_well_formed() {
        let raw = "https://instagram.com/p/ABC123/";
        let target = target::normalize(raw).unwrap();
        let outcome = ChainOutcome::Degraded {
            placeholder: VideoDetails {
                id: Some(target.post_id.clone()),
                ..VideoDetails::default()
            },
            attempts: vec![failed_attempt("HTTP 429: Too Many Requests")],
        };

        let resp = normalize(&outcome, &target, raw, &Placeholders::default(), at());

        assert_eq!(resp.video_url, "");
        assert_eq!(resp.format, "mp4");
        assert_eq!(resp.id, "ABC123");
        assert_eq!(resp.title, "Instagram Video");
        assert_eq!(resp.author, "Instagram User");
        assert_eq!(resp.quality, "normal");
        assert_eq!(resp.duration, 0.0);
        assert_eq!(resp.size, 0);
        assert_eq!(resp.original_url, raw);
        assert_eq!(resp.extracted_at, "2023-11-14T22:13:20Z");
        assert!(resp.is_degraded());
        assert!(resp.strategy.is_none());
        let warning = resp.warning.unwrap();
        assert_eq!(warning.kind, ErrorKind::AllStrategiesDegraded);
        assert!(warning.message.contains("Rate limited"));
    }

    #[test]
    fn test_success_keeps_strategy_fields_and_fills_gaps() {
        let raw = "instagram.com/reel/R1?igsh=x";
        let target = target::normalize(raw).unwrap();
        let outcome = ChainOutcome::Succeeded {
            details: VideoDetails {
                title: Some("Sunset".to_string()),
                author: Some("  ".to_string()),
                height: Some(1080),
                width: Some(608),
                duration_seconds: Some(12.5),
                ..VideoDetails::with_video_url(" https://cdn.example/r1.mp4 ")
            },
            strategy: "markup",
            attempts: Vec::new(),
        };

        let resp = normalize(&outcome, &target, raw, &Placeholders::default(), at());

        assert_eq!(resp.video_url, "https://cdn.example/r1.mp4");
        assert_eq!(resp.title, "Sunset");
        assert_eq!(resp.author, "Instagram User");
        assert_eq!(resp.quality, "1080p");
        assert_eq!(resp.duration, 12.5);
        assert_eq!(resp.id, "R1");
        assert_eq!(resp.strategy.as_deref(), Some("markup"));
        assert!(resp.warning.is_none());
    }

    #[test]
    fn test_custom_placeholders() {
        let raw = "https://instagram.com/tv/T1/";
        let target = target::normalize(raw).unwrap();
        let outcome = ChainOutcome::Degraded {
            placeholder: VideoDetails::default(),
            attempts: Vec::new(),
        };
        let placeholders = Placeholders {
            title: "Untitled".to_string(),
            format: "webm".to_string(),
            ..Placeholders::default()
        };

        let resp = normalize(&outcome, &target, raw, &placeholders, at());

        assert_eq!(resp.title, "Untitled");
        assert_eq!(resp.format, "webm");
        assert_eq!(resp.id, "T1");
    }

    #[test]
    fn test_serializes_camel_case() {
        let raw = "https://instagram.com/p/ABC123/";
        let target = target::normalize(raw).unwrap();
        let outcome = ChainOutcome::Degraded {
            placeholder: VideoDetails::default(),
            attempts: Vec::new(),
        };

        let json = serde_json::to_value(normalize(&outcome, &target, raw, &Placeholders::default(), at()))
            .unwrap();

        assert_eq!(json["videoUrl"], "");
        assert_eq!(json["originalUrl"], raw);
        assert!(json.get("extractedAt").is_some());
        assert_eq!(json["warning"]["kind"], "AllStrategiesDegraded");
        assert!(json.get("strategy").is_none());
    }
}
