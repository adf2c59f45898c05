// Data models shared across the pipeline

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::diagnostics::BlockingReason;
use super::errors::{ErrorKind, StatusClass, StrategyError};

/// One inbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub raw_url: String,
}

impl ExtractionRequest {
    pub fn new(raw_url: impl Into<String>) -> Self {
        Self {
            raw_url: raw_url.into(),
        }
    }
}

/// Path segment that introduces the shortcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    /// Regular post (`/p/<id>`)
    P,
    /// Reel (`/reel/<id>`)
    Reel,
    /// IGTV (`/tv/<id>`)
    Tv,
}

impl PostKind {
    pub fn segment(&self) -> &'static str {
        match self {
            Self::P => "p",
            Self::Reel => "reel",
            Self::Tv => "tv",
        }
    }

    pub fn from_segment(segment: &str) -> Option<Self> {
        match segment {
            "p" => Some(Self::P),
            "reel" => Some(Self::Reel),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }
}

/// Validated, canonical form of the request URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedTarget {
    pub post_id: String,
    pub kind: PostKind,
    pub canonical_url: String,
}

/// Whatever subset of fields a strategy managed to recover.
///
/// `video_url` must be non-empty for a successful attempt; the orchestrator
/// rejects empty ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    /// Identifier reported by the source, if it reported one
    pub id: Option<String>,
    pub video_url: String,
    pub thumbnail_url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub author: Option<String>,
    pub duration_seconds: Option<f64>,
    pub size_bytes: Option<u64>,
    pub quality: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
}

impl VideoDetails {
    pub fn with_video_url(video_url: impl Into<String>) -> Self {
        Self {
            video_url: video_url.into(),
            ..Self::default()
        }
    }

    pub fn has_video(&self) -> bool {
        !self.video_url.trim().is_empty()
    }

    /// Fill fields that are still unset from `other`. `video_url` is never touched.
    pub fn fill_from(&mut self, other: VideoDetails) {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }

        fill(&mut self.id, other.id);
        fill(&mut self.thumbnail_url, other.thumbnail_url);
        fill(&mut self.title, other.title);
        fill(&mut self.description, other.description);
        fill(&mut self.author, other.author);
        fill(&mut self.duration_seconds, other.duration_seconds);
        fill(&mut self.size_bytes, other.size_bytes);
        fill(&mut self.quality, other.quality);
        fill(&mut self.width, other.width);
        fill(&mut self.height, other.height);
        fill(&mut self.format, other.format);
    }
}

/// Result of one strategy attempt.
pub type ExtractionOutcome = Result<VideoDetails, StrategyError>;

/// Diagnostic record of one attempt. Logged and returned, never stored.
#[derive(Debug, Clone)]
pub struct StrategyAttempt {
    pub strategy_name: &'static str,
    pub started_at: OffsetDateTime,
    pub elapsed_ms: u64,
    /// `None` on success
    pub error: Option<StrategyError>,
    pub blocking_reason: Option<BlockingReason>,
}

impl StrategyAttempt {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn failure_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }
}

/// Warning attached to an otherwise successful response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseWarning {
    pub kind: ErrorKind,
    pub message: String,
}

/// Externally visible, always fully populated response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub author: String,
    pub thumbnail: String,
    pub video_url: String,
    pub duration: f64,
    pub size: u64,
    pub quality: String,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub original_url: String,
    /// RFC 3339 timestamp
    pub extracted_at: String,
    /// Name of the strategy that produced the data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ResponseWarning>,
}

impl CanonicalResponse {
    pub fn is_degraded(&self) -> bool {
        self.warning
            .as_ref()
            .map_or(false, |w| w.kind == ErrorKind::AllStrategiesDegraded)
    }

    pub fn status(&self) -> StatusClass {
        if self.warning.is_some() {
            StatusClass::OkWithWarning
        } else {
            StatusClass::Ok
        }
    }
}

/// Values substituted for fields no strategy supplied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholders {
    pub title: String,
    pub author: String,
    pub description: String,
    pub thumbnail_url: String,
    pub quality: String,
    pub format: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            title: "Instagram Video".to_string(),
            author: "Instagram User".to_string(),
            description: "Downloaded from Instagram".to_string(),
            thumbnail_url: "https://via.placeholder.com/400x400/667eea/ffffff?text=Instagram+Video"
                .to_string(),
            quality: "normal".to_string(),
            format: "mp4".to_string(),
        }
    }
}
