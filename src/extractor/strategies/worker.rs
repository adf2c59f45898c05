// External worker strategy - runs a helper script and reads one JSON document
//
// Contract:
//   argv:   <interpreter> <script> <canonical-url>
//   stdout: { "success": bool, "data": { "video_url": ..., ... }, "error": "..." }
//   exit:   0 for any well-formed document

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::time::Duration;

use super::fields;
use crate::extractor::errors::{ErrorKind, StrategyError};
use crate::extractor::models::{NormalizedTarget, VideoDetails};
use crate::extractor::process::{run_output_with_timeout, tail_lossy};
use crate::extractor::target;
use crate::extractor::traits::Strategy;

const STDERR_TAIL_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerVariant {
    /// Full extractor (several scraping methods, longer budget)
    Full,
    /// Simplified extractor, last resort
    Simple,
}

impl WorkerVariant {
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Self::Full => "full-worker",
            Self::Simple => "simple-worker",
        }
    }
}

pub struct ExternalProcessInvoker {
    variant: WorkerVariant,
    interpreter: String,
    script: PathBuf,
    budget: Duration,
    available: OnceLock<bool>,
}

impl ExternalProcessInvoker {
    pub fn new(
        variant: WorkerVariant,
        interpreter: impl Into<String>,
        script: impl Into<PathBuf>,
        budget: Duration,
    ) -> Self {
        Self {
            variant,
            interpreter: interpreter.into(),
            script: script.into(),
            budget,
            available: OnceLock::new(),
        }
    }

    pub fn variant(&self) -> WorkerVariant {
        self.variant
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Check `<interpreter> --version` once per invoker.
    ///
    /// Blocking; meant for startup, never inside an attempt's budget.
    pub fn is_available(&self) -> bool {
        *self.available.get_or_init(|| {
            match Command::new(&self.interpreter)
                .arg("--version")
                .stdin(Stdio::null())
                .output()
            {
                Ok(out) => out.status.success(),
                Err(e) => {
                    tracing::debug!(interpreter = %self.interpreter, error = %e, "interpreter check failed");
                    false
                }
            }
        })
    }

    fn build_args(&self, target: &NormalizedTarget) -> Vec<String> {
        vec![
            self.script.to_string_lossy().to_string(),
            target.canonical_url.clone(),
        ]
    }
}

#[async_trait]
impl Strategy for ExternalProcessInvoker {
    fn name(&self) -> &'static str {
        self.variant.strategy_name()
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
        budget: Duration,
    ) -> Result<VideoDetails, StrategyError> {
        let args = self.build_args(target);
        tracing::debug!(worker = self.name(), "running: {} {}", self.interpreter, args.join(" "));

        let output = run_output_with_timeout(
            &self.interpreter,
            &args,
            &[("PYTHONUNBUFFERED", "1")],
            budget,
        )
        .await?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(StrategyError::new(
                ErrorKind::WorkerNonZeroExit,
                format!(
                    "Worker exited with status {}: {}",
                    code,
                    tail_lossy(&output.stderr, STDERR_TAIL_CHARS)
                ),
            ));
        }

        parse_document(&output.stdout)
    }
}

/// Interpret a worker's stdout.
pub fn parse_document(stdout: &[u8]) -> Result<VideoDetails, StrategyError> {
    let text = String::from_utf8_lossy(stdout);
    let json = read_json_object(&text).ok_or_else(|| {
        StrategyError::unparsable(format!(
            "Worker output is not a JSON document: {:?}",
            fields::truncate_text(text.trim(), 120)
        ))
    })?;

    let success = json["success"]
        .as_bool()
        .ok_or_else(|| StrategyError::unparsable("Worker output has no boolean `success` field"))?;

    if !success {
        let reason = fields::string(&json["error"])
            .unwrap_or_else(|| "Worker reported failure without a message".to_string());
        return Err(StrategyError::no_video(reason));
    }

    let data = &json["data"];
    let video_url = fields::string(&data["video_url"])
        .ok_or_else(|| StrategyError::no_video("Worker succeeded without a video_url"))?;

    if target::is_post_page(&video_url) {
        return Err(StrategyError::no_video(format!(
            "Worker returned the post page instead of a media URL: {}",
            video_url
        )));
    }

    Ok(VideoDetails {
        id: fields::string(&data["id"]),
        title: fields::string(&data["title"]),
        description: fields::string(&data["description"]),
        thumbnail_url: fields::string(&data["thumbnail"]),
        author: fields::string(&data["author"]).or_else(|| fields::string(&data["uploader"])),
        duration_seconds: fields::float(&data["duration"]).filter(|d| *d > 0.0),
        size_bytes: fields::uint(&data["filesize"]).filter(|s| *s > 0),
        quality: fields::string(&data["quality"]),
        width: fields::dimension(&data["width"]),
        height: fields::dimension(&data["height"]),
        format: fields::string(&data["format"]),
        video_url,
    })
}

/// Whole stdout first, then the last line (workers sometimes print progress before the result).
fn read_json_object(text: &str) -> Option<Value> {
    let whole = serde_json::from_str::<Value>(text.trim()).ok();
    let last_line = || {
        text.lines()
            .rev()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .and_then(|line| serde_json::from_str::<Value>(line).ok())
    };

    whole.or_else(last_line).filter(Value::is_object)
}
