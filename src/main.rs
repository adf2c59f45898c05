// instafetch CLI: print the canonical JSON for one post URL
//
// Logs go to stderr so stdout stays a single JSON document.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use instafetch_lib::{ErrorResponse, Pipeline, PipelineConfig, StatusClass};

#[derive(Parser)]
#[command(name = "instafetch")]
#[command(about = "Resolve an Instagram post/reel URL to video metadata", version)]
struct Cli {
    /// Post, reel or IGTV URL
    url: String,

    /// YAML config file (default: $INSTAFETCH_CONFIG or ~/.config/instafetch/config.yml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Single-line JSON instead of pretty output
    #[arg(long)]
    compact: bool,
}

fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String, serde_json::Error> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,instafetch_lib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match PipelineConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(1);
        }
    };

    let pipeline = match Pipeline::from_config(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::from(1);
        }
    };

    let (json, code) = match pipeline.extract(&cli.url).await {
        Ok(response) => {
            if response.status() == StatusClass::OkWithWarning {
                tracing::warn!("no playable video found, returning placeholder metadata");
            }
            (to_json(&response, cli.compact), ExitCode::SUCCESS)
        }
        Err(error) => {
            let code = match error.status() {
                StatusClass::ClientError => ExitCode::from(2),
                _ => ExitCode::from(1),
            };
            (to_json::<ErrorResponse>(&error, cli.compact), code)
        }
    };

    match json {
        Ok(json) => {
            println!("{}", json);
            code
        }
        Err(e) => {
            tracing::error!("failed to serialize response: {}", e);
            ExitCode::from(1)
        }
    }
}
