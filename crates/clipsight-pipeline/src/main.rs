//! Clipsight CLI: analyze one video and print the result as JSON.

use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use clipsight_media::VideoSource;
use clipsight_pipeline::{Analyzer, PipelineConfig};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let Some(input) = std::env::args().nth(1) else {
        eprintln!("Usage: clipsight <video-url-or-path>");
        return ExitCode::from(2);
    };

    let source = VideoSource::parse(&input);
    let analyzer = Analyzer::new(PipelineConfig::from_env());

    match analyzer.analyze(&source).await {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize analysis result");
                ExitCode::FAILURE
            }
        },
        Err(e) => {
            error!(error = %e, "Analysis failed");
            ExitCode::FAILURE
        }
    }
}
