// Reader CLI
//
// Renders one URL in a headless browser and writes the requested
// representation to stdout or a file. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

use kodegen_tools_reader::{
    ChromiumLauncher, ErrorKind, ExtractionRequest, ExtractionResult, ProxyDescriptor,
    ReadError, Reader, ReaderConfig, SuppressionPolicy, TracingProgress, WaitUntil,
};

#[derive(Parser, Debug)]
#[command(name = "kodegen-reader", version, about = "Render a URL and extract its content")]
struct Cli {
    /// Page to read; https:// is assumed when no scheme is given
    url: String,

    /// Output format (text, markdown, html, pdf, image, pageshot)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Write the payload here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Navigation completion signal (load, networkidle)
    #[arg(long)]
    wait: Option<WaitUntil>,

    /// Navigation timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Interstitial suppression (visual_only, always, never)
    #[arg(long, value_parser = parse_suppression)]
    suppress: Option<SuppressionPolicy>,

    /// Show the browser window
    #[arg(long)]
    no_headless: bool,

    /// Chrome or Chromium binary to use instead of discovery
    #[arg(long)]
    chrome: Option<PathBuf>,
}

fn parse_suppression(value: &str) -> Result<SuppressionPolicy, String> {
    serde_json::from_value(serde_json::Value::String(value.replace('-', "_")))
        .map_err(|_| format!("unknown suppression policy '{value}'"))
}

impl Cli {
    fn config(&self) -> Result<ReaderConfig> {
        let mut builder = ReaderConfig::builder()
            .headless(!self.no_headless)
            .proxy(ProxyDescriptor::from_env());
        if let Some(wait) = self.wait {
            builder = builder.wait_until(wait);
        }
        if let Some(secs) = self.timeout {
            builder = builder.navigation_timeout(Duration::from_secs(secs));
        }
        if let Some(policy) = self.suppress {
            builder = builder.suppression(policy);
        }
        if let Some(path) = &self.chrome {
            builder = builder.chrome_executable(path.clone());
        }
        builder.build()
    }
}

async fn write_output(result: &ExtractionResult, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => tokio::fs::write(path, result.content())
            .await
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(result.content()).await?;
            stdout.flush().await.context("Failed to flush stdout")
        }
    }
}

fn exit_code(err: &ReadError) -> ExitCode {
    match err.kind() {
        ErrorKind::InvalidArgument => ExitCode::from(2),
        ErrorKind::Upstream | ErrorKind::Internal => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::from(2);
        }
    };
    let request = match ExtractionRequest::parse(cli.url.as_str(), &cli.format) {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {e}");
            return exit_code(&e);
        }
    };

    let reader = Reader::new(config, ChromiumLauncher).with_progress(TracingProgress);
    match reader.read(&request).await {
        Ok(result) => {
            if let Err(e) = write_output(&result, cli.output.as_ref()).await {
                eprintln!("error: {e:#}");
                return ExitCode::FAILURE;
            }
            eprintln!("content-type: {}", result.content_type());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            exit_code(&e)
        }
    }
}
