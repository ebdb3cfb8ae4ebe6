use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use seo_analyzer::{Analyzer, AnalyzerConfig, Report};

/// Analyze one page and print the report as JSON.
#[derive(Debug, Parser)]
#[command(name = "seo-analyzer", version, about)]
struct Cli {
    /// URL (http/https) or path to a local HTML file
    source: String,

    /// Keyword the page should rank for
    #[arg(short, long)]
    keyword: Option<String>,

    /// Report locale, e.g. en_US or pl_PL
    #[arg(short, long)]
    locale: Option<String>,

    /// Fetch timeout in seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// JSON config file; SEO_ANALYZER_* variables apply when absent
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Initialize logging with tracing_subscriber.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,seo_analyzer=info")),
        )
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<AnalyzerConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            AnalyzerConfig::from_json(&json)?
        }
        None => AnalyzerConfig::from_env()?,
    };
    if let Some(timeout) = cli.timeout {
        config.fetch.timeout_secs = timeout;
        config.validate()?;
    }
    Ok(config)
}

fn is_url(source: &str) -> bool {
    url::Url::parse(source).is_ok_and(|u| !u.cannot_be_a_base() && u.scheme().len() > 1)
}

async fn run(cli: Cli) -> Result<Report> {
    let config = load_config(&cli)?;
    let analyzer = Analyzer::builder().config(config).build()?;
    let keyword = cli.keyword.as_deref();
    let locale = cli.locale.as_deref();

    let report = if is_url(&cli.source) {
        analyzer.analyze_url(&cli.source, keyword, locale).await?
    } else {
        analyzer.analyze_file(&cli.source, keyword, locale)?
    };
    Ok(report)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let report = run(cli).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_detection() {
        assert!(is_url("https://example.org/"));
        assert!(is_url("http://localhost:8080/page"));
        assert!(!is_url("page.html"));
        assert!(!is_url("./site/index.html"));
        // Windows drive letters parse as a one-letter scheme
        assert!(!is_url(r"C:\site\index.html"));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "seo-analyzer",
            "page.html",
            "-k",
            "rust",
            "--locale",
            "pl_PL",
            "-t",
            "5",
        ]);
        assert_eq!(cli.source, "page.html");
        assert_eq!(cli.keyword.as_deref(), Some("rust"));
        assert_eq!(cli.locale.as_deref(), Some("pl_PL"));
        assert_eq!(cli.timeout, Some(5));
    }
}
