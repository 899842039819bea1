use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use picscrape_client::download::DEFAULT_CONCURRENCY;
use picscrape_client::{
    DownloadReport, Downloader, HtmlImageScanner, ImageCache, ReqwestFetcher, ensure_protocol,
    get_domain,
};
use picscrape_core::{ScrapeConfig, ScrapeOutcome, ScrapeService, TargetSpec};

#[derive(Parser)]
#[command(name = "picscrape", version, about = "Find and download the images on a web page")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the image URLs referenced by a page
    Scrape {
        #[command(flatten)]
        target: TargetArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Scrape a page and save its images into a directory
    Download {
        #[command(flatten)]
        target: TargetArgs,

        /// Directory to save images into (created if missing)
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Only download these positions (0-based) of the scraped list
        #[arg(short, long)]
        index: Vec<usize>,

        /// Number of parallel downloads
        #[arg(
            short = 'j',
            long,
            env = "PICSCRAPE_CONCURRENCY",
            default_value_t = DEFAULT_CONCURRENCY
        )]
        concurrency: usize,

        /// Output format for the download report
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Scrape a page and load every image, reporting content type and size
    Inspect {
        #[command(flatten)]
        target: TargetArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show which scheme a bare host answers on, and its domain
    Probe {
        /// Host or URL, e.g. "example.com"
        host: String,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Page URL; a bare host is probed for https, then http
    #[arg(short, long)]
    url: String,

    /// Maximum number of image URLs to collect (overrides PICSCRAPE_MAX_IMAGES)
    #[arg(long)]
    max_images: Option<usize>,

    /// Page request timeout in seconds (overrides PICSCRAPE_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl TargetArgs {
    fn config(&self) -> Result<ScrapeConfig> {
        let mut config = ScrapeConfig::from_env().context("Invalid environment configuration")?;
        if let Some(max_images) = self.max_images {
            config = config.with_max_images(max_images);
        }
        if let Some(secs) = self.timeout_secs {
            if secs == 0 {
                bail!("--timeout-secs must be at least 1");
            }
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(serde::Serialize)]
struct ScrapeReport<'a> {
    page_url: &'a str,
    domain: &'a str,
    images: &'a [String],
    error: Option<String>,
}

#[derive(serde::Serialize)]
struct ImageRow<'a> {
    index: usize,
    url: &'a str,
}

#[derive(serde::Serialize)]
struct InspectRow {
    url: String,
    content_type: Option<String>,
    bytes: Option<usize>,
    error: Option<String>,
}

/// A scrape run together with the inputs it was resolved from.
struct ScrapeRun {
    target: TargetSpec,
    outcome: ScrapeOutcome,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("picscrape=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape { target, format } => {
            let run = run_scrape(&target).await?;
            print_scrape(&run, format)?;
        }
        Commands::Download {
            target,
            out_dir,
            index,
            concurrency,
            format,
        } => {
            let run = run_scrape(&target).await?;
            let selected = select(&run.outcome.images, &index)?;
            if selected.is_empty() {
                tracing::warn!("No pictures found");
                return Ok(());
            }
            cmd_download(&selected, &out_dir, concurrency, format).await?;
        }
        Commands::Inspect { target, format } => {
            let run = run_scrape(&target).await?;
            cmd_inspect(&run.outcome.images, format).await?;
        }
        Commands::Probe { host } => {
            let url = ensure_protocol(&host).await;
            let domain = get_domain(&url);
            println!("url:    {url}");
            println!("domain: {domain}");
        }
    }

    Ok(())
}

/// Probe the scheme, derive the domain, and scrape the page.
///
/// A fetch error is logged, not returned: partial results still count.
async fn run_scrape(target: &TargetArgs) -> Result<ScrapeRun> {
    let config = target.config()?;

    let page_url = ensure_protocol(&target.url).await;
    let domain = get_domain(&page_url);
    tracing::debug!(%page_url, %domain, "Resolved target");
    let target = TargetSpec::new(domain, page_url);

    let fetcher = ReqwestFetcher::from_config(&config).context("Failed to create HTTP client")?;
    let service = ScrapeService::with_config(fetcher, HtmlImageScanner::new(), config);
    let outcome = service.scrape_target(&target).await;

    if let Some(e) = &outcome.error {
        tracing::error!("Error while scraping: {e}");
    }

    Ok(ScrapeRun { target, outcome })
}

/// Pick the requested positions out of the scraped list; all of it if none.
fn select(images: &[String], indices: &[usize]) -> Result<Vec<String>> {
    if indices.is_empty() {
        return Ok(images.to_vec());
    }
    indices
        .iter()
        .map(|&i| {
            images.get(i).cloned().with_context(|| {
                format!("Index {i} out of range ({} pictures found)", images.len())
            })
        })
        .collect()
}

fn print_scrape(run: &ScrapeRun, format: OutputFormat) -> Result<()> {
    let images = &run.outcome.images;
    match format {
        OutputFormat::Text => {
            let mut out = std::io::stdout().lock();
            for url in images {
                writeln!(out, "{url}")?;
            }
        }
        OutputFormat::Json => {
            let report = ScrapeReport {
                page_url: &run.target.page_url,
                domain: &run.target.domain,
                images,
                error: run.outcome.error.as_ref().map(|e| e.to_string()),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for (index, url) in images.iter().enumerate() {
                writer.serialize(ImageRow { index, url })?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

async fn cmd_download(
    urls: &[String],
    out_dir: &Path,
    concurrency: usize,
    format: OutputFormat,
) -> Result<()> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create directory: {}", out_dir.display()))?;

    let downloader = Downloader::new()
        .context("Failed to create HTTP client")?
        .with_concurrency(concurrency);
    let reports = downloader.download_all(urls, out_dir).await;

    print_downloads(&reports, format)
}

fn print_downloads(reports: &[DownloadReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let mut out = std::io::stdout().lock();
            for report in reports {
                match (&report.path, &report.error) {
                    (Some(path), None) => writeln!(
                        out,
                        "  [ok]     {} ({} bytes)",
                        path.display(),
                        report.bytes.unwrap_or_default()
                    )?,
                    (_, error) => writeln!(
                        out,
                        "  [FAILED] {}: {}",
                        report.url,
                        error.as_deref().unwrap_or("unknown error")
                    )?,
                }
            }
            let saved = reports.iter().filter(|r| r.is_ok()).count();
            writeln!(out, "\nSaved {saved} of {} pictures", reports.len())?;
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for report in reports {
                writer.serialize(report)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

async fn cmd_inspect(urls: &[String], format: OutputFormat) -> Result<()> {
    let cache = ImageCache::new().context("Failed to create HTTP client")?;

    let mut rows = Vec::with_capacity(urls.len());
    for url in urls {
        let row = match cache.get_or_load(url).await {
            Ok(image) => InspectRow {
                url: url.clone(),
                content_type: image.content_type.clone(),
                bytes: Some(image.len()),
                error: None,
            },
            Err(e) => {
                tracing::warn!(%url, error = %e, "Failed to load image");
                InspectRow {
                    url: url.clone(),
                    content_type: None,
                    bytes: None,
                    error: Some(e.to_string()),
                }
            }
        };
        rows.push(row);
    }

    match format {
        OutputFormat::Text => {
            let mut out = std::io::stdout().lock();
            for row in &rows {
                match &row.error {
                    None => writeln!(
                        out,
                        "{}\t{}\t{}",
                        row.bytes.unwrap_or_default(),
                        row.content_type.as_deref().unwrap_or("-"),
                        row.url
                    )?,
                    Some(error) => writeln!(out, "-\t-\t{} ({error})", row.url)?,
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
