use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Result, WrapErr};
use product_scraper::{logging, Config, Orchestrator, PageFetcher, PgSink};
use tracing::info;

const DEFAULT_URLS: [&str; 8] = [
    "https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html",
    "https://books.toscrape.com/catalogue/tipping-the-velvet_999/index.html",
    "https://books.toscrape.com/catalogue/soumission_998/index.html",
    "https://books.toscrape.com/catalogue/sapiens-a-brief-history-of-humankind_996/index.html",
    "https://books.toscrape.com/catalogue/the-requiem-red_995/index.html",
    "https://books.toscrape.com/catalogue/the-black-maria_991/index.html",
    "https://books.toscrape.com/catalogue/rip-it-up-and-start-again_986/index.html",
    "https://books.toscrape.com/catalogue/olio_984/index.html",
];

#[derive(Parser)]
#[command(name = "product_scraper", about = "Scrape product pages into PostgreSQL")]
struct Cli {
    /// Product page URLs (default: a sample of books.toscrape.com pages)
    urls: Vec<String>,
    /// Read more URLs from a file, one per line
    #[arg(short = 'f', long)]
    urls_file: Option<PathBuf>,
    /// Max pages processed at once (default: all at once, or SCRAPER_CONCURRENCY)
    #[arg(short = 'c', long)]
    concurrency: Option<usize>,
    /// Create the products table before scraping
    #[arg(long)]
    init_schema: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init(&Config::log_file_from_env())?;
    info!("Loading environment variables...");
    let config = Config::from_env()?;
    info!("Environment variables loaded successfully");

    let mut urls = cli.urls;
    if let Some(path) = &cli.urls_file {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("reading URL list from {}", path.display()))?;
        urls.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from),
        );
    }
    if urls.is_empty() {
        urls = DEFAULT_URLS.iter().map(|url| url.to_string()).collect();
    }

    let sink = PgSink::connect(&config).await?;
    if cli.init_schema {
        sink.ensure_schema().await?;
    }

    let orchestrator = Orchestrator::new(PageFetcher::new()?, Arc::new(sink))
        .with_concurrency_limit(cli.concurrency.or(config.concurrency));
    info!("Scraping {} URLs", urls.len());
    orchestrator.run(urls).await;
    Ok(())
}
