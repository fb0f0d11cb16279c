//! Scrape product listing pages and persist them.
//!
//! Every URL goes through the same pipeline: `PageFetcher` downloads the
//! page, `Extractor` pulls the `ProductRecord` out of the markup and a
//! `RecordSink` stores it. `Orchestrator` runs one task per URL and waits
//! for all of them; a failing URL is logged and never affects the others.
//!
//! Feature Flags:
//! - `serde`: Enables serde support for the structs. (default)

pub mod config;
mod error;
mod fetch;
pub mod logging;
mod orchestrator;
mod product;
pub mod sink;

pub use config::Config;
pub use error::{ScrapeError, ScrapeErrorKind};
pub use fetch::PageFetcher;
use header::{HeaderMap, HeaderValue};
pub use orchestrator::{process_url, Orchestrator, RunReport, UrlOutcome};
pub use product::{Extractor, ProductRecord};
use reqwest::header;
pub use sink::{PgSink, RecordSink, SinkError};
pub use url::Url;

/// Headers sent with every page request, so shops serve the same HTML a
/// desktop browser would get.
fn build_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_static(
            "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/118.0",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.5"),
    );
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers
}
