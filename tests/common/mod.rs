//! Helpers shared by the integration tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use product_scraper::{ProductRecord, RecordSink, SinkError};

/// Builds a product page in the layout the extractor expects.
#[allow(dead_code)]
pub fn product_page(title: Option<&str>, price: Option<&str>, rating: Option<&str>) -> String {
    let title = title.map(|t| format!("<h1>{t}</h1>")).unwrap_or_default();
    let price = price
        .map(|p| format!(r#"<p class="price_color">{p}</p>"#))
        .unwrap_or_default();
    let rating = rating
        .map(|r| format!(r#"<p class="star-rating {r}"><i class="icon-star"></i></p>"#))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en-us">
<head><meta charset="utf-8"><title>Books to Scrape</title></head>
<body>
<div class="product_main">{title}{price}{rating}</div>
<table class="table table-striped">
    <tr><th>Product Type</th><td>Books</td></tr>
</table>
</body>
</html>"#
    )
}

/// Keeps saved records in memory, optionally sleeping before each save.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<ProductRecord>>,
    delay_for: Option<fn(&ProductRecord) -> Duration>,
    reject_url_containing: Option<&'static str>,
}

#[allow(dead_code)]
impl MemorySink {
    pub fn with_delay(delay_for: fn(&ProductRecord) -> Duration) -> Self {
        Self {
            delay_for: Some(delay_for),
            ..Self::default()
        }
    }

    pub fn rejecting(fragment: &'static str) -> Self {
        Self {
            reject_url_containing: Some(fragment),
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<ProductRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn record_for(&self, url: &str) -> Option<ProductRecord> {
        self.records().into_iter().find(|r| r.url == url)
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn save(&self, record: &ProductRecord) -> Result<(), SinkError> {
        if let Some(delay_for) = self.delay_for {
            tokio::time::sleep(delay_for(record)).await;
        }
        if let Some(fragment) = self.reject_url_containing {
            if record.url.contains(fragment) {
                return Err(SinkError::Unavailable(format!("refusing {}", record.url)));
            }
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}
