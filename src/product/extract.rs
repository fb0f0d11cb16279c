use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

use crate::error::ScrapeError;
use crate::product::ProductRecord;

/// Pulls a `ProductRecord` out of a product page.
///
/// Selectors are compiled once; a single `Extractor` is shared by all units
/// of a run.
#[derive(Debug)]
pub struct Extractor {
    title: Selector,
    price: Selector,
    rating: Selector,
    reviews: Selector,
    cell: Selector,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            title: selector("h1"),
            price: selector("p.price_color"),
            rating: selector("p.star-rating"),
            reviews: selector("tr.reviews"),
            cell: selector("td"),
        }
    }

    /// Extracts every field of the record from `content`.
    ///
    /// Only the title is required. A page without an `h1` yields
    /// `ScrapeError::MissingRequiredField` and no record at all.
    pub fn extract(&self, content: &str, source_url: &str) -> Result<ProductRecord, ScrapeError> {
        if content.trim().is_empty() {
            return Err(ScrapeError::MarkupParse("empty document".into()));
        }
        if !content.contains('<') {
            return Err(ScrapeError::MarkupParse("no markup found in document".into()));
        }

        let document = Html::parse_document(content);
        if !document.errors.is_empty() {
            debug!(
                "{} recoverable markup errors while parsing {source_url}",
                document.errors.len()
            );
        }
        info!("HTML content parsed successfully");

        let name = document
            .select(&self.title)
            .next()
            .map(|title| title.text().collect::<String>().trim().to_string())
            .ok_or(ScrapeError::MissingRequiredField("name"))?;
        info!("Product title extracted: {name}");

        let price = document
            .select(&self.price)
            .next()
            .map(|price| strip_currency_prefix(&price.text().collect::<String>()));
        info!("Product price extracted: {price:?}");

        let rating = document
            .select(&self.rating)
            .next()
            .and_then(last_class)
            .map(rating_from_word)
            .unwrap_or(0);
        info!("Product rating extracted: {rating}");

        let review_count = document
            .select(&self.reviews)
            .next()
            .and_then(|row| row.select(&self.cell).next())
            .map(|cell| parse_review_count(cell.text().collect::<String>().trim()))
            .unwrap_or(0);
        info!("Review count extracted: {review_count}");

        Ok(ProductRecord {
            name,
            price,
            rating,
            review_count,
            url: source_url.to_string(),
        })
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector is valid CSS")
}

fn last_class<'a>(elem: ElementRef<'a>) -> Option<&'a str> {
    elem.value().attr("class")?.split_whitespace().last()
}

/// Drops the two-byte currency prefix the price carries on the wire.
///
/// `£` is `C2 A3` in UTF-8, so `£51.77` becomes `51.77`. A prefix that does
/// not end on a character boundary is replaced rather than panicking.
pub(crate) fn strip_currency_prefix(raw: &str) -> String {
    match raw.as_bytes().get(2..) {
        Some(rest) => String::from_utf8_lossy(rest).into_owned(),
        None => String::new(),
    }
}

/// Maps a star-rating class token to its number of stars.
pub(crate) fn rating_from_word(word: &str) -> u8 {
    match word {
        "One" => 1,
        "Two" => 2,
        "Three" => 3,
        "Four" => 4,
        "Five" => 5,
        _ => 0,
    }
}

pub(crate) fn parse_review_count(text: &str) -> i32 {
    text.parse().unwrap_or_else(|_| {
        warn!("Review count {text:?} is not a number, storing 0");
        0
    })
}
