mod extract;

pub use extract::Extractor;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Default, Debug, Clone, PartialEq, Eq)]
/// A product as extracted from one page.
pub struct ProductRecord {
    /// Text of the first `h1` on the page.
    pub name: String,
    /// Price with its currency prefix removed, kept as text.
    /// `None` when the page shows no price.
    pub price: Option<String>,
    /// Number of stars, 0 when the page has no usable rating.
    pub rating: u8,
    /// Number of reviews, 0 when the page lists none.
    pub review_count: i32,
    /// URL the page was fetched from.
    pub url: String,
}
