use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use crate::sink::SinkError;

/// Everything that can abandon a single URL.
///
/// None of these ever reach the caller of `Orchestrator::run`; the unit that
/// hit the error logs it and stops.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error {status} while fetching {url}")]
    HttpStatus { url: String, status: StatusCode },
    #[error("request to {url} failed: {reason}")]
    Network { url: String, reason: String },
    #[error("could not parse page content: {0}")]
    MarkupParse(String),
    #[error("required field `{0}` not found on page")]
    MissingRequiredField(&'static str),
    #[error("could not save record: {0}")]
    Sink(#[from] SinkError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ScrapeError {
    pub fn kind(&self) -> ScrapeErrorKind {
        match self {
            ScrapeError::HttpStatus { .. } => ScrapeErrorKind::HttpStatus,
            ScrapeError::Network { .. } => ScrapeErrorKind::Network,
            ScrapeError::MarkupParse(_) => ScrapeErrorKind::MarkupParse,
            ScrapeError::MissingRequiredField(_) => ScrapeErrorKind::MissingRequiredField,
            ScrapeError::Sink(_) => ScrapeErrorKind::Sink,
            ScrapeError::Unexpected(_) => ScrapeErrorKind::Unexpected,
        }
    }

    /// Sorts a transport failure into network-level or unexpected.
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return ScrapeError::HttpStatus {
                url: url.to_string(),
                status,
            };
        }
        if err.is_decode() {
            return ScrapeError::Unexpected(err.to_string());
        }
        ScrapeError::Network {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Category of a `ScrapeError`, as it shows up in the log and in reports.
pub enum ScrapeErrorKind {
    HttpStatus,
    Network,
    MarkupParse,
    MissingRequiredField,
    Sink,
    Unexpected,
}

impl fmt::Display for ScrapeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScrapeErrorKind::HttpStatus => "HttpStatusError",
            ScrapeErrorKind::Network => "NetworkError",
            ScrapeErrorKind::MarkupParse => "MarkupParseError",
            ScrapeErrorKind::MissingRequiredField => "MissingRequiredFieldError",
            ScrapeErrorKind::Sink => "SinkError",
            ScrapeErrorKind::Unexpected => "UnexpectedError",
        };
        f.write_str(name)
    }
}
