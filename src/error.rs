use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Errors that abort a whole mirror operation.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("Invalid page URL {url}: {reason}")]
    InvalidPageUrl { url: String, reason: String },

    #[error("Invalid output file name {name:?}: {reason}")]
    InvalidOutputName { name: String, reason: &'static str },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch page {url}: {source}")]
    PageRequest {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for page {url}")]
    PageStatus { url: Url, status: StatusCode },

    #[error("Failed to read page body {url}: {source}")]
    PageBody {
        url: Url,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to parse HTML: {0}")]
    Parse(#[source] std::io::Error),

    #[error("Failed to serialize HTML: {0}")]
    Serialize(#[source] std::io::Error),

    #[error("Failed to write document {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors for a single resource download. Never fatal to the mirror.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {0}")]
    Status(StatusCode),

    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),

    #[error("No file name in effective URL {0}")]
    NoFilename(Url),

    #[error("Failed to create directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MirrorError>;
