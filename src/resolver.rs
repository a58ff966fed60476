use thiserror::Error;
use url::Url;

use crate::error::MirrorError;

/// Why a resource reference is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    #[error("empty reference")]
    Empty,

    #[error("malformed reference {reference:?}: {reason}")]
    Malformed { reference: String, reason: String },

    #[error("external resource {0}")]
    CrossOrigin(Url),
}

/// Resolves `reference` against `base` and keeps it only when it stays on the
/// base host. Relative, root-relative and protocol-relative references are all
/// resolved before the host comparison.
pub fn resolve(reference: &str, base: &Url) -> Result<Url, Skip> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(Skip::Empty);
    }

    let url = base.join(trimmed).map_err(|e| Skip::Malformed {
        reference: reference.to_string(),
        reason: e.to_string(),
    })?;

    if !is_same_origin(&url, base) {
        return Err(Skip::CrossOrigin(url));
    }

    Ok(url)
}

/// Host (and explicit port) equality. The scheme is not compared, so an
/// `http` page may pull assets from the `https` side of the same host.
pub fn is_same_origin(url: &Url, base: &Url) -> bool {
    match (url.host_str(), base.host_str()) {
        (Some(host), Some(base_host)) => {
            host.eq_ignore_ascii_case(base_host) && url.port() == base.port()
        }
        _ => false,
    }
}

/// Parses the page to mirror. Only absolute `http`/`https` URLs with a host are accepted.
pub fn parse_page_url(raw: &str) -> Result<Url, MirrorError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| MirrorError::InvalidPageUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(MirrorError::InvalidPageUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(MirrorError::InvalidPageUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        });
    }

    Ok(url)
}
