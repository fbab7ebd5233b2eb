//! URL parsing and origin checks for intercepted requests.

use url::Url;

/// Error type for request URL parsing failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("relative URL without a base: {0}")]
    Relative(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse a request URL as the page would issue it.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Resolve relative references against `base` (the application scope)
/// 3. Remove fragment (#...), which never reaches the network
///
/// Any scheme is accepted; the router decides what is intercepted.
pub fn parse_request_url(input: &str, base: Option<&Url>) -> Result<Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = match Url::parse(trimmed) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?,
            None => return Err(UrlError::Relative(trimmed.to_string())),
        },
        Err(e) => return Err(UrlError::InvalidUrl(e.to_string())),
    };

    parsed.set_fragment(None);

    Ok(parsed)
}

/// True for `http` and `https` URLs.
pub fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Same scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}
