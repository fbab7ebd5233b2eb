//! Requests intercepted from the page and the responses handed back.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::cache::hash::compute_cache_key;

/// What the page intends to do with the response, as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// Top-level navigation.
    Document,
    Image,
    Style,
    Script,
    Font,
    Manifest,
    /// `fetch()`/XHR calls and anything without a specific destination.
    #[default]
    #[serde(alias = "")]
    Empty,
}

impl Destination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Destination::Document => "document",
            Destination::Image => "image",
            Destination::Style => "style",
            Destination::Script => "script",
            Destination::Font => "font",
            Destination::Manifest => "manifest",
            Destination::Empty => "empty",
        }
    }
}

/// A request issued by the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    /// Upper-cased HTTP method.
    pub method: String,
    pub url: Url,
    pub destination: Destination,
    pub headers: Vec<(String, String)>,
}

impl ProxyRequest {
    /// Build a request, normalizing the method and dropping the URL fragment.
    pub fn new(method: &str, mut url: Url, destination: Destination) -> Self {
        url.set_fragment(None);
        Self { method: method.trim().to_ascii_uppercase(), url, destination, headers: Vec::new() }
    }

    /// A plain `GET` with no particular destination.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url, Destination::Empty)
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Partition key for this request: method plus URL.
    pub fn cache_key(&self) -> String {
        compute_cache_key(&self.method, self.url.as_str())
    }

    /// Only `GET` responses may be written to a partition.
    pub fn is_storable(&self) -> bool {
        self.method == "GET"
    }
}

/// A response returned to the page, either from the network, a partition, or
/// synthesized locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ProxyResponse {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// Response with a single `Content-Type` header.
    pub fn with_content_type(status: u16, content_type: &str, body: impl Into<Bytes>) -> Self {
        Self::new(status, vec![("content-type".to_string(), content_type.to_string())], body)
    }

    /// True for statuses in the 200-299 range.
    pub fn ok(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
