//! Request classification.
//!
//! Classification depends only on the request's destination and URL path;
//! headers and body are never inspected.

use std::sync::LazyLock;

use pwa_core::{Destination, ProxyRequest};
use regex::RegexSet;
use serde::Serialize;
use url::Url;

use crate::fetch::{is_http, same_origin};

/// Path suffixes served cache-first: images, styles and scripts, markup.
static ASSET_PATTERNS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([r"\.(?:png|jpg|jpeg|svg|gif|webp)$", r"\.(?:css|js)$", r"\.(?:html)$"])
        .expect("asset patterns are valid regexes")
});

/// Where an intercepted request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    /// Not intercepted: the host fetches it untouched.
    Passthrough,
    NetworkFirstDocument,
    CacheFirstAsset,
    NetworkFirstGeneric,
}

/// Whether a URL path names a cache-first asset.
pub fn is_asset_path(path: &str) -> bool {
    ASSET_PATTERNS.is_match(path)
}

/// Classify a request issued from a page under `scope`.
pub fn classify(request: &ProxyRequest, scope: &Url) -> Route {
    if !is_http(&request.url) || !same_origin(&request.url, scope) {
        return Route::Passthrough;
    }

    if request.destination == Destination::Document {
        Route::NetworkFirstDocument
    } else if is_asset_path(request.url.path()) {
        Route::CacheFirstAsset
    } else {
        Route::NetworkFirstGeneric
    }
}
