//! The three caching strategies.
//!
//! Partition failures never stop a response from being returned: a failed
//! read is a miss and a failed write is skipped, both logged.

use pwa_core::{Destination, Error, ProxyRequest, ProxyResponse};

use super::fallback;
use super::{Resolution, ResponseSource, Route, Worker};

impl Worker {
    /// Network first; on failure the cache, then the fallback document, then
    /// the offline page. Never fails.
    pub async fn network_first_document(&self, request: &ProxyRequest) -> Resolution {
        let resolve = |source, response| Resolution { route: Route::NetworkFirstDocument, source, response };

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.ok() {
                    self.store_dynamic(request, &response).await;
                    tracing::debug!("document cached: {}", request.url);
                }
                resolve(ResponseSource::Network, response)
            }
            Err(e) => {
                tracing::debug!("network unavailable for {}, using cache: {e}", request.url);

                if let Some(cached) = self.lookup_any(request).await {
                    return resolve(ResponseSource::Cache, cached);
                }

                let shell = ProxyRequest::get(self.config.fallback_document.clone());
                match self.db.match_entry(&self.config.partitions.static_name, &shell).await {
                    Ok(Some(document)) => resolve(ResponseSource::FallbackDocument, document),
                    Ok(None) => resolve(ResponseSource::Synthesized, fallback::offline_page()),
                    Err(e) => {
                        tracing::warn!("fallback document lookup failed: {e}");
                        resolve(ResponseSource::Synthesized, fallback::offline_page())
                    }
                }
            }
        }
    }

    /// Cache first with no network call on a hit; on a miss the network,
    /// then a placeholder image or a 404. Never fails.
    pub async fn cache_first_asset(&self, request: &ProxyRequest) -> Resolution {
        let resolve = |source, response| Resolution { route: Route::CacheFirstAsset, source, response };

        if let Some(cached) = self.lookup_any(request).await {
            tracing::debug!("asset served from cache: {}", request.url);
            return resolve(ResponseSource::Cache, cached);
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.ok() {
                    self.store_dynamic(request, &response).await;
                    tracing::debug!("asset cached: {}", request.url);
                }
                resolve(ResponseSource::Network, response)
            }
            Err(e) => {
                tracing::warn!("asset unavailable: {}: {e}", request.url);
                if request.destination == Destination::Image {
                    resolve(ResponseSource::Synthesized, fallback::placeholder_image())
                } else {
                    resolve(ResponseSource::Synthesized, fallback::asset_unavailable())
                }
            }
        }
    }

    /// Network first; on failure the cache, else the network error.
    ///
    /// There is no synthesized fallback for this class of request.
    // TODO: confirm with product whether a cache miss here should get a soft fallback like documents and assets.
    pub async fn network_first_generic(&self, request: &ProxyRequest) -> Result<Resolution, Error> {
        let resolve = |source, response| Resolution { route: Route::NetworkFirstGeneric, source, response };

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.ok() {
                    self.store_dynamic(request, &response).await;
                }
                Ok(resolve(ResponseSource::Network, response))
            }
            Err(e) => match self.lookup_any(request).await {
                Some(cached) => {
                    tracing::debug!("cache fallback for {}", request.url);
                    Ok(resolve(ResponseSource::Cache, cached))
                }
                None => Err(e),
            },
        }
    }

    /// Cross-partition lookup; read failures count as a miss.
    async fn lookup_any(&self, request: &ProxyRequest) -> Option<ProxyResponse> {
        match self.db.match_any(request).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!("cache lookup failed for {}: {e}", request.url);
                None
            }
        }
    }

    /// Write a copy of the response into the dynamic partition.
    async fn store_dynamic(&self, request: &ProxyRequest, response: &ProxyResponse) {
        if !request.is_storable() {
            tracing::debug!("not caching {} {}", request.method, request.url);
            return;
        }
        if let Err(e) = self.db.put_entry(&self.config.partitions.dynamic_name, request, response).await {
            tracing::warn!("cache write failed for {}: {e}", request.url);
        }
    }
}
