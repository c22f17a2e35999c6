//! Network-first caching proxy
//!
//! Sits between a browser and the Fulcrum backend. Every request goes
//! upstream first; successful GET responses are copied into the current
//! cache store, and when upstream cannot be reached the stored copy is
//! served instead (or `504 Gateway Timeout` if there is none).

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use url::Url;

use crate::api::client::{join_base_url, parse_base_url};
use crate::config::Config;

use super::cache::{CacheStorage, CacheStore, CachedResponse};

/// Largest request body forwarded upstream
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Marks responses served from the cache
pub const CACHE_HEADER: &str = "x-fulcrum-cache";

/// Hop-by-hop headers that must not be copied between connections
fn is_hop_header(name: &HeaderName) -> bool {
    *name == header::CONNECTION
        || *name == header::TRANSFER_ENCODING
        || *name == header::CONTENT_LENGTH
        || *name == header::HOST
        || *name == header::UPGRADE
}

pub struct OfflineProxy {
    client: reqwest::Client,
    upstream: Url,
    storage: CacheStorage,
    store: CacheStore,
    assets: Vec<String>,
}

impl std::fmt::Debug for OfflineProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OfflineProxy")
            .field("upstream", &self.upstream.as_str())
            .field("store", &self.store.name())
            .finish()
    }
}

impl OfflineProxy {
    pub fn new(
        upstream: &str,
        storage: CacheStorage,
        cache_version: &str,
        assets: Vec<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let upstream = parse_base_url(upstream)
            .with_context(|| format!("Invalid upstream URL '{}'", upstream))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let store = storage.open(cache_version);
        Ok(Self {
            client,
            upstream,
            storage,
            store,
            assets,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.server.base_url,
            CacheStorage::new(config.cache_dir()?),
            &config.offline.cache_version,
            config.offline.assets.clone(),
            Duration::from_secs(config.server.timeout_secs),
        )
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    fn upstream_url(&self, path_and_query: &str) -> Result<Url> {
        join_base_url(&self.upstream, path_and_query)
            .with_context(|| format!("Invalid request path '{}'", path_and_query))
    }

    /// Precache every asset. All are fetched before anything is written, so
    /// one failure leaves the store untouched.
    pub async fn install(&self) -> Result<usize> {
        let fetches = self.assets.iter().map(|asset| async move {
            let url = self.upstream_url(asset)?;
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("Failed to fetch {}", url))?;
            let status = response.status();
            if !status.is_success() {
                anyhow::bail!("Failed to fetch {}: HTTP {}", url, status.as_u16());
            }
            let headers = stored_headers(response.headers());
            let body = response.bytes().await?;
            Ok::<_, anyhow::Error>(
                CachedResponse::new("GET", url.as_str(), status.as_u16(), body.to_vec())
                    .with_headers(headers),
            )
        });
        let responses = futures::future::join_all(fetches)
            .await
            .into_iter()
            .collect::<Result<Vec<_>>>()?;

        self.store.put_all(&responses).await?;
        tracing::info!(
            "Precached {} assets into {}",
            responses.len(),
            self.store.name()
        );
        Ok(responses.len())
    }

    /// Delete every store except the current one. Returns the deleted names.
    pub async fn activate(&self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.storage.keys().await? {
            if name != self.store.name() && self.storage.delete(&name).await? {
                tracing::info!("Evicted cache store {}", name);
                deleted.push(name);
            }
        }
        Ok(deleted)
    }

    /// Handle one request, network first
    pub async fn fetch(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let url = match self.upstream_url(path_and_query) {
            Ok(url) => url,
            Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
        };

        let mut forwarded = headers;
        for name in [
            header::CONNECTION,
            header::TRANSFER_ENCODING,
            header::CONTENT_LENGTH,
            header::HOST,
            header::UPGRADE,
        ] {
            forwarded.remove(name);
        }
        let request = self
            .client
            .request(method.clone(), url.clone())
            .headers(forwarded)
            .body(body);

        match request.send().await {
            Ok(response) => self.relay(&method, &url, response).await,
            Err(e) => {
                tracing::warn!("Upstream unreachable for {} {}: {}", method, url, e);
                self.fallback(&method, &url).await
            }
        }
    }

    async fn relay(&self, method: &Method, url: &Url, response: reqwest::Response) -> Response {
        let status = response.status();
        let headers = stored_headers(response.headers());
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Upstream body for {} failed: {}", url, e);
                return self.fallback(method, url).await;
            }
        };

        if *method == Method::GET && status.is_success() {
            let cached = CachedResponse::new("GET", url.as_str(), status.as_u16(), body.to_vec())
                .with_headers(headers.clone());
            if let Err(e) = self.store.put(&cached).await {
                tracing::warn!("Failed to cache {}: {:#}", url, e);
            }
        }
        build_response(status.as_u16(), &headers, body.to_vec(), false)
    }

    async fn fallback(&self, method: &Method, url: &Url) -> Response {
        match self.store.lookup(method.as_str(), url.as_str()).await {
            Ok(Some(cached)) => {
                tracing::debug!("Serving {} {} from {}", method, url, self.store.name());
                build_response(cached.status, &cached.headers, cached.body, true)
            }
            Ok(None) => (StatusCode::GATEWAY_TIMEOUT, "Offline and not cached").into_response(),
            Err(e) => {
                tracing::warn!("Cache lookup for {} failed: {:#}", url, e);
                (StatusCode::GATEWAY_TIMEOUT, "Offline and not cached").into_response()
            }
        }
    }
}

fn stored_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|(name, _)| !is_hop_header(name))
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn build_response(status: u16, headers: &[(String, String)], body: Vec<u8>, from_cache: bool) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    let map = response.headers_mut();
    for (name, value) in headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            map.append(name, value);
        }
    }
    if from_cache {
        map.insert(CACHE_HEADER, HeaderValue::from_static("hit"));
    }
    response
}

async fn forward(State(proxy): State<Arc<OfflineProxy>>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    let body = match to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => return (StatusCode::PAYLOAD_TOO_LARGE, e.to_string()).into_response(),
    };
    proxy
        .fetch(parts.method, &path_and_query, parts.headers, body)
        .await
}

/// Router sending every path through the proxy
pub fn router(proxy: Arc<OfflineProxy>) -> Router {
    Router::new()
        .fallback(forward)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(proxy)
}

/// Install, activate, then serve until the process is stopped
pub async fn run_offline_proxy(config: &Config) -> Result<()> {
    let proxy = Arc::new(OfflineProxy::from_config(config)?);

    // the proxy still serves when the backend is down at startup
    if let Err(e) = proxy.install().await {
        tracing::warn!("Precache skipped: {:#}", e);
    }
    proxy.activate().await?;

    let addr: SocketAddr = format!("{}:{}", config.offline.host, config.offline.port)
        .parse()
        .context("Invalid offline proxy address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(
        "Offline proxy listening on {} (upstream {}, store {})",
        addr,
        config.server.base_url,
        proxy.store().name()
    );
    axum::serve(listener, router(proxy))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Shutting down offline proxy");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_upstream_url_keeps_path_prefix() {
        let dir = TempDir::new().unwrap();
        let proxy = OfflineProxy::new(
            "http://host:8000/fulcrum",
            CacheStorage::new(dir.path()),
            "fulcrum-v1",
            Vec::new(),
            Duration::from_secs(1),
        )
        .unwrap();

        assert_eq!(
            proxy.upstream_url("/static/app.js?v=2").unwrap().as_str(),
            "http://host:8000/fulcrum/static/app.js?v=2"
        );
        assert_eq!(
            proxy.upstream_url("/").unwrap().as_str(),
            "http://host:8000/fulcrum/"
        );
    }
}
