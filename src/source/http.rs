//! HTTP live source.
//!
//! Queries the `live_info` endpoint for metadata and builds `live_image`
//! URLs for display. Every request carries a cache-busting `t` parameter so
//! intermediaries never serve a stale frame.
//!
//! ## Example
//!
//! ```rust,no_run
//! use nebula_live::source::{HttpSource, LiveSource, Target};
//!
//! # tokio_test::block_on(async {
//! let source = HttpSource::builder()
//!     .endpoint("http://127.0.0.1:8188/nebula")
//!     .build()
//!     .unwrap();
//!
//! let target = Target::new("my-project", true);
//! let snapshot = source.probe(&target).await.unwrap();
//! if snapshot.exists {
//!     println!("latest: {}", source.content_url(&target));
//! }
//! # });
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::{LiveInfo, LiveSource, ProbeError, Snapshot, Target};

/// Default base URL: the Nebula routes of a local ComfyUI server.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8188/nebula";

const INFO_PATH: &str = "live_info";
const IMAGE_PATH: &str = "live_image";

/// Millisecond timestamps that never repeat.
///
/// Two values taken within the same millisecond (or after the wall clock
/// stepped backwards) still differ.
#[derive(Debug, Default)]
pub struct CacheBuster {
    last: AtomicU64,
}

impl CacheBuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next cache-busting value, strictly greater than the previous one.
    pub fn next(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

/// Live source backed by the Nebula HTTP routes.
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    base: Url,
    description: String,
    cache_buster: CacheBuster,
}

impl HttpSource {
    /// Create a new builder for configuring the source.
    pub fn builder() -> HttpSourceBuilder {
        HttpSourceBuilder::default()
    }

    /// The base URL requests are built from.
    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    /// Build the metadata probe URL for a target.
    pub fn info_url(&self, target: &Target) -> Url {
        self.route(INFO_PATH, target)
    }

    fn route(&self, path: &str, target: &Target) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(path);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("project_id", &target.id)
            .append_pair("subdirs", target.subdirs_flag())
            .append_pair("t", &self.cache_buster.next().to_string());
        url
    }
}

#[async_trait]
impl LiveSource for HttpSource {
    async fn probe(&self, target: &Target) -> Result<Snapshot, ProbeError> {
        let url = self.info_url(target);
        tracing::trace!(url = %url, "probing live info");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(Snapshot::missing());
        }

        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let info: LiveInfo = response
            .json()
            .await
            .map_err(|e| ProbeError::Parse(e.to_string()))?;

        Ok(info.into())
    }

    fn content_url(&self, target: &Target) -> String {
        self.route(IMAGE_PATH, target).into()
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for HttpSource.
#[derive(Debug, Default)]
pub struct HttpSourceBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl HttpSourceBuilder {
    /// Set the base URL of the Nebula routes (e.g., "http://localhost:8188/nebula").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the source.
    pub fn build(self) -> Result<HttpSource, ProbeError> {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let base = Url::parse(&endpoint)
            .map_err(|e| ProbeError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ProbeError::InvalidEndpoint(format!(
                "{}: expected an http(s) URL",
                endpoint
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(HttpSource {
            client,
            description: format!("http: {}", base),
            base,
            cache_buster: CacheBuster::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    fn query(url: &str) -> HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    /// Serve a single canned HTTP response and report the request line.
    async fn serve_once(response: String) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let mut read = 0;
            loop {
                let n = socket.read(&mut buf[read..]).await.unwrap();
                if n == 0 {
                    break;
                }
                read += n;
                if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let request = String::from_utf8_lossy(&buf[..read]).to_string();
            let request_line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(request_line);

            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (format!("http://{}/nebula", addr), rx)
    }

    fn json_response(body: &str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    #[test]
    fn test_builder_defaults() {
        let source = HttpSource::builder().build().unwrap();
        assert_eq!(source.endpoint().as_str(), "http://127.0.0.1:8188/nebula");
        assert_eq!(source.description(), "http: http://127.0.0.1:8188/nebula");
    }

    #[test]
    fn test_builder_rejects_invalid_endpoint() {
        let err = HttpSource::builder().endpoint("not a url").build().unwrap_err();
        assert!(matches!(err, ProbeError::InvalidEndpoint(_)));

        let err = HttpSource::builder()
            .endpoint("mailto:someone@example.com")
            .build()
            .unwrap_err();
        assert!(matches!(err, ProbeError::InvalidEndpoint(_)));
    }

    #[test]
    fn test_content_url() {
        let source = HttpSource::builder()
            .endpoint("http://comfy.local:8188/nebula/")
            .build()
            .unwrap();
        let target = Target::new("my project/1", false);

        let url = source.content_url(&target);
        assert!(url.starts_with("http://comfy.local:8188/nebula/live_image?"));

        let params = query(&url);
        assert_eq!(params["project_id"], "my project/1");
        assert_eq!(params["subdirs"], "0");
        assert!(params["t"].parse::<u64>().is_ok());
    }

    #[test]
    fn test_urls_are_cache_busted() {
        let source = HttpSource::builder().build().unwrap();
        let target = Target::new("p", true);

        let first = source.content_url(&target);
        let second = source.content_url(&target);
        assert_ne!(first, second);

        let info = source.info_url(&target);
        assert_eq!(info.path(), "/nebula/live_info");
    }

    #[test]
    fn test_cache_buster_strictly_increasing() {
        let buster = CacheBuster::new();
        let mut prev = buster.next();
        for _ in 0..1000 {
            let next = buster.next();
            assert!(next > prev);
            prev = next;
        }
    }

    #[tokio::test]
    async fn test_probe_no_content() {
        let (endpoint, request) =
            serve_once("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()).await;
        let source = HttpSource::builder().endpoint(endpoint).build().unwrap();

        let snapshot = source.probe(&Target::new("proj", true)).await.unwrap();
        assert!(!snapshot.exists);

        let request_line = request.await.unwrap();
        assert!(request_line.starts_with("GET /nebula/live_info?project_id=proj&subdirs=1&t="));
    }

    #[tokio::test]
    async fn test_probe_success() {
        let body = r#"{"has_image":true,"mtime":1000,"filename":"a.png","loop_dir":"loop_01"}"#;
        let (endpoint, _request) = serve_once(json_response(body)).await;
        let source = HttpSource::builder().endpoint(endpoint).build().unwrap();

        let snapshot = source.probe(&Target::new("proj", true)).await.unwrap();
        assert_eq!(
            snapshot,
            Snapshot::present(1000.0).named("a.png").in_group("loop_01")
        );
    }

    #[tokio::test]
    async fn test_probe_error_status() {
        let (endpoint, _request) = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                .to_string(),
        )
        .await;
        let source = HttpSource::builder().endpoint(endpoint).build().unwrap();

        let err = source.probe(&Target::new("proj", true)).await.unwrap_err();
        assert_eq!(err, ProbeError::Status(500));
    }

    #[tokio::test]
    async fn test_probe_malformed_body() {
        let (endpoint, _request) = serve_once(json_response("not json")).await;
        let source = HttpSource::builder().endpoint(endpoint).build().unwrap();

        let err = source.probe(&Target::new("proj", true)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Parse(_)));
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpSource::builder()
            .endpoint(format!("http://{}/nebula", addr))
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let err = source.probe(&Target::new("proj", true)).await.unwrap_err();
        assert!(matches!(
            err,
            ProbeError::Connect(_) | ProbeError::Request(_) | ProbeError::Timeout
        ));
    }
}
