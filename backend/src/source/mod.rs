//! Where the review export comes from.
//!
//! The live catalog is a published spreadsheet: an HTTP GET returns the
//! whole sheet as comma-separated text. A local export file can stand in for
//! it (offline use, demos, tests).
//!
//! ```rust,ignore
//! use coursepilot::source::{HttpSheetSource, SheetSource};
//!
//! let source = HttpSheetSource::new(sheet_url);
//! let text = source.fetch().await?;
//! ```

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};

use crate::error::{SourceError, SourceResult};
use crate::parser::decode_bytes;

/// A provider of raw export text.
#[async_trait]
pub trait SheetSource: Send + Sync {
    /// Fetch the whole export. Non-2xx answers are errors.
    async fn fetch(&self) -> SourceResult<String>;

    /// Human-readable origin, for logs.
    fn describe(&self) -> String;
}

// =============================================================================
// HTTP
// =============================================================================

/// The published spreadsheet, fetched over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSheetSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSheetSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Append a `cache_ts` parameter so intermediate caches never serve a stale
/// sheet.
pub fn cache_busted_url(base: &str, millis: i64) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}cache_ts={}", base, separator, millis)
}

#[async_trait]
impl SheetSource for HttpSheetSource {
    async fn fetch(&self) -> SourceResult<String> {
        let url = cache_busted_url(&self.url, Utc::now().timestamp_millis());

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SourceError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SourceError::Body(e.to_string()))?;

        Ok(decode_bytes(&bytes).text)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

// =============================================================================
// Local file
// =============================================================================

/// A downloaded export on disk. Re-read on every fetch.
#[derive(Debug, Clone)]
pub struct FileSheetSource {
    path: PathBuf,
}

impl FileSheetSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SheetSource for FileSheetSource {
    async fn fetch(&self) -> SourceResult<String> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(decode_bytes(&bytes).text)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers one request with `status` and `body`; yields the request line.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}/pub?output=csv", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: text/csv\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (base, handle)
    }

    #[tokio::test]
    async fn test_http_fetch_returns_body_with_cache_buster() {
        let (url, server) = serve_once("200 OK", "Course,Rating\nCS101,5\n").await;

        let text = HttpSheetSource::new(url).fetch().await.unwrap();
        assert_eq!(text, "Course,Rating\nCS101,5\n");

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /pub?output=csv&cache_ts="), "{}", request_line);
    }

    #[tokio::test]
    async fn test_http_non_success_is_status_error() {
        let (url, server) = serve_once("503 Service Unavailable", "busy").await;

        let result = HttpSheetSource::new(url).fetch().await;
        assert!(matches!(result, Err(SourceError::Status(503))));
        server.await.unwrap();
    }

    #[test]
    fn test_cache_busted_url() {
        assert_eq!(
            cache_busted_url("https://example.org/pub?output=csv", 42),
            "https://example.org/pub?output=csv&cache_ts=42"
        );
        assert_eq!(
            cache_busted_url("https://example.org/export.csv", 7),
            "https://example.org/export.csv?cache_ts=7"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        // Port 1 on loopback refuses connections
        let source = HttpSheetSource::new("http://127.0.0.1:1/sheet.csv");
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, SourceError::Request(_)));
    }

    #[tokio::test]
    async fn test_file_source_reads_and_decodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        // "Économie" in Windows-1252
        std::fs::write(&path, b"Course,Rating\n\xC9conomie,4\n").unwrap();

        let source = FileSheetSource::new(&path);
        let text = source.fetch().await.unwrap();
        assert!(text.starts_with("Course,Rating"));
        assert!(text.contains("conomie,4"));
        assert_eq!(source.describe(), path.display().to_string());
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let source = FileSheetSource::new("/definitely/not/here.csv");
        assert!(matches!(source.fetch().await, Err(SourceError::Io(_))));
    }
}
