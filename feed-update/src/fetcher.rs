use crate::types::{FeedError, FetchConfig, Result, Transport};
use async_trait::async_trait;
use backoff::backoff::{Backoff, Constant};
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP GET transport handed to provider adapters.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetches `url`. A 429 answer is retried after the fixed delay, at most
    /// `max_retries` times; every other non-2xx status fails at once.
    pub async fn fetch_bytes(&self, url: &str, label: &str) -> Result<Vec<u8>> {
        let mut backoff = Constant::new(Duration::from_millis(self.config.retry_delay_ms));
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!("Fetching {} ({}), attempt {}", url, label, attempt);

            let response = self
                .client
                .get(url)
                .header(ACCEPT, &self.config.accept)
                .send()
                .await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt <= self.config.max_retries {
                    if let Some(delay) = backoff.next_backoff() {
                        warn!("{} rate limited, retrying in {:?}", label, delay);
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                }
                return Err(FeedError::RateLimited {
                    label: label.to_string(),
                    attempts: attempt,
                });
            }

            if !status.is_success() {
                return Err(FeedError::Status {
                    label: label.to_string(),
                    status: status.to_string(),
                });
            }

            let body = response.bytes().await?;
            debug!("Fetched {} ({} bytes)", url, body.len());
            return Ok(body.to_vec());
        }
    }
}

#[async_trait]
impl Transport for Fetcher {
    async fn fetch(&self, url: &str, source_label: &str) -> anyhow::Result<Vec<u8>> {
        Ok(self.fetch_bytes(url, source_label).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves the given status lines in order, one connection each.
    async fn serve(responses: Vec<(&'static str, &'static str)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut buf = vec![0u8; 4096];
                let mut request = Vec::new();
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    let n = socket.read(&mut buf).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                }
                counter.fetch_add(1, Ordering::SeqCst);
                let reply = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (format!("http://{}/feed", addr), hits)
    }

    fn fast_config() -> FetchConfig {
        FetchConfig {
            retry_delay_ms: 10,
            ..FetchConfig::default()
        }
    }

    #[tokio::test]
    async fn retries_once_after_rate_limit() {
        let (url, hits) = serve(vec![("429 Too Many Requests", ""), ("200 OK", "<rss/>")]).await;
        let fetcher = Fetcher::new(fast_config()).unwrap();
        let body = fetcher.fetch_bytes(&url, "test feed").await.unwrap();
        assert_eq!(body, b"<rss/>");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn second_rate_limit_is_terminal() {
        let (url, hits) = serve(vec![
            ("429 Too Many Requests", ""),
            ("429 Too Many Requests", ""),
            ("200 OK", "unused"),
        ])
        .await;
        let fetcher = Fetcher::new(fast_config()).unwrap();
        let err = fetcher.fetch_bytes(&url, "test feed").await.unwrap_err();
        assert!(matches!(err, FeedError::RateLimited { attempts: 2, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_status_fails_without_retry() {
        let (url, hits) = serve(vec![("404 Not Found", "gone"), ("200 OK", "unused")]).await;
        let fetcher = Fetcher::new(fast_config()).unwrap();
        let err = fetcher.fetch_bytes(&url, "wordpress tv").await.unwrap_err();
        assert_eq!(err.to_string(), "wordpress tv api status: 404 Not Found");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
