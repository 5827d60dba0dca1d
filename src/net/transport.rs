use std::time::Duration;

use async_trait::async_trait;

use crate::error::AppError;

/// Outbound GET seam shared by the relay and the direct adapters.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch `url` and return the body, failing on timeout, transport error
    /// or a non-success status.
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, AppError>;
}

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("alpha-feed/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(4)
            .build()?;
        Ok(Self { http })
    }

    fn compact_error_body(body: &str) -> String {
        let normalized = body.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.chars().count() > 180 {
            let head: String = normalized.chars().take(180).collect();
            format!("{}...", head)
        } else {
            normalized
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, AppError> {
        let request = async {
            let resp = self.http.get(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                tracing::debug!(
                    status = %status,
                    url,
                    detail = %Self::compact_error_body(&body),
                    "GET returned non-success"
                );
                return Err(AppError::HttpStatus {
                    status: status.as_u16(),
                    url: url.to_string(),
                });
            }
            Ok(resp.text().await?)
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(AppError::Timeout(
                u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        }
    }
}
