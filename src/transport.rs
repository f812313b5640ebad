//! 网络传输模块
//!
//! [`Transport`] 负责执行一次 HTTP 请求并返回响应体。默认实现 [`HttpTransport`]
//! 基于 reqwest；客户端不自行设置超时，依赖这里配置的 reqwest 客户端限制。

use crate::config::HttpConfig;
use crate::error::{Result, TranslationError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// 由服务商构造的 HTTP 请求
#[derive(Debug, Clone, PartialEq)]
pub enum HttpRequest {
    Get(Url),
    PostJson { url: Url, body: serde_json::Value },
}

impl HttpRequest {
    pub fn url(&self) -> &Url {
        match self {
            HttpRequest::Get(url) => url,
            HttpRequest::PostJson { url, .. } => url,
        }
    }
}

/// 执行 HTTP 请求的传输层
///
/// 返回的 future 被丢弃时必须中止底层连接。
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<String>;
}

/// 基于 reqwest 的传输层实现
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
            .pool_max_idle_per_host(2)
            .tcp_keepalive(Duration::from_secs(60))
            .user_agent(config.user_agent.as_str())
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to create configured HTTP client: {}, using default", e);
                Client::new()
            });

        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(&HttpConfig::default())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: HttpRequest) -> Result<String> {
        let builder = match request {
            HttpRequest::Get(url) => {
                debug!("GET {}", redact(&url));
                self.client.get(url)
            }
            HttpRequest::PostJson { url, body } => {
                debug!("POST {}", redact(&url));
                self.client
                    .post(url)
                    .header("Accept", "application/json")
                    .json(&body)
            }
        };

        // reqwest 的错误信息带有完整 URL，其中包含 API key
        let response = builder.send().await.map_err(|e| e.without_url())?;
        let status = response.status();
        let body = response.text().await.map_err(|e| e.without_url())?;
        debug!("Response status {}, {} bytes", status, body.len());

        if status.is_success() {
            Ok(body)
        } else {
            Err(TranslationError::HttpStatus {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// 日志中隐藏 API key 和原文
fn redact(url: &Url) -> Url {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = match k.as_ref() {
                "key" => "***".to_string(),
                "text" => format!("<{} chars>", v.chars().count()),
                _ => v.into_owned(),
            };
            (k.into_owned(), value)
        })
        .collect();
    if !pairs.is_empty() {
        redacted.query_pairs_mut().clear().extend_pairs(pairs);
    }
    redacted
}
