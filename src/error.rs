//! 错误处理模块
//!
//! 定义翻译客户端中使用的错误类型。除 `Cancelled` 以外，所有错误都会通过
//! 客户端唯一的错误事件通道交给界面层；没有任何错误会终止进程。

use thiserror::Error;

/// 翻译错误类型
///
/// # 变体说明
///
/// * `ResourceLoad` - 语言定义文件缺失或损坏（非致命，目录降级为空）
/// * `Transport` / `Http` - 网络层失败，可由调用方重试
/// * `HttpStatus` - 服务端返回非 2xx 状态码
/// * `Cancelled` - 请求被新请求取代或被显式取消，静默丢弃
/// * `ProviderStatus` - 服务商返回的业务状态码不是成功
/// * `MalformedResponse` - 响应体无法解码
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("failed to load language definitions: {0}")]
    ResourceLoad(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Transport(String),

    #[error("HTTP {status}")]
    HttpStatus {
        /// HTTP 状态码
        status: u16,
        /// 原始响应体，交给解析器尝试提取服务商的错误信息
        body: String,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("{message}")]
    ProviderStatus {
        /// 服务商状态码
        code: i64,
        /// 服务商返回的错误消息
        message: String,
    },

    #[error("invalid response")]
    MalformedResponse,

    #[error("the service returned an empty translation")]
    EmptyTranslation,

    #[error("unsupported language pair: {from} -> {to}")]
    UnsupportedLanguagePair { from: String, to: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl TranslationError {
    /// 该错误是否应当通知界面层
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, TranslationError::Cancelled)
    }
}

/// 翻译结果类型别名
///
/// # 示例
///
/// ```rust
/// use taot_translator::{Result, TranslationError};
///
/// fn example_function() -> Result<String> {
///     Err(TranslationError::MalformedResponse)
/// }
///
/// assert!(example_function().is_err());
/// ```
pub type Result<T> = std::result::Result<T, TranslationError>;
