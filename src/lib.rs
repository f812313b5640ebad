//! # TAOT Translator
//!
//! 在线翻译服务的客户端库：加载服务商的语言目录，构造并发送翻译请求，解析服务商的响应，
//! 并把忙碌状态、译文、检测到的语言和错误以事件的形式交给界面层。
//!
//! ## 主要特性
//!
//! - **统一的服务商接口**: Yandex.Translate 与 DeepLX 实现同一个 [`TranslationService`]
//! - **语言目录**: 从 JSON 定义文件加载语言名称和合法的翻译方向，文件缺失时平稳降级
//! - **最后请求优先**: 新请求会取消旧请求，过期结果永远不会覆盖新结果
//! - **可注入的设置存储**: 语言选择按服务商分别保存
//! - **配置灵活**: 支持TOML配置文件和程序化配置
//!
//! ## 配置文件支持
//!
//! ```toml
//! [service]
//! provider = "yandex"
//! api_key = "trnsl.1.1..."
//! resource_dir = "resources"
//!
//! [http]
//! timeout_secs = 30
//! pool_idle_timeout_secs = 30
//! user_agent = "taot-translator/0.1.0"
//!
//! [settings]
//! path = "taot-settings.toml"
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod parser;
pub mod request;
pub mod services;
pub mod settings;
pub mod translator;
pub mod transport;
pub mod types;

pub use catalog::LanguageCatalog;
pub use client::TranslationClient;
pub use config::{ClientConfig, HttpConfig, ServiceConfig, SettingsConfig};
pub use error::{Result, TranslationError};
pub use request::TranslationRequest;
pub use services::{DeepLx, YandexTranslate};
pub use settings::{MemorySettings, SettingsStore, TomlSettings};
pub use translator::{ServiceFactory, ServiceKind, TranslationService};
pub use transport::{HttpRequest, HttpTransport, Transport};
pub use types::{
    ClientEvent, ClientState, DictionaryEntry, Language, LanguagePair, TranslationResult,
};
