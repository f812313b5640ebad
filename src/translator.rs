//! 翻译服务抽象
//!
//! 每个服务商实现同一个 [`TranslationService`] trait：标识、语言列表、构造请求和解析响应。
//! 网络请求和状态管理由 [`crate::client::TranslationClient`] 统一处理。

use crate::catalog::LanguageCatalog;
use crate::config::ServiceConfig;
use crate::error::{Result, TranslationError};
use crate::services::{DeepLx, YandexTranslate};
use crate::transport::HttpRequest;
use crate::types::{Language, LanguagePair, TranslationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// 翻译服务商的能力集合
pub trait TranslationService: Send + Sync {
    /// 面向用户的服务名称
    fn display_name(&self) -> &'static str;

    /// 稳定的机器标识，用作设置的键
    fn uid(&self) -> &'static str;

    /// 合法目标语言是否随源语言变化
    fn target_languages_depend_on_source_language(&self) -> bool;

    fn supports_dictionary(&self) -> bool;

    fn catalog(&self) -> &LanguageCatalog;

    fn source_languages(&self) -> Vec<Language> {
        self.catalog().source_languages().to_vec()
    }

    fn target_languages(&self, source: &Language) -> Vec<Language>;

    fn default_language_pair(&self) -> Option<LanguagePair> {
        self.catalog().default_pair()
    }

    /// 根据语言代码构造带显示名称的语言
    fn language(&self, code: &str) -> Language {
        self.catalog().language(code)
    }

    /// 构造一次翻译请求，调用方保证 `text` 非空
    fn build_request(&self, from: &Language, to: &Language, text: &str) -> Result<HttpRequest>;

    /// 解析服务商的响应体
    fn parse_reply(&self, body: &str) -> Result<TranslationResult>;
}

/// 支持的服务商
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceKind {
    Yandex,
    DeepLx,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 2] = [ServiceKind::Yandex, ServiceKind::DeepLx];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Yandex => "yandex",
            ServiceKind::DeepLx => "deeplx",
        }
    }

    /// 语言定义文件名
    pub fn resource_file(&self) -> String {
        format!("langs.{}.json", self.as_str())
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self> {
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TranslationError::Config(format!("unknown provider {:?}", s)))
    }
}

/// Factory for creating translation services
pub struct ServiceFactory;

impl ServiceFactory {
    /// 按配置创建服务商，语言目录从 `resource_dir` 加载
    pub fn create(config: &ServiceConfig) -> Result<Box<dyn TranslationService>> {
        let resource = config.resource_dir.join(config.provider.resource_file());
        let catalog = LanguageCatalog::load(&resource);

        let service: Box<dyn TranslationService> = match config.provider {
            ServiceKind::Yandex => {
                let mut service = YandexTranslate::new(catalog, config.resolved_api_key());
                if let Some(endpoint) = &config.endpoint {
                    service = service.with_endpoint(endpoint)?;
                }
                Box::new(service)
            }
            ServiceKind::DeepLx => {
                let mut service = DeepLx::new(catalog);
                if let Some(endpoint) = &config.endpoint {
                    service = service.with_endpoint(endpoint)?;
                }
                Box::new(service)
            }
        };

        info!(
            "Using {} with {} source languages",
            service.display_name(),
            service.source_languages().len()
        );
        Ok(service)
    }
}

/// 校验方向是否在目标语言列表中
pub(crate) fn ensure_supported(
    service: &dyn TranslationService,
    from: &Language,
    to: &Language,
) -> Result<()> {
    let valid_source = service.source_languages().contains(from);
    let valid_target = service.target_languages(from).contains(to);
    if valid_source && valid_target {
        Ok(())
    } else {
        Err(TranslationError::UnsupportedLanguagePair {
            from: from.code.clone(),
            to: to.code.clone(),
        })
    }
}
