//! DeepLX 服务
//!
//! `POST {endpoint}`，请求体 `{"text": "...", "source_lang": "auto", "target_lang": "zh"}`，
//! 响应体 `{"code": 200, "data": "..."}`。目标语言列表与源语言无关。

use crate::catalog::LanguageCatalog;
use crate::error::{Result, TranslationError};
use crate::parser;
use crate::services::parse_endpoint;
use crate::transport::HttpRequest;
use crate::translator::{ensure_supported, TranslationService};
use crate::types::{DeepLXRequest, Language, TranslationResult};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:1188/translate";

const AUTO: &str = "auto";

pub struct DeepLx {
    catalog: LanguageCatalog,
    endpoint: String,
}

impl DeepLx {
    pub fn new(catalog: LanguageCatalog) -> Self {
        Self {
            catalog,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        parse_endpoint(endpoint)?;
        self.endpoint = endpoint.to_string();
        Ok(self)
    }
}

impl TranslationService for DeepLx {
    fn display_name(&self) -> &'static str {
        "DeepLX"
    }

    fn uid(&self) -> &'static str {
        "DeepLX"
    }

    fn target_languages_depend_on_source_language(&self) -> bool {
        false
    }

    fn supports_dictionary(&self) -> bool {
        false
    }

    fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    fn target_languages(&self, _source: &Language) -> Vec<Language> {
        self.catalog.all_target_languages()
    }

    fn build_request(&self, from: &Language, to: &Language, text: &str) -> Result<HttpRequest> {
        ensure_supported(self, from, to)?;

        let request = DeepLXRequest {
            text: text.to_string(),
            source_lang: if from.is_autodetect() {
                AUTO.to_string()
            } else {
                from.code.clone()
            },
            target_lang: to.code.clone(),
        };
        let body = serde_json::to_value(&request)
            .map_err(|e| TranslationError::Transport(format!("failed to encode request: {}", e)))?;

        Ok(HttpRequest::PostJson {
            url: parse_endpoint(&self.endpoint)?,
            body,
        })
    }

    fn parse_reply(&self, body: &str) -> Result<TranslationResult> {
        parser::parse_deeplx(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> DeepLx {
        DeepLx::new(LanguageCatalog::from_json(
            r#"{"langs": {"en": "English", "zh": "Chinese", "ja": "Japanese"}, "dirs": ["en-zh", "zh-en", "ja-en"]}"#,
        ))
    }

    #[test]
    fn targets_are_global() {
        let service = service();
        assert!(!service.target_languages_depend_on_source_language());
        let from_ja = service.target_languages(&service.language("ja"));
        let from_en = service.target_languages(&service.language("en"));
        assert_eq!(from_ja, from_en);
        assert_eq!(from_ja.len(), 2);
    }

    #[test]
    fn request_body_uses_auto_for_autodetect() {
        let service = service();
        let request = service
            .build_request(&Language::autodetect(), &service.language("zh"), "Hello, world!")
            .unwrap();
        match request {
            HttpRequest::PostJson { url, body } => {
                assert_eq!(url.as_str(), DEFAULT_ENDPOINT);
                assert_eq!(
                    body,
                    json!({"text": "Hello, world!", "source_lang": "auto", "target_lang": "zh"})
                );
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn any_known_source_may_target_any_language() {
        let service = service();
        assert!(service
            .build_request(&service.language("ja"), &service.language("zh"), "こんにちは")
            .is_ok());
        assert!(service
            .build_request(&service.language("ko"), &service.language("en"), "안녕")
            .is_err());
    }
}
