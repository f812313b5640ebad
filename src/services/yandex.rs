//! Yandex.Translate 服务
//!
//! `GET https://translate.yandex.net/api/v1.5/tr.json/translate?key=..&lang=en-ru&options=1&text=..`
//! 源语言为自动检测时 `lang` 只包含目标语言；`options=1` 让服务端返回检测到的语言。

use crate::catalog::LanguageCatalog;
use crate::error::Result;
use crate::parser;
use crate::services::parse_endpoint;
use crate::transport::HttpRequest;
use crate::translator::{ensure_supported, TranslationService};
use crate::types::{Language, TranslationResult};

pub const DEFAULT_ENDPOINT: &str = "https://translate.yandex.net/api/v1.5/tr.json/translate";

pub struct YandexTranslate {
    catalog: LanguageCatalog,
    api_key: String,
    endpoint: String,
}

impl YandexTranslate {
    pub fn new(catalog: LanguageCatalog, api_key: impl Into<String>) -> Self {
        Self {
            catalog,
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Result<Self> {
        parse_endpoint(endpoint)?;
        self.endpoint = endpoint.to_string();
        Ok(self)
    }
}

/// 方向参数：`from-to`，自动检测时省略 `from`
fn direction(from: &Language, to: &Language) -> String {
    if from.is_autodetect() {
        to.code.clone()
    } else {
        format!("{}-{}", from.code, to.code)
    }
}

impl TranslationService for YandexTranslate {
    fn display_name(&self) -> &'static str {
        "Yandex.Translate"
    }

    fn uid(&self) -> &'static str {
        "YandexTranslate"
    }

    fn target_languages_depend_on_source_language(&self) -> bool {
        true
    }

    fn supports_dictionary(&self) -> bool {
        false
    }

    fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    fn target_languages(&self, source: &Language) -> Vec<Language> {
        self.catalog.target_languages(&source.code).to_vec()
    }

    fn build_request(&self, from: &Language, to: &Language, text: &str) -> Result<HttpRequest> {
        ensure_supported(self, from, to)?;

        let mut url = parse_endpoint(&self.endpoint)?;
        url.query_pairs_mut()
            .append_pair("key", &self.api_key)
            .append_pair("lang", &direction(from, to))
            .append_pair("options", "1")
            .append_pair("text", text);
        Ok(HttpRequest::Get(url))
    }

    fn parse_reply(&self, body: &str) -> Result<TranslationResult> {
        parser::parse_yandex(body, &self.catalog)
    }
}
