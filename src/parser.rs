//! 响应解析模块
//!
//! 部分服务商会把严格的 JSON 包在 JS 回调风格的外壳里（`callback(...)` 或 `(...)`）。
//! 外壳只在 [`unwrap_envelope`] 中处理，各服务商的解析函数只面对干净的 JSON。

use crate::catalog::LanguageCatalog;
use crate::error::{Result, TranslationError};
use crate::types::{DeepLXResponse, TranslationResult};
use serde_json::Value;

const STATUS_OK: i64 = 200;

/// 去掉响应体外层的回调外壳
pub fn unwrap_envelope(body: &str) -> &str {
    let trimmed = body.trim().trim_end_matches(';').trim_end();
    if !trimmed.ends_with(')') {
        return trimmed;
    }
    let Some(open) = trimmed.find('(') else {
        return trimmed;
    };
    let callee = &trimmed[..open];
    let is_callback = callee
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '$' || c == '.');
    if is_callback {
        trimmed[open + 1..trimmed.len() - 1].trim()
    } else {
        trimmed
    }
}

/// 解码响应体，无法解码时返回 `MalformedResponse`
pub fn decode(body: &str) -> Result<Value> {
    serde_json::from_str(unwrap_envelope(body)).map_err(|_| TranslationError::MalformedResponse)
}

/// 解析 Yandex.Translate 的响应
///
/// 响应格式：`{"code": 200, "detected": {"lang": "en"}, "lang": "en-ru", "text": ["..."]}`
pub fn parse_yandex(body: &str, catalog: &LanguageCatalog) -> Result<TranslationResult> {
    let data = decode(body)?;
    let code = data
        .get("code")
        .and_then(Value::as_i64)
        .ok_or(TranslationError::MalformedResponse)?;
    if code != STATUS_OK {
        let message = data
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Yandex.Translate returned code {}", code));
        return Err(TranslationError::ProviderStatus { code, message });
    }

    let detected_language = data
        .get("detected")
        .and_then(|d| d.get("lang"))
        .and_then(Value::as_str)
        .filter(|code| !code.is_empty())
        .map(|code| catalog.language(code));

    let translations: Vec<String> = data
        .get("text")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if translations.is_empty() {
        return Err(TranslationError::EmptyTranslation);
    }

    Ok(TranslationResult {
        detected_language,
        translations,
        dictionary: Vec::new(),
    })
}

/// 解析 DeepLX 的响应：`{"code": 200, "data": "..."}`
pub fn parse_deeplx(body: &str) -> Result<TranslationResult> {
    let data = decode(body)?;
    let response: DeepLXResponse =
        serde_json::from_value(data).map_err(|_| TranslationError::MalformedResponse)?;

    if response.code != STATUS_OK {
        return Err(TranslationError::ProviderStatus {
            code: response.code,
            message: response
                .message
                .unwrap_or_else(|| format!("DeepLX returned code {}", response.code)),
        });
    }

    match response.data {
        Some(text) if !text.is_empty() => Ok(TranslationResult {
            translations: vec![text],
            ..Default::default()
        }),
        _ => Err(TranslationError::EmptyTranslation),
    }
}
