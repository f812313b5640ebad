//! 类型定义模块
//!
//! 定义语言、语言对、翻译结果以及客户端向界面层发送的状态事件。

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// 自动检测语言的代码（空字符串）
pub const AUTODETECT_CODE: &str = "";

/// 自动检测语言的显示名称
pub const AUTODETECT_NAME: &str = "Autodetect";

/// 语言
///
/// 以 `code` 作为身份标识，空代码表示"自动检测"。排序列表时按显示名称排序，
/// 见 [`sort_by_display_name`]。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    /// 语言代码，例如 `en`、`ru`
    pub code: String,
    /// 显示名称
    pub display_name: String,
}

impl Language {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
        }
    }

    /// 自动检测伪语言
    pub fn autodetect() -> Self {
        Self::new(AUTODETECT_CODE, AUTODETECT_NAME)
    }

    pub fn is_autodetect(&self) -> bool {
        self.code.is_empty()
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Language {}

impl Hash for Language {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

/// 按显示名称进行稳定排序（忽略大小写）
pub fn sort_by_display_name(languages: &mut [Language]) {
    languages.sort_by_cached_key(|lang| lang.display_name.to_lowercase());
}

/// 当前的翻译方向
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: Language,
    pub target: Language,
}

impl LanguagePair {
    pub fn new(source: Language, target: Language) -> Self {
        Self { source, target }
    }
}

/// 反向词典条目
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// 词性
    pub part_of_speech: String,
    /// 该词性下的译文
    pub translations: Vec<String>,
    /// 译文反查回源语言的结果
    pub reverse: Vec<String>,
}

/// 一次成功解析的翻译结果
///
/// 解析成功时 `translations` 一定非空；否则解析器返回错误。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationResult {
    /// 服务商检测到的源语言
    pub detected_language: Option<Language>,
    /// 译文片段，保持服务商返回的顺序
    pub translations: Vec<String>,
    /// 词典条目，不支持词典的服务商为空
    pub dictionary: Vec<DictionaryEntry>,
}

impl TranslationResult {
    /// 合并后的译文
    pub fn translated_text(&self) -> String {
        self.translations.join("\n")
    }
}

/// 客户端状态机：`Idle → Requesting → (Idle | Error)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClientState {
    #[default]
    Idle,
    Requesting,
    Error,
}

/// 客户端发送给界面层的变更通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    BusyChanged(bool),
    SourceLanguageChanged(Language),
    TargetLanguageChanged(Language),
    SourceTextChanged(String),
    DetectedLanguageChanged(Option<Language>),
    TranslatedTextChanged(String),
    DictionaryChanged(Vec<DictionaryEntry>),
    /// 人类可读的错误消息
    Error(String),
}

/// DeepLX 请求体
#[derive(Debug, Serialize, Deserialize)]
pub struct DeepLXRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
}

/// DeepLX 响应体
#[derive(Debug, Deserialize)]
pub struct DeepLXResponse {
    pub code: i64,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
