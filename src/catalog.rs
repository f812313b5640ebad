//! 语言目录模块
//!
//! 从语言定义文件加载某个服务商支持的语言代码、显示名称以及合法的翻译方向。
//! 定义文件格式：
//!
//! ```json
//! { "langs": { "en": "English", "ru": "Russian" }, "dirs": ["en-ru", "ru-en"] }
//! ```
//!
//! 文件缺失或损坏时目录降级为空，调用方应当把空的源语言列表视为"服务不可用"。

use crate::error::{Result, TranslationError};
use crate::types::{sort_by_display_name, Language, LanguagePair, AUTODETECT_CODE, AUTODETECT_NAME};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// 语言定义文件的原始结构
#[derive(Debug, Default, Deserialize)]
pub struct LanguageDefinition {
    #[serde(default)]
    pub langs: HashMap<String, String>,
    /// 方向列表，非字符串条目会被跳过
    #[serde(default)]
    pub dirs: Vec<serde_json::Value>,
}

/// 语言目录
///
/// 构建后不可变。源语言列表按显示名称排序，自动检测始终排在第一位；
/// 每个源语言对应的目标语言列表同样按显示名称排序。
#[derive(Debug, Clone)]
pub struct LanguageCatalog {
    names: HashMap<String, String>,
    sources: Vec<Language>,
    targets: HashMap<String, Vec<Language>>,
}

impl LanguageCatalog {
    /// 加载语言定义文件，失败时记录警告并返回空目录
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(catalog) => {
                debug!(
                    "Loaded {} source languages from {}",
                    catalog.sources.len().saturating_sub(1),
                    path.display()
                );
                catalog
            }
            Err(e) => {
                warn!("Language catalog unavailable ({}): {}", path.display(), e);
                Self::empty()
            }
        }
    }

    /// 加载语言定义文件，返回具体错误
    pub fn try_load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| TranslationError::ResourceLoad(e.to_string()))?;
        Self::try_from_json(&content)
    }

    /// 从 JSON 文本构建目录，失败时返回空目录
    pub fn from_json(json: &str) -> Self {
        Self::try_from_json(json).unwrap_or_else(|e| {
            warn!("Language catalog unavailable: {}", e);
            Self::empty()
        })
    }

    pub fn try_from_json(json: &str) -> Result<Self> {
        let definition: LanguageDefinition = serde_json::from_str(json)
            .map_err(|e| TranslationError::ResourceLoad(e.to_string()))?;
        Ok(Self::from_definition(definition))
    }

    /// 空目录：没有任何源语言和方向
    pub fn empty() -> Self {
        Self::from_definition(LanguageDefinition::default())
    }

    pub fn from_definition(definition: LanguageDefinition) -> Self {
        let mut catalog = Self {
            names: definition.langs,
            sources: Vec::new(),
            targets: HashMap::new(),
        };
        catalog
            .names
            .insert(AUTODETECT_CODE.to_string(), AUTODETECT_NAME.to_string());

        let mut seen_sources = HashSet::new();
        for dir in definition.dirs.iter().filter_map(|d| d.as_str()) {
            let Some((source, target)) = dir.split_once('-') else {
                debug!("Skipping malformed direction {:?}", dir);
                continue;
            };
            if source.is_empty() || target.is_empty() {
                debug!("Skipping malformed direction {:?}", dir);
                continue;
            }

            // 重复的源语言只保留第一次出现，但每个方向都会追加目标语言
            if seen_sources.insert(source.to_string()) {
                let language = catalog.language(source);
                catalog.sources.push(language.clone());
                catalog
                    .targets
                    .entry(AUTODETECT_CODE.to_string())
                    .or_default()
                    .push(language);
            }

            let target = catalog.language(target);
            let list = catalog.targets.entry(source.to_string()).or_default();
            if !list.contains(&target) {
                list.push(target);
            }
        }

        sort_by_display_name(&mut catalog.sources);
        if !catalog.sources.is_empty() {
            catalog.sources.insert(0, Language::autodetect());
        }
        for list in catalog.targets.values_mut() {
            sort_by_display_name(list);
        }

        catalog
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// 源语言列表（自动检测在首位）
    pub fn source_languages(&self) -> &[Language] {
        &self.sources
    }

    /// 指定源语言的合法目标语言，未知源语言返回空列表
    pub fn target_languages(&self, source: &str) -> &[Language] {
        self.targets.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 所有方向中出现过的目标语言（去重并排序）
    ///
    /// 按已排序的源语言顺序收集，显示名称相同的语言顺序稳定。
    pub fn all_target_languages(&self) -> Vec<Language> {
        let mut seen = HashSet::new();
        let mut all: Vec<Language> = self
            .sources
            .iter()
            .filter(|source| !source.is_autodetect())
            .flat_map(|source| self.target_languages(&source.code))
            .filter(|lang| seen.insert(lang.code.clone()))
            .cloned()
            .collect();
        sort_by_display_name(&mut all);
        all
    }

    /// 语言代码对应的显示名称
    pub fn name_for(&self, code: &str) -> String {
        self.names
            .get(code)
            .cloned()
            .unwrap_or_else(|| format!("Unknown ({})", code))
    }

    /// 根据代码构造带显示名称的语言
    pub fn language(&self, code: &str) -> Language {
        Language::new(code, self.name_for(code))
    }

    pub fn is_valid_direction(&self, source: &str, target: &str) -> bool {
        self.target_languages(source).iter().any(|lang| lang.code == target)
    }

    /// 默认翻译方向：自动检测 → 英语；英语不可用时取第一个目标语言
    pub fn default_pair(&self) -> Option<LanguagePair> {
        let source = self.sources.first()?.clone();
        let targets = self.target_languages(&source.code);
        let target = targets
            .iter()
            .find(|lang| lang.code == "en")
            .or_else(|| targets.first())?
            .clone();
        Some(LanguagePair::new(source, target))
    }
}
