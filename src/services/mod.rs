//! 具体的翻译服务商实现

pub mod deeplx;
pub mod yandex;

pub use deeplx::DeepLx;
pub use yandex::YandexTranslate;

use crate::error::{Result, TranslationError};
use url::Url;

pub(crate) fn parse_endpoint(endpoint: &str) -> Result<Url> {
    Url::parse(endpoint)
        .map_err(|e| TranslationError::Config(format!("invalid endpoint {:?}: {}", endpoint, e)))
}
