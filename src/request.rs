//! 正在进行中的翻译请求

use crate::error::Result;
use crate::types::Language;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// 网络任务完成后发回客户端的消息，用 `id` 识别过期的请求
#[derive(Debug)]
pub(crate) struct Completion {
    pub id: u64,
    pub outcome: Result<String>,
}

/// 一次翻译请求及其网络句柄
///
/// 被丢弃时会取消底层网络任务，因此替换掉旧请求即可中止旧连接。
#[derive(Debug)]
pub struct TranslationRequest {
    id: u64,
    from: Language,
    to: Language,
    text: String,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TranslationRequest {
    pub(crate) fn new(
        id: u64,
        from: Language,
        to: Language,
        text: String,
        cancel: CancellationToken,
        handle: JoinHandle<()>,
    ) -> Self {
        Self {
            id,
            from,
            to,
            text,
            cancel,
            handle,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn from(&self) -> &Language {
        &self.from
    }

    pub fn to(&self) -> &Language {
        &self.to
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub(crate) fn abort(&self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

impl Drop for TranslationRequest {
    fn drop(&mut self) {
        self.abort();
    }
}
