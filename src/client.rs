//! 翻译客户端
//!
//! [`TranslationClient`] 把服务商、传输层和设置存储组合在一起，维护界面层观察的状态
//! （忙碌标志、语言选择、原文、译文、检测到的语言、词典、错误），并通过
//! [`ClientEvent`] 通道发送变更通知。
//!
//! 同一时间最多只有一个请求在进行。新请求会取消旧请求；旧请求的结果即使已经
//! 到达也会被丢弃，不会覆盖新结果。网络任务在 Tokio 运行时上执行，结果由持有
//! 客户端的任务通过 [`TranslationClient::next_completion`] 接收，因此不需要锁。
//!
//! # 示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taot_translator::{ClientConfig, HttpTransport, MemorySettings, ServiceFactory, TranslationClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::load_from_default_locations();
//!     let service = ServiceFactory::create(&config.service)?;
//!     let transport = Arc::new(HttpTransport::new(&config.http));
//!     let (mut client, _events) = TranslationClient::new(service, transport, Box::new(MemorySettings::new()));
//!
//!     client.set_source_text("Hello, world!");
//!     if client.translate_source_text() {
//!         if let Some(Ok(result)) = client.next_completion().await {
//!             println!("{}", result.translated_text());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use crate::error::{Result, TranslationError};
use crate::request::{Completion, TranslationRequest};
use crate::settings::{settings_key, SettingsStore, SOURCE_LANGUAGE_KEY, TARGET_LANGUAGE_KEY};
use crate::translator::TranslationService;
use crate::transport::Transport;
use crate::types::{ClientEvent, ClientState, DictionaryEntry, Language, TranslationResult};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct TranslationClient {
    service: Box<dyn TranslationService>,
    transport: Arc<dyn Transport>,
    settings: Box<dyn SettingsStore>,
    events: UnboundedSender<ClientEvent>,
    completions_tx: UnboundedSender<Completion>,
    completions_rx: UnboundedReceiver<Completion>,
    in_flight: Option<TranslationRequest>,
    next_request_id: u64,
    state: ClientState,
    source_language: Language,
    target_language: Language,
    source_text: String,
    detected_language: Option<Language>,
    translated_text: String,
    dictionary: Vec<DictionaryEntry>,
    last_error: Option<String>,
}

impl TranslationClient {
    /// 创建客户端，返回客户端和界面层使用的事件接收端
    ///
    /// 语言选择从 `settings` 中恢复；保存的代码无效时使用服务商的默认方向。
    pub fn new(
        service: Box<dyn TranslationService>,
        transport: Arc<dyn Transport>,
        settings: Box<dyn SettingsStore>,
    ) -> (Self, UnboundedReceiver<ClientEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let uid = service.uid();
        let default_pair = service.default_language_pair();
        let default_source = default_pair
            .as_ref()
            .map(|pair| pair.source.clone())
            .unwrap_or_else(Language::autodetect);

        let sources = service.source_languages();
        let source_language = settings
            .get(&settings_key(uid, SOURCE_LANGUAGE_KEY))
            .map(|code| service.language(&code))
            .filter(|lang| sources.contains(lang))
            .unwrap_or(default_source);

        let targets = service.target_languages(&source_language);
        let target_language = settings
            .get(&settings_key(uid, TARGET_LANGUAGE_KEY))
            .map(|code| service.language(&code))
            .filter(|lang| targets.contains(lang))
            .or_else(|| fallback_target(&targets))
            .or_else(|| default_pair.map(|pair| pair.target))
            .unwrap_or_else(|| service.language("en"));

        debug!(
            "{} client ready: {:?} -> {:?}",
            service.display_name(),
            source_language.code,
            target_language.code
        );

        let client = Self {
            service,
            transport,
            settings,
            events,
            completions_tx,
            completions_rx,
            in_flight: None,
            next_request_id: 0,
            state: ClientState::Idle,
            source_language,
            target_language,
            source_text: String::new(),
            detected_language: None,
            translated_text: String::new(),
            dictionary: Vec::new(),
            last_error: None,
        };
        (client, events_rx)
    }

    pub fn service(&self) -> &dyn TranslationService {
        self.service.as_ref()
    }

    pub fn settings(&self) -> &dyn SettingsStore {
        self.settings.as_ref()
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn busy(&self) -> bool {
        self.state == ClientState::Requesting
    }

    pub fn source_language(&self) -> &Language {
        &self.source_language
    }

    pub fn target_language(&self) -> &Language {
        &self.target_language
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn detected_language(&self) -> Option<&Language> {
        self.detected_language.as_ref()
    }

    pub fn translated_text(&self) -> &str {
        &self.translated_text
    }

    pub fn dictionary(&self) -> &[DictionaryEntry] {
        &self.dictionary
    }

    /// 最近一次失败的消息，新的翻译开始后清空
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn source_languages(&self) -> Vec<Language> {
        self.service.source_languages()
    }

    /// 当前源语言的合法目标语言
    pub fn target_languages(&self) -> Vec<Language> {
        self.service.target_languages(&self.source_language)
    }

    pub fn set_source_language(&mut self, language: Language) {
        if self.source_language == language {
            return;
        }
        self.reset_translation();
        self.source_language = self.service.language(&language.code);
        self.settings.set(
            &settings_key(self.service.uid(), SOURCE_LANGUAGE_KEY),
            &self.source_language.code,
        );
        self.emit(ClientEvent::SourceLanguageChanged(self.source_language.clone()));

        if self.service.target_languages_depend_on_source_language() {
            let targets = self.target_languages();
            if !targets.contains(&self.target_language) {
                if let Some(target) = fallback_target(&targets) {
                    debug!("Target {:?} unavailable, switching to {:?}", self.target_language.code, target.code);
                    self.set_target_language(target);
                }
            }
        }
    }

    pub fn set_target_language(&mut self, language: Language) {
        if self.target_language == language {
            return;
        }
        self.reset_translation();
        self.target_language = self.service.language(&language.code);
        self.settings.set(
            &settings_key(self.service.uid(), TARGET_LANGUAGE_KEY),
            &self.target_language.code,
        );
        self.emit(ClientEvent::TargetLanguageChanged(self.target_language.clone()));
    }

    pub fn set_source_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.source_text == text {
            return;
        }
        self.reset_translation();
        self.source_text = text;
        self.emit(ClientEvent::SourceTextChanged(self.source_text.clone()));
    }

    /// 用当前的语言选择翻译当前原文
    pub fn translate_source_text(&mut self) -> bool {
        let from = self.source_language.clone();
        let to = self.target_language.clone();
        let text = self.source_text.clone();
        self.translate(&from, &to, &text)
    }

    /// 发起翻译请求
    ///
    /// 空文本不会发起请求并返回 `false`。请求发出后立即返回 `true`，结果通过
    /// [`next_completion`](Self::next_completion) 和事件通道送达。进行中的旧请求会被取消。
    pub fn translate(&mut self, from: &Language, to: &Language, text: &str) -> bool {
        if text.is_empty() {
            debug!("Nothing to translate");
            return false;
        }

        self.reset_translation();
        if self.state == ClientState::Error {
            self.state = ClientState::Idle;
        }
        self.last_error = None;

        let request = match self.service.build_request(from, to, text) {
            Ok(request) => request,
            Err(e) => {
                self.fail(e);
                return false;
            }
        };

        let Ok(runtime) = Handle::try_current() else {
            self.fail(TranslationError::Transport(
                "no async runtime available to send the request".to_string(),
            ));
            return false;
        };

        self.next_request_id += 1;
        let id = self.next_request_id;
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let transport = Arc::clone(&self.transport);
        let completions = self.completions_tx.clone();

        debug!(
            "Request #{}: {} {:?} -> {:?}, {} chars",
            id,
            self.service.display_name(),
            from.code,
            to.code,
            text.chars().count()
        );

        let handle = runtime.spawn(async move {
            let outcome = tokio::select! {
                _ = task_cancel.cancelled() => Err(TranslationError::Cancelled),
                result = transport.execute(request) => result,
            };
            // 客户端已被丢弃时没有人接收结果
            let _ = completions.send(Completion { id, outcome });
        });

        self.in_flight = Some(TranslationRequest::new(
            id,
            from.clone(),
            to.clone(),
            text.to_string(),
            cancel,
            handle,
        ));
        self.state = ClientState::Requesting;
        self.emit(ClientEvent::BusyChanged(true));
        true
    }

    /// 等待当前请求完成并应用结果
    ///
    /// 被取代或被取消的请求不会产生结果。没有进行中的请求时返回 `None`。
    pub async fn next_completion(&mut self) -> Option<Result<TranslationResult>> {
        loop {
            let current = match &self.in_flight {
                Some(request) => request.id(),
                None => {
                    while self.completions_rx.try_recv().is_ok() {}
                    return None;
                }
            };

            let completion = self.completions_rx.recv().await?;
            if completion.id != current {
                debug!("Dropping stale completion of request #{}", completion.id);
                continue;
            }

            self.in_flight = None;
            match completion.outcome {
                Err(TranslationError::Cancelled) => {
                    debug!("Request #{} cancelled", completion.id);
                    self.set_idle();
                }
                outcome => return Some(self.finish(outcome)),
            }
        }
    }

    /// 取消进行中的请求，不产生错误通知
    pub fn cancel(&mut self) -> bool {
        match self.in_flight.take() {
            Some(request) => {
                debug!("Cancelling request #{}", request.id());
                request.abort();
                self.set_idle();
                true
            }
            None => false,
        }
    }

    fn finish(&mut self, outcome: Result<String>) -> Result<TranslationResult> {
        let parsed = match outcome {
            Ok(body) => self.service.parse_reply(&body),
            Err(TranslationError::HttpStatus { status, body }) => {
                // 服务商常在错误状态码里附带自己的错误信息
                match self.service.parse_reply(&body) {
                    Err(e @ TranslationError::ProviderStatus { .. }) => Err(e),
                    _ => Err(TranslationError::HttpStatus { status, body }),
                }
            }
            Err(e) => Err(e),
        };

        match parsed {
            Ok(result) => {
                self.set_idle();
                self.set_detected_language(result.detected_language.clone());
                self.set_translated_text(result.translated_text());
                self.set_dictionary(result.dictionary.clone());
                Ok(result)
            }
            Err(e) => {
                self.fail_with_message(e.to_string());
                Err(e)
            }
        }
    }

    fn fail(&mut self, error: TranslationError) {
        if error.is_surfaced() {
            self.fail_with_message(error.to_string());
        }
    }

    fn fail_with_message(&mut self, message: String) {
        warn!("{} request failed: {}", self.service.display_name(), message);
        let was_busy = self.busy();
        self.state = ClientState::Error;
        if was_busy {
            self.emit(ClientEvent::BusyChanged(false));
        }
        self.last_error = Some(message.clone());
        self.emit(ClientEvent::Error(message));
    }

    fn set_idle(&mut self) {
        if self.state == ClientState::Requesting {
            self.state = ClientState::Idle;
            self.emit(ClientEvent::BusyChanged(false));
        }
    }

    /// 清空上一次的翻译结果并取消进行中的请求
    fn reset_translation(&mut self) {
        self.set_translated_text(String::new());
        self.set_detected_language(None);
        self.set_dictionary(Vec::new());
        self.cancel();
    }

    fn set_detected_language(&mut self, language: Option<Language>) {
        if self.detected_language == language {
            return;
        }
        self.detected_language = language;
        self.emit(ClientEvent::DetectedLanguageChanged(self.detected_language.clone()));
    }

    fn set_translated_text(&mut self, text: String) {
        if self.translated_text == text {
            return;
        }
        self.translated_text = text;
        self.emit(ClientEvent::TranslatedTextChanged(self.translated_text.clone()));
    }

    fn set_dictionary(&mut self, dictionary: Vec<DictionaryEntry>) {
        if self.dictionary == dictionary {
            return;
        }
        self.dictionary = dictionary;
        self.emit(ClientEvent::DictionaryChanged(self.dictionary.clone()));
    }

    fn emit(&self, event: ClientEvent) {
        // 界面层不再监听时丢弃事件
        let _ = self.events.send(event);
    }
}

/// 首选英语，否则取第一个
fn fallback_target(targets: &[Language]) -> Option<Language> {
    targets
        .iter()
        .find(|lang| lang.code == "en")
        .or_else(|| targets.first())
        .cloned()
}
