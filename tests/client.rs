use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use taot_translator::{
    ClientEvent, ClientState, HttpRequest, Language, LanguageCatalog, MemorySettings, Result,
    SettingsStore, TranslationClient, TranslationError, Transport, YandexTranslate,
};
use tokio::sync::mpsc::UnboundedReceiver;

const CATALOG: &str = r#"{
    "langs": { "en": "English", "ru": "Russian", "de": "German" },
    "dirs": ["en-ru", "ru-en", "de-en", "en-de"]
}"#;

#[derive(Clone)]
enum Reply {
    Body(String),
    Pending,
    HttpStatus(u16, String),
    Fail(String),
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct MockTransport {
    replies: Mutex<HashMap<String, Reply>>,
    calls: AtomicUsize,
    completed: AtomicUsize,
    pending_dropped: Arc<AtomicBool>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn reply(&self, text: &str, reply: Reply) {
        self.replies.lock().unwrap().insert(text.to_string(), reply);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn pending_dropped(&self) -> bool {
        self.pending_dropped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = request
            .url()
            .query_pairs()
            .find(|(k, _)| k == "text")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get(&text)
            .cloned()
            .unwrap_or_else(|| Reply::Fail(format!("no reply scripted for {text:?}")));

        let outcome = match reply {
            Reply::Body(body) => Ok(body),
            Reply::HttpStatus(status, body) => Err(TranslationError::HttpStatus { status, body }),
            Reply::Fail(message) => Err(TranslationError::Transport(message)),
            Reply::Pending => {
                let _guard = DropFlag(Arc::clone(&self.pending_dropped));
                return std::future::pending::<Result<String>>().await;
            }
        };
        self.completed.fetch_add(1, Ordering::SeqCst);
        outcome
    }
}

fn service() -> Box<YandexTranslate> {
    Box::new(YandexTranslate::new(LanguageCatalog::from_json(CATALOG), "test-key"))
}

fn client_with(
    transport: &Arc<MockTransport>,
    settings: MemorySettings,
) -> (TranslationClient, UnboundedReceiver<ClientEvent>) {
    TranslationClient::new(service(), transport.clone(), Box::new(settings))
}

fn client(transport: &Arc<MockTransport>) -> (TranslationClient, UnboundedReceiver<ClientEvent>) {
    client_with(transport, MemorySettings::new())
}

fn drain(events: &mut UnboundedReceiver<ClientEvent>) -> Vec<ClientEvent> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

fn lang(code: &str) -> Language {
    LanguageCatalog::from_json(CATALOG).language(code)
}

async fn wait_until(cond: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("condition not reached in time");
}

fn ok_body(text: &str) -> String {
    format!(r#"{{"code":200,"lang":"en-ru","text":["{text}"]}}"#)
}

#[tokio::test]
async fn translation_updates_properties_and_notifies() {
    let transport = MockTransport::new();
    transport.reply(
        "hello",
        Reply::Body(r#"{"code":200,"detected":{"lang":"en"},"lang":"en-ru","text":["привет"]}"#.into()),
    );
    let (mut client, mut events) = client(&transport);

    assert!(client.translate(&Language::autodetect(), &lang("ru"), "hello"));
    assert!(client.busy());
    assert_eq!(client.state(), ClientState::Requesting);

    let result = client.next_completion().await.unwrap().unwrap();
    assert_eq!(result.translations, ["привет"]);
    assert_eq!(client.translated_text(), "привет");
    assert_eq!(client.detected_language().map(|l| l.code.as_str()), Some("en"));
    assert_eq!(client.state(), ClientState::Idle);
    assert!(!client.busy());

    assert_eq!(
        drain(&mut events),
        [
            ClientEvent::BusyChanged(true),
            ClientEvent::BusyChanged(false),
            ClientEvent::DetectedLanguageChanged(Some(lang("en"))),
            ClientEvent::TranslatedTextChanged("привет".into()),
        ]
    );
    assert!(client.next_completion().await.is_none());
}

#[tokio::test]
async fn empty_text_sends_nothing() {
    let transport = MockTransport::new();
    let (mut client, mut events) = client(&transport);

    assert!(!client.translate(&lang("en"), &lang("ru"), ""));
    assert!(!client.translate_source_text());

    assert_eq!(transport.calls(), 0);
    assert_eq!(client.state(), ClientState::Idle);
    assert!(drain(&mut events).is_empty());
}

#[tokio::test]
async fn whitespace_text_is_sent() {
    let transport = MockTransport::new();
    transport.reply("  \n", Reply::Body(ok_body(" ")));
    let (mut client, _events) = client(&transport);

    assert!(client.translate(&lang("en"), &lang("ru"), "  \n"));
    assert_eq!(client.state(), ClientState::Requesting);

    let result = client.next_completion().await.unwrap().unwrap();
    assert_eq!(result.translations, [" "]);
    assert_eq!(transport.calls(), 1);
    assert_eq!(client.state(), ClientState::Idle);
}

#[tokio::test]
async fn second_request_supersedes_pending_first() {
    let transport = MockTransport::new();
    transport.reply("first", Reply::Pending);
    transport.reply("second", Reply::Body(ok_body("второй")));
    let (mut client, mut events) = client(&transport);

    assert!(client.translate(&lang("en"), &lang("ru"), "first"));
    wait_until(|| transport.calls() == 1).await;
    assert!(client.translate(&lang("en"), &lang("ru"), "second"));

    let result = client.next_completion().await.unwrap().unwrap();
    assert_eq!(result.translations, ["второй"]);
    assert!(client.next_completion().await.is_none());

    wait_until(|| transport.pending_dropped()).await;

    let events = drain(&mut events);
    assert!(!events.iter().any(|e| matches!(e, ClientEvent::Error(_))));
    let texts: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            ClientEvent::TranslatedTextChanged(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(texts, ["второй"]);
}

#[tokio::test]
async fn stale_completion_never_overwrites_newer_result() {
    let transport = MockTransport::new();
    transport.reply("old", Reply::Body(ok_body("старый")));
    transport.reply("new", Reply::Body(ok_body("новый")));
    let (mut client, mut events) = client(&transport);

    assert!(client.translate(&lang("en"), &lang("ru"), "old"));
    // the first reply is already queued when the second request starts
    wait_until(|| transport.completed() == 1).await;
    assert!(client.translate(&lang("en"), &lang("ru"), "new"));

    let result = client.next_completion().await.unwrap().unwrap();
    assert_eq!(result.translations, ["новый"]);
    assert_eq!(client.translated_text(), "новый");
    assert!(client.next_completion().await.is_none());

    assert!(!drain(&mut events)
        .iter()
        .any(|e| *e == ClientEvent::TranslatedTextChanged("старый".into())));
}

#[tokio::test]
async fn cancelled_request_is_silent() {
    let transport = MockTransport::new();
    transport.reply("slow", Reply::Pending);
    let (mut client, mut events) = client(&transport);

    assert!(client.translate(&lang("en"), &lang("ru"), "slow"));
    wait_until(|| transport.calls() == 1).await;
    assert!(client.cancel());
    assert!(!client.cancel());

    assert!(client.next_completion().await.is_none());
    wait_until(|| transport.pending_dropped()).await;

    assert_eq!(client.state(), ClientState::Idle);
    assert_eq!(
        drain(&mut events),
        [ClientEvent::BusyChanged(true), ClientEvent::BusyChanged(false)]
    );
}

#[tokio::test]
async fn provider_error_is_surfaced_and_cleared_by_retry() {
    let transport = MockTransport::new();
    transport.reply("text", Reply::Body(r#"{"code":402,"message":"quota exceeded"}"#.into()));
    let (mut client, mut events) = client(&transport);

    assert!(client.translate(&lang("en"), &lang("ru"), "text"));
    let err = client.next_completion().await.unwrap().unwrap_err();
    assert!(matches!(err, TranslationError::ProviderStatus { code: 402, .. }));
    assert_eq!(client.state(), ClientState::Error);
    assert_eq!(client.last_error(), Some("quota exceeded"));
    assert!(drain(&mut events).contains(&ClientEvent::Error("quota exceeded".into())));

    transport.reply("text", Reply::Body(ok_body("текст")));
    assert!(client.translate(&lang("en"), &lang("ru"), "text"));
    assert_eq!(client.state(), ClientState::Requesting);
    assert_eq!(client.last_error(), None);

    assert!(client.next_completion().await.unwrap().is_ok());
    assert_eq!(client.state(), ClientState::Idle);
}

#[tokio::test]
async fn http_error_prefers_provider_message() {
    let transport = MockTransport::new();
    transport.reply(
        "forbidden",
        Reply::HttpStatus(403, r#"{"code":401,"message":"API key is invalid"}"#.into()),
    );
    transport.reply("gateway", Reply::HttpStatus(502, "<html>Bad Gateway</html>".into()));
    let (mut client, mut events) = client(&transport);

    assert!(client.translate(&lang("en"), &lang("ru"), "forbidden"));
    let err = client.next_completion().await.unwrap().unwrap_err();
    assert_eq!(err.to_string(), "API key is invalid");

    assert!(client.translate(&lang("en"), &lang("ru"), "gateway"));
    let err = client.next_completion().await.unwrap().unwrap_err();
    assert!(matches!(err, TranslationError::HttpStatus { status: 502, .. }));

    let errors: Vec<_> = drain(&mut events)
        .into_iter()
        .filter(|e| matches!(e, ClientEvent::Error(_)))
        .collect();
    assert_eq!(
        errors,
        [
            ClientEvent::Error("API key is invalid".into()),
            ClientEvent::Error("HTTP 502".into()),
        ]
    );
}

#[tokio::test]
async fn transport_failure_reports_its_message() {
    let transport = MockTransport::new();
    transport.reply("offline", Reply::Fail("connection refused".into()));
    let (mut client, mut events) = client(&transport);

    assert!(client.translate(&lang("en"), &lang("ru"), "offline"));
    assert!(client.next_completion().await.unwrap().is_err());
    assert_eq!(client.state(), ClientState::Error);
    assert!(!client.busy());
    assert_eq!(
        drain(&mut events),
        [
            ClientEvent::BusyChanged(true),
            ClientEvent::BusyChanged(false),
            ClientEvent::Error("connection refused".into()),
        ]
    );
}

#[tokio::test]
async fn malformed_reply_reports_generic_message() {
    let transport = MockTransport::new();
    transport.reply("garbage", Reply::Body("<<not json>>".into()));
    let (mut client, mut events) = client(&transport);

    assert!(client.translate(&lang("en"), &lang("ru"), "garbage"));
    let err = client.next_completion().await.unwrap().unwrap_err();
    assert!(matches!(err, TranslationError::MalformedResponse));
    assert!(drain(&mut events).contains(&ClientEvent::Error("invalid response".into())));
}

#[tokio::test]
async fn unsupported_pair_fails_without_request() {
    let transport = MockTransport::new();
    let (mut client, mut events) = client(&transport);

    assert!(!client.translate(&lang("de"), &lang("ru"), "hallo"));
    assert_eq!(transport.calls(), 0);
    assert_eq!(client.state(), ClientState::Error);
    assert_eq!(
        drain(&mut events),
        [ClientEvent::Error("unsupported language pair: de -> ru".into())]
    );
}

#[tokio::test]
async fn translate_source_text_uses_current_properties() {
    let transport = MockTransport::new();
    transport.reply("guten Tag", Reply::Body(ok_body("good day")));
    let (mut client, _events) = client(&transport);

    client.set_source_language(lang("de"));
    client.set_source_text("guten Tag");
    assert_eq!(client.target_language().code, "en");
    assert!(client.translate_source_text());
    client.next_completion().await.unwrap().unwrap();
    assert_eq!(client.translated_text(), "good day");

    // editing the text clears the previous translation
    client.set_source_text("guten Morgen");
    assert_eq!(client.translated_text(), "");
}

#[test]
fn setters_are_idempotent_and_persisted() {
    let transport = MockTransport::new();
    let (mut client, mut events) = client(&transport);

    client.set_source_text("a");
    client.set_source_text("a");
    client.set_target_language(lang("de"));
    client.set_target_language(lang("de"));

    assert_eq!(
        drain(&mut events),
        [
            ClientEvent::SourceTextChanged("a".into()),
            ClientEvent::TargetLanguageChanged(lang("de")),
        ]
    );
    assert_eq!(
        client.settings().get("YandexTranslate/TargetLanguage").as_deref(),
        Some("de")
    );
}

#[test]
fn changing_source_replaces_invalid_target() {
    let transport = MockTransport::new();
    let (mut client, mut events) = client(&transport);
    assert!(client.source_language().is_autodetect());

    client.set_target_language(lang("ru"));
    drain(&mut events);

    client.set_source_language(lang("de"));
    assert_eq!(client.target_language().code, "en");
    assert_eq!(
        drain(&mut events),
        [
            ClientEvent::SourceLanguageChanged(lang("de")),
            ClientEvent::TargetLanguageChanged(lang("en")),
        ]
    );
    assert_eq!(client.target_languages(), [lang("en")]);
    assert_eq!(
        client.settings().get("YandexTranslate/SourceLanguage").as_deref(),
        Some("de")
    );
}

#[test]
fn languages_are_restored_from_settings() {
    let transport = MockTransport::new();

    let mut settings = MemorySettings::new();
    settings.set("YandexTranslate/SourceLanguage", "ru");
    settings.set("YandexTranslate/TargetLanguage", "en");
    let (client, _events) = client_with(&transport, settings);
    assert_eq!(client.source_language().code, "ru");
    assert_eq!(client.source_language().display_name, "Russian");
    assert_eq!(client.target_language().code, "en");

    let mut settings = MemorySettings::new();
    settings.set("YandexTranslate/SourceLanguage", "xx");
    settings.set("YandexTranslate/TargetLanguage", "xx");
    let (client, _events) = client_with(&transport, settings);
    assert!(client.source_language().is_autodetect());
    assert_eq!(client.target_language().code, "en");
}

#[test]
fn translate_outside_runtime_reports_error() {
    let transport = MockTransport::new();
    let (mut client, mut events) = client(&transport);

    assert!(!client.translate(&lang("en"), &lang("ru"), "hello"));
    assert_eq!(transport.calls(), 0);
    assert!(matches!(drain(&mut events).as_slice(), [ClientEvent::Error(_)]));
}
