// tests/guess_api.rs

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use std::io;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

use twentyq::answers::{AnswerBook, AnswerEntry};
use twentyq::game::Game;
use twentyq::llm::{Completion, CompletionClient, UpstreamFailure};
use twentyq::prompt::{GameTemplate, Prompt, PromptBuilder, PromptStyle};
use twentyq::server::{AppState, create_router};

const APOLOGY: &str = "Oops, something went wrong, please take a deep breath, and try again.";

/// Records every call and answers with a canned reply (or fails).
struct FakeCompletion {
    reply: Option<String>,
    calls: Mutex<Vec<(Prompt, String)>>,
}

impl FakeCompletion {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(text.to_string()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(Prompt, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(
        &self,
        prompt: &Prompt,
        api_key: &str,
    ) -> Result<Completion, UpstreamFailure> {
        self.calls.lock().unwrap().push((prompt.clone(), api_key.to_string()));
        match &self.reply {
            Some(text) => Ok(Completion {
                text: text.clone(),
                raw: json!({ "choices": [{ "text": text }] }),
            }),
            None => Err(UpstreamFailure::Status {
                status: 429,
                body: "rate limited".to_string(),
            }),
        }
    }

    fn model(&self) -> &str {
        "fake"
    }
}

fn app(fake: Arc<FakeCompletion>, style: PromptStyle, default_key: Option<&str>) -> axum::Router {
    let entry = AnswerEntry::new("banana").with_facts(["it is yellow"]);
    let book = AnswerBook::new(vec![entry]).unwrap();
    let game = Game::new(book, 849, PromptBuilder::new(style, GameTemplate::default()));
    let state = AppState {
        game: Arc::new(game),
        completion: fake,
        default_api_key: default_key.map(str::to_string),
        log_upstream_response: true,
    };
    create_router(state, &["http://hetzner:3000".to_string()])
}

fn guess_request(uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Collects formatted log lines so tests can inspect them.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn session_cookie(response: &axum::response::Response) -> String {
    let value = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie is always set")
        .to_str()
        .unwrap();
    let pair = value.split(';').next().unwrap();
    pair.strip_prefix("session_id=").unwrap().to_string()
}

#[tokio::test]
async fn test_guess_returns_model_reply_and_new_session() {
    let fake = FakeCompletion::replying("Yes.");
    let response = app(fake.clone(), PromptStyle::Completion, None)
        .oneshot(guess_request(
            "/guess",
            json!({ "text": "  Is it a FRUIT?\n", "openai_key": "sk-caller" }),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let session = session_cookie(&response);
    assert!(uuid::Uuid::parse_str(&session).is_ok(), "not a uuid: {session}");
    assert_eq!(body_json(response).await, json!({ "text": "Yes." }));

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    let (prompt, key) = &calls[0];
    assert_eq!(key, "sk-caller");
    let Prompt::Completion(text) = prompt else {
        panic!("expected a completion prompt");
    };
    assert!(text.contains("The Answer is banana"));
    assert!(text.contains("  * it is yellow"));
    assert!(text.ends_with("Player: is it a fruit?\nHost:"));
}

#[tokio::test]
async fn test_guess_log_keeps_raw_and_normalized_text() {
    let logs = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let response = app(FakeCompletion::replying("No."), PromptStyle::Completion, None)
        .oneshot(guess_request(
            "/guess",
            json!({ "text": "  Is It BIG?  ", "openai_key": "sk-caller" }),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let logs = logs.contents();
    assert!(logs.contains("guess answered"), "{logs}");
    assert!(logs.contains("guess_raw=  Is It BIG?  "), "{logs}");
    assert!(logs.contains(" guess=is it big?"), "{logs}");
}

#[tokio::test]
async fn test_existing_session_is_echoed() {
    let fake = FakeCompletion::replying("No.");
    let response = app(fake, PromptStyle::Completion, Some("sk-default"))
        .oneshot(guess_request(
            "/guess",
            json!({ "text": "is it blue?" }),
            Some("session_id=6f1c2a2e-0000-4000-8000-123456789abc"),
        ))
        .await
        .unwrap();

    assert_eq!(session_cookie(&response), "6f1c2a2e-0000-4000-8000-123456789abc");
}

#[tokio::test]
async fn test_default_key_and_apikey_alias() {
    let fake = FakeCompletion::replying("maybe");
    let router = app(fake.clone(), PromptStyle::Chat, Some("sk-default"));

    router
        .clone()
        .oneshot(guess_request("/guess", json!({ "text": "is it big?" }), None))
        .await
        .unwrap();
    router
        .oneshot(guess_request(
            "/process_data",
            json!({ "text": "is it small?", "apikey": "sk-alias" }),
            None,
        ))
        .await
        .unwrap();

    let calls = fake.calls();
    assert_eq!(calls[0].1, "sk-default");
    assert_eq!(calls[1].1, "sk-alias");
    assert!(matches!(calls[1].0, Prompt::Chat(_)));
}

#[tokio::test]
async fn test_upstream_failure_returns_apology() {
    let response = app(FakeCompletion::failing(), PromptStyle::Completion, Some("sk-default"))
        .oneshot(guess_request("/guess", json!({ "text": "is it alive?" }), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::SET_COOKIE).is_some());
    assert_eq!(body_json(response).await, json!({ "text": APOLOGY }));
}

#[tokio::test]
async fn test_missing_key_returns_apology_without_calling_upstream() {
    let fake = FakeCompletion::replying("Yes.");
    let response = app(fake.clone(), PromptStyle::Completion, None)
        .oneshot(guess_request("/guess", json!({ "text": "is it alive?" }), None))
        .await
        .unwrap();

    assert_eq!(body_json(response).await, json!({ "text": APOLOGY }));
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let response = app(FakeCompletion::replying("Yes."), PromptStyle::Completion, None)
        .oneshot(guess_request("/guess", json!({ "guess": "wrong field" }), None))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_status_does_not_leak_answer() {
    let response = app(FakeCompletion::replying("Yes."), PromptStyle::Chat, None)
        .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["answers"], 1);
    assert_eq!(body["prompt_style"], "chat");
    // The day index plus the public answer list would reveal today's answer
    assert!(body.get("day_index").is_none());
    assert!(body.get("day_offset").is_none());
    assert!(!body.to_string().contains("banana"));
}

#[tokio::test]
async fn test_cors_allows_configured_origin_with_credentials() {
    let response = app(FakeCompletion::replying("Yes."), PromptStyle::Completion, None)
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/guess")
                .header(header::ORIGIN, "http://hetzner:3000")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://hetzner:3000"
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}
