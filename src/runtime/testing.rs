//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O. Tests run on a
//! paused tokio clock, so reveal ticks and provider delays are deterministic.

use super::{start, ChatHandle, ChatUpdate, ChatView};
use crate::chat::Message;
use crate::db::{Database, Persistence};
use crate::llm::{GenerateRequest, GenerateResponse, LlmError, LlmService};
use crate::state_machine::Status;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Notify};

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<GenerateResponse, LlmError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: GenerateResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a plain text answer
    pub fn queue_text(&self, text: &str) {
        self.queue_response(GenerateResponse::text(text));
    }

    /// Queue a transport failure
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

impl Default for MockLlmService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        self.next_response(request)
    }

    fn model_id(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Delayed Mock LLM Service (for cancellation testing)
// ============================================================================

/// Mock LLM service that answers after a fixed delay
pub struct DelayedMockLlmService {
    inner: MockLlmService,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockLlmService {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockLlmService::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_text(&self, text: &str) {
        self.inner.queue_text(text);
    }

    pub fn recorded_requests(&self) -> Vec<GenerateRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl LlmService for DelayedMockLlmService {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, LlmError> {
        let response = self.inner.next_response(request);
        self.request_started.notify_waiters();
        tokio::time::sleep(self.delay).await;
        response
    }

    fn model_id(&self) -> &str {
        "mock-delayed"
    }
}

// ============================================================================
// Test Runtime Builder
// ============================================================================

/// Helper for building test runtimes with minimal boilerplate
pub struct TestRuntime<L: LlmService + 'static> {
    pub handle: ChatHandle,
    pub updates: broadcast::Receiver<ChatUpdate>,
    pub llm: Arc<L>,
    pub db: Database,
}

impl TestRuntime<MockLlmService> {
    /// Create a simple test runtime with an instant mock
    pub fn new() -> TestRuntimeBuilder<MockLlmService> {
        TestRuntimeBuilder {
            llm: MockLlmService::new(),
            db: None,
            reveal_interval: Duration::from_millis(30),
        }
    }
}

pub struct TestRuntimeBuilder<L> {
    llm: L,
    db: Option<Database>,
    reveal_interval: Duration,
}

impl<L: LlmService + 'static> TestRuntimeBuilder<L> {
    pub fn llm<M: LlmService + 'static>(self, llm: M) -> TestRuntimeBuilder<M> {
        TestRuntimeBuilder {
            llm,
            db: self.db,
            reveal_interval: self.reveal_interval,
        }
    }

    /// Share an existing database, e.g. to simulate a restart
    pub fn db(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    pub fn reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    pub fn build(self) -> TestRuntime<L> {
        let db = match self.db {
            Some(db) => db,
            None => Database::open_in_memory().expect("in-memory database"),
        };
        let llm = Arc::new(self.llm);
        let handle = start(
            Persistence::new(db.clone()),
            llm.clone(),
            self.reveal_interval,
        );
        let updates = handle.subscribe();

        TestRuntime {
            handle,
            updates,
            llm,
            db,
        }
    }
}

impl<L: LlmService + 'static> TestRuntime<L> {
    pub async fn send_message(&self, text: &str) {
        self.handle
            .send_message(text)
            .await
            .expect("Failed to send message");
    }

    pub async fn send_cancel(&self) {
        self.handle.cancel().await.expect("Failed to send cancel");
    }

    pub async fn snapshot(&self) -> ChatView {
        self.handle.snapshot().await.expect("Failed to snapshot")
    }

    pub async fn history(&self) -> Vec<Message> {
        self.snapshot().await.history
    }

    /// Wait for the first update matching `pred`, returning it
    pub async fn wait_for(
        &mut self,
        timeout: Duration,
        pred: impl Fn(&ChatUpdate) -> bool,
    ) -> Option<ChatUpdate> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            match tokio::time::timeout(remaining, self.updates.recv()).await {
                Ok(Ok(update)) if pred(&update) => return Some(update),
                Ok(Ok(_) | Err(broadcast::error::RecvError::Lagged(_))) => continue,
                Ok(Err(broadcast::error::RecvError::Closed)) | Err(_) => return None,
            }
        }
    }

    /// Wait for the coordinator to report a status
    pub async fn wait_for_status(&mut self, expected: Status, timeout: Duration) -> bool {
        self.wait_for(timeout, |u| {
            matches!(u, ChatUpdate::StateChanged { status, .. } if *status == expected)
        })
        .await
        .is_some()
    }

    pub async fn wait_for_idle(&mut self, timeout: Duration) -> bool {
        self.wait_for_status(Status::Idle, timeout).await
    }

    /// Wait until the reveal shows exactly `text`
    pub async fn wait_for_revealed(&mut self, text: &str, timeout: Duration) -> bool {
        self.wait_for(timeout, |u| {
            matches!(u, ChatUpdate::StateChanged { revealed: Some(r), .. } if r == text)
        })
        .await
        .is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{create_router, ProxyState};
    use crate::chat::{PendingAttachment, Persona, Sender};
    use crate::llm::{GeminiService, Part, ProxyService, FALLBACK_REPLY};

    const WAIT: Duration = Duration::from_secs(5);

    fn first_text(request: &GenerateRequest) -> &str {
        request.contents[0].parts[0].as_text().unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_llm_service() {
        let llm = MockLlmService::new();
        llm.queue_text("Hello!");

        let request = GenerateRequest {
            contents: vec![],
            generation_config: Default::default(),
        };
        let response = llm.generate(&request).await.unwrap();
        assert_eq!(response.first_text(), Some("Hello!"));
        assert_eq!(llm.recorded_requests().len(), 1);

        let missing = llm.generate(&request).await.unwrap_err();
        assert_eq!(missing.message, "No mock response queued");
    }

    /// Integration test: first message round trip
    #[tokio::test(start_paused = true)]
    async fn test_hello_round_trip() {
        let mut rt = TestRuntime::new().build();
        rt.llm.queue_text("Hi there! How can I help?");

        rt.send_message("Hello").await;
        assert!(rt.wait_for_idle(WAIT).await);

        let history = rt.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::User);
        assert_eq!(history[0].text, "Hello");
        assert_eq!(history[1].sender, Sender::Assistant);
        assert_eq!(history[1].text, "Hi there! How can I help?");

        let requests = rt.llm.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].contents.len(), 1);
        assert_eq!(
            first_text(&requests[0]),
            format!("{}\n\nHello", Persona::Default.system_instruction())
        );

        // Both messages persisted
        let stored = Persistence::new(rt.db.clone()).load();
        assert_eq!(stored.history.len(), 2);
    }

    /// Integration test: reveal grows word by word at the configured cadence
    #[tokio::test(start_paused = true)]
    async fn test_reveal_progression() {
        let mut rt = TestRuntime::new().build();
        rt.llm.queue_text("one two three");

        let start = tokio::time::Instant::now();
        rt.send_message("count").await;

        let mut revealed = Vec::new();
        loop {
            match rt.wait_for(WAIT, |u| matches!(u, ChatUpdate::StateChanged { .. })).await {
                Some(ChatUpdate::StateChanged {
                    status: Status::Idle,
                    ..
                }) => break,
                Some(ChatUpdate::StateChanged {
                    revealed: Some(text),
                    ..
                }) => revealed.push(text),
                Some(_) => {}
                None => panic!("runtime never went idle"),
            }
        }

        // Entering Revealing shows nothing yet; two ticks show two words; the
        // third completes and commits
        assert_eq!(revealed, vec!["", "one", "one two"]);
        assert!(start.elapsed() >= Duration::from_millis(90));

        let history = rt.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "one two three");
    }

    /// Integration test: cancel mid-reveal keeps exactly what was shown
    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_reveal_commits_partial_text() {
        let mut rt = TestRuntime::new().build();
        rt.llm.queue_text("one two three four");

        rt.send_message("go").await;
        assert!(rt.wait_for_revealed("one two", WAIT).await);

        rt.send_cancel().await;
        assert!(rt.wait_for_idle(WAIT).await);

        // Let any leftover ticks fire
        tokio::time::sleep(Duration::from_millis(500)).await;

        let history = rt.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].sender, Sender::Assistant);
        assert_eq!(history[1].text, "one two");
    }

    /// Integration test: cancel while the provider is still working
    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_request_appends_nothing() {
        let llm = DelayedMockLlmService::new(Duration::from_secs(10));
        llm.queue_text("too late");
        let mut rt = TestRuntime::new().llm(llm).build();

        rt.send_message("Hello").await;
        assert!(rt.wait_for_status(Status::Sending, WAIT).await);

        rt.send_cancel().await;
        assert!(rt.wait_for_idle(WAIT).await);

        tokio::time::sleep(Duration::from_secs(30)).await;

        let history = rt.history().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "Hello");
        assert_eq!(rt.snapshot().await.status, Status::Idle);
    }

    /// Integration test: a second send while busy is refused
    #[tokio::test(start_paused = true)]
    async fn test_send_while_busy_is_noop() {
        let llm = DelayedMockLlmService::new(Duration::from_secs(1));
        llm.queue_text("first reply");
        let mut rt = TestRuntime::new().llm(llm).build();

        rt.send_message("first").await;
        assert!(rt.wait_for_status(Status::Sending, WAIT).await);

        rt.send_message("second").await;
        let rejected = rt
            .wait_for(WAIT, |u| matches!(u, ChatUpdate::Rejected { .. }))
            .await;
        assert!(rejected.is_some());

        assert!(rt.wait_for_idle(WAIT).await);

        let history = rt.history().await;
        let texts: Vec<_> = history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "first reply"]);
        assert_eq!(rt.llm.recorded_requests().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_send_is_rejected() {
        let mut rt = TestRuntime::new().build();

        rt.send_message("   ").await;
        let rejected = rt
            .wait_for(WAIT, |u| matches!(u, ChatUpdate::Rejected { .. }))
            .await;
        assert!(rejected.is_some());
        assert!(rt.history().await.is_empty());
        assert!(rt.llm.recorded_requests().is_empty());
    }

    /// Integration test: transport failure is shown without animation
    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_message() {
        let mut rt = TestRuntime::new().build();
        rt.llm.queue_error(LlmError::network("Connection failed"));

        rt.send_message("Hello").await;
        let revealing = rt
            .wait_for(WAIT, |u| {
                matches!(
                    u,
                    ChatUpdate::StateChanged {
                        status: Status::Revealing | Status::Idle,
                        ..
                    }
                )
            })
            .await;
        assert!(matches!(
            revealing,
            Some(ChatUpdate::StateChanged {
                status: Status::Idle,
                ..
            })
        ));

        let history = rt.history().await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].text, "Error connecting to Muse: Connection failed");
    }

    /// Integration test: a proxy that cannot reach the provider reads as a
    /// connection error, committed directly and without the key
    #[tokio::test]
    async fn test_unreachable_provider_behind_proxy() {
        // Nothing listens on the discard port
        let gemini = GeminiService::new(
            Some("secret-key".to_string()),
            "gemini-2.0-flash",
            "http://127.0.0.1:9",
        )
        .unwrap();
        let app = create_router(ProxyState::new(gemini));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let llm = ProxyService::new(&format!("http://{addr}")).unwrap();
        let mut rt = TestRuntime::new().llm(llm).build();

        rt.send_message("Hello").await;
        let next = rt
            .wait_for(WAIT, |u| {
                matches!(
                    u,
                    ChatUpdate::StateChanged {
                        status: Status::Revealing | Status::Idle,
                        ..
                    }
                )
            })
            .await;
        assert!(matches!(
            next,
            Some(ChatUpdate::StateChanged {
                status: Status::Idle,
                ..
            })
        ));

        let history = rt.history().await;
        assert_eq!(history.len(), 2);
        let reply = &history[1].text;
        assert!(reply.starts_with("Error connecting to Muse: "), "{reply}");
        assert!(!reply.contains("key="), "{reply}");
        assert!(!reply.contains("secret-key"), "{reply}");

        let stored = Persistence::new(rt.db.clone()).load();
        assert!(stored
            .history
            .messages()
            .iter()
            .all(|m| !m.text.contains("secret-key")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_provider_error_and_fallback_replies() {
        let mut rt = TestRuntime::new().build();
        rt.llm.queue_response(GenerateResponse::error("Quota exceeded"));
        rt.llm.queue_response(GenerateResponse::default());

        rt.send_message("one").await;
        assert!(rt.wait_for_idle(WAIT).await);
        rt.send_message("two").await;
        assert!(rt.wait_for_idle(WAIT).await);

        let history = rt.history().await;
        assert_eq!(history[1].text, "Error from API: Quota exceeded");
        assert_eq!(history[3].text, FALLBACK_REPLY);
        // Prior turns, including the error reply, are sent with the second request
        let second = &rt.llm.recorded_requests()[1];
        assert_eq!(second.contents.len(), 3);
        assert_eq!(second.contents[1].parts[0].as_text(), Some("Error from API: Quota exceeded"));
    }

    /// Integration test: persona selection changes the next request
    #[tokio::test(start_paused = true)]
    async fn test_persona_switch() {
        let mut rt = TestRuntime::new().build();
        rt.llm.queue_text("Sure.");

        rt.handle.select_persona(Persona::Technical).await.unwrap();
        rt.send_message("Explain TCP").await;
        assert!(rt.wait_for_idle(WAIT).await);

        let requests = rt.llm.recorded_requests();
        assert!(first_text(&requests[0]).starts_with(Persona::Technical.system_instruction()));
        assert_eq!(rt.snapshot().await.persona, Persona::Technical);
        assert_eq!(Persistence::new(rt.db.clone()).load().persona, Persona::Technical);
    }

    /// Integration test: attachment-only send
    #[tokio::test(start_paused = true)]
    async fn test_attachment_only_send() {
        let mut rt = TestRuntime::new().build();
        rt.llm.queue_text("A cat.");

        let attachment = PendingAttachment::new("cat.png", "image/png", vec![0x89, 0x50]).unwrap();
        rt.handle.attach(attachment).await.unwrap();
        assert_eq!(
            rt.snapshot().await.attachment.map(|a| a.file_name),
            Some("cat.png".to_string())
        );

        rt.send_message("").await;
        assert!(rt.wait_for_idle(WAIT).await);

        let view = rt.snapshot().await;
        assert_eq!(view.history[0].text, "File: cat.png");
        assert!(view.attachment.is_none());

        let requests = rt.llm.recorded_requests();
        let parts = &requests[0].contents[0].parts;
        assert_eq!(parts[0].as_text(), Some(Persona::Default.system_instruction()));
        assert!(matches!(
            &parts[1],
            Part::InlineData { inline_data } if inline_data.mime_type == "image/png" && inline_data.data == "iVA="
        ));
    }

    /// Integration test: a stated name is remembered and sent with later requests
    #[tokio::test(start_paused = true)]
    async fn test_memory_flows_into_later_requests() {
        let mut rt = TestRuntime::new().build();
        rt.llm.queue_text("Nice to meet you!");
        rt.llm.queue_text("You're Sam.");

        rt.send_message("Hi, I'm Sam").await;
        assert!(rt.wait_for_idle(WAIT).await);
        assert_eq!(rt.snapshot().await.memory.get("name"), Some("Sam"));

        rt.send_message("Who am I?").await;
        assert!(rt.wait_for_idle(WAIT).await);

        let second = &rt.llm.recorded_requests()[1];
        let preamble = first_text(second);
        assert!(preamble.contains("Known facts about the user: name: Sam."));
        assert!(preamble.ends_with("Hi, I'm Sam"));
    }

    /// Integration test: state survives a restart on the same database
    #[tokio::test(start_paused = true)]
    async fn test_state_restored_after_restart() {
        let db = Database::open_in_memory().unwrap();
        {
            let mut rt = TestRuntime::new().db(db.clone()).build();
            rt.llm.queue_text("Hello back");
            rt.handle.toggle_theme().await.unwrap();
            rt.handle.select_persona(Persona::Concise).await.unwrap();
            rt.send_message("Hello").await;
            assert!(rt.wait_for_idle(WAIT).await);
        }

        let rt = TestRuntime::new().db(db).build();
        let view = rt.snapshot().await;
        assert!(!view.dark_mode);
        assert_eq!(view.persona, Persona::Concise);
        let texts: Vec<_> = view.history.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Hello", "Hello back"]);
        assert_eq!(view.status, Status::Idle);
    }

    #[test]
    fn test_view_apply_tracks_updates() {
        let mut view = ChatView::new(&crate::chat::AppState::default(), Status::Idle, None);
        view.apply(&ChatUpdate::MessageAppended(Message::user("hi")));
        view.apply(&ChatUpdate::StateChanged {
            status: Status::Revealing,
            revealed: Some("Hel".to_string()),
        });
        view.apply(&ChatUpdate::ThemeChanged(false));

        assert_eq!(view.history.len(), 1);
        assert!(view.is_busy());
        assert_eq!(view.revealed.as_deref(), Some("Hel"));
        assert!(!view.dark_mode);
    }
}
