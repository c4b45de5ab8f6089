// src/chat.rs

use crate::{
    api::ApiClient,
    constants::{DEFAULT_SPEAKING_SETTLE_MS, FALLBACK_RESPONSES},
    errors::{ApiError, ChatError},
    models::{ChatReply, Message, UsageTotals},
    orb::{OrbState, OrbVisual},
};
use rand::seq::IndexedRandom;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// A send that passed the guards and still needs its API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSend {
    pub content: String,
    pub session_id: Option<String>,
    /// Session generation the send was started in.
    pub generation: u64,
}

/// Chat state shared between the send task and the renderer.
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    messages: Vec<Message>,
    loading: bool,
    orb: OrbVisual,
    usage: UsageTotals,
    current_session: Option<String>,
    reply_seq: u64,
    /// Bumped whenever the operator switches or resets the session.
    generation: u64,
}

impl ChatState {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn orb(&self) -> &OrbVisual {
        &self.orb
    }

    pub fn orb_state(&self) -> OrbState {
        self.orb.state()
    }

    pub fn usage(&self) -> UsageTotals {
        self.usage
    }

    pub fn current_session(&self) -> Option<&str> {
        self.current_session.as_deref()
    }

    /// Applies the input guards, appends the user message and a loading placeholder.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingSend, ChatError> {
        let content = text.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyInput);
        }
        if self.loading {
            return Err(ChatError::Busy);
        }

        self.loading = true;
        self.messages.push(Message::user(content));
        self.messages.push(Message::placeholder());
        self.orb.set_state(OrbState::Thinking);

        Ok(PendingSend {
            content: content.to_string(),
            session_id: self.current_session.clone(),
            generation: self.generation,
        })
    }

    /// Folds the call outcome in. Returns the reply sequence number when the
    /// orb went to `speaking` and needs a later `settle`.
    ///
    /// A reply for a session the operator has since left only counts toward
    /// usage; the visible thread and `current_session` stay as they are.
    pub fn finish_send(
        &mut self,
        pending: &PendingSend,
        outcome: Result<ChatReply, ApiError>,
    ) -> Option<u64> {
        self.loading = false;
        self.messages.retain(|m| !m.pending);

        if pending.generation != self.generation {
            match outcome {
                Ok(reply) => {
                    self.usage.record(&reply);
                    log::info!("Dropped reply for session {} after switch", reply.session_id);
                }
                Err(e) => log::debug!("Request for a previous session failed: {}", e),
            }
            self.orb.set_state(OrbState::Idle);
            return None;
        }

        match outcome {
            Ok(reply) => {
                self.usage.record(&reply);
                if !reply.session_id.is_empty() {
                    self.current_session = Some(reply.session_id.clone());
                }
                self.messages.push(Message::assistant(reply.content));
                self.orb.set_state(OrbState::Speaking);
                self.reply_seq += 1;
                Some(self.reply_seq)
            }
            Err(e) => {
                log::warn!("Chat request failed, answering from fallback set: {}", e);
                self.messages.push(Message::assistant(fallback_response()));
                self.orb.set_state(OrbState::Idle);
                None
            }
        }
    }

    /// Returns the orb to idle unless another request has started or replied since `seq`.
    pub fn settle(&mut self, seq: u64) {
        if !self.loading && self.reply_seq == seq && self.orb.state() == OrbState::Speaking {
            self.orb.set_state(OrbState::Idle);
        }
    }

    pub fn select_session(&mut self, session_id: impl Into<String>) {
        self.messages.clear();
        self.current_session = Some(session_id.into());
        self.generation += 1;
    }

    pub fn new_session(&mut self) {
        self.messages.clear();
        self.current_session = None;
        self.generation += 1;
    }
}

pub fn fallback_response() -> &'static str {
    FALLBACK_RESPONSES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or("...")
}

/// Chat front door: guards input, calls the API, and falls back to canned
/// replies when the API is missing or fails. Cloning shares the same state.
#[derive(Debug, Clone)]
pub struct ChatPanel {
    state: Arc<Mutex<ChatState>>,
    api: Option<Arc<ApiClient>>,
    settle_delay: Duration,
}

impl ChatPanel {
    pub fn new(api: Option<Arc<ApiClient>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ChatState::default())),
            api,
            settle_delay: Duration::from_millis(DEFAULT_SPEAKING_SETTLE_MS),
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sends `text`. Empty input and sends while another is in flight are
    /// dropped and reported as `Err`; callers are free to ignore it.
    pub async fn send(&self, text: &str) -> Result<(), ChatError> {
        let pending = self.state.lock().await.begin_send(text)?;

        let outcome = match &self.api {
            Some(api) => {
                api.chat(&pending.content, pending.session_id.as_deref())
                    .await
            }
            None => Err(ApiError::NotConfigured),
        };

        let settle = self.state.lock().await.finish_send(&pending, outcome);
        if let Some(seq) = settle {
            let state = Arc::clone(&self.state);
            let delay = self.settle_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                state.lock().await.settle(seq);
            });
        }
        Ok(())
    }

    pub async fn select_session(&self, session_id: impl Into<String>) {
        self.state.lock().await.select_session(session_id);
    }

    pub async fn new_session(&self) {
        self.state.lock().await.new_session();
    }

    /// Fetching the history of a selected session is not offered yet.
    pub async fn load_session_history(&self, _session_id: &str) -> Result<Vec<Message>, ChatError> {
        Err(ChatError::HistoryNotImplemented)
    }

    pub async fn snapshot(&self) -> ChatState {
        self.state.lock().await.clone()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.state.lock().await.messages.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.loading
    }

    pub async fn usage(&self) -> UsageTotals {
        self.state.lock().await.usage
    }

    pub async fn orb_state(&self) -> OrbState {
        self.state.lock().await.orb_state()
    }

    pub async fn current_session(&self) -> Option<String> {
        self.state.lock().await.current_session.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::Role, token_store::TokenStore};
    use serde_json::json;
    use tempfile::{tempdir, TempDir};
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn reply(content: &str, input: u64, output: u64) -> ChatReply {
        ChatReply {
            session_id: "s-1".into(),
            content: content.into(),
            input_tokens: input,
            output_tokens: output,
            cost_usd: 0.0,
        }
    }

    fn panel_for(server: &MockServer) -> (ChatPanel, TempDir) {
        let dir = tempdir().unwrap();
        let client = ApiClient::new(
            format!("{}/api", server.uri()),
            TokenStore::new(dir.path().join("auth_token")),
        );
        let panel = ChatPanel::new(Some(Arc::new(client)))
            .with_settle_delay(Duration::from_millis(50));
        (panel, dir)
    }

    #[test]
    fn test_empty_input_is_ignored() {
        let mut state = ChatState::default();
        assert_eq!(state.begin_send(""), Err(ChatError::EmptyInput));
        assert_eq!(state.begin_send("   \n\t"), Err(ChatError::EmptyInput));
        assert!(state.messages().is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.orb_state(), OrbState::Idle);
    }

    #[test]
    fn test_second_send_while_loading_is_dropped() {
        let mut state = ChatState::default();
        state.begin_send("first").unwrap();
        let len = state.messages().len();

        assert_eq!(state.begin_send("second"), Err(ChatError::Busy));
        assert_eq!(state.messages().len(), len);
    }

    #[test]
    fn test_success_replaces_placeholder_and_speaks() {
        let mut state = ChatState::default();
        let pending = state.begin_send("  hello ").unwrap();
        assert_eq!(pending.content, "hello");
        assert_eq!(state.orb_state(), OrbState::Thinking);
        assert!(state.messages().last().unwrap().pending);

        let seq = state.finish_send(&pending, Ok(reply("hi operator", 3, 4))).unwrap();
        let roles: Vec<Role> = state.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert!(state.messages().iter().all(|m| !m.pending));
        assert_eq!(state.orb_state(), OrbState::Speaking);
        assert_eq!(state.current_session(), Some("s-1"));

        state.settle(seq);
        assert_eq!(state.orb_state(), OrbState::Idle);
    }

    #[test]
    fn test_settle_skipped_when_new_request_started() {
        let mut state = ChatState::default();
        let pending = state.begin_send("one").unwrap();
        let seq = state.finish_send(&pending, Ok(reply("a", 1, 1))).unwrap();
        state.begin_send("two").unwrap();

        state.settle(seq);
        assert_eq!(state.orb_state(), OrbState::Thinking);
    }

    #[test]
    fn test_failure_uses_fallback_and_idles() {
        let mut state = ChatState::default();
        let pending = state.begin_send("hello").unwrap();
        assert_eq!(
            state.finish_send(&pending, Err(ApiError::Unreachable("down".into()))),
            None
        );

        let messages = state.messages();
        assert_eq!(messages.len(), 2);
        assert!(FALLBACK_RESPONSES.contains(&messages[1].content.as_str()));
        assert_eq!(state.orb_state(), OrbState::Idle);
        assert!(!state.is_loading());
    }

    #[test]
    fn test_select_session_clears_messages() {
        let mut state = ChatState::default();
        let pending = state.begin_send("hello").unwrap();
        state.finish_send(&pending, Ok(reply("hi", 1, 1)));

        state.select_session("s-9");
        assert!(state.messages().is_empty());
        assert_eq!(state.current_session(), Some("s-9"));

        state.new_session();
        assert_eq!(state.current_session(), None);
    }

    #[test]
    fn test_late_reply_after_session_switch_stays_out_of_new_thread() {
        let mut state = ChatState::default();
        state.select_session("s-1");
        let pending = state.begin_send("hello").unwrap();
        assert_eq!(pending.session_id.as_deref(), Some("s-1"));

        state.select_session("s-2");
        let settle = state.finish_send(&pending, Ok(reply("reply for s-1", 2, 3)));

        assert_eq!(settle, None);
        assert_eq!(state.current_session(), Some("s-2"));
        assert!(state.messages().is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.orb_state(), OrbState::Idle);
        assert_eq!(state.usage().total_tokens(), 5);
    }

    #[test]
    fn test_late_failure_after_new_session_adds_no_fallback() {
        let mut state = ChatState::default();
        let pending = state.begin_send("hello").unwrap();

        state.new_session();
        state.finish_send(&pending, Err(ApiError::Unreachable("down".into())));

        assert!(state.messages().is_empty());
        assert_eq!(state.current_session(), None);
    }

    #[tokio::test]
    async fn test_send_without_client_falls_back() {
        let panel = ChatPanel::new(None);
        panel.send("hello").await.unwrap();

        let messages = panel.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "hello");
        assert!(FALLBACK_RESPONSES.contains(&messages[1].content.as_str()));
        assert_eq!(panel.orb_state().await, OrbState::Idle);
    }

    #[tokio::test]
    async fn test_send_success_appends_user_then_assistant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "session_id": "s-1",
                "content": "Objective complete.",
                "input_tokens": 4,
                "output_tokens": 6,
                "cost_usd": 0.0001
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (panel, _dir) = panel_for(&server);
        panel.send("hello").await.unwrap();

        let messages = panel.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Objective complete.");
        assert_eq!(panel.orb_state().await, OrbState::Speaking);
        assert_eq!(panel.current_session().await.as_deref(), Some("s-1"));

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(panel.orb_state().await, OrbState::Idle);
    }

    #[tokio::test]
    async fn test_send_api_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "detail": "provider down" })),
            )
            .mount(&server)
            .await;

        let (panel, _dir) = panel_for(&server);
        panel.send("hello").await.unwrap();

        let messages = panel.messages().await;
        assert_eq!(messages.len(), 2);
        assert!(FALLBACK_RESPONSES.contains(&messages[1].content.as_str()));
        assert_eq!(panel.usage().await, UsageTotals::default());
    }

    #[tokio::test]
    async fn test_concurrent_send_is_noop_while_in_flight() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "session_id": "s-1", "content": "late reply" }))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (panel, _dir) = panel_for(&server);
        let first = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.send("first").await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(panel.is_loading().await);
        let before = panel.messages().await.len();
        assert_eq!(panel.send("second").await, Err(ChatError::Busy));
        assert_eq!(panel.messages().await.len(), before);

        first.await.unwrap().unwrap();
        let contents: Vec<String> = panel
            .messages()
            .await
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["first".to_string(), "late reply".to_string()]);
    }

    #[tokio::test]
    async fn test_switching_session_mid_request_keeps_selection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "session_id": "s-1", "content": "stale" }))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (panel, _dir) = panel_for(&server);
        panel.select_session("s-1").await;
        let first = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.send("hello").await })
        };

        tokio::time::sleep(Duration::from_millis(50)).await;
        panel.select_session("s-2").await;
        first.await.unwrap().unwrap();

        assert_eq!(panel.current_session().await.as_deref(), Some("s-2"));
        assert!(panel.messages().await.is_empty());
        assert!(!panel.is_loading().await);
    }

    #[tokio::test]
    async fn test_usage_accumulates_across_sends() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "session_id": "s-1", "content": "one", "input_tokens": 4, "output_tokens": 6, "cost_usd": 0.01
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "session_id": "s-1", "content": "two", "input_tokens": 5, "output_tokens": 10, "cost_usd": 0.02
            })))
            .mount(&server)
            .await;

        let (panel, _dir) = panel_for(&server);
        panel.send("a").await.unwrap();
        panel.send("b").await.unwrap();

        let usage = panel.usage().await;
        assert_eq!(usage.total_tokens(), 25);
        assert_eq!(usage.messages, 2);
    }

    #[tokio::test]
    async fn test_session_history_is_not_implemented() {
        let panel = ChatPanel::new(None);
        assert_eq!(
            panel.load_session_history("s-1").await,
            Err(ChatError::HistoryNotImplemented)
        );
    }
}
