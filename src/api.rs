use crate::{
    constants::GENERIC_REQUEST_ERROR,
    errors::ApiError,
    logging::log_api_call,
    models::{
        ApiCallLog, BillingUsage, ChatReply, ChatRequest, Health, Profile, Session, SessionList,
        SettingsResponse, SettingsUpdate, UpgradeOutcome,
    },
    token_store::TokenStore,
};
use chrono::Utc;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{io, time::Instant};
use tokio::sync::mpsc::UnboundedSender;

/// Signals the client raises for its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientEvent {
    /// A request came back 401 and the stored token was dropped.
    LoginRequired,
}

/// HTTP client for the GLTCH Cloud API.
///
/// One attempt per call: no retries, no timeouts beyond reqwest's defaults.
/// The client is the only component that reads or writes the stored token.
#[derive(Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    tokens: TokenStore,
    events: Option<UnboundedSender<ClientEvent>>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, tokens: TokenStore) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
            events: None,
        }
    }

    /// Routes `ClientEvent`s to `events`.
    pub fn with_events(mut self, events: UnboundedSender<ClientEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn token(&self) -> Option<String> {
        self.tokens.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn set_token(&self, token: &str) -> io::Result<()> {
        self.tokens.save(token)
    }

    pub fn clear_token(&self) -> io::Result<()> {
        self.tokens.clear()
    }

    /// Issues one request and returns the decoded JSON body.
    pub async fn send(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = self.tokens.load() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let start = Instant::now();
        let result = request.send().await;
        let mut call = ApiCallLog {
            timestamp: Utc::now(),
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            response_status: None,
            response_time_ms: start.elapsed().as_millis(),
        };

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                log_api_call(&call);
                return Err(ApiError::Unreachable(e.to_string()));
            }
        };

        let status = response.status();
        call.response_status = Some(status.as_u16());
        log_api_call(&call);

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ApiError::AuthExpired);
        }

        if !status.is_success() {
            let detail = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| error_detail(&body))
                .unwrap_or_else(|| GENERIC_REQUEST_ERROR.to_string());
            return Err(ApiError::request_failed(status.as_u16(), detail));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn send_typed<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<T, ApiError> {
        let value = self.send(endpoint, method, body).await?;
        serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn chat(&self, content: &str, session_id: Option<&str>) -> Result<ChatReply, ApiError> {
        let body = serde_json::to_value(ChatRequest {
            content,
            session_id,
        })
        .map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send_typed("/chat", Method::POST, Some(&body)).await
    }

    pub async fn sessions(&self) -> Result<Vec<Session>, ApiError> {
        let list: SessionList = self.send_typed("/sessions", Method::GET, None).await?;
        Ok(list.sessions)
    }

    pub async fn usage(&self) -> Result<BillingUsage, ApiError> {
        self.send_typed("/billing/usage", Method::GET, None).await
    }

    pub async fn me(&self) -> Result<Profile, ApiError> {
        self.send_typed("/auth/me", Method::GET, None).await
    }

    pub async fn health(&self) -> Result<Health, ApiError> {
        self.send_typed("/health", Method::GET, None).await
    }

    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<Profile, ApiError> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Decode(e.to_string()))?;
        let response: SettingsResponse = self
            .send_typed("/auth/settings", Method::PATCH, Some(&body))
            .await?;
        Ok(response.user)
    }

    pub async fn upgrade(&self) -> Result<UpgradeOutcome, ApiError> {
        let body = self.send("/billing/upgrade", Method::POST, None).await?;
        if let Some(url) = body["checkout_url"].as_str() {
            return Ok(UpgradeOutcome::Checkout(url.to_string()));
        }
        match body["message"].as_str() {
            Some(message) => Ok(UpgradeOutcome::AlreadyPro(message.to_string())),
            None => Err(ApiError::Decode(
                "upgrade response has neither checkout_url nor message".to_string(),
            )),
        }
    }

    fn expire_session(&self) {
        if let Err(e) = self.clear_token() {
            log::warn!("Failed to clear stored token: {}", e);
        }
        log::warn!("API returned 401, login required");
        if let Some(events) = &self.events {
            let _ = events.send(ClientEvent::LoginRequired);
        }
    }
}

/// FastAPI puts a string in `detail`; validation errors put a list there.
fn error_detail(body: &Value) -> Option<String> {
    match &body["detail"] {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
