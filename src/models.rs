// src/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::LOADING_PLACEHOLDER;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Represents a message in the conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Set on the loading placeholder shown while a reply is pending.
    #[serde(skip)]
    pub pending: bool,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            pending: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            pending: false,
        }
    }

    pub fn placeholder() -> Self {
        Self {
            pending: true,
            ..Self::assistant(LOADING_PLACEHOLDER)
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// A conversation thread owned by the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    #[serde(default = "default_session_title")]
    pub title: String,
    #[serde(default)]
    pub preview: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn default_session_title() -> String {
    "New Chat".to_string()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionList {
    #[serde(default)]
    pub sessions: Vec<Session>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub content: &'a str,
    pub session_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub session_id: String,
    pub content: String,
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
    #[serde(default)]
    pub cost_usd: f64,
}

impl ChatReply {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

/// Running token and cost counters for the current process.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageTotals {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost_usd: f64,
    pub messages: u32,
}

impl UsageTotals {
    pub fn record(&mut self, reply: &ChatReply) {
        self.input_tokens += reply.input_tokens;
        self.output_tokens += reply.output_tokens;
        self.cost_usd += reply.cost_usd;
        self.messages += 1;
    }

    pub fn total_tokens(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Anthropic,
    Gemini,
    Grok,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 4] = [
        LlmProvider::OpenAi,
        LlmProvider::Anthropic,
        LlmProvider::Gemini,
        LlmProvider::Grok,
    ];

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|p| *p == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Anthropic => "anthropic",
            LlmProvider::Gemini => "gemini",
            LlmProvider::Grok => "grok",
        }
    }
}

/// Managed keys are billed by the service; BYOK uses the operator's own credentials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyMode {
    #[default]
    Managed,
    Byok,
}

impl KeyMode {
    pub fn toggled(self) -> Self {
        match self {
            KeyMode::Managed => KeyMode::Byok,
            KeyMode::Byok => KeyMode::Managed,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub callsign: String,
    #[serde(default)]
    pub tier: SubscriptionTier,
    #[serde(default)]
    pub provider: LlmProvider,
    #[serde(default)]
    pub key_mode: KeyMode,
}

/// `messages_per_day == -1` means unlimited.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TierLimits {
    #[serde(default)]
    pub messages_per_day: i64,
    #[serde(default)]
    pub providers: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

impl TierLimits {
    pub fn is_unlimited(&self) -> bool {
        self.messages_per_day < 0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct BillingUsage {
    #[serde(default)]
    pub tier: SubscriptionTier,
    #[serde(default)]
    pub messages_today: u32,
    #[serde(default)]
    pub tokens_this_month: u64,
    #[serde(default)]
    pub limits: TierLimits,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Partial settings update; `None` fields are left untouched by the server.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<LlmProvider>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_mode: Option<KeyMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xai_key: Option<String>,
}

impl SettingsUpdate {
    /// Update carrying the operator's own key, in the field the server reads for `provider`.
    pub fn with_key(provider: LlmProvider, key: impl Into<String>) -> Self {
        let key = Some(key.into());
        let mut update = Self::default();
        match provider {
            LlmProvider::OpenAi => update.openai_key = key,
            LlmProvider::Anthropic => update.anthropic_key = key,
            LlmProvider::Gemini => update.google_key = key,
            LlmProvider::Grok => update.xai_key = key,
        }
        update
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SettingsResponse {
    pub user: Profile,
}

#[derive(Clone, Debug, PartialEq)]
pub enum UpgradeOutcome {
    Checkout(String),
    AlreadyPro(String),
}

/// Logs details of each API call.
#[derive(Debug, Clone, Serialize)]
pub struct ApiCallLog {
    pub timestamp: DateTime<Utc>,
    pub method: String,
    pub endpoint: String,
    /// `None` when the request never reached the server.
    pub response_status: Option<u16>,
    pub response_time_ms: u128,
}
