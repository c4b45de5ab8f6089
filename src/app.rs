use crate::{
    api::ApiClient,
    chat::{ChatPanel, ChatState},
    errors::ApiError,
    log_view::LogView,
    models::{BillingUsage, Profile, Session, UpgradeOutcome},
    status_line::StatusLine,
};
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Chat,
    Sessions,
    Account,
    Login,
    /// Masked entry of the operator's own provider key.
    ApiKey,
    QuitConfirm,
}

impl View {
    /// Views reachable with Tab, in order.
    const CYCLE: [View; 3] = [View::Chat, View::Sessions, View::Account];

    pub fn next(self) -> View {
        match Self::CYCLE.iter().position(|v| *v == self) {
            Some(idx) => Self::CYCLE[(idx + 1) % Self::CYCLE.len()],
            None => View::Chat,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Chat => "Chat",
            View::Sessions => "Sessions",
            View::Account => "Account",
            View::Login => "Login",
            View::ApiKey => "API Key",
            View::QuitConfirm => "Quit",
        }
    }
}

/// Results of background work, delivered back to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    SessionsLoaded(Result<Vec<Session>, ApiError>),
    ProfileLoaded(Result<Profile, ApiError>),
    UsageLoaded(Result<BillingUsage, ApiError>),
    UpgradeLoaded(Result<UpgradeOutcome, ApiError>),
    ChatFinished,
    Log(String),
}

pub struct App {
    pub view: View,
    previous_view: View,
    pub input: String,
    pub token_input: String,
    pub key_input: String,
    pub chat: ChatPanel,
    /// Copy of the chat state taken once per frame for drawing.
    pub chat_view: ChatState,
    pub api: Option<Arc<ApiClient>>,
    pub sessions: Vec<Session>,
    pub selected_session: usize,
    pub profile: Option<Profile>,
    pub billing: Option<BillingUsage>,
    pub checkout_url: Option<String>,
    pub login_required: bool,
    pub logs: LogView,
    pub status_line: StatusLine,
    pub chat_scroll: u16,
    pub started: Instant,
    pub should_quit: bool,
    pub events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        api: Option<Arc<ApiClient>>,
        chat: ChatPanel,
        events: UnboundedSender<AppEvent>,
    ) -> App {
        App {
            view: View::Chat,
            previous_view: View::Chat,
            input: String::new(),
            token_input: String::new(),
            key_input: String::new(),
            chat,
            chat_view: ChatState::default(),
            api,
            sessions: Vec::new(),
            selected_session: 0,
            profile: None,
            billing: None,
            checkout_url: None,
            login_required: false,
            logs: LogView::new(),
            status_line: StatusLine::new(),
            chat_scroll: 0,
            started: Instant::now(),
            should_quit: false,
            events,
        }
    }

    pub fn navigate(&mut self, view: View) {
        if view != self.view {
            self.previous_view = self.view;
            self.view = view;
        }
    }

    /// Returns to the view that was active before the current one.
    pub fn back(&mut self) {
        let target = match self.previous_view {
            View::QuitConfirm => View::Chat,
            other => other,
        };
        self.view = target;
        self.previous_view = View::Chat;
    }

    pub fn scroll_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn select_next_session(&mut self) {
        if !self.sessions.is_empty() {
            self.selected_session = (self.selected_session + 1) % self.sessions.len();
        }
    }

    pub fn select_previous_session(&mut self) {
        if !self.sessions.is_empty() {
            self.selected_session = self
                .selected_session
                .checked_sub(1)
                .unwrap_or(self.sessions.len() - 1);
        }
    }

    pub fn require_login(&mut self) {
        self.login_required = true;
        self.logs.add("Session expired, login required");
        self.status_line.set_notice("Login required");
        self.navigate(View::Login);
    }

    /// Applies a background result to the visible state.
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::SessionsLoaded(Ok(sessions)) => {
                self.logs.add(format!("Loaded {} sessions", sessions.len()));
                self.sessions = sessions;
                if self.selected_session >= self.sessions.len() {
                    self.selected_session = 0;
                }
            }
            AppEvent::ProfileLoaded(Ok(profile)) => {
                self.logs.add(format!("Signed in as {}", profile.callsign));
                self.login_required = false;
                self.profile = Some(profile);
            }
            AppEvent::UsageLoaded(Ok(usage)) => {
                self.billing = Some(usage);
            }
            AppEvent::UpgradeLoaded(Ok(UpgradeOutcome::Checkout(url))) => {
                self.logs.add("Checkout URL ready");
                self.checkout_url = Some(url);
            }
            AppEvent::UpgradeLoaded(Ok(UpgradeOutcome::AlreadyPro(message))) => {
                self.status_line.set_notice(message.clone());
                self.logs.add(message);
            }
            AppEvent::SessionsLoaded(Err(e))
            | AppEvent::ProfileLoaded(Err(e))
            | AppEvent::UsageLoaded(Err(e))
            | AppEvent::UpgradeLoaded(Err(e)) => {
                // 401s arrive separately as a LoginRequired signal
                if !e.is_auth_expired() {
                    self.logs.add(format!("Error: {}", e));
                }
            }
            AppEvent::ChatFinished => {
                self.status_line.clear_notice();
            }
            AppEvent::Log(entry) => self.logs.add(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(None, ChatPanel::new(None), tx)
    }

    #[test]
    fn test_navigate_and_back() {
        let mut app = app();
        app.navigate(View::Sessions);
        app.navigate(View::QuitConfirm);
        app.back();
        assert_eq!(app.view, View::Sessions);

        app.navigate(View::QuitConfirm);
        app.navigate(View::QuitConfirm);
        app.back();
        assert_eq!(app.view, View::Sessions);
    }

    #[test]
    fn test_view_cycle() {
        assert_eq!(View::Chat.next(), View::Sessions);
        assert_eq!(View::Account.next(), View::Chat);
        assert_eq!(View::Login.next(), View::Chat);
    }

    #[test]
    fn test_login_required_moves_to_login() {
        let mut app = app();
        app.require_login();
        assert_eq!(app.view, View::Login);
        assert!(app.login_required);
    }

    #[test]
    fn test_sessions_loaded_resets_out_of_range_selection() {
        let mut app = app();
        app.selected_session = 5;
        app.apply(AppEvent::SessionsLoaded(Ok(vec![Session {
            id: "s-1".into(),
            title: "New Chat".into(),
            preview: None,
            created_at: None,
        }])));
        assert_eq!(app.selected_session, 0);
        app.select_previous_session();
        assert_eq!(app.selected_session, 0);
    }
}
