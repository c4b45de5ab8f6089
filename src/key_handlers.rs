use crate::{
    app::{App, AppEvent, View},
    models::SettingsUpdate,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Dispatches a key press to the handler of the active view.
pub async fn handle_key(key: KeyEvent, app: &mut App) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.navigate(View::QuitConfirm);
        return;
    }

    match app.view {
        View::Chat => handle_chat_input(key, app).await,
        View::Sessions => handle_sessions_input(key, app).await,
        View::Account => handle_account_input(key, app),
        View::Login => handle_login_input(key, app),
        View::ApiKey => handle_api_key_input(key, app),
        View::QuitConfirm => handle_quit_confirm_input(key, app),
    }
}

pub async fn handle_chat_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.navigate(View::QuitConfirm),
        KeyCode::Tab => app.navigate(app.view.next()),
        KeyCode::Enter => send_chat(app).await,
        KeyCode::PageUp => app.scroll_up(),
        KeyCode::PageDown => app.scroll_down(),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
            'n' => {
                app.chat.new_session().await;
                app.chat_scroll = 0;
                app.logs.add("Started a new session");
            }
            'r' => refresh(app),
            'u' => app.scroll_up(),
            'd' => app.scroll_down(),
            _ => {}
        },
        KeyCode::Char(c) => app.input.push(c),
        _ => {}
    }
}

pub async fn handle_sessions_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.navigate(View::Chat),
        KeyCode::Tab => app.navigate(app.view.next()),
        KeyCode::Up => app.select_previous_session(),
        KeyCode::Down => app.select_next_session(),
        KeyCode::Char('r') => refresh(app),
        KeyCode::Enter => {
            let Some(session) = app.sessions.get(app.selected_session).cloned() else {
                return;
            };
            app.chat.select_session(session.id.clone()).await;
            if let Err(e) = app.chat.load_session_history(&session.id).await {
                log::debug!("Session {} opened without history: {}", session.id, e);
            }
            app.chat_scroll = 0;
            app.logs.add(format!("Switched to session '{}'", session.title));
            app.navigate(View::Chat);
        }
        _ => {}
    }
}

pub fn handle_account_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => app.navigate(View::Chat),
        KeyCode::Tab => app.navigate(app.view.next()),
        KeyCode::Char('r') => refresh(app),
        KeyCode::Char('u') => upgrade(app),
        KeyCode::Char('l') => app.navigate(View::Login),
        KeyCode::Char('k') => app.navigate(View::ApiKey),
        KeyCode::Char('o') => sign_out(app),
        KeyCode::Char('m') => {
            let key_mode = app.profile.as_ref().map(|p| p.key_mode).unwrap_or_default();
            update_settings(
                app,
                SettingsUpdate {
                    key_mode: Some(key_mode.toggled()),
                    ..Default::default()
                },
            );
        }
        KeyCode::Char('p') => {
            let provider = app.profile.as_ref().map(|p| p.provider).unwrap_or_default();
            update_settings(
                app,
                SettingsUpdate {
                    provider: Some(provider.next()),
                    ..Default::default()
                },
            );
        }
        _ => {}
    }
}

pub fn handle_login_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => {
            app.token_input.clear();
            app.navigate(View::Chat);
        }
        KeyCode::Backspace => {
            app.token_input.pop();
        }
        KeyCode::Enter => submit_token(app),
        KeyCode::Char(c) => app.token_input.push(c),
        _ => {}
    }
}

pub fn handle_api_key_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Esc => {
            app.key_input.clear();
            app.navigate(View::Account);
        }
        KeyCode::Backspace => {
            app.key_input.pop();
        }
        KeyCode::Enter => submit_api_key(app),
        KeyCode::Char(c) => app.key_input.push(c),
        _ => {}
    }
}

pub fn handle_quit_confirm_input(key: KeyEvent, app: &mut App) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.should_quit = true;
        }
        KeyCode::Char('n') | KeyCode::Esc => app.back(),
        _ => {}
    }
}

async fn send_chat(app: &mut App) {
    // Keep the draft until the current reply lands
    if app.input.trim().is_empty() || app.chat.is_loading().await {
        return;
    }
    let text = std::mem::take(&mut app.input);

    app.logs.add("Sending message...");
    app.chat_scroll = u16::MAX;

    let chat = app.chat.clone();
    let events = app.events.clone();
    tokio::spawn(async move {
        if let Err(e) = chat.send(&text).await {
            log::debug!("Send dropped: {}", e);
        }
        let _ = events.send(AppEvent::ChatFinished);
    });
}

fn submit_token(app: &mut App) {
    let token = std::mem::take(&mut app.token_input);
    let token = token.trim();
    if token.is_empty() {
        return;
    }
    let Some(api) = app.api.clone() else {
        app.logs.add("No API configured, token not stored");
        return;
    };

    match api.set_token(token) {
        Ok(()) => {
            app.login_required = false;
            app.status_line.clear_notice();
            app.logs.add("Token stored");
            app.navigate(View::Chat);
            refresh(app);
        }
        Err(e) => {
            log::error!("Failed to store token: {}", e);
            app.logs.add(format!("Failed to store token: {}", e));
        }
    }
}

fn submit_api_key(app: &mut App) {
    let key = std::mem::take(&mut app.key_input);
    let key = key.trim();
    if key.is_empty() {
        return;
    }

    let provider = app.profile.as_ref().map(|p| p.provider).unwrap_or_default();
    app.logs.add(format!("Storing {} key", provider.as_str()));
    update_settings(app, SettingsUpdate::with_key(provider, key));
    app.navigate(View::Account);
}

fn sign_out(app: &mut App) {
    let Some(api) = app.api.clone() else {
        return;
    };

    match api.clear_token() {
        Ok(()) => {
            app.profile = None;
            app.billing = None;
            app.sessions.clear();
            app.checkout_url = None;
            app.logs.add("Signed out");
            app.navigate(View::Login);
        }
        Err(e) => {
            log::error!("Failed to clear token: {}", e);
            app.logs.add(format!("Failed to sign out: {}", e));
        }
    }
}

/// Reloads profile, sessions and billing usage in the background.
pub fn refresh(app: &mut App) {
    let Some(api) = app.api.clone() else {
        app.logs.add("No API configured, running offline");
        return;
    };
    app.logs.add("Refreshing account data...");

    let events = app.events.clone();
    tokio::spawn(async move {
        let _ = events.send(AppEvent::ProfileLoaded(api.me().await));
        let _ = events.send(AppEvent::SessionsLoaded(api.sessions().await));
        let _ = events.send(AppEvent::UsageLoaded(api.usage().await));
    });
}

fn upgrade(app: &mut App) {
    let Some(api) = app.api.clone() else {
        return;
    };
    app.logs.add("Requesting upgrade checkout...");

    let events = app.events.clone();
    tokio::spawn(async move {
        let _ = events.send(AppEvent::UpgradeLoaded(api.upgrade().await));
    });
}

fn update_settings(app: &mut App, update: SettingsUpdate) {
    let Some(api) = app.api.clone() else {
        return;
    };
    app.logs.add("Updating settings...");

    let events = app.events.clone();
    tokio::spawn(async move {
        let _ = events.send(AppEvent::ProfileLoaded(api.update_settings(&update).await));
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatPanel;
    use crate::{api::ApiClient, token_store::TokenStore};
    use serde_json::json;
    use std::{sync::Arc, time::Duration};
    use tempfile::{tempdir, TempDir};
    use tokio::sync::mpsc::{self, UnboundedReceiver};
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(press(KeyCode::Char(c)), app).await;
        }
    }

    fn online_app(server: &MockServer) -> (App, UnboundedReceiver<AppEvent>, Arc<ApiClient>, TempDir) {
        let dir = tempdir().unwrap();
        let tokens = TokenStore::new(dir.path().join("auth_token"));
        tokens.save("tok_abc").unwrap();
        let api = Arc::new(ApiClient::new(format!("{}/api", server.uri()), tokens));
        let chat = ChatPanel::new(Some(Arc::clone(&api)))
            .with_settle_delay(Duration::from_millis(50));
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Some(Arc::clone(&api)), chat, tx), rx, api, dir)
    }

    #[tokio::test]
    async fn test_typing_and_enter_sends_offline() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(None, ChatPanel::new(None), tx);

        for c in "hi".chars() {
            handle_key(press(KeyCode::Char(c)), &mut app).await;
        }
        assert_eq!(app.input, "hi");
        handle_key(press(KeyCode::Enter), &mut app).await;
        assert!(app.input.is_empty());

        assert!(matches!(rx.recv().await, Some(AppEvent::ChatFinished)));
        assert_eq!(app.chat.messages().await.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_enter_does_nothing() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(None, ChatPanel::new(None), tx);

        handle_key(press(KeyCode::Char(' ')), &mut app).await;
        handle_key(press(KeyCode::Enter), &mut app).await;

        assert!(rx.try_recv().is_err());
        assert!(app.chat.messages().await.is_empty());
    }

    #[tokio::test]
    async fn test_ctrl_c_then_cancel_returns() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(None, ChatPanel::new(None), tx);
        app.navigate(View::Account);

        handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app,
        )
        .await;
        assert_eq!(app.view, View::QuitConfirm);

        handle_key(press(KeyCode::Char('n')), &mut app).await;
        assert_eq!(app.view, View::Account);

        handle_key(
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            &mut app,
        )
        .await;
        handle_key(press(KeyCode::Char('y')), &mut app).await;
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_enter_while_busy_keeps_draft() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "session_id": "s-1", "content": "ok" }))
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (mut app, mut rx, _api, _dir) = online_app(&server);
        type_text(&mut app, "one").await;
        handle_key(press(KeyCode::Enter), &mut app).await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        type_text(&mut app, "two").await;
        handle_key(press(KeyCode::Enter), &mut app).await;
        assert_eq!(app.input, "two");

        assert!(matches!(rx.recv().await, Some(AppEvent::ChatFinished)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_api_key_entry_patches_provider_key() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/auth/settings"))
            .and(body_json(json!({ "anthropic_key": "sk-ant-1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Settings updated",
                "user": { "id": "user_1", "provider": "anthropic", "key_mode": "byok" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (mut app, mut rx, _api, _dir) = online_app(&server);
        app.profile = Some(crate::models::Profile {
            provider: crate::models::LlmProvider::Anthropic,
            ..Default::default()
        });
        app.navigate(View::Account);

        handle_key(press(KeyCode::Char('k')), &mut app).await;
        assert_eq!(app.view, View::ApiKey);
        type_text(&mut app, "sk-ant-1").await;
        handle_key(press(KeyCode::Enter), &mut app).await;

        assert_eq!(app.view, View::Account);
        assert!(app.key_input.is_empty());
        match rx.recv().await {
            Some(AppEvent::ProfileLoaded(Ok(profile))) => {
                assert_eq!(profile.key_mode, crate::models::KeyMode::Byok)
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sign_out_clears_token() {
        let server = MockServer::start().await;
        let (mut app, _rx, api, _dir) = online_app(&server);
        assert!(api.is_authenticated());
        app.navigate(View::Account);

        handle_key(press(KeyCode::Char('o')), &mut app).await;

        assert!(!api.is_authenticated());
        assert!(app.profile.is_none());
        assert_eq!(app.view, View::Login);
    }
}
