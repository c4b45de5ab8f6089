// src/ui.rs

pub mod account;
pub mod chat;
pub mod footer;
pub mod header;
pub mod login;
pub mod orb;
pub mod quit_confirm;
pub mod sessions;

use crate::{
    api::ClientEvent,
    app::{App, AppEvent, View},
    errors::{GltchError, GltchResult},
    key_handlers::{handle_key, refresh},
};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::{io, time::Duration};
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Events driving the main loop.
enum Event {
    Input(CEvent),
    Tick,
}

/// Runs the terminal UI until the operator quits.
pub async fn run_ui(
    app: App,
    client_events: UnboundedReceiver<ClientEvent>,
    app_events: UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
) -> GltchResult<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, client_events, app_events, tick_rate).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    mut client_events: UnboundedReceiver<ClientEvent>,
    mut app_events: UnboundedReceiver<AppEvent>,
    tick_rate: Duration,
) -> GltchResult<()> {
    let (tx, mut rx) = mpsc::channel::<Event>(100);

    // crossterm polling blocks, so it gets its own thread
    tokio::task::spawn_blocking(move || loop {
        match event::poll(tick_rate) {
            Ok(true) => {
                let Ok(event) = event::read() else {
                    continue;
                };
                if tx.blocking_send(Event::Input(event)).is_err() {
                    return;
                }
            }
            Ok(false) => {
                if tx.blocking_send(Event::Tick).is_err() {
                    return;
                }
            }
            Err(e) => {
                log::error!("Terminal event polling failed: {}", e);
                return;
            }
        }
    });

    refresh(&mut app);

    loop {
        app.chat_view = app.chat.snapshot().await;
        app.status_line.tick();
        terminal
            .draw(|f| draw(f, &mut app))
            .map_err(|e| GltchError::io_error(format!("Failed to draw frame: {}", e)))?;

        tokio::select! {
            Some(event) = rx.recv() => match event {
                Event::Input(CEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_key(key, &mut app).await;
                }
                Event::Input(_) | Event::Tick => {}
            },
            Some(ClientEvent::LoginRequired) = client_events.recv() => {
                app.require_login();
            }
            Some(event) = app_events.recv() => app.apply(event),
            else => break,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Renders the header, the active view and the footer.
pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(f.area());

    header::draw_header(f, chunks[0], app);

    match app.view {
        View::Chat => chat::draw_chat(f, chunks[1], app),
        View::Sessions => sessions::draw_sessions(f, chunks[1], app),
        View::Account => account::draw_account(f, chunks[1], app),
        View::Login => login::draw_login(f, chunks[1], app),
        View::ApiKey => login::draw_api_key(f, chunks[1], app),
        View::QuitConfirm => {
            chat::draw_chat(f, chunks[1], app);
            quit_confirm::draw_quit_confirm(f, chunks[1]);
        }
    }

    footer::draw_footer(f, chunks[2], app);
}
