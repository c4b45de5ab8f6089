use crate::app::App;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw_login(f: &mut Frame<'_>, area: Rect, app: &App) {
    let heading = if app.login_required {
        "Your session expired. Paste a fresh API token."
    } else {
        "Paste an API token from the GLTCH Cloud dashboard."
    };
    draw_masked_entry(f, area, " Login ", heading, "token", &app.token_input);
}

pub fn draw_api_key(f: &mut Frame<'_>, area: Rect, app: &App) {
    let provider = app.profile.as_ref().map(|p| p.provider).unwrap_or_default();
    let heading = format!("Paste your {} key. It is sent once and never shown.", provider.as_str());
    draw_masked_entry(f, area, " API Key ", &heading, provider.as_str(), &app.key_input);
}

/// Centered single-field panel; the secret is echoed as bullets only.
fn draw_masked_entry(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    heading: &str,
    label: &str,
    secret: &str,
) {
    let [panel] = Layout::vertical([Constraint::Length(7)])
        .flex(Flex::Center)
        .areas(area);
    let [panel] = Layout::horizontal([Constraint::Percentage(70)])
        .flex(Flex::Center)
        .areas(panel);

    let masked = "•".repeat(secret.chars().count());
    let lines = vec![
        Line::from(Span::styled(
            heading.to_string(),
            Style::default().fg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{} → ", label), Style::default().fg(Color::DarkGray)),
            Span::styled(masked, Style::default().fg(Color::White)),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(Style::default().fg(Color::LightMagenta));

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        panel,
    );
}
