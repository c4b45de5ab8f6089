use crate::{app::App, models::KeyMode};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn draw_account(f: &mut Frame<'_>, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    draw_profile(f, app, chunks[0]);
    draw_billing(f, app, chunks[1]);
}

fn row(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<16}", label), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn draw_profile(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Operator ")
        .border_style(Style::default().fg(Color::DarkGray));

    let lines = match &app.profile {
        Some(profile) => vec![
            row("callsign", profile.callsign.clone()),
            row("email", profile.email.clone()),
            row("tier", format!("{:?}", profile.tier).to_lowercase()),
            row("provider", profile.provider.as_str().to_string()),
            row(
                "key mode",
                match profile.key_mode {
                    KeyMode::Managed => "managed".to_string(),
                    KeyMode::Byok => "bring your own key".to_string(),
                },
            ),
        ],
        None if app.login_required => vec![Line::from(Span::styled(
            "Login required. Press 'l' to enter a token.",
            Style::default().fg(Color::Yellow),
        ))],
        None => vec![Line::from(Span::styled(
            "Not connected.",
            Style::default().fg(Color::DarkGray),
        ))],
    };

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn draw_billing(f: &mut Frame<'_>, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Billing ")
        .border_style(Style::default().fg(Color::DarkGray));

    let mut lines = Vec::new();
    if let Some(usage) = &app.billing {
        let limit = if usage.limits.is_unlimited() {
            "unlimited".to_string()
        } else {
            usage.limits.messages_per_day.to_string()
        };
        lines.push(row(
            "messages today",
            format!("{} / {}", usage.messages_today, limit),
        ));
        lines.push(row("tokens (month)", usage.tokens_this_month.to_string()));
        lines.push(row("providers", usage.limits.providers.join(", ")));
        lines.push(row("features", usage.limits.features.join(", ")));
    } else {
        lines.push(Line::from(Span::styled(
            "No billing data.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let session = app.chat_view.usage();
    lines.push(Line::from(""));
    lines.push(row(
        "this session",
        format!(
            "{} tokens, ${:.4}",
            session.total_tokens(),
            session.cost_usd
        ),
    ));

    if let Some(url) = &app.checkout_url {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Open to upgrade:",
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            url.clone(),
            Style::default().fg(Color::LightCyan),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
