use crate::{
    app::App,
    constants::{APP_TITLE, HEAVY_HORIZONTAL},
};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn draw_header(f: &mut Frame<'_>, area: Rect, app: &App) {
    let operator = app
        .profile
        .as_ref()
        .map(|p| p.callsign.as_str())
        .filter(|c| !c.is_empty())
        .unwrap_or("offline");

    let title = Line::from(vec![
        Span::styled(
            format!(" {} ", APP_TITLE),
            Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("· ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.view.title(), Style::default().fg(Color::LightCyan)),
        Span::styled(
            format!("  [{}]", operator),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let rule = Line::from(Span::styled(
        HEAVY_HORIZONTAL.to_string().repeat(area.width as usize),
        Style::default().fg(Color::DarkGray),
    ));

    f.render_widget(
        Paragraph::new(vec![title, rule]).alignment(Alignment::Left),
        area,
    );
}
