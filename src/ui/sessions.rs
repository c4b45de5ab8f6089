use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn draw_sessions(f: &mut Frame<'_>, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Sessions ")
        .border_style(Style::default().fg(Color::DarkGray));

    if app.sessions.is_empty() {
        let text = if app.api.is_some() {
            "No sessions yet. Send a message to start one, or press 'r' to refresh."
        } else {
            "Offline: sessions live on the server."
        };
        f.render_widget(
            Paragraph::new(text)
                .style(Style::default().fg(Color::DarkGray))
                .block(block),
            area,
        );
        return;
    }

    let current = app.chat_view.current_session();
    let items: Vec<ListItem> = app
        .sessions
        .iter()
        .map(|session| {
            let marker = if current == Some(session.id.as_str()) {
                "● "
            } else {
                "  "
            };
            let mut spans = vec![
                Span::styled(marker, Style::default().fg(Color::LightMagenta)),
                Span::styled(session.title.clone(), Style::default().fg(Color::White)),
            ];
            if let Some(created_at) = &session.created_at {
                spans.push(Span::styled(
                    format!("  {}", created_at),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            let mut lines = vec![Line::from(spans)];
            if let Some(preview) = session.preview.as_deref().filter(|p| !p.is_empty()) {
                lines.push(Line::from(Span::styled(
                    format!("    {}", preview),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::LightMagenta)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("➤ ");

    let mut state = ListState::default().with_selected(Some(app.selected_session));
    f.render_stateful_widget(list, area, &mut state);
}
