use crate::{
    app::App,
    chat_message::render_message,
    constants::LIGHT_HORIZONTAL,
    ui::orb::draw_orb,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

pub fn draw_chat(f: &mut Frame<'_>, area: Rect, app: &mut App) {
    let horizontal_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(2, 3), Constraint::Ratio(1, 3)])
        .split(area);

    let chat_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(horizontal_chunks[0]);

    draw_messages(f, app, chat_chunks[0]);
    app.status_line.sync(app.chat_view.orb_state());
    app.status_line.render(f, chat_chunks[1]);
    draw_input(f, app, chat_chunks[2]);

    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(6),
            Constraint::Min(1),
        ])
        .split(horizontal_chunks[1]);

    let elapsed = app.started.elapsed().as_secs_f64();
    draw_orb(f, side_chunks[0], app.chat_view.orb(), elapsed);
    draw_usage(f, app, side_chunks[1]);
    draw_logs(f, app, side_chunks[2]);
}

fn draw_messages(f: &mut Frame<'_>, app: &mut App, area: Rect) {
    let mut lines = Vec::new();
    for message in app.chat_view.messages() {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.extend(render_message(message, area.width));
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Say something, operator.",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let total_lines = saturating_u16(lines.len());
    let max_scroll = total_lines.saturating_sub(area.height);
    app.chat_scroll = app.chat_scroll.min(max_scroll);

    f.render_widget(Paragraph::new(lines).scroll((app.chat_scroll, 0)), area);
}

fn draw_input(f: &mut Frame<'_>, app: &App, area: Rect) {
    if area.height < 3 {
        return;
    }

    let separator = LIGHT_HORIZONTAL.to_string().repeat(area.width as usize);
    let rule = |y| Rect {
        y,
        height: 1,
        ..area
    };
    f.render_widget(
        Paragraph::new(Span::styled(
            separator.clone(),
            Style::default().fg(Color::DarkGray),
        )),
        rule(area.y),
    );

    let input = Line::from(vec![
        Span::styled("→ ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.input.as_str(), Style::default().fg(Color::White)),
    ]);

    let (scroll_offset, cursor_x) = input_cursor(area, app.input.width());

    f.render_widget(Paragraph::new(input).scroll((0, scroll_offset)), rule(area.y + 1));
    f.render_widget(
        Paragraph::new(Span::styled(separator, Style::default().fg(Color::DarkGray))),
        rule(area.y + 2),
    );

    f.set_cursor_position((cursor_x, area.y + 1));
}

fn saturating_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Horizontal scroll for the input row and the cursor column after the text.
fn input_cursor(area: Rect, input_width: usize) -> (u16, u16) {
    let visible_width = area.width.saturating_sub(2);
    let text_width = saturating_u16(input_width);
    let scroll_offset = text_width.saturating_sub(visible_width);
    let cursor_x = area
        .x
        .saturating_add(2)
        .saturating_add(text_width - scroll_offset);
    (scroll_offset, cursor_x)
}

fn draw_usage(f: &mut Frame<'_>, app: &App, area: Rect) {
    let usage = app.chat_view.usage();
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("tokens  ", label),
            Span::styled(
                format!(
                    "{} ({} in / {} out)",
                    usage.total_tokens(),
                    usage.input_tokens,
                    usage.output_tokens
                ),
                value,
            ),
        ]),
        Line::from(vec![
            Span::styled("cost    ", label),
            Span::styled(format!("${:.4}", usage.cost_usd), value),
        ]),
    ];

    let session = app.chat_view.current_session().unwrap_or("new");
    lines.push(Line::from(vec![
        Span::styled("session ", label),
        Span::styled(session.to_string(), value),
    ]));

    let block = Block::default()
        .borders(Borders::TOP)
        .title(" usage ")
        .border_style(label);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_logs(f: &mut Frame<'_>, app: &App, area: Rect) {
    let log_lines: Vec<Line> = app
        .logs
        .entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled("• ", Style::default().fg(Color::DarkGray)),
                Span::raw(entry.as_str()),
            ])
        })
        .collect();

    // Keep the newest entries in view
    let total = saturating_u16(log_lines.len());
    let inner_height = area.height.saturating_sub(1);
    let scroll = total.saturating_sub(inner_height);

    let block = Block::default()
        .borders(Borders::TOP)
        .title(" activity ")
        .border_style(Style::default().fg(Color::DarkGray));
    let logs_para = Paragraph::new(log_lines)
        .style(Style::default().fg(Color::DarkGray))
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((scroll, 0));
    f.render_widget(logs_para, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ChatPanel;
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    #[test]
    fn test_input_cursor_tracks_text_end() {
        let area = Rect::new(4, 0, 20, 3);
        assert_eq!(input_cursor(area, 5), (0, 11));
        assert_eq!(input_cursor(area, 30), (12, 24));
    }

    #[test]
    fn test_input_cursor_saturates_on_huge_input() {
        let area = Rect::new(10, 0, 40, 3);
        let (scroll, cursor_x) = input_cursor(area, 200_000);
        assert_eq!(scroll, u16::MAX - 38);
        assert_eq!(cursor_x, 50);
    }

    #[test]
    fn test_huge_paste_renders() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(None, ChatPanel::new(None), tx);
        app.input = "x".repeat(70_000);

        let mut terminal = Terminal::new(TestBackend::new(40, 3)).unwrap();
        terminal.draw(|f| draw_input(f, &app, f.area())).unwrap();
    }
}
