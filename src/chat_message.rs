use crate::models::{Message, Role};
use chrono::Local;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use textwrap::wrap;
use unicode_width::UnicodeWidthStr;

const GUTTER: &str = "│ ";

/// Renders one chat message into styled lines for a column `width` cells wide.
pub fn render_message(message: &Message, width: u16) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let style = base_style(message);
    let indent = if message.is_user() { "  " } else { "" };

    render_header(&mut lines, message, style, indent);
    render_content(&mut lines, message, width, style, indent);
    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("╰─".to_string(), style),
    ]));

    lines
}

fn base_style(message: &Message) -> Style {
    let style = Style::default().fg(match message.role {
        Role::User => Color::Rgb(255, 223, 128),
        Role::Assistant => Color::Rgb(144, 238, 144),
    });
    if message.pending {
        style.add_modifier(Modifier::DIM)
    } else {
        style
    }
}

fn render_header(lines: &mut Vec<Line<'static>>, message: &Message, style: Style, indent: &str) {
    let timestamp = message
        .timestamp
        .with_timezone(&Local)
        .format("%H:%M")
        .to_string();
    let who = match message.role {
        Role::User => "you",
        Role::Assistant => "gltch",
    };
    let status_icon = if message.pending { "○" } else { "●" };

    lines.push(Line::from(vec![
        Span::styled(indent.to_string(), style),
        Span::styled("┌─".to_string(), style),
        Span::styled(who.to_string(), style.add_modifier(Modifier::BOLD)),
        Span::styled(" ", style),
        Span::styled(timestamp, style.add_modifier(Modifier::DIM)),
        Span::styled(" ", style),
        Span::styled(status_icon.to_string(), style),
    ]));
}

fn render_content(
    lines: &mut Vec<Line<'static>>,
    message: &Message,
    width: u16,
    style: Style,
    indent: &str,
) {
    let mut in_code_block = false;
    let mut code_buffer = String::new();
    let mut text_buffer = String::new();

    for line in message.content.lines() {
        if line.trim().starts_with("```") {
            flush_text_buffer(lines, &text_buffer, width, style, indent);
            flush_code_buffer(lines, &code_buffer, style, indent);
            text_buffer.clear();
            code_buffer.clear();
            in_code_block = !in_code_block;
            continue;
        }

        let buffer = if in_code_block {
            &mut code_buffer
        } else {
            &mut text_buffer
        };
        buffer.push_str(line);
        buffer.push('\n');
    }

    flush_text_buffer(lines, &text_buffer, width, style, indent);
    flush_code_buffer(lines, &code_buffer, style, indent);
}

fn flush_text_buffer(
    lines: &mut Vec<Line<'static>>,
    buffer: &str,
    width: u16,
    style: Style,
    indent: &str,
) {
    if buffer.is_empty() {
        return;
    }

    let prefix_width = indent.width() + GUTTER.width();
    let wrap_width = (width as usize).saturating_sub(prefix_width).max(1);

    for wrapped_line in wrap(buffer.trim_end(), wrap_width) {
        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled(GUTTER.to_string(), style),
            Span::styled(wrapped_line.to_string(), style),
        ]));
    }
}

fn flush_code_buffer(lines: &mut Vec<Line<'static>>, buffer: &str, style: Style, indent: &str) {
    if buffer.is_empty() {
        return;
    }

    let code_style = Style::default()
        .fg(Color::Rgb(209, 154, 102))
        .add_modifier(Modifier::BOLD);

    for code_line in buffer.lines() {
        lines.push(Line::from(vec![
            Span::styled(indent.to_string(), style),
            Span::styled(GUTTER.to_string(), style),
            Span::styled("▎".to_string(), Style::default().fg(Color::DarkGray)),
            Span::styled(format!(" {}", code_line), code_style),
        ]));
    }
}
