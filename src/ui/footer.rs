use crate::app::{App, View};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Paragraph, Wrap},
    Frame,
};

/// Draws the footer with key hints for the active view
pub fn draw_footer(f: &mut Frame<'_>, area: Rect, app: &App) {
    let instructions = match app.view {
        View::Chat => {
            "Enter send · Tab switch view · Ctrl+N new session · Ctrl+R refresh · Esc quit"
        }
        View::Sessions => "Up/Down select · Enter open · r refresh · Tab switch view · Esc back",
        View::Account => {
            "u upgrade · m key mode · p provider · k set key · l login · o sign out · r refresh · Esc back"
        }
        View::Login => "Paste your token and press Enter · Esc cancel",
        View::ApiKey => "Paste your provider key and press Enter · Esc cancel",
        View::QuitConfirm => "Press 'y' to confirm quit or 'n' to cancel.",
    };

    let footer = Paragraph::new(instructions)
        .style(Style::default().fg(Color::LightCyan))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(footer, area);
}
