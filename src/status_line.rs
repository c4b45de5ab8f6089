use crate::orb::{OrbState, OrbUniforms, Rgb};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const THINKING_FRAMES: [&str; 4] = ["◐", "◓", "◑", "◒"];
const SPEAKING_FRAMES: [&str; 2] = ["●", "◉"];

/// One-row status under the chat transcript. Follows the orb state; a notice
/// (login required, upgrade messages) takes the row until cleared.
#[derive(Debug, Default)]
pub struct StatusLine {
    orb_state: OrbState,
    notice: Option<String>,
    frame: usize,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sync(&mut self, state: OrbState) {
        self.orb_state = state;
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    pub fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    pub fn line(&self) -> Line<'static> {
        let accent = Style::default().fg(orb_color(self.orb_state));

        if let Some(notice) = &self.notice {
            return Line::from(vec![
                Span::styled("! ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    notice.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]);
        }

        let (glyph, label) = match self.orb_state {
            OrbState::Idle => return Line::from(""),
            OrbState::Thinking => (
                THINKING_FRAMES[self.frame % THINKING_FRAMES.len()],
                "thinking...",
            ),
            OrbState::Speaking => (
                SPEAKING_FRAMES[(self.frame / 4) % SPEAKING_FRAMES.len()],
                "transmitting",
            ),
        };

        Line::from(vec![
            Span::styled(glyph, accent),
            Span::raw(" "),
            Span::styled(label, Style::default().fg(Color::DarkGray)),
        ])
    }

    pub fn render(&self, f: &mut Frame<'_>, area: Rect) {
        if area.height == 0 {
            return;
        }
        f.render_widget(Paragraph::new(self.line()), Rect { height: 1, ..area });
    }
}

fn orb_color(state: OrbState) -> Color {
    let Rgb(r, g, b) = OrbUniforms::for_state(state).color;
    Color::Rgb(r, g, b)
}
