use crate::orb::{OrbVisual, Rgb};
use ratatui::{
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle},
        Block,
    },
    Frame,
};

const BASE_RADIUS: f64 = 0.55;
const RINGS: usize = 4;

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Draws the orb centred in `area`. A zero-sized area draws nothing.
pub fn draw_orb(f: &mut Frame<'_>, area: Rect, orb: &OrbVisual, elapsed_secs: f64) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let frame = orb.frame(elapsed_secs);
    let radius = BASE_RADIUS * frame.scale;
    let core = to_color(frame.color);
    let glow = to_color(frame.glow);

    // Terminal cells are about twice as tall as wide
    let aspect = (area.width as f64) / (area.height as f64 * 2.0);
    let x_bound = aspect.max(1.0);

    let canvas = Canvas::default()
        .block(Block::default().title(format!(" {} ", orb.state().label())))
        .marker(Marker::Braille)
        .x_bounds([-x_bound, x_bound])
        .y_bounds([-1.0, 1.0])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: radius * 1.25,
                color: glow,
            });
            for ring in 0..RINGS {
                ctx.draw(&Circle {
                    x: 0.0,
                    y: 0.0,
                    radius: radius * (1.0 - ring as f64 / RINGS as f64),
                    color: core,
                });
            }
        });

    f.render_widget(canvas, area);
}
