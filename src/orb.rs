//! Activity orb: a decorative sphere whose color and pulse follow the
//! assistant's state. This module holds the state machine and the per-frame
//! math; drawing lives in `ui::orb`.

use std::f64::consts::TAU;

/// How far the orb radius swings at full intensity.
const PULSE_AMPLITUDE: f64 = 0.18;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrbState {
    #[default]
    Idle,
    Thinking,
    Speaking,
}

impl OrbState {
    pub fn label(self) -> &'static str {
        match self {
            OrbState::Idle => "idle",
            OrbState::Thinking => "thinking",
            OrbState::Speaking => "speaking",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn scale(self, s: f64) -> Rgb {
        let channel = |c: u8| (c as f64 * s).round().clamp(0.0, 255.0) as u8;
        Rgb(channel(self.0), channel(self.1), channel(self.2))
    }
}

pub const PRIMARY_ACCENT: Rgb = Rgb(255, 45, 149);
pub const SECONDARY_ACCENT: Rgb = Rgb(0, 229, 255);
pub const BASE_ACCENT: Rgb = Rgb(124, 58, 237);

/// Values fed to the renderer for the current state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbUniforms {
    pub intensity: f64,
    pub frequency: f64,
    pub color: Rgb,
}

impl OrbUniforms {
    pub fn for_state(state: OrbState) -> Self {
        match state {
            OrbState::Idle => Self {
                intensity: 0.25,
                frequency: 0.35,
                color: BASE_ACCENT,
            },
            OrbState::Thinking => Self {
                intensity: 0.7,
                frequency: 1.4,
                color: SECONDARY_ACCENT,
            },
            OrbState::Speaking => Self {
                intensity: 1.0,
                frequency: 1.0,
                color: PRIMARY_ACCENT,
            },
        }
    }
}

/// One evaluated animation frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbFrame {
    /// Radius multiplier around 1.0.
    pub scale: f64,
    pub color: Rgb,
    pub glow: Rgb,
}

#[derive(Debug, Clone)]
pub struct OrbVisual {
    state: OrbState,
    uniforms: OrbUniforms,
}

impl Default for OrbVisual {
    fn default() -> Self {
        Self::new()
    }
}

impl OrbVisual {
    pub fn new() -> Self {
        Self {
            state: OrbState::Idle,
            uniforms: OrbUniforms::for_state(OrbState::Idle),
        }
    }

    pub fn set_state(&mut self, state: OrbState) {
        self.state = state;
        self.uniforms = OrbUniforms::for_state(state);
    }

    pub fn state(&self) -> OrbState {
        self.state
    }

    pub fn uniforms(&self) -> OrbUniforms {
        self.uniforms
    }

    /// Evaluates the pulse at `elapsed_secs`; runs every frame whatever the state.
    pub fn frame(&self, elapsed_secs: f64) -> OrbFrame {
        let OrbUniforms {
            intensity,
            frequency,
            color,
        } = self.uniforms;
        let wave = (elapsed_secs * frequency * TAU).sin();
        let brightness = 0.75 + 0.25 * intensity * (wave + 1.0) / 2.0;
        OrbFrame {
            scale: 1.0 + intensity * PULSE_AMPLITUDE * wave,
            color: color.scale(brightness),
            glow: color.scale(0.35 + 0.15 * intensity),
        }
    }
}
