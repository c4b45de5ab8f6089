// UI Constants
pub const HEAVY_HORIZONTAL: char = '━';
pub const LIGHT_HORIZONTAL: char = '─';

pub const APP_NAME: &str = "gltch";
pub const APP_TITLE: &str = "GLTCH Cloud";

// API Constants
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
pub const GENERIC_REQUEST_ERROR: &str = "Request failed";

// Storage
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const TOKEN_FILE_NAME: &str = "auth_token";
pub const LOG_FILE_BASENAME: &str = "gltch";

// Timing
pub const DEFAULT_SPEAKING_SETTLE_MS: u64 = 1500;
pub const DEFAULT_TICK_RATE_MS: u64 = 50;

pub const LOG_VIEW_CAPACITY: usize = 200;
pub const LOADING_PLACEHOLDER: &str = "…";

/// Replies shown when the API is missing or a request fails.
pub const FALLBACK_RESPONSES: &[&str] = &[
    "Signal's weak, operator. The uplink dropped but I'm still here. Try again in a moment.",
    "Copy that. Running on local reserves right now, so keep it simple.",
    "The grid is quiet tonight. I can't reach the core, but I heard you.",
    "Affirmative. Standing by until the connection comes back online.",
    "Static on the line. Say that again once the net stabilizes? 💜",
    "Glitch in the matrix, operator. Feature, not a bug. Give it another shot.",
];
