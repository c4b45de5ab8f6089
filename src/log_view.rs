use crate::constants::LOG_VIEW_CAPACITY;
use chrono::Local;
use std::collections::VecDeque;

/// Recent activity shown in the side panel. Oldest entries drop off first.
#[derive(Debug, Default)]
pub struct LogView {
    pub entries: VecDeque<String>,
}

impl LogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, entry: impl Into<String>) {
        let entry = format!("{} {}", Local::now().format("%H:%M:%S"), entry.into());
        self.entries.push_back(entry);
        if self.entries.len() > LOG_VIEW_CAPACITY {
            self.entries.pop_front();
        }
    }
}
