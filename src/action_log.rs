use chrono::{DateTime, Local};
use std::collections::VecDeque;

use crate::config::MAX_LOG_MESSAGES;

#[derive(Clone, Debug)]
pub struct LogMessage {
    pub clock_time: DateTime<Local>,
    pub message: String,
}

/// Operator-facing record of the confirmations the panel produced
pub struct ActionLog {
    entries: VecDeque<LogMessage>,
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionLog {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_LOG_MESSAGES),
        }
    }

    pub fn push(&mut self, message: String) {
        let entry = LogMessage {
            clock_time: Local::now(),
            message,
        };

        if self.entries.len() >= MAX_LOG_MESSAGES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogMessage> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&LogMessage> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
