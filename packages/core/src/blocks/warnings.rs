//! De-duplicated diagnostic log shared by the reader, importer and renderer

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct WarningLog {
    entries: Vec<String>,
    seen: HashSet<String>,
}

impl WarningLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning; repeats of an identical message are dropped
    pub fn push(&mut self, message: impl Into<String>) {
        let message = message.into();
        if self.seen.insert(message.clone()) {
            tracing::debug!("{}", message);
            self.entries.push(message);
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        self.entries
    }
}
