use std::collections::VecDeque;

use parking_lot::RwLock;

/// Number of locations kept; older entries are dropped first.
pub const HISTORY_LIMIT: usize = 64;

/// Navigation primitive: where we are and how to move somewhere else.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn redirect(&self, path: &str);
}

/// In-memory location history, bounded by [`HISTORY_LIMIT`].
/// The last entry is the current location.
#[derive(Debug, Default)]
pub struct History {
    entries: RwLock<VecDeque<String>>,
}

impl History {
    pub fn new() -> Self { Self::default() }

    pub fn starting_at(path: &str) -> Self {
        Self { entries: RwLock::new(VecDeque::from([path.to_string()])) }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.read().iter().cloned().collect()
    }

    /// How many times `path` was entered within the retained entries.
    pub fn visits(&self, path: &str) -> usize {
        self.entries.read().iter().filter(|p| p.as_str() == path).count()
    }
}

impl Navigator for History {
    fn current_path(&self) -> String {
        self.entries.read().back().cloned().unwrap_or_else(|| "/".to_string())
    }

    fn redirect(&self, path: &str) {
        let mut entries = self.entries.write();
        if entries.len() == HISTORY_LIMIT {
            entries.pop_front();
        }
        entries.push_back(path.to_string());
    }
}
