use std::{fmt, sync::Mutex};

/// Where the user is, and a way to send them elsewhere.
pub trait Navigator: Send + Sync + fmt::Debug {
    /// Current location, including any query string.
    fn current(&self) -> String;

    /// Moves to `location`.
    fn navigate(&self, location: &str);

    /// Current location without its query string.
    fn current_path(&self) -> String {
        path_of(&self.current()).to_string()
    }
}

/// Strips the query string and fragment from a location.
#[must_use]
pub fn path_of(location: &str) -> &str {
    location
        .split(['?', '#'])
        .next()
        .filter(|path| !path.is_empty())
        .unwrap_or("/")
}

/// In-memory history stack.
#[derive(Debug)]
pub struct MemoryHistory {
    entries: Mutex<Vec<String>>,
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::starting_at("/")
    }
}

impl MemoryHistory {
    /// History that starts at `/`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History whose first entry is `location`.
    pub fn starting_at(location: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(vec![location.into()]),
        }
    }

    /// Every location visited, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    /// Number of navigations since construction.
    #[must_use]
    pub fn navigation_count(&self) -> usize {
        self.entries().len().saturating_sub(1)
    }
}

impl Navigator for MemoryHistory {
    fn current(&self) -> String {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.last().cloned())
            .unwrap_or_else(|| "/".to_string())
    }

    fn navigate(&self, location: &str) {
        tracing::debug!(to = location, "navigate");
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(location.to_string());
        }
    }
}
