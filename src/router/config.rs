//! Router configuration options.

/// Router configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Maximum number of dispatched events kept in the journal. 0 disables it.
    pub max_events: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self { max_events: 100_000 }
    }
}
