use std::time::Duration;

/// Configuration for the matchmaker.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// How long a worker pauses after room creation failed before it
    /// looks at its queue again.
    ///
    /// Default: 100 ms.
    pub retry_delay: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(100),
        }
    }
}
