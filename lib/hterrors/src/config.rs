//! Check configuration types.

/// Configuration for how rejected responses are digested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConfig {
    /// Maximum number of body bytes read to build the message, `None` for the whole body.
    pub body_limit: Option<usize>,
    /// Whether to drain the unread rest of a rejected body before closing it.
    pub drain: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            body_limit: None,
            drain: true,
        }
    }
}

impl CheckConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> CheckConfigBuilder {
        CheckConfigBuilder::default()
    }
}

/// Builder for [`CheckConfig`].
#[derive(Debug, Clone, Default)]
pub struct CheckConfigBuilder {
    body_limit: Option<usize>,
    drain: Option<bool>,
}

impl CheckConfigBuilder {
    /// Set the maximum number of body bytes read for the message.
    #[must_use]
    pub const fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = Some(limit);
        self
    }

    /// Set whether rejected bodies are drained before being closed.
    #[must_use]
    pub const fn drain(mut self, drain: bool) -> Self {
        self.drain = Some(drain);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> CheckConfig {
        let defaults = CheckConfig::default();
        CheckConfig {
            body_limit: self.body_limit.or(defaults.body_limit),
            drain: self.drain.unwrap_or(defaults.drain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CheckConfig::default();
        assert_eq!(config.body_limit, None);
        assert!(config.drain);
    }

    #[test]
    fn builder_overrides() {
        let config = CheckConfig::builder().body_limit(4096).drain(false).build();

        assert_eq!(config.body_limit, Some(4096));
        assert!(!config.drain);
    }

    #[test]
    fn builder_keeps_defaults() {
        assert_eq!(CheckConfig::builder().build(), CheckConfig::default());
    }
}
