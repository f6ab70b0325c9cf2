use std::num::ParseIntError;

/// Settings of the demo, injected into the scope like any other service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// How often the consumer clicks increment
    pub clicks: usize,
    /// Initial count
    pub start: u64,
}
impl Default for DemoConfig {
    fn default() -> Self {
        DemoConfig {
            clicks: 3,
            start: 0,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {variable}: {source}")]
    Invalid {
        variable: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

impl DemoConfig {
    /// Reads `COUNTER_CLICKS` and `COUNTER_START`, falling back to the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|variable| std::env::var(variable).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = DemoConfig::default();
        Ok(DemoConfig {
            clicks: parse_or(&lookup, "COUNTER_CLICKS", defaults.clicks)?,
            start: parse_or(&lookup, "COUNTER_START", defaults.start)?,
        })
    }
}

fn parse_or<T: std::str::FromStr<Err = ParseIntError>>(
    lookup: &impl Fn(&'static str) -> Option<String>,
    variable: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(variable) {
        Some(value) => value.trim().parse().map_err(|source| ConfigError::Invalid {
            variable,
            value,
            source,
        }),
        None => Ok(default),
    }
}
