//! Named logging levels with numeric severities.
//!
//! Level names used in the logging configuration resolve through a
//! process-wide registry. The standard levels are always present; `TRACE`
//! only exists once the bootstrap registered it.

use std::collections::BTreeMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use tracing::level_filters::LevelFilter;

use super::error::{LoggingError, LoggingResult};

/// Severity of the custom trace level, below `DEBUG`.
pub const TRACE_SEVERITY: u8 = 5;

pub const TRACE: &str = "TRACE";

const STANDARD_LEVELS: [(&str, u8); 7] = [
    ("CRITICAL", 50),
    ("ERROR", 40),
    ("WARNING", 30),
    ("WARN", 30),
    ("INFO", 20),
    ("DEBUG", 10),
    ("NOTSET", 0),
];

/// Registry of level names to numeric severity.
#[derive(Debug)]
pub struct LevelRegistry {
    levels: RwLock<BTreeMap<String, u8>>,
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::with_standard_levels()
    }
}

impl LevelRegistry {
    pub fn with_standard_levels() -> Self {
        let levels = STANDARD_LEVELS
            .iter()
            .map(|(name, severity)| (name.to_string(), *severity))
            .collect();
        Self {
            levels: RwLock::new(levels),
        }
    }

    /// Register `name` with `severity`.
    ///
    /// Registering a name that already exists keeps the first severity and
    /// returns it, so repeated bootstraps within one process are harmless.
    pub fn register(&self, name: &str, severity: u8) -> u8 {
        let mut levels = self.levels.write().unwrap_or_else(PoisonError::into_inner);
        *levels.entry(normalize(name)).or_insert(severity)
    }

    pub fn severity(&self, name: &str) -> Option<u8> {
        let levels = self.levels.read().unwrap_or_else(PoisonError::into_inner);
        levels.get(&normalize(name)).copied()
    }

    /// Resolve a configured level name into a `tracing` filter.
    pub fn resolve(&self, name: &str) -> LoggingResult<LevelFilter> {
        self.severity(name)
            .map(severity_to_filter)
            .ok_or_else(|| LoggingError::UnknownLevel(name.to_string()))
    }
}

/// Map a numeric severity onto the closest `tracing` level.
pub fn severity_to_filter(severity: u8) -> LevelFilter {
    match severity {
        0..=9 => LevelFilter::TRACE,
        10..=19 => LevelFilter::DEBUG,
        20..=29 => LevelFilter::INFO,
        30..=39 => LevelFilter::WARN,
        _ => LevelFilter::ERROR,
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

static LEVELS: OnceLock<LevelRegistry> = OnceLock::new();

/// The process-wide level registry.
pub fn levels() -> &'static LevelRegistry {
    LEVELS.get_or_init(LevelRegistry::with_standard_levels)
}

/// Register the `TRACE` level in the process-wide registry.
pub fn register_trace_level() -> u8 {
    levels().register(TRACE, TRACE_SEVERITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn given_fresh_registry_when_resolving_trace_then_unknown() {
        let registry = LevelRegistry::with_standard_levels();
        assert!(matches!(
            registry.resolve("TRACE"),
            Err(LoggingError::UnknownLevel(_))
        ));
    }

    #[test]
    fn given_trace_registered_twice_when_resolving_then_same_severity() {
        let registry = LevelRegistry::with_standard_levels();
        let first = registry.register("TRACE", TRACE_SEVERITY);
        let second = registry.register("TRACE", TRACE_SEVERITY);
        assert_eq!(first, TRACE_SEVERITY);
        assert_eq!(first, second);
        assert_eq!(registry.resolve("trace").unwrap(), LevelFilter::TRACE);
    }

    #[test]
    fn given_existing_level_when_registering_other_severity_then_first_wins() {
        let registry = LevelRegistry::with_standard_levels();
        assert_eq!(registry.register("DEBUG", 3), 10);
        assert_eq!(registry.severity("DEBUG"), Some(10));
    }

    #[test]
    fn test_trace_is_more_verbose_than_debug() {
        let debug = levels().severity("DEBUG").unwrap();
        assert!(register_trace_level() < debug);
        assert_eq!(register_trace_level(), TRACE_SEVERITY);
    }

    #[rstest]
    #[case(0, LevelFilter::TRACE)]
    #[case(5, LevelFilter::TRACE)]
    #[case(10, LevelFilter::DEBUG)]
    #[case(20, LevelFilter::INFO)]
    #[case(30, LevelFilter::WARN)]
    #[case(40, LevelFilter::ERROR)]
    #[case(50, LevelFilter::ERROR)]
    fn test_severity_to_filter(#[case] severity: u8, #[case] expected: LevelFilter) {
        assert_eq!(severity_to_filter(severity), expected);
    }
}
