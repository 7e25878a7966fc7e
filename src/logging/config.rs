//! Declarative logging configuration
//!
//! ```toml
//! [formatters.default]
//! timestamps = true
//!
//! [handlers.file]
//! kind = "file"
//! path = "/var/log/mariadb/columnstore/mcs_cli.log"
//! level = "TRACE"
//! formatter = "default"
//!
//! [root]
//! level = "TRACE"
//! handlers = ["file"]
//!
//! [loggers]
//! mcs_cli = "TRACE"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::{LoggingError, LoggingResult};
use super::levels::LevelRegistry;

/// Output options of a formatter.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FormatterConfig {
    /// Prefix lines with a timestamp
    pub timestamps: bool,
    /// Show the event target (module path or explicit `target:`)
    pub target: bool,
    /// Show the level
    pub level: bool,
    /// ANSI colors
    pub ansi: bool,
    pub thread_names: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            timestamps: true,
            target: true,
            level: true,
            ansi: false,
            thread_names: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    Stderr,
    Stdout,
    File,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// A log sink with its own threshold.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HandlerConfig {
    pub kind: HandlerKind,
    /// Threshold for this handler (default: everything the root lets through)
    pub level: Option<String>,
    pub formatter: Option<String>,
    /// Log file, required for `kind = "file"`
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub rotation: Rotation,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RootConfig {
    #[serde(default = "default_root_level")]
    pub level: String,
    pub handlers: Vec<String>,
}

fn default_root_level() -> String {
    "WARNING".to_string()
}

/// Mapping of named handlers and formatters onto the root logger.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default)]
    pub formatters: BTreeMap<String, FormatterConfig>,
    #[serde(default)]
    pub handlers: BTreeMap<String, HandlerConfig>,
    pub root: RootConfig,
    /// Per-target level overrides, e.g. `mcs_cli = "TRACE"`
    #[serde(default)]
    pub loggers: BTreeMap<String, String>,
}

impl LoggingConfig {
    /// Load from a TOML file. A missing file is an error, not a default.
    pub fn load(path: &Path) -> LoggingResult<Self> {
        if !path.is_file() {
            return Err(LoggingError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| LoggingError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Parse TOML content; `origin` only labels errors.
    pub fn parse(content: &str, origin: &Path) -> LoggingResult<Self> {
        let mut config: Self = toml::from_str(content).map_err(|e| LoggingError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        config.expand_paths();
        Ok(config)
    }

    fn expand_paths(&mut self) {
        for handler in self.handlers.values_mut() {
            if let Some(path) = handler.path.as_mut() {
                let expanded = shellexpand::full(&path.to_string_lossy())
                    .map(|s| s.into_owned())
                    .unwrap_or_else(|_| path.to_string_lossy().into_owned());
                *path = PathBuf::from(expanded);
            }
        }
    }

    /// Check every cross reference and level name.
    pub fn validate(&self, levels: &LevelRegistry) -> LoggingResult<()> {
        levels.resolve(&self.root.level)?;
        for level in self.loggers.values() {
            levels.resolve(level)?;
        }
        for name in &self.root.handlers {
            if !self.handlers.contains_key(name) {
                return Err(LoggingError::UnknownHandler(name.clone()));
            }
        }
        for (name, handler) in &self.handlers {
            if let Some(level) = &handler.level {
                levels.resolve(level)?;
            }
            if let Some(formatter) = &handler.formatter {
                if !self.formatters.contains_key(formatter) {
                    return Err(LoggingError::UnknownFormatter {
                        handler: name.clone(),
                        formatter: formatter.clone(),
                    });
                }
            }
            if handler.kind == HandlerKind::File && handler.path.is_none() {
                return Err(LoggingError::MissingPath(name.clone()));
            }
        }
        Ok(())
    }

    /// Formatter for a handler, falling back to the default options.
    pub fn formatter_for(&self, handler: &HandlerConfig) -> FormatterConfig {
        handler
            .formatter
            .as_ref()
            .and_then(|name| self.formatters.get(name))
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[formatters.plain]
timestamps = false
target = false

[handlers.console]
kind = "stderr"
level = "INFO"
formatter = "plain"

[handlers.file]
kind = "file"
path = "/tmp/mcs_cli.log"
level = "TRACE"

[root]
level = "TRACE"
handlers = ["console", "file"]

[loggers]
mcs_cli = "TRACE"
"#;

    fn registry_with_trace() -> LevelRegistry {
        let registry = LevelRegistry::with_standard_levels();
        registry.register("TRACE", 5);
        registry
    }

    #[test]
    fn given_sample_when_parsing_then_all_sections_present() {
        let config = LoggingConfig::parse(SAMPLE, Path::new("sample")).expect("parse");
        assert_eq!(config.root.handlers, vec!["console", "file"]);
        assert_eq!(config.handlers["file"].kind, HandlerKind::File);
        assert_eq!(config.handlers["file"].rotation, Rotation::Never);
        assert_eq!(config.loggers["mcs_cli"], "TRACE");
        config.validate(&registry_with_trace()).expect("valid");
    }

    #[test]
    fn given_trace_not_registered_when_validating_then_unknown_level() {
        let config = LoggingConfig::parse(SAMPLE, Path::new("sample")).expect("parse");
        let result = config.validate(&LevelRegistry::with_standard_levels());
        assert!(matches!(result, Err(LoggingError::UnknownLevel(l)) if l == "TRACE"));
    }

    #[test]
    fn given_formatter_reference_when_resolving_then_uses_named_formatter() {
        let config = LoggingConfig::parse(SAMPLE, Path::new("sample")).expect("parse");
        let console = config.formatter_for(&config.handlers["console"]);
        assert!(!console.timestamps);
        let file = config.formatter_for(&config.handlers["file"]);
        assert_eq!(file, FormatterConfig::default());
    }

    #[test]
    fn given_undefined_handler_when_validating_then_error() {
        let content = r#"
[root]
level = "INFO"
handlers = ["syslog"]
"#;
        let config = LoggingConfig::parse(content, Path::new("x")).expect("parse");
        let result = config.validate(&registry_with_trace());
        assert!(matches!(result, Err(LoggingError::UnknownHandler(h)) if h == "syslog"));
    }

    #[test]
    fn given_file_handler_without_path_when_validating_then_error() {
        let content = r#"
[handlers.file]
kind = "file"

[root]
handlers = ["file"]
"#;
        let config = LoggingConfig::parse(content, Path::new("x")).expect("parse");
        assert!(matches!(
            config.validate(&registry_with_trace()),
            Err(LoggingError::MissingPath(_))
        ));
    }

    #[test]
    fn given_unknown_formatter_when_validating_then_error() {
        let content = r#"
[handlers.console]
kind = "stdout"
formatter = "json"

[root]
handlers = ["console"]
"#;
        let config = LoggingConfig::parse(content, Path::new("x")).expect("parse");
        assert!(matches!(
            config.validate(&registry_with_trace()),
            Err(LoggingError::UnknownFormatter { .. })
        ));
    }

    #[test]
    fn given_malformed_toml_when_parsing_then_parse_error() {
        let result = LoggingConfig::parse("[root\nlevel=", Path::new("broken.toml"));
        assert!(matches!(result, Err(LoggingError::Parse { .. })));
    }

    #[test]
    fn given_missing_file_when_loading_then_not_found() {
        let result = LoggingConfig::load(Path::new("/nonexistent/mcs_cli_log.toml"));
        assert!(matches!(result, Err(LoggingError::NotFound(_))));
    }

    #[test]
    fn given_tilde_in_file_path_when_parsing_then_expanded() {
        let content = r#"
[handlers.file]
kind = "file"
path = "~/mcs_cli.log"

[root]
handlers = ["file"]
"#;
        let config = LoggingConfig::parse(content, Path::new("x")).expect("parse");
        let path = config.handlers["file"].path.clone().expect("path");
        assert!(!path.to_string_lossy().starts_with('~'));
    }
}
