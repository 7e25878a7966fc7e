//! Process-wide logging bootstrap
//!
//! `initialize` must run once, before anything else logs. It registers the
//! `TRACE` level, loads the declarative configuration and installs the global
//! `tracing` subscriber. Any failure is fatal for the process.

pub mod audit;
pub mod config;
pub mod error;
pub mod levels;

use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_appender::rolling::{RollingFileAppender, Rotation as AppenderRotation};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry};

pub use audit::{InvocationRecord, AUDIT_TARGET};
pub use config::{FormatterConfig, HandlerConfig, HandlerKind, LoggingConfig, Rotation};
pub use error::{LoggingError, LoggingResult};
pub use levels::{levels, register_trace_level, LevelRegistry, TRACE_SEVERITY};

/// Default location of the logging configuration.
pub const DEFAULT_LOG_CONFIG: &str = "/etc/columnstore/mcs_cli_log.toml";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Configure process-wide logging from the file at `path`.
pub fn initialize(path: &Path) -> LoggingResult<()> {
    register_trace_level();
    let config = LoggingConfig::load(path)?;
    let subscriber = build_subscriber(&config)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| LoggingError::AlreadyInitialized)?;
    Ok(())
}

/// Build a subscriber with one layer per root handler.
pub fn build_subscriber(
    config: &LoggingConfig,
) -> LoggingResult<impl Subscriber + Send + Sync + 'static> {
    let levels = levels();
    config.validate(levels)?;

    let targets = targets_filter(config, levels)?;
    let mut layers: Vec<BoxedLayer> = Vec::with_capacity(config.root.handlers.len());
    for name in &config.root.handlers {
        let handler = config
            .handlers
            .get(name)
            .ok_or_else(|| LoggingError::UnknownHandler(name.clone()))?;
        let threshold = match &handler.level {
            Some(level) => levels.resolve(level)?,
            None => LevelFilter::TRACE,
        };
        let format = config.formatter_for(handler);
        let layer = match handler.kind {
            HandlerKind::Stderr => fmt_layer(&format, std::io::stderr, threshold, targets.clone()),
            HandlerKind::Stdout => fmt_layer(&format, std::io::stdout, threshold, targets.clone()),
            HandlerKind::File => fmt_layer(
                &format,
                file_writer(name, handler)?,
                threshold,
                targets.clone(),
            ),
        };
        layers.push(layer);
    }

    Ok(tracing_subscriber::registry().with(layers))
}

fn targets_filter(config: &LoggingConfig, levels: &LevelRegistry) -> LoggingResult<Targets> {
    let mut targets = Targets::new().with_default(levels.resolve(&config.root.level)?);
    for (target, level) in &config.loggers {
        targets = targets.with_target(target.clone(), levels.resolve(level)?);
    }
    Ok(targets)
}

fn fmt_layer<W>(
    format: &FormatterConfig,
    writer: W,
    threshold: LevelFilter,
    targets: Targets,
) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(format.ansi)
        .with_target(format.target)
        .with_level(format.level)
        .with_thread_names(format.thread_names);

    if format.timestamps {
        layer.with_filter(threshold).with_filter(targets).boxed()
    } else {
        layer
            .without_time()
            .with_filter(threshold)
            .with_filter(targets)
            .boxed()
    }
}

fn file_writer(name: &str, handler: &HandlerConfig) -> LoggingResult<RollingFileAppender> {
    let path = handler
        .path
        .as_deref()
        .ok_or_else(|| LoggingError::MissingPath(name.to_string()))?;
    let file_name = path
        .file_name()
        .ok_or_else(|| LoggingError::MissingPath(name.to_string()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let rotation = match handler.rotation {
        Rotation::Never => AppenderRotation::NEVER,
        Rotation::Hourly => AppenderRotation::HOURLY,
        Rotation::Daily => AppenderRotation::DAILY,
    };

    RollingFileAppender::builder()
        .rotation(rotation)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)
        .map_err(|e| LoggingError::OpenFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
