//! Structured logging for the import service.
//!
//! Service crates log at the configured level while dependencies stay at
//! `warn`. `RUST_LOG`, when set, replaces the whole filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log targets owned by this service.
pub const SERVICE_TARGETS: [&str; 6] = [
    "user_import",
    "api",
    "worker",
    "storage",
    "event_queue",
    "import_core",
];

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one line per event.
    #[default]
    Compact,
    /// One JSON object per event, with source locations.
    Json,
}

impl LogFormat {
    /// Reads a `LOG_JSON` style flag: `1` or `true` selects JSON.
    pub fn from_flag(flag: Option<&str>) -> Self {
        match flag {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Filter that raises the service crates to `level` and keeps everything
/// else at `warn`.
pub fn service_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for target in SERVICE_TARGETS {
        directives.push(',');
        directives.push_str(target);
        directives.push('=');
        directives.push_str(level);
    }
    directives
}

/// Installs the global subscriber.
///
/// Returns false if one was already installed (each test binary may call
/// this more than once).
pub fn init_tracing(filter: &str, format: LogFormat) -> bool {
    let env_filter =
        EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(service_directives("info")));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()
            .is_ok(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(true))
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::info!(filter, ?format, "Logging initialized");
    }
    installed
}

/// Installs the global subscriber from `RUST_LOG` and `LOG_JSON`.
pub fn init_tracing_from_env() -> bool {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| service_directives("info"));
    let format = LogFormat::from_flag(std::env::var("LOG_JSON").ok().as_deref());

    init_tracing(&filter, format)
}
