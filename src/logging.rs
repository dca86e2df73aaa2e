//! Opt-in stderr diagnostics.
//!
//! The library itself only emits `tracing` events; embedding callers decide
//! whether and how to subscribe. This module offers the standard setup:
//! human-readable text or JSON records, always on stderr so stdout stays
//! reserved for rendered output.

use tracing::level_filters::LevelFilter;

use crate::config::Profile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Install a global stderr subscriber based on the resolved profile.
///
/// Quiet wins over verbose; debug wins over both. Safe to call more than
/// once: later calls are no-ops if a subscriber is already installed.
pub fn init_from_profile(profile: &Profile) {
    let level = if profile.debug {
        LevelFilter::DEBUG
    } else if profile.quiet {
        LevelFilter::ERROR
    } else if profile.verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    let format = LogFormat::parse(&profile.log_format).unwrap_or_default();
    init(format, level);
}

/// Install a global stderr subscriber with an explicit format and level.
pub fn init(format: LogFormat, level: LevelFilter) {
    match format {
        LogFormat::Json => {
            let _ = tracing_subscriber::fmt()
                .json()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .try_init();
        }
        LogFormat::Text => {
            let _ = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}
