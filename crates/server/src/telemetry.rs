//! Tracing setup for the proxy server.
//!
//! Timestamps are printed in Jakarta time (`YYYY-MM-DD HH:MM:SS GMT+7`). The
//! output format comes from `RUMAH_LOG_FORMAT` (`json` or `pretty`), and the
//! filter from `RUST_LOG` with `info` as the default.

use chrono::{DateTime, FixedOffset, Utc};
use std::fmt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "RUMAH_LOG_FORMAT";

const JAKARTA_OFFSET_SECS: i32 = 7 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    /// Parse a format name; anything unknown is `Pretty`.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }

    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV).map(|v| Self::parse(&v)).unwrap_or_default()
    }
}

/// Timer printing Jakarta local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct JakartaTime;

impl JakartaTime {
    fn render(now: DateTime<Utc>) -> Result<String, fmt::Error> {
        let offset = FixedOffset::east_opt(JAKARTA_OFFSET_SECS).ok_or(fmt::Error)?;
        Ok(now.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S GMT+7").to_string())
    }
}

impl FormatTime for JakartaTime {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(w, "{}", Self::render(Utc::now())?)
    }
}

/// Install the global subscriber.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_timer(JakartaTime);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}
