//! Tracing/logging initialization for the CLI.

use crate::constants;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Wrapper type to write logs to file or stderr.
struct FileOrStderr {
    file: Option<Mutex<std::fs::File>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FileOrStderr {
    type Writer = Box<dyn std::io::Write + 'a>;

    fn make_writer(&'a self) -> Self::Writer {
        self.file
            .as_ref()
            .and_then(|mutex| mutex.lock().ok())
            .and_then(|file| file.try_clone().ok())
            .map_or_else(
                || Box::new(std::io::stderr()) as Self::Writer,
                |cloned| Box::new(cloned) as Self::Writer,
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Unrecognized values fall back to text; the second element is the
    /// rejected value so the caller can warn about it.
    fn from_env_value(value: Option<&str>) -> (Self, Option<String>) {
        match value.map(str::to_lowercase).as_deref() {
            None | Some("text") => (Self::Text, None),
            Some("json") => (Self::Json, None),
            Some(other) => (Self::Text, Some(other.to_string())),
        }
    }
}

/// Filter directive for a `-v` count, or the `GODESK_LOG` value without one.
///
/// `-v` and `-vv` raise only godesk's own targets; `-vvv` raises everything,
/// the HTTP stack included.
fn filter_directive(verbosity: u8, env_value: Option<&str>) -> String {
    match verbosity {
        0 => env_value.unwrap_or("error").to_string(),
        1 => "warn,godesk=debug".to_string(),
        2 => "warn,godesk=trace".to_string(),
        _ => "trace".to_string(),
    }
}

/// Initialize tracing-subscriber for request/response logging.
pub fn init_tracing(verbosity: u8) {
    let env_level = std::env::var(constants::ENV_GODESK_LOG).ok();
    let directive = filter_directive(verbosity, env_level.as_deref());
    let env_filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("error"));

    let format_var = std::env::var(constants::ENV_GODESK_LOG_FORMAT).ok();
    let (log_format, rejected) = LogFormat::from_env_value(format_var.as_deref());
    if let Some(value) = rejected {
        // Tracing is not yet initialized; eprintln! is the only output channel available.
        eprintln!(
            "Warning: Unrecognized {} '{value}'. Valid values: 'json', 'text'. Using 'text'.",
            constants::ENV_GODESK_LOG_FORMAT
        );
    }

    let writer = std::env::var(constants::ENV_GODESK_LOG_FILE).ok().map_or_else(
        || FileOrStderr { file: None },
        |path| match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => FileOrStderr {
                file: Some(Mutex::new(file)),
            },
            Err(e) => {
                eprintln!("Warning: Could not open log file '{path}': {e}. Using stderr.");
                FileOrStderr { file: None }
            }
        },
    );

    match log_format {
        LogFormat::Json => {
            let json_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_span_list(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(json_layer)
                .init();
        }
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .compact()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(false)
                .with_writer(writer);
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .init();
        }
    }
}
