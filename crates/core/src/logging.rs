//! Log output: every event is written as `[<local time>] <message>` to standard output
//! and appended to the configured log file.

use std::{
    fmt,
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use time::{OffsetDateTime, macros::format_description};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter, format},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::LogConfig;

/// Install the global subscriber: standard output plus the append-only log file.
pub fn init(config: &LogConfig) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(LogLine)
                .with_ansi(false)
                .with_writer(io::stdout)
                .with_filter(env_filter()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(LogLine)
                .with_ansi(false)
                .with_writer(LogFile::new(&config.path))
                .with_filter(env_filter()),
        )
        .init();
}

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        // Default to info level
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}

/// Local wall-clock time as `YYYY-MM-DD HH:MM:SS`.
pub fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .unwrap_or_else(|_| "[invalid]".to_string())
}

/// Event format producing `[<timestamp>] <message> <fields>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLine;

impl<S, N> FormatEvent<S, N> for LogLine
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}] ", timestamp())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Append-only log file. The file is reopened for every write, so concurrent writers
/// rely on `O_APPEND` semantics only.
#[derive(Debug, Clone)]
pub struct LogFile {
    path: Arc<PathBuf>,
}

impl LogFile {
    pub fn new(path: impl AsRef<Path>) -> Self { Self { path: Arc::new(path.as_ref().into()) } }

    pub fn path(&self) -> &Path { &self.path }

    pub fn append(&self, buf: &[u8]) -> io::Result<()> {
        OpenOptions::new().create(true).append(true).open(&*self.path)?.write_all(buf)
    }
}

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogFileWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer { LogFileWriter { file: self } }
}

/// Writer handed out per event. Failures are reported on standard output and swallowed.
pub struct LogFileWriter<'a> {
    file: &'a LogFile,
}

impl Write for LogFileWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Err(e) = self.file.append(buf) {
            println!("Failed to write to log file: {e}");
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}
