//! Log sinks: console plus a size-capped rotating file.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Timestamp layout shared by both sinks.
const TIME_FORMAT: &str = "%d.%m.%Y time: %H:%M";

/// Local-time timestamps in [`TIME_FORMAT`].
#[derive(Debug, Clone, Copy, Default)]
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format(TIME_FORMAT))
    }
}

struct RotatingInner {
    path: PathBuf,
    file: File,
    written: u64,
    max_bytes: u64,
}

impl RotatingInner {
    /// Moves the current file to `<path>.1` and starts an empty one.
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;
        std::fs::rename(&self.path, backup_path(&self.path))?;
        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

/// Append-only log file rotated once it would exceed `max_bytes`.
///
/// One backup is kept at `<path>.1`. A single record larger than the cap is
/// still written whole.
#[derive(Clone)]
pub struct RotatingFile {
    inner: Arc<Mutex<RotatingInner>>,
}

impl RotatingFile {
    /// Opens (or creates) the log file at `path` in append mode.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            inner: Arc::new(Mutex::new(RotatingInner {
                path,
                file,
                written,
                max_bytes,
            })),
        })
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;

        let len = buf.len() as u64;
        if inner.written > 0 && inner.written.saturating_add(len) > inner.max_bytes {
            inner.rotate()?;
        }

        inner.file.write_all(buf)?;
        inner.written = inner.written.saturating_add(len);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("log file lock poisoned"))?;
        inner.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RotatingFile {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".1");
    PathBuf::from(name)
}

/// Installs the global subscriber.
///
/// Priority: `RUST_LOG` env var > `--verbose` flag > default (debug for the
/// bot, info for dependencies).
pub fn init(verbose: bool, log_file: &Path, max_bytes: u64) -> io::Result<()> {
    let default_filter = if verbose {
        "debug"
    } else {
        "info,hwbot_core=debug,homework_bot=debug"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let file = RotatingFile::open(log_file, max_bytes)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_target(false)
                .with_writer(io::stderr),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_timer(LocalTime)
                .with_target(false)
                .with_ansi(false)
                .with_writer(file),
        )
        .init();

    Ok(())
}
