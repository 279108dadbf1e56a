//! Process-wide channel for internal diagnostics.
//!
//! Formatting never fails loudly: malformed templates, depth-limit hits and
//! property accessor failures are reported here instead. The channel is
//! disabled until a sink is installed, and writing to it never panics.
//!
//! ```rust
//! use plume::selflog;
//!
//! selflog::enable(|line| eprintln!("{line}"));
//! plume::selflog!("cache cleared after {} entries", 1000);
//! selflog::disable();
//! ```

use std::io::Write;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};

type Sink = Arc<dyn Fn(&str) + Send + Sync>;

static SINK: Lazy<RwLock<Option<Sink>>> = Lazy::new(|| RwLock::new(None));

/// Installs `sink`, replacing any previous one. Each call receives one
/// complete line prefixed with a UTC timestamp.
pub fn enable<F>(sink: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    *SINK.write() = Some(Arc::new(sink));
}

/// Writes each diagnostic line to `writer`, flushing after every line.
/// I/O errors are ignored.
pub fn enable_writer<W>(writer: W)
where
    W: Write + Send + 'static,
{
    let writer = Mutex::new(writer);
    enable(move |line| {
        let mut w = writer.lock();
        let _ = writeln!(w, "{line}");
        let _ = w.flush();
    });
}

/// Forwards diagnostics to the `log` facade at warn level under the
/// `plume::selflog` target.
pub fn enable_log() {
    enable(|line| log::warn!(target: "plume::selflog", "{line}"));
}

pub fn disable() {
    *SINK.write() = None;
}

pub fn is_enabled() -> bool {
    SINK.read().is_some()
}

/// Emits one diagnostic line. Prefer the [`selflog!`](crate::selflog!) macro,
/// which skips formatting entirely while the channel is disabled.
pub fn write(message: std::fmt::Arguments<'_>) {
    // The lock is released before the sink runs; sinks may log recursively.
    let sink = SINK.read().clone();
    if let Some(sink) = sink {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        sink(&format!("{timestamp} {message}"));
    }
}

/// Reports an internal diagnostic through [`selflog`](crate::selflog).
#[macro_export]
macro_rules! selflog {
    ($($arg:tt)*) => {
        if $crate::selflog::is_enabled() {
            $crate::selflog::write(format_args!($($arg)*));
        }
    };
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Captures diagnostics for the duration of a test.
    pub(crate) fn capture() -> Arc<Mutex<Vec<String>>> {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&lines);
        enable(move |line| sink.lock().push(line.to_string()));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(selflog)]
    fn test_disabled_by_default_writes_nothing() {
        disable();
        assert!(!is_enabled());
        crate::selflog!("nobody hears this");
    }

    #[test]
    #[serial(selflog)]
    fn test_lines_are_timestamped() {
        let lines = testing::capture();
        crate::selflog!("hit {} times", 3);
        disable();

        let lines = lines.lock();
        let line = lines.iter().find(|l| l.ends_with("hit 3 times")).unwrap();
        let (timestamp, message) = line.split_once(' ').unwrap();
        assert!(timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert_eq!(message, "hit 3 times");
    }

    #[test]
    #[serial(selflog)]
    fn test_writer_sink() {
        let file = tempfile::NamedTempFile::new().unwrap();
        enable_writer(file.reopen().unwrap());
        crate::selflog!("to a file");
        disable();

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert!(contents.trim_end().ends_with("to a file"));
    }
}
