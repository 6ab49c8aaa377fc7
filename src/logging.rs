/// Logger setup.
///
/// The terminal sits in the alternate screen while the simulation runs, so
/// nothing may be written to stderr until it is restored. Records go to the
/// log file when one is configured. Without one, warnings and errors are
/// held in memory and printed after cleanup.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// In-memory log target, shared between the logger and `main`.
#[derive(Clone, Default)]
pub struct LogBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    /// Move everything buffered so far into `out`.
    pub fn drain_to(&self, out: &mut dyn Write) -> io::Result<()> {
        let taken = match self.bytes.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(_) => return Ok(()),
        };
        out.write_all(&taken)?;
        out.flush()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self.bytes.lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log buffer poisoned"))?;
        guard.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Initializes the global logger.
///
/// With a log file, `verbose` selects debug over info. Without one only
/// warnings are kept, buffered in the returned `LogBuffer`. `RUST_LOG`
/// overrides either default.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Option<LogBuffer> {
    let file = log_file.map(|p| File::create(p).map_err(|e| (p, e)));

    let (level, target, buffer, open_err) = match file {
        Some(Ok(f)) => {
            let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
            (level, Target::Pipe(Box::new(f)), None, None)
        }
        other => {
            let buffer = LogBuffer::default();
            let open_err = match other {
                Some(Err((p, e))) => Some(format!("cannot open log file {}: {e}", p.display())),
                _ => None,
            };
            (LevelFilter::Warn, Target::Pipe(Box::new(buffer.clone())), Some(buffer), open_err)
        }
    };

    let env = Env::default().default_filter_or(level.to_string());
    let mut builder = Builder::from_env(env);
    builder.target(target);

    // `try_init` only fails if a logger was already set. Ignore that case so
    // tests can call `init` multiple times without panicking.
    let _ = builder.try_init();

    if let Some(msg) = open_err {
        log::warn!("{msg}");
    }
    buffer
}
