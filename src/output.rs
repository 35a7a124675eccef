//! Line-oriented response sink shared by the command reader and the worker.
//!
//! Both threads answer the manager on the same stream, so every response is
//! written and flushed as one whole line under a lock.

use std::fmt::Display;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

type Sink = Box<dyn Write + Send>;

#[derive(Clone)]
pub struct Output {
    sink: Arc<Mutex<Sink>>,
}

impl Output {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// An output that records every line in memory.
    pub fn capture() -> (Self, Captured) {
        let captured = Captured::default();
        (Self::new(captured.clone()), captured)
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        // A writer that panicked mid-line leaves nothing we need to repair.
        self.sink.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Write one response line and flush it.
    pub fn line(&self, text: impl Display) -> io::Result<()> {
        let mut sink = self.lock();
        writeln!(sink, "{text}")?;
        sink.flush()
    }

    pub fn ok(&self) -> io::Result<()> {
        self.line("OK")
    }

    pub fn error(&self, message: impl Display) -> io::Result<()> {
        self.line(format_args!("ERROR {message}"))
    }
}

/// In-memory sink, mostly for tests.
#[derive(Clone, Default)]
pub struct Captured {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Captured {
    fn bytes(&self) -> MutexGuard<'_, Vec<u8>> {
        self.buf.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Remove and return everything written so far, one entry per line.
    pub fn take_lines(&self) -> Vec<String> {
        let mut buf = self.bytes();
        let text = String::from_utf8_lossy(&buf).into_owned();
        buf.clear();
        text.lines().map(str::to_string).collect()
    }
}

impl Write for Captured {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.bytes().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
