//! Console output for the pipeline report.
//!
//! The report goes to stdout and failure diagnostics to stderr. Tests use
//! `Console::capture()` to collect both streams in memory.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Where the pipeline writes its human-readable report.
pub struct Console {
    out: Box<dyn Write + Send>,
    err: Box<dyn Write + Send>,
}

impl Console {
    /// Console writing to the process's stdout and stderr.
    pub fn stdio() -> Self {
        Self {
            out: Box::new(io::stdout()),
            err: Box::new(io::stderr()),
        }
    }

    /// Console writing to in-memory buffers, plus a handle to read them.
    pub fn capture() -> (Self, CapturedOutput) {
        let captured = CapturedOutput::default();
        let console = Self {
            out: Box::new(SharedBuffer(Arc::clone(&captured.out))),
            err: Box::new(SharedBuffer(Arc::clone(&captured.err))),
        };
        (console, captured)
    }

    /// Writes one line of report output.
    ///
    /// Write failures (e.g. a closed pipe) are ignored.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.out, "{}", text.as_ref());
    }

    /// Writes an empty line followed by a section banner.
    pub fn banner(&mut self, title: &str) {
        self.line("");
        self.line(format!("=== {title} ==="));
    }

    /// Writes one line of diagnostic output.
    pub fn error_line(&mut self, text: impl AsRef<str>) {
        let _ = writeln!(self.err, "{}", text.as_ref());
    }

    /// Flushes both streams.
    pub fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }
}

/// In-memory copy of everything written to a captured console.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    out: Arc<Mutex<Vec<u8>>>,
    err: Arc<Mutex<Vec<u8>>>,
}

impl CapturedOutput {
    /// Everything written to the report stream so far.
    pub fn stdout(&self) -> String {
        read_buffer(&self.out)
    }

    /// Everything written to the diagnostic stream so far.
    pub fn stderr(&self) -> String {
        read_buffer(&self.err)
    }
}

fn read_buffer(buffer: &Mutex<Vec<u8>>) -> String {
    let bytes = buffer.lock().unwrap_or_else(|p| p.into_inner());
    String::from_utf8_lossy(&bytes).into_owned()
}

struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self.0.lock().unwrap_or_else(|p| p.into_inner());
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_separates_streams() {
        let (mut console, captured) = Console::capture();
        console.line("report");
        console.error_line("diagnostic");

        assert_eq!(captured.stdout(), "report\n");
        assert_eq!(captured.stderr(), "diagnostic\n");
    }

    #[test]
    fn test_banner() {
        let (mut console, captured) = Console::capture();
        console.banner("STEP 1");
        assert_eq!(captured.stdout(), "\n=== STEP 1 ===\n");
    }
}
