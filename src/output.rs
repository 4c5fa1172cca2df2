//! Dual-sink output for the duplicate report.
//!
//! [`Transcript`] mirrors every write to standard output and to a file, so
//! the saved report is byte-for-byte what the user saw. The file is created
//! (truncated) when the transcript is opened and flushed when it is finished
//! or dropped.

use crate::error::Result;
use std::fs::File;
use std::io::{self, BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writer that sends every buffer to two sinks.
#[derive(Debug)]
pub struct DualWriter<A: Write, B: Write> {
    primary: A,
    mirror: B,
}

impl<A: Write, B: Write> DualWriter<A, B> {
    pub fn new(primary: A, mirror: B) -> Self {
        Self { primary, mirror }
    }

    /// Split back into the two sinks.
    pub fn into_inner(self) -> (A, B) {
        (self.primary, self.mirror)
    }
}

impl<A: Write, B: Write> Write for DualWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.mirror.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.mirror.flush()
    }
}

/// Console + file transcript of one report run.
#[derive(Debug)]
pub struct Transcript {
    sink: DualWriter<Stdout, BufWriter<File>>,
    path: PathBuf,
}

impl Transcript {
    /// Create (or truncate) the transcript file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        debug!(path = %path.display(), "Opened transcript");
        Ok(Self {
            sink: DualWriter::new(io::stdout(), BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush both sinks and close the file.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.sink.flush()?;
        let (_, file) = self.sink.into_inner();
        file.into_inner().map_err(|e| e.into_error())?.sync_all()?;
        info!(path = %self.path.display(), "Transcript saved");
        Ok(self.path)
    }
}

impl Write for Transcript {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}
