//! Append-only JSONL sink
//!
//! One JSON value per line, flushed per record. Append mode only: the sink
//! never seeks, truncates, or rewrites.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File-backed append-only sink for audit records.
pub struct JsonlSink {
    writer: BufWriter<std::fs::File>,
    path: PathBuf,
}

impl JsonlSink {
    /// Open (creating if needed) the sink file in append mode.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    /// Append one record as a single JSON line and flush it.
    pub fn write_line(&mut self, value: &serde_json::Value) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, value)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    /// Path of the underlying file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
