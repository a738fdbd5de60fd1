use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};

/// The single open destination handle of a split.
pub struct PartWriter {
    f: File,
    path: PathBuf,
    number: u32,
    len: u64,
}

impl PartWriter {
    /// Reopen an interrupted part; writes land after `existing_len` bytes.
    pub fn open_append(path: &Path, number: u32, existing_len: u64) -> Result<Self> {
        let f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| SplitError::output(path, e))?;
        Ok(Self {
            f,
            path: path.to_path_buf(),
            number,
            len: existing_len,
        })
    }

    /// Start a fresh part, discarding anything at `path`.
    pub fn create(path: &Path, number: u32) -> Result<Self> {
        let f = File::create(path).map_err(|e| SplitError::output(path, e))?;
        Ok(Self {
            f,
            path: path.to_path_buf(),
            number,
            len: 0,
        })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        self.f
            .write_all(buf)
            .map_err(|e| SplitError::output(&self.path, e))?;
        self.len += buf.len() as u64;
        Ok(())
    }

    /// Flush and sync, then close. Returns the final size.
    pub fn finish(mut self) -> Result<u64> {
        self.f
            .flush()
            .and_then(|_| self.f.sync_all())
            .map_err(|e| SplitError::output(&self.path, e))?;
        Ok(self.len)
    }
}
