use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SplitError};
use crate::naming::PartNaming;

pub const MIB: u64 = 1024 * 1024;

/// Default maximum size of one part (500 MiB).
pub const DEFAULT_MAX_PART_BYTES: u64 = 500 * MIB;
/// Default read/write unit (8 MiB).
pub const DEFAULT_BLOCK_SIZE: usize = 8 * MIB as usize;
pub const DEFAULT_PAD_WIDTH: usize = 2;
pub const DEFAULT_ERROR_LOG: &str = "errors.log";
const FALLBACK_EXTENSION: &str = "part";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SplitOptions {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub max_part_bytes: u64,
    pub block_size: usize,
    /// Part file extension. `None` reuses the source's extension.
    pub extension: Option<String>,
    /// Minimum digit count of the part number.
    pub pad_width: usize,
    /// Defaults to `errors.log` inside the output directory.
    pub error_log: Option<PathBuf>,
    /// Require every part except the last to be exactly `max_part_bytes`.
    pub strict_resume: bool,
}

impl SplitOptions {
    pub fn new(source: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output_dir: output_dir.into(),
            max_part_bytes: DEFAULT_MAX_PART_BYTES,
            block_size: DEFAULT_BLOCK_SIZE,
            extension: None,
            pad_width: DEFAULT_PAD_WIDTH,
            error_log: None,
            strict_resume: true,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_part_bytes == 0 {
            return Err(SplitError::InvalidOptions(
                "max part size must be greater than zero".into(),
            ));
        }
        if self.block_size == 0 {
            return Err(SplitError::InvalidOptions(
                "block size must be greater than zero".into(),
            ));
        }
        if !(1..=9).contains(&self.pad_width) {
            return Err(SplitError::InvalidOptions(format!(
                "pad width must be between 1 and 9, got {}",
                self.pad_width
            )));
        }
        validate_extension(&self.effective_extension())
    }

    pub fn effective_extension(&self) -> String {
        extension_or_source(self.extension.as_deref(), Some(&self.source))
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.error_log
            .clone()
            .unwrap_or_else(|| self.output_dir.join(DEFAULT_ERROR_LOG))
    }

    pub fn naming(&self) -> PartNaming {
        PartNaming::new(self.effective_extension(), self.pad_width)
    }
}

/// Resolve the part extension: an explicit one wins, then the source's own
/// extension, then a generic fallback.
pub fn extension_or_source(explicit: Option<&str>, source: Option<&Path>) -> String {
    if let Some(ext) = explicit {
        return ext.trim_start_matches('.').to_string();
    }
    source
        .and_then(|p| p.extension())
        .map(|e| e.to_string_lossy().to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}

pub(crate) fn validate_extension(ext: &str) -> Result<()> {
    if ext.is_empty() {
        return Err(SplitError::InvalidOptions(
            "part extension must not be empty".into(),
        ));
    }
    if ext.contains(['/', '\\']) {
        return Err(SplitError::InvalidOptions(format!(
            "part extension must not contain path separators: {ext}"
        )));
    }
    Ok(())
}
