//! Resume state reconstructed from the output directory.
//!
//! There is no checkpoint file: the part files themselves are the cursor.
//! Their sizes summed in part order give the source offset to continue from.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{Result, SplitError};
use crate::naming::{PartNaming, part_extension};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartInfo {
    pub number: u32,
    pub path: PathBuf,
    pub len: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ResumeState {
    /// Existing parts in numeric order.
    pub parts: Vec<PartInfo>,
    pub resume_offset: u64,
    /// Part the next byte goes into.
    pub current_part: u32,
    /// Bytes already in `current_part` (non-zero only for an interrupted part).
    pub current_part_len: u64,
}

impl ResumeState {
    pub fn is_fresh(&self) -> bool {
        self.parts.is_empty()
    }

    /// Parts that reached the size limit and will not be written again.
    pub fn completed_parts(&self) -> usize {
        if self.continues_last_part() {
            self.parts.len() - 1
        } else {
            self.parts.len()
        }
    }

    /// True when the next write appends to the last existing part.
    pub fn continues_last_part(&self) -> bool {
        self.parts
            .last()
            .is_some_and(|p| p.number == self.current_part)
    }
}

/// List part files in `dir`, ordered by part number.
pub fn list_parts(dir: &Path, naming: &PartNaming) -> Result<Vec<PartInfo>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut parts = Vec::new();
    for e in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        let e = e.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let name = e.file_name().to_string_lossy();
        let Some(number) = naming.parse(&name) else {
            continue;
        };
        let md = fs::metadata(e.path())?;
        if !md.is_file() {
            return Err(SplitError::InconsistentState(format!(
                "{} matches the part naming but is not a regular file",
                e.path().display()
            )));
        }
        parts.push(PartInfo {
            number,
            path: e.path().to_path_buf(),
            len: md.len(),
        });
    }
    parts.sort_by_key(|p| p.number);
    Ok(parts)
}

/// Extension shared by the part files in `dir`.
///
/// `Ok(None)` when `dir` holds no parts; an error when parts with several
/// extensions are mixed.
pub fn detect_extension(dir: &Path) -> Result<Option<String>> {
    if !dir.exists() {
        return Ok(None);
    }
    let mut found: Vec<String> = Vec::new();
    for e in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        let e = e.map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        let name = e.file_name().to_string_lossy();
        if let Some(ext) = part_extension(&name) {
            if !found.iter().any(|f| f == ext) {
                found.push(ext.to_string());
            }
        }
    }
    match found.len() {
        0 => Ok(None),
        1 => Ok(found.pop()),
        _ => {
            found.sort();
            Err(SplitError::InvalidOptions(format!(
                "{} holds parts with several extensions ({}); pick one with --ext",
                dir.display(),
                found.join(", ")
            )))
        }
    }
}

/// Rebuild the resume cursor from `dir`.
///
/// Parts must be numbered `1..=n` without gaps and none may exceed
/// `max_part_bytes`. With `strict`, every part but the last must be full.
pub fn scan(
    dir: &Path,
    naming: &PartNaming,
    max_part_bytes: u64,
    strict: bool,
) -> Result<ResumeState> {
    let parts = list_parts(dir, naming)?;
    check_sequence(&parts)?;

    for (i, p) in parts.iter().enumerate() {
        if p.len > max_part_bytes {
            return Err(SplitError::InconsistentState(format!(
                "{} is {} bytes, above the {} byte part limit",
                p.path.display(),
                p.len,
                max_part_bytes
            )));
        }
        let is_last = i + 1 == parts.len();
        if strict && !is_last && p.len != max_part_bytes {
            return Err(SplitError::InconsistentState(format!(
                "{} is {} bytes but only the last part may be smaller than {} bytes",
                p.path.display(),
                p.len,
                max_part_bytes
            )));
        }
    }

    let resume_offset = parts.iter().map(|p| p.len).sum();
    let (current_part, current_part_len) = match parts.last() {
        None => (1, 0),
        Some(last) if last.len < max_part_bytes => (last.number, last.len),
        Some(last) => (last.number + 1, 0),
    };

    Ok(ResumeState {
        parts,
        resume_offset,
        current_part,
        current_part_len,
    })
}

pub(crate) fn check_sequence(parts: &[PartInfo]) -> Result<()> {
    for (i, p) in parts.iter().enumerate() {
        let expected = i as u32 + 1;
        if p.number != expected {
            return Err(SplitError::InconsistentState(format!(
                "expected part {expected}, found {} ({})",
                p.number,
                p.path.display()
            )));
        }
    }
    Ok(())
}
