use serde::Serialize;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::cancel::CancelFlag;
use crate::error::{Result, SplitError};
use crate::naming::PartNaming;
use crate::resume::{PartInfo, check_sequence, list_parts};

const COPY_BUF: usize = 1 << 20;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JoinReport {
    pub parts: usize,
    pub bytes: u64,
    /// Stopped by the cancel flag; `dest` was left untouched.
    pub cancelled: bool,
}

/// Concatenate the parts in `dir` in part order into `dest`.
///
/// The output is staged in a temporary file next to `dest` and renamed into
/// place once every part is copied, so a failed or cancelled join never
/// leaves a truncated `dest` behind.
pub fn join(
    dir: &Path,
    naming: &PartNaming,
    dest: &Path,
    cancel: &CancelFlag,
) -> Result<JoinReport> {
    let parts = list_parts(dir, naming)?;
    if parts.is_empty() {
        return Err(SplitError::InvalidOptions(format!(
            "no part files named like {} in {}",
            naming.file_name(1),
            dir.display()
        )));
    }
    check_sequence(&parts)?;
    reject_dest_among_parts(dest, &parts)?;

    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| SplitError::output(parent, e))?;

    let mut buf = vec![0u8; COPY_BUF];
    let mut bytes = 0u64;
    for p in &parts {
        let mut f = File::open(&p.path)?;
        loop {
            if cancel.is_cancelled() {
                warn!(part = p.number, bytes, "join cancelled");
                return Ok(JoinReport {
                    parts: parts.len(),
                    bytes,
                    cancelled: true,
                });
            }
            let n = match f.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            tmp.write_all(&buf[..n])
                .map_err(|e| SplitError::output(tmp.path(), e))?;
            bytes += n as u64;
        }
    }
    tmp.as_file()
        .sync_all()
        .map_err(|e| SplitError::output(tmp.path(), e))?;
    tmp.persist(dest)
        .map_err(|e| SplitError::output(dest, e.error))?;

    info!(parts = parts.len(), bytes, dest = %dest.display(), "joined parts");
    Ok(JoinReport {
        parts: parts.len(),
        bytes,
        cancelled: false,
    })
}

/// Writing over one of the inputs would feed the part back into itself.
fn reject_dest_among_parts(dest: &Path, parts: &[PartInfo]) -> Result<()> {
    let Ok(dest) = fs::canonicalize(dest) else {
        // not there yet, so it cannot be a part
        return Ok(());
    };
    for p in parts {
        if fs::canonicalize(&p.path)? == dest {
            return Err(SplitError::InvalidOptions(format!(
                "join destination {} is one of the parts",
                dest.display()
            )));
        }
    }
    Ok(())
}
