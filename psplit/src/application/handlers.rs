use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, warn};

use psplit_core::error::{Result, SplitError};
use psplit_core::options::{MIB, extension_or_source};
use psplit_core::resume::detect_extension;
use psplit_core::progress::{ProgressSink, TracingProgress, human_bytes};
use psplit_core::{
    CancelFlag, PartInfo, PartNaming, SplitOptions, SplitOutcome, Splitter, errlog, join, scan,
};

use super::EXIT_CANCELLED;
use crate::presentation::cli::{NamingArgs, PartSizeArgs};
use crate::presentation::console::ConsoleProgress;

fn max_part_bytes(size: &PartSizeArgs) -> u64 {
    size.max_part_bytes
        .unwrap_or_else(|| size.max_part_mib.saturating_mul(MIB))
}

/// `--ext` wins, then the source's extension, then whatever extension the
/// parts already in `dir` share.
fn naming_from_args(
    naming: &NamingArgs,
    source: Option<&Path>,
    dir: &Path,
) -> Result<PartNaming> {
    let ext = match (&naming.ext, source) {
        (None, None) => match detect_extension(dir)? {
            Some(ext) => ext,
            None => extension_or_source(None, None),
        },
        (ext, source) => extension_or_source(ext.as_deref(), source),
    };
    Ok(PartNaming::new(ext, naming.pad_width))
}

/// Append `err` to the error log. A log failure is reported but never
/// replaces the original error.
fn log_failure(log: &Path, err: &SplitError) {
    error!(error = %err, "split failed");
    if let Err(log_err) = errlog::append_error(log, &err.to_string()) {
        warn!(log = %log.display(), error = %log_err, "could not write error log");
    }
}

#[allow(clippy::too_many_arguments)]
pub fn handle_split(
    source: PathBuf,
    output_dir: PathBuf,
    size: PartSizeArgs,
    block_mib: u64,
    block_size: Option<usize>,
    naming: NamingArgs,
    error_log: Option<PathBuf>,
    quiet: bool,
    cancel: CancelFlag,
) -> Result<ExitCode> {
    let block_size = block_size.unwrap_or_else(|| {
        usize::try_from(block_mib.saturating_mul(MIB)).unwrap_or(usize::MAX)
    });
    let opts = SplitOptions {
        max_part_bytes: max_part_bytes(&size),
        block_size,
        extension: naming.ext,
        pad_width: naming.pad_width,
        error_log,
        strict_resume: !size.lenient,
        ..SplitOptions::new(source, output_dir)
    };
    let log = opts.error_log_path();

    let mut sink: Box<dyn ProgressSink> = if quiet {
        Box::new(TracingProgress)
    } else {
        Box::new(ConsoleProgress::new())
    };

    let report = Splitter::new(opts)
        .with_cancel(cancel)
        .run(sink.as_mut())
        .inspect_err(|e| log_failure(&log, e))?;

    Ok(match report.outcome {
        SplitOutcome::Completed | SplitOutcome::AlreadyComplete => ExitCode::SUCCESS,
        SplitOutcome::Cancelled => ExitCode::from(EXIT_CANCELLED),
    })
}

#[derive(Serialize)]
struct StatusReport<'a> {
    output_dir: &'a Path,
    extension: &'a str,
    parts: &'a [PartInfo],
    resume_offset: u64,
    current_part: u32,
    current_part_len: u64,
    source_len: Option<u64>,
    complete: Option<bool>,
}

pub fn handle_status(
    output_dir: PathBuf,
    source: Option<PathBuf>,
    size: PartSizeArgs,
    naming: NamingArgs,
    json: bool,
) -> Result<ExitCode> {
    let part_naming = naming_from_args(&naming, source.as_deref(), &output_dir)?;
    let state = scan(
        &output_dir,
        &part_naming,
        max_part_bytes(&size),
        !size.lenient,
    )?;
    let source_len = source
        .as_deref()
        .map(|p| std::fs::metadata(p).map_err(|e| SplitError::SourceUnavailable {
            path: p.to_path_buf(),
            source: e,
        }))
        .transpose()?
        .map(|md| md.len());

    let report = StatusReport {
        output_dir: &output_dir,
        extension: part_naming.extension(),
        parts: &state.parts,
        resume_offset: state.resume_offset,
        current_part: state.current_part,
        current_part_len: state.current_part_len,
        source_len,
        complete: source_len.map(|len| state.resume_offset >= len),
    };

    if json {
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        println!("{text}");
        return Ok(ExitCode::SUCCESS);
    }

    for p in &state.parts {
        println!("{:<24} {:>14} bytes  {}", p.path.display(), p.len, human_bytes(p.len));
    }
    println!(
        "{} parts, {} bytes ({})",
        state.parts.len(),
        state.resume_offset,
        human_bytes(state.resume_offset)
    );
    if state.continues_last_part() {
        println!(
            "next run appends to part {:02} at byte {}",
            state.current_part, state.current_part_len
        );
    } else {
        println!("next run starts part {:02}", state.current_part);
    }
    if let Some(len) = source_len {
        let left = len.saturating_sub(state.resume_offset);
        println!("source: {len} bytes, {left} bytes left ({})", human_bytes(left));
    }
    Ok(ExitCode::SUCCESS)
}

pub fn handle_join(
    output_dir: PathBuf,
    dest: PathBuf,
    naming: NamingArgs,
    cancel: CancelFlag,
) -> Result<ExitCode> {
    let part_naming = naming_from_args(&naming, None, &output_dir)?;
    let r = join(&output_dir, &part_naming, &dest, &cancel)?;
    if r.cancelled {
        println!(
            "join cancelled after {}; {} left untouched",
            human_bytes(r.bytes),
            dest.display()
        );
        return Ok(ExitCode::from(EXIT_CANCELLED));
    }
    println!(
        "joined {} parts ({}) into {}",
        r.parts,
        human_bytes(r.bytes),
        dest.display()
    );
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(mib: u64, bytes: Option<u64>) -> PartSizeArgs {
        PartSizeArgs {
            max_part_mib: mib,
            max_part_bytes: bytes,
            lenient: false,
        }
    }

    #[test]
    fn bytes_flag_overrides_mib() {
        assert_eq!(max_part_bytes(&size(500, None)), 500 * 1024 * 1024);
        assert_eq!(max_part_bytes(&size(500, Some(400_000))), 400_000);
    }

    fn naming_args(ext: Option<&str>) -> NamingArgs {
        NamingArgs {
            ext: ext.map(str::to_string),
            pad_width: 2,
        }
    }

    #[test]
    fn extension_is_detected_from_existing_parts() {
        let td = tempfile::tempdir().unwrap();
        std::fs::write(td.path().join("part_01.sql"), b"abc").unwrap();

        let n = naming_from_args(&naming_args(None), None, td.path()).unwrap();
        assert_eq!(n.file_name(1), "part_01.sql");

        let n = naming_from_args(&naming_args(Some("bin")), None, td.path()).unwrap();
        assert_eq!(n.file_name(1), "part_01.bin");

        let n = naming_from_args(&naming_args(None), Some(Path::new("a.csv")), td.path()).unwrap();
        assert_eq!(n.file_name(1), "part_01.csv");
    }

    #[test]
    fn join_ignores_dest_extension() {
        let td = tempfile::tempdir().unwrap();
        let parts = td.path().join("parts");
        std::fs::create_dir(&parts).unwrap();
        std::fs::write(parts.join("part_01.sql"), b"abc").unwrap();
        std::fs::write(parts.join("part_02.sql"), b"de").unwrap();

        let dest = td.path().join("restored.bin");
        let code = handle_join(parts, dest.clone(), naming_args(None), CancelFlag::new());
        assert!(code.is_ok());
        assert_eq!(std::fs::read(dest).unwrap(), b"abcde");
    }

    #[test]
    fn join_with_no_matching_parts_fails() {
        let td = tempfile::tempdir().unwrap();
        std::fs::write(td.path().join("part_01.sql"), b"abc").unwrap();
        let dest = td.path().join("restored.bin");

        let code = handle_join(
            td.path().to_path_buf(),
            dest.clone(),
            naming_args(Some("bin")),
            CancelFlag::new(),
        );
        assert!(matches!(code, Err(SplitError::InvalidOptions(_))));
        assert!(!dest.exists());
    }

    #[test]
    fn split_failure_is_logged() {
        let td = tempfile::tempdir().unwrap();
        let out = td.path().join("out");
        let code = handle_split(
            td.path().join("missing.sql"),
            out.clone(),
            size(1, None),
            1,
            None,
            naming_args(None),
            None,
            true,
            CancelFlag::new(),
        );
        assert!(matches!(code, Err(SplitError::SourceUnavailable { .. })));
        let log = std::fs::read_to_string(out.join("errors.log")).unwrap();
        assert_eq!(log.lines().count(), 1);
        assert!(log.contains("ERROR: source unavailable"));
        assert!(log.contains("missing.sql"));
    }
}
