//! Append-only error log, one line per fatal error:
//! `[YYYY-MM-DD HH:MM:SS] ERROR: <message>`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use time::OffsetDateTime;
use time::macros::format_description;

pub fn format_entry(at: OffsetDateTime, message: &str) -> String {
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let ts = at
        .format(fmt)
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    // keep one entry per line
    let message = message.replace(['\r', '\n'], " ");
    format!("[{ts}] ERROR: {message}\n")
}

pub fn append_error(path: &Path, message: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let mut f = OpenOptions::new().create(true).append(true).open(path)?;
    f.write_all(format_entry(now, message).as_bytes())?;
    f.flush()
}
