//! Part file names: `part_<NN>.<ext>`.
//!
//! Numbers are 1-based and padded to at least `pad_width` digits. Wider
//! numbers are printed as-is, so ordering always goes through [`PartNaming::parse`]
//! and never through a lexicographic sort of file names.

const PREFIX: &str = "part_";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartNaming {
    extension: String,
    pad_width: usize,
}

impl PartNaming {
    pub fn new(extension: impl Into<String>, pad_width: usize) -> Self {
        Self {
            extension: extension.into(),
            pad_width,
        }
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn file_name(&self, number: u32) -> String {
        format!(
            "{PREFIX}{number:0width$}.{ext}",
            width = self.pad_width,
            ext = self.extension
        )
    }

    /// Returns the part number if `name` is a part file under this naming.
    pub fn parse(&self, name: &str) -> Option<u32> {
        let rest = name.strip_prefix(PREFIX)?;
        let digits = rest
            .strip_suffix(self.extension.as_str())?
            .strip_suffix('.')?;
        if digits.len() < self.pad_width || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        match digits.parse::<u32>() {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(n),
        }
    }
}

/// Extension of any `part_<digits>.<ext>` name, whatever its padding.
pub fn part_extension(name: &str) -> Option<&str> {
    let (digits, ext) = name.strip_prefix(PREFIX)?.split_once('.')?;
    if digits.is_empty() || ext.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(ext)
}
