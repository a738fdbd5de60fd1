use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "psplit: resumable size-bounded file splitter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Part naming shared by every subcommand.
#[derive(Args, Clone, Debug)]
pub struct NamingArgs {
    /// part file extension (defaults to the source's extension, else "part")
    #[arg(long, env = "PSPLIT_EXT")]
    pub ext: Option<String>,
    /// minimum digits in the part number
    #[arg(long, default_value_t = 2)]
    pub pad_width: usize,
}

/// Part size limit; `--max-part-bytes` wins over `--max-part-mib`.
#[derive(Args, Clone, Debug)]
pub struct PartSizeArgs {
    /// maximum part size in MiB
    #[arg(long, env = "PSPLIT_MAX_PART_MIB", default_value_t = 500)]
    pub max_part_mib: u64,
    /// maximum part size in bytes
    #[arg(long)]
    pub max_part_bytes: Option<u64>,
    /// skip the check that every part but the last is full
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a file into numbered parts, resuming from parts already on disk
    Split {
        source: PathBuf,
        output_dir: PathBuf,

        #[command(flatten)]
        size: PartSizeArgs,

        /// read/write block size in MiB
        #[arg(long, env = "PSPLIT_BLOCK_MIB", default_value_t = 8)]
        block_mib: u64,

        /// read/write block size in bytes (wins over --block-mib)
        #[arg(long)]
        block_size: Option<usize>,

        #[command(flatten)]
        naming: NamingArgs,

        /// error log path (defaults to <OUTPUT_DIR>/errors.log)
        #[arg(long, env = "PSPLIT_ERROR_LOG")]
        error_log: Option<PathBuf>,

        /// no progress bar, log lines only
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show the resume state of an output directory without writing
    Status {
        output_dir: PathBuf,

        /// source file, to report how much is left
        #[arg(long)]
        source: Option<PathBuf>,

        #[command(flatten)]
        size: PartSizeArgs,

        #[command(flatten)]
        naming: NamingArgs,

        /// print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Concatenate parts back into one file
    Join {
        output_dir: PathBuf,
        dest: PathBuf,

        #[command(flatten)]
        naming: NamingArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn split_defaults() {
        let cli = Cli::try_parse_from(["psplit", "split", "backup.sql", "out"]).unwrap();
        match cli.command {
            Commands::Split {
                size,
                block_mib,
                block_size,
                naming,
                quiet,
                ..
            } => {
                assert_eq!(size.max_part_mib, 500);
                assert!(size.max_part_bytes.is_none());
                assert_eq!(block_mib, 8);
                assert!(block_size.is_none());
                assert_eq!(naming.pad_width, 2);
                assert!(!quiet);
            }
            _ => panic!("expected split"),
        }
    }
}
