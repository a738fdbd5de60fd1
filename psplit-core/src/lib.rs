#![forbid(unsafe_code)]

pub mod cancel;
pub mod errlog;
pub mod error;
pub mod join;
pub mod naming;
pub mod options;
pub mod part;
pub mod progress;
pub mod resume;
pub mod splitter;

// Re-exports: stable API surface
pub use cancel::CancelFlag;
pub use join::{JoinReport, join};
pub use naming::PartNaming;
pub use options::SplitOptions;
pub use progress::{BlockProgress, NoProgress, ProgressSink, TracingProgress};
pub use resume::{PartInfo, ResumeState, scan};
pub use splitter::{SplitOutcome, SplitReport, Splitter};
