//! Orchestration of a single magnet-to-link run.
//!
//! `Idle -> Validating -> Downloading -> Archiving -> Uploading -> Reporting
//! -> CleaningUp -> Done`, with `Aborted` reachable from every non-terminal
//! state. Cleanup runs before either terminal state is reported.

mod runner;
mod types;

pub use runner::{EventCallback, Pipeline, PreflightError};
pub use types::{AbortReason, PipelineEvent, PipelineReport, PipelineState};
