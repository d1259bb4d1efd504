//! Live capture orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{Pipeline, PipelineConfig};
pub use stats::{print_unpack_summary, PipelineStats};
