pub mod email;
pub mod pdf;
pub mod pipeline;
pub mod reference_number;

pub use pipeline::{ArtifactError, Result, SummaryMetadata, SummaryPipeline};
