pub mod machine;
pub mod pipeline;

pub use machine::{UploadJob, UploadPhase};
pub use pipeline::{StartUpload, UploadHandle, UploadOutcome, UploadPipeline};
