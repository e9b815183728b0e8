pub mod candidate;
pub mod upload;

pub use candidate::{Analysis, CandidateId, CandidateRecord, Category, ContactInfo};
pub use upload::{RejectedFile, ResumeFile, UploadResponse};
