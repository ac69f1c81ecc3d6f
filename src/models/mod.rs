pub mod submission;
pub mod viewer;

pub use submission::{ResourceLink, Submission, SubmissionUpdate};
pub use viewer::Viewer;
