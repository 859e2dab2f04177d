pub mod submission;
pub mod user;

pub use submission::{ContactSubmission, NewSubmission, SubmissionStatus};
pub use user::{NewUser, PublicUser, User, UserPatch};
