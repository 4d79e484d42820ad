mod board;
mod draft;
mod filter;
mod validation;

pub use board::{IssueBoard, PendingUpdate};
pub use draft::ReportDraft;
pub use filter::{filter_issues, StatusCounts};
pub use validation::{
    validate_comment, validate_registration, IssueFields, MAX_TITLE_CHARS, MIN_PASSWORD_CHARS,
};
