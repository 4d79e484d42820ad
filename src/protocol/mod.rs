mod admin;
mod auth;
mod envelope;
mod issue;
mod location;
mod notification;

pub use admin::{AssignIssueRequest, CreateRegionalAdminRequest, RegionalAdmin, ZoneStats};
pub use auth::{AuthResponse, LoginRequest, RegisterRequest, Role, UserProfile};
pub use envelope::{extract_error_message, ApiResponse};
pub use issue::{
    Comment, CommentRequest, Issue, IssueRequest, IssueStatus, UpdateStatusRequest, UserSummary,
    CATEGORY_OPTIONS,
};
pub use location::Coordinate;
pub use notification::{unread, Notification};
