use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{
    protocol::Coordinate,
    zone::{self, Zone},
};

/// Categories offered when reporting an issue.
pub const CATEGORY_OPTIONS: [&str; 10] = [
    "Roads & Potholes",
    "Streetlights",
    "Drainage & Flooding",
    "Garbage & Waste",
    "Parks & Recreation",
    "Public Safety",
    "Water Supply",
    "Noise Pollution",
    "Infrastructure",
    "Other",
];

/// Lifecycle state of an issue. Owned by the remote service.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueStatus {
    /// Reported, not yet picked up.
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Resolved,
}

impl IssueStatus {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }

    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "PENDING",
            IssueStatus::InProgress => "IN_PROGRESS",
            IssueStatus::Resolved => "RESOLVED",
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for IssueStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "PENDING" => Ok(IssueStatus::Pending),
            "IN_PROGRESS" => Ok(IssueStatus::InProgress),
            "RESOLVED" => Ok(IssueStatus::Resolved),
            _ => Err(format!("unknown status: {s}")),
        }
    }
}

/// Who reported an issue.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary {
    /// User id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// A comment on an issue.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Comment id.
    pub id: i64,
    /// Comment body.
    pub text: String,
    /// When the comment was posted.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Author's user id.
    #[serde(default)]
    pub user_id: Option<i64>,
    /// Author's display name.
    #[serde(default)]
    pub user_name: Option<String>,
}

/// An issue as returned by the remote service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    /// Issue id.
    pub id: i64,
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// One of [`CATEGORY_OPTIONS`].
    pub category: String,
    /// Current status.
    pub status: IssueStatus,
    /// Uploaded evidence photo.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Reported latitude.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Reported longitude.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Zone, when the payload carries one. See [`Issue::resolved_zone`].
    #[serde(default)]
    pub zone: Option<Zone>,
    /// When the issue was filed.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Reporter.
    #[serde(default)]
    pub created_by: Option<UserSummary>,
    /// Comments, oldest first.
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Issue {
    /// Reported position, when both halves are present.
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }

    /// The issue's zone. The service does not send one with issues, so unless a zone is
    /// present it is resolved from the reported position with the service's own rules.
    pub fn resolved_zone(&self) -> Zone {
        self.zone
            .unwrap_or_else(|| zone::resolve_optional(self.coordinate().as_ref()))
    }
}

/// Body of `POST /api/issues`.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IssueRequest {
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// One of [`CATEGORY_OPTIONS`].
    pub category: String,
    /// URL returned by the image host.
    pub image_url: String,
    /// Reported latitude.
    pub latitude: Option<f64>,
    /// Reported longitude.
    pub longitude: Option<f64>,
}

/// Body of `PUT /api/issues/{id}/status`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct UpdateStatusRequest {
    /// New status.
    pub status: IssueStatus,
}

/// Body of `POST /api/issues/{id}/comments`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CommentRequest {
    /// Comment body.
    pub text: String,
}
