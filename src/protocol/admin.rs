use serde::{Deserialize, Serialize};

use crate::zone::Zone;

/// A regional administrator with the counts for their zone.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegionalAdmin {
    /// User id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Zone the admin oversees.
    #[serde(default)]
    pub zone: Option<Zone>,
    /// Human-readable zone description.
    #[serde(default)]
    pub zone_description: Option<String>,
    /// Issues in the zone.
    #[serde(default)]
    pub total_issues: u64,
    /// Pending issues in the zone.
    #[serde(default)]
    pub pending_issues: u64,
    /// Resolved issues in the zone.
    #[serde(default)]
    pub resolved_issues: u64,
}

/// Body of `POST /api/admin/regional-admins`.
#[derive(Serialize, Debug, Clone)]
pub struct CreateRegionalAdminRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Zone to oversee.
    pub zone: Zone,
}

/// Body of `PUT /api/admin/issues/{id}/assign`.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AssignIssueRequest {
    /// Regional admin taking the issue.
    pub admin_id: i64,
}

/// Counters for the regional dashboard. `zone` is `ALL` for district admins.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStats {
    /// Zone name, or `ALL`.
    pub zone: String,
    /// Human-readable zone description.
    #[serde(default)]
    pub zone_desc: Option<String>,
    /// Issues in scope.
    pub total: u64,
    /// Pending issues.
    pub pending: u64,
    /// Issues being worked on.
    pub in_progress: u64,
    /// Resolved issues.
    pub resolved: u64,
}
