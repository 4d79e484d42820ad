use std::fmt;

use serde::{Deserialize, Serialize};

use crate::zone::Zone;

/// Account role, as assigned by the service.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Citizen reporter.
    User,
    /// District-wide administrator.
    Admin,
    /// Administrator scoped to one zone.
    RegionalAdmin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
            Role::RegionalAdmin => "REGIONAL_ADMIN",
        })
    }
}

/// The logged-in user's profile, persisted next to the token.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Service-side user id.
    pub user_id: i64,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Role that drives capabilities.
    pub role: Role,
    /// Zone, for regional administrators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<Zone>,
}

/// Payload of a successful login or registration.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token.
    pub token: String,
    /// Token type, normally `Bearer`.
    #[serde(rename = "type", default)]
    pub token_type: Option<String>,
    /// Everything else describes the user.
    #[serde(flatten)]
    pub user: UserProfile,
}

/// Body of `POST /api/auth/login`.
#[derive(Serialize, Debug, Clone)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Body of `POST /api/auth/register`.
#[derive(Serialize, Debug, Clone)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Password.
    pub password: String,
}
