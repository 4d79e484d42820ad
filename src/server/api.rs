use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result, GENERIC_FAILURE},
    protocol::{
        extract_error_message, ApiResponse, AssignIssueRequest, AuthResponse, Comment,
        CommentRequest, CreateRegionalAdminRequest, Issue, IssueRequest, IssueStatus,
        LoginRequest, Notification, RegionalAdmin, RegisterRequest, UpdateStatusRequest,
        ZoneStats,
    },
    session::Session,
};

/// Client for the civic issue service.
///
/// Every call is a single request with a 10 second timeout. A `401` from any route
/// surfaces as [`Error::Unauthorized`]; the caller is expected to drop its session.
#[derive(Clone)]
pub struct CivicApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl CivicApi {
    const TIMEOUT: Duration = Duration::from_secs(10);

    const ENDPOINT_REGISTER: &str = "/api/auth/register";
    const ENDPOINT_LOGIN: &str = "/api/auth/login";
    const ENDPOINT_ISSUES: &str = "/api/issues";
    const ENDPOINT_NOTIFICATIONS: &str = "/api/notifications";
    const ENDPOINT_REGIONAL_ADMINS: &str = "/api/admin/regional-admins";
    const ENDPOINT_UNASSIGNED: &str = "/api/admin/issues/unassigned";
    const ENDPOINT_ZONE_ISSUES: &str = "/api/regional/issues";
    const ENDPOINT_ZONE_STATS: &str = "/api/regional/dashboard/stats";

    /// A client for the service at `base_url`, without a session.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            client: Client::builder().timeout(Self::TIMEOUT).build()?,
            base_url,
            token: None,
        })
    }

    /// Attach a bearer token to every following request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Attach the session's token.
    pub fn with_session(self, session: &Session) -> Self {
        self.with_token(session.token.clone())
    }

    // auth

    /// Create an account. The response logs the new user in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        self.fetch(self.request(Method::POST, Self::ENDPOINT_REGISTER).json(request))
            .await
    }

    /// Exchange credentials for a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.fetch(self.request(Method::POST, Self::ENDPOINT_LOGIN).json(&body))
            .await
    }

    // issues

    /// Every issue, newest first.
    pub async fn list_issues(&self) -> Result<Vec<Issue>> {
        self.fetch(self.request(Method::GET, Self::ENDPOINT_ISSUES))
            .await
    }

    /// Issues reported by the logged-in user.
    pub async fn my_issues(&self) -> Result<Vec<Issue>> {
        self.fetch(
            self.request(Method::GET, Self::ENDPOINT_ISSUES)
                .query(&[("mine", "true")]),
        )
        .await
    }

    /// One issue with its comments.
    pub async fn issue(&self, id: i64) -> Result<Issue> {
        self.fetch(self.request(Method::GET, &format!("{}/{id}", Self::ENDPOINT_ISSUES)))
            .await
    }

    /// Create an issue. Prefer [`crate::report::ReportDraft::submit`], which validates first.
    pub async fn create_issue(&self, request: &IssueRequest) -> Result<Issue> {
        self.fetch(self.request(Method::POST, Self::ENDPOINT_ISSUES).json(request))
            .await
    }

    /// Set an issue's status.
    pub async fn update_status(&self, id: i64, status: IssueStatus) -> Result<Issue> {
        let path = format!("{}/{id}/status", Self::ENDPOINT_ISSUES);
        self.fetch(
            self.request(Method::PUT, &path)
                .json(&UpdateStatusRequest { status }),
        )
        .await
    }

    /// Delete an issue.
    pub async fn delete_issue(&self, id: i64) -> Result<()> {
        let path = format!("{}/{id}", Self::ENDPOINT_ISSUES);
        self.send::<IgnoredAny>(self.request(Method::DELETE, &path))
            .await
            .map(|_| ())
    }

    /// Comment on an issue. `text` is trimmed.
    pub async fn add_comment(&self, id: i64, text: &str) -> Result<Comment> {
        let path = format!("{}/{id}/comments", Self::ENDPOINT_ISSUES);
        let body = CommentRequest {
            text: text.trim().to_string(),
        };
        self.fetch(self.request(Method::POST, &path).json(&body))
            .await
    }

    // notifications

    /// Notifications for the logged-in user.
    pub async fn notifications(&self) -> Result<Vec<Notification>> {
        self.fetch(self.request(Method::GET, Self::ENDPOINT_NOTIFICATIONS))
            .await
    }

    /// Unread notification count for a badge. Any failure counts as zero.
    pub async fn unread_count(&self) -> usize {
        match self.notifications().await {
            Ok(notifications) => crate::protocol::unread(&notifications),
            Err(e) => {
                debug!(error = %e, "Could not fetch unread count");
                0
            }
        }
    }

    // admin

    /// Regional admins with their zone counts.
    pub async fn regional_admins(&self) -> Result<Vec<RegionalAdmin>> {
        self.fetch(self.request(Method::GET, Self::ENDPOINT_REGIONAL_ADMINS))
            .await
    }

    /// Create a regional admin for a zone.
    pub async fn create_regional_admin(
        &self,
        request: &CreateRegionalAdminRequest,
    ) -> Result<RegionalAdmin> {
        self.fetch(
            self.request(Method::POST, Self::ENDPOINT_REGIONAL_ADMINS)
                .json(request),
        )
        .await
    }

    /// Remove a regional admin.
    pub async fn delete_regional_admin(&self, id: i64) -> Result<()> {
        let path = format!("{}/{id}", Self::ENDPOINT_REGIONAL_ADMINS);
        self.send::<IgnoredAny>(self.request(Method::DELETE, &path))
            .await
            .map(|_| ())
    }

    /// Issues whose location fell outside every zone.
    pub async fn unassigned_issues(&self) -> Result<Vec<Issue>> {
        self.fetch(self.request(Method::GET, Self::ENDPOINT_UNASSIGNED))
            .await
    }

    /// Hand an issue to a regional admin.
    pub async fn assign_issue(&self, issue_id: i64, admin_id: i64) -> Result<Issue> {
        let path = format!("/api/admin/issues/{issue_id}/assign");
        self.fetch(
            self.request(Method::PUT, &path)
                .json(&AssignIssueRequest { admin_id }),
        )
        .await
    }

    // regional

    /// Issues in the caller's zone; every issue for a district admin.
    pub async fn zone_issues(&self) -> Result<Vec<Issue>> {
        self.fetch(self.request(Method::GET, Self::ENDPOINT_ZONE_ISSUES))
            .await
    }

    /// Status counts for the caller's zone.
    pub async fn zone_stats(&self) -> Result<ZoneStats> {
        self.fetch(self.request(Method::GET, Self::ENDPOINT_ZONE_STATS))
            .await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send and require a `data` payload.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send(request).await?.ok_or_else(|| Error::Remote {
            status: StatusCode::OK.as_u16(),
            message: GENERIC_FAILURE.to_string(),
        })
    }

    /// Send, check the status and unwrap the `{ success, message, data }` envelope.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Option<T>> {
        let request = request.build()?;
        let (method, path) = (request.method().clone(), request.url().path().to_string());
        debug!(%method, %path, "Sending request");

        let response = self.client.execute(request).await.map_err(|e| {
            warn!(%method, %path, error = %e, "Request failed");
            e
        })?;
        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::UNAUTHORIZED {
            warn!(%method, %path, "Session rejected");
            return Err(Error::Unauthorized);
        }

        if !status.is_success() {
            let message = extract_error_message(&body);
            warn!(%method, %path, status = status.as_u16(), %message, "Request rejected");
            return Err(Error::Remote {
                status: status.as_u16(),
                message,
            });
        }

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let envelope: ApiResponse<T> = serde_json::from_slice(&body)?;
        if !envelope.success {
            let message = envelope
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            return Err(Error::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(envelope.data)
    }
}
