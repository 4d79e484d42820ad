mod capabilities;
mod store;

pub use capabilities::{Capabilities, Permission, ZoneScope};
pub use store::SessionStore;

use crate::protocol::{AuthResponse, Role, UserProfile};

/// A logged-in user: the bearer token and the profile returned with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// Bearer token.
    pub token: String,
    /// Profile returned at login.
    pub user: UserProfile,
}

impl Session {
    /// Role of the logged-in user.
    pub fn role(&self) -> Role {
        self.user.role
    }

    /// What this session's role may do.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_role(self.user.role, self.user.zone)
    }
}

impl From<AuthResponse> for Session {
    fn from(response: AuthResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}
