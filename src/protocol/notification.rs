use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A message for the logged-in user, e.g. a status change on their issue.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification id.
    pub id: i64,
    /// Text shown to the user.
    pub message: String,
    /// When it was sent.
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// Whether the user has seen it.
    #[serde(default)]
    pub read: bool,
}

/// Number of notifications not yet read.
pub fn unread(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.read).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unread_count() {
        let json = r#"[
            {"id":1,"message":"Issue #3 is now In Progress","read":false},
            {"id":2,"message":"Issue #3 is now Resolved","read":true},
            {"id":3,"message":"New comment"}
        ]"#;
        let notifications: Vec<Notification> = serde_json::from_str(json).unwrap();
        assert_eq!(unread(&notifications), 2);
    }
}
