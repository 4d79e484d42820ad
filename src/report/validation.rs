//! Checks that run before anything is sent. Messages are shown to the user as-is.

use crate::{
    error::{Error, Result},
    protocol::{RegisterRequest, CATEGORY_OPTIONS},
};

/// Longest accepted issue title, in characters.
pub const MAX_TITLE_CHARS: usize = 200;
/// Shortest accepted password.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Validate the registration form and build the request body.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<RegisterRequest> {
    if name.trim().is_empty() {
        return Err(Error::validation("Name is required."));
    }
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation("Enter a valid email address."));
    }
    if password != confirm {
        return Err(Error::validation("Passwords do not match."));
    }
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(Error::validation("Password must be at least 6 characters."));
    }

    Ok(RegisterRequest {
        name: name.trim().to_string(),
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// The text fields of a new issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFields {
    /// Short title.
    pub title: String,
    /// Full description.
    pub description: String,
    /// One of the fixed categories.
    pub category: String,
}

impl IssueFields {
    /// Fields as typed. Nothing is checked until `validate`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
        }
    }

    /// Trimmed copy, or the first problem found.
    pub fn validate(&self) -> Result<IssueFields> {
        let title = self.title.trim();
        let description = self.description.trim();
        let category = self.category.trim();

        if title.is_empty() {
            return Err(Error::validation("Title is required."));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(Error::validation("Title must be at most 200 characters."));
        }
        if description.is_empty() {
            return Err(Error::validation("Description is required."));
        }
        if category.is_empty() {
            return Err(Error::validation("Category is required."));
        }
        let Some(category) = CATEGORY_OPTIONS
            .iter()
            .find(|c| c.eq_ignore_ascii_case(category))
        else {
            return Err(Error::validation(format!("Unknown category: {category}")));
        };

        Ok(IssueFields {
            title: title.to_string(),
            description: description.to_string(),
            category: category.to_string(),
        })
    }
}

/// Trimmed comment text, rejecting blanks.
pub fn validate_comment(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::validation("Comment cannot be empty."));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<impl std::fmt::Debug>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_registration_mismatch_checked_first() {
        assert_eq!(
            message(validate_registration("Asha", "asha@example.com", "abc", "abd")),
            "Passwords do not match."
        );
        assert_eq!(
            message(validate_registration("Asha", "asha@example.com", "abc", "abc")),
            "Password must be at least 6 characters."
        );
    }

    #[test]
    fn test_registration_ok() {
        let request = validate_registration(" Asha ", "asha@example.com", "secret1", "secret1")
            .unwrap();
        assert_eq!(request.name, "Asha");
        assert_eq!(request.password, "secret1");
    }

    #[test]
    fn test_registration_requires_email() {
        assert!(validate_registration("Asha", "not-an-email", "secret1", "secret1").is_err());
    }

    #[test]
    fn test_issue_fields() {
        let fields = IssueFields::new("  Broken light ", "Dark street", "streetlights")
            .validate()
            .unwrap();
        assert_eq!(fields.title, "Broken light");
        assert_eq!(fields.category, "Streetlights");

        assert_eq!(
            message(IssueFields::new("", "d", "Other").validate()),
            "Title is required."
        );
        assert_eq!(
            message(IssueFields::new("t", " ", "Other").validate()),
            "Description is required."
        );
        assert_eq!(
            message(IssueFields::new("t", "d", "").validate()),
            "Category is required."
        );
        assert!(IssueFields::new("t", "d", "Volcanoes").validate().is_err());
    }

    #[test]
    fn test_title_length_limit() {
        let ok = "x".repeat(MAX_TITLE_CHARS);
        assert!(IssueFields::new(ok, "d", "Other").validate().is_ok());

        let long = "x".repeat(MAX_TITLE_CHARS + 1);
        assert!(IssueFields::new(long, "d", "Other").validate().is_err());
    }

    #[test]
    fn test_blank_comment_rejected() {
        assert!(validate_comment("   ").is_err());
        assert_eq!(validate_comment("  Fixed yet? ").unwrap(), "Fixed yet?");
    }
}
