use crate::protocol::{Issue, IssueStatus};

/// Issues matching `status` (any when `None`) and `search`.
///
/// The search is a case-insensitive substring match over title, category and
/// description. A blank search matches everything.
pub fn filter_issues<'a>(
    issues: &'a [Issue],
    status: Option<IssueStatus>,
    search: &str,
) -> Vec<&'a Issue> {
    let query = search.trim().to_lowercase();
    issues
        .iter()
        .filter(|issue| status.map_or(true, |s| issue.status == s))
        .filter(|issue| query.is_empty() || matches_query(issue, &query))
        .collect()
}

fn matches_query(issue: &Issue, query: &str) -> bool {
    [&issue.title, &issue.category, &issue.description]
        .into_iter()
        .any(|field| field.to_lowercase().contains(query))
}

/// Per-status totals for a list of issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    /// Every issue.
    pub total: usize,
    /// Issues not yet picked up.
    pub pending: usize,
    /// Issues being worked on.
    pub in_progress: usize,
    /// Finished issues.
    pub resolved: usize,
}

impl StatusCounts {
    /// Count `issues` by status.
    pub fn tally<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        issues.into_iter().fold(Self::default(), |mut counts, issue| {
            counts.total += 1;
            match issue.status {
                IssueStatus::Pending => counts.pending += 1,
                IssueStatus::InProgress => counts.in_progress += 1,
                IssueStatus::Resolved => counts.resolved += 1,
            }
            counts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(id: i64, title: &str, category: &str, description: &str, status: IssueStatus) -> Issue {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "description": description,
            "category": category,
            "status": status,
        }))
        .unwrap()
    }

    fn issues() -> Vec<Issue> {
        vec![
            issue(1, "Pothole on Main St", "Roads & Potholes", "Deep hole", IssueStatus::Pending),
            issue(2, "Dark corner", "Streetlights", "Lamp out near the PARK", IssueStatus::InProgress),
            issue(3, "Overflowing bin", "Garbage & Waste", "Smells", IssueStatus::Resolved),
            issue(4, "Flooded lane", "Drainage & Flooding", "Water after rain", IssueStatus::Pending),
        ]
    }

    fn ids(filtered: &[&Issue]) -> Vec<i64> {
        filtered.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_no_filter_keeps_everything() {
        let issues = issues();
        assert_eq!(ids(&filter_issues(&issues, None, "")), [1, 2, 3, 4]);
        assert_eq!(ids(&filter_issues(&issues, None, "   ")), [1, 2, 3, 4]);
    }

    #[test]
    fn test_status_filter() {
        let issues = issues();
        assert_eq!(ids(&filter_issues(&issues, Some(IssueStatus::Pending), "")), [1, 4]);
        assert_eq!(ids(&filter_issues(&issues, Some(IssueStatus::Resolved), "")), [3]);
    }

    #[test]
    fn test_search_is_case_insensitive_over_three_fields() {
        let issues = issues();
        // title
        assert_eq!(ids(&filter_issues(&issues, None, "POTHOLE")), [1]);
        // category
        assert_eq!(ids(&filter_issues(&issues, None, "streetlights")), [2]);
        // description
        assert_eq!(ids(&filter_issues(&issues, None, "park")), [2]);
        assert!(filter_issues(&issues, None, "bridge").is_empty());
    }

    #[test]
    fn test_status_and_search_combine() {
        let issues = issues();
        let filtered = filter_issues(&issues, Some(IssueStatus::Pending), "flood");
        assert_eq!(ids(&filtered), [4]);
        assert!(filter_issues(&issues, Some(IssueStatus::Resolved), "flood").is_empty());
    }

    #[test]
    fn test_counts() {
        let issues = issues();
        assert_eq!(
            StatusCounts::tally(&issues),
            StatusCounts {
                total: 4,
                pending: 2,
                in_progress: 1,
                resolved: 1,
            }
        );
        assert_eq!(StatusCounts::tally(std::iter::empty()), StatusCounts::default());
    }
}
