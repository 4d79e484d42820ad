use tracing::{debug, warn};

use crate::{
    error::Result,
    protocol::{Issue, IssueStatus},
    server::CivicApi,
    session::Capabilities,
};

/// An applied-but-unconfirmed local change. Hand it back to
/// [`IssueBoard::confirm`] or [`IssueBoard::rollback`].
#[derive(Debug)]
#[must_use = "a pending update must be confirmed or rolled back"]
pub struct PendingUpdate {
    id: i64,
    kind: PendingKind,
}

#[derive(Debug)]
enum PendingKind {
    Status { previous: IssueStatus },
    Delete { index: usize, issue: Box<Issue> },
}

/// A local list of issues with optimistic status changes and deletions.
///
/// Changes show immediately and are reverted if the service refuses them.
#[derive(Debug, Clone, Default)]
pub struct IssueBoard {
    issues: Vec<Issue>,
}

impl IssueBoard {
    /// A board showing `issues`.
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// Issues currently shown, pending changes included.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// The issue with `id`, if it is on the board.
    pub fn get(&self, id: i64) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == id)
    }

    /// Replace the whole list, e.g. after a refresh.
    pub fn replace(&mut self, issues: Vec<Issue>) {
        self.issues = issues;
    }

    /// Show `status` at once. `None` if the issue is not on the board.
    pub fn begin_status_change(&mut self, id: i64, status: IssueStatus) -> Option<PendingUpdate> {
        let issue = self.issues.iter_mut().find(|i| i.id == id)?;
        let previous = std::mem::replace(&mut issue.status, status);
        Some(PendingUpdate {
            id,
            kind: PendingKind::Status { previous },
        })
    }

    /// Remove the issue at once. `None` if it is not on the board.
    pub fn begin_delete(&mut self, id: i64) -> Option<PendingUpdate> {
        let index = self.issues.iter().position(|i| i.id == id)?;
        let issue = self.issues.remove(index);
        Some(PendingUpdate {
            id,
            kind: PendingKind::Delete {
                index,
                issue: Box::new(issue),
            },
        })
    }

    /// Keep the change. A status change adopts the service's copy when one is given.
    pub fn confirm(&mut self, pending: PendingUpdate, server_copy: Option<Issue>) {
        if let (PendingKind::Status { .. }, Some(server_copy)) = (&pending.kind, server_copy) {
            if let Some(issue) = self.issues.iter_mut().find(|i| i.id == pending.id) {
                *issue = server_copy;
            }
        }
        debug!(id = pending.id, "Confirmed local change");
    }

    /// Undo the change.
    pub fn rollback(&mut self, pending: PendingUpdate) {
        match pending.kind {
            PendingKind::Status { previous } => {
                if let Some(issue) = self.issues.iter_mut().find(|i| i.id == pending.id) {
                    issue.status = previous;
                }
            }
            PendingKind::Delete { index, issue } => {
                let index = index.min(self.issues.len());
                self.issues.insert(index, *issue);
            }
        }
        debug!(id = pending.id, "Rolled back local change");
    }

    /// Optimistically change an issue's status, then confirm with the service.
    ///
    /// Issues not on the board are updated remotely only.
    pub async fn change_status(
        &mut self,
        api: &CivicApi,
        id: i64,
        status: IssueStatus,
    ) -> Result<Issue> {
        let pending = self.begin_status_change(id, status);

        match api.update_status(id, status).await {
            Ok(updated) => {
                if let Some(pending) = pending {
                    self.confirm(pending, Some(updated.clone()));
                }
                Ok(updated)
            }
            Err(e) => {
                warn!(id, %status, error = %e, "Status change refused, rolling back");
                if let Some(pending) = pending {
                    self.rollback(pending);
                }
                Err(e)
            }
        }
    }

    /// [`change_status`](Self::change_status) for a role that may be limited to one zone.
    ///
    /// The board should hold the issues `capabilities` oversee. An issue missing from it
    /// is fetched, and refused with [`crate::Error::OutsideZone`] unless its zone is in
    /// scope. Nothing is changed in that case.
    pub async fn change_status_within(
        &mut self,
        api: &CivicApi,
        capabilities: &Capabilities,
        id: i64,
        status: IssueStatus,
    ) -> Result<Issue> {
        if self.get(id).is_none() {
            let issue = api.issue(id).await?;
            if let Err(e) = capabilities.ensure_oversees(issue.resolved_zone()) {
                warn!(id, zone = %issue.resolved_zone(), "Issue outside zone scope");
                return Err(e);
            }
        }
        self.change_status(api, id, status).await
    }

    /// Optimistically remove an issue, then confirm with the service.
    pub async fn delete(&mut self, api: &CivicApi, id: i64) -> Result<()> {
        let pending = self.begin_delete(id);

        match api.delete_issue(id).await {
            Ok(()) => {
                if let Some(pending) = pending {
                    self.confirm(pending, None);
                }
                Ok(())
            }
            Err(e) => {
                warn!(id, error = %e, "Delete refused, rolling back");
                if let Some(pending) = pending {
                    self.rollback(pending);
                }
                Err(e)
            }
        }
    }
}
