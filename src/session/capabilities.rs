use crate::{
    error::{Error, Result},
    protocol::Role,
    zone::Zone,
};

/// Which issues an administrator oversees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneScope {
    /// Not an administrator.
    None,
    /// A single zone.
    Zone(Zone),
    /// The whole district.
    All,
}

/// A role-gated action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// File new issues.
    ReportIssues,
    /// Move an issue between statuses.
    UpdateStatus,
    /// Remove issues.
    DeleteIssues,
    /// Create and remove regional administrators.
    ManageRegionalAdmins,
    /// Hand unassigned issues to a regional administrator.
    AssignIssues,
    /// See zone issues and stats.
    ViewZoneDashboard,
}

impl Permission {
    fn action(self) -> &'static str {
        match self {
            Permission::ReportIssues => "report issues",
            Permission::UpdateStatus => "update issue status",
            Permission::DeleteIssues => "delete issues",
            Permission::ManageRegionalAdmins => "manage regional admins",
            Permission::AssignIssues => "assign issues",
            Permission::ViewZoneDashboard => "view the zone dashboard",
        }
    }
}

/// Everything a role may do, resolved in one place.
///
/// The service enforces these too; this only decides what the client offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// See [`Permission::ReportIssues`].
    pub report_issues: bool,
    /// See [`Permission::UpdateStatus`].
    pub update_status: bool,
    /// See [`Permission::DeleteIssues`].
    pub delete_issues: bool,
    /// See [`Permission::ManageRegionalAdmins`].
    pub manage_regional_admins: bool,
    /// See [`Permission::AssignIssues`].
    pub assign_issues: bool,
    /// See [`Permission::ViewZoneDashboard`].
    pub view_zone_dashboard: bool,
    /// Zones whose issues this role may act on.
    pub zone_scope: ZoneScope,
}

impl Capabilities {
    /// Resolve what `role` may do. `zone` only matters for a regional administrator.
    pub fn for_role(role: Role, zone: Option<Zone>) -> Self {
        match role {
            Role::User => Self {
                report_issues: true,
                update_status: false,
                delete_issues: false,
                manage_regional_admins: false,
                assign_issues: false,
                view_zone_dashboard: false,
                zone_scope: ZoneScope::None,
            },
            Role::Admin => Self {
                report_issues: false,
                update_status: true,
                delete_issues: true,
                manage_regional_admins: true,
                assign_issues: true,
                view_zone_dashboard: true,
                zone_scope: ZoneScope::All,
            },
            Role::RegionalAdmin => Self {
                report_issues: false,
                update_status: true,
                delete_issues: false,
                manage_regional_admins: false,
                assign_issues: false,
                view_zone_dashboard: true,
                // a regional admin without a zone oversees nothing
                zone_scope: zone.map_or(ZoneScope::None, ZoneScope::Zone),
            },
        }
    }

    /// Whether `permission` is granted.
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::ReportIssues => self.report_issues,
            Permission::UpdateStatus => self.update_status,
            Permission::DeleteIssues => self.delete_issues,
            Permission::ManageRegionalAdmins => self.manage_regional_admins,
            Permission::AssignIssues => self.assign_issues,
            Permission::ViewZoneDashboard => self.view_zone_dashboard,
        }
    }

    /// [`Error::Forbidden`] unless `permission` is granted.
    pub fn ensure(&self, permission: Permission) -> Result<()> {
        if self.allows(permission) {
            Ok(())
        } else {
            Err(Error::Forbidden(permission.action()))
        }
    }

    /// Whether an issue in `zone` falls under this scope.
    pub fn oversees(&self, zone: Zone) -> bool {
        match self.zone_scope {
            ZoneScope::None => false,
            ZoneScope::Zone(own) => own == zone,
            ZoneScope::All => true,
        }
    }

    /// [`Error::OutsideZone`] unless an issue in `zone` falls under this scope.
    pub fn ensure_oversees(&self, zone: Zone) -> Result<()> {
        if self.oversees(zone) {
            Ok(())
        } else {
            Err(Error::OutsideZone(zone))
        }
    }
}
