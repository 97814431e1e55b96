//! Status and role enums.
//!
//! Both are stored as plain `TEXT` columns guarded by `CHECK` constraints, so
//! conversion happens through [`FromStr`](std::str::FromStr) / [`Display`]
//! in the row mappers rather than a Postgres enum type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of a contact-form enquiry.
///
/// Every enquiry starts as [`EnquiryStatus::New`]; only admins move it along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EnquiryStatus {
    #[default]
    New,
    Contacted,
    Resolved,
    Archived,
}

impl EnquiryStatus {
    /// All statuses in lifecycle order.
    pub const ALL: [Self; 4] = [Self::New, Self::Contacted, Self::Resolved, Self::Archived];

    /// The storage / wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Resolved => "resolved",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for EnquiryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnquiryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "contacted" => Ok(Self::Contacted),
            "resolved" => Ok(Self::Resolved),
            "archived" => Ok(Self::Archived),
            _ => Err(format!("invalid enquiry status: {s}")),
        }
    }
}

/// Admin role with different permission levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    /// Full access, including creating other admins.
    SuperAdmin,
    /// Full access to site content.
    Admin,
    /// Can sign in but is refused by every admin route.
    Viewer,
}

impl AdminRole {
    /// Whether this role may use the admin API.
    #[must_use]
    pub const fn can_manage(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "super_admin"),
            Self::Admin => write!(f, "admin"),
            Self::Viewer => write!(f, "viewer"),
        }
    }
}

impl std::str::FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            _ => Err(format!("invalid admin role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_enquiry_status_round_trips_through_text() {
        for status in EnquiryStatus::ALL {
            assert_eq!(status.as_str().parse::<EnquiryStatus>().unwrap(), status);
        }
        assert!("closed".parse::<EnquiryStatus>().is_err());
    }

    #[test]
    fn test_enquiry_status_serde_is_lowercase() {
        let json = serde_json::to_string(&EnquiryStatus::Archived).unwrap();
        assert_eq!(json, "\"archived\"");
    }

    #[test]
    fn test_only_admin_roles_can_manage() {
        assert!(AdminRole::SuperAdmin.can_manage());
        assert!(AdminRole::Admin.can_manage());
        assert!(!AdminRole::Viewer.can_manage());
    }

    #[test]
    fn test_admin_role_parse() {
        assert_eq!("super_admin".parse::<AdminRole>().unwrap(), AdminRole::SuperAdmin);
        assert!("editor".parse::<AdminRole>().is_err());
    }
}
