//! Contact-form enquiries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::EnquiryId;
use super::status::EnquiryStatus;

/// A contact-form submission tracked by admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub id: EnquiryId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub service: String,
    pub message: String,
    pub status: EnquiryStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated public submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEnquiry {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub service: String,
    pub message: String,
}

/// The fields echoed back after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EnquiryReceipt {
    pub id: EnquiryId,
    pub name: String,
    pub email: String,
}

impl From<&Enquiry> for EnquiryReceipt {
    fn from(enquiry: &Enquiry) -> Self {
        Self {
            id: enquiry.id,
            name: enquiry.name.clone(),
            email: enquiry.email.clone(),
        }
    }
}

/// Admin status change. Omitted or empty `notes` leave stored notes alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: EnquiryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Enquiry counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EnquiryStats {
    pub total: i64,
    pub new: i64,
    pub contacted: i64,
    pub resolved: i64,
    pub archived: i64,
}

impl EnquiryStats {
    /// Add `count` enquiries in `status`.
    pub const fn record(&mut self, status: EnquiryStatus, count: i64) {
        match status {
            EnquiryStatus::New => self.new += count,
            EnquiryStatus::Contacted => self.contacted += count,
            EnquiryStatus::Resolved => self.resolved += count,
            EnquiryStatus::Archived => self.archived += count,
        }
        self.total += count;
    }
}

/// Query for the admin enquiry listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquiryFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EnquiryStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_stats_record() {
        let mut stats = EnquiryStats::default();
        stats.record(EnquiryStatus::New, 3);
        stats.record(EnquiryStatus::Archived, 1);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.new, 3);
        assert_eq!(stats.archived, 1);
        assert_eq!(stats.resolved, 0);
    }

    #[test]
    fn test_status_update_notes_optional() {
        let update: StatusUpdate = serde_json::from_value(json!({"status": "archived"})).unwrap();
        assert_eq!(update.status, EnquiryStatus::Archived);
        assert!(update.notes.is_none());
    }

    #[test]
    fn test_enquiry_serializes_camel_case() {
        let now = Utc::now();
        let enquiry = Enquiry {
            id: EnquiryId::new(9),
            name: "Jane".to_owned(),
            email: "jane@x.com".to_owned(),
            phone: None,
            service: "SEO".to_owned(),
            message: "hi".to_owned(),
            status: EnquiryStatus::New,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&enquiry).unwrap();
        assert_eq!(json["status"], "new");
        assert!(json.get("createdAt").is_some());
        assert_eq!(
            serde_json::to_value(EnquiryReceipt::from(&enquiry)).unwrap(),
            json!({"id": 9, "name": "Jane", "email": "jane@x.com"})
        );
    }
}
