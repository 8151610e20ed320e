//! Notification message catalog.
//!
//! Pure builders producing the channel payloads for a drive event. The
//! wording matches the copy shown in the student app; changing it here
//! changes every outbound notification.

use std::collections::HashMap;

use crate::drive::{Drive, DriveEventKind};

/// Provider template registered for newly posted drives.
pub const TEMPLATE_DRIVE_CREATED: &str = "new_drive_alert";

/// Provider template registered for edited drives.
pub const TEMPLATE_DRIVE_UPDATED: &str = "drive_update_alert";

/// Language every template is registered under.
pub const TEMPLATE_LANGUAGE: &str = "en_US";

/// Day + abbreviated month, e.g. `02 Jan`.
const DEADLINE_FORMAT: &str = "%d %b";

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// Push notification payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    /// Opaque key/value data delivered alongside the notification; the
    /// app uses it for deep links.
    pub data: HashMap<String, String>,
}

/// Business-initiated template message for the messaging channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMessage {
    pub template_name: String,
    pub language_code: String,
    /// Positional body parameters, in template order.
    pub body_params: Vec<String>,
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Push payload for a drive event.
pub fn push_message(drive: &Drive, kind: DriveEventKind) -> PushMessage {
    let (title, body, event_type) = match kind {
        DriveEventKind::Created => (
            "New Placement Drive!".to_string(),
            format!(
                "{} is hiring for {}. Check eligibility now!",
                drive.company_name, drive.job_role
            ),
            "new_drive",
        ),
        DriveEventKind::Updated => (
            "Placement Drive Updated".to_string(),
            format!(
                "Updates have been made to {} ({}). Check for changes or deadline extensions.",
                drive.company_name, drive.job_role
            ),
            "drive_update",
        ),
    };

    let mut data = HashMap::new();
    data.insert("drive_id".to_string(), drive.id.to_string());
    data.insert("type".to_string(), event_type.to_string());

    PushMessage { title, body, data }
}

/// Template payload for a drive event: company, role and the formatted
/// deadline, in that order.
pub fn template_message(drive: &Drive, kind: DriveEventKind) -> TemplateMessage {
    let template_name = match kind {
        DriveEventKind::Created => TEMPLATE_DRIVE_CREATED,
        DriveEventKind::Updated => TEMPLATE_DRIVE_UPDATED,
    };
    TemplateMessage {
        template_name: template_name.to_string(),
        language_code: TEMPLATE_LANGUAGE.to_string(),
        body_params: vec![
            drive.company_name.clone(),
            drive.job_role.clone(),
            drive.deadline.format(DEADLINE_FORMAT).to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::criteria::EligibilityCriteria;
    use crate::drive::DriveStatus;

    fn drive() -> Drive {
        Drive {
            id: 42,
            company_name: "Apex Systems".to_string(),
            job_role: "Software Engineer".to_string(),
            eligibility: EligibilityCriteria::new(),
            drive_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            deadline: Utc.with_ymd_and_hms(2025, 1, 2, 23, 59, 0).unwrap(),
            status: DriveStatus::Open,
            posted_by: 1,
            created_at: Utc.with_ymd_and_hms(2024, 12, 20, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn created_push_announces_the_company_and_role() {
        let message = push_message(&drive(), DriveEventKind::Created);
        assert_eq!(message.title, "New Placement Drive!");
        assert_eq!(
            message.body,
            "Apex Systems is hiring for Software Engineer. Check eligibility now!"
        );
        assert_eq!(message.data.get("drive_id").map(String::as_str), Some("42"));
        assert_eq!(message.data.get("type").map(String::as_str), Some("new_drive"));
    }

    #[test]
    fn updated_push_points_at_changes() {
        let message = push_message(&drive(), DriveEventKind::Updated);
        assert_eq!(message.title, "Placement Drive Updated");
        assert_eq!(
            message.body,
            "Updates have been made to Apex Systems (Software Engineer). Check for changes or deadline extensions."
        );
        assert_eq!(
            message.data.get("type").map(String::as_str),
            Some("drive_update")
        );
    }

    #[test]
    fn template_params_carry_company_role_and_deadline() {
        let message = template_message(&drive(), DriveEventKind::Created);
        assert_eq!(message.template_name, TEMPLATE_DRIVE_CREATED);
        assert_eq!(message.language_code, "en_US");
        assert_eq!(
            message.body_params,
            vec!["Apex Systems", "Software Engineer", "02 Jan"]
        );
    }

    #[test]
    fn updated_events_use_the_update_template() {
        let message = template_message(&drive(), DriveEventKind::Updated);
        assert_eq!(message.template_name, TEMPLATE_DRIVE_UPDATED);
    }
}
