//! Class detail modal.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

use super::local;
use crate::models::ClassRecord;

pub const NO_DESCRIPTION: &str = "No description provided.";

/// The join button's state.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct JoinAction {
    pub enabled: bool,
    pub label: &'static str,
    /// Only present once the class can be joined
    pub href: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetail {
    pub id: String,
    pub title: String,
    /// "Friday, March 15, 2024"
    pub date_label: String,
    pub time_label: String,
    pub duration: u32,
    pub instructor: String,
    pub description: String,
    pub link: String,
    pub join: JoinAction,
    pub materials_href: String,
}

pub fn video_href(class_id: &str) -> String {
    format!("video.html?classId={}", urlencoding::encode(class_id))
}

pub fn materials_href(class_id: &str) -> String {
    format!("documents.html?classId={}", urlencoding::encode(class_id))
}

pub fn class_detail(record: &ClassRecord, now: DateTime<Utc>, offset: FixedOffset) -> ClassDetail {
    let at = local(record.date_time, offset);
    let link = video_href(&record.id);

    let join = if record.date_time <= now {
        JoinAction {
            enabled: true,
            label: "Join Class",
            href: Some(link.clone()),
        }
    } else {
        JoinAction {
            enabled: false,
            label: "Join When Available",
            href: None,
        }
    };

    let description = if record.description.trim().is_empty() {
        NO_DESCRIPTION.to_string()
    } else {
        record.description.clone()
    };

    ClassDetail {
        id: record.id.clone(),
        title: record.title.clone(),
        date_label: at.format("%A, %B %-d, %Y").to_string(),
        time_label: at.format("%H:%M").to_string(),
        duration: record.duration,
        instructor: record.instructor.clone(),
        description,
        link,
        join,
        materials_href: materials_href(&record.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(at: DateTime<Utc>) -> ClassRecord {
        ClassRecord {
            id: "1710496800000".to_string(),
            title: "Algebra".to_string(),
            date_time: at,
            duration: 45,
            description: String::new(),
            instructor: "Jane".to_string(),
        }
    }

    #[test]
    fn test_join_disabled_before_start() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let detail = class_detail(&record(at), at - Duration::minutes(1), FixedOffset::east_opt(0).unwrap());

        assert!(!detail.join.enabled);
        assert_eq!(detail.join.label, "Join When Available");
        assert!(detail.join.href.is_none());
        assert_eq!(detail.description, NO_DESCRIPTION);
        assert_eq!(detail.date_label, "Friday, March 15, 2024");
        assert_eq!(detail.materials_href, "documents.html?classId=1710496800000");
    }

    #[test]
    fn test_join_enabled_at_start() {
        let at = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let detail = class_detail(&record(at), at, FixedOffset::east_opt(0).unwrap());

        assert!(detail.join.enabled);
        assert_eq!(detail.join.label, "Join Class");
        assert_eq!(
            detail.join.href.as_deref(),
            Some("video.html?classId=1710496800000")
        );
    }
}
