//! Class record model and the schedule form that produces it.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AppError;

/// Duration used when the form leaves it blank or unparsable.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;
/// Instructor recorded when no username is stored.
pub const UNKNOWN_INSTRUCTOR: &str = "Unknown Instructor";

/// A scheduled class session.
///
/// Records are never edited in place: a change is a delete followed by a new
/// record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub id: String,
    pub title: String,
    #[serde(with = "iso_millis")]
    pub date_time: DateTime<Utc>,
    #[serde(default = "default_duration", deserialize_with = "lenient_duration")]
    pub duration: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructor: String,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_MINUTES
}

/// Older collections stored the duration as a string.
fn lenient_duration<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n,
        Raw::Text(s) => parse_duration(Some(&s)),
    })
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix, the
/// format the page writes.
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Request body submitted by the schedule-class form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleClassRequest {
    #[serde(default)]
    pub title: String,
    /// Local date, `YYYY-MM-DD`
    #[serde(default)]
    pub date: String,
    /// Local time, `HH:MM`
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub duration: Option<serde_json::Value>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ScheduleClassRequest {
    /// Validate the form and build the record it describes.
    ///
    /// Nothing is created unless title, date and time are all present and
    /// parse.
    pub fn into_record(
        self,
        now: DateTime<Utc>,
        offset: FixedOffset,
        username: Option<String>,
    ) -> Result<ClassRecord, AppError> {
        let title = self.title.trim();
        let date = self.date.trim();
        let time = self.time.trim();

        if title.is_empty() || date.is_empty() || time.is_empty() {
            return Err(AppError::Validation(
                "Please fill in all required fields".to_string(),
            ));
        }

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| AppError::Validation(format!("Invalid class date: {}", date)))?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
            .map_err(|_| AppError::Validation(format!("Invalid class time: {}", time)))?;

        let date_time = offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .ok_or_else(|| AppError::Validation("Class time does not exist locally".to_string()))?
            .with_timezone(&Utc);

        let duration = match &self.duration {
            Some(serde_json::Value::Number(n)) => n
                .as_u64()
                .filter(|n| *n > 0)
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(DEFAULT_DURATION_MINUTES),
            Some(serde_json::Value::String(s)) => parse_duration(Some(s)),
            _ => DEFAULT_DURATION_MINUTES,
        };

        let instructor = username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| UNKNOWN_INSTRUCTOR.to_string());

        Ok(ClassRecord {
            id: now.timestamp_millis().to_string(),
            title: title.to_string(),
            date_time,
            duration,
            description: self.description.unwrap_or_default(),
            instructor,
        })
    }
}

/// Parse a leading positive integer, falling back to the default duration.
fn parse_duration(raw: Option<&str>) -> u32 {
    raw.map(str::trim)
        .map(|s| s.chars().take_while(|c| c.is_ascii_digit()).collect::<String>())
        .and_then(|d| d.parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_DURATION_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn form(title: &str, date: &str, time: &str) -> ScheduleClassRequest {
        ScheduleClassRequest {
            title: title.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_form_builds_record() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let record = form("Algebra", "2024-03-15", "10:00")
            .into_record(now, utc(), Some("Jane".to_string()))
            .unwrap();

        assert_eq!(record.id, now.timestamp_millis().to_string());
        assert_eq!(record.title, "Algebra");
        assert_eq!(
            record.date_time,
            Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap()
        );
        assert_eq!(record.duration, DEFAULT_DURATION_MINUTES);
        assert_eq!(record.instructor, "Jane");
    }

    #[test]
    fn test_form_interprets_local_offset() {
        let now = Utc::now();
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let record = form("Physics", "2024-03-15", "10:00")
            .into_record(now, offset, None)
            .unwrap();

        assert_eq!(
            record.date_time,
            Utc.with_ymd_and_hms(2024, 3, 15, 8, 0, 0).unwrap()
        );
        assert_eq!(record.instructor, UNKNOWN_INSTRUCTOR);
    }

    #[test]
    fn test_form_rejects_missing_fields() {
        for request in [
            form("", "2024-03-15", "10:00"),
            form("Algebra", " ", "10:00"),
            form("Algebra", "2024-03-15", ""),
        ] {
            let err = request.into_record(Utc::now(), utc(), None).unwrap_err();
            assert!(matches!(err, AppError::Validation(ref m) if m == "Please fill in all required fields"));
        }
    }

    #[test]
    fn test_form_rejects_unparsable_date() {
        let err = form("Algebra", "15/03/2024", "10:00")
            .into_record(Utc::now(), utc(), None)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_duration_defaults_when_not_positive() {
        let mut request = form("Algebra", "2024-03-15", "10:00");
        request.duration = Some(json!("0"));
        let record = request.into_record(Utc::now(), utc(), None).unwrap();
        assert_eq!(record.duration, DEFAULT_DURATION_MINUTES);

        let mut request = form("Algebra", "2024-03-15", "10:00");
        request.duration = Some(json!("45 minutes"));
        let record = request.into_record(Utc::now(), utc(), None).unwrap();
        assert_eq!(record.duration, 45);

        let mut request = form("Algebra", "2024-03-15", "10:00");
        request.duration = Some(json!(90));
        let record = request.into_record(Utc::now(), utc(), None).unwrap();
        assert_eq!(record.duration, 90);
    }

    #[test]
    fn test_record_serializes_page_format() {
        let record = ClassRecord {
            id: "1710496800000".to_string(),
            title: "Algebra".to_string(),
            date_time: Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
            duration: 60,
            description: String::new(),
            instructor: "Jane".to_string(),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["dateTime"], "2024-03-15T10:00:00.000Z");
        assert_eq!(value["instructor"], "Jane");
    }

    #[test]
    fn test_record_accepts_string_duration() {
        let record: ClassRecord = serde_json::from_value(json!({
            "id": "1",
            "title": "Chemistry",
            "dateTime": "2024-03-15T10:00:00.000Z",
            "duration": "30",
            "description": "",
            "instructor": "Sam"
        }))
        .unwrap();
        assert_eq!(record.duration, 30);
    }
}
