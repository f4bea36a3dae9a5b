//! Dashboard header greeting.

use chrono::{DateTime, FixedOffset, Utc};

use super::local;
use crate::models::Greeting;

/// Greeting for the dashboard header. Date and name appear only once an
/// e-mail address is stored.
pub fn greeting(
    user_email: Option<&str>,
    username: Option<&str>,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Greeting {
    let email = user_email.map(str::trim).filter(|e| !e.is_empty());

    Greeting {
        display_name: email.map(|e| e.split('@').next().unwrap_or(e).to_string()),
        date_display: email.map(|_| local(now, offset).format("%A, %B %-d, %Y").to_string()),
        username: username.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_greeting_uses_local_part() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap();
        let g = greeting(Some("jane.doe@school.edu"), None, now, FixedOffset::east_opt(0).unwrap());

        assert_eq!(g.display_name.as_deref(), Some("jane.doe"));
        assert_eq!(g.date_display.as_deref(), Some("Friday, March 15, 2024"));
    }

    #[test]
    fn test_greeting_without_email_is_blank() {
        let g = greeting(None, Some("Jane"), Utc::now(), FixedOffset::east_opt(0).unwrap());
        assert!(g.display_name.is_none());
        assert!(g.date_display.is_none());
        assert_eq!(g.username.as_deref(), Some("Jane"));
    }
}
