//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and are
//! never exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{ClickEvent, OpenObservation};

use super::schema::{email_clicks, email_opens};

/// Insertable struct feeding the open upsert.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = email_opens)]
pub(crate) struct OpenUpsertRow<'a> {
    pub subject_id: i64,
    pub recipient: &'a str,
    pub open_time: DateTime<Utc>,
    pub user_agent: &'a str,
    pub client_ip: Option<String>,
    pub via: &'a str,
    pub is_suspect: bool,
}

impl<'a> From<&'a OpenObservation> for OpenUpsertRow<'a> {
    fn from(observation: &'a OpenObservation) -> Self {
        Self {
            subject_id: observation.key.subject_id(),
            recipient: observation.key.recipient(),
            open_time: observation.observed_at,
            user_agent: &observation.user_agent,
            client_ip: observation.client_ip.map(|address| address.to_string()),
            via: &observation.via,
            is_suspect: observation.suspect,
        }
    }
}

/// Insertable struct for appending click log entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = email_clicks)]
pub(crate) struct NewClickRow<'a> {
    pub subject_id: i64,
    pub recipient: &'a str,
    pub url: &'a str,
    pub click_time: DateTime<Utc>,
}

impl<'a> From<&'a ClickEvent> for NewClickRow<'a> {
    fn from(click: &'a ClickEvent) -> Self {
        Self {
            subject_id: click.key.subject_id(),
            recipient: click.key.recipient(),
            url: &click.url,
            click_time: click.clicked_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EngagementKey;
    use rstest::rstest;

    #[rstest]
    fn open_row_renders_the_client_address_as_text() {
        let observation = OpenObservation {
            key: EngagementKey::new(4, "a@b.com"),
            observed_at: Utc::now(),
            user_agent: "Mozilla/5.0".to_owned(),
            client_ip: Some("203.0.113.9".parse().expect("address")),
            via: "1.1 edge".to_owned(),
            suspect: true,
        };

        let row = OpenUpsertRow::from(&observation);
        assert_eq!(row.subject_id, 4);
        assert_eq!(row.recipient, "a@b.com");
        assert_eq!(row.client_ip.as_deref(), Some("203.0.113.9"));
        assert!(row.is_suspect);
    }

    #[rstest]
    fn unresolved_client_address_stays_null() {
        let observation = OpenObservation {
            key: EngagementKey::new(4, "a@b.com"),
            observed_at: Utc::now(),
            user_agent: String::new(),
            client_ip: None,
            via: String::new(),
            suspect: false,
        };

        let row = OpenUpsertRow::from(&observation);
        assert_eq!(row.client_ip, None);
    }

    #[rstest]
    fn click_row_carries_key_fields_and_destination() {
        let click = ClickEvent {
            key: EngagementKey::new(9, "A%40B.com"),
            url: "https://example.com/offer".to_owned(),
            clicked_at: Utc::now(),
        };

        let row = NewClickRow::from(&click);
        assert_eq!(row.subject_id, 9);
        assert_eq!(row.recipient, "a@b.com");
        assert_eq!(row.url, "https://example.com/offer");
    }
}
