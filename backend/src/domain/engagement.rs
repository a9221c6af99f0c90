//! Engagement keys, records, and the reconciliation merge function.
//!
//! The merge semantics defined here are the single source of truth for how
//! repeated open signals collapse into one authoritative record: the open
//! time never regresses, descriptive fields track the latest observation,
//! and the suspect flag can only ever move from suspect to genuine. Storage
//! adapters mirror [`OpenRecord::merge`] exactly in their atomic upsert.

use std::net::IpAddr;

use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;

/// Composite identifier for one recipient's relationship to one tracked
/// subject.
///
/// The recipient is normalized on construction (percent-decoded once more
/// beyond query decoding, trimmed, lowercased) so the open and click paths
/// cannot fracture the same human into different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngagementKey {
    subject_id: i64,
    recipient: String,
}

impl EngagementKey {
    /// Build a key from a subject id and a raw recipient value.
    pub fn new(subject_id: i64, raw_recipient: &str) -> Self {
        Self {
            subject_id,
            recipient: normalize_recipient(raw_recipient),
        }
    }

    /// Integer identifier of the tracked subject (campaign or message).
    pub fn subject_id(&self) -> i64 {
        self.subject_id
    }

    /// Normalized recipient email address.
    pub fn recipient(&self) -> &str {
        &self.recipient
    }
}

/// Normalize a raw recipient value: percent-decode, trim, lowercase.
///
/// Tracking links arrive with the email percent-encoded inside an already
/// query-encoded URL, so one decode beyond the query layer is required.
fn normalize_recipient(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8_lossy();
    decoded.trim().to_lowercase()
}

/// Signals captured from a single pixel or redirect fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSignals {
    /// Declared user agent, empty when the header is missing.
    pub user_agent: String,
    /// Resolved client address; absent when nothing in the header chain or
    /// the connection yields a parseable address.
    pub client_ip: Option<IpAddr>,
    /// Raw proxy-chain header value, empty when missing.
    pub via: String,
}

/// One open signal to fold into the reconciled state for its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenObservation {
    pub key: EngagementKey,
    pub observed_at: DateTime<Utc>,
    pub user_agent: String,
    pub client_ip: Option<IpAddr>,
    pub via: String,
    /// Classifier verdict for this fetch; the click path contributes `false`.
    pub suspect: bool,
}

impl OpenObservation {
    /// Assemble an observation from fetch signals and a verdict.
    pub fn from_signals(
        key: EngagementKey,
        observed_at: DateTime<Utc>,
        signals: FetchSignals,
        suspect: bool,
    ) -> Self {
        Self {
            key,
            observed_at,
            user_agent: signals.user_agent,
            client_ip: signals.client_ip,
            via: signals.via,
            suspect,
        }
    }
}

/// Reconciled open state for one engagement key.
///
/// At most one record exists per key; it is created by the first open or
/// click and updated in place by every later signal. Records are never
/// deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRecord {
    pub key: EngagementKey,
    /// Latest observed open time; never regresses on out-of-order delivery.
    pub open_time: DateTime<Utc>,
    pub user_agent: String,
    pub client_ip: Option<IpAddr>,
    pub via: String,
    /// Monotonically non-increasing: once genuine, always genuine.
    pub is_suspect: bool,
}

impl OpenRecord {
    /// Materialize the first record for a key from its initial observation.
    pub fn from_observation(observation: &OpenObservation) -> Self {
        Self {
            key: observation.key.clone(),
            open_time: observation.observed_at,
            user_agent: observation.user_agent.clone(),
            client_ip: observation.client_ip,
            via: observation.via.clone(),
            is_suspect: observation.suspect,
        }
    }

    /// Fold a later observation into this record.
    ///
    /// `open_time` takes the maximum, descriptive fields take the latest
    /// observation, and `is_suspect` takes the logical AND, so a confirmed
    /// record can never revert to suspect.
    pub fn merge(&mut self, observation: &OpenObservation) {
        self.open_time = self.open_time.max(observation.observed_at);
        self.user_agent = observation.user_agent.clone();
        self.client_ip = observation.client_ip;
        self.via = observation.via.clone();
        self.is_suspect = self.is_suspect && observation.suspect;
    }
}

/// One click event; the log is append-only and never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub key: EngagementKey,
    /// Decoded destination the recipient was forwarded to.
    pub url: String,
    pub clicked_at: DateTime<Utc>,
}
