//! Engagement reconciliation core.
//!
//! Transport and storage agnostic: inbound adapters feed it request
//! signals, outbound adapters give its records a home. The interesting
//! decisions live here — suspect classification, the merge that keeps one
//! authoritative open record per key, and click-triggered confirmation.

pub mod classifier;
pub mod engagement;
pub mod ports;
pub mod recorder;

pub use classifier::{IpPrefix, ProxySignatures};
pub use engagement::{ClickEvent, EngagementKey, FetchSignals, OpenObservation, OpenRecord};
pub use recorder::EngagementService;
