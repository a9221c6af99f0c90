//! Email-engagement tracking backend.
//!
//! Serves a transparent tracking pixel and a click redirect on top of one
//! reconciliation core that decides whether a pixel fetch was a human open
//! or an automated prefetch, merges repeated signals into one record per
//! `(subject, recipient)` pair, and lets a click retroactively confirm a
//! suspect open.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
