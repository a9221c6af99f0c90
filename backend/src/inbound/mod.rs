//! Inbound adapters translating transport requests into core operations.

pub mod http;
