//! Outbound adapters implementing the core's driven ports.

pub mod persistence;
