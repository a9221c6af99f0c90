//! PostgreSQL persistence adapters using Diesel.
//!
//! Thin adapters only: row structs and schema definitions stay internal,
//! all reconciliation semantics are carried inside single atomic
//! statements, and every database error is mapped to a domain port error.

mod diesel_engagement_repository;
mod models;
mod pool;
mod schema;

pub use diesel_engagement_repository::DieselEngagementRepository;
pub use pool::{DbPool, PoolError, PoolSettings};
