//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; Diesel uses them
//! for compile-time query validation and type-safe SQL generation.

diesel::table! {
    /// Reconciled open state, one row per engagement key.
    ///
    /// The composite primary key carries the at-most-one-record-per-key
    /// invariant; all merging happens in a single upsert statement.
    email_opens (subject_id, recipient) {
        /// Integer id of the tracked subject.
        subject_id -> Int8,
        /// Normalized recipient email address.
        recipient -> Text,
        /// Latest observed open time.
        open_time -> Timestamptz,
        /// User agent of the latest observation.
        user_agent -> Text,
        /// Client address of the latest observation; NULL when unresolved.
        client_ip -> Nullable<Text>,
        /// Raw proxy-chain header of the latest observation.
        via -> Text,
        /// Whether the open is still attributed to automated prefetching.
        is_suspect -> Bool,
    }
}

diesel::table! {
    /// Append-only click log; rows are never updated or deleted.
    email_clicks (id) {
        /// Surrogate key from a bigserial sequence.
        id -> Int8,
        /// Integer id of the tracked subject.
        subject_id -> Int8,
        /// Normalized recipient email address.
        recipient -> Text,
        /// Decoded destination the recipient was forwarded to.
        url -> Text,
        /// When the click was received.
        click_time -> Timestamptz,
    }
}
