//! In-memory row storage for the contact table.
//!
//! # Responsibility
//! - Hold the authoritative ordered row list the table and chart read from.
//! - Publish every mutation through the sync bridge.

pub mod row_store;
