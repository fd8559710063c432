//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the data access contract the contact service depends on.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod contact_repo;
