//! Domain model for the lap board.
//!
//! # Responsibility
//! - Define contact records, their columns and the configured lap attributes.
//! - Define the chart series derived from records.
//!
//! # Invariants
//! - Records are owned by the row store; series are read-only projections.

pub mod attribute;
pub mod record;
pub mod series;
