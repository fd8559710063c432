//! Bar-chart projection of the contact table.
//!
//! # Responsibility
//! - Convert records into per-record numeric series.
//! - Keep a chart model in step with row events.

pub mod model;
pub mod projector;
