//! Live sync between the row store and its views.
//!
//! # Responsibility
//! - Carry add/update/delete notifications from the store to observers.
//!
//! # See also
//! - `chart::model::ChartModel` for the chart-side observer.

pub mod bridge;
