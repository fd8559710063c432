//! Chart series projected from records.

use crate::model::record::RecordId;
use serde::{Deserialize, Serialize};

/// One bar set: a record's lap times in attribute order, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    /// Source row, used to apply incremental updates.
    pub record_id: RecordId,
    /// Record name.
    pub label: String,
    pub values: Vec<u32>,
}

impl Series {
    /// Largest value of this series, `0` when empty.
    pub fn max_value(&self) -> u32 {
        self.values.iter().copied().max().unwrap_or(0)
    }
}
