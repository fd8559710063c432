//! Records to chart series projection.
//!
//! # Responsibility
//! - Turn lap-time text into one numeric bar set per record.
//!
//! # Invariants
//! - Output order equals input order.
//! - `values[i]` belongs to `attributes[i]`.
//! - Any malformed lap time fails the whole projection.

use crate::duration::{parse_duration, DurationParseError};
use crate::model::attribute::AttributeSet;
use crate::model::record::{Record, RecordId};
use crate::model::series::Series;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Projection failure for one record/attribute pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    Format {
        record_id: RecordId,
        attribute: String,
        source: DurationParseError,
    },
    MissingAttribute {
        record_id: RecordId,
        attribute: String,
    },
}

impl Display for ProjectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format {
                record_id,
                attribute,
                source,
            } => write!(f, "record {record_id} has a bad `{attribute}` time: {source}"),
            Self::MissingAttribute {
                record_id,
                attribute,
            } => write!(f, "record {record_id} has no `{attribute}` time"),
        }
    }
}

impl Error for ProjectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Format { source, .. } => Some(source),
            Self::MissingAttribute { .. } => None,
        }
    }
}

/// Projects every record into a series, failing fast.
pub fn project(records: &[Record], attributes: &AttributeSet) -> ProjectionResult<Vec<Series>> {
    records
        .iter()
        .map(|record| project_record(record, attributes))
        .collect()
}

/// Projects one record into its series.
pub fn project_record(record: &Record, attributes: &AttributeSet) -> ProjectionResult<Series> {
    let values = attributes
        .keys()
        .map(|key| {
            let text = record
                .duration(key)
                .ok_or_else(|| ProjectionError::MissingAttribute {
                    record_id: record.id,
                    attribute: key.to_string(),
                })?;
            parse_duration(text).map_err(|source| ProjectionError::Format {
                record_id: record.id,
                attribute: key.to_string(),
                source,
            })
        })
        .collect::<ProjectionResult<Vec<_>>>()?;

    Ok(Series {
        record_id: record.id,
        label: record.name.clone(),
        values,
    })
}
