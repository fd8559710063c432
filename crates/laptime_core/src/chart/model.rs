//! Incrementally maintained bar-chart state.
//!
//! # Responsibility
//! - Hold the chart's bar sets and category axis.
//! - Follow row events without re-projecting the whole table.
//!
//! # Invariants
//! - Bar sets appear in the order their rows were first seen; a restored
//!   row goes back to the position it was removed from.
//! - Rows whose lap times do not parse are kept as incomplete placeholders
//!   and excluded from `series()` until an update makes them parse.
//! - `Deleted` for an unknown id is ignored.

use crate::chart::projector::{project, project_record, ProjectionResult};
use crate::model::attribute::AttributeSet;
use crate::model::record::{Record, RecordId};
use crate::model::series::Series;
use crate::sync::bridge::{RowEvent, RowObserver};
use log::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
struct ChartRow {
    record_id: RecordId,
    series: Option<Series>,
}

/// Chart-side view of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartModel {
    title: String,
    attributes: AttributeSet,
    rows: Vec<ChartRow>,
}

impl ChartModel {
    /// Builds the initial chart; any malformed lap time fails the build.
    pub fn from_records(
        title: impl Into<String>,
        attributes: AttributeSet,
        records: &[Record],
    ) -> ProjectionResult<Self> {
        let rows = project(records, &attributes)?
            .into_iter()
            .map(|series| ChartRow {
                record_id: series.record_id,
                series: Some(series),
            })
            .collect();
        Ok(Self {
            title: title.into(),
            attributes,
            rows,
        })
    }

    /// Builds a chart that keeps rows with unparsable lap times as incomplete.
    pub fn tolerant(
        title: impl Into<String>,
        attributes: AttributeSet,
        records: &[Record],
    ) -> Self {
        let mut chart = Self {
            title: title.into(),
            attributes,
            rows: Vec::new(),
        };
        for record in records {
            chart.upsert(record);
        }
        chart
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Category axis labels, in value order.
    pub fn categories(&self) -> Vec<&str> {
        self.attributes.labels().collect()
    }

    /// Complete bar sets in display order.
    pub fn series(&self) -> Vec<&Series> {
        self.rows
            .iter()
            .filter_map(|row| row.series.as_ref())
            .collect()
    }

    /// Rows currently left out of the chart.
    pub fn incomplete(&self) -> Vec<RecordId> {
        self.rows
            .iter()
            .filter(|row| row.series.is_none())
            .map(|row| row.record_id)
            .collect()
    }

    /// Largest bar value, for axis scaling.
    pub fn max_value(&self) -> u32 {
        self.series()
            .iter()
            .map(|series| series.max_value())
            .max()
            .unwrap_or(0)
    }

    fn upsert(&mut self, record: &Record) {
        let series = match project_record(record, &self.attributes) {
            Ok(series) => Some(series),
            Err(err) => {
                warn!(
                    "event=chart_row_incomplete module=chart status=error id={} error={}",
                    record.id, err
                );
                None
            }
        };

        match self.rows.iter_mut().find(|row| row.record_id == record.id) {
            Some(row) => row.series = series,
            None => self.rows.push(ChartRow {
                record_id: record.id,
                series,
            }),
        }
    }

    fn insert_at(&mut self, position: usize, record: &Record) {
        self.rows.retain(|row| row.record_id != record.id);
        let position = position.min(self.rows.len());
        self.rows.insert(
            position,
            ChartRow {
                record_id: record.id,
                series: None,
            },
        );
        self.upsert(record);
    }

    fn remove(&mut self, id: RecordId) {
        let before = self.rows.len();
        self.rows.retain(|row| row.record_id != id);
        if self.rows.len() == before {
            debug!(
                "event=chart_row_delete module=chart status=ok id={} known=false",
                id
            );
        }
    }
}

impl RowObserver for ChartModel {
    fn on_row_event(&mut self, event: &RowEvent) {
        match event {
            RowEvent::Added(record) | RowEvent::Updated(record) => self.upsert(record),
            RowEvent::Restored { position, record } => self.insert_at(*position, record),
            RowEvent::Deleted(id) => self.remove(*id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ChartModel;
    use crate::model::attribute::AttributeSet;
    use crate::model::record::Record;
    use crate::sync::bridge::{RowEvent, RowObserver};
    use std::collections::BTreeMap;

    fn record(id: i64, name: &str, times: [&str; 3]) -> Record {
        let keys = ["city_escape", "wild_canyon", "prison_lane"];
        Record {
            id,
            name: name.to_string(),
            job: String::new(),
            email: String::new(),
            durations: keys
                .iter()
                .zip(times)
                .map(|(key, time)| (key.to_string(), time.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn blank_rows_wait_until_complete() {
        let mut chart = ChartModel::from_records(
            "Lap times",
            AttributeSet::lap_stages(),
            &[record(1, "Joe", ["2:51", "1:12", "3:15"])],
        )
        .unwrap();

        chart.on_row_event(&RowEvent::Added(record(2, "", ["", "", ""])));
        assert_eq!(chart.series().len(), 1);
        assert_eq!(chart.incomplete(), vec![2]);

        chart.on_row_event(&RowEvent::Updated(record(2, "Ann", ["1:00", "2:00", "3:00"])));
        assert!(chart.incomplete().is_empty());
        assert_eq!(chart.series()[1].values, vec![60, 120, 180]);
        assert_eq!(chart.max_value(), 195);
    }

    #[test]
    fn restored_rows_keep_their_position() {
        let mut chart = ChartModel::from_records(
            "Lap times",
            AttributeSet::lap_stages(),
            &[
                record(1, "Joe", ["2:51", "1:12", "3:15"]),
                record(3, "David", ["3:41", "7:33", "5:02"]),
            ],
        )
        .unwrap();

        chart.on_row_event(&RowEvent::Restored {
            position: 1,
            record: record(2, "Lara", ["3:25", "2:31", "4:27"]),
        });
        let labels = chart
            .series()
            .iter()
            .map(|series| series.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["Joe", "Lara", "David"]);
    }

    #[test]
    fn unknown_delete_is_ignored() {
        let mut chart =
            ChartModel::from_records("Lap times", AttributeSet::lap_stages(), &[]).unwrap();
        chart.on_row_event(&RowEvent::Deleted(42));
        assert!(chart.series().is_empty());
        assert_eq!(chart.max_value(), 0);
        assert_eq!(
            chart.categories(),
            vec!["City Escape", "Wild Canyon", "Prison Lane"]
        );
    }
}
