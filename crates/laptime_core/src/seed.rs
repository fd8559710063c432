//! Sample contacts shown by a freshly created board.
//!
//! Sample lap times are assigned to the board's attributes by position;
//! attributes past the third start blank.

use crate::model::attribute::AttributeSet;
use crate::model::record::NewRecord;

const SAMPLE_CONTACTS: &[(&str, &str, &str, [&str; 3])] = &[
    (
        "Joe",
        "Senior Web Developer",
        "joe@example.com",
        ["2:51", "1:12", "3:15"],
    ),
    (
        "Lara",
        "Project Manager",
        "lara@example.com",
        ["3:25", "2:31", "4:27"],
    ),
    (
        "David",
        "Data Analyst",
        "david@example.com",
        ["3:41", "7:33", "5:02"],
    ),
    (
        "Jane",
        "Senior Python Developer",
        "jane@example.com",
        ["3:10", "2:43", "3:43"],
    ),
];

/// The four demo contacts, in display order, keyed for `attributes`.
pub fn sample_contacts(attributes: &AttributeSet) -> Vec<NewRecord> {
    SAMPLE_CONTACTS
        .iter()
        .map(|(name, job, email, times)| {
            attributes
                .keys()
                .zip(times)
                .fold(NewRecord::new(*name, *job, *email), |record, (key, time)| {
                    record.with_duration(key, *time)
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::sample_contacts;
    use crate::model::attribute::{AttributeSet, AttributeSpec};

    #[test]
    fn samples_cover_every_lap_stage() {
        let attributes = AttributeSet::lap_stages();
        let samples = sample_contacts(&attributes);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].name, "Joe");
        for sample in &samples {
            assert!(attributes.keys().all(|key| sample.durations.contains_key(key)));
        }
    }

    #[test]
    fn samples_follow_custom_attributes_by_position() {
        let attributes = AttributeSet::new(vec![AttributeSpec::new("green_hill", "Green Hill")])
            .unwrap();
        let samples = sample_contacts(&attributes);
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].durations.len(), 1);
        assert_eq!(
            samples[0].durations.get("green_hill").map(String::as_str),
            Some("2:51")
        );
    }
}
