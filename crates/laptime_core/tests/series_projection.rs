use laptime_core::{
    format_duration, project, sample_contacts, AttributeSet, AttributeSpec, Column,
    DurationParseError, NewRecord, ProjectionError, RowStore,
};

fn seeded_store() -> RowStore {
    let mut store = RowStore::new(AttributeSet::lap_stages());
    for fields in sample_contacts(&AttributeSet::lap_stages()) {
        store.add(fields).unwrap();
    }
    store
}

#[test]
fn sample_rows_project_to_seconds() {
    let store = seeded_store();
    let series = project(store.all(), store.attributes()).unwrap();

    let labels = series.iter().map(|s| s.label.as_str()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["Joe", "Lara", "David", "Jane"]);
    assert_eq!(series[0].values, vec![171, 72, 195]);
    assert_eq!(series[1].values, vec![205, 151, 267]);
    assert_eq!(series[2].values, vec![221, 453, 302]);
    assert_eq!(series[3].values, vec![190, 163, 223]);
    assert!(series.iter().all(|s| s.values.len() == 3));
    assert_eq!(series[2].record_id, 3);
}

#[test]
fn projected_seconds_format_back_to_the_stored_text() {
    let store = seeded_store();
    let series = project(store.all(), store.attributes()).unwrap();

    for (record, series) in store.all().iter().zip(&series) {
        for (key, seconds) in store.attributes().keys().zip(&series.values) {
            assert_eq!(Some(format_duration(*seconds).as_str()), record.duration(key));
        }
    }
}

#[test]
fn attribute_order_drives_value_order() {
    let store = seeded_store();
    let reversed = AttributeSet::new(vec![
        AttributeSpec::new("prison_lane", "Prison Lane"),
        AttributeSpec::new("city_escape", "City Escape"),
    ])
    .unwrap();

    let series = project(&store.all()[..1], &reversed).unwrap();
    assert_eq!(series[0].values, vec![195, 171]);
}

#[test]
fn malformed_lap_time_fails_the_whole_projection() {
    let mut store = seeded_store();
    store
        .update_field(
            2,
            &Column::Attribute("wild_canyon".to_string()),
            "two minutes",
        )
        .unwrap();

    let err = project(store.all(), store.attributes()).unwrap_err();
    match err {
        ProjectionError::Format {
            record_id,
            attribute,
            source,
        } => {
            assert_eq!(record_id, 2);
            assert_eq!(attribute, "wild_canyon");
            assert_eq!(
                source,
                DurationParseError::MissingSeparator("two minutes".to_string())
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn blank_rows_cannot_be_projected() {
    let mut store = seeded_store();
    store.add(NewRecord::blank()).unwrap();

    let err = project(store.all(), store.attributes()).unwrap_err();
    assert!(matches!(
        err,
        ProjectionError::Format {
            record_id: 5,
            source: DurationParseError::Empty,
            ..
        }
    ));
}

#[test]
fn missing_attribute_is_reported() {
    let store = seeded_store();
    let extended = AttributeSet::new(vec![
        AttributeSpec::new("city_escape", "City Escape"),
        AttributeSpec::new("green_hill", "Green Hill"),
    ])
    .unwrap();

    let err = project(store.all(), &extended).unwrap_err();
    assert!(matches!(
        err,
        ProjectionError::MissingAttribute { record_id: 1, ref attribute } if attribute == "green_hill"
    ));
}

#[test]
fn empty_input_projects_to_nothing() {
    let series = project(&[], &AttributeSet::lap_stages()).unwrap();
    assert!(series.is_empty());
}
