use laptime_core::{
    project, sample_contacts, AttributeSet, ChartModel, Column, NewRecord, RowEvent, RowStore,
};
use std::cell::RefCell;
use std::rc::Rc;

fn seeded_store() -> RowStore {
    let mut store = RowStore::new(AttributeSet::lap_stages());
    for fields in sample_contacts(&AttributeSet::lap_stages()) {
        store.add(fields).unwrap();
    }
    store
}

#[test]
fn add_then_delete_emits_added_then_deleted() {
    let mut store = seeded_store();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    store.subscribe_fn(move |event| sink.borrow_mut().push(event.clone()));

    let created = store.add(NewRecord::new("Mia", "Tester", "mia@example.com")).unwrap();
    let position = store.position_of(created.id).unwrap();
    let removed = store.delete(position).unwrap();

    assert_eq!(removed, created.id);
    assert_eq!(
        *events.borrow(),
        vec![RowEvent::Added(created.clone()), RowEvent::Deleted(created.id)]
    );
    assert!(store.get(created.id).is_none());
}

#[test]
fn failed_mutations_emit_nothing() {
    let mut store = seeded_store();
    let (_, receiver) = store.subscribe_channel();

    assert!(store.delete(10).is_err());
    assert!(store.delete_id(10).is_err());
    assert!(store.update_field(1, &Column::Id, "7").is_err());

    assert!(receiver.try_recv().is_err());
}

#[test]
fn channel_receives_events_in_emission_order() {
    let mut store = seeded_store();
    let (_, receiver) = store.subscribe_channel();

    store.update_field(2, &Column::Job, "Director").unwrap();
    store.delete_id(1).unwrap();

    let kinds = receiver
        .try_iter()
        .map(|event| (event.kind(), event.record_id()))
        .collect::<Vec<_>>();
    assert_eq!(kinds, vec![("updated", 2), ("deleted", 1)]);
}

#[test]
fn observers_see_deletes_of_rows_never_announced() {
    // Rows added before subscribing are never announced via `Added`.
    let mut store = seeded_store();
    let chart = Rc::new(RefCell::new(
        ChartModel::from_records("Lap times", store.attributes().clone(), &[]).unwrap(),
    ));
    store.subscribe(Box::new(Rc::clone(&chart)));

    store.delete_id(3).unwrap();
    assert!(chart.borrow().series().is_empty());
}

#[test]
fn chart_model_tracks_full_reprojection() {
    let mut store = seeded_store();
    let chart = Rc::new(RefCell::new(
        ChartModel::from_records("Lap times", store.attributes().clone(), store.all()).unwrap(),
    ));
    let subscription = store.subscribe(Box::new(Rc::clone(&chart)));

    let added = store
        .add(
            NewRecord::new("Mia", "", "")
                .with_duration("city_escape", "2:00")
                .with_duration("wild_canyon", "2:10")
                .with_duration("prison_lane", "2:20"),
        )
        .unwrap();
    store.delete_id(2).unwrap();
    store
        .update_field(4, &Column::Attribute("prison_lane".to_string()), "9:59")
        .unwrap();
    store.update_field(added.id, &Column::Name, "Mia K").unwrap();

    let expected = project(store.all(), store.attributes()).unwrap();
    let actual = chart
        .borrow()
        .series()
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(actual, expected);
    assert_eq!(chart.borrow().max_value(), 599);

    assert!(store.unsubscribe(subscription));
    store.delete_id(1).unwrap();
    assert_eq!(chart.borrow().series().len(), 4);
}

#[test]
fn restored_row_returns_to_its_chart_position() {
    let mut store = seeded_store();
    let chart = Rc::new(RefCell::new(
        ChartModel::from_records("Lap times", store.attributes().clone(), store.all()).unwrap(),
    ));
    store.subscribe(Box::new(Rc::clone(&chart)));

    let removed = store.get(2).unwrap().clone();
    let position = store.position_of(2).unwrap();
    store.delete(position).unwrap();
    store.restore(position, removed).unwrap();

    assert_eq!(store.position_of(2), Some(1));
    let expected = project(store.all(), store.attributes()).unwrap();
    let actual = chart
        .borrow()
        .series()
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
    assert_eq!(actual, expected);
}
