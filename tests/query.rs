mod common;

use common::{TestWorkspace, spread_schema};
use csv_extremes::{
    Direction, ExtremalQuery, FileMapper, MapperError, RecordStore,
    data::{Value, parse_typed_value},
    query::{by_field, field_not_sentinel},
    schema::ColumnType,
};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Reading {
    position: usize,
    key: i64,
}

fn store_from(keys: &[i64]) -> RecordStore<Reading> {
    keys.iter()
        .enumerate()
        .map(|(position, &key)| Reading { position, key })
        .collect()
}

#[test]
fn ties_resolve_by_insertion_order() {
    let store = store_from(&[5, 3, 3, 8]);
    let query = ExtremalQuery::new().compare_by_key(|r: &Reading| r.key);
    assert_eq!(query.lowest(&store).unwrap().map(|r| r.position), Some(1));
    assert_eq!(query.highest(&store).unwrap().map(|r| r.position), Some(3));

    let without_eight = ExtremalQuery::new()
        .compare_by_key(|r: &Reading| r.key)
        .filter(|r: &Reading| r.key != 8);
    let lowest = without_eight.lowest(&store).unwrap().expect("records survive");
    assert_eq!((lowest.position, lowest.key), (1, 3));

    let tied = store_from(&[3, 3]);
    assert_eq!(query.lowest(&tied).unwrap().map(|r| r.position), Some(0));
    assert_eq!(query.highest(&tied).unwrap().map(|r| r.position), Some(1));
}

#[test]
fn query_without_comparator_is_invalid_argument() {
    let store = store_from(&[1]);
    let err = ExtremalQuery::<Reading>::new()
        .select(&store, Direction::Lowest)
        .unwrap_err();
    assert!(matches!(err, MapperError::InvalidArgument(_)));
}

#[test]
fn filter_removing_everything_yields_none() {
    let store = store_from(&[1, 2, 3]);
    let query = ExtremalQuery::new()
        .compare_by_key(|r: &Reading| r.key)
        .filter(|r: &Reading| r.key > 10);
    assert_eq!(query.highest(&store).unwrap(), None);
}

#[test]
fn mapped_records_are_queried_by_field() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "range.csv",
        "Day,Min,Max\n1,59,88\n2,59,50\n3,63,79\n4,55,77\n5,,70\n",
    );
    let records = FileMapper::new(spread_schema()).map_file(&path).unwrap();
    let store: RecordStore<_> = records.into_iter().collect();

    let lowest = ExtremalQuery::new()
        .compare(by_field("spread"))
        .filter(field_not_sentinel("Spread"))
        .lowest(&store)
        .unwrap()
        .expect("a valid spread exists");
    assert_eq!(lowest.integer("Day"), 3);

    let unfiltered = ExtremalQuery::new()
        .compare(by_field("Spread"))
        .lowest(&store)
        .unwrap()
        .expect("store is not empty");
    assert_eq!(unfiltered.integer("Day"), 2);
}

proptest! {
    #[test]
    fn lowest_is_not_above_any_key(keys in proptest::collection::vec(-1_000i64..1_000, 1..40)) {
        let store = store_from(&keys);
        let query = ExtremalQuery::new().compare_by_key(|r: &Reading| r.key);
        let lowest = query.lowest(&store).unwrap().expect("non-empty store");
        prop_assert!(keys.iter().all(|&k| lowest.key <= k));
        let first = keys.iter().position(|&k| k == lowest.key).unwrap();
        prop_assert_eq!(lowest.position, first);
    }

    #[test]
    fn highest_is_not_below_any_key(keys in proptest::collection::vec(-1_000i64..1_000, 1..40)) {
        let store = store_from(&keys);
        let query = ExtremalQuery::new().compare_by_key(|r: &Reading| r.key);
        let highest = query.highest(&store).unwrap().expect("non-empty store");
        prop_assert!(keys.iter().all(|&k| highest.key >= k));
        let last = keys.iter().rposition(|&k| k == highest.key).unwrap();
        prop_assert_eq!(highest.position, last);
    }

    #[test]
    fn filtered_selection_only_returns_kept_records(
        keys in proptest::collection::vec(-1i64..50, 0..40)
    ) {
        let store = store_from(&keys);
        let query = ExtremalQuery::new()
            .compare_by_key(|r: &Reading| r.key)
            .filter(|r: &Reading| r.key != -1);
        let selected = query.lowest(&store).unwrap();
        match selected {
            Some(reading) => prop_assert!(reading.key != -1),
            None => prop_assert!(keys.iter().all(|&k| k == -1)),
        }
    }

    #[test]
    fn integer_cells_survive_display_and_parse(value in any::<i64>()) {
        let parsed = parse_typed_value(&value.to_string(), ColumnType::Integer).unwrap();
        let parsed = parsed.expect("non-empty cell");
        prop_assert_eq!(&parsed, &Value::Integer(value));
        let reparsed = parse_typed_value(&parsed.as_display(), ColumnType::Integer).unwrap();
        prop_assert_eq!(reparsed, Some(parsed));
    }
}

#[test]
fn sentinel_values_reparse_to_themselves() {
    for kind in [ColumnType::Integer, ColumnType::Float] {
        let sentinel = Value::sentinel(kind);
        let reparsed = parse_typed_value(&sentinel.as_display(), kind)
            .unwrap()
            .expect("numeric sentinel is not empty");
        assert_eq!(reparsed, sentinel);
        assert!(reparsed.is_sentinel());
    }
    assert_eq!(
        parse_typed_value(&Value::sentinel(ColumnType::Text).as_display(), ColumnType::Text)
            .unwrap(),
        None
    );
}
