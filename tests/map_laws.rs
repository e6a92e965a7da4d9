//! Property-based tests for Map.
//!
//! A `BTreeMap<String, _>` serves as the model: after any sequence of puts
//! and removes both must hold the same entries in the same order.

use cslib::map::Map;
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Operation {
    Put(String, i32),
    Remove(String),
}

fn key() -> impl Strategy<Value = String> {
    "[a-e]{1,3}"
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (key(), any::<i32>()).prop_map(|(key, value)| Operation::Put(key, value)),
        1 => key().prop_map(Operation::Remove),
    ]
}

proptest! {
    /// Law: the map behaves like an ordered map model.
    #[test]
    fn prop_map_matches_model(operations in prop::collection::vec(operation(), 0..150)) {
        let mut map = Map::new();
        let mut model = BTreeMap::new();

        for operation in operations {
            match operation {
                Operation::Put(key, value) => {
                    map.put(&key, value);
                    model.insert(key, value);
                }
                Operation::Remove(key) => {
                    prop_assert_eq!(map.remove(&key), model.remove(&key).is_some());
                }
            }
        }

        prop_assert_eq!(map.len(), model.len());
        let entries: Vec<(String, i32)> = map
            .iter()
            .map(|(key, value)| (key.to_owned(), *value))
            .collect();
        prop_assert_eq!(entries, model.into_iter().collect::<Vec<_>>());
    }

    /// Law: get after put returns the value that was put.
    #[test]
    fn prop_get_put_law(
        entries in prop::collection::vec((key(), any::<i32>()), 0..30),
        lookup_key in key(),
        value: i32
    ) {
        let mut map: Map<i32> = entries.into_iter().collect();
        map.put(&lookup_key, value);
        prop_assert_eq!(map.get(&lookup_key), Some(&value));
    }

    /// Law: a clone compares equal until either side changes.
    #[test]
    fn prop_clone_equality(
        entries in prop::collection::vec((key(), any::<i32>()), 1..30)
    ) {
        let map: Map<i32> = entries.iter().cloned().collect();
        let mut copy = map.clone();
        prop_assert_eq!(&copy, &map);

        copy.remove(&entries[0].0);
        prop_assert_ne!(&copy, &map);
    }
}
