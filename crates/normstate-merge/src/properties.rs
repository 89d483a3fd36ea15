use normstate_types::{AddMode, MergeConfig, Method, NormalizerSpec, OutputMode, Record, State};
use proptest::prelude::*;
use serde_json::{json, Value};

use crate::merger::merge;

fn arb_record() -> impl Strategy<Value = Record> {
    (prop::option::of(0u8..6), any::<i32>()).prop_map(|(id, v)| {
        let value = match id {
            Some(id) => json!({"id": format!("r{id}"), "v": v}),
            None => json!({"v": v}),
        };
        Record::try_from(value).unwrap()
    })
}

fn arb_records() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(arb_record(), 0..8)
}

fn arb_method() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::Get),
        Just(Method::Post),
        Just(Method::Patch),
        Just(Method::Delete),
    ]
}

fn arb_config() -> impl Strategy<Value = MergeConfig> {
    (
        prop::option::of(prop_oneof![Just(AddMode::Append), Just(AddMode::Prepend)]),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        prop_oneof![Just(OutputMode::Legacy), Just(OutputMode::Resolved)],
    )
        .prop_map(|(add, merging_array, mutating_array, merging_datum, mutating_datum, output)| {
            let mut config = MergeConfig::new()
                .merging_array(merging_array)
                .mutating_array(mutating_array)
                .merging_datum(merging_datum)
                .mutating_datum(mutating_datum)
                .with_output(output);
            config.add = add;
            config
        })
}

fn with_offers(records: Vec<Record>) -> State {
    let mut state = State::new();
    state.insert("offers", records);
    state
}

proptest! {
    #[test]
    fn absent_collection_yields_incoming(
        incoming in arb_records(),
        method in arb_method(),
        config in arb_config(),
    ) {
        let next = merge(&State::new(), method, "offers", incoming.clone(), &config).unwrap();
        prop_assert_eq!(next.get("offers").unwrap(), incoming.as_slice());
        prop_assert_eq!(next.len(), 1);
    }

    #[test]
    fn legacy_default_merge_yields_incoming(
        previous in arb_records(),
        incoming in arb_records(),
        merging_datum in any::<bool>(),
    ) {
        let config = MergeConfig::new().merging_datum(merging_datum);
        let next = merge(&with_offers(previous), Method::Patch, "offers", incoming.clone(), &config)
            .unwrap();
        prop_assert_eq!(next.get("offers").unwrap(), incoming.as_slice());
    }

    #[test]
    fn legacy_delete_yields_markers(previous in arb_records(), markers in arb_records()) {
        let next = merge(&with_offers(previous), Method::Delete, "offers", markers.clone(), &MergeConfig::new())
            .unwrap();
        prop_assert_eq!(next.get("offers").unwrap(), markers.as_slice());
    }

    #[test]
    fn append_and_prepend_concatenate(previous in arb_records(), incoming in arb_records()) {
        let state = with_offers(previous.clone());

        let appended = merge(&state, Method::Get, "offers", incoming.clone(),
            &MergeConfig::new().with_add(AddMode::Append)).unwrap();
        let expected: Vec<Record> = previous.iter().chain(&incoming).cloned().collect();
        prop_assert_eq!(appended.get("offers").unwrap(), expected.as_slice());

        let prepended = merge(&state, Method::Get, "offers", incoming.clone(),
            &MergeConfig::new().with_add(AddMode::Prepend)).unwrap();
        let expected: Vec<Record> = incoming.iter().chain(&previous).cloned().collect();
        prop_assert_eq!(prepended.get("offers").unwrap(), expected.as_slice());
    }

    #[test]
    fn resolved_merge_keeps_every_previous_slot(previous in arb_records(), incoming in arb_records()) {
        let config = MergeConfig::new().with_output(OutputMode::Resolved);
        let next = merge(&with_offers(previous.clone()), Method::Get, "offers", incoming.clone(), &config)
            .unwrap();

        let unmatched = incoming
            .iter()
            .filter(|r| !previous.iter().any(|p| p.same_id(r)))
            .count();
        let resolved = next.get("offers").unwrap();
        prop_assert_eq!(resolved.len(), previous.len() + unmatched);
        for (slot, old) in resolved.iter().zip(&previous) {
            prop_assert!(old.id().is_none() || slot.same_id(old));
        }
    }

    #[test]
    fn array_field_is_moved_in_order(
        groups in prop::collection::vec(arb_records(), 1..5),
        config in arb_config(),
    ) {
        let incoming: Vec<Record> = groups
            .iter()
            .enumerate()
            .map(|(i, children)| {
                let kids: Vec<Value> = children.iter().cloned().map(Record::into_value).collect();
                Record::try_from(json!({"id": format!("o{i}"), "stocks": kids})).unwrap()
            })
            .collect();
        let config = config.with_normalizer(NormalizerSpec::new().field("stocks", "stocks"));

        let next = merge(&State::new(), Method::Get, "offers", incoming, &config).unwrap();

        prop_assert!(next.get("offers").unwrap().iter().all(|o| !o.contains("stocks")));
        let all_children: Vec<Record> = groups.into_iter().flatten().collect();
        if all_children.is_empty() {
            prop_assert!(next.get("stocks").is_none());
        } else {
            prop_assert_eq!(next.get("stocks").unwrap(), all_children.as_slice());
        }
    }

    #[test]
    fn previous_state_never_changes(
        previous in arb_records(),
        incoming in arb_records(),
        method in arb_method(),
        config in arb_config(),
    ) {
        let state = with_offers(previous);
        let snapshot = state.clone();
        merge(&state, method, "offers", incoming, &config).unwrap();
        prop_assert_eq!(state, snapshot);
    }
}
