//! Tagged object registry behavior across threads.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;

use docstore_dispatch::memory::{RegistryError, TaggedObjectRegistry};

#[test]
fn test_freed_tag_becomes_unknown() {
    let registry = TaggedObjectRegistry::new();
    registry.register("k1", String::from("obj"), ["t1", "t2"]);

    let tagged = registry.objects_by_tag_as::<String>("t1");
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].1.as_str(), "obj");

    registry.free("k1").unwrap();
    assert!(registry.identifiers_by_tag("t1", true).unwrap().is_empty());
    assert_eq!(
        registry.identifiers_by_tag("t1", false),
        Err(RegistryError::UnknownTag { tag: "t1".to_string() })
    );
}

#[test]
fn test_concurrent_register_and_free() {
    let registry = Arc::new(TaggedObjectRegistry::new());
    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                for i in 0..250 {
                    let id = format!("w{worker}/{i}");
                    registry.register(id.clone(), i, [format!("worker:{worker}"), "all".to_string()]);
                    if i % 2 == 0 {
                        registry.free(&id).unwrap();
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(registry.len(), 500);
    assert_eq!(registry.identifiers_by_tag("all", false).unwrap().len(), 500);
    assert_eq!(registry.free_objects_by_tag("worker:0").len(), 125);
    assert_eq!(registry.len(), 375);

    registry.free_all();
    assert!(registry.is_empty());
    assert_eq!(registry.tag_count(), 0);
}

#[test]
fn test_free_by_tag_is_all_or_nothing_for_readers() {
    const GROUP: usize = 200;

    for _ in 0..50 {
        let registry = Arc::new(TaggedObjectRegistry::new());
        for i in 0..GROUP {
            registry.register(format!("obj/{i}"), i, ["grp", "other"]);
        }

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let registry = Arc::clone(&registry);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while !done.load(Ordering::Acquire) {
                    seen.push(registry.identifiers_by_tag("other", true).unwrap().len());
                }
                seen.push(registry.identifiers_by_tag("other", true).unwrap().len());
                seen
            })
        };

        let freed = registry.free_objects_by_tag("grp");
        done.store(true, Ordering::Release);
        assert_eq!(freed.len(), GROUP);

        let seen = reader.join().unwrap();
        assert!(
            seen.iter().all(|&count| count == GROUP || count == 0),
            "reader saw a partially freed group: {seen:?}"
        );
        assert_eq!(seen.last(), Some(&0));
    }
}

#[derive(Debug, Clone)]
enum Op {
    Register { id: usize, tags: BTreeSet<usize> },
    Free { id: usize },
    FreeByTag { tag: usize },
}

const IDS: usize = 6;
const TAGS: usize = 4;

fn id_name(id: usize) -> String {
    format!("k{id}")
}

fn tag_name(tag: usize) -> String {
    format!("t{tag}")
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..IDS, prop::collection::btree_set(0..TAGS, 0..=TAGS))
            .prop_map(|(id, tags)| Op::Register { id, tags }),
        2 => (0..IDS).prop_map(|id| Op::Free { id }),
        1 => (0..TAGS).prop_map(|tag| Op::FreeByTag { tag }),
    ]
}

fn assert_matches_model(
    registry: &TaggedObjectRegistry,
    model: &HashMap<String, BTreeSet<String>>,
) -> Result<(), TestCaseError> {
    for id in (0..IDS).map(id_name) {
        let expected = model.contains_key(&id);
        prop_assert_eq!(registry.has(&id), expected);
        prop_assert_eq!(registry.get(&id).is_some(), expected);
        prop_assert_eq!(registry.tags_of(&id), model.get(&id).cloned());
    }
    for tag in (0..TAGS).map(tag_name) {
        let expected: BTreeSet<String> = model
            .iter()
            .filter(|(_, tags)| tags.contains(&tag))
            .map(|(id, _)| id.clone())
            .collect();
        prop_assert_eq!(registry.identifiers_by_tag(&tag, true).unwrap(), expected);
    }
    prop_assert_eq!(registry.len(), model.len());
    Ok(())
}

proptest! {
    #[test]
    fn registry_matches_model(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let registry = TaggedObjectRegistry::new();
        let mut model: HashMap<String, BTreeSet<String>> = HashMap::new();

        for op in ops {
            match op {
                Op::Register { id, tags } => {
                    let tags: BTreeSet<String> = tags.into_iter().map(tag_name).collect();
                    registry.register(id_name(id), id, tags.clone());
                    model.insert(id_name(id), tags);
                }
                Op::Free { id } => {
                    let freed = registry.free(&id_name(id));
                    prop_assert_eq!(freed.is_ok(), model.remove(&id_name(id)).is_some());
                }
                Op::FreeByTag { tag } => {
                    let tag = tag_name(tag);
                    let expected: BTreeSet<String> = model
                        .iter()
                        .filter(|(_, tags)| tags.contains(&tag))
                        .map(|(id, _)| id.clone())
                        .collect();
                    model.retain(|id, _| !expected.contains(id));
                    prop_assert_eq!(registry.free_objects_by_tag(&tag), expected);
                }
            }
            assert_matches_model(&registry, &model)?;
        }
    }
}
