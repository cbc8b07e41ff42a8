use crate::index::{
    IndexProperties, Indexer, IndexerConfig, IndexerFactory, IndexerNode, JoinerType,
};
use proptest::{collection::vec, prelude::*};

fn arb_joiner() -> impl Strategy<Value = JoinerType> {
    prop_oneof![
        Just(JoinerType::Equal),
        Just(JoinerType::LessThan),
        Just(JoinerType::LessThanOrEqual),
        Just(JoinerType::GreaterThan),
        Just(JoinerType::GreaterThanOrEqual),
    ]
}

type Case = (Vec<JoinerType>, Vec<Vec<i64>>, Vec<Vec<i64>>);

// Joiners, stored key rows, query key rows; every row has one key per joiner.
fn arb_case() -> impl Strategy<Value = Case> {
    vec(arb_joiner(), 0..=4).prop_flat_map(|joiners| {
        let width = joiners.len();
        (
            Just(joiners),
            vec(vec(0_i64..4, width), 0..24),
            vec(vec(0_i64..4, width), 1..8),
        )
    })
}

fn holds(joiner: JoinerType, left: i64, right: i64) -> bool {
    match joiner {
        JoinerType::Equal => left == right,
        JoinerType::LessThan => left < right,
        JoinerType::LessThanOrEqual => left <= right,
        JoinerType::GreaterThan => left > right,
        JoinerType::GreaterThanOrEqual => left >= right,
        _ => false,
    }
}

fn props(row: &[i64]) -> IndexProperties {
    row.iter().copied().collect()
}

// Index every row, then retract every third one.
fn populate(indexer: &mut IndexerNode<usize, ()>, rows: &[Vec<i64>]) -> Vec<usize> {
    for (id, row) in rows.iter().enumerate() {
        indexer.put(&props(row), id, ()).unwrap();
    }
    for id in (0..rows.len()).step_by(3) {
        indexer.remove(&props(&rows[id]), &id).unwrap();
    }

    (0..rows.len()).filter(|id| id % 3 != 0).collect()
}

fn visited(indexer: &IndexerNode<usize, ()>, query: &[i64]) -> Vec<usize> {
    let mut seen = Vec::new();
    indexer
        .visit(&props(query), &mut |bucket| seen.extend(bucket.keys().copied()))
        .unwrap();
    seen.sort_unstable();

    seen
}

fn expected(
    joiners: &[JoinerType],
    rows: &[Vec<i64>],
    live: &[usize],
    query: &[i64],
    is_left_bridge: bool,
) -> Vec<usize> {
    live.iter()
        .copied()
        .filter(|id| {
            joiners.iter().enumerate().all(|(column, joiner)| {
                let stored = rows[*id][column];
                if is_left_bridge {
                    holds(*joiner, stored, query[column])
                } else {
                    holds(*joiner, query[column], stored)
                }
            })
        })
        .collect()
}

#[test]
fn put_then_remove_restores_previous_state() {
    let factory = IndexerFactory::new([JoinerType::Equal, JoinerType::LessThan]).unwrap();
    let mut indexer = factory.build_indexer::<usize, ()>(true);
    let rows = vec![vec![1, 1], vec![1, 3], vec![2, 2]];
    populate(&mut indexer, &rows);

    let query = [1, 5];
    let before = visited(&indexer, &query);
    let count_before = indexer.count_values();

    indexer.put(&props(&[1, 0]), 99, ()).unwrap();
    assert_ne!(visited(&indexer, &query), before);
    indexer.remove(&props(&[1, 0]), &99).unwrap();

    assert_eq!(visited(&indexer, &query), before);
    assert_eq!(indexer.count_values(), count_before);
}

#[test]
fn missing_column_fails_without_leaving_a_bucket() {
    let factory = IndexerFactory::new([JoinerType::Equal, JoinerType::LessThan]).unwrap();
    let mut indexer = factory.build_indexer::<usize, ()>(true);

    let err = indexer.put(&IndexProperties::single(1), 0, ()).unwrap_err();
    assert!(err.is_contract_violation());
    assert!(indexer.is_empty());
    assert_eq!(indexer.count_matches(&props(&[1, 9])).unwrap(), 0);
}

proptest! {
    #[test]
    fn chain_matches_brute_force_on_both_bridges((joiners, rows, queries) in arb_case()) {
        let factory = IndexerFactory::new(joiners.clone()).unwrap();

        for is_left_bridge in [true, false] {
            let mut indexer = factory.build_indexer::<usize, ()>(is_left_bridge);
            let live = populate(&mut indexer, &rows);
            prop_assert_eq!(indexer.count_values(), live.len());

            for query in &queries {
                let want = expected(&joiners, &rows, &live, query, is_left_bridge);
                prop_assert_eq!(indexer.count_matches(&props(query)).unwrap(), want.len());
                prop_assert_eq!(visited(&indexer, query), want);
            }
        }
    }

    #[test]
    fn fused_equal_comparison_matches_literal_chain((joiners, rows, queries) in arb_case()) {
        let config = IndexerConfig {
            fuse_equal_comparison: true,
            fuse_ranges: false,
        };
        let fused = IndexerFactory::with_config(joiners.clone(), config).unwrap();

        for is_left_bridge in [true, false] {
            let mut indexer = fused.build_indexer::<usize, ()>(is_left_bridge);
            let live = populate(&mut indexer, &rows);

            for query in &queries {
                let want = expected(&joiners, &rows, &live, query, is_left_bridge);
                prop_assert_eq!(visited(&indexer, query), want);
            }
        }
    }

    #[test]
    fn fused_ranges_match_point_queries(
        (joiners, rows, _) in arb_case(),
        points in vec(0_i64..4, 1..6),
    ) {
        let fused =
            IndexerFactory::with_config(joiners.clone(), IndexerConfig::optimized()).unwrap();
        let mut indexer = fused.build_indexer::<usize, ()>(false);
        let live = populate(&mut indexer, &rows);

        for point in points {
            let query = vec![point; joiners.len()];
            let want = expected(&joiners, &rows, &live, &query, false);
            prop_assert_eq!(visited(&indexer, &query), want);
        }
    }
}
