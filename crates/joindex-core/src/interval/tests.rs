use crate::{
    interval::{BreakRepairCase, Interval, IntervalTree},
    obs::{MetricsEvent, MetricsSink, with_metrics_sink},
};
use proptest::{collection::vec, prelude::*};
use std::{cell::RefCell, collections::BTreeMap};

type Tree = IntervalTree<char, i64, i64>;

fn tree() -> Tree {
    IntervalTree::new(|a: &i64, b: &i64| b - a)
}

fn interval(value: char, start: i64, end: i64) -> Interval<char, i64> {
    Interval::new(value, start, end).unwrap()
}

fn clusters(tree: &Tree) -> Vec<(i64, i64, usize, bool)> {
    tree.clusters()
        .map(|c| (*c.start(), *c.end(), c.count(), c.has_overlap()))
        .collect()
}

fn breaks(tree: &Tree) -> Vec<(i64, i64, i64)> {
    tree.breaks()
        .map(|b| (*b.previous_cluster().start(), *b.next_cluster().start(), *b.length()))
        .collect()
}

fn overlapping(tree: &Tree, start: i64, end: i64) -> Vec<char> {
    let mut seen = Vec::new();
    tree.visit(&start, &end, |value| seen.push(*value)).unwrap();
    seen.sort_unstable();

    seen
}

#[derive(Default)]
struct RepairSink {
    cases: RefCell<Vec<BreakRepairCase>>,
}

impl MetricsSink for RepairSink {
    fn record(&self, event: MetricsEvent) {
        if let MetricsEvent::BreakRepair { case } = event {
            self.cases.borrow_mut().push(case);
        }
    }
}

// Add the last interval under a capturing sink and report the repair case.
fn repair_case(seed: &[(char, i64, i64)], last: (char, i64, i64)) -> (Tree, Vec<BreakRepairCase>) {
    let mut tree = tree();
    for (value, start, end) in seed {
        tree.add(interval(*value, *start, *end)).unwrap();
    }

    let sink = RepairSink::default();
    with_metrics_sink(&sink, || tree.add(interval(last.0, last.1, last.2)).unwrap());

    (tree, sink.cases.into_inner())
}

#[test]
fn overlap_query_and_cluster_split() {
    let mut tree = tree();
    tree.add(interval('a', 1, 3)).unwrap();
    tree.add(interval('b', 2, 5)).unwrap();
    tree.add(interval('c', 7, 9)).unwrap();

    assert_eq!(overlapping(&tree, 4, 8), vec!['b', 'c']);
    assert_eq!(clusters(&tree), vec![(1, 5, 2, true), (7, 9, 1, false)]);
    assert_eq!(breaks(&tree), vec![(1, 7, 2)]);

    tree.remove(&interval('b', 2, 5)).unwrap();
    assert_eq!(clusters(&tree), vec![(1, 3, 1, false), (7, 9, 1, false)]);
    assert_eq!(breaks(&tree), vec![(1, 7, 4)]);

    let err = tree.remove(&interval('b', 2, 5)).unwrap_err();
    assert!(err.is_contract_violation());
}

#[test]
fn removing_a_bridge_splits_into_fragments() {
    let mut tree = tree();
    tree.add(interval('a', 0, 2)).unwrap();
    tree.add(interval('b', 4, 6)).unwrap();
    tree.add(interval('c', 8, 9)).unwrap();
    tree.add(interval('x', 1, 8)).unwrap();
    assert_eq!(clusters(&tree), vec![(0, 9, 4, true)]);
    assert!(breaks(&tree).is_empty());

    tree.remove(&interval('x', 1, 8)).unwrap();
    assert_eq!(
        clusters(&tree),
        vec![(0, 2, 1, false), (4, 6, 1, false), (8, 9, 1, false)]
    );
    assert_eq!(breaks(&tree), vec![(0, 4, 2), (4, 8, 2)]);
}

#[test]
fn touching_intervals_share_a_cluster_without_overlap() {
    let mut tree = tree();
    tree.add(interval('a', 1, 3)).unwrap();
    tree.add(interval('b', 3, 5)).unwrap();

    assert_eq!(clusters(&tree), vec![(1, 5, 2, false)]);
    assert_eq!(overlapping(&tree, 3, 3), vec!['a', 'b']);

    let cluster = tree.clusters().next().unwrap();
    assert_eq!(cluster.length(), 4);
    assert_eq!(cluster.iter().copied().collect::<Vec<_>>(), vec!['a', 'b']);
}

#[test]
fn repeat_registration_tracks_multiplicity() {
    let mut tree = tree();
    tree.add(interval('a', 1, 4)).unwrap();
    tree.add(interval('a', 1, 4)).unwrap();

    assert_eq!(clusters(&tree), vec![(1, 4, 2, true)]);
    assert_eq!(overlapping(&tree, 2, 2), vec!['a', 'a']);

    tree.remove(&interval('a', 1, 4)).unwrap();
    assert!(tree.contains(&'a'));
    assert_eq!(clusters(&tree), vec![(1, 4, 1, false)]);

    tree.remove(&interval('a', 1, 4)).unwrap();
    assert!(tree.is_empty());
    assert!(clusters(&tree).is_empty());
}

#[test]
fn conflicting_bounds_and_inverted_inputs_are_contract_violations() {
    let mut tree = tree();
    tree.add(interval('a', 1, 4)).unwrap();

    assert!(tree.add(interval('a', 2, 4)).unwrap_err().is_contract_violation());
    assert!(tree.remove(&interval('a', 1, 5)).unwrap_err().is_contract_violation());
    assert!(Interval::new('z', 3, 1).unwrap_err().is_contract_violation());
    assert!(tree.visit(&5, &4, |_| {}).unwrap_err().is_contract_violation());
    assert_eq!(clusters(&tree), vec![(1, 4, 1, false)]);
}

#[test]
fn zero_length_interval_inside_another_overlaps() {
    let mut tree = tree();
    tree.add(interval('a', 1, 3)).unwrap();
    tree.add(interval('p', 2, 2)).unwrap();

    assert_eq!(clusters(&tree), vec![(1, 3, 2, true)]);
    assert_eq!(overlapping(&tree, 2, 2), vec!['a', 'p']);
    assert_eq!(overlapping(&tree, 3, 7), vec!['a']);
}

#[test]
fn merge_spanning_every_break_deletes_them() {
    let (tree, cases) = repair_case(&[('a', 0, 1), ('b', 3, 4), ('c', 6, 7)], ('x', 1, 6));

    assert_eq!(cases, vec![BreakRepairCase::AllSpanned]);
    assert_eq!(clusters(&tree), vec![(0, 7, 4, true)]);
    assert!(breaks(&tree).is_empty());
}

#[test]
fn merge_spanning_first_break_relinks_the_last() {
    let (tree, cases) = repair_case(&[('a', 0, 1), ('b', 3, 4), ('c', 10, 11)], ('x', 1, 3));

    assert_eq!(cases, vec![BreakRepairCase::FirstSpanned]);
    assert_eq!(breaks(&tree), vec![(0, 10, 6)]);
}

#[test]
fn merge_spanning_last_break_relinks_the_first() {
    let (tree, cases) = repair_case(&[('a', 0, 1), ('b', 5, 6)], ('x', 4, 5));

    assert_eq!(cases, vec![BreakRepairCase::LastSpanned]);
    assert_eq!(clusters(&tree), vec![(0, 1, 1, false), (4, 6, 2, false)]);
    assert_eq!(breaks(&tree), vec![(0, 4, 3)]);
}

#[test]
fn merge_spanning_no_break_relinks_both_ends() {
    let (tree, cases) = repair_case(&[('a', 0, 1), ('b', 5, 6), ('c', 10, 11)], ('x', 4, 5));

    assert_eq!(cases, vec![BreakRepairCase::NoneSpanned]);
    assert_eq!(breaks(&tree), vec![(0, 4, 3), (4, 10, 4)]);
}

///
/// MODEL
///

#[derive(Clone, Debug)]
enum Op {
    Add(char, i64, i64),
    Repeat(char),
    Remove(char),
}

fn arb_value() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['a', 'b', 'c', 'd', 'e', 'f', 'g'])
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_value(), 0_i64..24, 0_i64..5).prop_map(|(v, s, len)| Op::Add(v, s, s + len)),
        1 => arb_value().prop_map(Op::Repeat),
        2 => arb_value().prop_map(Op::Remove),
    ]
}

type Model = BTreeMap<char, (i64, i64, usize)>;

// Registrations sorted by start, expanded by multiplicity.
fn registrations(model: &Model) -> Vec<(char, i64, i64)> {
    let mut all: Vec<_> = model
        .iter()
        .flat_map(|(v, (s, e, n))| std::iter::repeat_n((*v, *s, *e), *n))
        .collect();
    all.sort_by_key(|(_, s, _)| *s);

    all
}

fn overlaps(a: (char, i64, i64), b: (char, i64, i64)) -> bool {
    a.1 == b.1 || (a.1 < b.1 && b.1 < a.2) || (b.1 < a.1 && a.1 < b.2)
}

fn expected_clusters(model: &Model) -> Vec<(i64, i64, usize, bool)> {
    let mut groups: Vec<Vec<(char, i64, i64)>> = Vec::new();
    let mut reach = i64::MIN;

    for reg in registrations(model) {
        match groups.last_mut() {
            Some(group) if reg.1 <= reach => group.push(reg),
            _ => groups.push(vec![reg]),
        }
        reach = if groups.last().map_or(0, Vec::len) == 1 {
            reg.2
        } else {
            reach.max(reg.2)
        };
    }

    groups
        .iter()
        .map(|group| {
            let start = group[0].1;
            let end = group.iter().map(|r| r.2).max().unwrap_or(start);
            let has_overlap = group.iter().enumerate().any(|(i, a)| {
                group[i + 1..].iter().any(|b| overlaps(*a, *b))
            });
            (start, end, group.len(), has_overlap)
        })
        .collect()
}

fn expected_overlapping(model: &Model, start: i64, end: i64) -> Vec<char> {
    let mut seen: Vec<char> = registrations(model)
        .into_iter()
        .filter(|(_, s, e)| *s <= end && *e >= start)
        .map(|(v, _, _)| v)
        .collect();
    seen.sort_unstable();

    seen
}

proptest! {
    #[test]
    fn incremental_clusters_match_full_recompute(
        ops in vec(arb_op(), 1..40),
        queries in vec((0_i64..30, 0_i64..6), 1..4),
    ) {
        let mut tree = tree();
        let mut model = Model::new();

        for op in ops {
            match op {
                Op::Add(value, start, end) => {
                    let result = tree.add(interval(value, start, end));
                    match model.get_mut(&value) {
                        Some((s, e, n)) if *s == start && *e == end => {
                            prop_assert!(result.is_ok());
                            *n += 1;
                        }
                        Some(_) => prop_assert!(result.is_err()),
                        None => {
                            prop_assert!(result.is_ok());
                            model.insert(value, (start, end, 1));
                        }
                    }
                }
                Op::Repeat(value) => {
                    if let Some((s, e, n)) = model.get_mut(&value) {
                        tree.add(interval(value, *s, *e)).unwrap();
                        *n += 1;
                    }
                }
                Op::Remove(value) => match model.get(&value).copied() {
                    Some((s, e, n)) => {
                        tree.remove(&interval(value, s, e)).unwrap();
                        if n == 1 {
                            model.remove(&value);
                        } else {
                            model.insert(value, (s, e, n - 1));
                        }
                    }
                    None => prop_assert!(tree.remove(&interval(value, 0, 0)).is_err()),
                },
            }

            let want = expected_clusters(&model);
            prop_assert_eq!(clusters(&tree), want.clone());

            let want_breaks: Vec<_> = want
                .windows(2)
                .map(|pair| (pair[0].0, pair[1].0, pair[1].0 - pair[0].1))
                .collect();
            prop_assert_eq!(breaks(&tree), want_breaks);
            prop_assert_eq!(tree.len(), model.len());
        }

        for (start, len) in queries {
            prop_assert_eq!(
                overlapping(&tree, start, start + len),
                expected_overlapping(&model, start, start + len)
            );
        }
    }
}
