//! Module: interval::tree
//! Responsibility: overlap queries plus incremental cluster/break upkeep.
//! Does not own: the axis arithmetic (supplied as a difference function).
//!
//! Split points are the source of truth. Clusters and breaks are derived
//! from them and keyed by coordinates: a cluster by its start, a break by
//! the start of the cluster before it. Every mutation rescans only the
//! span it touched.

use crate::{
    error::InternalError,
    interval::{
        BreakRepairCase, Interval,
        cluster::{BreakLink, ClusterSpan, IntervalBreak, IntervalCluster},
        split_point::{SplitPoint, Starting},
    },
    obs::sink::{self, ClusterChange, MetricsEvent},
};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    hash::Hash,
    ops::Bound,
};

type Difference<P, D> = Box<dyn Fn(&P, &P) -> D + Send + Sync>;

///
/// IntervalTree
///
/// Answers "which stored intervals overlap `[start, end]`" and maintains
/// the decomposition of all stored intervals into maximal clusters of
/// overlapping or touching intervals, with the breaks between them.
///
/// Identity is the interval value. Adding the same value with the same
/// bounds again raises its multiplicity; every registration must be removed
/// separately.
///

pub struct IntervalTree<I, P, D> {
    pub(super) split_points: BTreeMap<P, SplitPoint<I, P>>,
    members: HashMap<I, P>,
    clusters: BTreeMap<P, ClusterSpan<P>>,
    breaks: BTreeMap<P, BreakLink<P, D>>,
    pub(super) difference: Difference<P, D>,
}

impl<I, P, D> IntervalTree<I, P, D>
where
    I: Eq + Hash + Clone,
    P: Ord + Clone,
{
    /// Create an empty tree. `difference(a, b)` measures the axis distance
    /// from `a` to `b` and sizes breaks and clusters.
    pub fn new(difference: impl Fn(&P, &P) -> D + Send + Sync + 'static) -> Self {
        Self {
            split_points: BTreeMap::new(),
            members: HashMap::new(),
            clusters: BTreeMap::new(),
            breaks: BTreeMap::new(),
            difference: Box::new(difference),
        }
    }

    /// Distinct interval values stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    #[must_use]
    pub fn contains(&self, value: &I) -> bool {
        self.members.contains_key(value)
    }

    /// Clusters in ascending start order.
    pub fn clusters(&self) -> impl Iterator<Item = IntervalCluster<'_, I, P, D>> {
        self.clusters
            .iter()
            .map(move |(start, span)| IntervalCluster {
                tree: self,
                start,
                span,
            })
    }

    /// Breaks in ascending order; one per adjacent cluster pair.
    pub fn breaks(&self) -> impl Iterator<Item = IntervalBreak<'_, I, P, D>> {
        self.breaks.iter().filter_map(move |(previous, link)| {
            Some(IntervalBreak {
                previous: self.cluster_at(previous)?,
                next: self.cluster_at(&link.next_start)?,
                length: &link.length,
            })
        })
    }

    fn cluster_at(&self, start: &P) -> Option<IntervalCluster<'_, I, P, D>> {
        self.clusters
            .get_key_value(start)
            .map(|(start, span)| IntervalCluster {
                tree: self,
                start,
                span,
            })
    }

    ///
    /// MUTATION
    ///

    /// Register an interval.
    pub fn add(&mut self, interval: Interval<I, P>) -> Result<(), InternalError> {
        let Interval { value, start, end } = interval;

        if let Some(registered) = self.members.get(&value) {
            let starting = self
                .split_points
                .get_mut(registered)
                .and_then(|point| point.starting.get_mut(&value))
                .ok_or_else(missing_split_point)?;
            if *registered != start || starting.end != end {
                return Err(sink::violation(InternalError::interval_contract(
                    "interval value is already registered with different bounds",
                )));
            }
            starting.count += 1;
            if let Some(point) = self.split_points.get_mut(&end) {
                *point.ending.entry(value).or_insert(0) += 1;
            }
            record_delta(1, 0);
            self.refresh_cluster(&start);

            return Ok(());
        }

        self.split_points
            .entry(start.clone())
            .or_insert_with(SplitPoint::new)
            .starting
            .insert(
                value.clone(),
                Starting {
                    end: end.clone(),
                    count: 1,
                },
            );
        *self
            .split_points
            .entry(end.clone())
            .or_insert_with(SplitPoint::new)
            .ending
            .entry(value.clone())
            .or_insert(0) += 1;
        self.members.insert(value, start.clone());
        record_delta(1, 0);

        let intersected = self.intersecting_clusters(&start, &end);
        if intersected.is_empty() {
            self.create_cluster(&start);
        } else {
            self.merge_clusters(&start, &end, &intersected);
        }

        Ok(())
    }

    /// Remove one registration of an interval. Fails when absent.
    pub fn remove(&mut self, interval: &Interval<I, P>) -> Result<(), InternalError> {
        let Some(start) = self.members.get(&interval.value).cloned() else {
            return Err(sink::violation(InternalError::interval_contract(
                "interval is not in the tree",
            )));
        };
        let registered_end = self
            .split_points
            .get(&start)
            .and_then(|point| point.starting.get(&interval.value))
            .map(|starting| &starting.end);
        if start != interval.start || registered_end != Some(&interval.end) {
            return Err(sink::violation(InternalError::interval_contract(
                "interval bounds differ from the registered ones",
            )));
        }

        let remaining = self.unregister(&interval.value, &start, &interval.end);
        record_delta(0, 1);

        if remaining > 0 {
            self.refresh_cluster(&start);
        } else {
            self.members.remove(&interval.value);
            self.split_cluster(&start);
        }

        Ok(())
    }

    ///
    /// QUERY
    ///

    /// Call `visitor` once per stored registration overlapping the closed
    /// query `[start, end]`.
    pub fn visit(
        &self,
        start: &P,
        end: &P,
        mut visitor: impl FnMut(&I),
    ) -> Result<(), InternalError> {
        if start > end {
            return Err(sink::violation(InternalError::interval_contract(
                "query start lies after its end",
            )));
        }

        let from = self.clusters.range(..=start).next_back().map_or(start, |(k, _)| k);
        for (cluster_start, span) in self.clusters.range(from..=end) {
            if span.end < *start {
                continue;
            }
            let upper = (&span.end).min(end);
            for (_, point) in self.split_points.range(cluster_start..=upper) {
                for (value, starting) in &point.starting {
                    if starting.end >= *start {
                        for _ in 0..starting.count {
                            visitor(value);
                        }
                    }
                }
            }
        }

        Ok(())
    }

    ///
    /// SPLIT POINTS
    ///

    // Drop one registration; returns the multiplicity left.
    fn unregister(&mut self, value: &I, start: &P, end: &P) -> usize {
        let mut remaining = 0;
        if let Some(point) = self.split_points.get_mut(start)
            && let Some(starting) = point.starting.get_mut(value)
        {
            starting.count -= 1;
            remaining = starting.count;
            if remaining == 0 {
                point.starting.shift_remove(value);
            }
        }
        if let Some(point) = self.split_points.get_mut(end)
            && let Some(count) = point.ending.get_mut(value)
        {
            *count -= 1;
            if *count == 0 {
                point.ending.shift_remove(value);
            }
        }

        for at in [start, end] {
            if self.split_points.get(at).is_some_and(SplitPoint::is_empty) {
                self.split_points.remove(at);
            }
        }

        remaining
    }

    // Sweep the split points from a cluster start until nothing reaches
    // further. Two registrations overlap when they start at the same point
    // or one starts strictly inside the other.
    fn scan(&self, from: &P) -> Option<ClusterSpan<P>> {
        let mut reach: Option<&P> = None;
        let mut count = 0;
        let mut active: usize = 0;
        let mut has_overlap = false;

        for (at, point) in self.split_points.range(from..) {
            let starts = point.start_count();
            match reach {
                Some(reach) if at > reach => break,
                None if starts == 0 => break,
                _ => {}
            }

            let zero_length = point.zero_length_count(at);
            active = active.saturating_sub(point.end_count().saturating_sub(zero_length));
            if starts > 0 && (active > 0 || starts >= 2) {
                has_overlap = true;
            }
            active += starts - zero_length;
            count += starts;

            if let Some(end) = point.reach() {
                reach = Some(reach.map_or(end, |current| current.max(end)));
            }
        }

        reach.map(|end| ClusterSpan {
            end: end.clone(),
            count,
            has_overlap,
        })
    }

    // Re-derive every cluster inside `[from, to]`, in order.
    fn scan_span(&self, from: &P, to: &P) -> Vec<(P, ClusterSpan<P>)> {
        let mut fragments = Vec::new();
        let mut cursor = Bound::Included(from.clone());

        loop {
            let next_start = self
                .split_points
                .range((cursor.as_ref(), Bound::Included(to)))
                .find(|(_, point)| !point.starting.is_empty())
                .map(|(at, _)| at.clone());
            let Some(start) = next_start else {
                break;
            };
            let Some(span) = self.scan(&start) else {
                break;
            };

            let done = span.end >= *to;
            cursor = Bound::Excluded(span.end.clone());
            fragments.push((start, span));
            if done {
                break;
            }
        }

        fragments
    }

    ///
    /// CLUSTERS
    ///

    // Start keys of the clusters a new interval's span touches.
    fn intersecting_clusters(&self, start: &P, end: &P) -> Vec<P> {
        let from = self.clusters.range(..=start).next_back().map_or(start, |(k, _)| k);

        self.clusters
            .range(from..=end)
            .filter(|(_, span)| span.end >= *start)
            .map(|(k, _)| k.clone())
            .collect()
    }

    fn create_cluster(&mut self, start: &P) {
        let Some(span) = self.scan(start) else {
            return;
        };
        let end = span.end.clone();
        let previous = self
            .clusters
            .range(..start)
            .next_back()
            .map(|(k, s)| (k.clone(), s.end.clone()));
        let next = self
            .clusters
            .range((Bound::Excluded(start), Bound::Unbounded))
            .next()
            .map(|(k, _)| k.clone());

        self.clusters.insert(start.clone(), span);
        if let Some((previous_start, previous_end)) = previous {
            self.link(previous_start, &previous_end, start.clone());
        }
        if let Some(next_start) = next {
            self.link(start.clone(), &end, next_start);
        }
        sink::record(MetricsEvent::Cluster {
            change: ClusterChange::Created,
        });
    }

    fn merge_clusters(&mut self, start: &P, end: &P, intersected: &[P]) {
        let merged_start = intersected
            .first()
            .map_or(start, |first| first.min(start))
            .clone();
        let Some(span) = self.scan(&merged_start) else {
            return;
        };
        let merged_end = span.end.clone();

        for key in intersected {
            self.clusters.remove(key);
        }
        self.clusters.insert(merged_start.clone(), span);
        sink::record(MetricsEvent::Cluster {
            change: ClusterChange::Merged {
                clusters: intersected.len() as u64,
            },
        });

        self.repair_breaks(start, end, &merged_start, &merged_end);
    }

    // Relink the breaks around a merged cluster. The breaks touched by the
    // new interval's span are either inside the merged cluster or bound it
    // on one side; exactly one of four shapes applies.
    fn repair_breaks(&mut self, start: &P, end: &P, merged_start: &P, merged_end: &P) {
        let from = self.breaks.range(..=start).next_back().map_or(start, |(k, _)| k);
        let keys: Vec<P> = self.breaks.range(from..=end).map(|(k, _)| k.clone()).collect();
        let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
            return;
        };
        let Some(last_next) = self.breaks.get(last).map(|link| link.next_start.clone()) else {
            return;
        };

        let spans_first = first >= merged_start;
        let spans_last = last_next <= *merged_end;
        let case = match (spans_first, spans_last) {
            (true, true) => BreakRepairCase::AllSpanned,
            (true, false) => BreakRepairCase::FirstSpanned,
            (false, true) => BreakRepairCase::LastSpanned,
            (false, false) => BreakRepairCase::NoneSpanned,
        };

        let first_end = self.clusters.get(first).map(|span| span.end.clone());
        for key in &keys {
            self.breaks.remove(key);
        }
        if !spans_first && let Some(first_end) = first_end {
            self.link(first.clone(), &first_end, merged_start.clone());
        }
        if !spans_last {
            self.link(merged_start.clone(), merged_end, last_next);
        }

        sink::record(MetricsEvent::BreakRepair { case });
    }

    // Re-derive the cluster holding `at` after a registration left it and
    // relink the breaks around whatever fragments remain.
    fn split_cluster(&mut self, at: &P) {
        let Some((cluster_start, cluster_end)) = self
            .clusters
            .range(..=at)
            .next_back()
            .map(|(k, span)| (k.clone(), span.end.clone()))
        else {
            return;
        };

        self.clusters.remove(&cluster_start);
        let next = self
            .breaks
            .remove(&cluster_start)
            .map(|link| link.next_start)
            .and_then(|next| {
                let end = self.clusters.get(&next)?.end.clone();
                Some((next, end))
            });
        let previous = self
            .clusters
            .range(..&cluster_start)
            .next_back()
            .map(|(k, span)| (k.clone(), span.end.clone()));

        let fragments = self.scan_span(&cluster_start, &cluster_end);
        sink::record(MetricsEvent::Cluster {
            change: ClusterChange::Split {
                fragments: fragments.len() as u64,
            },
        });

        let mut chain: Vec<(P, P)> = Vec::with_capacity(fragments.len() + 2);
        chain.extend(previous.clone());
        for (start, span) in fragments {
            chain.push((start.clone(), span.end.clone()));
            self.clusters.insert(start, span);
        }
        chain.extend(next);

        if chain.len() == 1
            && let Some((previous_start, _)) = previous
        {
            self.breaks.remove(&previous_start);
        }
        for pair in chain.windows(2) {
            let [(left_start, left_end), (right_start, _)] = pair else {
                continue;
            };
            self.link(left_start.clone(), left_end, right_start.clone());
        }
    }

    fn refresh_cluster(&mut self, at: &P) {
        let Some(cluster_start) = self
            .clusters
            .range(..=at)
            .next_back()
            .map(|(k, _)| k.clone())
        else {
            return;
        };
        if let Some(span) = self.scan(&cluster_start)
            && let Some(slot) = self.clusters.get_mut(&cluster_start)
        {
            slot.count = span.count;
            slot.has_overlap = span.has_overlap;
        }
        sink::record(MetricsEvent::Cluster {
            change: ClusterChange::Refreshed,
        });
    }

    fn link(&mut self, previous_start: P, previous_end: &P, next_start: P) {
        let length = (self.difference)(previous_end, &next_start);
        self.breaks.insert(previous_start, BreakLink { next_start, length });
    }
}

impl<I, P, D> fmt::Debug for IntervalTree<I, P, D>
where
    I: Eq + Hash + Clone,
    P: Ord + Clone + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalTree")
            .field("len", &self.len())
            .field("clusters", &self.clusters().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

fn record_delta(inserts: u64, removes: u64) {
    sink::record(MetricsEvent::IntervalDelta { inserts, removes });
}

fn missing_split_point() -> InternalError {
    sink::violation(InternalError::interval_contract(
        "registered interval has no split point",
    ))
}
