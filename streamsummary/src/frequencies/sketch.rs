// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Stream summary implementation.

use std::fmt;
use std::hash::Hash;

use tracing::debug;
use tracing::trace;

use crate::error::Error;
use crate::frequencies::arena::Entry;
use crate::frequencies::arena::SlotArena;
use crate::frequencies::bucket::Bucket;
use crate::frequencies::frequency_index::FrequencyIndex;
use crate::frequencies::item_index::ItemIndex;

/// Error guarantees for frequent item queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorType {
    /// Include items if upper bound exceeds threshold (no false negatives).
    NoFalseNegatives,
    /// Include items if lower bound exceeds threshold (no false positives).
    NoFalsePositives,
}

/// Result row for frequent item queries.
///
/// Each row includes an estimate and upper and lower bounds on the true frequency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<T> {
    item: T,
    estimate: u64,
    upper_bound: u64,
    lower_bound: u64,
}

impl<T> Row<T> {
    /// Returns the item value.
    pub fn item(&self) -> &T {
        &self.item
    }

    /// Returns the estimated frequency.
    pub fn estimate(&self) -> u64 {
        self.estimate
    }

    /// Returns the upper bound for the frequency.
    pub fn upper_bound(&self) -> u64 {
        self.upper_bound
    }

    /// Returns the guaranteed lower bound for the frequency.
    pub fn lower_bound(&self) -> u64 {
        self.lower_bound
    }
}

/// Read-only view of the bucket holding every item tracked at one frequency value.
#[derive(Debug)]
pub struct BucketRef<'a, T> {
    bucket: &'a Bucket,
    arena: &'a SlotArena<T>,
}

impl<'a, T> BucketRef<'a, T> {
    /// Returns the frequency value shared by every member.
    pub fn value(&self) -> u64 {
        self.bucket.value()
    }

    /// Returns the number of members. Never zero.
    pub fn len(&self) -> usize {
        self.bucket.len()
    }

    /// Always false: empty buckets are never retained.
    pub fn is_empty(&self) -> bool {
        self.bucket.is_empty()
    }

    /// Returns the earliest-inserted member, the next eviction candidate at this value.
    pub fn oldest(&self) -> Option<&'a T> {
        let arena = self.arena;
        self.bucket.oldest().map(|id| &arena.get(id).item)
    }

    /// Iterates over members oldest-first.
    pub fn iter(&self) -> impl Iterator<Item = &'a T> + use<'a, T> {
        self.bucket.iter(self.arena).map(|(_, entry)| &entry.item)
    }
}

/// Space-Saving stream summary.
///
/// Tracks at most `capacity` distinct items, grouped into buckets by estimated frequency.
/// Every operation is O(1) except the enumerating queries.
///
/// See [`crate::frequencies`] for an overview and error guarantees.
#[derive(Debug, Clone)]
pub struct StreamSummary<T> {
    capacity: usize,
    total_weight: u64,
    max_error: u64,
    arena: SlotArena<T>,
    frequency_index: FrequencyIndex,
    item_index: ItemIndex<T>,
}

impl<T: Eq + Hash + Clone> StreamSummary<T> {
    /// Creates an empty summary tracking at most `capacity` distinct items.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) if
    /// `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, Error> {
        if capacity == 0 {
            return Err(Error::zero_capacity());
        }
        Ok(Self {
            capacity,
            total_weight: 0,
            max_error: 0,
            arena: SlotArena::with_capacity(capacity),
            frequency_index: FrequencyIndex::new(),
            item_index: ItemIndex::with_capacity(capacity),
        })
    }

    /// Returns the maximum number of distinct items tracked.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of items currently tracked.
    pub fn len(&self) -> usize {
        self.item_index.len()
    }

    /// Returns true if no item is tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the next unseen item will evict a tracked one.
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    /// Returns the number of items added since construction or the last [`clear`].
    ///
    /// This always equals the sum of all tracked estimates.
    ///
    /// [`clear`]: StreamSummary::clear
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Returns the smallest frequency value currently tracked.
    pub fn min_value(&self) -> Option<u64> {
        self.frequency_index.min_value()
    }

    /// Counts one occurrence of `item`.
    ///
    /// A tracked item moves up one bucket. An unseen item enters at frequency one while
    /// there is room; otherwise it replaces the oldest item of the lowest bucket and
    /// inherits that bucket's value plus one.
    ///
    /// # Panics
    ///
    /// Panics if the total weight would overflow `u64`.
    pub fn add(&mut self, item: T) {
        self.total_weight = self
            .total_weight
            .checked_add(1)
            .expect("total weight overflows u64");

        if let Some(id) = self.item_index.get(&item) {
            self.frequency_index.promote(&mut self.arena, id);
            return;
        }

        if !self.is_full() {
            let id = self.arena.insert(Entry::new(item.clone(), 1, 0));
            self.item_index.insert(item, id);
            self.frequency_index.push(&mut self.arena, id, 1);
            return;
        }

        let id = self
            .frequency_index
            .pop_min(&mut self.arena)
            .expect("a full summary always has a minimum bucket");
        let entry = self.arena.get_mut(id);
        let threshold = entry.value;
        let evicted = std::mem::replace(&mut entry.item, item.clone());
        entry.error = threshold;
        self.item_index.remove(&evicted);
        self.item_index.insert(item, id);
        self.max_error = self.max_error.max(threshold);
        self.frequency_index.push(&mut self.arena, id, threshold + 1);
        trace!(threshold, "evicted oldest item of the minimum bucket");
    }

    /// Returns true if `item` is currently tracked.
    pub fn exists(&self, item: &T) -> bool {
        self.item_index.contains(item)
    }

    /// Returns the estimated frequency of `item`, or zero if it is not tracked.
    ///
    /// The estimate never under-counts an item tracked since its first occurrence.
    pub fn estimate(&self, item: &T) -> u64 {
        self.item_index
            .get(item)
            .map_or(0, |id| self.arena.get(id).value)
    }

    /// Returns the over-count error recorded when `item` was admitted.
    ///
    /// This is the value of the bucket it displaced an item from, or zero if it was
    /// admitted without eviction. Untracked items report zero.
    pub fn error(&self, item: &T) -> u64 {
        self.item_index
            .get(item)
            .map_or(0, |id| self.arena.get(id).error)
    }

    /// Returns the guaranteed lower bound frequency for an item.
    pub fn lower_bound(&self, item: &T) -> u64 {
        self.item_index.get(item).map_or(0, |id| {
            let entry = self.arena.get(id);
            entry.value - entry.error
        })
    }

    /// Returns the guaranteed upper bound frequency for an item.
    ///
    /// For a tracked item this is its estimate. An untracked item was either never seen or
    /// evicted at a threshold no larger than [`StreamSummary::maximum_error`].
    pub fn upper_bound(&self, item: &T) -> u64 {
        self.item_index
            .get(item)
            .map_or(self.max_error, |id| self.arena.get(id).value)
    }

    /// Returns the largest eviction threshold seen so far.
    ///
    /// This bounds [`StreamSummary::error`] of every tracked item and the true frequency of
    /// every untracked one. It stays zero until the first eviction, even once the summary
    /// is full.
    pub fn maximum_error(&self) -> u64 {
        self.max_error
    }

    /// Returns a view of the bucket at `value`, if any item is tracked at that value.
    pub fn bucket(&self, value: u64) -> Option<BucketRef<'_, T>> {
        self.frequency_index.bucket(value).map(|bucket| BucketRef {
            bucket,
            arena: &self.arena,
        })
    }

    /// Iterates over `(item, estimate)` for every tracked item in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, u64)> {
        self.arena.iter().map(|(_, entry)| (&entry.item, entry.value))
    }

    /// Returns every tracked item in unspecified order. Never contains duplicates.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().map(|(item, _)| item.clone()).collect()
    }

    /// Returns up to `k` rows with the highest estimates.
    ///
    /// Rows come from the highest bucket down; inside a bucket the oldest member is first.
    pub fn top_k(&self, k: usize) -> Vec<Row<T>> {
        let mut rows = Vec::with_capacity(k.min(self.len()));
        for value in self.frequency_index.sorted_values().into_iter().rev() {
            let Some(bucket) = self.frequency_index.bucket(value) else {
                continue;
            };
            for (_, entry) in bucket.iter(&self.arena) {
                if rows.len() == k {
                    return rows;
                }
                rows.push(self.row(entry));
            }
        }
        rows
    }

    /// Returns frequent items using a custom threshold.
    ///
    /// If `threshold` is less than `maximum_error`, `maximum_error` is used instead.
    ///
    /// For [`ErrorType::NoFalseNegatives`], items are included when `upper_bound > threshold`.
    /// For [`ErrorType::NoFalsePositives`], items are included when `lower_bound > threshold`.
    pub fn frequent_items(&self, error_type: ErrorType, threshold: u64) -> Vec<Row<T>> {
        let threshold = threshold.max(self.max_error);
        let mut rows: Vec<Row<T>> = self
            .arena
            .iter()
            .map(|(_, entry)| self.row(entry))
            .filter(|row| match error_type {
                ErrorType::NoFalseNegatives => row.upper_bound > threshold,
                ErrorType::NoFalsePositives => row.lower_bound > threshold,
            })
            .collect();
        rows.sort_by(|a, b| b.estimate.cmp(&a.estimate));
        rows
    }

    /// Resets the summary to an empty state. Calling it on an empty summary is a no-op.
    pub fn clear(&mut self) {
        debug!(tracked = self.len(), "clearing stream summary");
        self.arena.clear();
        self.frequency_index.clear();
        self.item_index.clear();
        self.total_weight = 0;
        self.max_error = 0;
    }

    /// Exports every bucket as `(value, items)`.
    ///
    /// Buckets are in ascending value order and items within a bucket oldest-first, so
    /// [`StreamSummary::import_state`] rebuilds the same eviction order.
    pub fn export_state(&self) -> Vec<(u64, Vec<T>)> {
        self.frequency_index
            .sorted_values()
            .into_iter()
            .filter_map(|value| self.bucket(value))
            .map(|bucket| (bucket.value(), bucket.iter().cloned().collect()))
            .collect()
    }

    /// Rebuilds a summary from `(value, items)` pairs as produced by
    /// [`StreamSummary::export_state`].
    ///
    /// Items are appended in the order given, so each list should be oldest-first. Pairs
    /// with no items are skipped. Because admission history is not part of the state, each
    /// item's error is taken as `min(value - 1, smallest value)`, which bounds the error of
    /// any state a summary can reach.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::ConfigInvalid`](crate::error::ErrorKind::ConfigInvalid) for a
    /// zero capacity, and [`ErrorKind::InvalidData`](crate::error::ErrorKind::InvalidData)
    /// if a value is zero, `u64::MAX` or repeated, an item is repeated, the items do not fit
    /// in `capacity`, or the estimates sum past `u64::MAX`.
    pub fn import_state<I>(capacity: usize, state: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (u64, Vec<T>)>,
    {
        let mut summary = Self::new(capacity)?;
        for (value, items) in state {
            if items.is_empty() {
                continue;
            }
            if value == 0 {
                return Err(Error::invalid_data("frequency value must be positive"));
            }
            if value == u64::MAX {
                return Err(Error::invalid_data("frequency value leaves no room to count")
                    .with_context("value", value));
            }
            if summary.frequency_index.bucket(value).is_some() {
                return Err(Error::invalid_data("frequency value appears more than once")
                    .with_context("value", value));
            }
            for item in items {
                if summary.is_full() {
                    return Err(Error::invalid_data("state holds more items than capacity")
                        .with_context("capacity", capacity));
                }
                if summary.item_index.contains(&item) {
                    return Err(Error::invalid_data("item appears more than once")
                        .with_context("value", value));
                }
                let id = summary.arena.insert(Entry::new(item.clone(), value, 0));
                summary.item_index.insert(item, id);
                summary.frequency_index.push(&mut summary.arena, id, value);
                summary.total_weight =
                    summary.total_weight.checked_add(value).ok_or_else(|| {
                        Error::invalid_data("total weight overflows u64")
                            .with_context("value", value)
                    })?;
            }
        }

        if let Some(min) = summary.min_value() {
            let ids: Vec<_> = summary.item_index.iter().map(|(_, id)| id).collect();
            for id in ids {
                let entry = summary.arena.get_mut(id);
                entry.error = (entry.value - 1).min(min);
                summary.max_error = summary.max_error.max(entry.error);
            }
        }

        debug!(
            tracked = summary.len(),
            buckets = summary.frequency_index.len(),
            total_weight = summary.total_weight,
            "imported stream summary state"
        );
        Ok(summary)
    }

    /// Asserts every structural invariant of the summary.
    ///
    /// Intended for tests and fuzzing; runs in time linear in the number of tracked items.
    ///
    /// # Panics
    ///
    /// Panics with a description of the first violated invariant.
    pub fn debug_validate_invariants(&self) {
        let tracked = self.item_index.len();
        assert_eq!(tracked, self.arena.len(), "item index and arena disagree");
        assert!(tracked <= self.capacity, "capacity exceeded");

        let mut bucketed = 0usize;
        let mut weight = 0u128;
        let mut min: Option<u64> = None;
        for bucket in self.frequency_index.buckets() {
            assert!(!bucket.is_empty(), "empty bucket {} retained", bucket.value());
            let mut members = 0usize;
            for (id, entry) in bucket.iter(&self.arena) {
                assert_eq!(entry.value, bucket.value(), "entry in the wrong bucket");
                assert_eq!(
                    self.item_index.get(&entry.item),
                    Some(id),
                    "item index points to another slot"
                );
                assert!(entry.error < entry.value, "error must be below the estimate");
                assert!(entry.error <= self.max_error, "error above maximum_error");
                members += 1;
            }
            assert_eq!(members, bucket.len(), "bucket length is stale");
            bucketed += members;
            weight += u128::from(bucket.value()) * members as u128;
            min = Some(min.map_or(bucket.value(), |m| m.min(bucket.value())));
        }
        assert_eq!(bucketed, tracked, "buckets and item index disagree");
        assert_eq!(min, self.min_value(), "cached minimum is stale");
        assert_eq!(
            weight,
            u128::from(self.total_weight),
            "estimates do not sum to the total weight"
        );
    }

    fn row(&self, entry: &Entry<T>) -> Row<T> {
        Row {
            item: entry.item.clone(),
            estimate: entry.value,
            upper_bound: entry.value,
            lower_bound: entry.value - entry.error,
        }
    }
}

impl<T: Eq + Hash + Clone> Extend<T> for StreamSummary<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

/// Writes one line per bucket in ascending value order: `value: oldest ... newest`.
impl<T: Eq + Hash + Clone + fmt::Display> fmt::Display for StreamSummary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for value in self.frequency_index.sorted_values() {
            let Some(bucket) = self.bucket(value) else {
                continue;
            };
            write!(f, "{value}:")?;
            for item in bucket.iter() {
                write!(f, " {item}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
