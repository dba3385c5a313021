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

//! Frequency index: frequency value to bucket, plus the cached minimum value.
//!
//! The key set changes by at most one bucket creation and one bucket removal per update,
//! and every removal of the minimum bucket happens while its members move to
//! `minimum + 1`. Advancing the cached minimum by one is therefore exact and the index
//! never has to be scanned or kept sorted.

use std::collections::HashMap;

use crate::frequencies::arena::SlotArena;
use crate::frequencies::arena::SlotId;
use crate::frequencies::bucket::Bucket;

#[derive(Debug, Clone, Default)]
pub(super) struct FrequencyIndex {
    buckets: HashMap<u64, Bucket>,
    min_value: Option<u64>,
}

impl FrequencyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of non-empty buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn min_value(&self) -> Option<u64> {
        self.min_value
    }

    pub fn bucket(&self, value: u64) -> Option<&Bucket> {
        self.buckets.get(&value)
    }

    /// Iterates over buckets in unspecified order.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.values()
    }

    /// Returns the present frequency values in ascending order.
    pub fn sorted_values(&self) -> Vec<u64> {
        let mut values: Vec<u64> = self.buckets.keys().copied().collect();
        values.sort_unstable();
        values
    }

    /// Unlinks and returns the oldest member of the minimum bucket.
    ///
    /// A bucket left empty is dropped and the minimum advances by one. The caller links
    /// an entry at that value before anything else reads the index.
    pub fn pop_min<T>(&mut self, arena: &mut SlotArena<T>) -> Option<SlotId> {
        let min = self.min_value?;
        let bucket = self
            .buckets
            .get_mut(&min)
            .unwrap_or_else(|| panic!("cached minimum {min} has no bucket"));
        let id = bucket.pop_front(arena);
        if bucket.is_empty() {
            self.buckets.remove(&min);
            self.min_value = Some(min + 1);
        }
        Some(id)
    }

    /// Links `id` as the newest member of the bucket for `value`, creating it if needed.
    pub fn push<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId, value: u64) {
        self.buckets
            .entry(value)
            .or_insert_with(|| Bucket::new(value))
            .push_back(arena, id);
        self.min_value = Some(self.min_value.map_or(value, |min| min.min(value)));
    }

    /// Moves `id` from its bucket to the bucket one above and returns the new value.
    ///
    /// The entry becomes the newest member of its new bucket. A bucket left empty is
    /// dropped; if it was the minimum, the minimum advances to the new value.
    pub fn promote<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) -> u64 {
        let value = arena.get(id).value;
        let next = value
            .checked_add(1)
            .expect("frequency value overflowed u64");

        let bucket = self
            .buckets
            .get_mut(&value)
            .unwrap_or_else(|| panic!("entry refers to missing bucket {value}"));
        bucket.unlink(arena, id);
        let emptied = bucket.is_empty();

        self.buckets
            .entry(next)
            .or_insert_with(|| Bucket::new(next))
            .push_back(arena, id);

        if emptied {
            self.buckets.remove(&value);
            if self.min_value == Some(value) {
                self.min_value = Some(next);
            }
        }
        next
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.min_value = None;
    }
}
