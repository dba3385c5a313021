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

//! Slot arena for tracked entries.
//!
//! Every tracked item owns one [`Entry`] addressed by a stable [`SlotId`]. Buckets link
//! entries into intrusive doubly-linked lists through `prev`/`next`, which keeps removal of
//! an arbitrary item O(1).
//!
//! Slots are never released one at a time: an eviction hands the victim's slot to the
//! newcomer, so the arena grows to `capacity` entries and stays there until cleared.

/// Stable handle to an arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct SlotId(usize);

/// A tracked item with its estimated frequency and list links.
#[derive(Debug, Clone)]
pub(super) struct Entry<T> {
    pub item: T,
    /// Value of the bucket currently holding this entry.
    pub value: u64,
    /// Over-count error recorded when the item was admitted.
    pub error: u64,
    pub prev: Option<SlotId>,
    pub next: Option<SlotId>,
}

impl<T> Entry<T> {
    pub fn new(item: T, value: u64, error: u64) -> Self {
        Self {
            item,
            value,
            error,
            prev: None,
            next: None,
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct SlotArena<T> {
    entries: Vec<Entry<T>>,
}

impl<T> SlotArena<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, entry: Entry<T>) -> SlotId {
        self.entries.push(entry);
        SlotId(self.entries.len() - 1)
    }

    pub fn get(&self, id: SlotId) -> &Entry<T> {
        &self.entries[id.0]
    }

    pub fn get_mut(&mut self, id: SlotId) -> &mut Entry<T> {
        &mut self.entries[id.0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterates over entries in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, &Entry<T>)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| (SlotId(idx), entry))
    }
}
