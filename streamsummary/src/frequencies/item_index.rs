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

//! Item index: tracked item to the arena slot holding its entry.
//!
//! The slot stores the entry's current value, which names its bucket in the
//! [`FrequencyIndex`](super::frequency_index::FrequencyIndex). Buckets are never referenced
//! directly, so dropping a bucket cannot leave a dangling reference here.

use std::collections::HashMap;
use std::hash::Hash;

use crate::frequencies::arena::SlotId;

#[derive(Debug, Clone)]
pub(super) struct ItemIndex<T> {
    slots: HashMap<T, SlotId>,
}

impl<T: Eq + Hash> ItemIndex<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, item: &T) -> Option<SlotId> {
        self.slots.get(item).copied()
    }

    pub fn contains(&self, item: &T) -> bool {
        self.slots.contains_key(item)
    }

    /// Records `item` at `id`.
    ///
    /// # Panics
    ///
    /// Panics if the item is already indexed.
    pub fn insert(&mut self, item: T, id: SlotId) {
        let previous = self.slots.insert(item, id);
        assert!(previous.is_none(), "item is already tracked");
    }

    /// Forgets `item`.
    ///
    /// # Panics
    ///
    /// Panics if the item is not indexed.
    pub fn remove(&mut self, item: &T) -> SlotId {
        self.slots.remove(item).expect("removing an untracked item")
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, SlotId)> {
        self.slots.iter().map(|(item, id)| (item, *id))
    }
}
