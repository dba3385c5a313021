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

//! A bucket groups every tracked item that shares one exact frequency value.
//!
//! Items are kept in insertion order: new items are appended at the tail and eviction
//! candidates are taken from the head, so the head is always the oldest member.

use crate::frequencies::arena::Entry;
use crate::frequencies::arena::SlotArena;
use crate::frequencies::arena::SlotId;

#[derive(Debug, Clone)]
pub(super) struct Bucket {
    value: u64,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl Bucket {
    pub fn new(value: u64) -> Self {
        assert!(value > 0, "bucket value must be positive");
        Self {
            value,
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the first-inserted member, if any.
    pub fn oldest(&self) -> Option<SlotId> {
        self.head
    }

    /// Appends `id` as the newest member and stamps the entry with this bucket's value.
    pub fn push_back<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let tail = self.tail;
        {
            let entry = arena.get_mut(id);
            entry.value = self.value;
            entry.prev = tail;
            entry.next = None;
        }
        match tail {
            Some(tail) => arena.get_mut(tail).next = Some(id),
            None => self.head = Some(id),
        }
        self.tail = Some(id);
        self.len += 1;
    }

    /// Removes and returns the oldest member.
    ///
    /// # Panics
    ///
    /// Panics if the bucket is empty.
    pub fn pop_front<T>(&mut self, arena: &mut SlotArena<T>) -> SlotId {
        let head = self.head.expect("pop_front on an empty bucket");
        self.unlink(arena, head);
        head
    }

    /// Removes `id` from this bucket in O(1).
    ///
    /// # Panics
    ///
    /// Panics if the entry does not belong to this bucket.
    pub fn unlink<T>(&mut self, arena: &mut SlotArena<T>, id: SlotId) {
        let (prev, next) = {
            let entry = arena.get_mut(id);
            assert_eq!(
                entry.value, self.value,
                "entry is not a member of bucket {}",
                self.value
            );
            let links = (entry.prev, entry.next);
            entry.prev = None;
            entry.next = None;
            links
        };
        match prev {
            Some(prev) => arena.get_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => arena.get_mut(next).prev = prev,
            None => self.tail = prev,
        }
        self.len -= 1;
    }

    /// Iterates over members oldest-first.
    pub fn iter<'a, T>(&self, arena: &'a SlotArena<T>) -> BucketIter<'a, T> {
        BucketIter {
            arena,
            next: self.head,
            remaining: self.len,
        }
    }
}

/// Oldest-first iterator over the members of a [`Bucket`].
pub(super) struct BucketIter<'a, T> {
    arena: &'a SlotArena<T>,
    next: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iterator for BucketIter<'a, T> {
    type Item = (SlotId, &'a Entry<T>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let entry = self.arena.get(id);
        self.next = entry.next;
        self.remaining -= 1;
        Some((id, entry))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for BucketIter<'_, T> {}
