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

use std::collections::HashMap;
use std::collections::HashSet;

use googletest::prelude::*;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use streamsummary::error::ErrorKind;
use streamsummary::frequencies::ErrorType;
use streamsummary::frequencies::StreamSummary;

fn bucket_items<T: Clone + Eq + std::hash::Hash>(summary: &StreamSummary<T>, value: u64) -> Vec<T> {
    summary
        .bucket(value)
        .map(|bucket| bucket.iter().cloned().collect())
        .unwrap_or_default()
}

#[test]
fn test_init() {
    let summary = StreamSummary::<u64>::new(8).unwrap();
    assert_eq!(summary.capacity(), 8);
    assert!(summary.is_empty());
    assert!(!summary.is_full());
    assert_eq!(summary.total_weight(), 0);
    assert_eq!(summary.min_value(), None);
    assert_eq!(summary.maximum_error(), 0);
    assert!(summary.to_vec().is_empty());
}

#[test]
fn test_zero_capacity_is_rejected() {
    let err = StreamSummary::<u64>::new(0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert_that!(err.message(), contains_substring("capacity"));
}

#[test]
fn test_eviction_replaces_oldest() {
    let mut summary = StreamSummary::new(2).unwrap();
    summary.add(1);
    summary.add(2);
    assert_eq!(summary.bucket(1).unwrap().oldest(), Some(&1));

    summary.add(3);
    assert!(!summary.exists(&1));
    assert!(summary.exists(&2));
    assert!(summary.exists(&3));
    assert_eq!(summary.estimate(&2), 1);
    assert_eq!(summary.estimate(&3), 2);
    assert_eq!(summary.bucket(1).unwrap().len(), 1);
    assert_eq!(summary.bucket(2).unwrap().len(), 1);
    summary.debug_validate_invariants();
}

#[test]
fn test_promotion_and_eviction_buckets() {
    let mut summary = StreamSummary::new(5).unwrap();
    for item in [1, 2, 3, 4, 5, 1, 1, 10] {
        summary.add(item);
    }

    let top = summary.bucket(3).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top.oldest(), Some(&1));

    let middle = summary.bucket(2).unwrap();
    assert_eq!(middle.len(), 1);
    assert_eq!(middle.oldest(), Some(&10));

    let bottom = summary.bucket(1).unwrap();
    assert_eq!(bottom.len(), 3);
    assert_eq!(bottom.oldest(), Some(&3));
    assert_eq!(bucket_items(&summary, 1), vec![3, 4, 5]);

    assert!(!summary.exists(&2));
    assert_eq!(summary.error(&10), 1);
    assert_eq!(summary.error(&1), 0);
    assert_eq!(summary.total_weight(), 8);
    summary.debug_validate_invariants();

    insta::assert_snapshot!(summary.to_string(), @r"
    1: 3 4 5
    2: 10
    3: 1
    ");
}

#[test]
fn test_estimate_increases_by_one() {
    let mut summary = StreamSummary::new(3).unwrap();
    summary.add("noise");
    for expected in 1..=50u64 {
        summary.add("hot");
        assert_eq!(summary.estimate(&"hot"), expected);
        assert_eq!(summary.lower_bound(&"hot"), expected);
    }
    assert_eq!(summary.min_value(), Some(1));
    assert_eq!(summary.export_state().len(), 2);
}

#[test]
fn test_minimum_advances_when_lowest_bucket_empties() {
    let mut summary = StreamSummary::new(2).unwrap();
    summary.add('a');
    summary.add('b');
    summary.add('a');
    assert_that!(summary.min_value(), some(eq(1)));
    summary.add('b');
    assert_that!(summary.min_value(), some(eq(2)));
    assert!(summary.bucket(1).is_none());

    // Both tied at 2: the oldest member of the lowest bucket goes first.
    summary.add('c');
    assert!(!summary.exists(&'a'));
    assert_eq!(summary.estimate(&'c'), 3);
    assert_eq!(summary.error(&'c'), 2);
    assert_eq!(summary.maximum_error(), 2);
    assert_eq!(bucket_items(&summary, 2), vec!['b']);
    summary.debug_validate_invariants();
}

#[test]
fn test_capacity_one() {
    let mut summary = StreamSummary::new(1).unwrap();
    for (i, item) in ["x", "y", "z", "z"].into_iter().enumerate() {
        summary.add(item);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary.estimate(&item), i as u64 + 1);
        summary.debug_validate_invariants();
    }
    assert_eq!(summary.to_vec(), vec!["z"]);
}

#[test]
fn test_clear_is_idempotent() {
    let mut summary = StreamSummary::new(4).unwrap();
    summary.clear();
    assert!(summary.is_empty());

    summary.extend(0..10);
    assert!(summary.is_full());
    summary.clear();
    assert!(summary.to_vec().is_empty());
    assert_eq!(summary.total_weight(), 0);
    assert_eq!(summary.min_value(), None);
    assert_eq!(summary.maximum_error(), 0);

    summary.clear();
    assert!(summary.to_vec().is_empty());
    summary.debug_validate_invariants();

    summary.add(42);
    assert_eq!(summary.estimate(&42), 1);
    assert_eq!(summary.error(&42), 0);
}

#[test]
fn test_top_k() {
    let mut summary = StreamSummary::new(8).unwrap();
    summary.extend(["a", "b", "c", "b", "c", "c", "d"]);

    let top = summary.top_k(3);
    let items: Vec<_> = top.iter().map(|row| (*row.item(), row.estimate())).collect();
    assert_eq!(items, vec![("c", 3), ("b", 2), ("a", 1)]);
    assert_eq!(summary.top_k(100).len(), 4);
    assert!(summary.top_k(0).is_empty());
}

#[test]
fn test_frequent_items() {
    let mut summary = StreamSummary::new(3).unwrap();
    summary.extend([1, 1, 1, 1, 2, 2, 3, 4]);
    // 4 evicted 3 (value 1), so it carries an error of 1.
    assert_eq!(summary.estimate(&4), 2);
    assert_eq!(summary.lower_bound(&4), 1);

    let rows = summary.frequent_items(ErrorType::NoFalsePositives, 1);
    let items: Vec<_> = rows.iter().map(|row| *row.item()).collect();
    assert_eq!(items, vec![1, 2]);

    let rows = summary.frequent_items(ErrorType::NoFalseNegatives, 1);
    assert_eq!(rows.len(), 3);
    assert_eq!(*rows[0].item(), 1);
    for row in &rows {
        assert!(row.lower_bound() <= row.estimate());
        assert_eq!(row.upper_bound(), row.estimate());
    }
}

#[test]
fn test_untracked_upper_bound() {
    let mut summary = StreamSummary::new(2).unwrap();
    summary.add(1);
    assert_eq!(summary.upper_bound(&9), 0);
    summary.extend([1, 2, 3]);
    assert!(!summary.exists(&2));
    assert_eq!(summary.min_value(), Some(2));
    assert_eq!(summary.maximum_error(), 1);
    assert_eq!(summary.upper_bound(&2), 1);
    assert_eq!(summary.lower_bound(&2), 0);
}

#[test]
fn test_maximum_error_stays_zero_until_eviction() {
    let mut summary = StreamSummary::new(2).unwrap();
    summary.extend(['a', 'a', 'b']);
    assert!(summary.is_full());
    assert_that!(summary.min_value(), some(eq(1)));
    assert_eq!(summary.maximum_error(), 0);
    assert_eq!(summary.upper_bound(&'z'), 0);

    let rows = summary.frequent_items(ErrorType::NoFalsePositives, 0);
    assert_eq!(rows.len(), 2);
    assert_eq!(*rows[0].item(), 'a');

    summary.add('c');
    assert_eq!(summary.maximum_error(), 1);
    assert_eq!(summary.upper_bound(&'b'), 1);
    summary.debug_validate_invariants();
}

#[test]
fn test_eviction_is_deterministic() {
    let run = || {
        let mut rng = StdRng::seed_from_u64(7);
        let mut summary = StreamSummary::new(16).unwrap();
        for _ in 0..10_000 {
            summary.add(rng.random_range(0..200u32));
        }
        summary.export_state()
    };
    assert_eq!(run(), run());
}

#[test]
fn test_indices_agree() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut summary = StreamSummary::new(32).unwrap();
    for step in 0..5_000 {
        summary.add(rng.random_range(0..100u32));
        if step % 97 == 0 {
            summary.debug_validate_invariants();
        }
    }

    let listed: HashSet<u32> = summary.to_vec().into_iter().collect();
    let bucketed: HashSet<u32> = summary
        .export_state()
        .into_iter()
        .flat_map(|(_, items)| items)
        .collect();
    let iterated: HashSet<u32> = summary.iter().map(|(item, _)| *item).collect();
    assert_eq!(listed, bucketed);
    assert_eq!(listed, iterated);
    assert_eq!(listed.len(), summary.len());
}

#[test]
fn test_bounds_hold_against_exact_counts() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut summary = StreamSummary::new(10).unwrap();
    let mut exact: HashMap<u32, u64> = HashMap::new();
    for i in 0..10_000u32 {
        let item = if i % 3 == 0 { 0 } else { rng.random_range(1..1_000) };
        summary.add(item);
        *exact.entry(item).or_default() += 1;
    }

    // 0 occurs more than total_weight / capacity times, so it must be tracked.
    assert!(summary.exists(&0));
    for (item, count) in &exact {
        if summary.exists(item) {
            assert!(summary.lower_bound(item) <= *count);
            assert!(*count <= summary.estimate(item));
            assert!(summary.error(item) <= summary.maximum_error());
        } else {
            assert!(*count <= summary.upper_bound(item));
        }
    }
    assert_eq!(summary.total_weight(), 10_000);
    summary.debug_validate_invariants();
}

#[test]
fn test_volume() {
    let capacity = 100;
    let mut rng = StdRng::seed_from_u64(42);
    let mut summary = StreamSummary::new(capacity).unwrap();
    for step in 0..1_000_000u32 {
        summary.add(rng.random_range(0..10_000u32));
        assert_that!(summary.len(), le(capacity));
        if step % 100_000 == 0 {
            summary.debug_validate_invariants();
        }
    }

    let items = summary.to_vec();
    let unique: HashSet<_> = items.iter().collect();
    assert_that!(items.len(), eq(capacity));
    assert_that!(unique.len(), eq(items.len()));
    assert_that!(summary.total_weight(), eq(1_000_000));
    summary.debug_validate_invariants();
}
