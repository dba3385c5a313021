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

//! Stream summary for finding heavy hitters in data streams.
//!
//! # Overview
//!
//! This module implements the Space-Saving algorithm and its "stream summary" data structure
//! from ["Efficient Computation of Frequent and Top-k Elements in Data
//! Streams"](https://doi.org/10.1007/978-3-540-30570-5_27) by Ahmed Metwally, Divyakant
//! Agrawal, and Amr El Abbadi.
//!
//! A [`StreamSummary`] tracks at most `capacity` distinct items of type `T` (any
//! `Eq + Hash + Clone` value). Items are grouped into buckets, one bucket per estimated
//! frequency, and each bucket keeps its members in insertion order. Adding an item costs
//! O(1) regardless of `capacity`:
//!
//! * A tracked item moves from the bucket at `v` to the bucket at `v + 1`.
//! * An unseen item enters the bucket at `1` while fewer than `capacity` items are tracked.
//! * Otherwise the oldest member of the lowest bucket, at value `m`, is evicted and the new
//!   item enters the bucket at `m + 1`.
//!
//! # Accuracy
//!
//! Estimates never under-count. An item admitted by eviction may be over-counted by at most
//! the `m` it inherited; [`StreamSummary::error`] reports that value per item and
//! [`StreamSummary::lower_bound`] subtracts it from the estimate. Every item whose true
//! frequency exceeds `total_weight / capacity` is guaranteed to be tracked.
//!
//! The estimates always sum to [`StreamSummary::total_weight`], the number of items added.
//!
//! # Examples
//!
//! ```
//! # use streamsummary::frequencies::StreamSummary;
//! let mut summary = StreamSummary::new(2).unwrap();
//! summary.add(1);
//! summary.add(2);
//! summary.add(3);
//!
//! assert!(!summary.exists(&1));
//! assert_eq!(summary.estimate(&2), 1);
//! assert_eq!(summary.estimate(&3), 2);
//! assert_eq!(summary.lower_bound(&3), 1);
//! ```
//!
//! # Top-k
//!
//! ```
//! # use streamsummary::frequencies::StreamSummary;
//! let mut summary = StreamSummary::new(16).unwrap();
//! summary.extend(["a", "b", "a", "c", "a", "b"]);
//!
//! let top = summary.top_k(2);
//! assert_eq!(*top[0].item(), "a");
//! assert_eq!(top[0].estimate(), 3);
//! assert_eq!(*top[1].item(), "b");
//! ```
//!
//! # Exporting state
//!
//! ```
//! # use streamsummary::frequencies::StreamSummary;
//! let mut summary = StreamSummary::new(4).unwrap();
//! summary.extend([7, 7, 8]);
//!
//! let state = summary.export_state();
//! assert_eq!(state, vec![(1, vec![8]), (2, vec![7])]);
//!
//! let restored = StreamSummary::import_state(4, state).unwrap();
//! assert_eq!(restored.estimate(&7), 2);
//! ```

mod arena;
mod bucket;
mod frequency_index;
mod item_index;
mod sketch;

pub use self::sketch::BucketRef;
pub use self::sketch::ErrorType;
pub use self::sketch::Row;
pub use self::sketch::StreamSummary;
