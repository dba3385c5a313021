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

//! # StreamSummary
//!
//! Bounded-memory heavy-hitter tracking for unbounded streams.
//!
//! The crate implements the Space-Saving "stream summary" of Metwally, Agrawal and El Abbadi:
//! at most `capacity` distinct items are tracked, each with an estimated occurrence count that
//! never under-counts and over-counts by a bounded amount.
//!
//! See [`frequencies`] for the data structure and its guarantees.

#![deny(missing_docs)]

pub mod error;
pub mod frequencies;
