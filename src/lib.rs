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

//! Composable aggregation kernels for a partitioned query evaluator.
//!
//! Aggregation follows a four-phase protocol. Each partition initializes a
//! [`StateRegistry`] from a shared list of [`AggSignature`]s, folds its rows
//! in with seq calls, and serializes the registry. The coordinator
//! deserializes the per-partition blobs, merges them in ascending partition
//! index with comb, and reads final values out with result.

pub mod agg;
pub mod common;
pub mod error;

pub use agg::{AggOp, AggSignature, FoldCombiner, StateRegistry};
pub use common::types::ValueType;
pub use common::value::Value;
pub use error::{AggError, Result};
