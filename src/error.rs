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
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AggError>;

/// Errors surfaced by the aggregation engine. None of these are retried or
/// absorbed internally; a failed call leaves the affected slot undefined and
/// the surrounding execution scope must be discarded.
#[derive(Debug, Error)]
pub enum AggError {
    #[error("slot {0} out of range")]
    SlotOutOfRange(usize),

    /// seq/comb/result called on a slot that was never initialized, or on a
    /// slot consumed by a previous comb. A bug in the calling evaluator, not
    /// a data error.
    #[error("slot {0} is not initialized")]
    Uninitialized(usize),

    /// Two states being combined do not agree structurally (signature or
    /// init-derived configuration). Indicates a planning bug.
    #[error("signature mismatch: {0}")]
    SignatureMismatch(String),

    /// A fixed-length array aggregation observed two different lengths.
    #[error("array length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("state decode failed: {0}")]
    Codec(String),

    /// Engine invariant violated (e.g. a slot holds a state of the wrong
    /// variant for its signature).
    #[error("internal error: {0}")]
    Internal(String),
}
