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
//! Common utilities and helpers for integration tests.
#![allow(dead_code)]

use partagg::{AggSignature, StateRegistry, Value};

pub fn int(v: i64) -> Option<Value> {
    Some(Value::Int64(v))
}

pub fn float(v: f64) -> Option<Value> {
    Some(Value::Float64(v))
}

pub fn string(v: &str) -> Option<Value> {
    Some(Value::Str(v.to_string()))
}

pub fn int_array(values: &[Option<i64>]) -> Option<Value> {
    Some(Value::Array(values.iter().map(|v| v.map(Value::Int64)).collect()))
}

/// One record's argument lists, one entry per registry slot.
pub type Row = Vec<Vec<Option<Value>>>;

/// Builds a registry over `sigs` and initializes each slot from its init
/// argument list.
pub fn fresh_registry(sigs: &[AggSignature], init_args: &[Vec<Option<Value>>]) -> StateRegistry {
    partagg::common::logging::init_logging();
    assert_eq!(sigs.len(), init_args.len());
    let mut registry = StateRegistry::new(sigs.to_vec());
    for (slot, args) in init_args.iter().enumerate() {
        registry.init(slot, args).unwrap();
    }
    registry
}

/// Runs every row of one partition through a fresh registry.
pub fn run_partition(
    sigs: &[AggSignature],
    init_args: &[Vec<Option<Value>>],
    rows: &[Row],
) -> StateRegistry {
    let mut registry = fresh_registry(sigs, init_args);
    for row in rows {
        for (slot, args) in row.iter().enumerate() {
            registry.seq(slot, args).unwrap();
        }
    }
    registry
}

/// Runs each partition independently, ships every partition's state through
/// the codec, and merges the decoded registries in ascending partition
/// index. This is the full distributed lifecycle of a query's aggregations.
pub fn run_partitioned(
    sigs: &[AggSignature],
    init_args: &[Vec<Option<Value>>],
    partitions: &[Vec<Row>],
) -> StateRegistry {
    let blobs: Vec<Vec<u8>> = partitions
        .iter()
        .map(|rows| run_partition(sigs, init_args, rows).serialize().unwrap())
        .collect();

    let mut merged: Option<StateRegistry> = None;
    for blob in &blobs {
        let mut decoded = StateRegistry::deserialize(sigs.to_vec(), blob).unwrap();
        match &mut merged {
            None => merged = Some(decoded),
            Some(acc) => acc.comb_all(&mut decoded).unwrap(),
        }
    }
    merged.unwrap_or_else(|| fresh_registry(sigs, init_args))
}

/// Final values of every slot.
pub fn results(registry: &StateRegistry) -> Vec<Option<Value>> {
    (0..registry.len()).map(|slot| registry.result(slot).unwrap()).collect()
}
