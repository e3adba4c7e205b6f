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

//! End-to-end lifecycle tests: the same row stream must produce the same
//! final values whether it is aggregated in one pass or split across
//! partitions that serialize, exchange, and merge their state.

mod common;

use common::{fresh_registry, int, results, run_partition, run_partitioned, string, Row};
use partagg::{AggSignature, Value, ValueType};

/// (string, int) records with nulls at both the field and record level.
fn sample_rows() -> Vec<Row> {
    let records: Vec<(Option<&str>, Option<i64>)> = vec![
        (Some("abcd"), Some(5)),
        (None, None),
        (None, Some(-2)),
        (Some("abcd"), Some(7)),
        (None, None),
        (Some("foo"), None),
    ];
    records
        .into_iter()
        .map(|(s, v)| {
            vec![
                vec![v.map(Value::Int64)],
                vec![],
                vec![s.map(|s| Value::Str(s.to_string()))],
            ]
        })
        .collect()
}

fn sample_sigs() -> Vec<AggSignature> {
    vec![
        AggSignature::sum(ValueType::Int64).unwrap(),
        AggSignature::count(),
        AggSignature::prev_nonnull(ValueType::Str),
    ]
}

fn sample_inits() -> Vec<Vec<Option<Value>>> {
    vec![vec![], vec![], vec![]]
}

#[test]
fn test_single_partition_reference() {
    let registry = run_partition(&sample_sigs(), &sample_inits(), &sample_rows());
    assert_eq!(
        results(&registry),
        vec![int(10), int(6), string("foo")]
    );
}

#[test]
fn test_every_two_way_split_matches_reference() {
    let sigs = sample_sigs();
    let inits = sample_inits();
    let rows = sample_rows();
    let expected = results(&run_partition(&sigs, &inits, &rows));

    for cut in 0..=rows.len() {
        let (left, right) = rows.split_at(cut);
        let merged = run_partitioned(&sigs, &inits, &[left.to_vec(), right.to_vec()]);
        assert_eq!(results(&merged), expected, "split at {}", cut);
    }
}

#[test]
fn test_three_way_split_matches_reference() {
    let sigs = sample_sigs();
    let inits = sample_inits();
    let rows = sample_rows();
    let expected = results(&run_partition(&sigs, &inits, &rows));

    let merged = run_partitioned(
        &sigs,
        &inits,
        &[rows[0..2].to_vec(), rows[2..3].to_vec(), rows[3..6].to_vec()],
    );
    assert_eq!(results(&merged), expected);
}

#[test]
fn test_empty_partitions_are_identity() {
    let sigs = sample_sigs();
    let inits = sample_inits();
    let rows = sample_rows();
    let expected = results(&run_partition(&sigs, &inits, &rows));

    let merged = run_partitioned(&sigs, &inits, &[vec![], rows.clone(), vec![]]);
    assert_eq!(results(&merged), expected);
}

#[test]
fn test_zero_rows_yield_identity_values() {
    let registry = fresh_registry(&sample_sigs(), &sample_inits());
    assert_eq!(results(&registry), vec![int(0), int(0), None]);
}

#[test]
fn test_order_insensitive_ops_across_permuted_partitions() {
    let sigs = vec![
        AggSignature::sum(ValueType::Int64).unwrap(),
        AggSignature::min(ValueType::Int64),
        AggSignature::max(ValueType::Int64),
        AggSignature::collect_as_set(ValueType::Int64),
    ];
    let inits = vec![vec![], vec![], vec![], vec![]];
    let rows: Vec<Row> = [3, 1, 4, 1, 5].iter().map(|v| vec![vec![int(*v)]; 4]).collect();

    let forward = run_partitioned(&sigs, &inits, &[rows[..2].to_vec(), rows[2..].to_vec()]);
    let swapped = run_partitioned(&sigs, &inits, &[rows[2..].to_vec(), rows[..2].to_vec()]);
    assert_eq!(results(&forward), results(&swapped));
    assert_eq!(
        results(&forward),
        vec![
            int(14),
            int(1),
            int(5),
            Some(Value::Array(vec![int(1), int(3), int(4), int(5)])),
        ]
    );
}

#[test]
fn test_take_respects_partition_order() {
    let sigs = vec![AggSignature::take(ValueType::Int64)];
    let inits = vec![vec![int(3)]];
    let first: Vec<Row> = [1, 2].iter().map(|v| vec![vec![int(*v)]]).collect();
    let second: Vec<Row> = [3, 4].iter().map(|v| vec![vec![int(*v)]]).collect();

    let merged = run_partitioned(&sigs, &inits, &[first, second]);
    assert_eq!(
        results(&merged),
        vec![Some(Value::Array(vec![int(1), int(2), int(3)]))]
    );
}
