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

//! Codec laws, checked per operator family through the public API:
//! serialize then deserialize must observably preserve state, and merging
//! decoded states must equal merging the live states.

mod common;

use common::{float, int, int_array, results, run_partition, run_partitioned, string, Row};
use partagg::{AggSignature, FoldCombiner, StateRegistry, Value, ValueType};

struct Case {
    name: &'static str,
    sigs: Vec<AggSignature>,
    inits: Vec<Vec<Option<Value>>>,
    rows: Vec<Row>,
}

fn single(sig: AggSignature, init: Vec<Option<Value>>, args: Vec<Vec<Option<Value>>>) -> (Vec<AggSignature>, Vec<Vec<Option<Value>>>, Vec<Row>) {
    let rows = args.into_iter().map(|a| vec![a]).collect();
    (vec![sig], vec![init], rows)
}

fn cases() -> Vec<Case> {
    let mut cases = Vec::new();
    let mut push = |name: &'static str,
                    (sigs, inits, rows): (Vec<AggSignature>, Vec<Vec<Option<Value>>>, Vec<Row>)| {
        cases.push(Case { name, sigs, inits, rows });
    };

    push(
        "sum_int",
        single(
            AggSignature::sum(ValueType::Int64).unwrap(),
            vec![],
            vec![vec![int(5)], vec![None], vec![int(-2)]],
        ),
    );
    push(
        "product_float",
        single(
            AggSignature::product(ValueType::Float64).unwrap(),
            vec![],
            vec![vec![float(2.0)], vec![float(0.5)], vec![None]],
        ),
    );
    push(
        "count",
        single(AggSignature::count(), vec![], vec![vec![], vec![], vec![]]),
    );
    push(
        "min_max",
        (
            vec![
                AggSignature::min(ValueType::Str),
                AggSignature::max(ValueType::Str),
            ],
            vec![vec![], vec![]],
            vec![
                vec![vec![string("pear")], vec![string("pear")]],
                vec![vec![string("apple")], vec![string("apple")]],
                vec![vec![None], vec![None]],
            ],
        ),
    );
    push(
        "prev_nonnull",
        single(
            AggSignature::prev_nonnull(ValueType::Int64),
            vec![],
            vec![vec![int(1)], vec![None], vec![int(3)]],
        ),
    );
    push(
        "take",
        single(
            AggSignature::take(ValueType::Int64),
            vec![int(2)],
            vec![vec![int(1)], vec![None], vec![int(3)]],
        ),
    );
    push(
        "take_by",
        single(
            AggSignature::take_by(ValueType::Str, ValueType::Int64),
            vec![int(2)],
            vec![
                vec![string("c"), int(3)],
                vec![string("a"), int(1)],
                vec![string("b"), int(2)],
            ],
        ),
    );
    push(
        "collect_as_list",
        single(
            AggSignature::collect_as_list(ValueType::Int64),
            vec![],
            vec![vec![int(2)], vec![None], vec![int(2)]],
        ),
    );
    push(
        "collect_as_set",
        single(
            AggSignature::collect_as_set(ValueType::Int64),
            vec![],
            vec![vec![int(2)], vec![None], vec![int(2)], vec![int(1)]],
        ),
    );
    push(
        "call_stats",
        single(
            AggSignature::call_stats(),
            vec![int(2)],
            vec![
                vec![int_array(&[Some(0), Some(0)])],
                vec![int_array(&[Some(0), Some(1)])],
                vec![None],
            ],
        ),
    );
    push(
        "densify",
        single(
            AggSignature::densify(ValueType::Str),
            vec![int(3)],
            vec![
                vec![int(0), string("a")],
                vec![int(2), string("c")],
                vec![int(0), None],
            ],
        ),
    );
    push(
        "approx_cdf",
        single(
            AggSignature::approx_cdf(),
            vec![int(8)],
            (0..64).map(|i| vec![float(i as f64)]).collect(),
        ),
    );
    push(
        "downsample",
        single(
            AggSignature::downsample(ValueType::Str),
            vec![int(4)],
            (0..32)
                .map(|i| vec![float(i as f64), float((i * i) as f64), string("p")])
                .collect(),
        ),
    );
    push(
        "fold",
        single(
            AggSignature::fold(
                FoldCombiner::new("plus_i64", |acc, elem| {
                    Ok(match (acc, elem) {
                        (Some(Value::Int64(a)), Some(Value::Int64(e))) => {
                            Some(Value::Int64(a + e))
                        }
                        (Some(a), None) => Some(a.clone()),
                        (None, Some(e)) => Some(e.clone()),
                        _ => None,
                    })
                }),
                ValueType::Int64,
            ),
            vec![int(0)],
            vec![vec![int(1)], vec![int(2)], vec![None]],
        ),
    );
    push(
        "grouped",
        single(
            AggSignature::grouped(
                ValueType::Str,
                vec![AggSignature::sum(ValueType::Int64).unwrap(), AggSignature::count()],
            ),
            vec![],
            vec![
                vec![string("a"), int(1)],
                vec![string("b"), int(2)],
                vec![None, int(3)],
                vec![string("a"), None],
            ],
        ),
    );
    push(
        "array_elements",
        single(
            AggSignature::array_elements(vec![AggSignature::sum(ValueType::Int64).unwrap()]),
            vec![],
            vec![
                vec![int_array(&[Some(1), Some(2)])],
                vec![int_array(&[Some(10), None])],
            ],
        ),
    );
    cases
}

#[test]
fn test_round_trip_preserves_results() {
    for case in cases() {
        let registry = run_partition(&case.sigs, &case.inits, &case.rows);
        let blob = registry.serialize().unwrap();
        let decoded = StateRegistry::deserialize(case.sigs.clone(), &blob).unwrap();
        assert_eq!(results(&decoded), results(&registry), "case {}", case.name);

        // A second trip through the codec is byte-stable.
        assert_eq!(decoded.serialize().unwrap(), blob, "case {}", case.name);
    }
}

#[test]
fn test_comb_commutes_with_codec() {
    for case in cases() {
        let cut = case.rows.len() / 2;
        let (left, right) = case.rows.split_at(cut);

        // Merge the live registries directly.
        let mut direct = run_partition(&case.sigs, &case.inits, left);
        let mut direct_src = run_partition(&case.sigs, &case.inits, right);
        direct.comb_all(&mut direct_src).unwrap();

        // Merge after shipping both through the codec.
        let exchanged = run_partitioned(
            &case.sigs,
            &case.inits,
            &[left.to_vec(), right.to_vec()],
        );

        assert_eq!(results(&exchanged), results(&direct), "case {}", case.name);
    }
}

#[test]
fn test_decoded_state_keeps_accepting_rows() {
    // Deserialized registries must be able to continue the seq phase using
    // configuration recovered from the blob alone (take's n here).
    let sigs = vec![AggSignature::take(ValueType::Int64)];
    let mut registry = StateRegistry::new(sigs.clone());
    registry.init(0, &[int(2)]).unwrap();
    registry.seq(0, &[int(1)]).unwrap();

    let blob = registry.serialize().unwrap();
    let mut decoded = StateRegistry::deserialize(sigs, &blob).unwrap();
    decoded.seq(0, &[int(2)]).unwrap();
    decoded.seq(0, &[int(3)]).unwrap();
    assert_eq!(
        decoded.result(0).unwrap(),
        Some(Value::Array(vec![int(1), int(2)]))
    );
}
