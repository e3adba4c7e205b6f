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
use std::cmp::Ordering;

use crate::agg::codec::{read_len, read_opt_value, write_len, write_opt_value};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, TakeByItem, TakeByState};
use crate::common::value::Value;
use crate::error::Result;

use super::Aggregator;
use super::common::{check_args, require_size_arg, wrong_state};

/// The n values whose keys sort lowest. Null keys sort after all non-null
/// keys; ties keep insertion order, so merge order stays canonical.
pub(super) struct TakeByAgg;

fn key_cmp(left: &Option<Value>, right: &Option<Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => l.total_cmp(r),
    }
}

fn push_item(state: &mut TakeByState, item: TakeByItem) {
    // Insert after the last item with an equal-or-lower key.
    let pos = state
        .items
        .partition_point(|existing| key_cmp(&existing.key, &item.key) != Ordering::Greater);
    state.items.insert(pos, item);
    state.items.truncate(state.n);
}

impl Aggregator for TakeByAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("take_by", &sig.init_arg_types, args)?;
        let n = require_size_arg("take_by", args, 0, "n")?;
        Ok(AggState::TakeBy(TakeByState {
            n,
            items: Vec::new(),
        }))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("take_by", &sig.seq_arg_types, args)?;
        match state {
            AggState::TakeBy(s) => {
                push_item(
                    s,
                    TakeByItem {
                        value: args[0].clone(),
                        key: args[1].clone(),
                    },
                );
                Ok(())
            }
            other => Err(wrong_state("take_by seq", other)),
        }
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::TakeBy(d), AggState::TakeBy(s)) => {
                for item in s.items {
                    push_item(d, item);
                }
                Ok(())
            }
            (dst, _) => Err(wrong_state("take_by comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::TakeBy(s) => Ok(Some(Value::Array(
                s.items.iter().map(|item| item.value.clone()).collect(),
            ))),
            other => Err(wrong_state("take_by result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::TakeBy(s) => {
                write_len(buf, s.n)?;
                write_len(buf, s.items.len())?;
                for item in &s.items {
                    write_opt_value(&sig.seq_arg_types[0], item.value.as_ref(), buf)?;
                    write_opt_value(&sig.seq_arg_types[1], item.key.as_ref(), buf)?;
                }
                Ok(())
            }
            other => Err(wrong_state("take_by encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let n = read_len(input, "take_by n")?;
        let count = read_len(input, "take_by item count")?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            let value = read_opt_value(&sig.seq_arg_types[0], input)?;
            let key = read_opt_value(&sig.seq_arg_types[1], input)?;
            items.push(TakeByItem { value, key });
        }
        Ok(AggState::TakeBy(TakeByState { n, items }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ValueType;

    fn seq_pair(sig: &AggSignature, state: &mut AggState, value: Option<i64>, key: Option<i64>) {
        TakeByAgg
            .seq(
                sig,
                state,
                &[value.map(Value::Int64), key.map(Value::Int64)],
            )
            .unwrap();
    }

    #[test]
    fn test_smallest_keys_win() {
        let sig = AggSignature::take_by(ValueType::Int64, ValueType::Int64);
        let mut state = TakeByAgg.init(&sig, &[Some(Value::Int64(2))]).unwrap();
        seq_pair(&sig, &mut state, Some(10), Some(3));
        seq_pair(&sig, &mut state, Some(20), Some(1));
        seq_pair(&sig, &mut state, Some(30), Some(2));
        assert_eq!(
            TakeByAgg.result(&sig, &state).unwrap(),
            Some(Value::Array(vec![Some(Value::Int64(20)), Some(Value::Int64(30))]))
        );
    }

    #[test]
    fn test_null_keys_sort_last() {
        let sig = AggSignature::take_by(ValueType::Int64, ValueType::Int64);
        let mut state = TakeByAgg.init(&sig, &[Some(Value::Int64(2))]).unwrap();
        seq_pair(&sig, &mut state, Some(10), None);
        seq_pair(&sig, &mut state, Some(20), Some(5));
        assert_eq!(
            TakeByAgg.result(&sig, &state).unwrap(),
            Some(Value::Array(vec![Some(Value::Int64(20)), Some(Value::Int64(10))]))
        );
    }

    #[test]
    fn test_comb_reorders_by_key() {
        let sig = AggSignature::take_by(ValueType::Int64, ValueType::Int64);
        let init = [Some(Value::Int64(2))];
        let mut a = TakeByAgg.init(&sig, &init).unwrap();
        seq_pair(&sig, &mut a, Some(1), Some(9));
        let mut b = TakeByAgg.init(&sig, &init).unwrap();
        seq_pair(&sig, &mut b, Some(2), Some(4));
        seq_pair(&sig, &mut b, Some(3), Some(6));
        TakeByAgg.comb(&sig, &mut a, b).unwrap();
        assert_eq!(
            TakeByAgg.result(&sig, &a).unwrap(),
            Some(Value::Array(vec![Some(Value::Int64(2)), Some(Value::Int64(3))]))
        );
    }
}
