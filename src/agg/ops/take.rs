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
use crate::agg::codec::{read_len, read_opt_value, write_len, write_opt_value};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, TakeState};
use crate::common::value::Value;
use crate::error::Result;

use super::Aggregator;
use super::common::{check_args, require_size_arg, wrong_state};

/// First n values in encounter order, nulls included. Order-sensitive:
/// comb appends src's items after dst's and truncates to n.
pub(super) struct TakeAgg;

impl Aggregator for TakeAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("take", &sig.init_arg_types, args)?;
        let n = require_size_arg("take", args, 0, "n")?;
        Ok(AggState::Take(TakeState {
            n,
            items: Vec::new(),
        }))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("take", &sig.seq_arg_types, args)?;
        match state {
            AggState::Take(s) => {
                if s.items.len() < s.n {
                    s.items.push(args[0].clone());
                }
                Ok(())
            }
            other => Err(wrong_state("take seq", other)),
        }
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::Take(d), AggState::Take(s)) => {
                for item in s.items {
                    if d.items.len() >= d.n {
                        break;
                    }
                    d.items.push(item);
                }
                Ok(())
            }
            (dst, _) => Err(wrong_state("take comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::Take(s) => Ok(Some(Value::Array(s.items.clone()))),
            other => Err(wrong_state("take result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::Take(s) => {
                write_len(buf, s.n)?;
                write_len(buf, s.items.len())?;
                for item in &s.items {
                    write_opt_value(&sig.seq_arg_types[0], item.as_ref(), buf)?;
                }
                Ok(())
            }
            other => Err(wrong_state("take encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let n = read_len(input, "take n")?;
        let count = read_len(input, "take item count")?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read_opt_value(&sig.seq_arg_types[0], input)?);
        }
        Ok(AggState::Take(TakeState { n, items }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ValueType;

    #[test]
    fn test_take_keeps_nulls_and_caps() {
        let sig = AggSignature::take(ValueType::Int64);
        let mut state = TakeAgg.init(&sig, &[Some(Value::Int64(3))]).unwrap();
        for v in [Some(Value::Int64(1)), None, Some(Value::Int64(2)), Some(Value::Int64(9))] {
            TakeAgg.seq(&sig, &mut state, &[v]).unwrap();
        }
        assert_eq!(
            TakeAgg.result(&sig, &state).unwrap(),
            Some(Value::Array(vec![Some(Value::Int64(1)), None, Some(Value::Int64(2))]))
        );
    }

    #[test]
    fn test_comb_appends_in_partition_order() {
        let sig = AggSignature::take(ValueType::Int64);
        let init = [Some(Value::Int64(3))];
        let mut a = TakeAgg.init(&sig, &init).unwrap();
        TakeAgg.seq(&sig, &mut a, &[Some(Value::Int64(1))]).unwrap();
        TakeAgg.seq(&sig, &mut a, &[Some(Value::Int64(2))]).unwrap();
        let mut b = TakeAgg.init(&sig, &init).unwrap();
        TakeAgg.seq(&sig, &mut b, &[Some(Value::Int64(3))]).unwrap();
        TakeAgg.seq(&sig, &mut b, &[Some(Value::Int64(4))]).unwrap();
        TakeAgg.comb(&sig, &mut a, b).unwrap();
        assert_eq!(
            TakeAgg.result(&sig, &a).unwrap(),
            Some(Value::Array(vec![
                Some(Value::Int64(1)),
                Some(Value::Int64(2)),
                Some(Value::Int64(3)),
            ]))
        );
    }
}
