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
use crate::agg::codec::{read_opt_value, write_opt_value};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, ValueSlotState};
use crate::common::value::Value;
use crate::error::Result;

use super::Aggregator;
use super::common::{check_args, wrong_state};

/// Last non-null value in encounter order. Order-sensitive: comb treats dst
/// as the earlier operand, so src's value wins whenever src saw one.
pub(super) struct PrevNonnullAgg;

impl Aggregator for PrevNonnullAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("prev_nonnull", &sig.init_arg_types, args)?;
        Ok(AggState::PrevNonnull(ValueSlotState::default()))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("prev_nonnull", &sig.seq_arg_types, args)?;
        match state {
            AggState::PrevNonnull(s) => {
                if args[0].is_some() {
                    s.value = args[0].clone();
                }
                Ok(())
            }
            other => Err(wrong_state("prev_nonnull seq", other)),
        }
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::PrevNonnull(d), AggState::PrevNonnull(s)) => {
                if s.value.is_some() {
                    d.value = s.value;
                }
                Ok(())
            }
            (dst, _) => Err(wrong_state("prev_nonnull comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::PrevNonnull(s) => Ok(s.value.clone()),
            other => Err(wrong_state("prev_nonnull result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::PrevNonnull(s) => {
                write_opt_value(&sig.seq_arg_types[0], s.value.as_ref(), buf)
            }
            other => Err(wrong_state("prev_nonnull encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        Ok(AggState::PrevNonnull(ValueSlotState {
            value: read_opt_value(&sig.seq_arg_types[0], input)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ValueType;

    #[test]
    fn test_last_nonnull_wins() {
        let sig = AggSignature::prev_nonnull(ValueType::Str);
        let mut state = PrevNonnullAgg.init(&sig, &[]).unwrap();
        for v in [
            Some(Value::Str("abcd".to_string())),
            None,
            Some(Value::Str("foo".to_string())),
            None,
        ] {
            PrevNonnullAgg.seq(&sig, &mut state, &[v]).unwrap();
        }
        assert_eq!(
            PrevNonnullAgg.result(&sig, &state).unwrap(),
            Some(Value::Str("foo".to_string()))
        );
    }

    #[test]
    fn test_comb_prefers_later_partition() {
        let sig = AggSignature::prev_nonnull(ValueType::Int64);
        let mut earlier = PrevNonnullAgg.init(&sig, &[]).unwrap();
        PrevNonnullAgg
            .seq(&sig, &mut earlier, &[Some(Value::Int64(1))])
            .unwrap();

        // Later partition saw only nulls: dst keeps its value.
        let later = PrevNonnullAgg.init(&sig, &[]).unwrap();
        PrevNonnullAgg.comb(&sig, &mut earlier, later).unwrap();
        assert_eq!(
            PrevNonnullAgg.result(&sig, &earlier).unwrap(),
            Some(Value::Int64(1))
        );

        // Later partition saw a value: it wins.
        let mut later = PrevNonnullAgg.init(&sig, &[]).unwrap();
        PrevNonnullAgg
            .seq(&sig, &mut later, &[Some(Value::Int64(2))])
            .unwrap();
        PrevNonnullAgg.comb(&sig, &mut earlier, later).unwrap();
        assert_eq!(
            PrevNonnullAgg.result(&sig, &earlier).unwrap(),
            Some(Value::Int64(2))
        );
    }
}
