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
use crate::agg::state::{AggState, DensifyState};
use crate::common::value::Value;
use crate::error::{AggError, Result};

use super::Aggregator;
use super::common::{check_args, require_size_arg, wrong_state};

/// Fixed-width slot array where each seq call fills one slot. A non-null
/// write overwrites the slot; comb lets src (the later partition) win.
pub(super) struct DensifyAgg;

impl Aggregator for DensifyAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("densify", &sig.init_arg_types, args)?;
        let n = require_size_arg("densify", args, 0, "slot count")?;
        Ok(AggState::Densify(DensifyState {
            slots: vec![None; n],
        }))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("densify", &sig.seq_arg_types, args)?;
        let s = match state {
            AggState::Densify(s) => s,
            other => return Err(wrong_state("densify seq", other)),
        };
        let idx = require_size_arg("densify", args, 0, "slot index")?;
        if idx >= s.slots.len() {
            return Err(AggError::InvalidArgument(format!(
                "densify slot index {} out of range for {} slots",
                idx,
                s.slots.len()
            )));
        }
        if args[1].is_some() {
            s.slots[idx] = args[1].clone();
        }
        Ok(())
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::Densify(d), AggState::Densify(s)) => {
                if d.slots.len() != s.slots.len() {
                    return Err(AggError::LengthMismatch {
                        expected: d.slots.len(),
                        got: s.slots.len(),
                    });
                }
                for (slot, incoming) in d.slots.iter_mut().zip(s.slots) {
                    if incoming.is_some() {
                        *slot = incoming;
                    }
                }
                Ok(())
            }
            (dst, _) => Err(wrong_state("densify comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::Densify(s) => Ok(Some(Value::Array(s.slots.clone()))),
            other => Err(wrong_state("densify result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::Densify(s) => {
                write_len(buf, s.slots.len())?;
                for slot in &s.slots {
                    write_opt_value(&sig.seq_arg_types[1], slot.as_ref(), buf)?;
                }
                Ok(())
            }
            other => Err(wrong_state("densify encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let n = read_len(input, "densify slot count")?;
        let mut slots = Vec::with_capacity(n);
        for _ in 0..n {
            slots.push(read_opt_value(&sig.seq_arg_types[1], input)?);
        }
        Ok(AggState::Densify(DensifyState { slots }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ValueType;

    #[test]
    fn test_fill_and_overwrite() {
        let sig = AggSignature::densify(ValueType::Str);
        let mut state = DensifyAgg.init(&sig, &[Some(Value::Int64(3))]).unwrap();
        DensifyAgg
            .seq(&sig, &mut state, &[Some(Value::Int64(0)), Some(Value::Str("a".into()))])
            .unwrap();
        DensifyAgg
            .seq(&sig, &mut state, &[Some(Value::Int64(0)), Some(Value::Str("b".into()))])
            .unwrap();
        // Null writes leave the slot alone.
        DensifyAgg
            .seq(&sig, &mut state, &[Some(Value::Int64(0)), None])
            .unwrap();
        assert_eq!(
            DensifyAgg.result(&sig, &state).unwrap(),
            Some(Value::Array(vec![Some(Value::Str("b".into())), None, None]))
        );
    }

    #[test]
    fn test_comb_width_mismatch() {
        let sig = AggSignature::densify(ValueType::Int64);
        let mut a = DensifyAgg.init(&sig, &[Some(Value::Int64(2))]).unwrap();
        let b = DensifyAgg.init(&sig, &[Some(Value::Int64(3))]).unwrap();
        let err = DensifyAgg.comb(&sig, &mut a, b).unwrap_err();
        assert!(matches!(err, AggError::LengthMismatch { expected: 2, got: 3 }));
    }
}
