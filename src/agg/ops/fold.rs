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
use crate::agg::signature::{AggOp, AggSignature};
use crate::agg::state::{AggState, FoldState};
use crate::common::value::Value;
use crate::error::{AggError, Result};

use super::Aggregator;
use super::common::{check_args, wrong_state};

/// User-supplied binary combiner folded over the stream. The combiner is
/// carried by the signature, so a decoded state picks it back up without any
/// extra plumbing; it must be associative for cross-partition merges to be
/// well defined, which the engine does not verify.
pub(super) struct FoldAgg;

fn combiner(sig: &AggSignature) -> Result<&crate::agg::signature::FoldCombiner> {
    match &sig.op {
        AggOp::Fold { combiner } => Ok(combiner),
        other => Err(AggError::SignatureMismatch(format!(
            "fold aggregator invoked with {} signature",
            other.name()
        ))),
    }
}

impl Aggregator for FoldAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("fold", &sig.init_arg_types, args)?;
        Ok(AggState::Fold(FoldState {
            value: args[0].clone(),
        }))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("fold", &sig.seq_arg_types, args)?;
        match state {
            AggState::Fold(s) => {
                s.value = combiner(sig)?.apply(s.value.as_ref(), args[0].as_ref())?;
                Ok(())
            }
            other => Err(wrong_state("fold seq", other)),
        }
    }

    fn comb(&self, sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::Fold(d), AggState::Fold(s)) => {
                d.value = combiner(sig)?.apply(d.value.as_ref(), s.value.as_ref())?;
                Ok(())
            }
            (dst, _) => Err(wrong_state("fold comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::Fold(s) => Ok(s.value.clone()),
            other => Err(wrong_state("fold result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::Fold(s) => write_opt_value(&sig.seq_arg_types[0], s.value.as_ref(), buf),
            other => Err(wrong_state("fold encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        Ok(AggState::Fold(FoldState {
            value: read_opt_value(&sig.seq_arg_types[0], input)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agg::signature::FoldCombiner;
    use crate::common::types::ValueType;

    fn max_combiner() -> FoldCombiner {
        FoldCombiner::new("max_i64", |acc, elem| {
            Ok(match (acc, elem) {
                (Some(a), Some(e)) => Some(if e.total_cmp(a) == std::cmp::Ordering::Greater {
                    e.clone()
                } else {
                    a.clone()
                }),
                (Some(a), None) => Some(a.clone()),
                (None, Some(e)) => Some(e.clone()),
                (None, None) => None,
            })
        })
    }

    #[test]
    fn test_fold_from_seed() {
        let sig = AggSignature::fold(max_combiner(), ValueType::Int64);
        let mut state = FoldAgg.init(&sig, &[Some(Value::Int64(10))]).unwrap();
        for v in [Some(Value::Int64(5)), None, Some(Value::Int64(40))] {
            FoldAgg.seq(&sig, &mut state, &[v]).unwrap();
        }
        assert_eq!(FoldAgg.result(&sig, &state).unwrap(), Some(Value::Int64(40)));
    }

    #[test]
    fn test_comb_applies_combiner() {
        let sig = AggSignature::fold(max_combiner(), ValueType::Int64);
        let mut a = FoldAgg.init(&sig, &[Some(Value::Int64(1))]).unwrap();
        let b = FoldAgg.init(&sig, &[Some(Value::Int64(7))]).unwrap();
        FoldAgg.comb(&sig, &mut a, b).unwrap();
        assert_eq!(FoldAgg.result(&sig, &a).unwrap(), Some(Value::Int64(7)));
    }
}
