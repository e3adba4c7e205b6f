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

use crate::agg::codec::{read_opt_value, write_opt_value};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, ValueSlotState};
use crate::common::value::Value;
use crate::error::Result;

use super::Aggregator;
use super::common::{check_args, wrong_state};

fn update_extremum(slot: &mut Option<Value>, candidate: &Option<Value>, keep: Ordering) {
    let Some(candidate) = candidate else { return };
    let replace = match slot {
        None => true,
        Some(current) => candidate.total_cmp(current) == keep,
    };
    if replace {
        *slot = Some(candidate.clone());
    }
}

macro_rules! extremum_agg {
    ($name:ident, $variant:ident, $op:literal, $keep:expr) => {
        pub(super) struct $name;

        impl Aggregator for $name {
            fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
                check_args($op, &sig.init_arg_types, args)?;
                Ok(AggState::$variant(ValueSlotState::default()))
            }

            fn seq(
                &self,
                sig: &AggSignature,
                state: &mut AggState,
                args: &[Option<Value>],
            ) -> Result<()> {
                check_args($op, &sig.seq_arg_types, args)?;
                match state {
                    AggState::$variant(s) => {
                        update_extremum(&mut s.value, &args[0], $keep);
                        Ok(())
                    }
                    other => Err(wrong_state(concat!($op, " seq"), other)),
                }
            }

            fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
                match (dst, src) {
                    (AggState::$variant(d), AggState::$variant(s)) => {
                        update_extremum(&mut d.value, &s.value, $keep);
                        Ok(())
                    }
                    (dst, _) => Err(wrong_state(concat!($op, " comb"), dst)),
                }
            }

            fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
                match state {
                    AggState::$variant(s) => Ok(s.value.clone()),
                    other => Err(wrong_state(concat!($op, " result"), other)),
                }
            }

            fn encode(
                &self,
                sig: &AggSignature,
                state: &AggState,
                buf: &mut Vec<u8>,
            ) -> Result<()> {
                match state {
                    AggState::$variant(s) => {
                        write_opt_value(&sig.seq_arg_types[0], s.value.as_ref(), buf)
                    }
                    other => Err(wrong_state(concat!($op, " encode"), other)),
                }
            }

            fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
                Ok(AggState::$variant(ValueSlotState {
                    value: read_opt_value(&sig.seq_arg_types[0], input)?,
                }))
            }
        }
    };
}

extremum_agg!(MinAgg, Min, "min", Ordering::Less);
extremum_agg!(MaxAgg, Max, "max", Ordering::Greater);
