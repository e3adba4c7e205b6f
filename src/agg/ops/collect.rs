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
use std::collections::BTreeSet;

use crate::agg::codec::{read_len, read_opt_value, write_len, write_opt_value};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, CollectListState, CollectSetState};
use crate::common::value::Value;
use crate::error::Result;

use super::Aggregator;
use super::common::{check_args, wrong_state};

/// Every value in encounter order, nulls included.
pub(super) struct CollectListAgg;

impl Aggregator for CollectListAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("collect_as_list", &sig.init_arg_types, args)?;
        Ok(AggState::CollectList(CollectListState::default()))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("collect_as_list", &sig.seq_arg_types, args)?;
        match state {
            AggState::CollectList(s) => {
                s.items.push(args[0].clone());
                Ok(())
            }
            other => Err(wrong_state("collect_as_list seq", other)),
        }
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::CollectList(d), AggState::CollectList(mut s)) => {
                d.items.append(&mut s.items);
                Ok(())
            }
            (dst, _) => Err(wrong_state("collect_as_list comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::CollectList(s) => Ok(Some(Value::Array(s.items.clone()))),
            other => Err(wrong_state("collect_as_list result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::CollectList(s) => {
                write_len(buf, s.items.len())?;
                for item in &s.items {
                    write_opt_value(&sig.seq_arg_types[0], item.as_ref(), buf)?;
                }
                Ok(())
            }
            other => Err(wrong_state("collect_as_list encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let count = read_len(input, "collect_as_list item count")?;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(read_opt_value(&sig.seq_arg_types[0], input)?);
        }
        Ok(AggState::CollectList(CollectListState { items }))
    }
}

/// Distinct values in canonical sort order. Null counts as a distinct
/// element and sorts first.
pub(super) struct CollectSetAgg;

impl Aggregator for CollectSetAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("collect_as_set", &sig.init_arg_types, args)?;
        Ok(AggState::CollectSet(CollectSetState::default()))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("collect_as_set", &sig.seq_arg_types, args)?;
        match state {
            AggState::CollectSet(s) => {
                s.items.insert(args[0].clone());
                Ok(())
            }
            other => Err(wrong_state("collect_as_set seq", other)),
        }
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::CollectSet(d), AggState::CollectSet(s)) => {
                d.items.extend(s.items);
                Ok(())
            }
            (dst, _) => Err(wrong_state("collect_as_set comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::CollectSet(s) => {
                Ok(Some(Value::Array(s.items.iter().cloned().collect())))
            }
            other => Err(wrong_state("collect_as_set result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::CollectSet(s) => {
                write_len(buf, s.items.len())?;
                for item in &s.items {
                    write_opt_value(&sig.seq_arg_types[0], item.as_ref(), buf)?;
                }
                Ok(())
            }
            other => Err(wrong_state("collect_as_set encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let count = read_len(input, "collect_as_set item count")?;
        let mut items = BTreeSet::new();
        for _ in 0..count {
            items.insert(read_opt_value(&sig.seq_arg_types[0], input)?);
        }
        Ok(AggState::CollectSet(CollectSetState { items }))
    }
}
