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
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::agg::codec::{read_len, read_opt_value, write_len, write_opt_value};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, GroupedState};
use crate::common::value::Value;
use crate::error::Result;

use super::common::{
    check_args, comb_bundle, decode_bundle, decode_init_chunks, encode_bundle, encode_init_chunks,
    init_bundle, result_bundle, seq_bundle, split_init_args, split_seq_args,
};
use super::Aggregator;

/// Group-by composite: one bundle of nested accumulators per distinct key.
/// The flattened nested init arguments are retained so bundles for keys
/// first seen mid-stream (or after deserialization) can be created on
/// demand. A null key is an ordinary group.
pub(super) struct GroupedAgg;

impl Aggregator for GroupedAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("grouped", &sig.init_arg_types, args)?;
        let nested = sig.nested_sigs()?;
        let nested_init = split_init_args("grouped", nested, args)?
            .into_iter()
            .map(|chunk| chunk.to_vec())
            .collect();
        Ok(AggState::Grouped(GroupedState {
            nested_init,
            groups: BTreeMap::new(),
        }))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("grouped", &sig.seq_arg_types, args)?;
        let nested = sig.nested_sigs()?;
        let s = match state {
            AggState::Grouped(s) => s,
            other => return Err(super::common::wrong_state("grouped seq", other)),
        };
        let key = args[0].clone();
        let chunks = split_seq_args("grouped", nested, &args[1..])?;
        if !s.groups.contains_key(&key) {
            let bundle = init_bundle(nested, &s.nested_init)?;
            s.groups.insert(key.clone(), bundle);
        }
        let bundle = s
            .groups
            .get_mut(&key)
            .ok_or_else(|| crate::error::AggError::Internal("grouped bundle vanished".into()))?;
        seq_bundle(nested, bundle, &chunks)
    }

    fn comb(&self, sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        let nested = sig.nested_sigs()?;
        match (dst, src) {
            (AggState::Grouped(d), AggState::Grouped(s)) => {
                for (key, src_bundle) in s.groups {
                    match d.groups.entry(key) {
                        Entry::Occupied(mut entry) => {
                            comb_bundle(nested, entry.get_mut(), src_bundle)?;
                        }
                        Entry::Vacant(entry) => {
                            entry.insert(src_bundle);
                        }
                    }
                }
                Ok(())
            }
            (dst, _) => Err(super::common::wrong_state("grouped comb", dst)),
        }
    }

    fn result(&self, sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        let nested = sig.nested_sigs()?;
        match state {
            AggState::Grouped(s) => {
                let mut entries = Vec::with_capacity(s.groups.len());
                for (key, bundle) in &s.groups {
                    entries.push((key.clone(), result_bundle(nested, bundle)?));
                }
                Ok(Some(Value::Map(entries)))
            }
            other => Err(super::common::wrong_state("grouped result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        let nested = sig.nested_sigs()?;
        match state {
            AggState::Grouped(s) => {
                encode_init_chunks(nested, &s.nested_init, buf)?;
                write_len(buf, s.groups.len())?;
                for (key, bundle) in &s.groups {
                    write_opt_value(&sig.seq_arg_types[0], key.as_ref(), buf)?;
                    encode_bundle(nested, bundle, buf)?;
                }
                Ok(())
            }
            other => Err(super::common::wrong_state("grouped encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let nested = sig.nested_sigs()?;
        let nested_init = decode_init_chunks(nested, input)?;
        let n_groups = read_len(input, "grouped group count")?;
        let mut groups = BTreeMap::new();
        for _ in 0..n_groups {
            let key = read_opt_value(&sig.seq_arg_types[0], input)?;
            let bundle = decode_bundle(nested, input)?;
            groups.insert(key, bundle);
        }
        Ok(AggState::Grouped(GroupedState {
            nested_init,
            groups,
        }))
    }
}
