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
use crate::agg::codec::{read_i64, read_len, write_i64, write_len};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, CallStatsState};
use crate::common::value::Value;
use crate::error::{AggError, Result};

use super::Aggregator;
use super::common::{check_args, require_size_arg, wrong_state};

/// Per-allele call statistics: allele counts, frequencies, total allele
/// number and homozygote counts over genotype calls.
pub(super) struct CallStatsAgg;

impl Aggregator for CallStatsAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("call_stats", &sig.init_arg_types, args)?;
        let n_alleles = require_size_arg("call_stats", args, 0, "allele count")?;
        Ok(AggState::CallStats(CallStatsState {
            allele_count: vec![0; n_alleles],
            homozygote_count: vec![0; n_alleles],
            allele_number: 0,
        }))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("call_stats", &sig.seq_arg_types, args)?;
        let s = match state {
            AggState::CallStats(s) => s,
            other => return Err(wrong_state("call_stats seq", other)),
        };
        let call = match &args[0] {
            Some(v) => v.as_array()?,
            None => return Ok(()),
        };
        let mut first_allele: Option<i64> = None;
        let mut homozygous = true;
        for allele in call {
            let idx = match allele {
                Some(v) => v.as_int64()?,
                None => continue,
            };
            if idx < 0 || idx as usize >= s.allele_count.len() {
                return Err(AggError::InvalidArgument(format!(
                    "allele index {} out of range for {} alleles",
                    idx,
                    s.allele_count.len()
                )));
            }
            s.allele_count[idx as usize] += 1;
            s.allele_number += 1;
            match first_allele {
                None => first_allele = Some(idx),
                Some(first) if first != idx => homozygous = false,
                Some(_) => {}
            }
        }
        // Homozygote means a multi-allele call where every allele matches.
        if homozygous && call.iter().flatten().count() > 1 {
            if let Some(first) = first_allele {
                s.homozygote_count[first as usize] += 1;
            }
        }
        Ok(())
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::CallStats(d), AggState::CallStats(s)) => {
                if d.allele_count.len() != s.allele_count.len() {
                    return Err(AggError::LengthMismatch {
                        expected: d.allele_count.len(),
                        got: s.allele_count.len(),
                    });
                }
                for (acc, count) in d.allele_count.iter_mut().zip(&s.allele_count) {
                    *acc += count;
                }
                for (acc, count) in d.homozygote_count.iter_mut().zip(&s.homozygote_count) {
                    *acc += count;
                }
                d.allele_number += s.allele_number;
                Ok(())
            }
            (dst, _) => Err(wrong_state("call_stats comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::CallStats(s) => {
                let allele_count =
                    Value::Array(s.allele_count.iter().map(|c| Some(Value::Int64(*c))).collect());
                let allele_frequency = Value::Array(
                    s.allele_count
                        .iter()
                        .map(|c| {
                            if s.allele_number == 0 {
                                None
                            } else {
                                Some(Value::Float64(*c as f64 / s.allele_number as f64))
                            }
                        })
                        .collect(),
                );
                let homozygote_count = Value::Array(
                    s.homozygote_count.iter().map(|c| Some(Value::Int64(*c))).collect(),
                );
                Ok(Some(Value::Struct(vec![
                    Some(allele_count),
                    Some(allele_frequency),
                    Some(Value::Int64(s.allele_number)),
                    Some(homozygote_count),
                ])))
            }
            other => Err(wrong_state("call_stats result", other)),
        }
    }

    fn encode(&self, _sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::CallStats(s) => {
                write_len(buf, s.allele_count.len())?;
                for count in &s.allele_count {
                    write_i64(buf, *count);
                }
                for count in &s.homozygote_count {
                    write_i64(buf, *count);
                }
                write_i64(buf, s.allele_number);
                Ok(())
            }
            other => Err(wrong_state("call_stats encode", other)),
        }
    }

    fn decode(&self, _sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let n_alleles = read_len(input, "call_stats allele count")?;
        let mut allele_count = Vec::with_capacity(n_alleles);
        for _ in 0..n_alleles {
            allele_count.push(read_i64(input, "call_stats allele count entry")?);
        }
        let mut homozygote_count = Vec::with_capacity(n_alleles);
        for _ in 0..n_alleles {
            homozygote_count.push(read_i64(input, "call_stats homozygote entry")?);
        }
        let allele_number = read_i64(input, "call_stats allele number")?;
        Ok(AggState::CallStats(CallStatsState {
            allele_count,
            homozygote_count,
            allele_number,
        }))
    }
}
