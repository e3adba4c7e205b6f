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
use crate::agg::codec::{
    read_bool, read_f64, read_len, read_u64, write_bool, write_f64, write_len, write_u64,
};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, CdfSketchState};
use crate::common::value::Value;
use crate::error::Result;

use super::Aggregator;
use super::common::{check_args, require_size_arg, wrong_state};

/// Quantile sketch over f64 samples. Items at level i carry weight 2^i;
/// when a level overflows its buffer, it is sorted and every other item is
/// promoted one level up. The kept parity alternates per compaction, so
/// identical input streams always produce the identical sketch.
pub(super) struct ApproxCdfAgg;

fn level_capacity(capacity: usize, level: usize) -> usize {
    (capacity >> level).max(2)
}

fn compact(state: &mut CdfSketchState) {
    let mut level = 0;
    while level < state.levels.len() {
        if state.levels[level].len() < level_capacity(state.capacity, level) {
            level += 1;
            continue;
        }
        let mut buf = std::mem::take(&mut state.levels[level]);
        buf.sort_by(f64::total_cmp);
        let offset = usize::from(state.keep_odd);
        state.keep_odd = !state.keep_odd;
        let promoted: Vec<f64> = buf.into_iter().skip(offset).step_by(2).collect();
        if level + 1 == state.levels.len() {
            state.levels.push(Vec::new());
        }
        state.levels[level + 1].extend(promoted);
        level += 1;
    }
}

impl Aggregator for ApproxCdfAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("approx_cdf", &sig.init_arg_types, args)?;
        let capacity = require_size_arg("approx_cdf", args, 0, "buffer size")?.max(4);
        Ok(AggState::ApproxCdf(CdfSketchState {
            capacity,
            count: 0,
            keep_odd: false,
            levels: vec![Vec::new()],
        }))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("approx_cdf", &sig.seq_arg_types, args)?;
        let s = match state {
            AggState::ApproxCdf(s) => s,
            other => return Err(wrong_state("approx_cdf seq", other)),
        };
        let sample = match &args[0] {
            Some(v) => v.as_float64()?,
            None => return Ok(()),
        };
        s.levels[0].push(sample);
        s.count += 1;
        if s.levels[0].len() >= level_capacity(s.capacity, 0) {
            compact(s);
        }
        Ok(())
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::ApproxCdf(d), AggState::ApproxCdf(s)) => {
                if s.levels.len() > d.levels.len() {
                    d.levels.resize(s.levels.len(), Vec::new());
                }
                for (level, items) in s.levels.into_iter().enumerate() {
                    d.levels[level].extend(items);
                }
                d.count += s.count;
                compact(d);
                Ok(())
            }
            (dst, _) => Err(wrong_state("approx_cdf comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::ApproxCdf(s) => {
                let mut weighted: Vec<(f64, i64)> = Vec::new();
                for (level, items) in s.levels.iter().enumerate() {
                    let weight = 1i64 << level;
                    weighted.extend(items.iter().map(|v| (*v, weight)));
                }
                weighted.sort_by(|a, b| f64::total_cmp(&a.0, &b.0));
                let values = weighted.iter().map(|(v, _)| Some(Value::Float64(*v))).collect();
                let weights = weighted.iter().map(|(_, w)| Some(Value::Int64(*w))).collect();
                Ok(Some(Value::Struct(vec![
                    Some(Value::Array(values)),
                    Some(Value::Array(weights)),
                ])))
            }
            other => Err(wrong_state("approx_cdf result", other)),
        }
    }

    fn encode(&self, _sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::ApproxCdf(s) => {
                write_len(buf, s.capacity)?;
                write_u64(buf, s.count);
                write_bool(buf, s.keep_odd);
                write_len(buf, s.levels.len())?;
                for level in &s.levels {
                    write_len(buf, level.len())?;
                    for value in level {
                        write_f64(buf, *value);
                    }
                }
                Ok(())
            }
            other => Err(wrong_state("approx_cdf encode", other)),
        }
    }

    fn decode(&self, _sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let capacity = read_len(input, "approx_cdf buffer size")?;
        let count = read_u64(input, "approx_cdf sample count")?;
        let keep_odd = read_bool(input, "approx_cdf parity")?;
        let n_levels = read_len(input, "approx_cdf level count")?;
        let mut levels = Vec::with_capacity(n_levels.max(1));
        for _ in 0..n_levels {
            let len = read_len(input, "approx_cdf level size")?;
            let mut level = Vec::with_capacity(len);
            for _ in 0..len {
                level.push(read_f64(input, "approx_cdf sample")?);
            }
            levels.push(level);
        }
        if levels.is_empty() {
            levels.push(Vec::new());
        }
        Ok(AggState::ApproxCdf(CdfSketchState {
            capacity,
            count,
            keep_odd,
            levels,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total_weight(state: &AggState) -> i64 {
        match ApproxCdfAgg
            .result(&AggSignature::approx_cdf(), state)
            .unwrap()
            .unwrap()
        {
            Value::Struct(fields) => match &fields[1] {
                Some(Value::Array(weights)) => weights
                    .iter()
                    .map(|w| match w {
                        Some(Value::Int64(w)) => *w,
                        _ => 0,
                    })
                    .sum(),
                _ => 0,
            },
            _ => 0,
        }
    }

    #[test]
    fn test_weights_preserve_total_count() {
        let sig = AggSignature::approx_cdf();
        let mut state = ApproxCdfAgg.init(&sig, &[Some(Value::Int64(8))]).unwrap();
        for i in 0..100 {
            ApproxCdfAgg
                .seq(&sig, &mut state, &[Some(Value::Float64(i as f64))])
                .unwrap();
        }
        assert_eq!(total_weight(&state), 100);
    }

    #[test]
    fn test_small_input_is_exact() {
        let sig = AggSignature::approx_cdf();
        let mut state = ApproxCdfAgg.init(&sig, &[Some(Value::Int64(100))]).unwrap();
        for v in [3.0, 1.0, 2.0] {
            ApproxCdfAgg.seq(&sig, &mut state, &[Some(Value::Float64(v))]).unwrap();
        }
        let result = ApproxCdfAgg.result(&sig, &state).unwrap().unwrap();
        let fields = result.as_struct().unwrap();
        assert_eq!(
            fields[0],
            Some(Value::Array(vec![
                Some(Value::Float64(1.0)),
                Some(Value::Float64(2.0)),
                Some(Value::Float64(3.0)),
            ]))
        );
    }

    #[test]
    fn test_merge_matches_sequential_parity() {
        let sig = AggSignature::approx_cdf();
        let init = [Some(Value::Int64(8))];
        let mut a = ApproxCdfAgg.init(&sig, &init).unwrap();
        let mut b = ApproxCdfAgg.init(&sig, &init).unwrap();
        for i in 0..50 {
            ApproxCdfAgg.seq(&sig, &mut a, &[Some(Value::Float64(i as f64))]).unwrap();
        }
        for i in 50..100 {
            ApproxCdfAgg.seq(&sig, &mut b, &[Some(Value::Float64(i as f64))]).unwrap();
        }
        ApproxCdfAgg.comb(&sig, &mut a, b).unwrap();
        assert_eq!(total_weight(&a), 100);
    }
}
