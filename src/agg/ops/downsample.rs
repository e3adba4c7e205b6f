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
use hashbrown::HashSet;

use crate::agg::codec::{read_f64, read_len, read_opt_value, write_f64, write_len, write_opt_value};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, DownsamplePoint, DownsampleState};
use crate::common::value::Value;
use crate::error::Result;

use super::Aggregator;
use super::common::{check_args, require_size_arg, wrong_state};

/// Scatter-plot thinning: retains at most one labelled point per cell of a
/// divisions x divisions grid laid over the current bounding box. Points are
/// regridded lazily once the buffer passes 4 * divisions^2, keeping the
/// earliest point per cell.
pub(super) struct DownsampleAgg;

fn regrid_threshold(divisions: usize) -> usize {
    4 * divisions * divisions
}

fn regrid(state: &mut DownsampleState) {
    if state.points.is_empty() {
        return;
    }
    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for point in &state.points {
        x_min = x_min.min(point.x);
        x_max = x_max.max(point.x);
        y_min = y_min.min(point.y);
        y_max = y_max.max(point.y);
    }
    let x_span = (x_max - x_min).max(f64::MIN_POSITIVE);
    let y_span = (y_max - y_min).max(f64::MIN_POSITIVE);
    let div = state.divisions as f64;

    let mut seen: HashSet<(i64, i64)> = HashSet::with_capacity(state.points.len());
    let points = std::mem::take(&mut state.points);
    for point in points {
        let cell = (
            (((point.x - x_min) / x_span) * div) as i64,
            (((point.y - y_min) / y_span) * div) as i64,
        );
        if seen.insert(cell) {
            state.points.push(point);
        }
    }
}

impl Aggregator for DownsampleAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("downsample", &sig.init_arg_types, args)?;
        let divisions = require_size_arg("downsample", args, 0, "divisions")?.max(1);
        Ok(AggState::Downsample(DownsampleState {
            divisions,
            points: Vec::new(),
        }))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("downsample", &sig.seq_arg_types, args)?;
        let s = match state {
            AggState::Downsample(s) => s,
            other => return Err(wrong_state("downsample seq", other)),
        };
        let (x, y) = match (&args[0], &args[1]) {
            (Some(x), Some(y)) => (x.as_float64()?, y.as_float64()?),
            _ => return Ok(()),
        };
        if !x.is_finite() || !y.is_finite() {
            return Ok(());
        }
        s.points.push(DownsamplePoint {
            x,
            y,
            label: args[2].clone(),
        });
        if s.points.len() > regrid_threshold(s.divisions) {
            regrid(s);
        }
        Ok(())
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::Downsample(d), AggState::Downsample(mut s)) => {
                d.points.append(&mut s.points);
                if d.points.len() > regrid_threshold(d.divisions) {
                    regrid(d);
                }
                Ok(())
            }
            (dst, _) => Err(wrong_state("downsample comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::Downsample(s) => {
                let mut s = s.clone();
                regrid(&mut s);
                Ok(Some(Value::Array(
                    s.points
                        .into_iter()
                        .map(|p| {
                            Some(Value::Struct(vec![
                                Some(Value::Float64(p.x)),
                                Some(Value::Float64(p.y)),
                                p.label,
                            ]))
                        })
                        .collect(),
                )))
            }
            other => Err(wrong_state("downsample result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::Downsample(s) => {
                write_len(buf, s.divisions)?;
                write_len(buf, s.points.len())?;
                for point in &s.points {
                    write_f64(buf, point.x);
                    write_f64(buf, point.y);
                    write_opt_value(&sig.seq_arg_types[2], point.label.as_ref(), buf)?;
                }
                Ok(())
            }
            other => Err(wrong_state("downsample encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let divisions = read_len(input, "downsample divisions")?;
        let count = read_len(input, "downsample point count")?;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let x = read_f64(input, "downsample x")?;
            let y = read_f64(input, "downsample y")?;
            let label = read_opt_value(&sig.seq_arg_types[2], input)?;
            points.push(DownsamplePoint { x, y, label });
        }
        Ok(AggState::Downsample(DownsampleState { divisions, points }))
    }
}
