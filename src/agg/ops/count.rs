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
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, CountState};
use crate::common::value::Value;
use crate::error::Result;

use super::Aggregator;
use super::common::{check_args, wrong_state};

/// Counts records, not values: takes no per-record arguments and counts
/// every seq call, null fields included.
pub(super) struct CountAgg;

impl Aggregator for CountAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("count", &sig.init_arg_types, args)?;
        Ok(AggState::Count(CountState::default()))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("count", &sig.seq_arg_types, args)?;
        match state {
            AggState::Count(s) => {
                s.count += 1;
                Ok(())
            }
            other => Err(wrong_state("count seq", other)),
        }
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::Count(d), AggState::Count(s)) => {
                d.count += s.count;
                Ok(())
            }
            (dst, _) => Err(wrong_state("count comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::Count(s) => Ok(Some(Value::Int64(s.count))),
            other => Err(wrong_state("count result", other)),
        }
    }

    fn encode(&self, _sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::Count(s) => {
                crate::agg::codec::write_i64(buf, s.count);
                Ok(())
            }
            other => Err(wrong_state("count encode", other)),
        }
    }

    fn decode(&self, _sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        Ok(AggState::Count(CountState {
            count: crate::agg::codec::read_i64(input, "count")?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_records() {
        let sig = AggSignature::count();
        let mut a = CountAgg.init(&sig, &[]).unwrap();
        let mut b = CountAgg.init(&sig, &[]).unwrap();
        for _ in 0..4 {
            CountAgg.seq(&sig, &mut a, &[]).unwrap();
        }
        CountAgg.seq(&sig, &mut b, &[]).unwrap();
        CountAgg.comb(&sig, &mut a, b).unwrap();
        assert_eq!(CountAgg.result(&sig, &a).unwrap(), Some(Value::Int64(5)));
    }
}
