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
use crate::agg::state::{AggState, ProductFloatState, ProductIntState, SumFloatState, SumIntState};
use crate::common::types::ValueType;
use crate::common::value::Value;
use crate::error::{AggError, Result};

use super::Aggregator;
use super::common::{check_args, wrong_state};

pub(super) struct SumAgg;

impl Aggregator for SumAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("sum", &sig.init_arg_types, args)?;
        match &sig.seq_arg_types[0] {
            ValueType::Int64 => Ok(AggState::SumInt(SumIntState::default())),
            ValueType::Float64 => Ok(AggState::SumFloat(SumFloatState::default())),
            other => Err(AggError::TypeMismatch(format!(
                "sum unsupported value type: {:?}",
                other
            ))),
        }
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("sum", &sig.seq_arg_types, args)?;
        match state {
            AggState::SumInt(s) => {
                if let Some(v) = &args[0] {
                    s.sum = s.sum.wrapping_add(v.as_int64()?);
                }
                Ok(())
            }
            AggState::SumFloat(s) => {
                if let Some(v) = &args[0] {
                    s.sum += v.as_float64()?;
                }
                Ok(())
            }
            other => Err(wrong_state("sum seq", other)),
        }
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::SumInt(d), AggState::SumInt(s)) => {
                d.sum = d.sum.wrapping_add(s.sum);
                Ok(())
            }
            (AggState::SumFloat(d), AggState::SumFloat(s)) => {
                d.sum += s.sum;
                Ok(())
            }
            (dst, _) => Err(wrong_state("sum comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::SumInt(s) => Ok(Some(Value::Int64(s.sum))),
            AggState::SumFloat(s) => Ok(Some(Value::Float64(s.sum))),
            other => Err(wrong_state("sum result", other)),
        }
    }

    fn encode(&self, _sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::SumInt(s) => {
                crate::agg::codec::write_i64(buf, s.sum);
                Ok(())
            }
            AggState::SumFloat(s) => {
                crate::agg::codec::write_f64(buf, s.sum);
                Ok(())
            }
            other => Err(wrong_state("sum encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        match &sig.seq_arg_types[0] {
            ValueType::Int64 => Ok(AggState::SumInt(SumIntState {
                sum: crate::agg::codec::read_i64(input, "sum")?,
            })),
            ValueType::Float64 => Ok(AggState::SumFloat(SumFloatState {
                sum: crate::agg::codec::read_f64(input, "sum")?,
            })),
            other => Err(AggError::Codec(format!(
                "sum unsupported value type: {:?}",
                other
            ))),
        }
    }
}

pub(super) struct ProductAgg;

impl Aggregator for ProductAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("product", &sig.init_arg_types, args)?;
        match &sig.seq_arg_types[0] {
            ValueType::Int64 => Ok(AggState::ProductInt(ProductIntState { product: 1 })),
            ValueType::Float64 => Ok(AggState::ProductFloat(ProductFloatState { product: 1.0 })),
            other => Err(AggError::TypeMismatch(format!(
                "product unsupported value type: {:?}",
                other
            ))),
        }
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("product", &sig.seq_arg_types, args)?;
        match state {
            AggState::ProductInt(s) => {
                if let Some(v) = &args[0] {
                    s.product = s.product.wrapping_mul(v.as_int64()?);
                }
                Ok(())
            }
            AggState::ProductFloat(s) => {
                if let Some(v) = &args[0] {
                    s.product *= v.as_float64()?;
                }
                Ok(())
            }
            other => Err(wrong_state("product seq", other)),
        }
    }

    fn comb(&self, _sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        match (dst, src) {
            (AggState::ProductInt(d), AggState::ProductInt(s)) => {
                d.product = d.product.wrapping_mul(s.product);
                Ok(())
            }
            (AggState::ProductFloat(d), AggState::ProductFloat(s)) => {
                d.product *= s.product;
                Ok(())
            }
            (dst, _) => Err(wrong_state("product comb", dst)),
        }
    }

    fn result(&self, _sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        match state {
            AggState::ProductInt(s) => Ok(Some(Value::Int64(s.product))),
            AggState::ProductFloat(s) => Ok(Some(Value::Float64(s.product))),
            other => Err(wrong_state("product result", other)),
        }
    }

    fn encode(&self, _sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        match state {
            AggState::ProductInt(s) => {
                crate::agg::codec::write_i64(buf, s.product);
                Ok(())
            }
            AggState::ProductFloat(s) => {
                crate::agg::codec::write_f64(buf, s.product);
                Ok(())
            }
            other => Err(wrong_state("product encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        match &sig.seq_arg_types[0] {
            ValueType::Int64 => Ok(AggState::ProductInt(ProductIntState {
                product: crate::agg::codec::read_i64(input, "product")?,
            })),
            ValueType::Float64 => Ok(AggState::ProductFloat(ProductFloatState {
                product: crate::agg::codec::read_f64(input, "product")?,
            })),
            other => Err(AggError::Codec(format!(
                "product unsupported value type: {:?}",
                other
            ))),
        }
    }
}
