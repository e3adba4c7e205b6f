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
use crate::agg::state::AggState;
use crate::common::types::ValueType;
use crate::common::value::Value;
use crate::error::{AggError, Result};

use super::resolve_by_op;

/// Validates argument count and (for present values) types against the
/// declared list.
pub(in crate::agg) fn check_args(
    op: &str,
    types: &[ValueType],
    args: &[Option<Value>],
) -> Result<()> {
    if args.len() != types.len() {
        return Err(AggError::InvalidArgument(format!(
            "{} expects {} arguments, got {}",
            op,
            types.len(),
            args.len()
        )));
    }
    for (idx, (ty, arg)) in types.iter().zip(args.iter()).enumerate() {
        if let Some(v) = arg {
            if !ty.accepts(v) {
                return Err(AggError::TypeMismatch(format!(
                    "{} argument {} expects {:?}, got {:?}",
                    op, idx, ty, v
                )));
            }
        }
    }
    Ok(())
}

/// A required, non-null integer argument (operator configuration like
/// take's n or call_stats' allele count).
pub(in crate::agg) fn require_int_arg(
    op: &str,
    args: &[Option<Value>],
    idx: usize,
    what: &str,
) -> Result<i64> {
    match args.get(idx) {
        Some(Some(v)) => v.as_int64(),
        _ => Err(AggError::InvalidArgument(format!(
            "{} requires a non-null {} argument",
            op, what
        ))),
    }
}

pub(in crate::agg) fn require_size_arg(
    op: &str,
    args: &[Option<Value>],
    idx: usize,
    what: &str,
) -> Result<usize> {
    let v = require_int_arg(op, args, idx, what)?;
    usize::try_from(v).map_err(|_| {
        AggError::InvalidArgument(format!("{} {} must be non-negative, got {}", op, what, v))
    })
}

pub(in crate::agg) fn wrong_state(op: &str, state: &AggState) -> AggError {
    AggError::Internal(format!(
        "{} operation on {} state",
        op,
        state.variant_name()
    ))
}

/// Splits a flattened argument slice into per-nested-signature chunks, by
/// each nested signature's declared seq arity.
pub(in crate::agg) fn split_seq_args<'a>(
    op: &str,
    nested: &[AggSignature],
    args: &'a [Option<Value>],
) -> Result<Vec<&'a [Option<Value>]>> {
    split_by(op, nested, args, |sig| sig.seq_arg_types.len())
}

pub(in crate::agg) fn split_init_args<'a>(
    op: &str,
    nested: &[AggSignature],
    args: &'a [Option<Value>],
) -> Result<Vec<&'a [Option<Value>]>> {
    split_by(op, nested, args, |sig| sig.init_arg_types.len())
}

fn split_by<'a>(
    op: &str,
    nested: &[AggSignature],
    args: &'a [Option<Value>],
    arity: impl Fn(&AggSignature) -> usize,
) -> Result<Vec<&'a [Option<Value>]>> {
    let mut chunks = Vec::with_capacity(nested.len());
    let mut rest = args;
    for sig in nested {
        let n = arity(sig);
        if rest.len() < n {
            return Err(AggError::InvalidArgument(format!(
                "{} nested arguments exhausted: {} needs {}, {} remain",
                op,
                sig.op.name(),
                n,
                rest.len()
            )));
        }
        let (chunk, tail) = rest.split_at(n);
        chunks.push(chunk);
        rest = tail;
    }
    if !rest.is_empty() {
        return Err(AggError::InvalidArgument(format!(
            "{} received {} surplus nested arguments",
            op,
            rest.len()
        )));
    }
    Ok(chunks)
}

/// One state per nested signature, initialized from the stored init chunks.
pub(in crate::agg) fn init_bundle(
    nested: &[AggSignature],
    init_chunks: &[Vec<Option<Value>>],
) -> Result<Vec<AggState>> {
    debug_assert_eq!(nested.len(), init_chunks.len());
    let mut bundle = Vec::with_capacity(nested.len());
    for (sig, chunk) in nested.iter().zip(init_chunks.iter()) {
        bundle.push(resolve_by_op(&sig.op).init(sig, chunk)?);
    }
    Ok(bundle)
}

pub(in crate::agg) fn seq_bundle(
    nested: &[AggSignature],
    bundle: &mut [AggState],
    chunks: &[&[Option<Value>]],
) -> Result<()> {
    for ((sig, state), chunk) in nested.iter().zip(bundle.iter_mut()).zip(chunks.iter()) {
        resolve_by_op(&sig.op).seq(sig, state, chunk)?;
    }
    Ok(())
}

pub(in crate::agg) fn comb_bundle(
    nested: &[AggSignature],
    dst: &mut [AggState],
    src: Vec<AggState>,
) -> Result<()> {
    for ((sig, dst_state), src_state) in nested.iter().zip(dst.iter_mut()).zip(src) {
        resolve_by_op(&sig.op).comb(sig, dst_state, src_state)?;
    }
    Ok(())
}

/// Nested results as one struct value, field order following the nested
/// signature order.
pub(in crate::agg) fn result_bundle(
    nested: &[AggSignature],
    bundle: &[AggState],
) -> Result<Option<Value>> {
    let mut fields = Vec::with_capacity(nested.len());
    for (sig, state) in nested.iter().zip(bundle.iter()) {
        fields.push(resolve_by_op(&sig.op).result(sig, state)?);
    }
    Ok(Some(Value::Struct(fields)))
}

pub(in crate::agg) fn encode_bundle(
    nested: &[AggSignature],
    bundle: &[AggState],
    buf: &mut Vec<u8>,
) -> Result<()> {
    for (sig, state) in nested.iter().zip(bundle.iter()) {
        resolve_by_op(&sig.op).encode(sig, state, buf)?;
    }
    Ok(())
}

pub(in crate::agg) fn decode_bundle(
    nested: &[AggSignature],
    input: &mut &[u8],
) -> Result<Vec<AggState>> {
    let mut bundle = Vec::with_capacity(nested.len());
    for sig in nested {
        bundle.push(resolve_by_op(&sig.op).decode(sig, input)?);
    }
    Ok(bundle)
}

/// Encodes the stored flattened init chunks of a composite, typed by the
/// nested signatures' init arg types.
pub(in crate::agg) fn encode_init_chunks(
    nested: &[AggSignature],
    chunks: &[Vec<Option<Value>>],
    buf: &mut Vec<u8>,
) -> Result<()> {
    for (sig, chunk) in nested.iter().zip(chunks.iter()) {
        for (ty, arg) in sig.init_arg_types.iter().zip(chunk.iter()) {
            crate::agg::codec::write_opt_value(ty, arg.as_ref(), buf)?;
        }
    }
    Ok(())
}

pub(in crate::agg) fn decode_init_chunks(
    nested: &[AggSignature],
    input: &mut &[u8],
) -> Result<Vec<Vec<Option<Value>>>> {
    let mut chunks = Vec::with_capacity(nested.len());
    for sig in nested {
        let mut chunk = Vec::with_capacity(sig.init_arg_types.len());
        for ty in &sig.init_arg_types {
            chunk.push(crate::agg::codec::read_opt_value(ty, input)?);
        }
        chunks.push(chunk);
    }
    Ok(chunks)
}
