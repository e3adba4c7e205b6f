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
use crate::agg::codec::{read_bool, read_len, write_bool, write_len};
use crate::agg::signature::AggSignature;
use crate::agg::state::{AggState, ArrayElemsState};
use crate::common::value::Value;
use crate::error::{AggError, Result};

use super::common::{
    check_args, comb_bundle, decode_bundle, decode_init_chunks, encode_bundle, encode_init_chunks,
    init_bundle, result_bundle, seq_bundle, split_init_args, split_seq_args, wrong_state,
};
use super::Aggregator;

/// Per-element composite over arrays of a fixed, stream-determined length.
/// The first non-null array fixes the length and allocates one nested bundle
/// per position; every later array must match it. Callers that project
/// elements themselves drive the slot through [`seq_length`] and
/// [`seq_element`] instead of the whole-array seq.
pub(super) struct ArrayElementsAgg;

fn state_of<'a>(op: &str, state: &'a mut AggState) -> Result<&'a mut ArrayElemsState> {
    match state {
        AggState::ArrayElems(s) => Ok(s),
        other => Err(wrong_state(op, other)),
    }
}

fn ensure_len(s: &mut ArrayElemsState, nested: &[AggSignature], len: usize) -> Result<()> {
    match s.len {
        None => {
            let mut positions = Vec::with_capacity(len);
            for _ in 0..len {
                positions.push(init_bundle(nested, &s.nested_init)?);
            }
            s.len = Some(len);
            s.positions = positions;
            Ok(())
        }
        Some(expected) if expected == len => Ok(()),
        Some(expected) => Err(AggError::LengthMismatch { expected, got: len }),
    }
}

/// Asserts the array length for this row, allocating nested bundles on
/// first use.
pub(crate) fn seq_length(sig: &AggSignature, state: &mut AggState, len: usize) -> Result<()> {
    let nested = sig.nested_sigs()?;
    let s = state_of("array_elements seq_length", state)?;
    ensure_len(s, nested, len)
}

/// Folds one element's flattened nested arguments into position `idx`. The
/// length must already be established for this row.
pub(crate) fn seq_element(
    sig: &AggSignature,
    state: &mut AggState,
    idx: usize,
    args: &[Option<Value>],
) -> Result<()> {
    let nested = sig.nested_sigs()?;
    let s = state_of("array_elements seq_element", state)?;
    if s.len.is_none() {
        return Err(AggError::InvalidArgument(format!(
            "element {} folded before any array length was established",
            idx
        )));
    }
    if idx >= s.positions.len() {
        return Err(AggError::InvalidArgument(format!(
            "element index {} out of range for length {}",
            idx,
            s.positions.len()
        )));
    }
    let chunks = split_seq_args("array_elements", nested, args)?;
    seq_bundle(nested, &mut s.positions[idx], &chunks)
}

fn flat_seq_arity(nested: &[AggSignature]) -> usize {
    nested.iter().map(|sig| sig.seq_arg_types.len()).sum()
}

/// Splits one element value back into the flattened nested argument list:
/// the bare value when the nested operators take a single argument, struct
/// fields otherwise.
fn element_args(
    nested: &[AggSignature],
    element: &Option<Value>,
) -> Result<Vec<Option<Value>>> {
    let arity = flat_seq_arity(nested);
    if arity == 1 {
        return Ok(vec![element.clone()]);
    }
    match element {
        None => Ok(vec![None; arity]),
        Some(Value::Struct(fields)) if fields.len() == arity => Ok(fields.clone()),
        Some(other) => Err(AggError::TypeMismatch(format!(
            "array element must be a {}-field struct, got {:?}",
            arity, other
        ))),
    }
}

impl Aggregator for ArrayElementsAgg {
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState> {
        check_args("array_elements", &sig.init_arg_types, args)?;
        let nested = sig.nested_sigs()?;
        let nested_init = split_init_args("array_elements", nested, args)?
            .into_iter()
            .map(|chunk| chunk.to_vec())
            .collect();
        Ok(AggState::ArrayElems(ArrayElemsState {
            nested_init,
            len: None,
            positions: Vec::new(),
        }))
    }

    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()> {
        check_args("array_elements", &sig.seq_arg_types, args)?;
        let elements = match &args[0] {
            Some(v) => v.as_array()?.to_vec(),
            None => return Ok(()),
        };
        let nested = sig.nested_sigs()?;
        seq_length(sig, state, elements.len())?;
        for (idx, element) in elements.iter().enumerate() {
            let element_chunk = element_args(nested, element)?;
            seq_element(sig, state, idx, &element_chunk)?;
        }
        Ok(())
    }

    fn comb(&self, sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()> {
        let nested = sig.nested_sigs()?;
        match (dst, src) {
            (AggState::ArrayElems(d), AggState::ArrayElems(s)) => {
                match (d.len, s.len) {
                    (_, None) => Ok(()),
                    (None, Some(_)) => {
                        d.len = s.len;
                        d.positions = s.positions;
                        Ok(())
                    }
                    (Some(expected), Some(got)) if expected != got => {
                        Err(AggError::LengthMismatch { expected, got })
                    }
                    (Some(_), Some(_)) => {
                        for (dst_bundle, src_bundle) in d.positions.iter_mut().zip(s.positions) {
                            comb_bundle(nested, dst_bundle, src_bundle)?;
                        }
                        Ok(())
                    }
                }
            }
            (dst, _) => Err(wrong_state("array_elements comb", dst)),
        }
    }

    fn result(&self, sig: &AggSignature, state: &AggState) -> Result<Option<Value>> {
        let nested = sig.nested_sigs()?;
        match state {
            AggState::ArrayElems(s) => {
                let mut elements = Vec::with_capacity(s.positions.len());
                for bundle in &s.positions {
                    elements.push(result_bundle(nested, bundle)?);
                }
                Ok(Some(Value::Array(elements)))
            }
            other => Err(wrong_state("array_elements result", other)),
        }
    }

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()> {
        let nested = sig.nested_sigs()?;
        match state {
            AggState::ArrayElems(s) => {
                encode_init_chunks(nested, &s.nested_init, buf)?;
                write_bool(buf, s.len.is_some());
                if s.len.is_some() {
                    write_len(buf, s.positions.len())?;
                    for bundle in &s.positions {
                        encode_bundle(nested, bundle, buf)?;
                    }
                }
                Ok(())
            }
            other => Err(wrong_state("array_elements encode", other)),
        }
    }

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState> {
        let nested = sig.nested_sigs()?;
        let nested_init = decode_init_chunks(nested, input)?;
        if !read_bool(input, "array_elements length flag")? {
            return Ok(AggState::ArrayElems(ArrayElemsState {
                nested_init,
                len: None,
                positions: Vec::new(),
            }));
        }
        let len = read_len(input, "array_elements length")?;
        let mut positions = Vec::with_capacity(len);
        for _ in 0..len {
            positions.push(decode_bundle(nested, input)?);
        }
        Ok(AggState::ArrayElems(ArrayElemsState {
            nested_init,
            len: Some(len),
            positions,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ValueType;

    fn per_element_sum_sig() -> AggSignature {
        AggSignature::array_elements(vec![AggSignature::sum(ValueType::Int64).unwrap()])
    }

    fn int_array(values: &[i64]) -> Option<Value> {
        Some(Value::Array(
            values.iter().map(|v| Some(Value::Int64(*v))).collect(),
        ))
    }

    #[test]
    fn test_per_position_sums() {
        let sig = per_element_sum_sig();
        let mut state = ArrayElementsAgg.init(&sig, &[]).unwrap();
        ArrayElementsAgg.seq(&sig, &mut state, &[int_array(&[1, 2, 3])]).unwrap();
        ArrayElementsAgg.seq(&sig, &mut state, &[None]).unwrap();
        ArrayElementsAgg.seq(&sig, &mut state, &[int_array(&[10, 20, 30])]).unwrap();
        assert_eq!(
            ArrayElementsAgg.result(&sig, &state).unwrap(),
            Some(Value::Array(vec![
                Some(Value::Struct(vec![Some(Value::Int64(11))])),
                Some(Value::Struct(vec![Some(Value::Int64(22))])),
                Some(Value::Struct(vec![Some(Value::Int64(33))])),
            ]))
        );
    }

    #[test]
    fn test_ragged_arrays_rejected() {
        let sig = per_element_sum_sig();
        let mut state = ArrayElementsAgg.init(&sig, &[]).unwrap();
        ArrayElementsAgg.seq(&sig, &mut state, &[int_array(&[1, 2])]).unwrap();
        let err = ArrayElementsAgg
            .seq(&sig, &mut state, &[int_array(&[1, 2, 3])])
            .unwrap_err();
        assert!(matches!(err, AggError::LengthMismatch { expected: 2, got: 3 }));
    }

    #[test]
    fn test_comb_length_mismatch() {
        let sig = per_element_sum_sig();
        let mut a = ArrayElementsAgg.init(&sig, &[]).unwrap();
        ArrayElementsAgg.seq(&sig, &mut a, &[int_array(&[1])]).unwrap();
        let mut b = ArrayElementsAgg.init(&sig, &[]).unwrap();
        ArrayElementsAgg.seq(&sig, &mut b, &[int_array(&[1, 2])]).unwrap();
        let err = ArrayElementsAgg.comb(&sig, &mut a, b).unwrap_err();
        assert!(matches!(err, AggError::LengthMismatch { expected: 1, got: 2 }));
    }

    #[test]
    fn test_no_arrays_yields_empty() {
        let sig = per_element_sum_sig();
        let state = ArrayElementsAgg.init(&sig, &[]).unwrap();
        assert_eq!(
            ArrayElementsAgg.result(&sig, &state).unwrap(),
            Some(Value::Array(vec![]))
        );
    }

    #[test]
    fn test_element_before_length_rejected() {
        let sig = per_element_sum_sig();
        let mut state = ArrayElementsAgg.init(&sig, &[]).unwrap();
        let err = seq_element(&sig, &mut state, 0, &[Some(Value::Int64(1))]).unwrap_err();
        match err {
            AggError::InvalidArgument(msg) => assert!(msg.contains("length"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_explicit_length_and_element_path() {
        let sig = per_element_sum_sig();
        let mut state = ArrayElementsAgg.init(&sig, &[]).unwrap();
        seq_length(&sig, &mut state, 2).unwrap();
        seq_element(&sig, &mut state, 0, &[Some(Value::Int64(4))]).unwrap();
        seq_element(&sig, &mut state, 1, &[Some(Value::Int64(5))]).unwrap();
        seq_element(&sig, &mut state, 0, &[Some(Value::Int64(6))]).unwrap();
        assert_eq!(
            ArrayElementsAgg.result(&sig, &state).unwrap(),
            Some(Value::Array(vec![
                Some(Value::Struct(vec![Some(Value::Int64(10))])),
                Some(Value::Struct(vec![Some(Value::Int64(5))])),
            ]))
        );
    }
}
