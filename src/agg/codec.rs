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

//! Little-endian, signature-driven state codec. Layout is implementation
//! defined; both sides of the wire are assumed to hold the same signature
//! tree, so no type tags are transmitted beyond null bytes and lengths.

use crate::common::types::ValueType;
use crate::common::value::Value;
use crate::error::{AggError, Result};

/// Bumped whenever the state layout changes incompatibly.
pub(crate) const STATE_CODEC_VERSION: u8 = 1;

pub(crate) fn write_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

pub(crate) fn write_bool(buf: &mut Vec<u8>, v: bool) {
    buf.push(u8::from(v));
}

pub(crate) fn write_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn write_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn write_u64(buf: &mut Vec<u8>, v: u64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn write_f64(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub(crate) fn write_len(buf: &mut Vec<u8>, len: usize) -> Result<()> {
    let len = u32::try_from(len)
        .map_err(|_| AggError::InvalidArgument("length exceeds u32 range".to_string()))?;
    buf.extend_from_slice(&len.to_le_bytes());
    Ok(())
}

pub(crate) fn write_bytes(buf: &mut Vec<u8>, bytes: &[u8]) -> Result<()> {
    write_len(buf, bytes.len())?;
    buf.extend_from_slice(bytes);
    Ok(())
}

fn take<'a>(input: &mut &'a [u8], n: usize, what: &str) -> Result<&'a [u8]> {
    if input.len() < n {
        return Err(AggError::Codec(format!(
            "{} needs {} bytes, {} remain",
            what,
            n,
            input.len()
        )));
    }
    let (head, tail) = input.split_at(n);
    *input = tail;
    Ok(head)
}

pub(crate) fn read_u8(input: &mut &[u8], what: &str) -> Result<u8> {
    Ok(take(input, 1, what)?[0])
}

pub(crate) fn read_bool(input: &mut &[u8], what: &str) -> Result<bool> {
    Ok(read_u8(input, what)? != 0)
}

pub(crate) fn read_i32(input: &mut &[u8], what: &str) -> Result<i32> {
    let bytes = take(input, 4, what)?;
    Ok(i32::from_le_bytes(bytes.try_into().expect("4 bytes")))
}

pub(crate) fn read_i64(input: &mut &[u8], what: &str) -> Result<i64> {
    let bytes = take(input, 8, what)?;
    Ok(i64::from_le_bytes(bytes.try_into().expect("8 bytes")))
}

pub(crate) fn read_u64(input: &mut &[u8], what: &str) -> Result<u64> {
    let bytes = take(input, 8, what)?;
    Ok(u64::from_le_bytes(bytes.try_into().expect("8 bytes")))
}

pub(crate) fn read_f64(input: &mut &[u8], what: &str) -> Result<f64> {
    let bytes = take(input, 8, what)?;
    Ok(f64::from_le_bytes(bytes.try_into().expect("8 bytes")))
}

pub(crate) fn read_len(input: &mut &[u8], what: &str) -> Result<usize> {
    let bytes = take(input, 4, what)?;
    Ok(u32::from_le_bytes(bytes.try_into().expect("4 bytes")) as usize)
}

pub(crate) fn read_bytes<'a>(input: &mut &'a [u8], what: &str) -> Result<&'a [u8]> {
    let len = read_len(input, what)?;
    take(input, len, what)
}

/// Null byte followed by the type-directed payload.
pub(crate) fn write_opt_value(
    ty: &ValueType,
    value: Option<&Value>,
    buf: &mut Vec<u8>,
) -> Result<()> {
    match value {
        None => {
            write_u8(buf, 0);
            Ok(())
        }
        Some(v) => {
            write_u8(buf, 1);
            write_value(ty, v, buf)
        }
    }
}

fn write_value(ty: &ValueType, value: &Value, buf: &mut Vec<u8>) -> Result<()> {
    match (ty, value) {
        (ValueType::Bool, Value::Bool(v)) => {
            write_bool(buf, *v);
            Ok(())
        }
        (ValueType::Int64, Value::Int64(v)) => {
            write_i64(buf, *v);
            Ok(())
        }
        (ValueType::Float64, Value::Float64(v)) => {
            write_f64(buf, *v);
            Ok(())
        }
        (ValueType::Str, Value::Str(v)) => write_bytes(buf, v.as_bytes()),
        (ValueType::Binary, Value::Binary(v)) => write_bytes(buf, v),
        (ValueType::Date32, Value::Date32(v)) => {
            write_i32(buf, *v);
            Ok(())
        }
        (ValueType::Timestamp, Value::Timestamp(v)) => {
            write_i64(buf, *v);
            Ok(())
        }
        (ValueType::Array(item), Value::Array(items)) => {
            write_len(buf, items.len())?;
            for v in items {
                write_opt_value(item, v.as_ref(), buf)?;
            }
            Ok(())
        }
        (ValueType::Struct(fields), Value::Struct(items)) => {
            if fields.len() != items.len() {
                return Err(AggError::TypeMismatch(format!(
                    "struct field count mismatch: expected {}, got {}",
                    fields.len(),
                    items.len()
                )));
            }
            for (field_ty, v) in fields.iter().zip(items.iter()) {
                write_opt_value(field_ty, v.as_ref(), buf)?;
            }
            Ok(())
        }
        (ValueType::Map(key, val), Value::Map(entries)) => {
            write_len(buf, entries.len())?;
            for (k, v) in entries {
                write_opt_value(key, k.as_ref(), buf)?;
                write_opt_value(val, v.as_ref(), buf)?;
            }
            Ok(())
        }
        (ty, value) => Err(AggError::TypeMismatch(format!(
            "value {:?} does not match type {:?}",
            value, ty
        ))),
    }
}

pub(crate) fn read_opt_value(ty: &ValueType, input: &mut &[u8]) -> Result<Option<Value>> {
    if read_u8(input, "null byte")? == 0 {
        return Ok(None);
    }
    read_value(ty, input).map(Some)
}

fn read_value(ty: &ValueType, input: &mut &[u8]) -> Result<Value> {
    match ty {
        ValueType::Bool => Ok(Value::Bool(read_bool(input, "bool")?)),
        ValueType::Int64 => Ok(Value::Int64(read_i64(input, "int64")?)),
        ValueType::Float64 => Ok(Value::Float64(read_f64(input, "float64")?)),
        ValueType::Str => {
            let bytes = read_bytes(input, "string")?;
            let s = std::str::from_utf8(bytes)
                .map_err(|e| AggError::Codec(format!("invalid utf8 string: {}", e)))?;
            Ok(Value::Str(s.to_string()))
        }
        ValueType::Binary => Ok(Value::Binary(read_bytes(input, "binary")?.to_vec())),
        ValueType::Date32 => Ok(Value::Date32(read_i32(input, "date32")?)),
        ValueType::Timestamp => Ok(Value::Timestamp(read_i64(input, "timestamp")?)),
        ValueType::Array(item) => {
            let len = read_len(input, "array length")?;
            let mut items = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                items.push(read_opt_value(item, input)?);
            }
            Ok(Value::Array(items))
        }
        ValueType::Struct(fields) => {
            let mut items = Vec::with_capacity(fields.len());
            for field_ty in fields {
                items.push(read_opt_value(field_ty, input)?);
            }
            Ok(Value::Struct(items))
        }
        ValueType::Map(key, val) => {
            let len = read_len(input, "map length")?;
            let mut entries = Vec::with_capacity(len.min(1024));
            for _ in 0..len {
                let k = read_opt_value(key, input)?;
                let v = read_opt_value(val, input)?;
                entries.push((k, v));
            }
            Ok(Value::Map(entries))
        }
    }
}
