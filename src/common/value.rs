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
use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate};

use crate::error::{AggError, Result};

const UNIX_EPOCH_DAY_OFFSET: i32 = 719163;

/// A single typed value as handed over by the expression evaluator. Nulls are
/// represented as `Option<Value>` at every nesting level.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    Int64(i64),
    Float64(f64),
    Str(String),
    Binary(Vec<u8>),
    Date32(i32),
    /// Microseconds since the unix epoch.
    Timestamp(i64),
    Array(Vec<Option<Value>>),
    Struct(Vec<Option<Value>>),
    Map(Vec<(Option<Value>, Option<Value>)>),
}

impl Value {
    fn type_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int64(_) => 1,
            Value::Float64(_) => 2,
            Value::Str(_) => 3,
            Value::Binary(_) => 4,
            Value::Date32(_) => 5,
            Value::Timestamp(_) => 6,
            Value::Array(_) => 7,
            Value::Struct(_) => 8,
            Value::Map(_) => 9,
        }
    }

    /// Total order over values. Floats order via `f64::total_cmp`, aggregates
    /// lexicographically with nulls first. Values of different variants fall
    /// back to a fixed variant rank; well-typed plans never compare across
    /// variants.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
            (Value::Int64(l), Value::Int64(r)) => l.cmp(r),
            (Value::Float64(l), Value::Float64(r)) => l.total_cmp(r),
            (Value::Str(l), Value::Str(r)) => l.cmp(r),
            (Value::Binary(l), Value::Binary(r)) => l.cmp(r),
            (Value::Date32(l), Value::Date32(r)) => l.cmp(r),
            (Value::Timestamp(l), Value::Timestamp(r)) => l.cmp(r),
            (Value::Array(l), Value::Array(r)) | (Value::Struct(l), Value::Struct(r)) => {
                cmp_opt_slice(l, r)
            }
            (Value::Map(l), Value::Map(r)) => {
                for ((lk, lv), (rk, rv)) in l.iter().zip(r.iter()) {
                    let ord = cmp_opt(lk, rk);
                    if !ord.is_eq() {
                        return ord;
                    }
                    let ord = cmp_opt(lv, rv);
                    if !ord.is_eq() {
                        return ord;
                    }
                }
                l.len().cmp(&r.len())
            }
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    pub fn as_int64(&self) -> Result<i64> {
        match self {
            Value::Int64(v) => Ok(*v),
            other => Err(AggError::TypeMismatch(format!(
                "expected int64, got {:?}",
                other
            ))),
        }
    }

    pub fn as_float64(&self) -> Result<f64> {
        match self {
            Value::Float64(v) => Ok(*v),
            other => Err(AggError::TypeMismatch(format!(
                "expected float64, got {:?}",
                other
            ))),
        }
    }

    pub fn as_array(&self) -> Result<&[Option<Value>]> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(AggError::TypeMismatch(format!(
                "expected array, got {:?}",
                other
            ))),
        }
    }

    pub fn as_struct(&self) -> Result<&[Option<Value>]> {
        match self {
            Value::Struct(items) => Ok(items),
            other => Err(AggError::TypeMismatch(format!(
                "expected struct, got {:?}",
                other
            ))),
        }
    }
}

/// `None` sorts before any present value.
pub fn cmp_opt(left: &Option<Value>, right: &Option<Value>) -> Ordering {
    match (left, right) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(l), Some(r)) => l.total_cmp(r),
    }
}

fn cmp_opt_slice(left: &[Option<Value>], right: &[Option<Value>]) -> Ordering {
    for (l, r) in left.iter().zip(right.iter()) {
        let ord = cmp_opt(l, r);
        if !ord.is_eq() {
            return ord;
        }
    }
    left.len().cmp(&right.len())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.total_cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

fn write_opt(f: &mut fmt::Formatter<'_>, value: &Option<Value>) -> fmt::Result {
    match value {
        Some(v) => write!(f, "{}", v),
        None => write!(f, "NULL"),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", if *v { "1" } else { "0" }),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "{}", v),
            Value::Binary(v) => {
                for byte in v {
                    write!(f, "{:02x}", byte)?;
                }
                Ok(())
            }
            Value::Date32(days) => {
                match NaiveDate::from_num_days_from_ce_opt(UNIX_EPOCH_DAY_OFFSET + days) {
                    Some(date) => write!(f, "{}", date.format("%Y-%m-%d")),
                    None => write!(f, "invalid date({})", days),
                }
            }
            Value::Timestamp(micros) => {
                let seconds = micros.div_euclid(1_000_000);
                let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
                match DateTime::from_timestamp(seconds, nanos) {
                    Some(dt) => write!(f, "{}", dt.naive_utc().format("%Y-%m-%d %H:%M:%S%.6f")),
                    None => write!(f, "invalid timestamp({})", micros),
                }
            }
            Value::Array(items) => {
                write!(f, "[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ",")?;
                    }
                    write_opt(f, item)?;
                }
                write!(f, "]")
            }
            Value::Struct(items) => {
                write!(f, "{{")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ",")?;
                    }
                    write_opt(f, item)?;
                }
                write!(f, "}}")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (idx, (k, v)) in entries.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ",")?;
                    }
                    write_opt(f, k)?;
                    write!(f, ":")?;
                    write_opt(f, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_order_floats() {
        let nan = Value::Float64(f64::NAN);
        assert_eq!(nan.total_cmp(&nan), Ordering::Equal);
        assert_eq!(
            Value::Float64(1.0).total_cmp(&Value::Float64(2.0)),
            Ordering::Less
        );
    }

    #[test]
    fn test_nulls_sort_first() {
        let items = vec![Some(Value::Int64(1)), None];
        let mut sorted = items.clone();
        sorted.sort_by(cmp_opt);
        assert_eq!(sorted, vec![None, Some(Value::Int64(1))]);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(Value::Date32(0).to_string(), "1970-01-01");
        assert_eq!(Value::Date32(19723).to_string(), "2024-01-01");
    }
}
