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
use super::value::Value;

/// Structural type descriptor for argument and result values. Signatures are
/// built from these; the codec and every dispatch decision is driven by them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ValueType {
    Bool,
    Int64,
    Float64,
    Str,
    Binary,
    /// Days since the unix epoch.
    Date32,
    /// Microseconds since the unix epoch.
    Timestamp,
    Array(Box<ValueType>),
    Struct(Vec<ValueType>),
    Map(Box<ValueType>, Box<ValueType>),
}

impl ValueType {
    pub fn array(item: ValueType) -> ValueType {
        ValueType::Array(Box::new(item))
    }

    pub fn map(key: ValueType, value: ValueType) -> ValueType {
        ValueType::Map(Box::new(key), Box::new(value))
    }

    /// Whether `value` conforms to this type. Nulls are checked at the
    /// `Option` layer by callers; this only sees present values.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::Bool, Value::Bool(_)) => true,
            (ValueType::Int64, Value::Int64(_)) => true,
            (ValueType::Float64, Value::Float64(_)) => true,
            (ValueType::Str, Value::Str(_)) => true,
            (ValueType::Binary, Value::Binary(_)) => true,
            (ValueType::Date32, Value::Date32(_)) => true,
            (ValueType::Timestamp, Value::Timestamp(_)) => true,
            (ValueType::Array(item), Value::Array(items)) => {
                items.iter().flatten().all(|v| item.accepts(v))
            }
            (ValueType::Struct(fields), Value::Struct(items)) => {
                fields.len() == items.len()
                    && fields
                        .iter()
                        .zip(items.iter())
                        .all(|(ty, item)| item.as_ref().map_or(true, |v| ty.accepts(v)))
            }
            (ValueType::Map(key, val), Value::Map(entries)) => entries.iter().all(|(k, v)| {
                k.as_ref().map_or(true, |k| key.accepts(k))
                    && v.as_ref().map_or(true, |v| val.accepts(v))
            }),
            _ => false,
        }
    }
}
