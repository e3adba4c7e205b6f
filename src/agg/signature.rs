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
use std::fmt;
use std::sync::Arc;

use crate::common::types::ValueType;
use crate::common::value::Value;
use crate::error::{AggError, Result};

/// Caller-supplied pure combining function for `Fold`. The function must be
/// associative for partition-order independence to hold; the engine documents
/// but does not check this. Signature equality compares the name only, since
/// callbacks themselves are not comparable.
#[derive(Clone)]
pub struct FoldCombiner {
    name: String,
    func: Arc<dyn Fn(Option<&Value>, Option<&Value>) -> Result<Option<Value>> + Send + Sync>,
}

impl FoldCombiner {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(Option<&Value>, Option<&Value>) -> Result<Option<Value>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, accum: Option<&Value>, other: Option<&Value>) -> Result<Option<Value>> {
        (self.func)(accum, other)
    }
}

impl fmt::Debug for FoldCombiner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoldCombiner")
            .field("name", &self.name)
            .finish()
    }
}

impl PartialEq for FoldCombiner {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for FoldCombiner {}

/// Closed operator catalog. Composite kinds carry their nested signatures as
/// data on `AggSignature`, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AggOp {
    Sum,
    Product,
    Count,
    Min,
    Max,
    PrevNonnull,
    Take,
    TakeBy,
    CollectAsList,
    CollectAsSet,
    CallStats,
    Densify,
    ApproxCdf,
    Downsample,
    Grouped,
    /// The length-check + per-element composite pair. One slot owns the
    /// state; the length-check operation is `StateRegistry::seq_length` and
    /// the per-element operation is `StateRegistry::seq_element`.
    ArrayElements,
    Fold { combiner: FoldCombiner },
}

impl AggOp {
    pub fn name(&self) -> &'static str {
        match self {
            AggOp::Sum => "sum",
            AggOp::Product => "product",
            AggOp::Count => "count",
            AggOp::Min => "min",
            AggOp::Max => "max",
            AggOp::PrevNonnull => "prev_nonnull",
            AggOp::Take => "take",
            AggOp::TakeBy => "take_by",
            AggOp::CollectAsList => "collect_as_list",
            AggOp::CollectAsSet => "collect_as_set",
            AggOp::CallStats => "call_stats",
            AggOp::Densify => "densify",
            AggOp::ApproxCdf => "approx_cdf",
            AggOp::Downsample => "downsample",
            AggOp::Grouped => "grouped",
            AggOp::ArrayElements => "array_elements",
            AggOp::Fold { .. } => "fold",
        }
    }
}

/// Static descriptor of one aggregate operator: op kind, initializer argument
/// types, per-record argument types, and nested signatures for composites.
/// Built once from the compiled plan and never mutated; fully determines
/// dispatch, state shape, and the wire codec. Equality is structural.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggSignature {
    pub op: AggOp,
    pub init_arg_types: Vec<ValueType>,
    pub seq_arg_types: Vec<ValueType>,
    pub nested: Option<Vec<AggSignature>>,
}

fn flatten_init_types(nested: &[AggSignature]) -> Vec<ValueType> {
    nested
        .iter()
        .flat_map(|sig| sig.init_arg_types.iter().cloned())
        .collect()
}

fn flatten_seq_types(nested: &[AggSignature]) -> Vec<ValueType> {
    nested
        .iter()
        .flat_map(|sig| sig.seq_arg_types.iter().cloned())
        .collect()
}

/// The per-element value type for an `ArrayElements` composite: the single
/// nested seq type when the bundle takes exactly one argument, otherwise a
/// struct of the flattened nested seq types.
fn element_type(nested: &[AggSignature]) -> ValueType {
    let mut seq_types = flatten_seq_types(nested);
    if seq_types.len() == 1 {
        seq_types.remove(0)
    } else {
        ValueType::Struct(seq_types)
    }
}

impl AggSignature {
    fn primitive(op: AggOp, init: Vec<ValueType>, seq: Vec<ValueType>) -> Self {
        Self {
            op,
            init_arg_types: init,
            seq_arg_types: seq,
            nested: None,
        }
    }

    pub fn sum(value_type: ValueType) -> Result<Self> {
        match value_type {
            ValueType::Int64 | ValueType::Float64 => {
                Ok(Self::primitive(AggOp::Sum, vec![], vec![value_type]))
            }
            other => Err(AggError::InvalidArgument(format!(
                "sum unsupported value type: {:?}",
                other
            ))),
        }
    }

    pub fn product(value_type: ValueType) -> Result<Self> {
        match value_type {
            ValueType::Int64 | ValueType::Float64 => {
                Ok(Self::primitive(AggOp::Product, vec![], vec![value_type]))
            }
            other => Err(AggError::InvalidArgument(format!(
                "product unsupported value type: {:?}",
                other
            ))),
        }
    }

    pub fn count() -> Self {
        Self::primitive(AggOp::Count, vec![], vec![])
    }

    pub fn min(value_type: ValueType) -> Self {
        Self::primitive(AggOp::Min, vec![], vec![value_type])
    }

    pub fn max(value_type: ValueType) -> Self {
        Self::primitive(AggOp::Max, vec![], vec![value_type])
    }

    pub fn prev_nonnull(value_type: ValueType) -> Self {
        Self::primitive(AggOp::PrevNonnull, vec![], vec![value_type])
    }

    pub fn take(value_type: ValueType) -> Self {
        Self::primitive(AggOp::Take, vec![ValueType::Int64], vec![value_type])
    }

    pub fn take_by(value_type: ValueType, key_type: ValueType) -> Self {
        Self::primitive(
            AggOp::TakeBy,
            vec![ValueType::Int64],
            vec![value_type, key_type],
        )
    }

    pub fn collect_as_list(value_type: ValueType) -> Self {
        Self::primitive(AggOp::CollectAsList, vec![], vec![value_type])
    }

    pub fn collect_as_set(value_type: ValueType) -> Self {
        Self::primitive(AggOp::CollectAsSet, vec![], vec![value_type])
    }

    pub fn call_stats() -> Self {
        Self::primitive(
            AggOp::CallStats,
            vec![ValueType::Int64],
            vec![ValueType::array(ValueType::Int64)],
        )
    }

    pub fn densify(value_type: ValueType) -> Self {
        Self::primitive(
            AggOp::Densify,
            vec![ValueType::Int64],
            vec![ValueType::Int64, value_type],
        )
    }

    pub fn approx_cdf() -> Self {
        Self::primitive(
            AggOp::ApproxCdf,
            vec![ValueType::Int64],
            vec![ValueType::Float64],
        )
    }

    pub fn downsample(label_type: ValueType) -> Self {
        Self::primitive(
            AggOp::Downsample,
            vec![ValueType::Int64],
            vec![ValueType::Float64, ValueType::Float64, label_type],
        )
    }

    pub fn fold(combiner: FoldCombiner, accum_type: ValueType) -> Self {
        Self::primitive(
            AggOp::Fold { combiner },
            vec![accum_type.clone()],
            vec![accum_type],
        )
    }

    pub fn grouped(key_type: ValueType, nested: Vec<AggSignature>) -> Self {
        let mut seq = vec![key_type];
        seq.extend(flatten_seq_types(&nested));
        Self {
            op: AggOp::Grouped,
            init_arg_types: flatten_init_types(&nested),
            seq_arg_types: seq,
            nested: Some(nested),
        }
    }

    pub fn array_elements(nested: Vec<AggSignature>) -> Self {
        let elem = element_type(&nested);
        Self {
            op: AggOp::ArrayElements,
            init_arg_types: flatten_init_types(&nested),
            seq_arg_types: vec![ValueType::array(elem)],
            nested: Some(nested),
        }
    }

    pub(crate) fn nested_sigs(&self) -> Result<&[AggSignature]> {
        self.nested.as_deref().ok_or_else(|| {
            AggError::Internal(format!("{} signature has no nested signatures", self.op.name()))
        })
    }

    /// Result value type implied by this signature. `None` results (e.g.
    /// prev_nonnull with no non-null input) are represented at the `Option`
    /// layer and carry no type.
    pub fn result_type(&self) -> ValueType {
        match &self.op {
            AggOp::Sum | AggOp::Product => self.seq_arg_types[0].clone(),
            AggOp::Count => ValueType::Int64,
            AggOp::Min | AggOp::Max | AggOp::PrevNonnull => self.seq_arg_types[0].clone(),
            AggOp::Take | AggOp::TakeBy | AggOp::CollectAsList | AggOp::CollectAsSet => {
                ValueType::array(self.seq_arg_types[0].clone())
            }
            AggOp::CallStats => ValueType::Struct(vec![
                ValueType::array(ValueType::Int64),
                ValueType::array(ValueType::Float64),
                ValueType::Int64,
                ValueType::array(ValueType::Int64),
            ]),
            AggOp::Densify => ValueType::array(self.seq_arg_types[1].clone()),
            AggOp::ApproxCdf => ValueType::Struct(vec![
                ValueType::array(ValueType::Float64),
                ValueType::array(ValueType::Int64),
            ]),
            AggOp::Downsample => ValueType::array(ValueType::Struct(vec![
                ValueType::Float64,
                ValueType::Float64,
                self.seq_arg_types[2].clone(),
            ])),
            AggOp::Fold { .. } => self.init_arg_types[0].clone(),
            AggOp::Grouped => {
                let nested = self.nested.as_deref().unwrap_or(&[]);
                ValueType::map(
                    self.seq_arg_types[0].clone(),
                    ValueType::Struct(nested.iter().map(|sig| sig.result_type()).collect()),
                )
            }
            AggOp::ArrayElements => {
                let nested = self.nested.as_deref().unwrap_or(&[]);
                ValueType::array(ValueType::Struct(
                    nested.iter().map(|sig| sig.result_type()).collect(),
                ))
            }
        }
    }
}
