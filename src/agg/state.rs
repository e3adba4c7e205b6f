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
use std::collections::{BTreeMap, BTreeSet};

use crate::common::value::Value;

#[derive(Clone, Debug, Default)]
pub(crate) struct SumIntState {
    pub(crate) sum: i64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct SumFloatState {
    pub(crate) sum: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct ProductIntState {
    pub(crate) product: i64,
}

#[derive(Clone, Debug)]
pub(crate) struct ProductFloatState {
    pub(crate) product: f64,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CountState {
    pub(crate) count: i64,
}

/// Single retained value; shared by min, max, and prev_nonnull.
#[derive(Clone, Debug, Default)]
pub(crate) struct ValueSlotState {
    pub(crate) value: Option<Value>,
}

#[derive(Clone, Debug)]
pub(crate) struct TakeState {
    pub(crate) n: usize,
    pub(crate) items: Vec<Option<Value>>,
}

#[derive(Clone, Debug)]
pub(crate) struct TakeByItem {
    pub(crate) value: Option<Value>,
    pub(crate) key: Option<Value>,
}

/// Items kept sorted ascending by key (missing keys last), truncated to n.
#[derive(Clone, Debug)]
pub(crate) struct TakeByState {
    pub(crate) n: usize,
    pub(crate) items: Vec<TakeByItem>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CollectListState {
    pub(crate) items: Vec<Option<Value>>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct CollectSetState {
    pub(crate) items: BTreeSet<Option<Value>>,
}

#[derive(Clone, Debug)]
pub(crate) struct CallStatsState {
    pub(crate) allele_count: Vec<i64>,
    pub(crate) homozygote_count: Vec<i64>,
    pub(crate) allele_number: i64,
}

#[derive(Clone, Debug)]
pub(crate) struct DensifyState {
    pub(crate) slots: Vec<Option<Value>>,
}

/// Mergeable quantile sketch. An item at level i carries weight 2^i; a level
/// over capacity is sorted and every other item promoted one level up. The
/// survivor parity alternates via `keep_odd` so repeated compactions stay
/// unbiased without randomness.
#[derive(Clone, Debug)]
pub(crate) struct CdfSketchState {
    pub(crate) capacity: usize,
    pub(crate) count: u64,
    pub(crate) keep_odd: bool,
    pub(crate) levels: Vec<Vec<f64>>,
}

#[derive(Clone, Debug)]
pub(crate) struct DownsamplePoint {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) label: Option<Value>,
}

#[derive(Clone, Debug)]
pub(crate) struct DownsampleState {
    pub(crate) divisions: usize,
    pub(crate) points: Vec<DownsamplePoint>,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct FoldState {
    pub(crate) value: Option<Value>,
}

/// One nested state bundle per distinct key. The flattened nested init args
/// are retained so the init sequence can be replayed on first sight of a key.
#[derive(Clone, Debug)]
pub(crate) struct GroupedState {
    pub(crate) nested_init: Vec<Vec<Option<Value>>>,
    pub(crate) groups: BTreeMap<Option<Value>, Vec<AggState>>,
}

/// Fixed-length array composite. `len` is established by the first length
/// check of the partition; `positions` holds one nested bundle per index once
/// established.
#[derive(Clone, Debug)]
pub(crate) struct ArrayElemsState {
    pub(crate) nested_init: Vec<Vec<Option<Value>>>,
    pub(crate) len: Option<usize>,
    pub(crate) positions: Vec<Vec<AggState>>,
}

#[derive(Clone, Debug)]
pub(crate) enum AggState {
    SumInt(SumIntState),
    SumFloat(SumFloatState),
    ProductInt(ProductIntState),
    ProductFloat(ProductFloatState),
    Count(CountState),
    Min(ValueSlotState),
    Max(ValueSlotState),
    PrevNonnull(ValueSlotState),
    Take(TakeState),
    TakeBy(TakeByState),
    CollectList(CollectListState),
    CollectSet(CollectSetState),
    CallStats(CallStatsState),
    Densify(DensifyState),
    ApproxCdf(CdfSketchState),
    Downsample(DownsampleState),
    Fold(FoldState),
    Grouped(GroupedState),
    ArrayElems(ArrayElemsState),
}

impl AggState {
    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            AggState::SumInt(_) => "sum_int",
            AggState::SumFloat(_) => "sum_float",
            AggState::ProductInt(_) => "product_int",
            AggState::ProductFloat(_) => "product_float",
            AggState::Count(_) => "count",
            AggState::Min(_) => "min",
            AggState::Max(_) => "max",
            AggState::PrevNonnull(_) => "prev_nonnull",
            AggState::Take(_) => "take",
            AggState::TakeBy(_) => "take_by",
            AggState::CollectList(_) => "collect_list",
            AggState::CollectSet(_) => "collect_set",
            AggState::CallStats(_) => "call_stats",
            AggState::Densify(_) => "densify",
            AggState::ApproxCdf(_) => "approx_cdf",
            AggState::Downsample(_) => "downsample",
            AggState::Fold(_) => "fold",
            AggState::Grouped(_) => "grouped",
            AggState::ArrayElems(_) => "array_elements",
        }
    }
}
