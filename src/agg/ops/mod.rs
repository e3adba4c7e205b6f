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
use crate::agg::signature::{AggOp, AggSignature};
use crate::agg::state::AggState;
use crate::common::value::Value;
use crate::error::Result;

pub(crate) mod common;

mod approx_cdf;
mod array_elements;
mod call_stats;
mod collect;
mod count;
mod densify;
mod downsample;
mod fold;
mod grouped;
mod min_max;
mod prev_nonnull;
mod sum;
mod take;
mod take_by;

use approx_cdf::ApproxCdfAgg;
use array_elements::ArrayElementsAgg;
use call_stats::CallStatsAgg;
use collect::{CollectListAgg, CollectSetAgg};
use count::CountAgg;
use densify::DensifyAgg;
use downsample::DownsampleAgg;
use fold::FoldAgg;
use grouped::GroupedAgg;
use min_max::{MaxAgg, MinAgg};
use prev_nonnull::PrevNonnullAgg;
use sum::{ProductAgg, SumAgg};
use take::TakeAgg;
use take_by::TakeByAgg;

pub(crate) use array_elements::{seq_element, seq_length};

/// The four lifecycle operations plus the state codec, implemented once per
/// operator kind. Dispatch is by the signature's op; composites recurse
/// through their nested signatures.
pub(crate) trait Aggregator: Sync {
    /// Allocates a fresh accumulator from operator configuration. Calling it
    /// again discards prior state.
    fn init(&self, sig: &AggSignature, args: &[Option<Value>]) -> Result<AggState>;

    /// Folds one record's projected argument values into the accumulator.
    fn seq(&self, sig: &AggSignature, state: &mut AggState, args: &[Option<Value>]) -> Result<()>;

    /// Merges src into dst, dst being the "earlier" operand for
    /// order-sensitive operators.
    fn comb(&self, sig: &AggSignature, dst: &mut AggState, src: AggState) -> Result<()>;

    /// Reads out the final value without mutating state. Defined for states
    /// that saw zero seq calls (the operator's identity value).
    fn result(&self, sig: &AggSignature, state: &AggState) -> Result<Option<Value>>;

    fn encode(&self, sig: &AggSignature, state: &AggState, buf: &mut Vec<u8>) -> Result<()>;

    fn decode(&self, sig: &AggSignature, input: &mut &[u8]) -> Result<AggState>;
}

static SUM: SumAgg = SumAgg;
static PRODUCT: ProductAgg = ProductAgg;
static COUNT: CountAgg = CountAgg;
static MIN: MinAgg = MinAgg;
static MAX: MaxAgg = MaxAgg;
static PREV_NONNULL: PrevNonnullAgg = PrevNonnullAgg;
static TAKE: TakeAgg = TakeAgg;
static TAKE_BY: TakeByAgg = TakeByAgg;
static COLLECT_LIST: CollectListAgg = CollectListAgg;
static COLLECT_SET: CollectSetAgg = CollectSetAgg;
static CALL_STATS: CallStatsAgg = CallStatsAgg;
static DENSIFY: DensifyAgg = DensifyAgg;
static APPROX_CDF: ApproxCdfAgg = ApproxCdfAgg;
static DOWNSAMPLE: DownsampleAgg = DownsampleAgg;
static FOLD: FoldAgg = FoldAgg;
static GROUPED: GroupedAgg = GroupedAgg;
static ARRAY_ELEMENTS: ArrayElementsAgg = ArrayElementsAgg;

pub(crate) fn resolve_by_op(op: &AggOp) -> &'static dyn Aggregator {
    match op {
        AggOp::Sum => &SUM,
        AggOp::Product => &PRODUCT,
        AggOp::Count => &COUNT,
        AggOp::Min => &MIN,
        AggOp::Max => &MAX,
        AggOp::PrevNonnull => &PREV_NONNULL,
        AggOp::Take => &TAKE,
        AggOp::TakeBy => &TAKE_BY,
        AggOp::CollectAsList => &COLLECT_LIST,
        AggOp::CollectAsSet => &COLLECT_SET,
        AggOp::CallStats => &CALL_STATS,
        AggOp::Densify => &DENSIFY,
        AggOp::ApproxCdf => &APPROX_CDF,
        AggOp::Downsample => &DOWNSAMPLE,
        AggOp::Fold { .. } => &FOLD,
        AggOp::Grouped => &GROUPED,
        AggOp::ArrayElements => &ARRAY_ELEMENTS,
    }
}
