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
use tracing::debug;

use crate::agg::codec::{read_u8, write_u8, STATE_CODEC_VERSION};
use crate::agg::ops::{self, resolve_by_op, Aggregator};
use crate::agg::signature::{AggOp, AggSignature};
use crate::agg::state::AggState;
use crate::common::value::Value;
use crate::error::{AggError, Result};

#[derive(Debug)]
struct Slot {
    sig: AggSignature,
    // None until init runs, and again after comb consumes it as a source.
    state: Option<AggState>,
}

/// One partition's aggregation scratch space: a fixed vector of slots, one
/// per aggregator signature, addressed by index. The slot layout is decided
/// at planning time and must be identical across every partition that later
/// merges or exchanges serialized state.
#[derive(Debug)]
pub struct StateRegistry {
    slots: Vec<Slot>,
}

impl StateRegistry {
    pub fn new(signatures: Vec<AggSignature>) -> Self {
        debug!(slots = signatures.len(), "created aggregation state registry");
        StateRegistry {
            slots: signatures
                .into_iter()
                .map(|sig| Slot { sig, state: None })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn signature(&self, slot: usize) -> Result<&AggSignature> {
        Ok(&self.get(slot)?.sig)
    }

    fn get(&self, slot: usize) -> Result<&Slot> {
        self.slots.get(slot).ok_or(AggError::SlotOutOfRange(slot))
    }

    fn get_mut(&mut self, slot: usize) -> Result<&mut Slot> {
        self.slots
            .get_mut(slot)
            .ok_or(AggError::SlotOutOfRange(slot))
    }

    fn agg(&self, slot: usize) -> Result<&'static dyn Aggregator> {
        Ok(resolve_by_op(&self.get(slot)?.sig.op))
    }

    /// Creates (or resets) the accumulator in `slot` from its init
    /// arguments.
    pub fn init(&mut self, slot: usize, args: &[Option<Value>]) -> Result<()> {
        let agg = self.agg(slot)?;
        let entry = self.get_mut(slot)?;
        entry.state = Some(agg.init(&entry.sig, args)?);
        Ok(())
    }

    /// Folds one record's argument values into `slot`.
    pub fn seq(&mut self, slot: usize, args: &[Option<Value>]) -> Result<()> {
        let agg = self.agg(slot)?;
        let entry = self.get_mut(slot)?;
        let state = entry.state.as_mut().ok_or(AggError::Uninitialized(slot))?;
        agg.seq(&entry.sig, state, args)
    }

    /// Asserts the array length observed for this record in a per-element
    /// slot.
    pub fn seq_length(&mut self, slot: usize, len: usize) -> Result<()> {
        let entry = self.get_mut(slot)?;
        require_array_elements("seq_length", &entry.sig)?;
        let state = entry.state.as_mut().ok_or(AggError::Uninitialized(slot))?;
        ops::seq_length(&entry.sig, state, len)
    }

    /// Folds one element's argument values into position `idx` of a
    /// per-element slot.
    pub fn seq_element(&mut self, slot: usize, idx: usize, args: &[Option<Value>]) -> Result<()> {
        let entry = self.get_mut(slot)?;
        require_array_elements("seq_element", &entry.sig)?;
        let state = entry.state.as_mut().ok_or(AggError::Uninitialized(slot))?;
        ops::seq_element(&entry.sig, state, idx, args)
    }

    /// Merges `src`'s slot into this registry's same slot, leaving `src`'s
    /// slot uninitialized. This registry is the earlier operand for
    /// order-sensitive operators, so merge partitions in ascending
    /// partition index.
    pub fn comb(&mut self, slot: usize, src: &mut StateRegistry) -> Result<()> {
        let agg = self.agg(slot)?;
        let src_entry = src.get_mut(slot)?;
        {
            let entry = self.get(slot)?;
            if entry.sig != src_entry.sig {
                return Err(AggError::SignatureMismatch(format!(
                    "slot {} holds {} but source holds {}",
                    slot,
                    entry.sig.op.name(),
                    src_entry.sig.op.name()
                )));
            }
        }
        let src_state = src_entry
            .state
            .take()
            .ok_or(AggError::Uninitialized(slot))?;
        let entry = self.get_mut(slot)?;
        let state = entry.state.as_mut().ok_or(AggError::Uninitialized(slot))?;
        agg.comb(&entry.sig, state, src_state)
    }

    /// Merges every slot of `src` into this registry.
    pub fn comb_all(&mut self, src: &mut StateRegistry) -> Result<()> {
        if self.slots.len() != src.slots.len() {
            return Err(AggError::SignatureMismatch(format!(
                "registry has {} slots, source has {}",
                self.slots.len(),
                src.slots.len()
            )));
        }
        for slot in 0..self.slots.len() {
            self.comb(slot, src)?;
        }
        Ok(())
    }

    /// Reads out `slot`'s final value without consuming the state.
    pub fn result(&self, slot: usize) -> Result<Option<Value>> {
        let agg = self.agg(slot)?;
        let entry = self.get(slot)?;
        let state = entry.state.as_ref().ok_or(AggError::Uninitialized(slot))?;
        agg.result(&entry.sig, state)
    }

    /// Serializes every slot into one versioned blob. All slots must be
    /// initialized.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        write_u8(&mut buf, STATE_CODEC_VERSION);
        for (slot, entry) in self.slots.iter().enumerate() {
            let state = entry.state.as_ref().ok_or(AggError::Uninitialized(slot))?;
            resolve_by_op(&entry.sig.op).encode(&entry.sig, state, &mut buf)?;
        }
        debug!(slots = self.slots.len(), bytes = buf.len(), "serialized aggregation state");
        Ok(buf)
    }

    /// Rebuilds a registry from a blob produced by [`serialize`] under the
    /// identical signature list. The blob must be consumed exactly.
    ///
    /// [`serialize`]: StateRegistry::serialize
    pub fn deserialize(signatures: Vec<AggSignature>, bytes: &[u8]) -> Result<StateRegistry> {
        let mut input = bytes;
        let version = read_u8(&mut input, "state codec version")?;
        if version != STATE_CODEC_VERSION {
            return Err(AggError::Codec(format!(
                "unsupported state codec version {} (expected {})",
                version, STATE_CODEC_VERSION
            )));
        }
        let mut registry = StateRegistry::new(signatures);
        for entry in &mut registry.slots {
            let state = resolve_by_op(&entry.sig.op).decode(&entry.sig, &mut input)?;
            entry.state = Some(state);
        }
        if !input.is_empty() {
            return Err(AggError::Codec(format!(
                "{} trailing bytes after aggregation state",
                input.len()
            )));
        }
        debug!(slots = registry.slots.len(), bytes = bytes.len(), "deserialized aggregation state");
        Ok(registry)
    }
}

fn require_array_elements(op: &str, sig: &AggSignature) -> Result<()> {
    if sig.op == AggOp::ArrayElements {
        Ok(())
    } else {
        Err(AggError::SignatureMismatch(format!(
            "{} is only defined for per-element slots, not {}",
            op,
            sig.op.name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::ValueType;

    fn sum_count_registry() -> StateRegistry {
        let mut registry = StateRegistry::new(vec![
            AggSignature::sum(ValueType::Int64).unwrap(),
            AggSignature::count(),
        ]);
        registry.init(0, &[]).unwrap();
        registry.init(1, &[]).unwrap();
        registry
    }

    #[test]
    fn test_seq_before_init_is_fatal() {
        let mut registry = StateRegistry::new(vec![AggSignature::count()]);
        let err = registry.seq(0, &[]).unwrap_err();
        assert!(matches!(err, AggError::Uninitialized(0)));
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut registry = sum_count_registry();
        let err = registry.seq(2, &[Some(Value::Int64(1))]).unwrap_err();
        assert!(matches!(err, AggError::SlotOutOfRange(2)));
    }

    #[test]
    fn test_comb_consumes_source_slot() {
        let mut a = sum_count_registry();
        let mut b = sum_count_registry();
        b.seq(0, &[Some(Value::Int64(5))]).unwrap();
        b.seq(1, &[]).unwrap();
        a.comb_all(&mut b).unwrap();
        assert_eq!(a.result(0).unwrap(), Some(Value::Int64(5)));
        assert_eq!(a.result(1).unwrap(), Some(Value::Int64(1)));
        assert!(matches!(b.result(0).unwrap_err(), AggError::Uninitialized(0)));
    }

    #[test]
    fn test_comb_signature_mismatch() {
        let mut a = StateRegistry::new(vec![AggSignature::count()]);
        a.init(0, &[]).unwrap();
        let mut b = StateRegistry::new(vec![AggSignature::sum(ValueType::Int64).unwrap()]);
        b.init(0, &[]).unwrap();
        let err = a.comb(0, &mut b).unwrap_err();
        assert!(matches!(err, AggError::SignatureMismatch(_)));
    }

    #[test]
    fn test_serialize_requires_initialized_slots() {
        let registry = StateRegistry::new(vec![AggSignature::count()]);
        assert!(matches!(
            registry.serialize().unwrap_err(),
            AggError::Uninitialized(0)
        ));
    }

    #[test]
    fn test_deserialize_rejects_trailing_bytes() {
        let registry = sum_count_registry();
        let mut bytes = registry.serialize().unwrap();
        bytes.push(0);
        let sigs = vec![AggSignature::sum(ValueType::Int64).unwrap(), AggSignature::count()];
        assert!(matches!(
            StateRegistry::deserialize(sigs, &bytes).unwrap_err(),
            AggError::Codec(_)
        ));
    }

    #[test]
    fn test_deserialize_rejects_wrong_version() {
        let registry = sum_count_registry();
        let mut bytes = registry.serialize().unwrap();
        bytes[0] = 99;
        let sigs = vec![AggSignature::sum(ValueType::Int64).unwrap(), AggSignature::count()];
        assert!(matches!(
            StateRegistry::deserialize(sigs, &bytes).unwrap_err(),
            AggError::Codec(_)
        ));
    }

    #[test]
    fn test_seq_length_on_scalar_slot_is_rejected() {
        let mut registry = sum_count_registry();
        assert!(matches!(
            registry.seq_length(0, 3).unwrap_err(),
            AggError::SignatureMismatch(_)
        ));
    }
}
