//! Session adapter: flattens the NLU oracle's nested per-turn slot payload
//! into the plain slot-name -> value view the engine consumes.
//!
//! This is the only module coupled to the oracle's data shape. A slot the
//! oracle has not interpreted yet (absent key, null slot, null value, or an
//! empty interpreted string) is simply missing here; no placeholders are
//! ever substituted.

use std::collections::HashMap;

use crate::lex::{Intent, Slot};
use crate::schema::SlotSchema;

/// Flat view of the schema slots for one dialogue turn.
///
/// Only non-empty values are stored, so `get` returning `None` covers both
/// "never reported" and "reported as empty string".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotValues {
    values: HashMap<String, String>,
}

impl SlotValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a slot value. Empty strings are dropped, keeping the
    /// empty-equals-missing policy in one place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        if !value.is_empty() {
            self.values.insert(name.into(), value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// True when every schema slot has a non-empty value.
    pub fn is_complete(&self, schema: &SlotSchema) -> bool {
        schema.slots().all(|slot| self.get(slot.name).is_some())
    }

    /// Build the flat view from a code-hook intent payload, reading only
    /// the slots the schema knows about.
    pub fn from_intent(intent: &Intent, schema: &SlotSchema) -> Self {
        let mut values = Self::new();
        for slot_def in schema.slots() {
            if let Some(value) = interpreted_value(&intent.slots, slot_def.name) {
                values.set(slot_def.name, value);
            }
        }
        values
    }
}

/// Walk the oracle's `slots[name].value.interpretedValue` nesting, treating
/// any missing level as "not yet interpreted".
fn interpreted_value<'a>(
    slots: &'a HashMap<String, Option<Slot>>,
    name: &str,
) -> Option<&'a str> {
    slots
        .get(name)?
        .as_ref()?
        .value
        .as_ref()?
        .interpreted_value
        .as_deref()
        .filter(|v| !v.is_empty())
}
