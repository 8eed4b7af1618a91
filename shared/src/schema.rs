//! The slot schema: the ordered list of booking fields the dialogue collects.
//!
//! Order is significant; it defines elicitation priority. The schema is the
//! single source of truth for prompts, read by both the dialogue engine and
//! the chat-api relay.

use crate::session::SlotValues;

pub const SLOT_LOCATION: &str = "location";
pub const SLOT_CUISINE: &str = "cuisine";
pub const SLOT_PARTY_SIZE: &str = "partySize";
pub const SLOT_DATE: &str = "date";
pub const SLOT_TIME: &str = "time";
pub const SLOT_PHONE_NUMBER: &str = "phoneNumber";

/// One required booking slot.
#[derive(Debug, Clone, Copy)]
pub struct SlotDef {
    /// Slot name as the NLU oracle reports it
    pub name: &'static str,
    /// Elicitation prompt used by the dialogue engine; may reference
    /// already-filled slots as `{slotName}` placeholders
    pub prompt: &'static str,
    /// Plain prompt the relay uses when the oracle elicits this slot
    /// without attaching a message of its own
    pub fallback_prompt: &'static str,
}

/// Ordered, immutable set of required slots.
#[derive(Debug)]
pub struct SlotSchema {
    slots: &'static [SlotDef],
}

/// The booking schema, fixed at process start.
pub static SLOT_SCHEMA: SlotSchema = SlotSchema {
    slots: &[
        SlotDef {
            name: SLOT_LOCATION,
            prompt: "What city or city area are you looking to dine in?",
            fallback_prompt: "What city or city area are you looking to dine in?",
        },
        SlotDef {
            name: SLOT_CUISINE,
            prompt: "Got it, {location}. What cuisine would you like to try?",
            fallback_prompt: "What cuisine would you like to try?",
        },
        SlotDef {
            name: SLOT_PARTY_SIZE,
            prompt: "Ok, how many people are in your party?",
            fallback_prompt: "How many people are in your party?",
        },
        SlotDef {
            name: SLOT_DATE,
            prompt: "A few more to go. What date?",
            fallback_prompt: "What date?",
        },
        SlotDef {
            name: SLOT_TIME,
            prompt: "What time?",
            fallback_prompt: "What time?",
        },
        SlotDef {
            name: SLOT_PHONE_NUMBER,
            prompt: "Lastly, I need your phone number so I can send you my findings.",
            fallback_prompt: "Lastly, I need your phone number so I can send you the findings.",
        },
    ],
};

impl SlotSchema {
    /// Slots in declared elicitation order.
    pub fn slots(&self) -> impl Iterator<Item = &SlotDef> {
        self.slots.iter()
    }

    /// Look up a slot by name.
    pub fn get(&self, name: &str) -> Option<&SlotDef> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Relay fallback prompt for a slot the oracle wants elicited.
    pub fn fallback_prompt(&self, name: &str) -> Option<&'static str> {
        self.get(name).map(|s| s.fallback_prompt)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Render a prompt template, substituting `{name}` placeholders with
    /// filled slot values. Unfilled references are left untouched; the
    /// elicitation order guarantees a template only ever references slots
    /// filled before it.
    pub fn render_prompt(&self, template: &str, values: &SlotValues) -> String {
        let mut rendered = template.to_string();
        for slot in self.slots {
            if let Some(value) = values.get(slot.name) {
                rendered = rendered.replace(&format!("{{{}}}", slot.name), value);
            }
        }
        rendered
    }
}
