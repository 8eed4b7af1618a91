//! The slot-filling engine: decides, for one dialogue turn, whether to ask
//! for the next missing booking field or to close the intent.
//!
//! Elicitation order is a pure function of the static schema; for the same
//! intent and slot values the engine always produces the same response.

use tracing::{info, warn};

use crate::dispatch::{FulfillmentDispatch, FulfillmentRequest};
use crate::schema::{SlotSchema, SLOT_SCHEMA};
use crate::session::SlotValues;

/// Intent the oracle reports for a plain greeting.
pub const GREETING_INTENT: &str = "GreetingIntent";
/// Intent carrying the booking slots.
pub const DINING_INTENT: &str = "DiningSuggestionsIntent";

const GREETING_REPLY: &str = "What are you looking for?";
const FALLBACK_REPLY: &str = "Sorry, I can only handle dining suggestions right now.";

/// Terminal state reported to the oracle on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FulfillmentState {
    Fulfilled,
    Failed,
}

impl FulfillmentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FulfillmentState::Fulfilled => "Fulfilled",
            FulfillmentState::Failed => "Failed",
        }
    }
}

/// Exactly one of these is produced per turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogueResponse {
    /// Ask the user for a missing slot.
    ElicitSlot { slot_name: String, prompt: String },
    /// End the conversation.
    Close {
        state: FulfillmentState,
        message: String,
    },
}

/// The decision core. The dispatcher is injected so the queue can be faked
/// in tests; the schema is the process-wide static one.
pub struct SlotFillingEngine<'a> {
    schema: &'static SlotSchema,
    dispatcher: &'a dyn FulfillmentDispatch,
}

impl<'a> SlotFillingEngine<'a> {
    pub fn new(dispatcher: &'a dyn FulfillmentDispatch) -> Self {
        Self {
            schema: &SLOT_SCHEMA,
            dispatcher,
        }
    }

    /// Decide the next dialogue action for this turn.
    ///
    /// Greeting closes immediately. For the dining intent, the first slot in
    /// schema order without a value is elicited; when all are filled, the
    /// fulfillment request is dispatched once and the dialogue closes
    /// Fulfilled whether or not the dispatch succeeded. Anything else gets
    /// the generic fallback close.
    pub async fn decide(&self, intent_name: &str, slots: &SlotValues) -> DialogueResponse {
        if intent_name == GREETING_INTENT {
            return DialogueResponse::Close {
                state: FulfillmentState::Fulfilled,
                message: GREETING_REPLY.to_string(),
            };
        }

        if intent_name != DINING_INTENT {
            info!(intent = %intent_name, "Unrecognized intent, returning fallback close");
            return DialogueResponse::Close {
                state: FulfillmentState::Fulfilled,
                message: FALLBACK_REPLY.to_string(),
            };
        }

        for slot in self.schema.slots() {
            if slots.get(slot.name).is_none() {
                return DialogueResponse::ElicitSlot {
                    slot_name: slot.name.to_string(),
                    prompt: self.schema.render_prompt(slot.prompt, slots),
                };
            }
        }

        // All slots filled; the loop above guards the construction.
        let Some(request) = FulfillmentRequest::from_slots(slots) else {
            return DialogueResponse::Close {
                state: FulfillmentState::Fulfilled,
                message: FALLBACK_REPLY.to_string(),
            };
        };

        let cuisine = request.cuisine.clone();
        if let Err(e) = self.dispatcher.dispatch(&request).await {
            warn!(error = %e, "Fulfillment dispatch failed; closing the dialogue anyway");
        } else {
            info!(cuisine = %cuisine, "Fulfillment request enqueued");
        }

        DialogueResponse::Close {
            state: FulfillmentState::Fulfilled,
            message: format!(
                "You're all set. Expect my {} restaurant suggestions shortly! Have a good day.",
                cuisine
            ),
        }
    }
}
