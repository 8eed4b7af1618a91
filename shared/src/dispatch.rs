//! Fulfillment dispatch: hands a completed booking request to the durable
//! queue the suggestion worker drains.
//!
//! At-most-one-attempt semantics: a single synchronous enqueue, no internal
//! retry. Callers log failures and carry on; the user-facing dialogue never
//! degrades on a transiently unavailable queue.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::schema::{
    SLOT_CUISINE, SLOT_DATE, SLOT_LOCATION, SLOT_PARTY_SIZE, SLOT_PHONE_NUMBER, SLOT_TIME,
};
use crate::session::SlotValues;

/// A fully-populated booking request, one value per schema slot.
/// Immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    pub location: String,
    pub cuisine: String,
    pub party_size: String,
    pub date: String,
    pub time: String,
    pub phone_number: String,
}

impl FulfillmentRequest {
    /// Build a request from the turn's slot values. Returns `None` unless
    /// every schema slot is filled.
    pub fn from_slots(slots: &SlotValues) -> Option<Self> {
        Some(Self {
            location: slots.get(SLOT_LOCATION)?.to_string(),
            cuisine: slots.get(SLOT_CUISINE)?.to_string(),
            party_size: slots.get(SLOT_PARTY_SIZE)?.to_string(),
            date: slots.get(SLOT_DATE)?.to_string(),
            time: slots.get(SLOT_TIME)?.to_string(),
            phone_number: slots.get(SLOT_PHONE_NUMBER)?.to_string(),
        })
    }
}

/// Delivery seam between the dialogue engine and the external queue.
/// Injected so tests can substitute a fake.
#[async_trait]
pub trait FulfillmentDispatch: Send + Sync {
    /// One enqueue attempt; the implementation must not retry.
    async fn dispatch(&self, request: &FulfillmentRequest) -> Result<()>;
}

/// SQS-backed dispatcher.
pub struct SqsDispatcher {
    client: aws_sdk_sqs::Client,
    queue_url: String,
}

impl SqsDispatcher {
    pub fn new(client: aws_sdk_sqs::Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }
}

#[async_trait]
impl FulfillmentDispatch for SqsDispatcher {
    async fn dispatch(&self, request: &FulfillmentRequest) -> Result<()> {
        let body = serde_json::to_string(request)?;
        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| Error::Aws(format!("Failed to enqueue fulfillment request: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SLOT_SCHEMA;

    fn filled_slots() -> SlotValues {
        let mut slots = SlotValues::new();
        slots.set(SLOT_LOCATION, "NYC");
        slots.set(SLOT_CUISINE, "Italian");
        slots.set(SLOT_PARTY_SIZE, "4");
        slots.set(SLOT_DATE, "2025-06-01");
        slots.set(SLOT_TIME, "19:00");
        slots.set(SLOT_PHONE_NUMBER, "5551234567");
        slots
    }

    #[test]
    fn test_from_slots_requires_every_slot() {
        let slots = filled_slots();
        assert!(slots.is_complete(&SLOT_SCHEMA));
        let request = FulfillmentRequest::from_slots(&slots).unwrap();
        assert_eq!(request.cuisine, "Italian");
        assert_eq!(request.phone_number, "5551234567");

        let mut partial = SlotValues::new();
        partial.set(SLOT_LOCATION, "NYC");
        assert!(FulfillmentRequest::from_slots(&partial).is_none());
    }

    #[test]
    fn test_serializes_with_lex_slot_names() {
        let request = FulfillmentRequest::from_slots(&filled_slots()).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["partySize"], "4");
        assert_eq!(json["phoneNumber"], "5551234567");
        assert_eq!(json["date"], "2025-06-01");
    }
}
