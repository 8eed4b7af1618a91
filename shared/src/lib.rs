//! Shared library for Dining Concierge Lambda functions.
//!
//! This crate provides the slot schema, dialogue engine, session adapter and
//! fulfillment dispatcher used across all Lambda functions.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod lex;
pub mod schema;
pub mod session;

pub use dispatch::{FulfillmentDispatch, FulfillmentRequest, SqsDispatcher};
pub use engine::{DialogueResponse, FulfillmentState, SlotFillingEngine};
pub use error::{Error, Result};
pub use schema::{SlotDef, SlotSchema, SLOT_SCHEMA};
pub use session::SlotValues;
