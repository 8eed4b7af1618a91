//! Dialogue Hook Lambda - Lex V2 code hook for the dining dialogue.
//!
//! Each invocation is one dialogue turn:
//! 1. Flatten the oracle's slot payload for the booking schema
//! 2. Ask the engine for the next action
//! 3. Reply with an ElicitSlot or Close envelope
//!
//! When every slot is filled the engine enqueues the fulfillment request to
//! SQS; the suggestion worker picks it up from there.

use async_trait::async_trait;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::config::HookConfig;
use shared::lex::{self, CodeHookEvent, LexResponse};
use shared::{
    DialogueResponse, FulfillmentDispatch, FulfillmentRequest, SlotFillingEngine, SlotValues,
    SqsDispatcher, SLOT_SCHEMA,
};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Stand-in dispatcher for a misconfigured deployment. Every attempt fails,
/// which the engine logs and absorbs, so the dialogue still closes cleanly.
struct UnconfiguredDispatcher;

#[async_trait]
impl FulfillmentDispatch for UnconfiguredDispatcher {
    async fn dispatch(&self, _request: &FulfillmentRequest) -> shared::Result<()> {
        Err(shared::Error::Config(
            "QUEUE_URL not set; fulfillment request dropped".to_string(),
        ))
    }
}

struct AppState {
    dispatcher: Box<dyn FulfillmentDispatch>,
}

impl AppState {
    async fn new() -> Self {
        let config = HookConfig::from_env();
        let dispatcher: Box<dyn FulfillmentDispatch> = match config.queue_url {
            Some(queue_url) => {
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let sqs_client = aws_sdk_sqs::Client::new(&aws_config);
                Box::new(SqsDispatcher::new(sqs_client, queue_url))
            }
            None => {
                warn!("QUEUE_URL missing; fulfillment requests will not be enqueued");
                Box::new(UnconfiguredDispatcher)
            }
        };
        Self { dispatcher }
    }
}

async fn handler(
    state: Arc<AppState>,
    event: LambdaEvent<CodeHookEvent>,
) -> Result<LexResponse, Error> {
    let intent = &event.payload.session_state.intent;
    info!(intent = %intent.name, "Processing dialogue turn");

    let slots = SlotValues::from_intent(intent, &SLOT_SCHEMA);
    let engine = SlotFillingEngine::new(state.dispatcher.as_ref());

    let response = match engine.decide(&intent.name, &slots).await {
        DialogueResponse::ElicitSlot { slot_name, prompt } => {
            info!(slot = %slot_name, "Eliciting next slot");
            lex::elicit_slot(intent, &slot_name, &prompt)
        }
        DialogueResponse::Close {
            state: fulfillment_state,
            message,
        } => {
            info!(state = fulfillment_state.as_str(), "Closing dialogue");
            lex::close(&intent.name, fulfillment_state, &message)
        }
    };

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
