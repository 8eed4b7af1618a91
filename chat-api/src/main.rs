//! Chat API Lambda - HTTP front end for the dining concierge.
//!
//! Relays an inbound chat message to the Lex bot and reshapes the bot's
//! reply into the front-end message envelope. When Lex elicits a slot
//! without attaching a prompt of its own, the slot schema supplies one.

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use serde::{Deserialize, Serialize};
use shared::config::RelayConfig;
use shared::SLOT_SCHEMA;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_SESSION_ID: &str = "user-session";
const RETRY_PROMPT: &str = "Sorry, I didn't get that. Could you say it again?";
const ORACLE_DOWN_MESSAGE: &str =
    "Sorry, I'm having trouble reaching the concierge right now.";

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: Option<String>,
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatEnvelope {
    messages: Vec<FrontendMessage>,
}

#[derive(Debug, Serialize)]
struct FrontendMessage {
    r#type: String,
    unstructured: Unstructured,
}

#[derive(Debug, Serialize)]
struct Unstructured {
    text: String,
}

impl FrontendMessage {
    fn unstructured(text: impl Into<String>) -> Self {
        Self {
            r#type: "unstructured".to_string(),
            unstructured: Unstructured { text: text.into() },
        }
    }
}

struct AppState {
    lex_client: aws_sdk_lexruntimev2::Client,
    config: RelayConfig,
}

/// Pull the user message and session id out of the request: query string
/// first, then the JSON body. Missing session ids get a shared default.
fn extract_message(event: &Request) -> (Option<String>, String) {
    let query = event.query_string_parameters();
    if let Some(message) = query.first("message").filter(|m| !m.trim().is_empty()) {
        let session_id = query
            .first("sessionId")
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SESSION_ID)
            .to_string();
        return (Some(message.trim().to_string()), session_id);
    }

    // Unparsable bodies degrade to "no message", not to an error.
    let parsed: Option<ChatRequest> = serde_json::from_slice(event.body().as_ref()).ok();
    if let Some(request) = parsed {
        let session_id = request
            .session_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());
        let message = request
            .message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());
        return (message, session_id);
    }

    (None, DEFAULT_SESSION_ID.to_string())
}

/// Shape the oracle's reply for the front end. Bot messages pass through;
/// a message-less slot elicitation falls back to the schema prompt; an
/// empty reply becomes a retry prompt.
fn build_frontend_messages(
    bot_messages: Vec<String>,
    slot_to_elicit: Option<&str>,
) -> Vec<FrontendMessage> {
    let mut out: Vec<FrontendMessage> = bot_messages
        .into_iter()
        .filter(|content| !content.is_empty())
        .map(FrontendMessage::unstructured)
        .collect();

    if out.is_empty() {
        let text = match slot_to_elicit {
            Some(slot) => SLOT_SCHEMA
                .fallback_prompt(slot)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Please provide {}.", slot)),
            None => RETRY_PROMPT.to_string(),
        };
        out.push(FrontendMessage::unstructured(text));
    }

    out
}

fn respond<T: Serialize>(status: u16, payload: &T) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .header("access-control-allow-origin", "*")
        .body(Body::from(serde_json::to_string(payload)?))
        .map_err(Box::new)?)
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let (message, session_id) = extract_message(&event);

    let Some(message) = message else {
        return respond(400, &serde_json::json!({ "error": "No message provided" }));
    };

    info!(session_id = %session_id, "Relaying message to Lex");

    let lex_response = state
        .lex_client
        .recognize_text()
        .bot_id(&state.config.bot_id)
        .bot_alias_id(&state.config.bot_alias_id)
        .locale_id(&state.config.locale_id)
        .session_id(&session_id)
        .text(&message)
        .send()
        .await;

    let envelope = match lex_response {
        Ok(reply) => {
            let bot_messages: Vec<String> = reply
                .messages()
                .iter()
                .filter_map(|m| m.content().map(str::to_string))
                .collect();
            let slot_to_elicit = reply
                .session_state()
                .and_then(|s| s.dialog_action())
                .and_then(|d| d.slot_to_elicit());

            ChatEnvelope {
                messages: build_frontend_messages(bot_messages, slot_to_elicit),
            }
        }
        Err(e) => {
            error!(session_id = %session_id, error = %e, "Lex recognize_text failed");
            ChatEnvelope {
                messages: vec![FrontendMessage::unstructured(ORACLE_DOWN_MESSAGE)],
            }
        }
    };

    respond(200, &envelope)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = RelayConfig::from_env()
        .map_err(|e| format!("Relay configuration incomplete: {}", e))?;
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let state = Arc::new(AppState {
        lex_client: aws_sdk_lexruntimev2::Client::new(&aws_config),
        config,
    });
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}
