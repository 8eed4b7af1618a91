//! Suggestion Worker Lambda - Emails restaurant picks for queued requests.
//!
//! This Lambda runs on a schedule and:
//! 1. Drains a batch of fulfillment requests from SQS
//! 2. Scans the restaurant table and samples matches for the cuisine
//! 3. Composes and sends the suggestion email via SES
//! 4. Deletes each queue message once its email went out
//!
//! Everything here is best-effort: a failed send leaves the message on the
//! queue for a later run, and a bad message is dropped rather than poisoning
//! the batch.

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use shared::config::WorkerConfig;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const MAX_MESSAGES_PER_RUN: i32 = 5;
const SUGGESTION_COUNT: usize = 3;

/// Fulfillment request as it sits on the queue. Unknown or missing fields
/// degrade to friendly defaults instead of failing the batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueuedRequest {
    #[serde(default = "default_cuisine")]
    cuisine: String,
    #[serde(default = "default_location")]
    location: String,
    /// Optional contact address; absent on requests collected by the
    /// dialogue, present when an upstream caller supplies one.
    #[serde(default)]
    email: Option<String>,
}

fn default_cuisine() -> String {
    "food".to_string()
}

fn default_location() -> String {
    "your area".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Restaurant {
    name: String,
    address: String,
    phone: String,
    rating: String,
    cuisine: String,
}

#[derive(Debug, Serialize)]
struct WorkerResponse {
    processed: u32,
    deleted: u32,
    errors: u32,
}

struct AppState {
    sqs_client: aws_sdk_sqs::Client,
    ddb_client: aws_sdk_dynamodb::Client,
    ses_client: aws_sdk_ses::Client,
    config: WorkerConfig,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = WorkerConfig::from_env()
            .map_err(|e| format!("Worker configuration incomplete: {}", e))?;
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        Ok(Self {
            sqs_client: aws_sdk_sqs::Client::new(&aws_config),
            ddb_client: aws_sdk_dynamodb::Client::new(&aws_config),
            ses_client: aws_sdk_ses::Client::new(&aws_config),
            config,
        })
    }
}

fn attr_string(item: &HashMap<String, AttributeValue>, key: &str) -> Option<String> {
    let value = item.get(key)?;
    value
        .as_s()
        .ok()
        .cloned()
        .or_else(|| value.as_n().ok().cloned())
}

fn restaurant_from_item(item: &HashMap<String, AttributeValue>) -> Restaurant {
    Restaurant {
        name: attr_string(item, "name").unwrap_or_else(|| "Unknown".to_string()),
        address: attr_string(item, "address").unwrap_or_else(|| "No address".to_string()),
        phone: attr_string(item, "phone").unwrap_or_else(|| "N/A".to_string()),
        rating: attr_string(item, "rating").unwrap_or_else(|| "N/A".to_string()),
        cuisine: attr_string(item, "cuisine").unwrap_or_default(),
    }
}

/// Sample up to `limit` restaurants matching the cuisine
/// (case-insensitive substring); when nothing matches, fall back to an
/// unfiltered random sample.
fn pick_suggestions(
    mut items: Vec<Restaurant>,
    cuisine: &str,
    limit: usize,
    rng: &mut impl Rng,
) -> Vec<Restaurant> {
    let needle = cuisine.to_lowercase();
    let mut matches: Vec<Restaurant> = items
        .iter()
        .filter(|r| !r.cuisine.is_empty() && r.cuisine.to_lowercase().contains(&needle))
        .cloned()
        .collect();

    if matches.is_empty() {
        items.shuffle(rng);
        items.truncate(limit);
        return items;
    }

    matches.shuffle(rng);
    matches.truncate(limit);
    matches
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn compose_email_html(restaurants: &[Restaurant], cuisine: &str, location: &str) -> String {
    let mut html = format!(
        "<h3>{} {} suggestions in {}</h3><ul>",
        restaurants.len(),
        title_case(cuisine),
        title_case(location)
    );
    for r in restaurants {
        html.push_str(&format!(
            "<li><b>{}</b><br/>{}<br/>Phone: {} | Rating: {}</li><br/>",
            r.name, r.address, r.phone, r.rating
        ));
    }
    html.push_str("</ul><p>Enjoy your meal!</p>");
    html
}

async fn scan_restaurants(state: &AppState) -> Result<Vec<Restaurant>, Error> {
    let response = state
        .ddb_client
        .scan()
        .table_name(&state.config.table_name)
        .projection_expression("restaurantID, #nm, address, phone, rating, cuisine")
        .expression_attribute_names("#nm", "name")
        .send()
        .await
        .map_err(|e| format!("Failed to scan restaurant table: {}", e))?;

    Ok(response.items().iter().map(restaurant_from_item).collect())
}

async fn send_email(
    state: &AppState,
    recipient: &str,
    subject: &str,
    html_body: &str,
) -> Result<(), Error> {
    let subject = Content::builder()
        .data(subject)
        .charset("UTF-8")
        .build()
        .map_err(|e| format!("Failed to build subject: {}", e))?;

    let html_content = Content::builder()
        .data(html_body)
        .charset("UTF-8")
        .build()
        .map_err(|e| format!("Failed to build body: {}", e))?;

    let body_content = Body::builder().html(html_content).build();

    let message = Message::builder().subject(subject).body(body_content).build();

    let destination = Destination::builder().to_addresses(recipient).build();

    state
        .ses_client
        .send_email()
        .source(&state.config.sender)
        .destination(destination)
        .message(message)
        .send()
        .await
        .map_err(|e| format!("Failed to send email: {}", e))?;

    Ok(())
}

async fn delete_message(state: &AppState, receipt_handle: &str) {
    let result = state
        .sqs_client
        .delete_message()
        .queue_url(&state.config.queue_url)
        .receipt_handle(receipt_handle)
        .send()
        .await;
    if let Err(e) = result {
        error!(error = %e, "Failed to delete queue message");
    }
}

async fn handler(
    state: Arc<AppState>,
    _event: LambdaEvent<serde_json::Value>,
) -> Result<WorkerResponse, Error> {
    info!("Draining fulfillment queue");

    let received = state
        .sqs_client
        .receive_message()
        .queue_url(&state.config.queue_url)
        .max_number_of_messages(MAX_MESSAGES_PER_RUN)
        .wait_time_seconds(0)
        .send()
        .await
        .map_err(|e| format!("Failed to receive queue messages: {}", e))?;

    let messages = received.messages();
    if messages.is_empty() {
        info!("No messages to process");
        return Ok(WorkerResponse {
            processed: 0,
            deleted: 0,
            errors: 0,
        });
    }

    let mut processed = 0u32;
    let mut deleted = 0u32;
    let mut errors = 0u32;

    for message in messages {
        processed += 1;

        let receipt_handle = match message.receipt_handle() {
            Some(handle) => handle,
            None => {
                error!("Queue message without receipt handle");
                errors += 1;
                continue;
            }
        };

        let request: QueuedRequest =
            match serde_json::from_str(message.body().unwrap_or_default()) {
                Ok(r) => r,
                Err(e) => {
                    // Malformed bodies can never succeed; drop them.
                    error!(error = %e, "Unparsable fulfillment request, dropping");
                    delete_message(&state, receipt_handle).await;
                    errors += 1;
                    continue;
                }
            };

        let recipient = match request
            .email
            .as_deref()
            .or(state.config.default_recipient.as_deref())
        {
            Some(r) => r.to_string(),
            None => {
                warn!(
                    cuisine = %request.cuisine,
                    "No recipient for request and DEFAULT_RECIPIENT unset, dropping"
                );
                delete_message(&state, receipt_handle).await;
                errors += 1;
                continue;
            }
        };

        let restaurants = match scan_restaurants(&state).await {
            Ok(items) => {
                pick_suggestions(items, &request.cuisine, SUGGESTION_COUNT, &mut rand::thread_rng())
            }
            Err(e) => {
                error!(error = %e, "Restaurant lookup failed");
                errors += 1;
                continue;
            }
        };

        let html = compose_email_html(&restaurants, &request.cuisine, &request.location);
        let subject = format!(
            "{} Picks for {}",
            title_case(&request.cuisine),
            title_case(&request.location)
        );

        match send_email(&state, &recipient, &subject, &html).await {
            Ok(()) => {
                info!(
                    cuisine = %request.cuisine,
                    suggestions = restaurants.len(),
                    "Suggestion email sent"
                );
                delete_message(&state, receipt_handle).await;
                deleted += 1;
            }
            Err(e) => {
                // Left on the queue for the next run.
                error!(error = %e, "Failed to send suggestion email");
                errors += 1;
            }
        }
    }

    let response = WorkerResponse {
        processed,
        deleted,
        errors,
    };
    info!(
        processed = response.processed,
        deleted = response.deleted,
        errors = response.errors,
        "Suggestion worker complete"
    );
    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);
    let state_clone = state.clone();

    run(service_fn(move |event| {
        let state = state_clone.clone();
        async move { handler(state, event).await }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn restaurant(name: &str, cuisine: &str) -> Restaurant {
        Restaurant {
            name: name.to_string(),
            address: format!("{} Main St", name.len()),
            phone: "5550000000".to_string(),
            rating: "4.2".to_string(),
            cuisine: cuisine.to_string(),
        }
    }

    #[test]
    fn test_pick_suggestions_filters_by_cuisine() {
        let items = vec![
            restaurant("Trattoria", "Italian"),
            restaurant("Sushi Bar", "Japanese"),
            restaurant("Pasta Place", "italian fusion"),
        ];
        let mut rng = StdRng::seed_from_u64(7);

        let picks = pick_suggestions(items, "Italian", 3, &mut rng);
        assert_eq!(picks.len(), 2);
        assert!(picks
            .iter()
            .all(|r| r.cuisine.to_lowercase().contains("italian")));
    }

    #[test]
    fn test_pick_suggestions_falls_back_to_random_sample() {
        let items = vec![
            restaurant("Trattoria", "Italian"),
            restaurant("Sushi Bar", "Japanese"),
            restaurant("Taqueria", "Mexican"),
            restaurant("Bistro", "French"),
        ];
        let mut rng = StdRng::seed_from_u64(7);

        let picks = pick_suggestions(items, "Ethiopian", 3, &mut rng);
        assert_eq!(picks.len(), 3);
    }

    #[test]
    fn test_pick_suggestions_respects_limit() {
        let items: Vec<Restaurant> = (0..10)
            .map(|i| restaurant(&format!("Place {}", i), "Thai"))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);

        let picks = pick_suggestions(items, "Thai", 3, &mut rng);
        assert_eq!(picks.len(), 3);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("italian"), "Italian");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_compose_email_html_lists_each_restaurant() {
        let restaurants = vec![
            restaurant("Trattoria", "Italian"),
            restaurant("Pasta Place", "Italian"),
        ];
        let html = compose_email_html(&restaurants, "italian", "new york");

        assert!(html.contains("<h3>2 Italian suggestions in New York</h3>"));
        assert!(html.contains("<b>Trattoria</b>"));
        assert!(html.contains("<b>Pasta Place</b>"));
        assert!(html.contains("Enjoy your meal!"));
    }

    #[test]
    fn test_queued_request_defaults() {
        let request: QueuedRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.cuisine, "food");
        assert_eq!(request.location, "your area");
        assert_eq!(request.email, None);

        let request: QueuedRequest = serde_json::from_str(
            r#"{"location":"NYC","cuisine":"Thai","partySize":"2","date":"tomorrow",
                "time":"19:00","phoneNumber":"5551234567"}"#,
        )
        .unwrap();
        assert_eq!(request.cuisine, "Thai");
        assert_eq!(request.location, "NYC");
    }
}
