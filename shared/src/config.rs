//! Configuration management for Lambda functions.

use std::env;

/// Configuration for the chat-api relay (LF0).
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Lex bot id
    pub bot_id: String,
    /// Lex bot alias id
    pub bot_alias_id: String,
    /// Lex locale id
    pub locale_id: String,
}

impl RelayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            bot_id: env::var("BOT_ID")?,
            bot_alias_id: env::var("BOT_ALIAS_ID")?,
            locale_id: env::var("LOCALE_ID").unwrap_or_else(|_| "en_US".to_string()),
        })
    }
}

/// Configuration for the dialogue-hook Lambda (LF1).
#[derive(Debug, Clone)]
pub struct HookConfig {
    /// Fulfillment queue URL; dispatch is skipped with a warning when unset
    pub queue_url: Option<String>,
}

impl HookConfig {
    pub fn from_env() -> Self {
        Self {
            queue_url: env::var("QUEUE_URL").ok().filter(|u| !u.is_empty()),
        }
    }
}

/// Configuration for the suggestion-worker Lambda (LF2).
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Fulfillment queue URL
    pub queue_url: String,
    /// Restaurant table name
    pub table_name: String,
    /// Verified SES sender address
    pub sender: String,
    /// Recipient used when a queued request carries no email address
    pub default_recipient: Option<String>,
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            queue_url: env::var("QUEUE_URL")?,
            table_name: env::var("RESTAURANT_TABLE")?,
            sender: env::var("SES_SENDER")?,
            default_recipient: env::var("DEFAULT_RECIPIENT").ok().filter(|r| !r.is_empty()),
        })
    }
}
