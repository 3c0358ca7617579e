//! Error normalization
//!
//! Turns transport faults and API error bodies into a single message a user can
//! act on. Everything here is pure and total: any input yields a string.

use crate::api::ApiFault;

/// Where API keys and subscriptions are managed
pub const DASHBOARD_URL: &str = "https://dashboard.api-football.com";

pub const NOT_SUBSCRIBED_MESSAGE: &str =
    "You are not subscribed to this API. Please check your subscription at https://dashboard.api-football.com";

pub const UNAUTHORIZED_MESSAGE: &str =
    "Authentication failed. Your API key may be invalid. Please verify the key passed via --api-key or API_FOOTBALL_KEY";

pub const FORBIDDEN_MESSAGE: &str =
    "Access forbidden. Your API key may be invalid, expired, or doesn't have the required subscription. Please verify your API key at https://dashboard.api-football.com";

pub const NOT_FOUND_MESSAGE: &str = "Resource not found. Please try again.";

pub const RATE_LIMITED_MESSAGE: &str = "Too many requests. Please wait a moment and try again.";

pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again later.";

pub const NO_CONNECTION_MESSAGE: &str =
    "No internet connection. Please check your network settings.";

pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please check your internet connection.";

pub const FORBIDDEN_TEXT_MESSAGE: &str =
    "Access forbidden. Please verify your API key is valid and has an active subscription at https://dashboard.api-football.com";

pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

/// Produces the user-facing message for a fault
pub fn error_message(fault: &ApiFault) -> String {
    match fault {
        ApiFault::Status { code, body } => status_message(*code, body.as_deref()),
        ApiFault::Connectivity(_) => NO_CONNECTION_MESSAGE.to_string(),
        ApiFault::Io(_) => NETWORK_ERROR_MESSAGE.to_string(),
        ApiFault::Decode(text) | ApiFault::Other(text) => plain_message(text),
    }
}

/// Message for a non-success HTTP status, preferring what the API said
pub fn status_message(code: u16, body: Option<&str>) -> String {
    if let Some(api_message) = extract_api_message(body) {
        return api_message;
    }

    let canned = match code {
        401 => UNAUTHORIZED_MESSAGE,
        403 if body.is_some_and(mentions_not_subscribed) => NOT_SUBSCRIBED_MESSAGE,
        403 => FORBIDDEN_MESSAGE,
        404 => NOT_FOUND_MESSAGE,
        429 => RATE_LIMITED_MESSAGE,
        500 | 502 | 503 => SERVER_ERROR_MESSAGE,
        other => {
            return format!(
                "Network error occurred (HTTP {}). Please check your connection and try again.",
                other
            )
        }
    };
    canned.to_string()
}

/// Pulls the `"message"` string out of an error body with a textual scan
///
/// This is deliberately not a JSON parse: bodies from gateways are often not
/// JSON at all. Returns `None` when no non-empty string value follows the first
/// `"message"` token. A message about a missing subscription is replaced by
/// fixed guidance.
pub fn extract_api_message(body: Option<&str>) -> Option<String> {
    let body = body?;
    let token = "\"message\"";
    let after_token = &body[body.find(token)? + token.len()..];

    let after_colon = after_token.trim_start().strip_prefix(':')?;
    let value_start = after_colon.trim_start().strip_prefix('"')?;
    let value_end = value_start.find('"')?;
    let message = value_start[..value_end].trim();

    if message.is_empty() {
        None
    } else if mentions_not_subscribed(message) {
        Some(NOT_SUBSCRIBED_MESSAGE.to_string())
    } else {
        Some(message.to_string())
    }
}

fn plain_message(text: &str) -> String {
    if text.trim().is_empty() {
        UNEXPECTED_ERROR_MESSAGE.to_string()
    } else if text.contains("403") || text.contains("Forbidden") {
        FORBIDDEN_TEXT_MESSAGE.to_string()
    } else {
        text.to_string()
    }
}

fn mentions_not_subscribed(text: &str) -> bool {
    text.to_lowercase().contains("not subscribed")
}
