//! Core data models for pitchside
//!
//! This module contains the records returned by API-Football (leagues, teams,
//! fixtures) and the response envelope every endpoint wraps them in.

pub mod fixture;
pub mod league;
pub mod team;

pub use fixture::{Fixture, FixtureInfo, Goals, Score, ScoreDetail, Status, Teams};
pub use league::{Country, League, LeagueInfo};
pub use team::{Team, TeamInfo, Venue};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Envelope shared by every API-Football endpoint
///
/// `errors` arrives as an array, an object of field to message, a bare string,
/// or is missing; it is normalised to a list of messages on decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// The endpoint that produced this response
    #[serde(rename = "get", default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(default, deserialize_with = "deserialize_errors")]
    pub errors: Option<Vec<String>>,
    #[serde(default)]
    pub results: Option<u32>,
    #[serde(default)]
    pub paging: Option<Paging>,
    /// A missing field decodes as `None`
    pub response: Option<Vec<T>>,
}

/// Pagination cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    #[serde(default)]
    pub current: Option<u32>,
    #[serde(default)]
    pub total: Option<u32>,
}

pub type LeagueResponse = ApiResponse<League>;
pub type TeamResponse = ApiResponse<Team>;
pub type FixtureResponse = ApiResponse<Fixture>;

fn deserialize_errors<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_errors(&value))
}

/// Normalises the polymorphic `errors` field into a list of messages
///
/// - array: each scalar element as text; empty gives `None`
/// - object: `"key: value"` per entry; empty gives `None`
/// - string: a single message
/// - anything else: `None`
pub fn parse_errors(value: &Value) -> Option<Vec<String>> {
    let messages: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::Object(fields) => object_messages(fields),
        Value::String(message) => vec![message.clone()],
        _ => return None,
    };

    if messages.is_empty() {
        None
    } else {
        Some(messages)
    }
}

fn object_messages(fields: &Map<String, Value>) -> Vec<String> {
    fields
        .iter()
        .map(|(key, value)| match scalar_text(value) {
            Some(text) => format!("{}: {}", key, text),
            None => format!("{}: {}", key, value),
        })
        .collect()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_errors_array() {
        let errors = parse_errors(&json!(["first", "second"]));
        assert_eq!(errors, Some(vec!["first".to_string(), "second".to_string()]));
    }

    #[test]
    fn test_parse_errors_array_skips_nested_values() {
        let errors = parse_errors(&json!(["kept", {"dropped": true}, 3]));
        assert_eq!(errors, Some(vec!["kept".to_string(), "3".to_string()]));
    }

    #[test]
    fn test_parse_errors_empty_shapes_are_none() {
        assert_eq!(parse_errors(&json!([])), None);
        assert_eq!(parse_errors(&json!({})), None);
        assert_eq!(parse_errors(&Value::Null), None);
        assert_eq!(parse_errors(&json!(42)), None);
    }

    #[test]
    fn test_parse_errors_object() {
        let errors = parse_errors(&json!({
            "token": "Error/Missing application key.",
            "details": {"code": 1}
        }))
        .expect("Object errors should produce messages");

        assert!(errors.contains(&"token: Error/Missing application key.".to_string()));
        assert!(errors.contains(&r#"details: {"code":1}"#.to_string()));
    }

    #[test]
    fn test_parse_errors_bare_string() {
        assert_eq!(
            parse_errors(&json!("rate limited")),
            Some(vec!["rate limited".to_string()])
        );
    }

    #[test]
    fn test_envelope_with_array_errors() {
        let body = r#"{"get": "leagues", "parameters": {"search": "x"}, "errors": [],
                       "results": 1, "paging": {"current": 1, "total": 1},
                       "response": [{"league": {"id": 39, "name": "Premier League"}}]}"#;

        let response: LeagueResponse = serde_json::from_str(body).expect("Failed to parse");

        assert!(response.errors.is_none());
        assert_eq!(response.endpoint.as_deref(), Some("leagues"));
        assert_eq!(response.response.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_envelope_with_object_errors() {
        let body = r#"{"get": "teams", "errors": {"plan": "Free plans do not have access to this season."},
                       "results": 0, "response": []}"#;

        let response: TeamResponse = serde_json::from_str(body).expect("Failed to parse");

        assert_eq!(
            response.errors.unwrap(),
            vec!["plan: Free plans do not have access to this season.".to_string()]
        );
    }

    #[test]
    fn test_envelope_without_errors_or_response() {
        let response: FixtureResponse = serde_json::from_str("{}").expect("Failed to parse");

        assert!(response.errors.is_none());
        assert!(response.response.is_none());
    }

    #[test]
    fn test_envelope_with_null_errors() {
        let response: FixtureResponse =
            serde_json::from_str(r#"{"errors": null, "response": []}"#).expect("Failed to parse");

        assert!(response.errors.is_none());
        assert_eq!(response.response, Some(vec![]));
    }

    #[test]
    fn test_team_envelope_without_response_field() {
        let body = r#"{"get": "teams", "errors": [], "results": 0, "paging": {"current": 1, "total": 1}}"#;

        let response: TeamResponse = serde_json::from_str(body).expect("Failed to parse");

        assert!(response.errors.is_none());
        assert_eq!(response.results, Some(0));
        assert!(response.response.is_none());
    }
}
