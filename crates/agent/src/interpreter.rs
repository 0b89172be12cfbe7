//! Turns raw model output into a typed [`Intent`].
//!
//! Extraction is lenient: a reply that is not a JSON object, or that wraps one
//! in prose, still yields the first brace-delimited object. Anything that
//! cannot be recovered is [`Intent::None`], which simply means the model
//! answered in prose.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};
use skydesk_core::domain::flight::FlightId;

pub const FIND_FLIGHTS_ACTION: &str = "find-flights";
pub const BOOK_FLIGHT_ACTION: &str = "book-flight";

static EMBEDDED_OBJECT: OnceLock<Regex> = OnceLock::new();

fn embedded_object() -> &'static Regex {
    EMBEDDED_OBJECT
        .get_or_init(|| Regex::new(r"(?s)\{.*?\}").expect("embedded object regex must compile"))
}

/// Strict parse first, then the first lazily matched `{...}` substring.
pub fn extract_json_object(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        return Some(value);
    }

    let candidate = embedded_object().find(text)?;
    serde_json::from_str::<Value>(candidate.as_str()).ok()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedDate {
    Valid(NaiveDate),
    Invalid { raw: String },
}

impl ParsedDate {
    /// ISO-8601 calendar date, `YYYY-MM-DD`.
    pub fn parse(raw: &str) -> Self {
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => Self::Valid(date),
            Err(_) => Self::Invalid { raw: raw.to_string() },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FindFlightsRequest {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookFlightRequest {
    /// `None` when the model sent no id or an explicit `null`.
    pub flight_id: Option<FlightId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// No JSON object could be recovered from the reply.
    None,
    FindFlights(FindFlightsRequest),
    BookFlight(BookFlightRequest),
    /// An object without a known `action`.
    Unrecognized { action: Option<String> },
    /// A known action whose payload failed field checks.
    Malformed { action: &'static str, reason: String },
}

impl Intent {
    pub fn from_reply(text: &str) -> Self {
        extract_json_object(text).as_ref().map_or(Self::None, Self::from_payload)
    }

    pub fn from_payload(payload: &Value) -> Self {
        let Some(object) = payload.as_object() else {
            return Self::Unrecognized { action: None };
        };

        match object.get("action").and_then(Value::as_str) {
            Some(FIND_FLIGHTS_ACTION) => decode_find_flights(object),
            Some(BOOK_FLIGHT_ACTION) => decode_book_flight(object),
            other => Self::Unrecognized { action: other.map(str::to_string) },
        }
    }
}

fn decode_find_flights(object: &Map<String, Value>) -> Intent {
    let malformed =
        |reason: String| Intent::Malformed { action: FIND_FLIGHTS_ACTION, reason };

    let origin = match required_str(object, "origin") {
        Ok(origin) => origin,
        Err(reason) => return malformed(reason),
    };
    let destination = match required_str(object, "destination") {
        Ok(destination) => destination,
        Err(reason) => return malformed(reason),
    };
    let raw_date = match required_str(object, "date") {
        Ok(raw_date) => raw_date,
        Err(reason) => return malformed(reason),
    };

    match ParsedDate::parse(raw_date) {
        ParsedDate::Valid(date) => Intent::FindFlights(FindFlightsRequest {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date,
        }),
        ParsedDate::Invalid { raw } => {
            malformed(format!("`date` is not an ISO calendar date: `{raw}`"))
        }
    }
}

fn decode_book_flight(object: &Map<String, Value>) -> Intent {
    match object.get("flight_id") {
        None | Some(Value::Null) => Intent::BookFlight(BookFlightRequest { flight_id: None }),
        Some(value) => match flight_id_from_value(value) {
            Some(flight_id) => {
                Intent::BookFlight(BookFlightRequest { flight_id: Some(flight_id) })
            }
            None => Intent::Malformed {
                action: BOOK_FLIGHT_ACTION,
                reason: format!("`flight_id` is not an integer: `{value}`"),
            },
        },
    }
}

fn required_str<'a>(object: &'a Map<String, Value>, key: &str) -> Result<&'a str, String> {
    match object.get(key) {
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(other) => Err(format!("`{key}` must be a string, got `{other}`")),
        None => Err(format!("`{key}` is missing")),
    }
}

/// Integers, integral floats within the `i64` range, and integer strings are
/// all accepted.
fn flight_id_from_value(value: &Value) -> Option<FlightId> {
    let id = match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| {
                    float.fract() == 0.0 && *float >= i64::MIN as f64 && *float < i64::MAX as f64
                })
                .map(|float| float as i64)
        }),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    id.map(FlightId)
}
