#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use skydesk_agent::{AgentRuntime, ScriptedLlmClient};
use skydesk_core::{FlightCatalog, FlightId, FlightRecord};

pub fn flight(id: i64, origin: &str, destination: &str, date: &str, seats: u32) -> FlightRecord {
    FlightRecord {
        id: FlightId(id),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("fixture date"),
        airline: "United".to_string(),
        flight_number: format!("UA {id}"),
        origin: origin.to_string(),
        destination: destination.to_string(),
        departure_time: NaiveTime::from_hms_opt(8, 0, 0).expect("fixture time"),
        arrival_time: NaiveTime::from_hms_opt(16, 30, 0).expect("fixture time"),
        available_seats: seats,
    }
}

pub fn catalog() -> FlightCatalog {
    FlightCatalog::new(vec![
        flight(7, "LAX", "JFK", "2023-05-01", 1),
        flight(8, "JFK", "LAX", "2023-05-01", 5),
        flight(9, "JFK", "BOS", "2023-05-01", 2),
        flight(10, "JFK", "SFO", "2023-05-02", 4),
        flight(11, "BOS", "ORD", "2023-05-01", 3),
    ])
}

pub fn runtime(replies: &[&str]) -> AgentRuntime<ScriptedLlmClient> {
    AgentRuntime::new(ScriptedLlmClient::new(replies.iter().copied()), catalog())
}

pub fn seats(runtime: &AgentRuntime<ScriptedLlmClient>, id: i64) -> Option<u32> {
    runtime.catalog().find(FlightId(id)).map(|flight| flight.available_seats)
}

pub const FIND_LAX_JFK: &str =
    r#"{"action": "find-flights", "origin": "Los Angeles (LAX)", "destination": "New York (JFK)", "date": "2023-05-01"}"#;
pub const FIND_FROM_JFK: &str =
    r#"{"action": "find-flights", "origin": "New York (JFK)", "destination": "Any", "date": "2023-05-01"}"#;
pub const FIND_NOTHING: &str =
    r#"{"action": "find-flights", "origin": "SEA", "destination": "MIA", "date": "2023-05-01"}"#;
pub const BOOK_7: &str = r#"{"action": "book-flight", "flight_id": 7}"#;
pub const BOOK_9: &str = r#"{"action": "book-flight", "flight_id": 9}"#;
pub const BOOK_11: &str = r#"{"action": "book-flight", "flight_id": 11}"#;
pub const BOOK_NONE: &str = r#"{"action": "book-flight", "flight_id": null}"#;
