use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use skydesk_core::domain::flight::FlightId;

/// Exactly one of these is produced per turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AgentResponse {
    Text { text: String },
    FindFlights { text: String, available_flight_ids: Vec<FlightId> },
    BookFlight { text: String, booked_flight_id: Option<FlightId> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseKind {
    Text,
    FindFlights,
    BookFlight,
}

impl AgentResponse {
    pub fn text(&self) -> &str {
        match self {
            Self::Text { text } | Self::FindFlights { text, .. } | Self::BookFlight { text, .. } => {
                text
            }
        }
    }

    pub fn kind(&self) -> ResponseKind {
        match self {
            Self::Text { .. } => ResponseKind::Text,
            Self::FindFlights { .. } => ResponseKind::FindFlights,
            Self::BookFlight { .. } => ResponseKind::BookFlight,
        }
    }

    /// Collapses the response to the single value a chat front end shows:
    /// search results as their id list, a booking as its id, otherwise the text.
    pub fn display(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::FindFlights { available_flight_ids, .. } => {
                let ids = available_flight_ids.iter().map(|id| id.0).collect::<Vec<_>>();
                format!("{ids:?}")
            }
            Self::BookFlight { booked_flight_id: Some(flight_id), .. } => flight_id.to_string(),
            Self::BookFlight { text, booked_flight_id: None } => text.clone(),
        }
    }
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::FindFlights => "find-flights",
            Self::BookFlight => "book-flight",
        }
    }

    /// Name used in evaluation error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text => "TextResponse",
            Self::FindFlights => "FindFlightsResponse",
            Self::BookFlight => "BookFlightResponse",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "text" => Ok(Self::Text),
            "find-flights" => Ok(Self::FindFlights),
            "book-flight" => Ok(Self::BookFlight),
            other => Err(other.to_string()),
        }
    }
}
