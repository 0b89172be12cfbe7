use std::collections::BTreeSet;

use skydesk_core::domain::flight::FlightId;

use crate::interpreter::BookFlightRequest;
use crate::prompts::{FLIGHT_NOT_AVAILABLE, INVALID_FLIGHT};

/// What the session knows when a booking is requested.
#[derive(Clone, Copy, Debug)]
pub struct BookingContext<'a> {
    pub last_search_was_empty: bool,
    pub surfaced_flight_ids: &'a BTreeSet<FlightId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingDecision {
    Allow { flight_id: FlightId },
    /// No usable id. The session drops to prose but is not closed.
    Abandon { reason_code: &'static str, user_message: String },
    /// An id the user was never shown. The session is closed.
    Reject { reason_code: &'static str, flight_id: FlightId, user_message: String },
}

/// Booking references are only honored for flights surfaced earlier in the
/// same session, so the model cannot book an id it invented.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingGuard;

impl BookingGuard {
    pub fn evaluate(
        &self,
        request: &BookFlightRequest,
        context: BookingContext<'_>,
    ) -> BookingDecision {
        let flight_id = if context.last_search_was_empty { None } else { request.flight_id };

        match flight_id {
            None => BookingDecision::Abandon {
                reason_code: if request.flight_id.is_some() {
                    "last_search_empty"
                } else {
                    "flight_id_missing"
                },
                user_message: FLIGHT_NOT_AVAILABLE.to_string(),
            },
            Some(flight_id) if !context.surfaced_flight_ids.contains(&flight_id) => {
                BookingDecision::Reject {
                    reason_code: "flight_id_not_surfaced",
                    flight_id,
                    user_message: INVALID_FLIGHT.to_string(),
                }
            }
            Some(flight_id) => BookingDecision::Allow { flight_id },
        }
    }
}
