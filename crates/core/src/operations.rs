//! Flight search and seat booking against a [`FlightCatalog`].

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::catalog::FlightCatalog;
use crate::domain::flight::{FlightId, FlightRecord};

/// Location placeholder the model uses when the user gave no airport.
pub const ANY_LOCATION: &str = "Any";

/// Pulls the airport code out of a display string such as
/// `"Los Angeles (LAX)"`. Strings without parentheses are returned trimmed.
pub fn location_code(location: &str) -> &str {
    let tail = location.rsplit('(').next().unwrap_or(location);
    tail.trim().trim_matches(')').trim()
}

/// Returns matching flights in catalog order.
///
/// A concrete origin and destination must both match; `"Any"` on one side
/// drops that side from the filter. When both sides are `"Any"` every flight
/// on the date is returned.
pub fn search_flights<'a>(
    catalog: &'a FlightCatalog,
    origin: &str,
    destination: &str,
    date: NaiveDate,
) -> Vec<&'a FlightRecord> {
    let origin = location_code(origin);
    let destination = location_code(destination);
    let origin_filter = (origin != ANY_LOCATION).then_some(origin);
    let destination_filter = (destination != ANY_LOCATION).then_some(destination);

    let matches = catalog
        .find_all()
        .iter()
        .filter(|flight| flight.date == date)
        .filter(|flight| origin_filter.map_or(true, |code| flight.origin == code))
        .filter(|flight| destination_filter.map_or(true, |code| flight.destination == code))
        .collect::<Vec<_>>();

    info!(
        event_name = "domain.search.completed",
        origin,
        destination,
        date = %date,
        result_count = matches.len(),
        "flight search completed"
    );
    matches
}

/// Takes one seat on `flight_id`. Unknown and sold-out flights come back as
/// `None`; they are ordinary outcomes for the user, not faults.
pub fn book_flight(catalog: &mut FlightCatalog, flight_id: FlightId) -> Option<FlightId> {
    match catalog.decrement_seats(flight_id) {
        Ok(flight) => {
            info!(
                event_name = "domain.booking.completed",
                flight_id = %flight.id,
                remaining_seats = flight.available_seats,
                "seat booked"
            );
            Some(flight.id)
        }
        Err(error) => {
            warn!(
                event_name = "domain.booking.rejected",
                flight_id = %flight_id,
                error = %error,
                "seat booking rejected"
            );
            None
        }
    }
}
