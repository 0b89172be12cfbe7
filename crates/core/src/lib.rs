//! Flight inventory, booking operations, and session flow rules for skydesk.

pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod operations;

pub use catalog::FlightCatalog;
pub use domain::flight::{FlightId, FlightRecord};
pub use errors::{ApplicationError, CatalogError, CatalogLoadError};
pub use flows::{FlowTransitionError, SessionEvent, SessionFlow, SessionMode};
pub use operations::{book_flight, location_code, search_flights};
