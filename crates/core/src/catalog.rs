use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::domain::flight::{FlightId, FlightRecord};
use crate::errors::{CatalogError, CatalogLoadError};

/// In-memory flight inventory. Record order is preserved from load and is the
/// order search results come back in.
///
/// A single session is expected to mutate the catalog at a time; callers that
/// share one catalog between sessions must serialize `decrement_seats`.
#[derive(Clone, Debug, Default)]
pub struct FlightCatalog {
    flights: Vec<FlightRecord>,
}

impl FlightCatalog {
    pub fn new(flights: Vec<FlightRecord>) -> Self {
        Self { flights }
    }

    /// Reads a JSON array file, or JSON lines when the extension is `.jsonl`.
    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogLoadError::ReadFile { path: path.to_path_buf(), source })?;

        let json_lines = path.extension().and_then(|ext| ext.to_str()) == Some("jsonl");
        let flights =
            if json_lines { parse_json_lines(path, &raw)? } else { parse_array(path, &raw)? };

        let mut seen = BTreeSet::new();
        for flight in &flights {
            if !seen.insert(flight.id) {
                return Err(CatalogLoadError::DuplicateId {
                    path: path.to_path_buf(),
                    flight_id: flight.id,
                });
            }
        }

        Ok(Self::new(flights))
    }

    pub fn find_all(&self) -> &[FlightRecord] {
        &self.flights
    }

    pub fn find(&self, flight_id: FlightId) -> Option<&FlightRecord> {
        self.flights.iter().find(|flight| flight.id == flight_id)
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn decrement_seats(&mut self, flight_id: FlightId) -> Result<&FlightRecord, CatalogError> {
        let flight = self
            .flights
            .iter_mut()
            .find(|flight| flight.id == flight_id)
            .ok_or(CatalogError::NotFound { flight_id })?;

        if flight.available_seats == 0 {
            return Err(CatalogError::SoldOut { flight_id });
        }

        flight.available_seats -= 1;
        Ok(&*flight)
    }
}

fn parse_array(path: &Path, raw: &str) -> Result<Vec<FlightRecord>, CatalogLoadError> {
    serde_json::from_str(raw).map_err(|source| CatalogLoadError::Parse {
        path: path.to_path_buf(),
        line: source.line(),
        source,
    })
}

fn parse_json_lines(path: &Path, raw: &str) -> Result<Vec<FlightRecord>, CatalogLoadError> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str(line).map_err(|source| CatalogLoadError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                source,
            })
        })
        .collect()
}
