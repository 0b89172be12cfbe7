use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlightId(pub i64);

impl fmt::Display for FlightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One bookable flight. Only `available_seats` changes after load.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub id: FlightId,
    pub date: NaiveDate,
    pub airline: String,
    pub flight_number: String,
    pub origin: String,
    pub destination: String,
    #[serde(with = "clock_time")]
    pub departure_time: NaiveTime,
    #[serde(with = "clock_time")]
    pub arrival_time: NaiveTime,
    pub available_seats: u32,
}

impl FlightRecord {
    pub fn is_sold_out(&self) -> bool {
        self.available_seats == 0
    }
}

/// `HH:MM` wall-clock times as they appear in the flights dataset.
mod clock_time {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&time.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(D::Error::custom)
    }
}
