//! Stop types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components finite and inside the WGS84 range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// Opaque stop identifier (the owning assignment or service record id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StopId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for StopId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A pool to visit on a technician's route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub id: StopId,
    pub coordinates: Coordinates,
    /// 1-based visiting order
    pub sequence: u32,
}

/// Raw stop as delivered by the caller, before validation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopInput {
    pub id: StopId,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub sequence: Option<u32>,
}

impl StopInput {
    pub fn new(id: impl Into<StopId>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat: Some(lat),
            lng: Some(lng),
            sequence: None,
        }
    }

    pub fn with_sequence(mut self, sequence: u32) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

/// Route endpoint: a coordinate pair or an address the provider resolves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Coordinates(Coordinates),
    Address(String),
}

impl From<Coordinates> for Location {
    fn from(value: Coordinates) -> Self {
        Location::Coordinates(value)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Coordinates(c) => c.fmt(f),
            Location::Address(address) => f.write_str(address),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(50.0755, 14.4378).is_valid());
        assert!(!Coordinates::new(91.0, 14.0).is_valid());
        assert!(!Coordinates::new(50.0, -181.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 14.0).is_valid());
    }

    #[test]
    fn test_location_display() {
        let coords: Location = Coordinates::new(10.5, -20.25).into();
        assert_eq!(coords.to_string(), "10.5,-20.25");

        let address = Location::Address("1 Pool Lane, Austin TX".to_string());
        assert_eq!(address.to_string(), "1 Pool Lane, Austin TX");
    }

    #[test]
    fn test_stop_input_deserialize_without_sequence() {
        let input: StopInput =
            serde_json::from_str(r#"{"id":"a-1","lat":10.0,"lng":20.0}"#).unwrap();
        assert_eq!(input.id.as_str(), "a-1");
        assert_eq!(input.sequence, None);
    }

    #[test]
    fn test_stop_input_deserialize_missing_coordinates() {
        let input: StopInput = serde_json::from_str(r#"{"id":"a-1","sequence":2}"#).unwrap();
        assert!(input.lat.is_none());
        assert!(input.lng.is_none());
        assert_eq!(input.sequence, Some(2));
    }
}
