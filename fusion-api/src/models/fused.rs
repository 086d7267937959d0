//! Fused record: normalized character + home location + weather, with score
//!
//! Serialized with camelCase keys; the location projection is stored under
//! `planet`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::normalize;

/// Normalized character projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProfile {
    pub name: String,
    /// Centimetres; 0 when unknown
    pub height: f64,
    /// Kilograms; 0 when unknown
    pub mass: f64,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
}

impl CharacterProfile {
    /// Age in `current_year` counted from the in-universe birth year
    ///
    /// `None` for birth years without a BBY/ABY era marker.
    pub fn age_years(&self, current_year: i32) -> Option<f64> {
        normalize::age_from_birth_year(&self.birth_year, current_year)
    }
}

/// Normalized location (home planet) projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetProfile {
    pub name: String,
    pub climate: String,
    pub terrain: String,
    pub population: f64,
    /// Standard gravities
    pub gravity: f64,
    /// Kilometres
    pub diameter: f64,
}

/// Normalized weather projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherProfile {
    /// Celsius, one decimal
    pub temperature: f64,
    /// Celsius, one decimal
    pub feels_like: f64,
    /// Percent
    pub humidity: f64,
    /// hPa
    pub pressure: f64,
    /// m/s, one decimal
    pub wind_speed: f64,
    pub description: String,
    /// Metres
    pub visibility: f64,
}

/// Combined record produced by the fusion engine
///
/// Created once on a cache miss and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedRecord {
    pub id: Uuid,
    /// Creation time, epoch milliseconds
    pub timestamp: i64,
    pub character: CharacterProfile,
    pub planet: PlanetProfile,
    pub weather: WeatherProfile,
    /// 0-100, one decimal
    pub fusion_score: f64,
}
