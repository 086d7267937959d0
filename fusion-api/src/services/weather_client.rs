//! OpenWeatherMap current-weather client
//!
//! Queries `/weather` by city name or by coordinates, always in metric units.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Weather client errors
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Error fetching weather for {city}: {reason}")]
    City { city: String, reason: String },

    #[error("Error fetching weather for coordinates {lat}, {lon}: {reason}")]
    Coordinates { lat: f64, lon: f64, reason: String },

    #[error("HTTP client error: {0}")]
    Client(String),
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Coordinates {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WeatherCondition {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MainReadings {
    /// Celsius (metric units)
    pub temp: f64,
    pub feels_like: f64,
    #[serde(default)]
    pub temp_min: f64,
    #[serde(default)]
    pub temp_max: f64,
    /// hPa
    pub pressure: f64,
    /// Percent
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Wind {
    /// m/s
    pub speed: f64,
    #[serde(default)]
    pub deg: f64,
}

/// Current weather observation as returned by `/weather`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WeatherData {
    #[serde(default)]
    pub coord: Option<Coordinates>,
    #[serde(default)]
    pub weather: Vec<WeatherCondition>,
    pub main: MainReadings,
    /// Metres
    #[serde(default)]
    pub visibility: f64,
    pub wind: Wind,
    #[serde(default)]
    pub dt: i64,
    #[serde(default)]
    pub timezone: i64,
    #[serde(default)]
    pub name: String,
}

impl WeatherData {
    /// Description of the first reported condition
    pub fn description(&self) -> Option<&str> {
        self.weather
            .first()
            .map(|condition| condition.description.as_str())
            .filter(|description| !description.is_empty())
    }
}

/// Source of current weather for a named city
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_weather(&self, city: &str) -> Result<WeatherData, WeatherError>;
}

/// OpenWeatherMap HTTP client
pub struct WeatherClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// GET /weather?q={city}
    pub async fn weather_by_city(&self, city: &str) -> Result<WeatherData, WeatherError> {
        tracing::debug!(city = %city, "Fetching weather by city");

        let data = self
            .fetch(&[("q", city.to_string())])
            .await
            .map_err(|reason| WeatherError::City {
                city: city.to_string(),
                reason,
            })?;

        tracing::info!(
            city = %city,
            temperature = data.main.temp,
            "Retrieved weather"
        );
        Ok(data)
    }

    /// GET /weather?lat={lat}&lon={lon}
    pub async fn weather_by_coordinates(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<WeatherData, WeatherError> {
        tracing::debug!(lat, lon, "Fetching weather by coordinates");

        let data = self
            .fetch(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            .await
            .map_err(|reason| WeatherError::Coordinates { lat, lon, reason })?;

        tracing::info!(lat, lon, temperature = data.main.temp, "Retrieved weather");
        Ok(data)
    }

    async fn fetch(&self, location: &[(&str, String)]) -> Result<WeatherData, String> {
        let url = format!("{}/weather", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(location)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP status {}", status.as_u16()));
        }

        response.json::<WeatherData>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn current_weather(&self, city: &str) -> Result<WeatherData, WeatherError> {
        self.weather_by_city(city).await
    }
}
