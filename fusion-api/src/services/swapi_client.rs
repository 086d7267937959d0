//! Star Wars API (SWAPI) client
//!
//! Fetches characters ("people") and their home planets. One request per
//! call, no retries; every failure names the resource that failed.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Number of people in the SWAPI dataset; random ids are drawn from 1..=82
pub const SWAPI_PEOPLE_COUNT: u32 = 82;

/// SWAPI client errors
#[derive(Debug, Error)]
pub enum SwapiError {
    #[error("Error fetching person {id}: {reason}")]
    Person { id: u32, reason: String },

    #[error("Error fetching planet from {url}: {reason}")]
    Planet { url: String, reason: String },

    #[error("Error searching for person {name}: {reason}")]
    Search { name: String, reason: String },

    #[error("HTTP client error: {0}")]
    Client(String),
}

/// SWAPI person record (all attributes are strings upstream)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SwapiPerson {
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    /// URL of the home planet resource
    pub homeworld: String,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub starships: Vec<String>,
    #[serde(default)]
    pub created: String,
    #[serde(default)]
    pub edited: String,
    #[serde(default)]
    pub url: String,
}

/// SWAPI planet record
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SwapiPlanet {
    pub name: String,
    #[serde(default)]
    pub rotation_period: String,
    #[serde(default)]
    pub orbital_period: String,
    pub diameter: String,
    pub climate: String,
    pub gravity: String,
    pub terrain: String,
    #[serde(default)]
    pub surface_water: String,
    pub population: String,
    #[serde(default)]
    pub residents: Vec<String>,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SwapiSearchResults {
    #[serde(default)]
    results: Vec<SwapiPerson>,
}

/// Source of characters and their home locations
#[async_trait]
pub trait CharacterSource: Send + Sync {
    /// One character picked uniformly at random
    async fn random_character(&self) -> Result<SwapiPerson, SwapiError>;

    /// Dereference a character's `homeworld` URL
    async fn home_location(&self, location_url: &str) -> Result<SwapiPlanet, SwapiError>;
}

/// SWAPI HTTP client
pub struct SwapiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl SwapiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SwapiError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SwapiError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// GET /people/{id}/
    pub async fn get_person(&self, id: u32) -> Result<SwapiPerson, SwapiError> {
        let url = format!("{}/people/{}/", self.base_url, id);
        tracing::debug!(id, url = %url, "Fetching SWAPI person");

        let person: SwapiPerson = self
            .fetch_json(&url)
            .await
            .map_err(|reason| SwapiError::Person { id, reason })?;

        tracing::info!(id, name = %person.name, "Retrieved person from SWAPI");
        Ok(person)
    }

    /// Fetch a uniformly random person id in 1..=SWAPI_PEOPLE_COUNT
    pub async fn random_person(&self) -> Result<SwapiPerson, SwapiError> {
        let id = rand::thread_rng().gen_range(1..=SWAPI_PEOPLE_COUNT);
        self.get_person(id).await
    }

    /// GET an absolute planet URL (as found in `homeworld`)
    pub async fn get_planet(&self, url: &str) -> Result<SwapiPlanet, SwapiError> {
        tracing::debug!(url = %url, "Fetching SWAPI planet");

        let planet: SwapiPlanet = self.fetch_json(url).await.map_err(|reason| {
            SwapiError::Planet {
                url: url.to_string(),
                reason,
            }
        })?;

        tracing::info!(url = %url, name = %planet.name, "Retrieved planet from SWAPI");
        Ok(planet)
    }

    /// GET /planets/{id}/
    pub async fn get_planet_by_id(&self, id: u32) -> Result<SwapiPlanet, SwapiError> {
        let url = format!("{}/planets/{}/", self.base_url, id);
        self.get_planet(&url).await
    }

    /// GET /people/?search={name}; first match or `None`
    pub async fn search_person(&self, name: &str) -> Result<Option<SwapiPerson>, SwapiError> {
        let url = format!("{}/people/", self.base_url);
        let search_error = |reason: String| SwapiError::Search {
            name: name.to_string(),
            reason,
        };

        let response = self
            .http_client
            .get(&url)
            .query(&[("search", name)])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| search_error(e.to_string()))?;

        let results: SwapiSearchResults = response
            .json()
            .await
            .map_err(|e| search_error(e.to_string()))?;

        Ok(results.results.into_iter().next())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, String> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP status {}", status.as_u16()));
        }

        response.json::<T>().await.map_err(|e| e.to_string())
    }
}

#[async_trait]
impl CharacterSource for SwapiClient {
    async fn random_character(&self) -> Result<SwapiPerson, SwapiError> {
        self.random_person().await
    }

    async fn home_location(&self, location_url: &str) -> Result<SwapiPlanet, SwapiError> {
        self.get_planet(location_url).await
    }
}

static RESOURCE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d+)/$").expect("resource id pattern is valid"));

/// Numeric id at the end of a resource URL (`.../planets/7/` → 7); 1 if absent
pub fn extract_id_from_url(url: &str) -> u32 {
    RESOURCE_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .and_then(|id| id.as_str().parse().ok())
        .unwrap_or(1)
}
