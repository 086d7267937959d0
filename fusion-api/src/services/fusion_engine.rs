//! Fusion engine: random character + home planet + local weather
//!
//! A single fused record is cached under a fixed key. On a miss the engine
//! fetches the character, then its home planet, then the weather for the
//! planet's stand-in city, strictly in that order. The new record is
//! persisted to history and then cached.

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::db::RecordStore;
use crate::models::{CharacterProfile, FusedRecord, PlanetProfile, WeatherProfile};
use crate::services::city_map::city_for_planet;
use crate::services::normalize::{
    normalize_climate, normalize_color, normalize_gender, normalize_terrain, parse_gravity,
    parse_numeric, round_one_decimal,
};
use crate::services::scoring::fusion_score;
use crate::services::swapi_client::{CharacterSource, SwapiPerson, SwapiPlanet};
use crate::services::weather_client::{WeatherData, WeatherSource};

/// Cache key prefix for fused records
pub const FUSION_CACHE_PREFIX: &str = "fusion";

/// Fixed cache slot shared by every random fusion request
pub const RANDOM_FUSION_SLOT: &str = "random";

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("Error creating fusion data: {0}")]
    CreationFailed(String),
}

/// Join a prefix and parts with `:` (`fusion` + `["random"]` → `fusion:random`)
pub fn cache_key(prefix: &str, parts: &[&str]) -> String {
    std::iter::once(prefix)
        .chain(parts.iter().copied())
        .collect::<Vec<_>>()
        .join(":")
}

pub struct FusionEngine {
    characters: Arc<dyn CharacterSource>,
    weather: Arc<dyn WeatherSource>,
    store: Arc<dyn RecordStore>,
    cache_ttl_minutes: i64,
}

impl FusionEngine {
    pub fn new(
        characters: Arc<dyn CharacterSource>,
        weather: Arc<dyn WeatherSource>,
        store: Arc<dyn RecordStore>,
        cache_ttl_minutes: i64,
    ) -> Self {
        Self {
            characters,
            weather,
            store,
            cache_ttl_minutes,
        }
    }

    /// Cached fused record, or a freshly built one on a miss
    pub async fn produce_fused_record(&self) -> Result<FusedRecord, FusionError> {
        let key = cache_key(FUSION_CACHE_PREFIX, &[RANDOM_FUSION_SLOT]);

        if let Some(entry) = self.store.get_cache_entry(&key).await {
            match serde_json::from_value::<FusedRecord>(entry.data) {
                Ok(record) => {
                    tracing::info!(cache_key = %key, id = %record.id, "Returning cached fusion data");
                    return Ok(record);
                }
                Err(e) => {
                    tracing::warn!(cache_key = %key, error = %e, "Unreadable cache payload, rebuilding");
                }
            }
        }

        let record = self.create_fused_record().await?;

        if let Err(e) = self.store.save_fused(&record).await {
            tracing::error!(id = %record.id, error = %e, "Failed to persist fused record");
        }

        match serde_json::to_value(&record) {
            Ok(payload) => {
                self.store
                    .set_cache_entry(&key, &payload, self.cache_ttl_minutes)
                    .await
            }
            Err(e) => tracing::warn!(cache_key = %key, error = %e, "Failed to encode fused record for cache"),
        }

        tracing::info!(
            id = %record.id,
            character = %record.character.name,
            planet = %record.planet.name,
            score = record.fusion_score,
            "Created fused record"
        );

        Ok(record)
    }

    async fn create_fused_record(&self) -> Result<FusedRecord, FusionError> {
        let creation_failed = |e: &dyn std::fmt::Display| FusionError::CreationFailed(e.to_string());

        let person = self
            .characters
            .random_character()
            .await
            .map_err(|e| creation_failed(&e))?;

        let planet = self
            .characters
            .home_location(&person.homeworld)
            .await
            .map_err(|e| creation_failed(&e))?;

        let city = city_for_planet(&planet.name);
        tracing::debug!(planet = %planet.name, city = %city, "Mapped planet to city");

        let weather = self
            .weather
            .current_weather(city)
            .await
            .map_err(|e| creation_failed(&e))?;

        Ok(fuse(
            &person,
            &planet,
            &weather,
            Uuid::new_v4(),
            fusion_common::time::now_millis(),
        ))
    }
}

/// Normalize the three upstream payloads into a scored record
pub fn fuse(
    person: &SwapiPerson,
    planet: &SwapiPlanet,
    weather: &WeatherData,
    id: Uuid,
    timestamp: i64,
) -> FusedRecord {
    let character = character_profile(person);
    let planet = planet_profile(planet);
    let weather = weather_profile(weather);
    let fusion_score = fusion_score(&character, &planet, &weather);

    FusedRecord {
        id,
        timestamp,
        character,
        planet,
        weather,
        fusion_score,
    }
}

fn character_profile(person: &SwapiPerson) -> CharacterProfile {
    CharacterProfile {
        name: person.name.clone(),
        height: parse_numeric(&person.height, 0.0),
        mass: parse_numeric(&person.mass, 0.0),
        hair_color: normalize_color(&person.hair_color),
        skin_color: normalize_color(&person.skin_color),
        eye_color: normalize_color(&person.eye_color),
        birth_year: person.birth_year.clone(),
        gender: normalize_gender(&person.gender),
    }
}

fn planet_profile(planet: &SwapiPlanet) -> PlanetProfile {
    PlanetProfile {
        name: planet.name.clone(),
        climate: normalize_climate(&planet.climate),
        terrain: normalize_terrain(&planet.terrain),
        population: parse_numeric(&planet.population, 0.0),
        gravity: parse_gravity(&planet.gravity),
        diameter: parse_numeric(&planet.diameter, 0.0),
    }
}

fn weather_profile(data: &WeatherData) -> WeatherProfile {
    WeatherProfile {
        temperature: round_one_decimal(data.main.temp),
        feels_like: round_one_decimal(data.main.feels_like),
        humidity: data.main.humidity,
        pressure: data.main.pressure,
        wind_speed: round_one_decimal(data.wind.speed),
        description: data.description().unwrap_or("unknown").to_string(),
        visibility: data.visibility,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CacheEntry, CustomRecord, HistoryCollection, HistoryPage};
    use crate::pagination::PageRequest;
    use crate::services::swapi_client::SwapiError;
    use crate::services::weather_client::{MainReadings, WeatherCondition, WeatherError, Wind};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    fn push(log: &Log, event: impl Into<String>) {
        log.lock().unwrap().push(event.into());
    }

    fn person() -> SwapiPerson {
        SwapiPerson {
            name: "Luke Skywalker".to_string(),
            height: "172".to_string(),
            mass: "77".to_string(),
            hair_color: "Blond".to_string(),
            skin_color: "fair".to_string(),
            eye_color: "blue".to_string(),
            birth_year: "19BBY".to_string(),
            gender: "male".to_string(),
            homeworld: "https://swapi.py4e.com/api/planets/1/".to_string(),
            ..Default::default()
        }
    }

    fn planet() -> SwapiPlanet {
        SwapiPlanet {
            name: "Tatooine".to_string(),
            diameter: "10465".to_string(),
            climate: "arid".to_string(),
            gravity: "1 standard".to_string(),
            terrain: "Desert".to_string(),
            population: "200000".to_string(),
            ..Default::default()
        }
    }

    fn weather() -> WeatherData {
        WeatherData {
            weather: vec![WeatherCondition {
                description: "clear sky".to_string(),
                ..Default::default()
            }],
            main: MainReadings {
                temp: 28.04,
                feels_like: 27.96,
                pressure: 1012.0,
                humidity: 45.0,
                ..Default::default()
            },
            visibility: 10_000.0,
            wind: Wind {
                speed: 3.62,
                deg: 0.0,
            },
            ..Default::default()
        }
    }

    struct MockCharacters {
        log: Log,
        fail: bool,
        fail_location: bool,
    }

    #[async_trait]
    impl CharacterSource for MockCharacters {
        async fn random_character(&self) -> Result<SwapiPerson, SwapiError> {
            push(&self.log, "character");
            if self.fail {
                return Err(SwapiError::Person {
                    id: 17,
                    reason: "HTTP status 500".to_string(),
                });
            }
            Ok(person())
        }

        async fn home_location(&self, location_url: &str) -> Result<SwapiPlanet, SwapiError> {
            push(&self.log, format!("planet {}", location_url));
            if self.fail_location {
                return Err(SwapiError::Planet {
                    url: location_url.to_string(),
                    reason: "HTTP status 404".to_string(),
                });
            }
            Ok(planet())
        }
    }

    struct MockWeather {
        log: Log,
        fail: bool,
    }

    #[async_trait]
    impl WeatherSource for MockWeather {
        async fn current_weather(&self, city: &str) -> Result<WeatherData, WeatherError> {
            push(&self.log, format!("weather {}", city));
            if self.fail {
                return Err(WeatherError::City {
                    city: city.to_string(),
                    reason: "HTTP status 401".to_string(),
                });
            }
            Ok(weather())
        }
    }

    struct MockStore {
        log: Log,
        cached: Mutex<Option<CacheEntry>>,
        fail_history: bool,
        ttl_minutes: Mutex<Option<i64>>,
    }

    impl MockStore {
        fn new(log: &Log) -> Self {
            Self {
                log: log.clone(),
                cached: Mutex::new(None),
                fail_history: false,
                ttl_minutes: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl RecordStore for MockStore {
        async fn save_fused(&self, record: &FusedRecord) -> fusion_common::Result<()> {
            push(&self.log, format!("save {}", record.id));
            if self.fail_history {
                return Err(fusion_common::Error::Internal("disk full".to_string()));
            }
            Ok(())
        }

        async fn save_custom(&self, _record: &CustomRecord) -> fusion_common::Result<()> {
            Ok(())
        }

        async fn get_cache_entry(&self, cache_key: &str) -> Option<CacheEntry> {
            push(&self.log, format!("cache get {}", cache_key));
            self.cached.lock().unwrap().clone()
        }

        async fn set_cache_entry(&self, cache_key: &str, data: &Value, ttl_minutes: i64) {
            push(&self.log, format!("cache set {}", cache_key));
            *self.ttl_minutes.lock().unwrap() = Some(ttl_minutes);
            *self.cached.lock().unwrap() = Some(CacheEntry {
                cache_key: cache_key.to_string(),
                data: data.clone(),
                ttl: fusion_common::time::expiry_from_now(ttl_minutes),
                created_at: fusion_common::time::now_millis(),
            });
        }

        async fn delete_cache_entry(&self, _cache_key: &str) -> fusion_common::Result<()> {
            Ok(())
        }

        async fn history(
            &self,
            _collection: HistoryCollection,
            _page: PageRequest,
        ) -> fusion_common::Result<HistoryPage> {
            Ok(HistoryPage {
                items: vec![],
                total: 0,
                has_next: false,
            })
        }
    }

    /// Which upstream fetch the mocks should fail
    #[derive(Default)]
    struct Failures {
        character: bool,
        location: bool,
        weather: bool,
    }

    fn engine(log: &Log, store: Arc<MockStore>, failures: Failures) -> FusionEngine {
        FusionEngine::new(
            Arc::new(MockCharacters {
                log: log.clone(),
                fail: failures.character,
                fail_location: failures.location,
            }),
            Arc::new(MockWeather {
                log: log.clone(),
                fail: failures.weather,
            }),
            store,
            30,
        )
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("fusion", &["random"]), "fusion:random");
        assert_eq!(cache_key("fusion", &["person", "1"]), "fusion:person:1");
        assert_eq!(cache_key("fusion", &[]), "fusion");
    }

    #[test]
    fn test_fuse_normalizes_inputs() {
        let record = fuse(&person(), &planet(), &weather(), Uuid::nil(), 42);

        assert_eq!(record.id, Uuid::nil());
        assert_eq!(record.timestamp, 42);
        assert_eq!(record.character.height, 172.0);
        assert_eq!(record.character.hair_color, "blond");
        assert_eq!(record.character.gender, "Male");
        assert_eq!(record.planet.gravity, 1.0);
        assert_eq!(record.planet.terrain, "desert");
        assert_eq!(record.weather.temperature, 28.0);
        assert_eq!(record.weather.feels_like, 28.0);
        assert_eq!(record.weather.wind_speed, 3.6);
        assert_eq!(record.weather.description, "clear sky");
        assert_eq!(record.fusion_score, 71.3);
    }

    #[test]
    fn test_missing_weather_description() {
        let mut data = weather();
        data.weather.clear();
        let record = fuse(&person(), &planet(), &data, Uuid::nil(), 0);
        assert_eq!(record.weather.description, "unknown");
    }

    #[tokio::test]
    async fn test_miss_fetches_persists_and_caches_in_order() {
        let log: Log = Arc::default();
        let store = Arc::new(MockStore::new(&log));
        let engine = engine(&log, store.clone(), Failures::default());

        let record = engine.produce_fused_record().await.unwrap();

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "cache get fusion:random".to_string(),
                "character".to_string(),
                "planet https://swapi.py4e.com/api/planets/1/".to_string(),
                "weather Phoenix".to_string(),
                format!("save {}", record.id),
                "cache set fusion:random".to_string(),
            ]
        );
        assert_eq!(*store.ttl_minutes.lock().unwrap(), Some(30));
    }

    #[tokio::test]
    async fn test_hit_skips_clients() {
        let log: Log = Arc::default();
        let store = Arc::new(MockStore::new(&log));
        let engine = engine(&log, store.clone(), Failures::default());

        let first = engine.produce_fused_record().await.unwrap();
        log.lock().unwrap().clear();

        let second = engine.produce_fused_record().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(
            log.lock().unwrap().clone(),
            vec!["cache get fusion:random".to_string()]
        );
    }

    #[tokio::test]
    async fn test_character_failure_writes_nothing() {
        let log: Log = Arc::default();
        let store = Arc::new(MockStore::new(&log));
        let engine = engine(
            &log,
            store.clone(),
            Failures {
                character: true,
                ..Default::default()
            },
        );

        let err = engine.produce_fused_record().await.unwrap_err();
        assert!(err.to_string().starts_with("Error creating fusion data:"));
        assert!(err.to_string().contains("person 17"));

        let events = log.lock().unwrap().clone();
        assert_eq!(events, vec!["cache get fusion:random", "character"]);
        assert!(store.cached.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_location_failure_writes_nothing() {
        let log: Log = Arc::default();
        let store = Arc::new(MockStore::new(&log));
        let engine = engine(
            &log,
            store.clone(),
            Failures {
                location: true,
                ..Default::default()
            },
        );

        let err = engine.produce_fused_record().await.unwrap_err();
        assert!(err.to_string().starts_with("Error creating fusion data:"));
        assert!(err.to_string().contains("HTTP status 404"));

        let events = log.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "cache get fusion:random",
                "character",
                "planet https://swapi.py4e.com/api/planets/1/",
            ]
        );
        assert!(store.cached.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_weather_failure_writes_nothing() {
        let log: Log = Arc::default();
        let store = Arc::new(MockStore::new(&log));
        let engine = engine(
            &log,
            store.clone(),
            Failures {
                weather: true,
                ..Default::default()
            },
        );

        assert!(engine.produce_fused_record().await.is_err());

        let events = log.lock().unwrap().clone();
        assert!(!events.iter().any(|e| e.starts_with("save") || e.starts_with("cache set")));
    }

    #[tokio::test]
    async fn test_persist_failure_still_caches_and_returns() {
        let log: Log = Arc::default();
        let mut store = MockStore::new(&log);
        store.fail_history = true;
        let store = Arc::new(store);
        let engine = engine(&log, store.clone(), Failures::default());

        let record = engine.produce_fused_record().await.unwrap();

        let cached = store.cached.lock().unwrap().clone().unwrap();
        assert_eq!(cached.data["id"], record.id.to_string());
    }

    #[tokio::test]
    async fn test_unreadable_cache_payload_rebuilds() {
        let log: Log = Arc::default();
        let store = Arc::new(MockStore::new(&log));
        *store.cached.lock().unwrap() = Some(CacheEntry {
            cache_key: "fusion:random".to_string(),
            data: serde_json::json!({"unexpected": true}),
            ttl: i64::MAX / 2000,
            created_at: 0,
        });
        let engine = engine(&log, store.clone(), Failures::default());

        engine.produce_fused_record().await.unwrap();
        assert!(log.lock().unwrap().iter().any(|e| e == "character"));
    }
}
