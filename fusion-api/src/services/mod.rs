//! Upstream clients, normalization and the fusion engine

pub mod city_map;
pub mod fusion_engine;
pub mod normalize;
pub mod scoring;
pub mod swapi_client;
pub mod weather_client;

pub use fusion_engine::{cache_key, FusionEngine, FusionError};
pub use swapi_client::{CharacterSource, SwapiClient, SwapiError};
pub use weather_client::{WeatherClient, WeatherError, WeatherSource};
