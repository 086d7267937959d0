//! Data models for fusion-api

pub mod custom;
pub mod fused;
pub mod store;

pub use custom::{parse_store_request, CustomMetadata, CustomRecord, StoreCustomRequest};
pub use fused::{CharacterProfile, FusedRecord, PlanetProfile, WeatherProfile};
pub use store::{CacheEntry, HistoryCollection, HistoryPage};
