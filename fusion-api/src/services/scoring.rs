//! Fusion score: a 0-100 rating of a fused record
//!
//! | Part      | Max | Rule                                                   |
//! |-----------|-----|--------------------------------------------------------|
//! | character | 10  | height / 200 * 10, capped (only when height > 0)       |
//! | character | 10  | mass / 100 * 10, capped (only when mass > 0)           |
//! | character | 5   | name longer than 5 characters                          |
//! | character | 5   | eye color is not "unknown"                             |
//! | planet    | 10  | population > 1,000,000                                 |
//! | planet    | 10  | diameter > 10,000                                      |
//! | planet    | 10  | gravity in [0.5, 2]                                    |
//! | weather   | 15  | temperature in [15, 25]                                |
//! | weather   | 10  | humidity in [40, 60]                                   |
//! | weather   | 10  | wind speed < 10                                        |
//! | weather   | 5   | visibility > 5000                                      |

use crate::models::{CharacterProfile, PlanetProfile, WeatherProfile};
use crate::services::normalize::round_one_decimal;

/// Score the normalized projections, rounded to one decimal
pub fn fusion_score(
    character: &CharacterProfile,
    planet: &PlanetProfile,
    weather: &WeatherProfile,
) -> f64 {
    let total = character_points(character) + planet_points(planet) + weather_points(weather);
    round_one_decimal(total)
}

fn character_points(character: &CharacterProfile) -> f64 {
    let mut points = 0.0;

    if character.height > 0.0 {
        points += (character.height / 200.0 * 10.0).min(10.0);
    }
    if character.mass > 0.0 {
        points += (character.mass / 100.0 * 10.0).min(10.0);
    }
    if character.name.chars().count() > 5 {
        points += 5.0;
    }
    if character.eye_color != "unknown" {
        points += 5.0;
    }

    points
}

fn planet_points(planet: &PlanetProfile) -> f64 {
    let mut points = 0.0;

    if planet.population > 1_000_000.0 {
        points += 10.0;
    }
    if planet.diameter > 10_000.0 {
        points += 10.0;
    }
    if (0.5..=2.0).contains(&planet.gravity) {
        points += 10.0;
    }

    points
}

fn weather_points(weather: &WeatherProfile) -> f64 {
    let mut points = 0.0;

    if (15.0..=25.0).contains(&weather.temperature) {
        points += 15.0;
    }
    if (40.0..=60.0).contains(&weather.humidity) {
        points += 10.0;
    }
    if weather.wind_speed < 10.0 {
        points += 10.0;
    }
    if weather.visibility > 5000.0 {
        points += 5.0;
    }

    points
}
