//! Planet → real-world city lookup for weather queries
//!
//! Each planet is paired with an Earth city of similar character (desert,
//! ice, jungle, megacity, ...). The table is built once and never mutated.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// City used for planets not in the table
pub const DEFAULT_CITY: &str = "London";

static PLANET_CITIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Tatooine", "Phoenix"),
        ("Alderaan", "Vienna"),
        ("Yavin IV", "Manaus"),
        ("Hoth", "Reykjavik"),
        ("Dagobah", "Miami"),
        ("Bespin", "Denver"),
        ("Endor", "Seattle"),
        ("Naboo", "Florence"),
        ("Coruscant", "Tokyo"),
        ("Kamino", "Bergen"),
        ("Geonosis", "Las Vegas"),
        ("Utapau", "Salt Lake City"),
        ("Mustafar", "Catania"),
        ("Kashyyyk", "Vancouver"),
        ("Polis Massa", "Anchorage"),
        ("Mygeeto", "Zurich"),
        ("Felucia", "Singapore"),
        ("Cato Neimoidia", "Hong Kong"),
        ("Saleucami", "Perth"),
        ("Stewjon", "Edinburgh"),
        ("Eriadu", "Birmingham"),
    ])
});

/// City whose weather stands in for `planet_name` (exact, case-sensitive)
pub fn city_for_planet(planet_name: &str) -> &'static str {
    PLANET_CITIES
        .get(planet_name)
        .copied()
        .unwrap_or(DEFAULT_CITY)
}
