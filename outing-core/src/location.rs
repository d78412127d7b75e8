use serde::{Deserialize, Serialize};

/// A named place the user can pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn new(id: &str, name: &str, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            latitude,
            longitude,
        }
    }
}

/// Locations shipped with a fresh config.
pub fn builtin_locations() -> Vec<Location> {
    vec![
        Location::new("alcabideche", "Alcabideche", 38.7330, -9.4100),
        Location::new("algueirao", "Algueirão", 38.7936, -9.3417),
        Location::new("amadora", "Amadora", 38.7569, -9.2308),
        Location::new("carcavelos", "Carcavelos", 38.6910, -9.3317),
        Location::new("cascais", "Cascais", 38.6979, -9.4206),
        Location::new("columbeira", "Columbeira", 39.3439, -9.1869),
        Location::new("culatra", "Ilha da Culatra", 36.9889, -7.8336),
        Location::new("estoril", "Estoril", 38.7057, -9.3976),
        Location::new("guincho", "Guincho", 38.72948, -9.47457),
        Location::new("peninha", "Peninha", 38.7692, -9.4589),
        Location::new("sdr", "São Domingos de Rana", 38.7019, -9.3389),
        Location::new("sintra", "Sintra", 38.8029, -9.3817),
        Location::new("tocha", "Praia da Tocha", 40.3174, -8.7984),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_ids_are_unique() {
        let locs = builtin_locations();
        let ids: HashSet<_> = locs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), locs.len());
    }

    #[test]
    fn builtin_coordinates_are_in_portugal() {
        for l in builtin_locations() {
            assert!((36.0..42.5).contains(&l.latitude), "{}", l.id);
            assert!((-10.0..-6.0).contains(&l.longitude), "{}", l.id);
        }
    }
}
