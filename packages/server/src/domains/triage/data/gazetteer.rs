//! Places we can locate without a geocoder.

use crate::kernel::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Place {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

impl Place {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// (lowercase keywords, place), checked in order
const PLACES: &[(&[&str], Place)] = &[
    (
        &["punjab"],
        Place {
            name: "Punjab, India",
            latitude: 31.1471,
            longitude: 75.3412,
        },
    ),
    (
        &["houston", "texas"],
        Place {
            name: "Houston, Texas, USA",
            latitude: 29.7604,
            longitude: -95.3698,
        },
    ),
    (
        &["miami"],
        Place {
            name: "Miami, Florida, USA",
            latitude: 25.7617,
            longitude: -80.1918,
        },
    ),
];

/// First place whose keyword appears in `text`.
pub fn lookup(text: &str) -> Option<Place> {
    let lower = text.to_lowercase();
    PLACES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(_, place)| *place)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("Flooding in HOUSTON right now").map(|p| p.name), Some("Houston, Texas, USA"));
        assert_eq!(lookup("wildfire somewhere in texas").map(|p| p.latitude), Some(29.7604));
        assert_eq!(lookup("Punjab floods").map(|p| p.longitude), Some(75.3412));
        assert!(lookup("Duluth").is_none());
    }
}
