use std::fmt;

use serde::{Deserialize, Serialize};

use crate::protocol::Coordinate;

// District bounds, inclusive.
const DISTRICT_LAT_MIN: f64 = 10.25;
const DISTRICT_LAT_MAX: f64 = 11.35;
const DISTRICT_LNG_MIN: f64 = 76.65;
const DISTRICT_LNG_MAX: f64 = 77.45;

// Band thresholds, all strict comparisons.
const NORTH_LAT_THRESHOLD: f64 = 11.05;
const SOUTH_LAT_THRESHOLD: f64 = 10.85;
const EAST_LNG_THRESHOLD: f64 = 77.10;
const WEST_LNG_THRESHOLD: f64 = 76.95;

/// Geographic partition used to route issues to regional administrators.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Zone {
    /// Mettupalayam, Annur, Karamadai, Thudiyalur, Saravanampatti.
    North,
    /// Pollachi, Valparai, Anaimalai, Kinathukadavu, Aliyar Dam.
    South,
    /// Sulur, Palladam, Avinashi Road, Tiruppur border.
    East,
    /// Madukkarai, Thondamuthur, Coimbatore West.
    West,
    /// Gandhipuram, RS Puram, Peelamedu, Singanallur, Ukkadam.
    Central,
    /// Outside the district, or no coordinates.
    Unassigned,
}

impl Zone {
    /// Every zone, including `Unassigned`.
    pub const ALL: [Zone; 6] = [
        Zone::North,
        Zone::South,
        Zone::East,
        Zone::West,
        Zone::Central,
        Zone::Unassigned,
    ];

    /// Zones that can own a regional administrator.
    pub const ASSIGNABLE: [Zone; 5] = [
        Zone::North,
        Zone::South,
        Zone::East,
        Zone::West,
        Zone::Central,
    ];

    /// Upper-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::North => "NORTH",
            Zone::South => "SOUTH",
            Zone::East => "EAST",
            Zone::West => "WEST",
            Zone::Central => "CENTRAL",
            Zone::Unassigned => "UNASSIGNED",
        }
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        match self {
            Zone::North => {
                "North Zone: Mettupalayam, Annur, Karamadai, Thudiyalur, Saravanampatti"
            }
            Zone::South => "South Zone: Pollachi, Valparai, Anaimalai, Kinathukadavu, Aliyar Dam",
            Zone::East => "East Zone: Sulur, Palladam, Avinashi Road, Tiruppur Border",
            Zone::West => "West Zone: Madukkarai, Thondamuthur, Coimbatore West",
            Zone::Central => {
                "Central Zone: Gandhipuram, RS Puram, Peelamedu, Singanallur, Ukkadam"
            }
            Zone::Unassigned => "Unassigned: Outside Coimbatore District or no coordinates",
        }
    }

    /// Short list of areas, shown next to a picked location.
    pub fn areas(&self) -> &'static str {
        match self {
            Zone::North => "Mettupalayam, Annur, Karamadai, Thudiyalur",
            Zone::South => "Pollachi, Valparai, Anaimalai, Kinathukadavu",
            Zone::East => "Sulur, Palladam, Avinashi Road",
            Zone::West => "Madukkarai, Thondamuthur",
            Zone::Central => "Gandhipuram, RS Puram, Peelamedu, Singanallur",
            Zone::Unassigned => "Outside Coimbatore District",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Zone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Zone::ALL
            .into_iter()
            .find(|zone| zone.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown zone: {s}"))
    }
}

/// Classify a coordinate. Total over every input; the first matching rule wins.
pub fn resolve(coordinate: &Coordinate) -> Zone {
    let (lat, lng) = (coordinate.latitude, coordinate.longitude);

    // written as a positive containment test so NaN lands outside
    let inside = (DISTRICT_LAT_MIN..=DISTRICT_LAT_MAX).contains(&lat)
        && (DISTRICT_LNG_MIN..=DISTRICT_LNG_MAX).contains(&lng);

    let zone = if !inside {
        Zone::Unassigned
    } else if lat > NORTH_LAT_THRESHOLD {
        Zone::North
    } else if lat < SOUTH_LAT_THRESHOLD {
        Zone::South
    } else if lng > EAST_LNG_THRESHOLD {
        Zone::East
    } else if lng < WEST_LNG_THRESHOLD {
        Zone::West
    } else {
        Zone::Central
    };

    tracing::trace!(lat, lng, %zone, "Resolved zone");
    zone
}

/// Like [`resolve`], treating a missing coordinate as `Unassigned`.
pub fn resolve_optional(coordinate: Option<&Coordinate>) -> Zone {
    coordinate.map(resolve).unwrap_or(Zone::Unassigned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lng: f64) -> Zone {
        resolve(&Coordinate::new(lat, lng))
    }

    #[test]
    fn test_boundary_exactness() {
        assert_eq!(at(11.05, 76.97), Zone::Central);
        assert_eq!(at(11.06, 76.97), Zone::North);
        assert_eq!(at(10.84, 76.97), Zone::South);
        assert_eq!(at(11.0, 77.11), Zone::East);
        assert_eq!(at(11.0, 76.94), Zone::West);
    }

    #[test]
    fn test_threshold_equality_falls_through() {
        assert_eq!(at(10.85, 77.0), Zone::Central);
        assert_eq!(at(11.0, 77.10), Zone::Central);
        assert_eq!(at(11.0, 76.95), Zone::Central);
    }

    #[test]
    fn test_district_box_is_inclusive() {
        assert_eq!(at(10.25, 77.0), Zone::South);
        assert_eq!(at(11.35, 77.0), Zone::North);
        assert_eq!(at(11.0, 76.65), Zone::West);
        assert_eq!(at(11.0, 77.45), Zone::East);
    }

    #[test]
    fn test_outside_district() {
        assert_eq!(at(10.24, 77.0), Zone::Unassigned);
        assert_eq!(at(11.36, 77.0), Zone::Unassigned);
        assert_eq!(at(11.0, 76.64), Zone::Unassigned);
        assert_eq!(at(11.0, 77.46), Zone::Unassigned);
        assert_eq!(at(0.0, 0.0), Zone::Unassigned);
        assert_eq!(at(f64::NAN, 77.0), Zone::Unassigned);
    }

    #[test]
    fn test_north_wins_over_east() {
        // lat and lng bands overlap; latitude rules are checked first
        assert_eq!(at(11.2, 77.3), Zone::North);
        assert_eq!(at(10.5, 76.7), Zone::South);
    }

    #[test]
    fn test_resolve_optional() {
        assert_eq!(resolve_optional(None), Zone::Unassigned);
        assert_eq!(
            resolve_optional(Some(&Coordinate::new(11.0168, 76.9558))),
            Zone::Central
        );
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(serde_json::to_string(&Zone::Central).unwrap(), "\"CENTRAL\"");
        assert_eq!(
            serde_json::from_str::<Zone>("\"UNASSIGNED\"").unwrap(),
            Zone::Unassigned
        );
        assert_eq!("north".parse::<Zone>(), Ok(Zone::North));
        assert!("middle".parse::<Zone>().is_err());
    }
}
