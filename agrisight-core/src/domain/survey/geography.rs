// agrisight-core/src/domain/survey/geography.rs
//
// Study area of the synthetic survey: East/Southern Africa.

use serde::{Deserialize, Serialize};

/// Axis-aligned latitude/longitude box (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    /// Valid WGS84 coordinates.
    pub const GLOBAL: GeoBounds = GeoBounds {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    pub fn contains_lat(&self, lat: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat
    }

    pub fn contains_lon(&self, lon: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.contains_lat(lat) && self.contains_lon(lon)
    }

    pub fn is_well_formed(&self) -> bool {
        self.min_lat <= self.max_lat
            && self.min_lon <= self.max_lon
            && GeoBounds::GLOBAL.contains(self.min_lat, self.min_lon)
            && GeoBounds::GLOBAL.contains(self.max_lat, self.max_lon)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RegionProfile {
    pub name: &'static str,
    pub bounds: GeoBounds,
}

#[derive(Debug, Clone, Copy)]
pub struct CountryProfile {
    pub name: &'static str,
    pub regions: &'static [RegionProfile],
}

pub const COUNTRIES: &[CountryProfile] = &[
    CountryProfile {
        name: "Ethiopia",
        regions: &[
            RegionProfile {
                name: "Oromia",
                bounds: GeoBounds::new(4.0, 10.0, 35.0, 42.0),
            },
            RegionProfile {
                name: "Amhara",
                bounds: GeoBounds::new(9.0, 13.5, 36.0, 40.5),
            },
            RegionProfile {
                name: "Tigray",
                bounds: GeoBounds::new(12.3, 14.8, 36.5, 40.0),
            },
            RegionProfile {
                name: "SNNPR",
                bounds: GeoBounds::new(4.5, 8.5, 34.5, 38.5),
            },
        ],
    },
    CountryProfile {
        name: "Kenya",
        regions: &[
            RegionProfile {
                name: "Rift Valley",
                bounds: GeoBounds::new(-2.5, 5.0, 34.5, 37.0),
            },
            RegionProfile {
                name: "Eastern",
                bounds: GeoBounds::new(-3.0, 4.0, 37.0, 41.0),
            },
            RegionProfile {
                name: "Nyanza",
                bounds: GeoBounds::new(-1.5, 0.5, 34.0, 35.5),
            },
            RegionProfile {
                name: "Western",
                bounds: GeoBounds::new(0.0, 1.5, 34.0, 35.0),
            },
        ],
    },
    CountryProfile {
        name: "Zambia",
        regions: &[
            RegionProfile {
                name: "Southern",
                bounds: GeoBounds::new(-18.0, -15.5, 25.5, 29.0),
            },
            RegionProfile {
                name: "Eastern Province",
                bounds: GeoBounds::new(-14.5, -10.0, 30.0, 33.5),
            },
            RegionProfile {
                name: "Central",
                bounds: GeoBounds::new(-15.5, -12.5, 27.0, 31.0),
            },
            RegionProfile {
                name: "Copperbelt",
                bounds: GeoBounds::new(-13.5, -12.0, 26.5, 29.5),
            },
        ],
    },
];

pub const CROPS: &[&str] = &["Maize", "Teff", "Wheat", "Sorghum", "Beans", "Coffee"];

/// Union of every region box; the default study area for the GPS rule.
pub fn study_area() -> GeoBounds {
    COUNTRIES
        .iter()
        .flat_map(|c| c.regions.iter())
        .fold(None::<GeoBounds>, |acc, r| {
            Some(match acc {
                None => r.bounds,
                Some(b) => GeoBounds::new(
                    b.min_lat.min(r.bounds.min_lat),
                    b.max_lat.max(r.bounds.max_lat),
                    b.min_lon.min(r.bounds.min_lon),
                    b.max_lon.max(r.bounds.max_lon),
                ),
            })
        })
        .unwrap_or(GeoBounds::GLOBAL)
}
