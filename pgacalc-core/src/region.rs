use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Latitude/longitude rectangle, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl Bounds {
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self { min_lat, max_lat, min_lon, max_lon }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lon >= self.min_lon && lon <= self.max_lon && lat >= self.min_lat && lat <= self.max_lat
    }
}

/// Geographic tiles used to pick a model weighting.
///
/// `Cous` covers both `Wus` and `Ceus`; the two overlap between -115 and
/// -100 degrees longitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
    Ak,
    Ceus,
    Cous,
    Global,
    Wus,
}

impl Region {
    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Ak => "AK",
            Region::Ceus => "CEUS",
            Region::Cous => "COUS",
            Region::Global => "GLOBAL",
            Region::Wus => "WUS",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Ak => "Alaska",
            Region::Ceus => "Central & Eastern US",
            Region::Cous => "Conterminous US",
            Region::Global => "Global",
            Region::Wus => "Western US",
        }
    }

    pub const fn bounds(&self) -> Bounds {
        match self {
            Region::Ak => Bounds::new(48.0, 72.0, -200.0, -125.0),
            Region::Ceus => Bounds::new(24.6, 50.0, -115.0, -65.0),
            Region::Cous => Bounds::new(24.6, 50.0, -125.0, -65.0),
            Region::Global => Bounds::new(-90.0, 90.0, -180.0, 180.0),
            Region::Wus => Bounds::new(24.6, 50.0, -125.0, -100.0),
        }
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        self.bounds().contains(lat, lon)
    }

    pub const fn all() -> &'static [Region] {
        &[Region::Ak, Region::Ceus, Region::Cous, Region::Global, Region::Wus]
    }

    /// Region for a point. Never fails: anything outside the US boxes,
    /// including NaN, lands in [`Region::Global`].
    pub fn classify(lat: f64, lon: f64) -> Region {
        if Region::Cous.contains(lat, lon) {
            return Region::split_conterminous(lon);
        }
        if Region::Ak.contains(lat, lon) {
            return Region::Ak;
        }
        Region::Global
    }

    /// Western, central/eastern or (in the overlap band) conterminous US.
    pub fn split_conterminous(lon: f64) -> Region {
        if lon <= Region::Ceus.bounds().min_lon {
            Region::Wus
        } else if lon >= Region::Wus.bounds().max_lon {
            Region::Ceus
        } else {
            Region::Cous
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown region '{0}'. Supported regions: AK, CEUS, COUS, GLOBAL, WUS.")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::all()
            .iter()
            .copied()
            .find(|region| region.as_str() == s)
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}
