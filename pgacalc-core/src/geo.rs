//! Source-to-site distances.

/// Mean earth radius (km).
pub const EARTH_RADIUS_MEAN: f64 = 6371.0072;

/// A point on the surface, with depth positive down (km).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
    pub depth: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon, depth: 0.0 }
    }

    pub fn with_depth(lat: f64, lon: f64, depth: f64) -> Self {
        Self { lat, lon, depth }
    }
}

/// Horizontal distance (km) using a flat-earth approximation scaled by the
/// cosine of the mean latitude. Good to well under 1% out to a few hundred km.
pub fn horizontal_distance_fast(a: &Location, b: &Location) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = lat1 - lat2;
    let d_lon = (a.lon - b.lon).to_radians() * ((lat1 + lat2) * 0.5).cos();
    EARTH_RADIUS_MEAN * (d_lat * d_lat + d_lon * d_lon).sqrt()
}

/// Distance to a point rupture at `depth` below a site `distance` km away.
pub fn distance_to_rupture(distance: f64, depth: f64) -> f64 {
    distance.hypot(depth)
}
