//! Geographic coordinate type and the great-circle distance used as edge
//! weight.
//!
//! Every weight in the routing graph, and every nearest-neighbour ranking,
//! goes through [`haversine_km`].  Keep it the only distance formula in the
//! workspace so weights computed at build time and at insertion time agree
//! bit for bit.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Haversine great-circle distance between two `(lat, lon)` pairs, in
/// kilometres.  Inputs are degrees.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    // Absolute deltas keep the result bit-identical under argument swap.
    let d_lat = (lat2 - lat1).abs().to_radians();
    let d_lon = (lon2 - lon1).abs().to_radians();

    let a = (d_lat * 0.5).sin().powi(2)
        + (lat1.to_radians().cos() * lat2.to_radians().cos()) * (d_lon * 0.5).sin().powi(2);
    let a = a.min(1.0);

    EARTH_RADIUS_KM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// A WGS-84 geographic coordinate in degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine distance to `other` in kilometres.
    #[inline]
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        haversine_km(self.lat, self.lon, other.lat, other.lon)
    }

    /// `false` for NaN/infinite components or latitudes outside ±90°.
    pub fn is_valid(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.lat.abs() <= 90.0
    }
}

impl From<[f64; 2]> for GeoPoint {
    /// `[lat, lng]`, the pair order used by the static coordinate table.
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}
