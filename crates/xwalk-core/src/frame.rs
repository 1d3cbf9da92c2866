//! Reference frame and point types for the local tangent plane.

use serde::{Deserialize, Serialize};

/// WGS84 semi-major axis in meters.
const WGS84_A: f64 = 6_378_137.0;

/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeodeticPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// A point in the local planar frame, meters from the frame origin.
///
/// `x` grows east and `y` grows north.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in meters.
    pub fn distance(&self, other: &PlanarPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Typed inputs for building a [`ReferenceFrame`].
///
/// Radian fields are optional. When absent they are derived from the degree
/// fields; supplying them reproduces stored results computed from survey
/// constants exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameParams {
    pub lat0_deg: f64,
    pub lon0_deg: f64,
    #[serde(default)]
    pub lat0_rad: Option<f64>,
    #[serde(default)]
    pub lon0_rad: Option<f64>,
    #[serde(default)]
    pub alt0_m: f64,
    pub radius_ew_m: f64,
    pub radius_ns_m: f64,
    /// Local frame translation east, meters.
    #[serde(default)]
    pub x_m: f64,
    /// Local frame translation north, meters.
    #[serde(default)]
    pub y_m: f64,
    /// Local frame rotation, radians.
    #[serde(default)]
    pub rotation_rad: f64,
}

impl FrameParams {
    /// Survey origin of the Martinez CCTA route.
    #[allow(clippy::excessive_precision)]
    pub fn ccta_martinez() -> Self {
        Self {
            lat0_deg: 38.002_479_553_199_997_04,
            lon0_deg: -122.126_701_354_999_994_46,
            lat0_rad: Some(0.663_268_392_125_163_53),
            lon0_rad: Some(-2.131_513_043_244_570_14),
            alt0_m: 37.431_568_145_800_000_02,
            radius_ew_m: 6_386_245.375_029_551_796_615_12,
            radius_ns_m: 6_359_632.340_417_581_610_381_6,
            x_m: 0.0,
            y_m: 0.0,
            rotation_rad: 0.0,
        }
    }

    /// Build parameters for an arbitrary origin, deriving the local radii
    /// from the WGS84 ellipsoid.
    ///
    /// East-west uses the prime-vertical radius of curvature, north-south the
    /// meridional radius.
    pub fn from_origin(lat0_deg: f64, lon0_deg: f64, alt0_m: f64) -> Self {
        let (radius_ew_m, radius_ns_m) = wgs84_local_radii(lat0_deg);
        Self {
            lat0_deg,
            lon0_deg,
            lat0_rad: None,
            lon0_rad: None,
            alt0_m,
            radius_ew_m,
            radius_ns_m,
            x_m: 0.0,
            y_m: 0.0,
            rotation_rad: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation_rad: f64) -> Self {
        self.rotation_rad = rotation_rad;
        self
    }

    pub fn with_translation(mut self, x_m: f64, y_m: f64) -> Self {
        self.x_m = x_m;
        self.y_m = y_m;
        self
    }
}

/// (east-west, north-south) radii of curvature at `lat_deg`, meters.
pub fn wgs84_local_radii(lat_deg: f64) -> (f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let sin_lat = lat_deg.to_radians().sin();
    let w = 1.0 - e2 * sin_lat * sin_lat;
    let prime_vertical = WGS84_A / w.sqrt();
    let meridional = WGS84_A * (1.0 - e2) / (w * w.sqrt());
    (prime_vertical, meridional)
}

/// Immutable local tangent plane anchored at a geodetic origin.
///
/// All derived fields are computed once in [`ReferenceFrame::new`]; the value
/// is `Copy` and carries no interior mutability, so it can be shared across
/// threads without synchronization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceFrame {
    lat0_deg: f64,
    lon0_deg: f64,
    lat0_rad: f64,
    lon0_rad: f64,
    alt0_m: f64,
    radius_ew_m: f64,
    radius_ns_m: f64,
    rotation_rad: f64,
    x_inv: f64,
    y_inv: f64,
    t_inv: f64,
}

impl ReferenceFrame {
    pub fn new(params: FrameParams) -> Self {
        let t = params.rotation_rad;
        let (s, c) = t.sin_cos();
        Self {
            lat0_deg: params.lat0_deg,
            lon0_deg: params.lon0_deg,
            lat0_rad: params.lat0_rad.unwrap_or_else(|| params.lat0_deg.to_radians()),
            lon0_rad: params.lon0_rad.unwrap_or_else(|| params.lon0_deg.to_radians()),
            alt0_m: params.alt0_m,
            radius_ew_m: params.radius_ew_m,
            radius_ns_m: params.radius_ns_m,
            rotation_rad: t,
            x_inv: -c * params.x_m - s * params.y_m,
            y_inv: s * params.x_m - c * params.y_m,
            t_inv: -t,
        }
    }

    /// The deployment frame of the Martinez CCTA route.
    pub fn ccta_martinez() -> Self {
        Self::new(FrameParams::ccta_martinez())
    }

    pub fn origin(&self) -> GeodeticPoint {
        GeodeticPoint::new(self.lat0_deg, self.lon0_deg)
    }

    pub fn lat0_rad(&self) -> f64 {
        self.lat0_rad
    }

    pub fn lon0_rad(&self) -> f64 {
        self.lon0_rad
    }

    pub fn alt0_m(&self) -> f64 {
        self.alt0_m
    }

    pub fn radius_ew_m(&self) -> f64 {
        self.radius_ew_m
    }

    pub fn radius_ns_m(&self) -> f64 {
        self.radius_ns_m
    }

    pub fn rotation_rad(&self) -> f64 {
        self.rotation_rad
    }

    /// Inverse-rotation parameters `(x_inv, y_inv, t_inv)`.
    pub fn inverse_rotation(&self) -> (f64, f64, f64) {
        (self.x_inv, self.y_inv, self.t_inv)
    }
}

impl Default for ReferenceFrame {
    fn default() -> Self {
        Self::ccta_martinez()
    }
}
