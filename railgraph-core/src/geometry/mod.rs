//! Planar and spherical primitives shared by the segmenter and the
//! simplification algorithms.

mod projection;

use geo::{Coord, Distance as _, Euclidean, Point};
use serde::{Deserialize, Serialize};

pub use projection::LocalTangentPlane;

/// Equatorial radius (WGS84) in meters
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Number of decimal digits angles and cosines are rounded to
pub const ANGLE_PRECISION: i32 = 10;

/// Straight-line distance between `a` and `b`.
pub fn euclidean_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Euclidean.distance(Point::from(a), Point::from(b))
}

/// Haversine distance in meters between two `(longitude, latitude)` pairs
/// given in degrees.
pub fn great_circle_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let (lon1, lat1) = (a.x, a.y);
    let (lon2, lat2) = (b.x, b.y);

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS * c
}

/// Distance of `p` to the infinite line through `a` and `b`.
///
/// Uses the slope-intercept form `d = |k·px − py + m| / sqrt(k² + 1)`.
/// Degrades to the point distance `|p - a|` if `a == b`; a vertical line
/// yields the horizontal offset `|a.x - p.x|`.
pub fn perpendicular_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    if a == b {
        return euclidean_distance(p, a);
    }

    if a.x == b.x {
        return (a.x - p.x).abs();
    }

    let k = (b.y - a.y) / (b.x - a.x);
    let m = a.y - k * a.x;

    (k * p.x - p.y + m).abs() / (k * k + 1.0).sqrt()
}

/// Angle between the vectors `v1` and `v2` in degrees.
///
/// The cosine is rounded to [`ANGLE_PRECISION`] digits before `acos` so
/// that collinear vectors don't fall out of the domain. Returns `None` if
/// the angle is undefined (e.g. a zero-length vector).
pub fn angle_between(v1: Coord<f64>, v2: Coord<f64>) -> Option<f64> {
    let norm_v = v1.x.hypot(v1.y);
    let norm_w = v2.x.hypot(v2.y);

    let dot = v1.x * v2.x + v1.y * v2.y;
    let cos_angle = round_to_precision(dot / norm_v / norm_w);

    if (-1.0..=1.0).contains(&cos_angle) {
        Some(round_to_precision(cos_angle.acos().to_degrees()))
    } else {
        None
    }
}

/// Angle at `vertex` enclosed by the rays towards `a` and `c`.
///
/// ```text
///  a       c
///   \     /
///    \   /
///     \ /
///    vertex
/// ```
pub fn angle_at_vertex(a: Coord<f64>, vertex: Coord<f64>, c: Coord<f64>) -> Option<f64> {
    angle_between(a - vertex, c - vertex)
}

/// Arithmetic mean of two coordinates.
pub fn midpoint(a: Coord<f64>, b: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    }
}

/// Area of the triangle `a`, `b`, `c`.
pub fn triangle_area(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>) -> f64 {
    0.5 * euclidean_distance(a, b) * perpendicular_distance(c, a, b)
}

fn round_to_precision(value: f64) -> f64 {
    let factor = 10f64.powi(ANGLE_PRECISION);
    (value * factor).round() / factor
}

/// Pairwise distance between two node locations.
///
/// Injected wherever edge weights are computed: graph construction,
/// merging and distance recomputation. Any `Fn(Point, Point) -> f64`
/// qualifies.
pub trait DistanceFn: Sync {
    fn distance(&self, a: Point<f64>, b: Point<f64>) -> f64;
}

impl<F> DistanceFn for F
where
    F: Fn(Point<f64>, Point<f64>) -> f64 + Sync,
{
    fn distance(&self, a: Point<f64>, b: Point<f64>) -> f64 {
        self(a, b)
    }
}

/// Built-in distance functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distance {
    /// Planar distance in coordinate units
    Euclidean,
    /// Haversine distance in meters, coordinates are (lon, lat)
    #[default]
    GreatCircle,
}

impl DistanceFn for Distance {
    fn distance(&self, a: Point<f64>, b: Point<f64>) -> f64 {
        match self {
            Distance::Euclidean => euclidean_distance(a.0, b.0),
            Distance::GreatCircle => great_circle_distance(a.0, b.0),
        }
    }
}
