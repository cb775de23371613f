use geo::Coord;

use super::EARTH_RADIUS;

/// Equirectangular projection centered at an origin `(lon0, lat0)`.
///
/// Maps `(lon, lat)` in degrees to `(x, y)` in meters:
/// `x = R * cos(lat0) * dlon`, `y = R * dlat`. Accurate enough for the
/// extent of a single track segment, which is what perpendicular
/// distances are measured on.
#[derive(Debug, Clone, Copy)]
pub struct LocalTangentPlane {
    origin_lon_rad: f64,
    origin_lat_rad: f64,
    cos_lat0: f64,
}

impl LocalTangentPlane {
    pub fn new(origin: Coord<f64>) -> Self {
        let origin_lon_rad = origin.x.to_radians();
        let origin_lat_rad = origin.y.to_radians();
        Self {
            origin_lon_rad,
            origin_lat_rad,
            cos_lat0: origin_lat_rad.cos(),
        }
    }

    pub fn project(&self, lonlat: Coord<f64>) -> Coord<f64> {
        let dlon = lonlat.x.to_radians() - self.origin_lon_rad;
        let dlat = lonlat.y.to_radians() - self.origin_lat_rad;
        Coord {
            x: EARTH_RADIUS * self.cos_lat0 * dlon,
            y: EARTH_RADIUS * dlat,
        }
    }

    pub fn unproject(&self, xy: Coord<f64>) -> Coord<f64> {
        let dlon = xy.x / (EARTH_RADIUS * self.cos_lat0);
        let dlat = xy.y / EARTH_RADIUS;
        Coord {
            x: (self.origin_lon_rad + dlon).to_degrees(),
            y: (self.origin_lat_rad + dlat).to_degrees(),
        }
    }
}
