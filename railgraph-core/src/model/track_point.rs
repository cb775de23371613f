use geo::{Coord, Point};

use crate::NodeId;

/// A point of a polyline together with the id of the node it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
    pub id: NodeId,
}

impl TrackPoint {
    pub fn new(x: f64, y: f64, id: NodeId) -> Self {
        Self { x, y, id }
    }

    pub fn coord(&self) -> Coord<f64> {
        Coord {
            x: self.x,
            y: self.y,
        }
    }

    pub fn point(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }

    /// Same id, different location
    pub fn with_coord(&self, coord: Coord<f64>) -> Self {
        Self {
            x: coord.x,
            y: coord.y,
            id: self.id,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f64, f64, NodeId)> for TrackPoint {
    fn from((x, y, id): (f64, f64, NodeId)) -> Self {
        Self::new(x, y, id)
    }
}
