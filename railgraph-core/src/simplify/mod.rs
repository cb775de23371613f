//! Polyline simplification algorithms
//!
//! Every algorithm takes the ordered `(x, y, id)` points of one segment and
//! returns a subsequence of them: points are never reordered, moved or
//! invented. Lists with fewer than three points are returned unchanged.

mod anglereduce;
mod rdp;
mod rminner;

use serde::{Deserialize, Serialize};

use crate::{Error, TrackPoint};

pub use anglereduce::anglereduce;
pub use rdp::rdp;
pub use rminner::rminner;

/// A simplification algorithm together with its tolerance.
///
/// Deserializes from `{"name": "rdp", "epsilon": 0.5}`,
/// `{"name": "angle_reduce", "epsilon": 150}` or `{"name": "remove_inner"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Algorithm {
    /// Ramer-Douglas-Peucker with a distance tolerance in coordinate units
    Rdp { epsilon: f64 },
    /// Angle reduction with a tolerance in degrees
    AngleReduce { epsilon: f64 },
    /// Keep only the first and the last point
    RemoveInner,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Rdp { epsilon: 0.0 }
    }
}

impl Algorithm {
    pub fn apply(&self, points: &[TrackPoint]) -> Result<Vec<TrackPoint>, Error> {
        match *self {
            Algorithm::Rdp { epsilon } => rdp(points, epsilon),
            Algorithm::AngleReduce { epsilon } => anglereduce(points, epsilon),
            Algorithm::RemoveInner => Ok(rminner(points)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Rdp { .. } => "rdp",
            Algorithm::AngleReduce { .. } => "angle_reduce",
            Algorithm::RemoveInner => "remove_inner",
        }
    }

    /// Checks the tolerance without running the algorithm.
    pub fn validate(&self) -> Result<(), Error> {
        match *self {
            Algorithm::Rdp { epsilon } => rdp::check_epsilon(epsilon),
            Algorithm::AngleReduce { epsilon } => anglereduce::check_epsilon(epsilon),
            Algorithm::RemoveInner => Ok(()),
        }
    }
}

fn check_finite(points: &[TrackPoint]) -> Result<(), Error> {
    match points.iter().find(|p| !p.is_finite()) {
        Some(p) => Err(Error::InvalidInput(format!(
            "Point {} has a non-finite location ({}, {})",
            p.id, p.x, p.y
        ))),
        None => Ok(()),
    }
}
