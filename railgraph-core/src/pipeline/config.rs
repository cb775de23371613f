use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hashbrown::HashSet;
use log::warn;
use serde::{Deserialize, Serialize};

use super::SimplifyOptions;
use crate::geometry::Distance;
use crate::segment::SegmenterKind;
use crate::simplify::Algorithm;
use crate::{Error, NodeId};

/// Settings of a simplification run.
///
/// ```json
/// {
///     "algorithm": { "name": "rdp", "epsilon": 12.0 },
///     "segmenter": "continuous",
///     "stations": [1001, 1002],
///     "distance": "great_circle",
///     "projection": true,
///     "parallel": false
/// }
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplifyConfig {
    pub algorithm: Algorithm,
    pub segmenter: SegmenterKind,
    /// Segments are split at these nodes
    pub stations: Vec<NodeId>,
    /// Used for the edge lengths of the destination graph
    pub distance: Distance,
    /// Run the algorithm on coordinates projected to a local plane, so
    /// that tolerances are in meters for `(lon, lat)` data
    pub projection: bool,
    /// Simplify segments on the rayon thread pool
    pub parallel: bool,
}

impl Default for SimplifyConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::default(),
            segmenter: SegmenterKind::default(),
            stations: Vec::new(),
            distance: Distance::default(),
            projection: true,
            parallel: false,
        }
    }
}

impl SimplifyConfig {
    pub fn from_json_str(json: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the algorithm tolerance. Duplicate station ids are only
    /// reported.
    pub fn validate(&self) -> Result<(), Error> {
        self.algorithm.validate()?;

        let unique: HashSet<NodeId> = self.stations.iter().copied().collect();
        if unique.len() != self.stations.len() {
            warn!(
                "{} duplicate station ids in the configuration",
                self.stations.len() - unique.len()
            );
        }

        Ok(())
    }

    pub fn options(&self) -> SimplifyOptions {
        SimplifyOptions {
            projection: self.projection,
            parallel: self.parallel,
        }
    }
}

/// Tolerance growing linearly by `k` for every zoom level below 16.
pub fn epsilon_for_zoom(zoom: u8, k: f64) -> f64 {
    k * (16.0 - f64::from(zoom))
}
