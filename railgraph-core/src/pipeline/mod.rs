//! Segment-wise simplification of a whole graph
//!
//! [`simplify`] feeds every segment of a [`Segmenter`] through an
//! [`Algorithm`] and writes the result into a destination store. Segments
//! sharing a junction reassemble there, because [`create_graph`] extends
//! nodes that already exist. [`run`] wires a [`SimplifyConfig`] to a
//! segmenter and reports the outcome.

mod config;

use std::time::Instant;

use hashbrown::HashSet;
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::geometry::{DistanceFn, LocalTangentPlane};
use crate::segment::{EsSegmenter, Segment, Segmenter, SegmenterKind, StationSplitter};
use crate::simplify::Algorithm;
use crate::store::{GraphStore, component_count, create_graph};
use crate::{Error, NodeId, TrackPoint};

pub use config::{SimplifyConfig, epsilon_for_zoom};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimplifyOptions {
    /// Project each segment into a local tangent plane around its first
    /// point before running the algorithm
    pub projection: bool,
    /// Simplify on the rayon pool. Segments are collected first and still
    /// written in order.
    pub parallel: bool,
}

impl Default for SimplifyOptions {
    fn default() -> Self {
        Self {
            projection: true,
            parallel: false,
        }
    }
}

/// Point counts of a [`simplify`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SimplifyReport {
    pub segments: usize,
    pub points_in: usize,
    pub points_out: usize,
}

impl SimplifyReport {
    fn record(&mut self, segment: &Segment, simplified: &[TrackPoint]) {
        self.segments += 1;
        self.points_in += segment.len();
        self.points_out += simplified.len();
    }
}

/// Outcome of [`run`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub simplify: SimplifyReport,
    pub nodes_before: usize,
    pub nodes_after: usize,
    pub components_before: usize,
    pub components_after: usize,
}

/// Simplifies every segment produced by `segmenter` with `algorithm` and
/// writes the kept points into `dest`, edge lengths computed by
/// `distance`.
///
/// The algorithm only decides which point ids survive: written points
/// always carry their original coordinates. Junctions a segment passes
/// through are kept so that branches stay attached.
///
/// # Errors
///
/// Invalid tolerances, non-finite coordinates and storage errors abort the
/// run. Nodes written before the failure stay in `dest`.
pub fn simplify<G, D, F>(
    segmenter: G,
    algorithm: &Algorithm,
    dest: &mut D,
    distance: &F,
    options: &SimplifyOptions,
) -> Result<SimplifyReport, Error>
where
    G: Segmenter,
    D: GraphStore + ?Sized,
    F: DistanceFn + ?Sized,
{
    algorithm.validate()?;

    let estimated = segmenter.estimated_num_segments().max(1);
    info!(
        "Applying {} to about {estimated} segments",
        algorithm.name()
    );

    let mut report = SimplifyReport::default();

    if options.parallel {
        let segments = segmenter.collect::<Result<Vec<Segment>, Error>>()?;
        let simplified = segments
            .par_iter()
            .map(|segment| simplify_segment(segment, algorithm, options.projection))
            .collect::<Result<Vec<_>, Error>>()?;

        for (segment, points) in segments.iter().zip(simplified) {
            create_graph(dest, &points, distance)?;
            report.record(segment, &points);
        }
    } else {
        for (i, segment) in segmenter.enumerate() {
            let segment = segment?;
            log_progress(algorithm, i, estimated);

            let points = simplify_segment(&segment, algorithm, options.projection)?;
            create_graph(dest, &points, distance)?;
            report.record(&segment, &points);
        }
    }

    info!(
        "Simplified {} segments, kept {} of {} points",
        report.segments, report.points_out, report.points_in
    );
    Ok(report)
}

#[allow(clippy::cast_precision_loss)]
fn log_progress(algorithm: &Algorithm, i: usize, estimated: usize) {
    debug!(
        "Applying {} to segment {} of {estimated} (estimated) ({:.2}%)",
        algorithm.name(),
        i + 1,
        (i as f64 / estimated as f64) * 100.0
    );
}

fn simplify_segment(
    segment: &Segment,
    algorithm: &Algorithm,
    projection: bool,
) -> Result<Vec<TrackPoint>, Error> {
    let points = segment.triplets();

    let simplified = match points.first() {
        Some(origin) if projection => {
            let plane = LocalTangentPlane::new(origin.coord());
            let projected: Vec<TrackPoint> = points
                .iter()
                .map(|p| p.with_coord(plane.project(p.coord())))
                .collect();
            algorithm.apply(&projected)?
        }
        _ => algorithm.apply(&points)?,
    };

    let mut kept: HashSet<NodeId> = simplified.iter().map(|p| p.id).collect();
    kept.extend(segment.interior_junctions());

    Ok(points
        .into_iter()
        .filter(|p| kept.contains(&p.id))
        .collect())
}

/// Simplifies `source` into `dest` as described by `config`.
///
/// `dest` is extended, not cleared. Node and connected component counts
/// of both graphs are logged and returned.
pub fn run<'a, S, D>(source: &'a S, dest: &mut D, config: &SimplifyConfig) -> Result<RunReport, Error>
where
    S: GraphStore + ?Sized,
    D: GraphStore + ?Sized,
{
    config.validate()?;

    let nodes_before = source.count()?;
    let components_before = component_count(source)?;

    let segmenter: Box<dyn Segmenter + 'a> = match config.segmenter {
        SegmenterKind::Endpoints => Box::new(EsSegmenter::new(source)?),
        SegmenterKind::Continuous => Box::new(EsSegmenter::continuous(source)?),
    };
    let segmenter: Box<dyn Segmenter + 'a> = if config.stations.is_empty() {
        segmenter
    } else {
        Box::new(StationSplitter::new(
            segmenter,
            config.stations.iter().copied(),
        ))
    };

    let options = config.options();
    let simplified = timed("simplify", || {
        simplify(segmenter, &config.algorithm, dest, &config.distance, &options)
    })?;

    let nodes_after = dest.count()?;
    let components_after = component_count(dest)?;

    log_change(nodes_after, nodes_before);
    if components_after != components_before {
        warn!("Connected components changed from {components_before} to {components_after}");
    }

    Ok(RunReport {
        simplify: simplified,
        nodes_before,
        nodes_after,
        components_before,
        components_after,
    })
}

/// Runs `step`, logging its start and how long it took.
pub fn timed<T>(name: &str, step: impl FnOnce() -> Result<T, Error>) -> Result<T, Error> {
    info!("=> Starting step '{name}'");
    let start = Instant::now();
    let result = step();
    info!("<= Step '{name}' finished (took {:.2?})", start.elapsed());
    result
}

/// Logs and returns a summary of a change in node count.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]
pub fn log_change(after: usize, before: usize) -> String {
    let removed = before as i64 - after as i64;
    let change = if before == 0 {
        0.0
    } else {
        removed as f64 / before as f64 * 100.0
    };

    let message = format!(
        "Reduced to {after} nodes from {before} nodes. Change: -{removed} (-{change:.3}%)"
    );
    info!("{message}");
    message
}
