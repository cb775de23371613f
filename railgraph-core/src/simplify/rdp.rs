use super::check_finite;
use crate::geometry::perpendicular_distance;
use crate::{Error, TrackPoint};

pub(super) fn check_epsilon(epsilon: f64) -> Result<(), Error> {
    if epsilon.is_finite() && epsilon >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "RDP epsilon must be a finite non-negative number, got {epsilon}"
        )))
    }
}

/// Ramer-Douglas-Peucker simplification.
///
/// Finds the point farthest from the line through the first and the last
/// point. If its distance exceeds `epsilon` both halves split at that point
/// are simplified in turn, otherwise only the two endpoints are kept. The
/// first maximum wins on ties.
///
/// The chain is processed with an explicit stack, so long straight lines
/// don't grow the call stack.
///
/// # Errors
///
/// [`Error::InvalidArgument`] for a negative or non-finite `epsilon`,
/// [`Error::InvalidInput`] for non-finite coordinates.
pub fn rdp(points: &[TrackPoint], epsilon: f64) -> Result<Vec<TrackPoint>, Error> {
    check_epsilon(epsilon)?;
    check_finite(points)?;

    if points.len() < 3 {
        return Ok(points.to_vec());
    }

    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut stack = vec![(0, last)];
    while let Some((start, end)) = stack.pop() {
        if end - start < 2 {
            continue;
        }

        let (a, b) = (points[start].coord(), points[end].coord());
        let mut dmax = 0.0;
        let mut index = start;
        for (i, point) in points.iter().enumerate().take(end).skip(start + 1) {
            let d = perpendicular_distance(point.coord(), a, b);
            if d > dmax {
                index = i;
                dmax = d;
            }
        }

        if dmax > epsilon {
            keep[index] = true;
            stack.push((index, end));
            stack.push((start, index));
        }
    }

    Ok(points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeId;

    fn points(data: &[(f64, f64, NodeId)]) -> Vec<TrackPoint> {
        data.iter().copied().map(TrackPoint::from).collect()
    }

    fn ids(points: &[TrackPoint]) -> Vec<NodeId> {
        points.iter().map(|p| p.id).collect()
    }

    fn zigzag() -> Vec<TrackPoint> {
        points(&[(0.0, 0.0, 1), (1.0, 1.0, 2), (2.0, 0.0, 3), (3.0, 1.0, 4), (4.0, 0.0, 5)])
    }

    /// A wavy line with uneven amplitude
    fn wave(n: usize) -> Vec<TrackPoint> {
        (0..n)
            .map(|i| {
                let x = i as f64 * 0.1;
                TrackPoint::new(x, (x * 1.7).sin() * (1.0 + (x * 0.3).cos()), i as NodeId)
            })
            .collect()
    }

    #[test]
    fn collinear_points_collapse() {
        let line = points(&[(1.0, 1.0, 1), (2.0, 1.0, 2), (4.0, 1.0, 3), (6.0, 1.0, 4)]);
        let expected = points(&[(1.0, 1.0, 1), (6.0, 1.0, 4)]);
        assert_eq!(rdp(&line, 0.0).unwrap(), expected);
        assert_eq!(rdp(&line, 5.0).unwrap(), expected);
    }

    #[test]
    fn vertical_line_collapses() {
        let line = points(&[(3.0, 1.0, 1), (3.0, 2.0, 2), (3.0, 5.0, 3), (3.0, 7.0, 4)]);
        assert_eq!(ids(&rdp(&line, 0.0).unwrap()), vec![1, 4]);
    }

    #[test]
    fn tolerance_controls_kept_points() {
        let zigzag = zigzag();
        assert_eq!(ids(&rdp(&zigzag, 0.5).unwrap()), vec![1, 2, 3, 4, 5]);
        assert_eq!(ids(&rdp(&zigzag, 0.8).unwrap()), vec![1, 2, 5]);
        assert_eq!(ids(&rdp(&zigzag, 1.5).unwrap()), vec![1, 5]);
    }

    #[test]
    fn short_lists_are_unchanged() {
        let two = points(&[(0.0, 0.0, 1), (5.0, 5.0, 2)]);
        assert_eq!(rdp(&two, 1.0).unwrap(), two);
        assert!(rdp(&[], 1.0).unwrap().is_empty());
    }

    #[test]
    fn idempotent_and_keeps_endpoints() {
        let line = wave(400);
        for epsilon in [0.0, 0.001, 0.05, 0.3, 2.0] {
            let once = rdp(&line, epsilon).unwrap();
            assert_eq!(rdp(&once, epsilon).unwrap(), once, "epsilon {epsilon}");
            assert_eq!(once.first(), line.first());
            assert_eq!(once.last(), line.last());
        }
    }

    #[test]
    fn result_is_a_subsequence() {
        let line = wave(200);
        let simplified = rdp(&line, 0.05).unwrap();
        let mut remaining = line.iter();
        assert!(
            simplified
                .iter()
                .all(|p| remaining.any(|original| original == p))
        );
    }

    #[test]
    fn invalid_epsilon() {
        let zigzag = zigzag();
        for epsilon in [-0.1, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                rdp(&zigzag, epsilon),
                Err(Error::InvalidArgument(_))
            ));
        }
    }
}
