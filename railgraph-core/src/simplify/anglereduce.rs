use super::check_finite;
use crate::geometry::angle_at_vertex;
use crate::{Error, TrackPoint};

pub(super) fn check_epsilon(epsilon: f64) -> Result<(), Error> {
    if epsilon > 0.0 && epsilon <= 180.0 {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "Angle epsilon must be in (0, 180], got {epsilon}"
        )))
    }
}

/// Angle-based reduction.
///
/// Sweeps from the second to the second-to-last point and measures the
/// angle each point encloses with its current neighbors. A point is kept
/// if that angle is defined, non-zero and strictly smaller than `epsilon`
/// degrees; otherwise it is dropped and its successor is tested against
/// the same predecessor. Straight stretches (180°) are therefore always
/// removed.
///
/// # Errors
///
/// [`Error::InvalidArgument`] unless `0 < epsilon <= 180`,
/// [`Error::InvalidInput`] for non-finite coordinates.
pub fn anglereduce(points: &[TrackPoint], epsilon: f64) -> Result<Vec<TrackPoint>, Error> {
    check_epsilon(epsilon)?;
    check_finite(points)?;

    let [first, rest @ .., last] = points else {
        return Ok(points.to_vec());
    };
    if rest.is_empty() {
        return Ok(points.to_vec());
    }

    let mut reduced = Vec::with_capacity(points.len());
    reduced.push(*first);

    let mut candidate = rest[0];
    for next in rest[1..].iter().chain(std::iter::once(last)) {
        let prev = reduced.last().copied().unwrap_or(*first);
        let keep = matches!(
            angle_at_vertex(prev.coord(), candidate.coord(), next.coord()),
            Some(angle) if angle > 0.0 && angle < epsilon
        );
        if keep {
            reduced.push(candidate);
        }
        candidate = *next;
    }

    reduced.push(*last);
    Ok(reduced)
}
