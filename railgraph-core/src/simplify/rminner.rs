use crate::TrackPoint;

/// Drops every inner point, keeping only the first and the last one.
pub fn rminner(points: &[TrackPoint]) -> Vec<TrackPoint> {
    match points {
        [first, _, .., last] => vec![*first, *last],
        _ => points.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_endpoints() {
        let points: Vec<TrackPoint> = (0..5)
            .map(|i| TrackPoint::new(i as f64, (i * i) as f64, i))
            .collect();
        assert_eq!(rminner(&points), vec![points[0], points[4]]);
        assert_eq!(rminner(&points[..2]), points[..2].to_vec());
        assert_eq!(rminner(&points[..1]), points[..1].to_vec());
    }
}
