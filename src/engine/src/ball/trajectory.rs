use crate::ball::Waypoint;
use nalgebra::Vector3;

/// Builds the waypoint sequence for a kicked ball as a sampled arc between
/// two ground positions.
///
/// Sampling granularity is tied to the y displacement rather than the total
/// distance, so two kicks covering the same distance along different axes
/// produce different sample counts. Weak kicks over long distances get their
/// power re-derived so the ball still reaches the target.
pub fn generate_trajectory(from: Vector3<f64>, to: Vector3<f64>, power: f64) -> Vec<Waypoint> {
    let dx = to.x - from.x;
    let dy = to.y.floor() - from.y.floor();
    let distance = (dx * dx + dy * dy).sqrt();

    let power = if distance >= power {
        power.floor() + distance.floor()
    } else {
        power
    };

    // the radicand goes negative when power exceeds distance; the legacy
    // behavior keeps the absolute value rather than flattening the arc
    let apex = ((distance / 2.0).powi(2) - (power / 2.0).powi(2)).abs().sqrt();

    let span = (from.y - to.y).abs();
    let samples = span.round().max(1.0);
    let x_step = if span > 0.0 { (to.x - from.x) / span } else { 0.0 };
    let y_step = if to.y >= from.y { 1.0 } else { -1.0 };
    let height_step = apex / (samples / 2.0);

    let count = samples as usize;
    let mut waypoints = Vec::with_capacity(count);
    waypoints.push(Waypoint::new(from.x, from.y, 0.0));

    let mut height = 0.0;
    for step in 1..count {
        height += if step as f64 <= samples / 2.0 {
            height_step
        } else {
            -height_step
        };
        let x = round5(from.x + x_step * step as f64);
        let y = from.y.floor() + y_step * step as f64;
        waypoints.push(Waypoint::new(x, y, round5(height)));
    }

    waypoints
}

fn round5(value: f64) -> f64 {
    (value * 100_000.0).round() / 100_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_lofted_kick() {
        // distance 10 sits under the power of 20, so the power is kept and
        // the apex comes out of the abs-guarded radicand
        let waypoints = generate_trajectory(
            Vector3::new(50.0, 0.0, 0.0),
            Vector3::new(50.0, 10.0, 0.0),
            20.0,
        );

        assert_eq!(waypoints.len(), 10);
        assert_eq!(waypoints[0], Waypoint::new(50.0, 0.0, 0.0));

        let apex = (75.0_f64).sqrt();
        assert!((waypoints[5].height() - round_to_5(apex)).abs() < 1e-9);

        for (step, waypoint) in waypoints.iter().enumerate() {
            let (x, y) = waypoint.coords().unwrap();
            assert_eq!(x, 50.0);
            assert_eq!(y, step as f64);
        }
    }

    #[test]
    fn test_descent_mirrors_ascent() {
        let waypoints = generate_trajectory(
            Vector3::new(50.0, 0.0, 0.0),
            Vector3::new(50.0, 10.0, 0.0),
            20.0,
        );
        // one increment up from the start matches one increment short of the end
        assert!((waypoints[1].height() - waypoints[9].height()).abs() < 1e-9);
        assert!((waypoints[4].height() - waypoints[6].height()).abs() < 1e-9);
    }

    #[test]
    fn test_weak_kick_power_is_rederived() {
        // distance 100 >= power 10, so power becomes 10 + 100 = 110
        let waypoints = generate_trajectory(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(0.0, 100.0, 0.0),
            10.0,
        );
        assert_eq!(waypoints.len(), 100);

        let apex = ((50.0_f64).powi(2) - (55.0_f64).powi(2)).abs().sqrt();
        assert!((waypoints[50].height() - round_to_5(apex)).abs() < 1e-9);
    }

    #[test]
    fn test_sample_count_follows_y_displacement() {
        // a long kick that barely moves on y still gets a single sample
        let flat = generate_trajectory(
            Vector3::new(10.0, 5.0, 0.0),
            Vector3::new(400.0, 5.4, 0.0),
            80.0,
        );
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0], Waypoint::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn test_x_advances_linearly_with_floored_y() {
        let waypoints = generate_trajectory(
            Vector3::new(0.0, 20.0, 0.0),
            Vector3::new(10.0, 0.0, 0.0),
            300.0,
        );
        assert_eq!(waypoints.len(), 20);

        let (x, y) = waypoints[4].coords().unwrap();
        assert_eq!(x, 2.0);
        assert_eq!(y, 16.0);
    }

    fn round_to_5(value: f64) -> f64 {
        (value * 100_000.0).round() / 100_000.0
    }
}
