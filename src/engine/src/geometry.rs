use crate::state::{PitchHalf, PitchSize};
use nalgebra::Vector3;

pub const GOAL_MOUTH_HALF_WIDTH: f64 = 50.0;

const PENALTY_BOX_MARGIN: f64 = 5.0;
const GOAL_AREA_MARGIN: f64 = 5.0;

pub fn is_between(value: f64, low: f64, high: f64) -> bool {
    value >= low && value <= high
}

/// Planar distance, ignoring height.
pub fn ground_distance(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

pub fn clamp_to_pitch(position: Vector3<f64>, pitch: &PitchSize) -> Vector3<f64> {
    Vector3::new(
        position.x.clamp(0.0, pitch.width),
        position.y.clamp(0.0, pitch.height),
        position.z,
    )
}

pub fn within_goal_mouth(pitch: &PitchSize, x: f64) -> bool {
    let center = pitch.width / 2.0;
    is_between(
        x,
        center - GOAL_MOUTH_HALF_WIDTH,
        center + GOAL_MOUTH_HALF_WIDTH,
    )
}

/// The wide (penalty) box in front of the top goal.
pub fn in_top_penalty_box(pitch: &PitchSize, position: &Vector3<f64>) -> bool {
    is_between(
        position.x,
        pitch.width / 4.0 - PENALTY_BOX_MARGIN,
        pitch.width * 3.0 / 4.0 + PENALTY_BOX_MARGIN,
    ) && position.y <= pitch.height / 6.0 + PENALTY_BOX_MARGIN
}

/// The wide (penalty) box in front of the bottom goal.
pub fn in_bottom_penalty_box(pitch: &PitchSize, position: &Vector3<f64>) -> bool {
    is_between(
        position.x,
        pitch.width / 4.0 - PENALTY_BOX_MARGIN,
        pitch.width * 3.0 / 4.0 + PENALTY_BOX_MARGIN,
    ) && position.y >= pitch.height - pitch.height / 6.0 - PENALTY_BOX_MARGIN
}

/// The close (goal) area in front of the top goal.
pub fn in_top_goal_area(pitch: &PitchSize, position: &Vector3<f64>) -> bool {
    is_between(
        position.x,
        pitch.width * 3.0 / 8.0 - GOAL_AREA_MARGIN,
        pitch.width * 5.0 / 8.0 + GOAL_AREA_MARGIN,
    ) && position.y <= pitch.height / 12.0 + GOAL_AREA_MARGIN
}

/// The close (goal) area in front of the bottom goal.
pub fn in_bottom_goal_area(pitch: &PitchSize, position: &Vector3<f64>) -> bool {
    is_between(
        position.x,
        pitch.width * 3.0 / 8.0 - GOAL_AREA_MARGIN,
        pitch.width * 5.0 / 8.0 + GOAL_AREA_MARGIN,
    ) && position.y >= pitch.height - pitch.height / 12.0 - GOAL_AREA_MARGIN
}

pub fn in_penalty_box(pitch: &PitchSize, position: &Vector3<f64>, end: PitchHalf) -> bool {
    match end {
        PitchHalf::Top => in_top_penalty_box(pitch, position),
        PitchHalf::Bottom => in_bottom_penalty_box(pitch, position),
    }
}

/// Depth of the last outfield defender protecting the given goal. Attackers
/// level with or beyond this line are candidates for an offside flag.
pub fn offside_line(defender_depths: impl Iterator<Item = f64>, end: PitchHalf) -> f64 {
    match end {
        PitchHalf::Top => defender_depths.fold(f64::MAX, f64::min),
        PitchHalf::Bottom => defender_depths.fold(f64::MIN, f64::max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pitch() -> PitchSize {
        PitchSize::new(680.0, 1050.0)
    }

    #[test]
    fn test_clamp_to_pitch() {
        let clamped = clamp_to_pitch(Vector3::new(-10.0, 2000.0, 3.0), &pitch());
        assert_eq!(clamped, Vector3::new(0.0, 1050.0, 3.0));
    }

    #[test]
    fn test_is_between_edges() {
        assert!(is_between(0.0, 0.0, 10.0));
        assert!(is_between(10.0, 0.0, 10.0));
        assert!(!is_between(10.1, 0.0, 10.0));
    }

    #[test]
    fn test_goal_mouth() {
        let pitch = pitch();
        assert!(within_goal_mouth(&pitch, 340.0));
        assert!(within_goal_mouth(&pitch, 290.0));
        assert!(!within_goal_mouth(&pitch, 289.9));
    }

    #[test]
    fn test_wide_box_margins() {
        let pitch = pitch();
        // 680 / 4 - 5 = 165 is the left margin edge
        assert!(in_top_penalty_box(&pitch, &Vector3::new(165.0, 100.0, 0.0)));
        assert!(!in_top_penalty_box(&pitch, &Vector3::new(164.9, 100.0, 0.0)));
        // 1050 / 6 + 5 = 180 is the depth edge
        assert!(in_top_penalty_box(&pitch, &Vector3::new(340.0, 180.0, 0.0)));
        assert!(!in_top_penalty_box(&pitch, &Vector3::new(340.0, 180.1, 0.0)));
    }

    #[test]
    fn test_bottom_box_mirrors_top() {
        let pitch = pitch();
        assert!(in_bottom_penalty_box(&pitch, &Vector3::new(340.0, 1050.0 - 100.0, 0.0)));
        assert!(!in_bottom_penalty_box(&pitch, &Vector3::new(340.0, 500.0, 0.0)));
    }

    #[test]
    fn test_close_box_is_tighter_than_wide_box() {
        let pitch = pitch();
        let wide_only = Vector3::new(200.0, 100.0, 0.0);
        assert!(in_top_penalty_box(&pitch, &wide_only));
        assert!(!in_top_goal_area(&pitch, &wide_only));

        let close = Vector3::new(340.0, 60.0, 0.0);
        assert!(in_top_goal_area(&pitch, &close));
    }

    #[test]
    fn test_offside_line_picks_deepest_defender() {
        let depths = [300.0, 120.0, 450.0];
        assert_eq!(offside_line(depths.iter().copied(), PitchHalf::Top), 120.0);
        assert_eq!(offside_line(depths.iter().copied(), PitchHalf::Bottom), 450.0);
    }
}
