use std::f32::consts::PI;
use std::time::Duration;

use glam::Mat4;

/// Rotation angle for one frame.
///
/// A pure function of elapsed wall-clock time: the angle in radians
/// increases 1:1 with seconds since loop start, so the animation speed is
/// independent of frame rate and never drifts.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationState {
    /// Angle in radians.
    pub radians: f32,
}

impl RotationState {
    /// Rotation after `elapsed` time.
    pub fn at(elapsed: Duration) -> Self {
        Self {
            radians: elapsed.as_secs_f32(),
        }
    }

    /// Angle in degrees. Diagnostic output only; the transform always
    /// consumes radians.
    pub fn degrees(&self) -> f32 {
        self.radians * (180.0 / PI)
    }

    /// Rotation about the Z axis by this angle.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_z(self.radians)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    // ── angle ─────────────────────────────────────────────────────────────

    #[test]
    fn radians_track_elapsed_seconds() {
        assert_eq!(RotationState::at(Duration::ZERO).radians, 0.0);
        assert_eq!(RotationState::at(Duration::from_secs(2)).radians, 2.0);
        assert!(approx(
            RotationState::at(Duration::from_millis(1500)).radians,
            1.5
        ));
    }

    #[test]
    fn degrees_conversion() {
        let half_turn = RotationState { radians: PI };
        assert!(approx(half_turn.degrees(), 180.0));
        assert_eq!(RotationState { radians: 0.0 }.degrees(), 0.0);
    }

    // ── transform ─────────────────────────────────────────────────────────

    #[test]
    fn transform_at_zero_is_identity() {
        assert_eq!(RotationState::at(Duration::ZERO).transform(), Mat4::IDENTITY);
    }

    #[test]
    fn transform_is_pure_z_rotation() {
        let angle = 0.75_f32;
        let m = RotationState { radians: angle }.transform().to_cols_array_2d();

        assert!(approx(m[0][0], angle.cos()));
        assert!(approx(m[0][1], angle.sin()));
        assert!(approx(m[1][0], -angle.sin()));
        assert!(approx(m[1][1], angle.cos()));
        assert!(approx(m[2][2], 1.0));
        assert!(approx(m[3][3], 1.0));
    }

    #[test]
    fn transform_preserves_z_axis() {
        let m = RotationState { radians: 1.2 }.transform();
        let z = m * glam::Vec4::new(0.0, 0.0, 1.0, 0.0);
        assert!(approx(z.x, 0.0));
        assert!(approx(z.y, 0.0));
        assert!(approx(z.z, 1.0));
    }
}
