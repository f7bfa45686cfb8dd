//! Mouse-driven orbit controller for the viewer camera.

use glam::Vec3;
use winit::event::MouseButton;

use crate::camera::Camera;
use crate::input::Input;

/// A camera controller that orbits around a target point.
///
/// Dragging with the left mouse button orbits, the scroll wheel zooms.
/// Each frame the controller computes the eye position from its spherical
/// coordinates and applies it to the core [`Camera`].
#[derive(Clone, Debug)]
pub struct OrbitCamera {
    /// Point the camera orbits around.
    pub target: Vec3,
    /// Distance from target.
    pub distance: f32,
    /// Horizontal angle in radians (yaw).
    pub azimuth: f32,
    /// Vertical angle in radians (pitch), clamped to avoid gimbal lock.
    pub elevation: f32,
    /// Mouse drag sensitivity.
    pub sensitivity: f32,
    /// Scroll zoom sensitivity.
    pub zoom_sensitivity: f32,
    /// Minimum distance from target.
    pub min_distance: f32,
    /// Maximum distance from target.
    pub max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            distance: 5.0,
            azimuth: 0.0,
            elevation: 0.0,
            sensitivity: 0.005,
            zoom_sensitivity: 0.5,
            min_distance: 1.5,
            max_distance: 50.0,
        }
    }
}

impl OrbitCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target point to orbit around.
    pub fn target(mut self, target: Vec3) -> Self {
        self.target = target;
        self
    }

    /// Set the distance from target.
    pub fn distance(mut self, distance: f32) -> Self {
        self.distance = distance.clamp(self.min_distance, self.max_distance);
        self
    }

    /// Update the orbit angles and zoom from this frame's input.
    pub fn update(&mut self, input: &Input) {
        if input.mouse_down(MouseButton::Left) {
            let delta = input.mouse_delta();
            self.azimuth -= delta.x * self.sensitivity;
            self.elevation += delta.y * self.sensitivity;

            // Clamp elevation to avoid gimbal lock
            self.elevation = self.elevation.clamp(
                -std::f32::consts::FRAC_PI_2 + 0.01,
                std::f32::consts::FRAC_PI_2 - 0.01,
            );
        }

        let scroll = input.scroll_delta();
        if scroll.y.abs() > 0.0 {
            self.distance -= scroll.y * self.zoom_sensitivity;
            self.distance = self.distance.clamp(self.min_distance, self.max_distance);
        }
    }

    /// The eye position in world space.
    pub fn eye(&self) -> Vec3 {
        // Spherical to Cartesian conversion
        let offset = Vec3::new(
            self.distance * self.elevation.cos() * self.azimuth.sin(),
            self.distance * self.elevation.sin(),
            self.distance * self.elevation.cos() * self.azimuth.cos(),
        );
        self.target + offset
    }

    /// Writes the current eye and target into the core camera.
    ///
    /// The caller is expected to follow with [`Camera::update`].
    pub fn apply_to(&self, camera: &mut Camera) {
        camera.position = self.eye();
        camera.target = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_orbit_matches_initial_view() {
        let orbit = OrbitCamera::new();
        let eye = orbit.eye();
        assert!((eye - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
    }

    #[test]
    fn eye_stays_at_distance_from_target() {
        let mut orbit = OrbitCamera::new().target(Vec3::new(1.0, 2.0, 3.0));
        orbit.azimuth = 1.2;
        orbit.elevation = 0.7;

        let eye = orbit.eye();
        assert!(((eye - orbit.target).length() - orbit.distance).abs() < 1e-5);
    }
}
