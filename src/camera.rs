//! Look-at camera with perspective projection.
//!
//! [`Camera`] keeps an eye position, a target point, and an up vector in
//! world space, and derives the view and projection matrices from them.
//! The view matrix is recomputed by [`Camera::update`] once per frame; the
//! projection matrix is rebuilt explicitly via
//! [`Camera::update_projection_matrix`] after any aspect or fov change
//! (typically from the resize handler), so it is never stale across a
//! resize.

use glam::{Mat4, Vec3};

/// A look-at camera for 3D scenes.
///
/// # Degenerate configurations
///
/// `position == target` leaves the look direction undefined. Callers must
/// keep the two apart; the camera does not defend against it.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// Eye position in world space.
    pub position: Vec3,
    /// Point the camera looks at.
    pub target: Vec3,
    /// Up direction (should be unit length).
    pub up: Vec3,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height) used by the projection.
    pub aspect: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    view: Mat4,
    proj: Mat4,
}

impl Camera {
    /// Creates a camera at `position` looking at `target`, with Y-up,
    /// a 45 degree field of view, and a 1:1 aspect ratio.
    ///
    /// Call [`set_aspect_ratio`](Self::set_aspect_ratio) and
    /// [`update_projection_matrix`](Self::update_projection_matrix) once
    /// the surface size is known.
    pub fn new(position: Vec3, target: Vec3) -> Self {
        let mut camera = Self {
            position,
            target,
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4,
            aspect: 1.0,
            near: 0.1,
            far: 1000.0,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        };
        camera.update();
        camera.update_projection_matrix();
        camera
    }

    /// Recomputes the view matrix from the current position, target, and
    /// up vector.
    ///
    /// Cheap enough to call unconditionally once per frame; there is no
    /// staleness tracking.
    pub fn update(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.target, self.up);
    }

    /// Stores a new aspect ratio for the projection.
    ///
    /// Takes effect on the next
    /// [`update_projection_matrix`](Self::update_projection_matrix) call.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    /// Rebuilds the perspective projection from fov, aspect, near, and far.
    ///
    /// Must be called after any aspect or fov change before the next
    /// render; the projection is not rebuilt implicitly.
    pub fn update_projection_matrix(&mut self) {
        self.proj = Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far);
    }

    /// The current view (world-to-camera) matrix.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// The current projection (camera-to-clip) matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        self.proj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_maps_eye_to_origin() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);

        let eye_in_view = camera.view_matrix().transform_point3(camera.position);
        assert!(eye_in_view.length() < 1e-5);

        // Without update() the view is stale for the new eye position.
        camera.position = Vec3::new(3.0, 1.0, 4.0);
        let stale = camera.view_matrix().transform_point3(camera.position);
        assert!(stale.length() > 1e-3);

        camera.update();
        let fresh = camera.view_matrix().transform_point3(camera.position);
        assert!(fresh.length() < 1e-5);
    }

    #[test]
    fn view_looks_down_negative_z() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        camera.update();

        let target_in_view = camera.view_matrix().transform_point3(camera.target);
        assert!((target_in_view.x).abs() < 1e-5);
        assert!((target_in_view.y).abs() < 1e-5);
        assert!((target_in_view.z + 5.0).abs() < 1e-5);
    }

    #[test]
    fn projection_focal_scales_inversely_with_aspect() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);

        camera.set_aspect_ratio(2.0);
        camera.update_projection_matrix();
        let narrow = camera.projection_matrix().x_axis.x;

        camera.set_aspect_ratio(4.0);
        camera.update_projection_matrix();
        let wide = camera.projection_matrix().x_axis.x;

        assert!((wide - narrow / 2.0).abs() < 1e-5);
    }

    #[test]
    fn resize_updates_projection() {
        let mut camera = Camera::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);

        let aspect = 800.0 / 600.0;
        camera.set_aspect_ratio(aspect);
        camera.update_projection_matrix();

        let expected = 1.0 / (aspect * (camera.fov * 0.5).tan());
        assert!((camera.projection_matrix().x_axis.x - expected).abs() < 1e-5);
        assert_eq!(camera.aspect, aspect);
    }
}
