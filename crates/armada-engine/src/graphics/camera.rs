//! Orthographic camera.
//!
//! Exposes the combined view-projection matrix consumed by
//! `Renderer::start_scene`. Optionally keyboard-driven: an unlocked camera
//! pans with WASD at a fixed speed; there is no rotation or zoom input.

use glam::{Mat4, Vec2, Vec3};

use crate::input::{InputState, Key};

/// 2D orthographic camera with pan, zoom and in-plane rotation state.
pub struct OrthoCam {
    position: Vec3,
    rotation: f32,
    zoom: f32,
    speed: f32,
    lock: bool,

    view: Mat4,
    projection: Mat4,
    view_projection: Mat4,
}

impl OrthoCam {
    /// Creates a camera from a projection matrix, pan speed and lock flag.
    pub fn new(projection: Mat4, speed: f32, lock: bool) -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: 0.0,
            zoom: 1.0,
            speed,
            lock,
            view: Mat4::IDENTITY,
            projection,
            view_projection: projection,
        }
    }

    /// Creates a camera whose projection spans `window_size` centered on the
    /// origin.
    pub fn from_window_size(window_size: Vec2, speed: f32) -> Self {
        let half = window_size / 2.0;
        Self::new(
            Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, -1.0, 1.0),
            speed,
            true,
        )
    }

    // ── setters ────────────────────────────────────────────────────────────

    /// Sets the zoom factor and rebuilds the projection for `window_size`.
    ///
    /// Non-positive zoom values are ignored.
    pub fn set_zoom(&mut self, zoom: f32, window_size: Vec2) {
        if zoom > 0.0 {
            self.zoom = zoom;

            let half = window_size / 2.0;
            self.set_projection(Mat4::orthographic_rh(
                -half.x * zoom,
                half.x * zoom,
                -half.y * zoom,
                half.y * zoom,
                -1.0,
                1.0,
            ));
        }
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn set_rotation(&mut self, rotation: f32) {
        self.rotation = rotation;
        self.recalculate();
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recalculate();
    }

    pub fn set_lock(&mut self, lock: bool) {
        self.lock = lock;
    }

    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
        self.view_projection = self.projection * self.view;
    }

    // ── getters ────────────────────────────────────────────────────────────

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn locked(&self) -> bool {
        self.lock
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    // ── update ─────────────────────────────────────────────────────────────

    /// Pans with WASD when unlocked, then refreshes the matrices.
    pub fn update(&mut self, dt: f32, input: &InputState) {
        if self.lock {
            return;
        }

        if input.key_down(Key::W) {
            self.position.y += self.speed * dt;
        } else if input.key_down(Key::S) {
            self.position.y -= self.speed * dt;
        }

        if input.key_down(Key::A) {
            self.position.x -= self.speed * dt;
        } else if input.key_down(Key::D) {
            self.position.x += self.speed * dt;
        }

        self.recalculate();
    }

    /// View is the inverse of the camera's world transform
    /// (rotate about z, then translate).
    fn recalculate(&mut self) {
        let transform = Mat4::from_rotation_z(self.rotation.to_radians())
            * Mat4::from_translation(self.position);

        self.view = transform.inverse();
        self.view_projection = self.projection * self.view;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_view_at_origin() {
        let mut cam = OrthoCam::new(Mat4::IDENTITY, 100.0, false);
        cam.set_position(Vec3::ZERO);

        assert!(cam.view().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn view_translates_opposite_to_position() {
        let mut cam = OrthoCam::new(Mat4::IDENTITY, 100.0, false);
        cam.set_position(Vec3::new(10.0, -4.0, 0.0));

        let p = cam.view_projection().transform_point3(Vec3::new(10.0, -4.0, 0.0));
        assert!(p.abs_diff_eq(Vec3::ZERO, 1e-5));
    }

    #[test]
    fn projection_maps_window_extents_to_ndc() {
        let cam = OrthoCam::from_window_size(Vec2::new(1000.0, 618.0), 0.0);

        let right = cam.view_projection().transform_point3(Vec3::new(500.0, 0.0, 0.0));
        let top = cam.view_projection().transform_point3(Vec3::new(0.0, 309.0, 0.0));

        assert!((right.x - 1.0).abs() < 1e-5);
        assert!((top.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn locked_camera_ignores_input() {
        let mut cam = OrthoCam::from_window_size(Vec2::new(100.0, 100.0), 50.0);
        let mut input = InputState::default();
        input.keys_down.insert(Key::W);

        cam.update(1.0, &input);
        assert_eq!(cam.position(), Vec3::ZERO);
    }

    #[test]
    fn unlocked_camera_pans_with_keys() {
        let mut cam = OrthoCam::from_window_size(Vec2::new(100.0, 100.0), 50.0);
        cam.set_lock(false);

        let mut input = InputState::default();
        input.keys_down.insert(Key::W);
        input.keys_down.insert(Key::D);

        cam.update(0.5, &input);
        assert_eq!(cam.position(), Vec3::new(25.0, 25.0, 0.0));
    }

    #[test]
    fn zoom_widens_the_visible_extent() {
        let mut cam = OrthoCam::from_window_size(Vec2::new(100.0, 100.0), 0.0);
        cam.set_zoom(2.0, Vec2::new(100.0, 100.0));

        // With 2x zoom, x = 100 maps to the NDC edge instead of x = 50.
        let edge = cam.view_projection().transform_point3(Vec3::new(100.0, 0.0, 0.0));
        assert!((edge.x - 1.0).abs() < 1e-5);
        assert_eq!(cam.zoom(), 2.0);
    }
}
