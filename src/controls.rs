use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};

use crate::camera::OrthographicCamera;

// Keeps the camera from flipping over the poles
const POLE_EPSILON: f32 = 1e-6;
// Remaining rotation below this is dropped so damping settles
const SETTLE_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone)]
pub struct OrbitSettings {
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            min_zoom: 1.0,
            max_zoom: 5.0,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// Drag to rotate around the camera target, scroll to zoom. No panning.
pub struct OrbitControls {
    pub settings: OrbitSettings,
    enabled: bool,
    theta_delta: f32,
    phi_delta: f32,
    zoom_scale: f32,
    drag_origin: Option<Vec2>,
}

impl OrbitControls {
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            enabled: true,
            theta_delta: 0.0,
            phi_delta: 0.0,
            zoom_scale: 1.0,
            drag_origin: None,
        }
    }

    #[allow(dead_code)]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling also drops any in-flight drag and damped motion.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.stop();
    }

    pub fn stop(&mut self) {
        self.theta_delta = 0.0;
        self.phi_delta = 0.0;
        self.zoom_scale = 1.0;
        self.drag_origin = None;
    }

    #[allow(dead_code)]
    pub fn is_dragging(&self) -> bool {
        self.drag_origin.is_some()
    }

    pub fn pointer_down(&mut self, position: Vec2) {
        if self.enabled {
            self.drag_origin = Some(position);
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag_origin = None;
    }

    pub fn pointer_moved(&mut self, position: Vec2, viewport_height: f32) {
        let Some(origin) = self.drag_origin else {
            return;
        };
        if !self.enabled || viewport_height <= 0.0 {
            return;
        }

        let delta = position - origin;
        let radians_per_pixel = TAU / viewport_height * self.settings.rotate_speed;
        self.theta_delta -= delta.x * radians_per_pixel;
        self.phi_delta -= delta.y * radians_per_pixel;
        self.drag_origin = Some(position);
    }

    /// Positive `lines` zooms in.
    pub fn wheel(&mut self, lines: f32) {
        if !self.enabled || lines == 0.0 {
            return;
        }

        let step = 0.95_f32.powf(self.settings.zoom_speed * lines.abs());
        if lines > 0.0 {
            self.zoom_scale /= step;
        } else {
            self.zoom_scale *= step;
        }
    }

    pub fn update(&mut self, camera: &mut OrthographicCamera) {
        if !self.enabled {
            return;
        }

        if self.zoom_scale != 1.0 {
            camera.zoom = (camera.zoom * self.zoom_scale)
                .clamp(self.settings.min_zoom, self.settings.max_zoom);
            self.zoom_scale = 1.0;
        }

        if self.theta_delta == 0.0 && self.phi_delta == 0.0 {
            return;
        }

        let damping = self.settings.damping_factor;
        let offset = camera.position - camera.target;
        let radius = offset.length();
        if radius == 0.0 {
            self.stop();
            return;
        }

        let theta = offset.x.atan2(offset.z) + self.theta_delta * damping;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() + self.phi_delta * damping)
            .clamp(POLE_EPSILON, PI - POLE_EPSILON);

        camera.position = camera.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );

        self.theta_delta *= 1.0 - damping;
        self.phi_delta *= 1.0 - damping;

        if self.theta_delta.abs() < SETTLE_EPSILON {
            self.theta_delta = 0.0;
        }
        if self.phi_delta.abs() < SETTLE_EPSILON {
            self.phi_delta = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;

    fn camera() -> OrthographicCamera {
        OrthographicCamera::new(&CameraConfig::DEFAULT, 3.0, 1.0)
    }

    #[test]
    fn zoom_is_clamped() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = camera();

        controls.wheel(1000.0);
        controls.update(&mut camera);
        assert_eq!(camera.zoom, 5.0);

        controls.wheel(-1000.0);
        controls.update(&mut camera);
        assert_eq!(camera.zoom, 1.0);
    }

    #[test]
    fn drag_rotates_around_target_keeping_distance() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = camera();
        let distance = camera.position.distance(camera.target);

        controls.pointer_down(Vec2::new(100.0, 100.0));
        controls.pointer_moved(Vec2::new(160.0, 100.0), 600.0);
        controls.update(&mut camera);

        assert_ne!(camera.position, CameraConfig::DEFAULT.position);
        assert!((camera.position.distance(camera.target) - distance).abs() < 1e-2);
        assert_eq!(camera.target, CameraConfig::DEFAULT.target);
    }

    #[test]
    fn idle_update_leaves_camera_untouched() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = camera();

        controls.update(&mut camera);

        assert_eq!(camera.config(), CameraConfig::DEFAULT);
    }

    #[test]
    fn disabled_controls_ignore_input() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = camera();
        controls.set_enabled(false);

        controls.pointer_down(Vec2::ZERO);
        controls.pointer_moved(Vec2::new(300.0, 300.0), 600.0);
        controls.wheel(3.0);
        controls.update(&mut camera);

        assert!(!controls.is_dragging());
        assert_eq!(camera.config(), CameraConfig::DEFAULT);
    }

    #[test]
    fn damping_eventually_settles() {
        let mut controls = OrbitControls::new(OrbitSettings::default());
        let mut camera = camera();

        controls.pointer_down(Vec2::ZERO);
        controls.pointer_moved(Vec2::new(50.0, 0.0), 600.0);
        controls.pointer_up();

        for _ in 0..1000 {
            controls.update(&mut camera);
        }
        let settled = camera.position;
        controls.update(&mut camera);

        assert_eq!(camera.position, settled);
    }
}
