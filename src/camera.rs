use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::math::ray::Ray;

/// A complete camera placement. Applied to the live camera wholesale, never field by field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraConfig {
    /// Isometric view of the whole room.
    pub const DEFAULT: CameraConfig = CameraConfig {
        position: Vec3::new(200.0, 150.0, 200.0),
        target: Vec3::new(0.0, 0.735, 0.0),
        zoom: 1.0,
        near: 1.0,
        far: 1000.0,
    };

    /// Close-up of the PC screen.
    pub const FOCUSED: CameraConfig = CameraConfig {
        position: Vec3::new(0.45, 0.65, 0.25),
        target: Vec3::new(0.0, 0.55, -0.8),
        zoom: 10.0,
        near: 0.1,
        far: 10.0,
    };
}

#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub zoom: f32,
    pub near: f32,
    pub far: f32,
    /// Height of the view volume at zoom 1, in world units.
    pub frustum_size: f32,
    pub aspect: f32,
}

impl OrthographicCamera {
    pub fn new(config: &CameraConfig, frustum_size: f32, aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: Vec3::ZERO,
            up: Vec3::Y,
            zoom: 1.0,
            near: 0.0,
            far: 1.0,
            frustum_size,
            aspect,
        };
        camera.apply_config(config);
        camera
    }

    pub fn apply_config(&mut self, config: &CameraConfig) {
        self.position = config.position;
        self.target = config.target;
        self.zoom = config.zoom;
        self.near = config.near;
        self.far = config.far;
    }

    #[allow(dead_code)]
    pub fn config(&self) -> CameraConfig {
        CameraConfig {
            position: self.position,
            target: self.target,
            zoom: self.zoom,
            near: self.near,
            far: self.far,
        }
    }

    pub fn set_resolution(&mut self, resolution: Vec2) {
        if resolution.x > 0.0 && resolution.y > 0.0 {
            self.aspect = resolution.x / resolution.y;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let half_height = self.frustum_size / 2.0 / self.zoom;
        let half_width = half_height * self.aspect;

        Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.near,
            self.far,
        )
    }

    pub fn get_vp_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray from the near plane through the given normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.get_vp_matrix().inverse();

        let unproject = |depth: f32| {
            let point = inverse * Vec4::new(ndc.x, ndc.y, depth, 1.0);
            point.xyz() / point.w
        };

        let near_point = unproject(0.0);
        let far_point = unproject(1.0);

        Ray::new(near_point, far_point - near_point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, 1e-4), "{} != {}", a, b);
    }

    #[test]
    fn center_ray_points_at_target() {
        let config = CameraConfig {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            zoom: 1.0,
            near: 1.0,
            far: 100.0,
        };
        let camera = OrthographicCamera::new(&config, 3.0, 1.0);

        let ray = camera.ray_from_ndc(Vec2::ZERO);

        assert_close(ray.origin, Vec3::new(0.0, 0.0, 9.0));
        assert_close(ray.direction, Vec3::NEG_Z);
    }

    #[test]
    fn corner_ray_is_offset_by_half_the_view_volume() {
        let config = CameraConfig {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            zoom: 2.0,
            near: 1.0,
            far: 100.0,
        };
        let camera = OrthographicCamera::new(&config, 4.0, 2.0);

        let ray = camera.ray_from_ndc(Vec2::new(1.0, 1.0));

        // Half height 4 / 2 / 2 = 1, half width 1 * 2 = 2
        assert_close(ray.origin, Vec3::new(2.0, 1.0, 9.0));
        assert_close(ray.direction, Vec3::NEG_Z);
    }

    #[test]
    fn apply_config_round_trips_exactly() {
        let mut camera = OrthographicCamera::new(&CameraConfig::DEFAULT, 3.0, 16.0 / 9.0);
        camera.apply_config(&CameraConfig::FOCUSED);
        assert_eq!(camera.config(), CameraConfig::FOCUSED);

        camera.apply_config(&CameraConfig::DEFAULT);
        assert_eq!(camera.config(), CameraConfig::DEFAULT);
    }

    #[test]
    fn resize_keeps_aspect_for_degenerate_sizes() {
        let mut camera = OrthographicCamera::new(&CameraConfig::DEFAULT, 3.0, 1.5);
        camera.set_resolution(Vec2::new(0.0, 720.0));
        assert_eq!(camera.aspect, 1.5);

        camera.set_resolution(Vec2::new(1280.0, 640.0));
        assert_eq!(camera.aspect, 2.0);
    }
}
