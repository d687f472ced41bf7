use glam::{Mat4, Vec3};

use crate::math::ray::Ray;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    pub min: Vec3,
    pub max: Vec3,
}

impl AABB {
    /// A box that contains nothing. Extending it with any point yields a box around that point.
    pub const EMPTY: AABB = AABB {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(point1: Vec3, point2: Vec3) -> AABB {
        let min = point1.min(point2);
        let max = point1.max(point2);
        AABB { min, max }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> AABB {
        points
            .into_iter()
            .fold(AABB::EMPTY, |aabb, point| aabb.extended(point))
    }

    pub fn extended(&self, point: Vec3) -> AABB {
        AABB {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn corners(&self) -> [Vec3; 8] {
        [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ]
    }

    pub fn transformed(&self, transform: &Mat4) -> AABB {
        if self.is_empty() {
            return *self;
        }

        AABB::from_points(
            self.corners()
                .map(|corner| transform.transform_point3(corner)),
        )
    }

    #[allow(dead_code)]
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Slab test. Returns the ray parameter where the ray enters the box, or 0 if the origin is
    /// already inside.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if self.is_empty() {
            return None;
        }

        let inverse_direction = ray.direction.recip();

        let t1 = (self.min - ray.origin) * inverse_direction;
        let t2 = (self.max - ray.origin) * inverse_direction;

        // NaN shows up when the origin lies on a slab plane and the direction is parallel to it.
        let t_near = t1.min(t2);
        let t_far = t1.max(t2);

        let t_enter = [t_near.x, t_near.y, t_near.z]
            .into_iter()
            .filter(|t| !t.is_nan())
            .fold(0.0_f32, f32::max);
        let t_exit = [t_far.x, t_far.y, t_far.z]
            .into_iter()
            .filter(|t| !t.is_nan())
            .fold(f32::INFINITY, f32::min);

        if t_enter <= t_exit {
            Some(t_enter)
        } else {
            None
        }
    }
}
