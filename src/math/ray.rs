use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

const TRIANGLE_EPSILON: f32 = 1e-7;

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transforms the ray by an affine matrix. The direction is left unnormalized so that ray
    /// parameters stay proportional between the two spaces.
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }

    /// Möller–Trumbore. Triangles wound clockwise as seen from the ray origin are back faces.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3, cull_back_faces: bool) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let p = self.direction.cross(edge2);
        let determinant = edge1.dot(p);

        if cull_back_faces {
            if determinant < TRIANGLE_EPSILON {
                return None;
            }
        } else if determinant.abs() < TRIANGLE_EPSILON {
            return None;
        }

        let inverse_determinant = 1.0 / determinant;
        let s = self.origin - a;
        let u = s.dot(p) * inverse_determinant;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = self.direction.dot(q) * inverse_determinant;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inverse_determinant;
        (t >= 0.0).then_some(t)
    }
}
