use glam::Vec3;

use crate::math::ray::Ray;
use crate::scene_graph::{Mesh, Object3D, ObjectId, Scene};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// The mesh object that was hit.
    pub object_id: ObjectId,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point: Vec3,
}

/// Closest intersection, resolved to the object that owns the hit mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub object_id: ObjectId,
    pub root_id: ObjectId,
    pub distance: f32,
    pub point: Vec3,
}

/// Intersects the ray with the given objects and all their descendants.
///
/// Results are sorted by distance. The sort is stable, so exact ties keep the order of
/// `object_ids` and, within one object, depth-first child order. Hidden and non-pickable
/// objects are skipped along with their descendants.
pub fn intersect_objects(scene: &Scene, object_ids: &[ObjectId], ray: &Ray) -> Vec<Intersection> {
    let mut intersections = Vec::new();

    for &object_id in object_ids {
        intersect_object_recursive(scene, object_id, ray, &mut intersections);
    }

    intersections.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    intersections
}

pub fn hit_test(scene: &Scene, registry: &[ObjectId], ray: &Ray) -> Option<Hit> {
    intersect_objects(scene, registry, ray)
        .first()
        .map(|intersection| Hit {
            object_id: intersection.object_id,
            root_id: scene.root_of(intersection.object_id),
            distance: intersection.distance,
            point: intersection.point,
        })
}

fn intersect_object_recursive(
    scene: &Scene,
    object_id: ObjectId,
    ray: &Ray,
    intersections: &mut Vec<Intersection>,
) {
    let Some(object) = scene.get_object(object_id) else {
        return;
    };
    if !object.visible || !object.pickable {
        return;
    }

    if let Some(mesh) = object.mesh_id.and_then(|id| scene.get_mesh(id)) {
        if let Some((distance, point)) = intersect_mesh(object, mesh, ray) {
            intersections.push(Intersection {
                object_id,
                distance,
                point,
            });
        }
    }

    for &child_id in &object.child_ids {
        intersect_object_recursive(scene, child_id, ray, intersections);
    }
}

fn intersect_mesh(object: &Object3D, mesh: &Mesh, ray: &Ray) -> Option<(f32, Vec3)> {
    let world_matrix = object.transform.world_matrix();
    if world_matrix.determinant() == 0.0 {
        return None;
    }

    // Work in mesh space so the bounding box and triangles can be used untransformed
    let local_ray = ray.transformed(&world_matrix.inverse());
    mesh.bounding_box.intersect_ray(&local_ray)?;

    let cull_back_faces = !object.original_material.double_sided;

    let t = mesh
        .triangles()
        .filter_map(|[a, b, c]| local_ray.intersect_triangle(a, b, c, cull_back_faces))
        .min_by(f32::total_cmp)?;

    let point = world_matrix.transform_point3(local_ray.at(t));
    Some((ray.origin.distance(point), point))
}
