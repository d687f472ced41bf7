use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use gltf::buffer;
use id_arena::Id;
use itertools::izip;

use crate::math::bounds::AABB;
use crate::scene_graph::material::Material;

pub type MeshId = Id<Mesh>;

pub type Buffers<'a> = &'a [buffer::Data];

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
}

/// A single triangle list with one material, the equivalent of one glTF primitive.
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Material,
    pub bounding_box: AABB,
}

impl Mesh {
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        material: Material,
    ) -> Self {
        let bounding_box = AABB::from_points(vertices.iter().map(|vertex| vertex.position));

        Self {
            name: name.into(),
            vertices,
            indices,
            material,
            bounding_box,
        }
    }

    /// Builds a mesh from positions only, with flat normals computed per triangle corner.
    pub fn from_positions(
        name: impl Into<String>,
        positions: &[Vec3],
        indices: Vec<u32>,
        material: Material,
    ) -> Self {
        let normals = face_normals(positions, &indices);
        let vertices = izip!(positions, normals)
            .map(|(position, normal)| Vertex {
                position: *position,
                normal,
            })
            .collect();

        Self::new(name, vertices, indices, material)
    }

    pub fn from_gltf_primitive(
        name: impl Into<String>,
        primitive: &gltf::Primitive,
        buffers: Buffers,
    ) -> anyhow::Result<Mesh> {
        let name = name.into();

        if primitive.mode() != gltf::mesh::Mode::Triangles {
            return Err(anyhow::anyhow!(
                "Unsupported primitive mode in {}: {:?}",
                name,
                primitive.mode()
            ));
        }

        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions = reader
            .read_positions()
            .ok_or_else(|| anyhow::anyhow!("Primitive without positions: {}", name))?
            .map(Vec3::from)
            .collect::<Vec<Vec3>>();

        let indices = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect::<Vec<u32>>(),
            None => (0..positions.len() as u32).collect(),
        };

        if let Some(&out_of_range) = indices.iter().find(|&&i| i as usize >= positions.len()) {
            return Err(anyhow::anyhow!(
                "Index {} out of range in {} ({} vertices)",
                out_of_range,
                name,
                positions.len()
            ));
        }

        let material = Material::from_gltf(&primitive.material());

        let mesh = match reader.read_normals() {
            Some(normals) => {
                let normals = normals.map(Vec3::from).collect::<Vec<Vec3>>();
                if normals.len() != positions.len() {
                    return Err(anyhow::anyhow!(
                        "Primitive {} has {} normals for {} positions",
                        name,
                        normals.len(),
                        positions.len()
                    ));
                }

                let vertices = izip!(positions, normals)
                    .map(|(position, normal)| Vertex { position, normal })
                    .collect();
                Mesh::new(name, vertices, indices, material)
            }
            None => Mesh::from_positions(name, &positions, indices, material),
        };

        Ok(mesh)
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|triangle| {
            [triangle[0], triangle[1], triangle[2]]
                .map(|index| self.vertices[index as usize].position)
        })
    }
}

fn face_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let normal = (positions[b] - positions[a]).cross(positions[c] - positions[a]);

        for index in [a, b, c] {
            normals[index] += normal;
        }
    }

    normals
        .into_iter()
        .map(|normal| normal.normalize_or(Vec3::Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_positions_computes_bounds_and_normals() {
        let mesh = Mesh::from_positions(
            "Triangle",
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
            Material::default(),
        );

        assert_eq!(mesh.bounding_box.min, Vec3::ZERO);
        assert_eq!(mesh.bounding_box.max, Vec3::new(1.0, 1.0, 0.0));
        assert!(mesh.vertices.iter().all(|v| v.normal == Vec3::Z));
        assert_eq!(mesh.triangles().count(), 1);
    }
}
