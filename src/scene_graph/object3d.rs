use id_arena::Id;

use crate::scene_graph::material::Material;
use crate::scene_graph::mesh::MeshId;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub mesh_id: Option<MeshId>,
    /// Material used for drawing this frame. May be temporarily replaced by a highlight.
    pub material: Material,
    /// The material the object was loaded with.
    pub original_material: Material,
    pub visible: bool,
    /// Whether pointer rays can hit this object and its descendants.
    pub pickable: bool,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_mesh(name: impl Into<String>, mesh_id: MeshId, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh_id: Some(mesh_id),
            material,
            original_material: material,
            ..Default::default()
        }
    }

    pub fn restore_material(&mut self) {
        self.material = self.original_material;
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            transform: Transform::default(),
            mesh_id: None,
            material: Material::default(),
            original_material: Material::default(),
            visible: true,
            pickable: true,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
