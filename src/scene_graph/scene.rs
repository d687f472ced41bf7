use glam::{Mat4, Vec3};
use id_arena::Arena;

use crate::assets::{LoadedModel, LoadedNode};
use crate::scene_graph::mesh::{Mesh, MeshId};
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub meshes: Arena<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            meshes: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    #[allow(dead_code)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.alloc(mesh)
    }

    pub fn get_mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id)
    }

    /// Moves a loaded model into the scene under a new group object named after the model.
    /// Returns the id of that group.
    pub fn spawn_model(&mut self, model: LoadedModel) -> ObjectId {
        let mesh_ids = model
            .meshes
            .into_iter()
            .map(|mesh| self.add_mesh(mesh))
            .collect::<Vec<MeshId>>();

        let root_id = self.add_object(Object3D::named(model.name));

        for node in &model.nodes {
            self.spawn_node(node, &mesh_ids, root_id);
        }

        self.invalidate_object_hierarchy(root_id);

        root_id
    }

    fn spawn_node(&mut self, node: &LoadedNode, mesh_ids: &[MeshId], parent_id: ObjectId) {
        let mut object = Object3D::named(node.name.clone());
        object.transform = Transform::from_trs(node.translation, node.rotation, node.scale);

        // A glTF mesh with several primitives becomes one child object per primitive
        let primitive_children = match node.meshes.as_slice() {
            [single] => {
                let mesh_id = mesh_ids[*single];
                object.mesh_id = Some(mesh_id);
                object.material = self.meshes[mesh_id].material;
                object.original_material = object.material;
                &[][..]
            }
            many => many,
        };

        let object_id = self.add_object(object);
        self.set_object_parent(object_id, Some(parent_id));

        for (index, mesh_index) in primitive_children.iter().enumerate() {
            let mesh_id = mesh_ids[*mesh_index];
            let primitive = Object3D::with_mesh(
                format!("{} (primitive {})", node.name, index),
                mesh_id,
                self.meshes[mesh_id].material,
            );
            let primitive_id = self.add_object(primitive);
            self.set_object_parent(primitive_id, Some(object_id));
        }

        for child in &node.children {
            self.spawn_node(child, mesh_ids, object_id);
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(old_parent_id) = self.objects.get(child_id).and_then(|c| c.parent_id) {
            if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent) = new_parent_id.and_then(|id| self.objects.get_mut(id)) {
                new_parent.child_ids.push(child_id);
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    /// Walks parent links upwards. Does not count the object itself.
    pub fn is_descendant_of(&self, object_id: ObjectId, ancestor_id: ObjectId) -> bool {
        let mut current = self.objects.get(object_id).and_then(|o| o.parent_id);

        while let Some(id) = current {
            if id == ancestor_id {
                return true;
            }
            current = self.objects.get(id).and_then(|o| o.parent_id);
        }

        false
    }

    pub fn is_self_or_descendant_of(&self, object_id: ObjectId, ancestor_id: ObjectId) -> bool {
        object_id == ancestor_id || self.is_descendant_of(object_id, ancestor_id)
    }

    /// The ancestor that has no parent. An object without a parent is its own root.
    pub fn root_of(&self, object_id: ObjectId) -> ObjectId {
        let mut current = object_id;

        while let Some(parent_id) = self.objects.get(current).and_then(|o| o.parent_id) {
            current = parent_id;
        }

        current
    }

    /// The object and all its descendants, depth first, parents before children.
    pub fn descendants(&self, object_id: ObjectId) -> Vec<ObjectId> {
        let mut result = Vec::new();
        let mut stack = vec![object_id];

        while let Some(id) = stack.pop() {
            let Some(object) = self.objects.get(id) else {
                continue;
            };
            result.push(id);
            stack.extend(object.child_ids.iter().rev());
        }

        result
    }

    pub fn set_visible(&mut self, object_id: ObjectId, visible: bool) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.visible = visible;
        }
    }

    /// An object is drawn only if it and all of its ancestors are visible.
    pub fn is_visible_in_hierarchy(&self, object_id: ObjectId) -> bool {
        let mut current = Some(object_id);

        while let Some(id) = current {
            match self.objects.get(id) {
                Some(object) if object.visible => current = object.parent_id,
                _ => return false,
            }
        }

        true
    }

    pub fn world_matrix(&self, object_id: ObjectId) -> Mat4 {
        self.objects
            .get(object_id)
            .map(|object| object.transform.world_matrix())
            .unwrap_or(Mat4::IDENTITY)
    }

    #[allow(dead_code)]
    pub fn set_object_translation(&mut self, object_id: ObjectId, translation: Vec3) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_translation(translation);
        }
        self.invalidate_object_hierarchy(object_id);
    }

    /// Updates all object transforms in hierarchical order
    pub fn update_transforms(&self) {
        let root_objects = self
            .objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id);

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY);
        }
    }

    fn update_object_transform_recursive(&self, object_id: ObjectId, parent_world_matrix: Mat4) {
        if let Some(object) = self.objects.get(object_id) {
            if object.transform.is_world_dirty() {
                let world_matrix = parent_world_matrix * object.transform.local_matrix();
                object.transform.set_world_matrix(world_matrix);
            }

            let world_matrix = object.transform.world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix);
            }
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }
}
