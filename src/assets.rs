use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, channel};

use anyhow::Context;
use glam::{Quat, Vec3};

use crate::scene_graph::Mesh;

/// What the viewer does with an asset once it has loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRole {
    Prop,
    /// The object that can be hovered and clicked to focus the camera.
    Interactive,
    /// Shown while the pointer is over the interactive object. Starts hidden and is never picked.
    Outline,
}

#[derive(Debug, Clone)]
pub struct AssetDefinition {
    pub name: String,
    pub path: PathBuf,
    pub role: AssetRole,
}

impl AssetDefinition {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, role: AssetRole) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            role,
        }
    }
}

pub struct LoadedNode {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Indices into `LoadedModel::meshes`, one per glTF primitive.
    pub meshes: Vec<usize>,
    pub children: Vec<LoadedNode>,
}

/// CPU-side result of parsing one glTF file. Owns everything it needs so it can cross threads.
pub struct LoadedModel {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub nodes: Vec<LoadedNode>,
}

pub struct AssetLoadResult {
    pub definition: AssetDefinition,
    pub result: anyhow::Result<LoadedModel>,
}

// Parses glTF files on the rayon pool and hands the results back to the event loop thread.
pub struct AssetLoader {
    asset_root: PathBuf,
    sender: mpsc::Sender<AssetLoadResult>,
    receiver: mpsc::Receiver<AssetLoadResult>,
    pending: usize,
}

impl AssetLoader {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        let (sender, receiver) = channel();

        Self {
            asset_root: asset_root.into(),
            sender,
            receiver,
            pending: 0,
        }
    }

    pub fn load(&mut self, definition: AssetDefinition) {
        let path = self.asset_root.join(&definition.path);
        let sender = self.sender.clone();
        self.pending += 1;

        log::debug!("Loading {} from {}", definition.name, path.display());

        rayon::spawn(move || {
            let result = load_gltf(&definition.name, &path)
                .with_context(|| format!("Failed to load {} from {}", definition.name, path.display()));

            // The receiver only goes away when the viewer shuts down
            let _ = sender.send(AssetLoadResult { definition, result });
        });
    }

    /// Returns every load that has finished since the last call, without blocking.
    pub fn poll(&mut self) -> Vec<AssetLoadResult> {
        let finished = self.receiver.try_iter().collect::<Vec<_>>();
        self.pending -= finished.len();
        finished
    }

    pub fn pending(&self) -> usize {
        self.pending
    }
}

pub fn load_gltf(name: &str, path: &Path) -> anyhow::Result<LoadedModel> {
    let gltf::Gltf { document, blob } =
        gltf::Gltf::open(path).context("Failed to parse glTF document")?;
    let buffers = gltf::import_buffers(&document, path.parent(), blob)
        .context("Failed to load glTF buffers")?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("No scenes in glTF")?;

    let mut builder = ModelBuilder {
        buffers: &buffers,
        meshes: Vec::new(),
        gltf_mesh_to_meshes: HashMap::new(),
    };

    let nodes = scene
        .nodes()
        .map(|node| builder.build_node(&node))
        .collect::<anyhow::Result<Vec<LoadedNode>>>()?;

    Ok(LoadedModel {
        name: name.to_string(),
        meshes: builder.meshes,
        nodes,
    })
}

struct ModelBuilder<'a> {
    buffers: &'a [gltf::buffer::Data],
    meshes: Vec<Mesh>,
    gltf_mesh_to_meshes: HashMap<usize, Vec<usize>>,
}

impl ModelBuilder<'_> {
    fn build_node(&mut self, node: &gltf::Node) -> anyhow::Result<LoadedNode> {
        let name = node.name().unwrap_or("Unnamed").to_string();
        let (translation, rotation, scale) = node.transform().decomposed();

        let meshes = match node.mesh() {
            Some(mesh) => self.mesh_indices(&name, &mesh)?,
            None => Vec::new(),
        };

        let children = node
            .children()
            .map(|child| self.build_node(&child))
            .collect::<anyhow::Result<Vec<LoadedNode>>>()?;

        Ok(LoadedNode {
            name,
            translation: Vec3::from(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from(scale),
            meshes,
            children,
        })
    }

    // Meshes shared between nodes are only converted once
    fn mesh_indices(&mut self, node_name: &str, mesh: &gltf::Mesh) -> anyhow::Result<Vec<usize>> {
        if let Some(indices) = self.gltf_mesh_to_meshes.get(&mesh.index()) {
            return Ok(indices.clone());
        }

        let mesh_name = mesh
            .name()
            .map(String::from)
            .unwrap_or_else(|| format!("{} (Mesh)", node_name));

        let mut indices = Vec::new();

        for primitive in mesh.primitives() {
            let converted = Mesh::from_gltf_primitive(
                format!("{} #{}", mesh_name, primitive.index()),
                &primitive,
                self.buffers,
            )?;
            indices.push(self.meshes.len());
            self.meshes.push(converted);
        }

        if indices.is_empty() {
            return Err(anyhow::anyhow!("Mesh without primitives: {}", mesh_name));
        }

        self.gltf_mesh_to_meshes.insert(mesh.index(), indices.clone());

        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    // One triangle in the XY plane, its node translated to (0, 0, -2), mesh used by two nodes.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0, 1] }],
        "nodes": [
            { "name": "Front", "mesh": 0, "translation": [0.0, 0.0, -2.0] },
            { "name": "Back", "mesh": 0 }
        ],
        "meshes": [{ "name": "Triangle", "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    }"#;

    fn write_temp_gltf(file_name: &str, contents: &str) -> PathBuf {
        let directory = std::env::temp_dir().join(format!("room-viewer-{}", std::process::id()));
        std::fs::create_dir_all(&directory).unwrap();
        let path = directory.join(file_name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn wait_for_results(loader: &mut AssetLoader, count: usize) -> Vec<AssetLoadResult> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut results = Vec::new();

        while results.len() < count && Instant::now() < deadline {
            results.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }

        results
    }

    #[test]
    fn parses_nodes_and_shares_meshes() {
        let path = write_temp_gltf("triangle.gltf", TRIANGLE_GLTF);

        let model = load_gltf("triangle", &path).unwrap();

        assert_eq!(model.name, "triangle");
        assert_eq!(model.meshes.len(), 1);
        assert_eq!(model.nodes.len(), 2);
        assert_eq!(model.nodes[0].name, "Front");
        assert_eq!(model.nodes[0].translation, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(model.nodes[0].meshes, vec![0]);
        assert_eq!(model.nodes[1].meshes, vec![0]);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.bounding_box.max, Vec3::new(1.0, 1.0, 0.0));
        assert!(mesh.vertices.iter().all(|v| v.normal == Vec3::Z));
    }

    // Three positions but only two normals, so the vertex list would be shorter than the indices
    const SHORT_NORMALS_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "Broken", "mesh": 0 }],
        "meshes": [{
            "name": "Triangle",
            "primitives": [{ "attributes": { "POSITION": 0, "NORMAL": 1 } }]
        }],
        "buffers": [{
            "byteLength": 60,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/"
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 24 }
        ],
        "accessors": [
            {
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, 0.0, 0.0],
                "max": [1.0, 1.0, 0.0]
            },
            { "bufferView": 1, "componentType": 5126, "count": 2, "type": "VEC3" }
        ]
    }"#;

    #[test]
    fn mismatched_normal_count_fails_the_load() {
        let path = write_temp_gltf("short-normals.gltf", SHORT_NORMALS_GLTF);

        let error = match load_gltf("broken", &path) {
            Ok(model) => panic!("Loaded {} vertices", model.meshes[0].vertices.len()),
            Err(error) => error,
        };

        assert!(format!("{:#}", error).contains("2 normals for 3 positions"));
    }

    #[test]
    fn loader_reports_success_and_failure_separately() {
        let path = write_temp_gltf("loader-triangle.gltf", TRIANGLE_GLTF);
        let root = path.parent().unwrap().to_path_buf();
        let mut loader = AssetLoader::new(&root);

        loader.load(AssetDefinition::new("ok", "loader-triangle.gltf", AssetRole::Prop));
        loader.load(AssetDefinition::new("missing", "missing.gltf", AssetRole::Interactive));
        assert_eq!(loader.pending(), 2);

        let results = wait_for_results(&mut loader, 2);
        assert_eq!(results.len(), 2);
        assert_eq!(loader.pending(), 0);

        for result in results {
            match result.definition.name.as_str() {
                "ok" => assert!(result.result.is_ok()),
                "missing" => {
                    let error = result.result.err().unwrap();
                    assert!(format!("{:#}", error).contains("missing"));
                }
                other => panic!("Unexpected asset {}", other),
            }
        }
    }
}
