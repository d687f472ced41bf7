use glam::Vec2;

use crate::assets::{AssetDefinition, AssetLoader, LoadedModel};
use crate::camera::{CameraConfig, OrthographicCamera};
use crate::config::ViewerConfig;
use crate::controls::OrbitControls;
use crate::interaction::InteractionController;
use crate::scene_graph::{ObjectId, Scene};

/// Everything the viewer knows about the room, independent of the window and the GPU.
pub struct ViewerState {
    pub config: ViewerConfig,
    pub scene: Scene,
    pub camera: OrthographicCamera,
    pub controls: OrbitControls,
    pub controller: InteractionController,
    loader: AssetLoader,
    viewport: Vec2,
}

impl ViewerState {
    pub fn new(config: ViewerConfig, viewport: Vec2) -> Self {
        let mut camera = OrthographicCamera::new(&CameraConfig::DEFAULT, config.frustum_size, 1.0);
        camera.set_resolution(viewport);

        Self {
            scene: Scene::new(),
            camera,
            controls: OrbitControls::new(config.orbit.clone()),
            controller: InteractionController::new(config.highlight_hovered),
            loader: AssetLoader::new(config.asset_root.clone()),
            viewport,
            config,
        }
    }

    /// Starts loading every configured asset. Completions are picked up by [`Self::update`].
    pub fn load_assets(&mut self) {
        for definition in self.config.assets.clone() {
            self.loader.load(definition);
        }
    }

    pub fn poll_assets(&mut self) {
        for finished in self.loader.poll() {
            match finished.result {
                Ok(model) => {
                    self.attach_asset(&finished.definition, model);
                }
                Err(e) => log::error!("{:#}", e),
            }
        }
    }

    /// Completion handler for one asset: spawns it, registers it and records its role in one step.
    pub fn attach_asset(&mut self, definition: &AssetDefinition, model: LoadedModel) -> ObjectId {
        let mesh_count = model.meshes.len();
        let root_id = self.scene.spawn_model(model);
        self.controller
            .register_asset(&mut self.scene, root_id, definition.role);

        log::info!(
            "Loaded {} ({} meshes, {} still loading)",
            definition.name,
            mesh_count,
            self.loader.pending()
        );

        root_id
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.camera.set_resolution(viewport);
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.controls.pointer_moved(position, self.viewport.y);
        self.controller
            .pointer_moved(&mut self.scene, &self.camera, position, self.viewport);
    }

    pub fn pointer_pressed(&mut self, position: Vec2) {
        self.controls.pointer_down(position);
        self.controller.pointer_down(
            &mut self.scene,
            &mut self.camera,
            &mut self.controls,
            position,
            self.viewport,
        );
    }

    pub fn pointer_released(&mut self) {
        self.controls.pointer_up();
    }

    pub fn wheel(&mut self, lines: f32) {
        self.controls.wheel(lines);
    }

    pub fn close_focused_view(&mut self) -> bool {
        self.controller.close(&mut self.camera, &mut self.controls)
    }

    pub fn update(&mut self) {
        self.poll_assets();
        self.controls.update(&mut self.camera);
        self.scene.update_transforms();
        self.controller.frame(&mut self.scene, &self.camera);
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::assets::{AssetRole, LoadedNode};
    use crate::interaction::InteractionMode;
    use crate::scene_graph::{Material, Mesh};

    fn box_model(name: &str, half_extent: f32) -> LoadedModel {
        let e = half_extent;
        let positions = [
            Vec3::new(-e, -e, e),
            Vec3::new(e, -e, e),
            Vec3::new(e, e, e),
            Vec3::new(-e, e, e),
            Vec3::new(-e, -e, -e),
            Vec3::new(e, -e, -e),
            Vec3::new(e, e, -e),
            Vec3::new(-e, e, -e),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 0, 2, 3, // +z
            1, 5, 6, 1, 6, 2, // +x
            5, 4, 7, 5, 7, 6, // -z
            4, 0, 3, 4, 3, 7, // -x
            3, 2, 6, 3, 6, 7, // +y
            4, 5, 1, 4, 1, 0, // -y
        ];

        LoadedModel {
            name: name.to_string(),
            meshes: vec![Mesh::from_positions(name, &positions, indices, Material::default())],
            nodes: vec![LoadedNode {
                name: format!("{} node", name),
                translation: Vec3::ZERO,
                rotation: Quat::IDENTITY,
                scale: Vec3::ONE,
                meshes: vec![0],
                children: Vec::new(),
            }],
        }
    }

    fn viewer() -> ViewerState {
        let config = ViewerConfig {
            assets: Vec::new(),
            ..ViewerConfig::default()
        };
        ViewerState::new(config, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn attached_assets_are_registered_with_their_roles() {
        let mut viewer = viewer();

        let pc = viewer.attach_asset(
            &AssetDefinition::new("pc", "pc.gltf", AssetRole::Interactive),
            box_model("pc", 0.3),
        );
        let outline = viewer.attach_asset(
            &AssetDefinition::new("pcOutline", "pcOutline.gltf", AssetRole::Outline),
            box_model("pcOutline", 0.32),
        );

        assert_eq!(viewer.controller.registry(), &[pc, outline]);
        assert_eq!(viewer.controller.interactive(), Some(pc));
        assert!(!viewer.scene.objects[outline].visible);
    }

    #[test]
    fn clicking_the_pc_from_the_default_view_focuses_it() {
        let mut viewer = viewer();
        viewer.attach_asset(
            &AssetDefinition::new("pc", "pc.gltf", AssetRole::Interactive),
            box_model("pc", 0.3),
        );
        let outline = viewer.attach_asset(
            &AssetDefinition::new("pcOutline", "pcOutline.gltf", AssetRole::Outline),
            box_model("pcOutline", 0.32),
        );
        viewer.update();

        // The default camera looks at (0, 0.735, 0), so the center of the screen is just above
        // the box. Aim a bit lower.
        let over_pc = Vec2::new(400.0, 300.0 + 0.5 / 3.0 * 600.0);

        viewer.pointer_moved(over_pc);
        assert!(viewer.scene.objects[outline].visible);

        viewer.pointer_pressed(over_pc);
        viewer.pointer_released();
        viewer.update();

        assert_eq!(viewer.controller.mode(), InteractionMode::Focused);
        assert_eq!(viewer.camera.config(), CameraConfig::FOCUSED);

        assert!(viewer.close_focused_view());
        viewer.update();
        assert_eq!(viewer.camera.config(), CameraConfig::DEFAULT);
    }

    #[test]
    fn missing_assets_leave_the_viewer_usable() {
        let config = ViewerConfig {
            asset_root: std::env::temp_dir().join("room-viewer-does-not-exist"),
            assets: vec![AssetDefinition::new("pc", "pc.gltf", AssetRole::Interactive)],
            ..ViewerConfig::default()
        };
        let mut viewer = ViewerState::new(config, Vec2::new(800.0, 600.0));
        viewer.load_assets();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while viewer.loader.pending() > 0 && std::time::Instant::now() < deadline {
            viewer.update();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }

        assert_eq!(viewer.loader.pending(), 0);
        assert!(viewer.controller.registry().is_empty());

        viewer.pointer_pressed(Vec2::new(400.0, 300.0));
        assert_eq!(viewer.controller.mode(), InteractionMode::Default);
    }
}
