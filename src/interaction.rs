//! Pointer picking and the two-state camera mode of the viewer.
//!
//! The controller owns all interaction state (pointer, registry of loaded objects, mode) and is
//! driven by the window loop. It never talks to the GPU, so it can be exercised with a plain
//! [`Scene`] and camera.

use glam::Vec2;

use crate::assets::AssetRole;
use crate::camera::{CameraConfig, OrthographicCamera};
use crate::controls::OrbitControls;
use crate::picking::{self, Hit};
use crate::scene_graph::{Material, ObjectId, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Orbiting the whole room.
    #[default]
    Default,
    /// Zoomed into the interactive object, orbit disabled, close control shown.
    Focused,
}

/// Converts a pointer position in pixels to normalized device coordinates, y up.
///
/// Positions outside the viewport map outside [-1, 1].
pub fn normalize_pointer(position: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        position.x / viewport.x * 2.0 - 1.0,
        -(position.y / viewport.y) * 2.0 + 1.0,
    )
}

pub struct InteractionController {
    mode: InteractionMode,
    pointer: Vec2,
    registry: Vec<ObjectId>,
    interactive: Option<ObjectId>,
    outline: Option<ObjectId>,
    hovered: Option<Hit>,
    close_control_visible: bool,
    highlight_hovered: bool,
}

impl InteractionController {
    pub fn new(highlight_hovered: bool) -> Self {
        Self {
            mode: InteractionMode::Default,
            pointer: Vec2::ZERO,
            registry: Vec::new(),
            interactive: None,
            outline: None,
            hovered: None,
            close_control_visible: false,
            highlight_hovered,
        }
    }

    #[allow(dead_code)]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    #[allow(dead_code)]
    pub fn registry(&self) -> &[ObjectId] {
        &self.registry
    }

    #[allow(dead_code)]
    pub fn interactive(&self) -> Option<ObjectId> {
        self.interactive
    }

    #[allow(dead_code)]
    pub fn outline(&self) -> Option<ObjectId> {
        self.outline
    }

    /// The closest object under the pointer as of the last frame.
    #[allow(dead_code)]
    pub fn hovered(&self) -> Option<&Hit> {
        self.hovered.as_ref()
    }

    pub fn close_control_visible(&self) -> bool {
        self.close_control_visible
    }

    /// Adds a freshly spawned asset root to the registry and records its role.
    pub fn register_asset(&mut self, scene: &mut Scene, root_id: ObjectId, role: AssetRole) {
        self.registry.push(root_id);

        match role {
            AssetRole::Prop => {}
            AssetRole::Interactive => {
                if self.interactive.replace(root_id).is_some() {
                    log::warn!("A second interactive object was loaded, replacing the first");
                }
            }
            AssetRole::Outline => {
                if let Some(outline) = scene.get_object_mut(root_id) {
                    outline.visible = false;
                    outline.pickable = false;
                }
                self.outline = Some(root_id);
            }
        }
    }

    pub fn update_pointer(&mut self, position: Vec2, viewport: Vec2) -> Vec2 {
        self.pointer = normalize_pointer(position, viewport);
        self.pointer
    }

    pub fn hit_test(&self, scene: &Scene, camera: &OrthographicCamera) -> Option<Hit> {
        let ray = camera.ray_from_ndc(self.pointer);
        picking::hit_test(scene, &self.registry, &ray)
    }

    /// True if the hit mesh belongs to the interactive object's hierarchy.
    pub fn is_interactive_hit(&self, scene: &Scene, hit: Option<&Hit>) -> bool {
        match (hit, self.interactive) {
            (Some(hit), Some(interactive)) => {
                scene.is_self_or_descendant_of(hit.object_id, interactive)
            }
            _ => false,
        }
    }

    pub fn on_hover(&mut self, scene: &mut Scene, hit: Option<&Hit>) {
        if self.mode == InteractionMode::Focused {
            return;
        }

        let over_interactive = self.is_interactive_hit(scene, hit);

        if let Some(outline) = self.outline.and_then(|id| scene.get_object_mut(id)) {
            if outline.visible != over_interactive {
                log::debug!("Outline {}", if over_interactive { "shown" } else { "hidden" });
            }
            outline.visible = over_interactive;
        }
    }

    /// Returns true if the click switched the viewer into the focused mode.
    pub fn on_click(
        &mut self,
        scene: &mut Scene,
        camera: &mut OrthographicCamera,
        controls: &mut OrbitControls,
        hit: Option<&Hit>,
    ) -> bool {
        if self.mode == InteractionMode::Focused {
            log::debug!("Click ignored while focused, use the close control");
            return false;
        }

        if self.interactive.is_none() {
            log::debug!("Click ignored, the interactive object has not loaded");
            return false;
        }

        match hit {
            Some(_) if self.is_interactive_hit(scene, hit) => {
                log::debug!("Clicked the interactive object");
                self.focus(scene, camera, controls);
                true
            }
            Some(hit) => {
                let name = scene.get_object(hit.root_id).map_or("?", |o| o.name.as_str());
                log::debug!("Clicked {}, which is not interactive", name);
                false
            }
            None => {
                log::debug!("Clicked empty space");
                false
            }
        }
    }

    fn focus(
        &mut self,
        scene: &mut Scene,
        camera: &mut OrthographicCamera,
        controls: &mut OrbitControls,
    ) {
        controls.set_enabled(false);
        camera.apply_config(&CameraConfig::FOCUSED);

        if let Some(outline) = self.outline {
            scene.set_visible(outline, false);
        }

        self.close_control_visible = true;
        self.mode = InteractionMode::Focused;
        log::info!("Focused view opened");
    }

    /// Activates the close control. Returns false if there was nothing to close.
    pub fn close(&mut self, camera: &mut OrthographicCamera, controls: &mut OrbitControls) -> bool {
        if self.mode != InteractionMode::Focused {
            return false;
        }

        controls.set_enabled(true);
        camera.apply_config(&CameraConfig::DEFAULT);

        self.close_control_visible = false;
        self.mode = InteractionMode::Default;
        log::info!("Focused view closed");
        true
    }

    pub fn restore_appearance(&self, scene: &mut Scene) {
        for &root_id in &self.registry {
            for object_id in scene.descendants(root_id) {
                if let Some(object) = scene.get_object_mut(object_id) {
                    object.restore_material();
                }
            }
        }
    }

    fn highlight(&self, scene: &mut Scene, root_id: ObjectId) {
        for object_id in scene.descendants(root_id) {
            if let Some(object) = scene.get_object_mut(object_id) {
                if object.mesh_id.is_some() {
                    object.material = Material::HIGHLIGHT;
                }
            }
        }
    }

    pub fn pointer_moved(
        &mut self,
        scene: &mut Scene,
        camera: &OrthographicCamera,
        position: Vec2,
        viewport: Vec2,
    ) {
        self.update_pointer(position, viewport);

        if self.mode == InteractionMode::Default {
            let hit = self.hit_test(scene, camera);
            self.on_hover(scene, hit.as_ref());
        }
    }

    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        camera: &mut OrthographicCamera,
        controls: &mut OrbitControls,
        position: Vec2,
        viewport: Vec2,
    ) -> bool {
        self.update_pointer(position, viewport);
        let hit = self.hit_test(scene, camera);
        self.on_click(scene, camera, controls, hit.as_ref())
    }

    /// Per-frame work: undo last frame's highlight, then find what is under the pointer.
    /// Expects world transforms to be up to date.
    pub fn frame(&mut self, scene: &mut Scene, camera: &OrthographicCamera) {
        self.restore_appearance(scene);

        self.hovered = self.hit_test(scene, camera);

        if self.highlight_hovered && self.mode == InteractionMode::Default {
            if let Some(root_id) = self.hovered.map(|hit| hit.root_id) {
                self.highlight(scene, root_id);
            }
        }
    }
}
