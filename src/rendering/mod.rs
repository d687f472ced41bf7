pub mod imgui_renderer;
pub mod render_mesh;
pub mod renderer;
pub mod scene_pass;
pub mod scene_uniform;
pub mod texture;
