use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use winit::{dpi::PhysicalSize, window::Window};

use crate::{
    rendering::{
        imgui_renderer::{create_imgui_renderer, ImguiRendererState},
        render_mesh::{DrawInstance, InstanceBuffer, RenderMesh},
        scene_pass::{SceneDraw, ScenePass, SceneTextureViews},
        scene_uniform::SceneUniform,
        texture::DepthTexture,
    },
    scene_graph::MeshId,
    viewer::ViewerState,
};

pub struct Renderer {
    pub window: Arc<Window>,
    pub size: PhysicalSize<u32>,

    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,

    depth_texture: DepthTexture,
    uniform_buffer: wgpu::Buffer,
    render_meshes: HashMap<MeshId, RenderMesh>,
    instance_buffer: InstanceBuffer,

    scene_pass: ScenePass,
    imgui_renderer: ImguiRendererState,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        state: &ViewerState,
        imgui_context: &mut imgui::Context,
    ) -> anyhow::Result<Renderer> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("No suitable graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                label: None,
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .context("Failed to create device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .or_else(|| surface_caps.formats.first().copied())
            .context("Surface has no supported formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let depth_texture = DepthTexture::new(&device, size, "Depth Texture");

        let uniform_buffer =
            SceneUniform::new(&state.camera, &state.config.light).create_buffer(&device);
        let scene_pass = ScenePass::create(&device, surface_format, &uniform_buffer);
        let instance_buffer = InstanceBuffer::new(&device);
        let imgui_renderer = create_imgui_renderer(&device, &queue, surface_format, imgui_context);

        Ok(Self {
            window,
            size,
            surface,
            surface_config,
            device,
            queue,
            depth_texture,
            uniform_buffer,
            render_meshes: HashMap::new(),
            instance_buffer,
            scene_pass,
            imgui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.surface_config.width = new_size.width;
            self.surface_config.height = new_size.height;
            self.surface.configure(&self.device, &self.surface_config);
            self.depth_texture.resize(&self.device, new_size);
        }
    }

    // Meshes arrive as assets finish loading, so uploads happen lazily
    fn upload_new_meshes(&mut self, state: &ViewerState) {
        for (mesh_id, mesh) in state.scene.meshes.iter() {
            if !self.render_meshes.contains_key(&mesh_id) {
                log::debug!("Uploading mesh {}", mesh.name);
                self.render_meshes
                    .insert(mesh_id, RenderMesh::from_mesh(&self.device, mesh));
            }
        }
    }

    fn gather_draws(&self, state: &ViewerState) -> (Vec<DrawInstance>, Vec<MeshId>) {
        let scene = &state.scene;

        scene
            .objects
            .iter()
            .filter_map(|(object_id, object)| {
                let mesh_id = object.mesh_id?;
                scene.is_visible_in_hierarchy(object_id).then(|| {
                    let instance = DrawInstance {
                        model: object.transform.world_matrix(),
                        color: object.material.base_color,
                    };
                    (instance, mesh_id)
                })
            })
            .unzip()
    }

    pub fn render(
        &mut self,
        state: &ViewerState,
        imgui_context: &mut imgui::Context,
    ) -> Result<(), wgpu::SurfaceError> {
        self.upload_new_meshes(state);

        SceneUniform::new(&state.camera, &state.config.light)
            .update_buffer(&self.queue, &self.uniform_buffer);

        let (instances, mesh_ids) = self.gather_draws(state);
        self.instance_buffer
            .write(&self.device, &self.queue, &instances);

        let draws = mesh_ids
            .iter()
            .enumerate()
            .filter_map(|(index, mesh_id)| {
                self.render_meshes.get(mesh_id).map(|mesh| SceneDraw {
                    mesh,
                    instance: index as u32,
                })
            })
            .collect::<Vec<_>>();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let clear = state.config.clear_color.as_dvec4();
        self.scene_pass.render(
            &SceneTextureViews {
                color: &view,
                depth: self.depth_texture.view(),
            },
            &mut encoder,
            wgpu::Color {
                r: clear.x,
                g: clear.y,
                b: clear.z,
                a: clear.w,
            },
            self.instance_buffer.buffer(),
            &draws,
        );

        if let Err(e) = self.imgui_renderer.render(
            &view,
            imgui_context,
            &self.device,
            &self.queue,
            &mut encoder,
        ) {
            log::error!("{:#}", e);
        }

        self.queue.submit([encoder.finish()]);
        output.present();

        Ok(())
    }
}
