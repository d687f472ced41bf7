use glam::{Mat4, Vec4};
use wgpu::util::DeviceExt;

use crate::camera::OrthographicCamera;
use crate::config::LightConfig;

const AMBIENT: Vec4 = Vec4::new(0.45, 0.45, 0.45, 1.0);

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniform {
    view_proj: Mat4,
    light: Vec4,
    ambient: Vec4,
}

impl SceneUniform {
    pub fn new(camera: &OrthographicCamera, light: &LightConfig) -> Self {
        let towards_light = (light.position - light.target).normalize_or_zero();

        Self {
            view_proj: camera.get_vp_matrix(),
            light: towards_light.extend(light.intensity),
            ambient: AMBIENT,
        }
    }

    pub fn create_buffer(&self, device: &wgpu::Device) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::cast_slice(&[*self]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        })
    }

    pub fn update_buffer(&self, queue: &wgpu::Queue, buffer: &wgpu::Buffer) {
        queue.write_buffer(buffer, 0, bytemuck::cast_slice(&[*self]));
    }
}
