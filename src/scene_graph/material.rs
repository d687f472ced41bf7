use glam::Vec4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub base_color: Vec4,
    pub double_sided: bool,
}

impl Material {
    pub const HIGHLIGHT: Material = Material {
        base_color: Vec4::new(1.0, 0.0, 0.0, 1.0),
        double_sided: false,
    };

    pub fn from_gltf(material: &gltf::Material) -> Self {
        Self {
            base_color: Vec4::from(material.pbr_metallic_roughness().base_color_factor()),
            double_sided: material.double_sided(),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Vec4::ONE,
            double_sided: false,
        }
    }
}
