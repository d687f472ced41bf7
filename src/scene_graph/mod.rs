pub mod material;
pub mod mesh;
pub mod object3d;
pub mod scene;
pub mod transform;

pub use material::Material;
pub use mesh::{Mesh, MeshId};
pub use object3d::{Object3D, ObjectId};
pub use scene::Scene;
