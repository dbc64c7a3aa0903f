/*!
This is an optional module that is enabled by the `use_glam` feature. It
provides mesh types that can be used out of the box, that use
[`glam`](https://docs.rs/glam/latest/glam/) to store vertex positions.
*/

use std::path::Path;

use crate::{error::Error, Mesh};

/// Mesh with 32 bit floating point vertex positions.
pub type PolyMeshF32<F = ()> = Mesh<glam::Vec3, F>;

/// Mesh with 64 bit floating point vertex positions.
pub type PolyMeshF64<F = ()> = Mesh<glam::DVec3, F>;

fn vec3(pos: [f64; 3]) -> glam::Vec3 {
    glam::vec3(pos[0] as f32, pos[1] as f32, pos[2] as f32)
}

/// Box spanning from `min` to `max`, with six quad faces.
pub fn quad_box<F: Default>(min: glam::DVec3, max: glam::DVec3) -> Result<PolyMeshF64<F>, Error> {
    Mesh::quad_box(min.to_array(), max.to_array(), glam::DVec3::from)
}

/// Box spanning from the origin to (1, 1, 1).
pub fn unit_box<F: Default>() -> Result<PolyMeshF64<F>, Error> {
    Mesh::unit_box(glam::DVec3::from)
}

/// Same as [`unit_box`] with 32 bit positions.
pub fn unit_box_f32<F: Default>() -> Result<PolyMeshF32<F>, Error> {
    Mesh::unit_box(vec3)
}

pub fn icosahedron<F: Default>(radius: f64) -> Result<PolyMeshF64<F>, Error> {
    Mesh::icosahedron(radius, glam::DVec3::from)
}

pub fn load_obj<F: Default>(path: &Path) -> Result<PolyMeshF64<F>, Error> {
    Mesh::load_obj(path)
}

/// The position of every vertex, along with its handle.
pub fn points<F>(mesh: &PolyMeshF64<F>) -> impl Iterator<Item = (crate::VH, glam::DVec3)> + use<'_, F> {
    mesh.vertices()
        .filter_map(|v| mesh.vertex_data(v).ok().map(|p| (v, *p)))
}
