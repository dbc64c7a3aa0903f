/*!
This is a halfedge based polygon mesh library. It keeps the connectivity of
vertices, edges and faces of a 2-manifold surface, possibly with boundary, and
keeps it valid through every edit.

# Overview

+ A halfedge datastructure is used to represent the topology of a mesh. Every
  edge is a pair of directed halfedges, each one knowing its origin vertex,
  its twin, the next and previous halfedges around its face, and the face
  itself. Boundaries are padded with halfedges that have no face, so every
  halfedge belongs to a closed loop and every vertex has a closed umbrella of
  outgoing halfedges.

+ Vertices, halfedges and faces are referred to with handles, [`VH`], [`HH`]
  and [`FH`]. Handles are never reused within a mesh, so a handle to a deleted
  element is always reported as invalid instead of silently referring to
  something else.

+ The generic mesh type [`Mesh<V, F>`] carries a payload of type `V` on every
  vertex and `F` on every face. The library never looks inside these.

+ Meshes are created from a list of faces with [`MeshBuilder`], which rejects
  non-manifold input and faces with inconsistent winding.

+ The edit operations [`Mesh::split_edge`], [`Mesh::remove_vertex`],
  [`Mesh::split_face`], [`Mesh::merge_faces`], [`Mesh::flip_edge`] and
  [`Mesh::remove_face`] either
  succeed and leave a valid mesh behind, or fail and leave the mesh exactly as
  it was.

+ Optionally, this crate provides concrete mesh types that use the
  [`glam`](https://crates.io/crates/glam) crate for vertex positions. These
  can be found in the [`use_glam`] module and require the `use_glam` feature.
*/

mod build;
mod check;
mod edit;
mod element;
mod error;
mod iterator;
mod mesh;
mod obj;
mod primitive;
mod topol;

#[cfg(feature = "use_glam")]
pub mod use_glam;

pub use build::{MeshBuilder, VertexRef};
pub use element::{Edge, Handle, HasTopology, FH, HH, VH};
pub use error::Error;
pub use mesh::{Checkpoint, HalfedgeRow, Mesh};
pub use topol::Topology;
